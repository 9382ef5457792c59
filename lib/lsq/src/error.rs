use lsq_io::LogParseError;
use lsq_model::RecordMergeError;
use std::io;

/// An error raised by a [QueryRecordStore](crate::store::QueryRecordStore).
#[derive(Debug, thiserror::Error)]
pub enum RecordStoreError {
    /// The stored record and the merged record have different hashes.
    #[error("Cannot merge record {found} into record {expected}")]
    HashMismatch { expected: String, found: String },
    /// Records are stored by hash, hence records without text cannot be stored.
    #[error("The query record has no hash")]
    MissingHash,
}

impl From<RecordMergeError> for RecordStoreError {
    fn from(error: RecordMergeError) -> Self {
        match error {
            RecordMergeError::HashMismatch { expected, found } => {
                Self::HashMismatch { expected, found }
            }
        }
    }
}

/// An error raised while ingesting a log.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    /// A line could not be read, or was rejected in strict mode.
    #[error(transparent)]
    Log(#[from] LogParseError),
    #[error(transparent)]
    Store(#[from] RecordStoreError),
}

impl From<IngestError> for io::Error {
    #[inline]
    fn from(error: IngestError) -> Self {
        match error {
            IngestError::Log(LogParseError::Io(error)) => error,
            IngestError::Log(error) => Self::new(io::ErrorKind::InvalidData, error),
            IngestError::Store(error) => Self::other(error),
        }
    }
}
