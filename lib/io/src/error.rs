use lsq_model::IriParseError;
use oxrdfio::RdfParseError;
use std::io;

/// An error raised while extracting a [LogEntry](crate::log::LogEntry) from a log line.
#[derive(Debug, thiserror::Error)]
pub enum LogParseError {
    /// The line does not match the log entry grammar. Only raised in strict mode.
    #[error("Malformed log entry ({reason}): {line}")]
    Malformed {
        /// The offending line.
        line: String,
        /// Why the line was rejected.
        reason: &'static str,
    },
    /// An error raised while reading the log.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// A non-fatal problem encountered while extracting a single log entry.
///
/// Diagnostics are kept as annotations of the entry. The fields that could be extracted are
/// retained.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntryDiagnostic {
    /// The timestamp does not match `dd/MMM/yyyy:HH:mm:ss Z`.
    #[error("Failed to parse timestamp: {raw}")]
    TimestampParse {
        /// The raw timestamp.
        raw: String,
    },
    /// No URI could be built from the request path. The query string was not extracted.
    #[error("Could not parse URI {uri}: {message}")]
    UriConstruction {
        /// The URI that could not be parsed.
        uri: String,
        /// The message of the URI parser.
        message: String,
    },
}

/// An error emitted by a [ResourceRecordStream](crate::records::ResourceRecordStream).
///
/// Malformed records only affect a single record. All other errors are fatal for the stream and
/// are the last item that is emitted. Use [Self::is_fatal] to distinguish them.
#[derive(Debug, thiserror::Error)]
pub enum RecordStreamError {
    /// The input contains a malformed statement. Only emitted in fail-fast mode.
    #[error("Malformed RDF record: {0}")]
    Malformed(#[source] RdfParseError),
    /// The input could not be opened or read.
    #[error("Failed to read the input: {0}")]
    ResourceAcquisition(#[source] io::Error),
    /// The base IRI of the parser is invalid.
    #[error("Invalid base IRI '{iri}': {error}")]
    InvalidBaseIri {
        /// The IRI itself.
        iri: String,
        /// The parsing error.
        #[source]
        error: IriParseError,
    },
}

impl RecordStreamError {
    /// Returns whether the error concerns the input session rather than the quality of the data.
    ///
    /// Session errors always end the stream. A [Self::Malformed] error is a data-quality error. It
    /// only ends the stream in fail-fast mode, and is still not fatal then.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Self::Malformed(_))
    }
}

impl From<RecordStreamError> for io::Error {
    #[inline]
    fn from(error: RecordStreamError) -> Self {
        match error {
            RecordStreamError::ResourceAcquisition(error) => error,
            RecordStreamError::Malformed(error) => error.into(),
            RecordStreamError::InvalidBaseIri { iri, error } => Self::new(
                io::ErrorKind::InvalidInput,
                format!("Invalid base IRI '{iri}': {error}"),
            ),
        }
    }
}
