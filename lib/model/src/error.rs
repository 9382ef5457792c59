use thiserror::Error;

/// An error raised while querying the executions recorded for a basic graph pattern.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BgpError {
    /// The benchmark run to look up was not given.
    #[error("The benchmark run resource is not set")]
    MissingBenchmarkRun,
}

/// An error raised while merging two [QueryRecord](crate::QueryRecord)s.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecordMergeError {
    /// The records describe different query texts.
    #[error("Cannot merge the record with hash {found} into the record with hash {expected}")]
    HashMismatch {
        /// The hash of the record that is merged into.
        expected: String,
        /// The hash of the merged record.
        found: String,
    },
}
