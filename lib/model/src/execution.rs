use std::time::Duration;
use time::OffsetDateTime;

/// A benchmark execution of a query against a local endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LocalExecution {
    /// The benchmark run this execution belongs to.
    pub benchmark_run: String,
    /// The number of results, if the execution completed.
    pub result_count: Option<u64>,
    /// The wall-clock time of the execution.
    pub elapsed: Option<Duration>,
    /// A message describing a failed execution.
    pub error: Option<String>,
}

impl LocalExecution {
    /// Creates a new [LocalExecution] for `benchmark_run` without any measurements.
    pub fn new(benchmark_run: impl Into<String>) -> Self {
        Self {
            benchmark_run: benchmark_run.into(),
            result_count: None,
            elapsed: None,
            error: None,
        }
    }

    #[must_use]
    pub fn with_result_count(mut self, result_count: u64) -> Self {
        self.result_count = Some(result_count);
        self
    }

    #[must_use]
    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }
}

/// A sighting of a query in the access log of a remote endpoint.
///
/// Remote executions are projections of log entries. Fields that could not be extracted from the
/// log line are absent, problems during the extraction are kept as `diagnostics`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RemoteExecution {
    /// The position of the sighting in its source (e.g., the line number).
    pub sequence_id: Option<u64>,
    pub host: String,
    pub user: String,
    pub at_time: Option<OffsetDateTime>,
    pub verb: Option<String>,
    pub path: Option<String>,
    pub protocol: Option<String>,
    pub response: Option<u16>,
    pub byte_count: Option<u64>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    /// Non-fatal problems encountered while extracting the sighting.
    pub diagnostics: Vec<String>,
}

/// An execution of a single basic graph pattern as part of a benchmark run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BgpExecution {
    /// The benchmark run this execution belongs to.
    pub benchmark_run: String,
    /// The number of solutions of the basic graph pattern.
    pub result_count: Option<u64>,
    /// The wall-clock time of the execution.
    pub elapsed: Option<Duration>,
}

impl BgpExecution {
    /// Creates a new [BgpExecution] for `benchmark_run` without any measurements.
    pub fn new(benchmark_run: impl Into<String>) -> Self {
        Self {
            benchmark_run: benchmark_run.into(),
            result_count: None,
            elapsed: None,
        }
    }

    #[must_use]
    pub fn with_result_count(mut self, result_count: u64) -> Self {
        self.result_count = Some(result_count);
        self
    }
}
