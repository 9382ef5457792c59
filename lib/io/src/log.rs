//! Extraction of SPARQL queries from HTTP access logs.
//!
//! Log lines are expected in the combined log format:
//!
//! ```text
//! 127.0.0.1 - bob [10/Oct/2020:13:55:36 -0700] "GET /sparql?query=SELECT%20*%20WHERE%20%7B%3Fs%20%3Fp%20%3Fo%7D HTTP/1.1" 200 512 "-" "curl/7.0"
//! ```
//!
//! The user agent is optional. Lines that do not match the grammar are skipped, or rejected in
//! strict mode. Problems with individual fields of a matching line do not reject the line. They
//! are recorded as [EntryDiagnostic]s of the entry.

use crate::error::{EntryDiagnostic, LogParseError};
use lsq_model::RemoteExecution;
use regex::Regex;
use std::io::BufRead;
use std::str;
use std::sync::LazyLock;
use time::macros::format_description;
use time::OffsetDateTime;
use url::Url;

static LOG_ENTRY: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(concat!(
        r#"^(?<host>\S+) "#,
        r#"\S+ "#,
        r#"(?<user>\S+) "#,
        r#"\[(?<time>[\w:/]+\s[+\-]\d{4})\] "#,
        r#""(?<request>.+?)" "#,
        r#"(?<response>\d{3}) "#,
        r#"(?<bytecount>\d+) "#,
        r#""(?<referer>[^"]+)""#,
        r#"(?: "(?<agent>[^"]*)")?"#,
    ))
    .expect("log entry pattern is valid")
});

static REQUEST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?<verb>\S+)\s+(?<path>\S+)\s+(?<protocol>\S+)")
        .expect("request line pattern is valid")
});

/// Request paths are resolved against this base before the query string is decoded.
const PATH_BASE: &str = "http://example.org";

/// The query parameter that carries the SPARQL query.
const QUERY_PARAMETER: &str = "query";

/// The request line of a log entry, e.g., `GET /sparql?query=... HTTP/1.1`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestLine {
    pub verb: String,
    pub path: String,
    pub protocol: String,
}

/// The fields of a single access-log line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogEntry {
    pub host: String,
    pub user: String,
    /// The timestamp as it appears in the log.
    pub raw_timestamp: String,
    /// The parsed timestamp. Absent if `raw_timestamp` could not be parsed.
    pub timestamp: Option<OffsetDateTime>,
    /// The full request, i.e., the content between the quotes.
    pub request: String,
    /// The parts of `request`. Absent if the request does not consist of verb, path and protocol.
    pub request_line: Option<RequestLine>,
    pub response: u16,
    pub byte_count: u64,
    pub referer: String,
    pub user_agent: Option<String>,
    /// The decoded value of the `query` parameter of the request path.
    pub query: Option<String>,
    pub diagnostics: Vec<EntryDiagnostic>,
}

impl LogEntry {
    /// Projects this entry to a [RemoteExecution] observed at position `sequence_id`.
    pub fn into_remote_execution(self, sequence_id: Option<u64>) -> RemoteExecution {
        let mut execution = RemoteExecution::from(self);
        execution.sequence_id = sequence_id;
        execution
    }
}

impl From<LogEntry> for RemoteExecution {
    fn from(entry: LogEntry) -> Self {
        let (verb, path, protocol) = match entry.request_line {
            Some(RequestLine {
                verb,
                path,
                protocol,
            }) => (Some(verb), Some(path), Some(protocol)),
            None => (None, None, None),
        };
        Self {
            sequence_id: None,
            host: entry.host,
            user: entry.user,
            at_time: entry.timestamp,
            verb,
            path,
            protocol,
            response: Some(entry.response),
            byte_count: Some(entry.byte_count),
            referer: Some(entry.referer),
            user_agent: entry.user_agent,
            diagnostics: entry.diagnostics.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Options of a [LogEntryExtractor].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LogParserOptions {
    /// Reject lines that do not match the log entry grammar instead of skipping them.
    pub strict: bool,
}

impl LogParserOptions {
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Extracts [LogEntry]s from access-log lines.
#[derive(Clone, Debug, Default)]
pub struct LogEntryExtractor {
    options: LogParserOptions,
}

impl LogEntryExtractor {
    pub fn new(options: LogParserOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &LogParserOptions {
        &self.options
    }

    /// Extracts the fields of `line`.
    ///
    /// Returns `Ok(None)` for lines that do not match the grammar, unless the extractor is strict.
    ///
    /// # Errors
    ///
    /// In strict mode, returns [LogParseError::Malformed] if the line does not match.
    pub fn extract(&self, line: &str) -> Result<Option<LogEntry>, LogParseError> {
        let Some(captures) = LOG_ENTRY.captures(line) else {
            return self.reject(line, "line does not match the log entry grammar");
        };
        let Ok(response) = captures["response"].parse::<u16>() else {
            return self.reject(line, "response code out of range");
        };
        let Ok(byte_count) = captures["bytecount"].parse::<u64>() else {
            return self.reject(line, "byte count out of range");
        };

        let mut diagnostics = Vec::new();
        let raw_timestamp = captures["time"].to_owned();
        let timestamp = match parse_timestamp(&raw_timestamp) {
            Ok(timestamp) => Some(timestamp),
            Err(error) => {
                tracing::debug!(%error, raw = %raw_timestamp, "Failed to parse timestamp");
                diagnostics.push(EntryDiagnostic::TimestampParse {
                    raw: raw_timestamp.clone(),
                });
                None
            }
        };

        let request = captures["request"].to_owned();
        let request_line = REQUEST_LINE.captures(&request).map(|parts| RequestLine {
            verb: parts["verb"].to_owned(),
            path: parts["path"].to_owned(),
            protocol: parts["protocol"].to_owned(),
        });
        let query = match &request_line {
            Some(request_line) => match extract_query(&request_line.path) {
                Ok(query) => query,
                Err(diagnostic) => {
                    tracing::debug!(%diagnostic, "Failed to extract query from request path");
                    diagnostics.push(diagnostic);
                    None
                }
            },
            None => None,
        };

        Ok(Some(LogEntry {
            host: captures["host"].to_owned(),
            user: captures["user"].to_owned(),
            raw_timestamp,
            timestamp,
            request,
            request_line,
            response,
            byte_count,
            referer: captures["referer"].to_owned(),
            user_agent: captures.name("agent").map(|agent| agent.as_str().to_owned()),
            query,
            diagnostics,
        }))
    }

    /// Extracts the entries of all lines of `reader`.
    ///
    /// Each item is paired with its line number, starting at 1. Lines that are not valid UTF-8
    /// are handled like lines that do not match the grammar. The iteration ends after the first
    /// I/O error.
    pub fn extract_all<'a, R: BufRead + 'a>(
        &'a self,
        mut reader: R,
    ) -> impl Iterator<Item = (u64, Result<Option<LogEntry>, LogParseError>)> + 'a {
        let mut buffer = Vec::new();
        let mut failed = false;
        std::iter::from_fn(move || {
            if failed {
                return None;
            }
            buffer.clear();
            match reader.read_until(b'\n', &mut buffer) {
                Ok(0) => None,
                Ok(_) => Some(self.extract_bytes(&buffer)),
                Err(error) => {
                    failed = true;
                    Some(Err(error.into()))
                }
            }
        })
        .zip(1_u64..)
        .map(|(entry, number)| (number, entry))
    }

    fn extract_bytes(&self, line: &[u8]) -> Result<Option<LogEntry>, LogParseError> {
        let line = line.strip_suffix(b"\n").unwrap_or(line);
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        match str::from_utf8(line) {
            Ok(line) => self.extract(line),
            Err(_) => self.reject(&String::from_utf8_lossy(line), "line is not valid UTF-8"),
        }
    }

    fn reject(
        &self,
        line: &str,
        reason: &'static str,
    ) -> Result<Option<LogEntry>, LogParseError> {
        if self.options.strict {
            return Err(LogParseError::Malformed {
                line: line.to_owned(),
                reason,
            });
        }
        tracing::debug!(reason, "Skipping log line");
        Ok(None)
    }
}

/// Percent-encodes the characters that commonly appear unescaped in logged SPARQL queries but
/// are not allowed in URIs.
pub fn encode_unsafe_characters(path: &str) -> String {
    path.replace('{', "%7B").replace('}', "%7D")
}

/// Returns the decoded value of the first `query` parameter of `path`.
fn extract_query(path: &str) -> Result<Option<String>, EntryDiagnostic> {
    let uri = format!("{PATH_BASE}{}", encode_unsafe_characters(path));
    let url = Url::parse(&uri).map_err(|error| EntryDiagnostic::UriConstruction {
        uri: uri.clone(),
        message: error.to_string(),
    })?;
    Ok(url
        .query_pairs()
        .find(|(name, _)| name == QUERY_PARAMETER)
        .map(|(_, value)| value.into_owned()))
}

fn parse_timestamp(raw: &str) -> Result<OffsetDateTime, time::error::Parse> {
    OffsetDateTime::parse(
        raw,
        format_description!(
            "[day]/[month repr:short]/[year]:[hour]:[minute]:[second] [offset_hour sign:mandatory][offset_minute]"
        ),
    )
}
