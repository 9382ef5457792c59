//! Ingestion of access logs into a [QueryRecordStore].

use crate::error::IngestError;
use crate::store::QueryRecordStore;
use lsq_io::log::{LogEntry, LogEntryExtractor, LogParserOptions};
use lsq_model::{analyze_record, QueryRecord};
use std::io::BufRead;
use std::sync::Arc;

/// Options of a [LogIngestor].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IngestOptions {
    pub log: LogParserOptions,
    /// Compute the structural features of new queries.
    pub analyze: bool,
    /// The base IRI for parsing the queries.
    pub base_iri: Option<String>,
}

impl IngestOptions {
    #[must_use]
    pub fn with_log_options(mut self, log: LogParserOptions) -> Self {
        self.log = log;
        self
    }

    #[must_use]
    pub fn with_analysis(mut self, analyze: bool) -> Self {
        self.analyze = analyze;
        self
    }

    #[must_use]
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }
}

/// Counters of a [LogIngestor] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestSummary {
    /// The number of lines read.
    pub lines: u64,
    /// Lines that do not match the log entry grammar.
    pub skipped_lines: u64,
    /// Entries whose request carries no query.
    pub entries_without_query: u64,
    /// Entries that were recorded as remote execution.
    pub sightings: u64,
    /// Records that did not exist before.
    pub new_records: u64,
    /// New records whose text is not a valid SPARQL query. Only counted with analysis enabled.
    pub invalid_queries: u64,
}

/// Extracts queries from access logs and merges their sightings into a [QueryRecordStore].
pub struct LogIngestor<S> {
    store: Arc<S>,
    extractor: LogEntryExtractor,
    options: IngestOptions,
}

impl<S: QueryRecordStore> LogIngestor<S> {
    pub fn new(store: Arc<S>, options: IngestOptions) -> Self {
        Self {
            store,
            extractor: LogEntryExtractor::new(options.log),
            options,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Ingests all lines of `reader`.
    ///
    /// # Errors
    ///
    /// Fails on I/O errors, on store errors and, in strict mode, on lines that do not match the
    /// log entry grammar.
    pub async fn ingest<R: BufRead>(&self, reader: R) -> Result<IngestSummary, IngestError> {
        let mut summary = IngestSummary::default();
        for (line_number, entry) in self.extractor.extract_all(reader) {
            summary.lines += 1;
            match entry? {
                Some(entry) => self.ingest_entry(line_number, entry, &mut summary).await?,
                None => summary.skipped_lines += 1,
            }
        }
        tracing::info!(?summary, "Finished log ingestion");
        Ok(summary)
    }

    /// Records `entry` as a sighting of its query.
    pub async fn ingest_entry(
        &self,
        sequence_id: u64,
        mut entry: LogEntry,
        summary: &mut IngestSummary,
    ) -> Result<(), IngestError> {
        let Some(query) = entry.query.take() else {
            summary.entries_without_query += 1;
            return Ok(());
        };

        let mut record = QueryRecord::from_text(query);
        let hash = record.hash().unwrap_or_default().to_owned();
        if !self.store.contains(&hash).await? {
            summary.new_records += 1;
            if self.options.analyze
                && !analyze_record(&mut record, self.options.base_iri.as_deref())
            {
                summary.invalid_queries += 1;
            }
            tracing::debug!(hash = %hash, "New query record");
        }

        record.add_remote_execution(entry.into_remote_execution(Some(sequence_id)));
        self.store.merge(record).await?;
        summary.sightings += 1;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use crate::store::MemQueryRecordStore;
    use lsq_model::fingerprint;

    const ASK: &str = r#"10.0.0.1 - - [01/Jan/2021:00:00:00 +0000] "GET /sparql?query=ASK%20%7B%7D HTTP/1.1" 200 3 "-""#;
    const SELECT: &str = r#"10.0.0.2 - alice [01/Jan/2021:00:00:01 +0000] "GET /sparql?query=SELECT%20*%20%7B%3Fs%20%3Fp%20%3Fo%20.%20%3Fo%20%3Fq%20%3Fx%7D HTTP/1.1" 200 3 "-""#;
    const INVALID: &str = r#"10.0.0.3 - - [01/Jan/2021:00:00:02 +0000] "GET /sparql?query=SELECT%20WHERE HTTP/1.1" 400 3 "-""#;
    const NO_QUERY: &str = r#"10.0.0.4 - - [01/Jan/2021:00:00:03 +0000] "GET /index.html HTTP/1.1" 200 3 "-""#;

    fn ingestor(options: IngestOptions) -> LogIngestor<MemQueryRecordStore> {
        LogIngestor::new(Arc::new(MemQueryRecordStore::new()), options)
    }

    #[tokio::test]
    async fn test_ingest_deduplicates_queries() -> Result<(), IngestError> {
        let ingestor = ingestor(IngestOptions::default());
        let log = [ASK, SELECT, ASK, NO_QUERY, "garbage"].join("\n");

        let summary = ingestor.ingest(log.as_bytes()).await?;
        assert_eq!(
            summary,
            IngestSummary {
                lines: 5,
                skipped_lines: 1,
                entries_without_query: 1,
                sightings: 3,
                new_records: 2,
                invalid_queries: 0,
            }
        );

        let record = ingestor
            .store()
            .get(&fingerprint::hash_str("ASK {}"))
            .await?
            .unwrap();
        let sequence_ids: Vec<_> = record
            .remote_executions()
            .iter()
            .map(|execution| execution.sequence_id)
            .collect();
        assert_eq!(sequence_ids, vec![Some(1), Some(3)]);
        assert_eq!(record.structural_features(), None);
        Ok(())
    }

    #[tokio::test]
    async fn test_ingest_with_analysis() -> Result<(), IngestError> {
        let ingestor = ingestor(IngestOptions::default().with_analysis(true));
        let log = [SELECT, INVALID].join("\n");

        let summary = ingestor.ingest(log.as_bytes()).await?;
        assert_eq!(summary.new_records, 2);
        assert_eq!(summary.invalid_queries, 1);

        let select = ingestor
            .store()
            .get(&fingerprint::hash_str("SELECT * {?s ?p ?o . ?o ?q ?x}"))
            .await?
            .unwrap();
        let features = select.structural_features().unwrap();
        assert_eq!(features.triple_pattern_count(), 2);
        assert_eq!(features.join_vertex_count(), 1);

        let invalid = ingestor
            .store()
            .get(&fingerprint::hash_str("SELECT WHERE"))
            .await?
            .unwrap();
        assert!(invalid.parse_error().is_some());
        Ok(())
    }

    #[tokio::test]
    async fn test_ingest_continues_after_invalid_utf8() -> Result<(), IngestError> {
        let ingestor = ingestor(IngestOptions::default());
        let mut log = b"10.0.0.9 - - [01/Jan/2021:00:00:00 +0000] \"GET /x\xff\xfe HTTP/1.1\" 200 3 \"-\"\n".to_vec();
        log.extend_from_slice(ASK.as_bytes());

        let summary = ingestor.ingest(log.as_slice()).await?;
        assert_eq!(summary.lines, 2);
        assert_eq!(summary.skipped_lines, 1);
        assert_eq!(summary.new_records, 1);
        assert!(ingestor
            .store()
            .contains(&fingerprint::hash_str("ASK {}"))
            .await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_ingest_strict_rejects_garbage() {
        let ingestor = ingestor(
            IngestOptions::default().with_log_options(LogParserOptions::default().with_strict(true)),
        );
        let log = [ASK, "garbage"].join("\n");

        let result = ingestor.ingest(log.as_bytes()).await;
        assert!(matches!(result, Err(IngestError::Log(_))));
        assert_eq!(ingestor.store().len(), 1);
    }
}
