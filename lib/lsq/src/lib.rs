//! Linked SPARQL Queries.
//!
//! LSQ turns the SPARQL queries of endpoint logs into records that are identified by the hash of
//! their text. Each record collects the sightings of its query and, optionally, the structural
//! features of the query.
//!
//! ```
//! use lsq::ingest::{IngestOptions, LogIngestor};
//! use lsq::store::{MemQueryRecordStore, QueryRecordStore};
//! use std::sync::Arc;
//!
//! # tokio_test::block_on(async {
//! let log = r#"127.0.0.1 - bob [10/Oct/2020:13:55:36 -0700] "GET /sparql?query=ASK%20%7B%7D HTTP/1.1" 200 512 "-" "curl/7.0""#;
//!
//! let store = Arc::new(MemQueryRecordStore::new());
//! let ingestor = LogIngestor::new(Arc::clone(&store), IngestOptions::default());
//! let summary = ingestor.ingest(log.as_bytes()).await?;
//! assert_eq!(summary.new_records, 1);
//!
//! let hash = lsq::model::fingerprint::hash_str("ASK {}");
//! let record = store.get(&hash).await?.unwrap();
//! assert_eq!(record.remote_executions().len(), 1);
//! # Result::<_, Box<dyn std::error::Error>>::Ok(())
//! # }).unwrap();
//! ```

pub mod error;
pub mod ingest;
pub mod regroup;
pub mod store;

pub mod model {
    pub use lsq_model::*;
}

pub mod io {
    pub use lsq_io::*;
}

pub mod partition {
    pub use lsq_partition::*;
}
