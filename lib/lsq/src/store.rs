//! Storage of [QueryRecord]s keyed by their hash.

pub use crate::error::RecordStoreError;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lsq_model::QueryRecord;

/// A store of [QueryRecord]s.
///
/// Stores are append-only: merging a record adds to the stored record with the same hash and
/// never removes anything from it (see [QueryRecord::merge]).
#[async_trait]
pub trait QueryRecordStore: Send + Sync {
    /// Whether a record with `hash` exists.
    async fn contains(&self, hash: &str) -> Result<bool, RecordStoreError>;

    /// Merges `record` into the stored record with the same hash, or stores it if there is none.
    async fn merge(&self, record: QueryRecord) -> Result<(), RecordStoreError>;

    /// Returns a copy of the record with `hash`.
    async fn get(&self, hash: &str) -> Result<Option<QueryRecord>, RecordStoreError>;
}

/// An in-memory [QueryRecordStore].
#[derive(Debug, Default)]
pub struct MemQueryRecordStore {
    records: DashMap<String, QueryRecord>,
}

impl MemQueryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The hashes of all records in ascending order.
    pub fn hashes(&self) -> Vec<String> {
        let mut hashes: Vec<_> = self
            .records
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        hashes.sort_unstable();
        hashes
    }
}

#[async_trait]
impl QueryRecordStore for MemQueryRecordStore {
    async fn contains(&self, hash: &str) -> Result<bool, RecordStoreError> {
        Ok(self.records.contains_key(hash))
    }

    async fn merge(&self, record: QueryRecord) -> Result<(), RecordStoreError> {
        let hash = record
            .hash()
            .ok_or(RecordStoreError::MissingHash)?
            .to_owned();
        match self.records.entry(hash) {
            Entry::Occupied(mut entry) => entry.get_mut().merge(record)?,
            Entry::Vacant(entry) => {
                entry.insert(record);
            }
        }
        Ok(())
    }

    async fn get(&self, hash: &str) -> Result<Option<QueryRecord>, RecordStoreError> {
        Ok(self.records.get(hash).map(|record| record.value().clone()))
    }
}
