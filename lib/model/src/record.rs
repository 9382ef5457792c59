use crate::bgp::StructuralFeatures;
use crate::error::RecordMergeError;
use crate::execution::{LocalExecution, RemoteExecution};
use crate::fingerprint;
use spargebra::Query;
use std::collections::BTreeMap;

/// A record about a SPARQL query.
///
/// The record is identified by the fingerprint of its text (see [fingerprint]). It is created on
/// the first sighting of a distinct text and later passes attach structural features and
/// executions to it. Records only grow; nothing that was attached is ever removed.
///
/// Local executions are benchmark executions against a local endpoint. Remote executions are
/// sightings of the query in logs of a remote endpoint.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryRecord {
    text: Option<String>,
    hash: Option<String>,
    parse_error: Option<String>,
    structural_features: Option<StructuralFeatures>,
    local_executions: Vec<LocalExecution>,
    remote_executions: Vec<RemoteExecution>,
}

impl QueryRecord {
    /// Creates an empty [QueryRecord] without text.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a [QueryRecord] for `text` with the matching hash.
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.set_query_and_hash(text);
        record
    }

    /// The raw query text.
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The fingerprint of the text.
    ///
    /// The hash is only guaranteed to match the text if the text was last set with
    /// [Self::set_query_and_hash] or [Self::update_hash] was called after [Self::set_text].
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    /// Sets the text and its hash.
    pub fn set_query_and_hash(&mut self, text: impl Into<String>) -> &mut Self {
        let text = text.into();
        self.hash = Some(fingerprint::hash_str(&text));
        self.text = Some(text);
        self
    }

    /// Sets the text to the serialization of `query` and updates the hash.
    ///
    /// Note that the serialization of a parsed query is not necessarily equal to the text it was
    /// parsed from. Hence, the resulting hash may differ from the hash of the original text.
    pub fn set_query_and_hash_from(&mut self, query: &Query) -> &mut Self {
        self.set_query_and_hash(query.to_string())
    }

    /// Removes the text and the hash.
    pub fn clear_query(&mut self) -> &mut Self {
        self.text = None;
        self.hash = None;
        self
    }

    /// Sets the text without touching the hash. Call [Self::update_hash] afterwards.
    pub fn set_text(&mut self, text: Option<String>) -> &mut Self {
        self.text = text;
        self
    }

    /// Recomputes the hash from the current text.
    pub fn update_hash(&mut self) -> &mut Self {
        self.hash = fingerprint::hash(self.text.as_deref());
        self
    }

    /// The message of the parser if the text is not a valid SPARQL query.
    pub fn parse_error(&self) -> Option<&str> {
        self.parse_error.as_deref()
    }

    pub fn set_parse_error(&mut self, parse_error: Option<String>) -> &mut Self {
        self.parse_error = parse_error;
        self
    }

    /// The structural features of the query, if they have been computed.
    pub fn structural_features(&self) -> Option<&StructuralFeatures> {
        self.structural_features.as_ref()
    }

    pub fn structural_features_mut(&mut self) -> Option<&mut StructuralFeatures> {
        self.structural_features.as_mut()
    }

    pub fn set_structural_features(&mut self, features: StructuralFeatures) -> &mut Self {
        self.structural_features = Some(features);
        self
    }

    pub fn local_executions(&self) -> &[LocalExecution] {
        &self.local_executions
    }

    pub fn add_local_execution(&mut self, execution: LocalExecution) -> &mut Self {
        self.local_executions.push(execution);
        self
    }

    pub fn remote_executions(&self) -> &[RemoteExecution] {
        &self.remote_executions
    }

    pub fn add_remote_execution(&mut self, execution: RemoteExecution) -> &mut Self {
        self.remote_executions.push(execution);
        self
    }

    /// Indexes the local executions by their benchmark run.
    ///
    /// If a benchmark run has multiple executions, the first one is returned.
    pub fn local_execution_map(&self) -> BTreeMap<&str, &LocalExecution> {
        let mut result = BTreeMap::new();
        for execution in &self.local_executions {
            result
                .entry(execution.benchmark_run.as_str())
                .or_insert(execution);
        }
        result
    }

    /// Merges the fields of `other` into this record.
    ///
    /// Fields that are absent in this record are taken from `other` and the executions of `other`
    /// are appended. Fields that are already present are never overwritten.
    ///
    /// # Errors
    ///
    /// Returns an error if both records have a hash and the hashes differ.
    pub fn merge(&mut self, other: QueryRecord) -> Result<(), RecordMergeError> {
        if let (Some(expected), Some(found)) = (&self.hash, &other.hash) {
            if expected != found {
                return Err(RecordMergeError::HashMismatch {
                    expected: expected.clone(),
                    found: found.clone(),
                });
            }
        }

        if self.text.is_none() && self.hash.is_none() {
            self.text = other.text;
            self.hash = other.hash;
        }
        if self.parse_error.is_none() {
            self.parse_error = other.parse_error;
        }
        if self.structural_features.is_none() {
            self.structural_features = other.structural_features;
        }
        self.local_executions.extend(other.local_executions);
        self.remote_executions.extend(other.remote_executions);
        Ok(())
    }
}
