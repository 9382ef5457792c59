use crate::error::RepresentationError;
use crate::naming::{graph_name_from_key, graph_name_key};
use lsq_model::{Quad, Triple};
use std::collections::BTreeMap;

/// A collection of graphs keyed by their graph name.
///
/// Graph names are strings as produced by [to_graph_name](crate::to_graph_name) and
/// [graph_name_key]. The triples of a graph form a multiset; duplicates are kept.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dataset {
    graphs: BTreeMap<String, Vec<Triple>>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a dataset that consists of a single graph.
    pub fn from_named_graph(name: impl Into<String>, triples: Vec<Triple>) -> Self {
        let mut dataset = Self::new();
        dataset.insert(name, triples);
        dataset
    }

    /// Groups `quads` by their graph name.
    pub fn from_quads(quads: impl IntoIterator<Item = Quad>) -> Self {
        let mut dataset = Self::new();
        for quad in quads {
            dataset
                .graphs
                .entry(graph_name_key(quad.graph_name.as_ref()))
                .or_default()
                .push(quad.into());
        }
        dataset
    }

    /// Adds `triples` to the graph `name`.
    pub fn insert(&mut self, name: impl Into<String>, triples: Vec<Triple>) {
        self.graphs.entry(name.into()).or_default().extend(triples);
    }

    pub fn graph(&self, name: &str) -> Option<&[Triple]> {
        self.graphs.get(name).map(Vec::as_slice)
    }

    pub fn graph_names(&self) -> impl Iterator<Item = &str> {
        self.graphs.keys().map(String::as_str)
    }

    /// The number of graphs.
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// The number of triples over all graphs.
    pub fn triple_count(&self) -> usize {
        self.graphs.values().map(Vec::len).sum()
    }

    pub fn into_named_graphs(self) -> impl Iterator<Item = (String, Vec<Triple>)> {
        self.graphs.into_iter()
    }

    /// Returns the content of the dataset as quads.
    ///
    /// # Errors
    ///
    /// Fails if a graph name is neither an IRI nor a blank node.
    pub fn to_quads(&self) -> Result<Vec<Quad>, RepresentationError> {
        let mut quads = Vec::with_capacity(self.triple_count());
        for (name, triples) in &self.graphs {
            let graph_name = graph_name_from_key(name)?;
            quads.extend(
                triples
                    .iter()
                    .map(|triple| triple.clone().in_graph(graph_name.clone())),
            );
        }
        Ok(quads)
    }
}
