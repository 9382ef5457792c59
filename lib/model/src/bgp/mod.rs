//! Structural analysis of basic graph patterns.
//!
//! A [BgpGraph] represents a basic graph pattern as a hypergraph: every distinct term of the
//! pattern is a vertex and every triple pattern is a hyperedge connecting its (up to three)
//! distinct terms. Vertices that are shared by at least two triple patterns are join vertices.

mod analysis;
mod graph;

pub use analysis::{analyze_query, analyze_record, StructuralFeatures};
pub use graph::{BgpGraph, BgpStatistics, Hyperedge, JoinVertex};
