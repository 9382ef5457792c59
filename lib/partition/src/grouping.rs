//! Grouping of triples and quads into graphs.
//!
//! All groupings have multiset semantics: duplicate triples are kept.

use crate::naming::{graph_name_key, to_graph_name};
use crate::partitions::Partitions;
use lsq_model::{Quad, TermRef, Triple};
use std::hash::Hash;

/// The strategy for grouping plain triples into named graphs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TripleGrouping {
    /// One graph per subject.
    #[default]
    Subjects,
    /// One graph per object.
    Objects,
    /// One graph per predicate.
    Predicates,
}

impl TripleGrouping {
    pub fn group(
        self,
        triples: Partitions<Triple>,
        partition_count: usize,
    ) -> Partitions<(String, Vec<Triple>)> {
        match self {
            Self::Subjects => group_by_subjects(triples, partition_count),
            Self::Objects => group_by_objects(triples, partition_count),
            Self::Predicates => group_by_predicates(triples, partition_count),
        }
    }
}

/// Groups `triples` by an arbitrary key.
pub fn group_by<K: Hash + Eq>(
    triples: Partitions<Triple>,
    key: impl Fn(&Triple) -> K,
    partition_count: usize,
) -> Partitions<(K, Vec<Triple>)> {
    triples.group_by(key, partition_count)
}

pub fn group_by_subjects(
    triples: Partitions<Triple>,
    partition_count: usize,
) -> Partitions<(String, Vec<Triple>)> {
    group_by(
        triples,
        |triple| to_graph_name(TermRef::from(triple.subject.as_ref())),
        partition_count,
    )
}

pub fn group_by_objects(
    triples: Partitions<Triple>,
    partition_count: usize,
) -> Partitions<(String, Vec<Triple>)> {
    group_by(
        triples,
        |triple| to_graph_name(triple.object.as_ref()),
        partition_count,
    )
}

pub fn group_by_predicates(
    triples: Partitions<Triple>,
    partition_count: usize,
) -> Partitions<(String, Vec<Triple>)> {
    group_by(
        triples,
        |triple| triple.predicate.as_str().to_owned(),
        partition_count,
    )
}

/// Groups `quads` by their graph name. Quads in the default graph are grouped under
/// [DEFAULT_GRAPH_NAME](crate::DEFAULT_GRAPH_NAME).
pub fn group_by_named_graph(
    quads: Partitions<Quad>,
    partition_count: usize,
) -> Partitions<(String, Vec<Triple>)> {
    quads.combine_by_key(
        |quad| graph_name_key(quad.graph_name.as_ref()),
        |quad| vec![Triple::from(quad)],
        |mut triples, quad| {
            triples.push(quad.into());
            triples
        },
        |mut left, right| {
            left.extend(right);
            left
        },
        partition_count,
    )
}
