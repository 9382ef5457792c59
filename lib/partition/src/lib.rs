//! Partitioned RDF representations of LSQ dump files.
//!
//! An RDF source can be viewed as a collection of triples, of quads, or of datasets (named graphs).
//! Loaders usually only support some of these views. The [RdfRepresentationResolver] derives the
//! other views from whatever a [LoaderRegistry] offers for the format of the source.
//!
//! Grouping into datasets is keyed by [to_graph_name], a deterministic mapping from RDF terms to
//! graph names that also serves as partition key.

mod dataset;
mod error;
mod format;
mod grouping;
mod naming;
mod partitions;
mod registry;
mod resolver;
mod writer;

pub use dataset::Dataset;
pub use error::RepresentationError;
pub use format::{RdfData, RdfSource, SourceFormat};
pub use grouping::{
    group_by, group_by_named_graph, group_by_objects, group_by_predicates, group_by_subjects,
    TripleGrouping,
};
pub use naming::{
    graph_name_from_key, graph_name_key, pattern_to_graph_name, to_graph_name,
    DEFAULT_GRAPH_NAME, LITERAL_PREFIX, QUOTED_TRIPLE_PREFIX,
};
pub use partitions::{partition_for, Partitions, DEFAULT_PARTITION_SIZE};
pub use registry::{Loader, LoaderRegistry};
pub use resolver::{
    Derivation, RdfRepresentation, RdfRepresentationResolver, RepresentationKind,
    ResolverOptions,
};
pub use writer::{DatasetWriter, FileDatasetWriter};
