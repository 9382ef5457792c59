//! Regrouping of RDF dumps into named graphs.

use lsq_partition::{
    Dataset, DatasetWriter, Partitions, RdfRepresentationResolver, RdfSource,
    RepresentationError,
};

/// Counters of a [regroup] run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegroupSummary {
    pub graphs: usize,
    pub triples: usize,
}

/// Returns the union of the dataset views of all `sources`.
///
/// The graphs are not merged across sources. A graph name that occurs in several sources yields
/// several graphs.
pub fn union_datasets(
    resolver: &RdfRepresentationResolver,
    sources: &[RdfSource],
) -> Result<Partitions<Dataset>, RepresentationError> {
    let mut union = Partitions::default();
    for source in sources {
        let datasets = resolver.datasets(source)?;
        tracing::debug!(%source, graphs = datasets.len(), "Resolved datasets");
        union = union.union(datasets);
    }
    Ok(union.repartition(resolver.options().partition_size))
}

/// Writes `datasets` to `writer` and finishes the writer.
pub fn write_datasets(
    datasets: Partitions<Dataset>,
    writer: &mut impl DatasetWriter,
) -> Result<RegroupSummary, RepresentationError> {
    let triples = datasets.iter().map(Dataset::triple_count).sum();
    let graphs = writer.write_datasets(datasets)?;
    writer.finish()?;
    tracing::info!(graphs, triples, "Regrouped RDF sources");
    Ok(RegroupSummary { graphs, triples })
}

/// Writes the union of the dataset views of `sources` to `writer` and finishes the writer.
///
/// All sources are resolved before anything is written.
pub fn regroup(
    resolver: &RdfRepresentationResolver,
    sources: &[RdfSource],
    writer: &mut impl DatasetWriter,
) -> Result<RegroupSummary, RepresentationError> {
    write_datasets(union_datasets(resolver, sources)?, writer)
}
