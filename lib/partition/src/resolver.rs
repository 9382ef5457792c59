use crate::dataset::Dataset;
use crate::error::RepresentationError;
use crate::format::{RdfSource, SourceFormat};
use crate::grouping::{group_by_named_graph, TripleGrouping};
use crate::partitions::{Partitions, DEFAULT_PARTITION_SIZE};
use crate::registry::LoaderRegistry;
use lsq_model::{GraphName, Quad, Triple};
use std::fmt;
use std::sync::Arc;

/// The views of an RDF source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RepresentationKind {
    Triples,
    Quads,
    Datasets,
}

impl fmt::Display for RepresentationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Triples => "triples",
            Self::Quads => "quads",
            Self::Datasets => "datasets",
        })
    }
}

/// A view of an RDF source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RdfRepresentation {
    Triples(Partitions<Triple>),
    Quads(Partitions<Quad>),
    Datasets(Partitions<Dataset>),
}

impl RdfRepresentation {
    pub fn kind(&self) -> RepresentationKind {
        match self {
            Self::Triples(_) => RepresentationKind::Triples,
            Self::Quads(_) => RepresentationKind::Quads,
            Self::Datasets(_) => RepresentationKind::Datasets,
        }
    }

    /// The number of elements of the view.
    pub fn len(&self) -> usize {
        match self {
            Self::Triples(triples) => triples.len(),
            Self::Quads(quads) => quads.len(),
            Self::Datasets(datasets) => datasets.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// How a representation is obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Derivation {
    /// A loader for the representation exists.
    Direct(RepresentationKind),
    /// Triples are obtained by dropping the graph names of the quads. This is lossy.
    ProjectQuadsToTriples,
    /// Quads are obtained by placing all triples in the default graph.
    WrapTriplesInDefaultGraph,
    /// Datasets are obtained by grouping the triples into one graph per key.
    GroupTriples(TripleGrouping),
    /// Datasets are obtained by grouping the quads by their graph name.
    GroupQuadsByGraph,
}

impl Derivation {
    /// The representation produced by this derivation.
    pub fn target(self) -> RepresentationKind {
        match self {
            Self::Direct(kind) => kind,
            Self::ProjectQuadsToTriples => RepresentationKind::Triples,
            Self::WrapTriplesInDefaultGraph => RepresentationKind::Quads,
            Self::GroupTriples(_) | Self::GroupQuadsByGraph => RepresentationKind::Datasets,
        }
    }
}

/// Options of the [RdfRepresentationResolver] and its loaders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolverOptions {
    /// The maximal number of elements of a loaded partition.
    pub partition_size: usize,
    /// The number of partitions of grouped results.
    pub partition_count: usize,
    /// How triples are grouped into datasets.
    pub triple_grouping: TripleGrouping,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self {
            partition_size: DEFAULT_PARTITION_SIZE,
            partition_count: 8,
            triple_grouping: TripleGrouping::default(),
        }
    }
}

impl ResolverOptions {
    #[must_use]
    pub fn with_partition_size(mut self, partition_size: usize) -> Self {
        self.partition_size = partition_size;
        self
    }

    #[must_use]
    pub fn with_partition_count(mut self, partition_count: usize) -> Self {
        self.partition_count = partition_count;
        self
    }

    #[must_use]
    pub fn with_triple_grouping(mut self, triple_grouping: TripleGrouping) -> Self {
        self.triple_grouping = triple_grouping;
        self
    }
}

/// Provides the triple, quad and dataset views of [RdfSource]s.
///
/// A view is loaded directly if the [LoaderRegistry] has a loader for it. Otherwise, it is
/// derived from another view that can be loaded directly:
///
/// | Requested | Fallback                                                               |
/// |-----------|------------------------------------------------------------------------|
/// | triples   | quads without graph names                                              |
/// | quads     | triples in the default graph                                           |
/// | datasets  | triples grouped by [TripleGrouping] (triple formats), else quads grouped by graph name |
///
/// Derivations never chain: the source of a fallback must be loadable directly.
#[derive(Clone, Debug)]
pub struct RdfRepresentationResolver {
    registry: Arc<LoaderRegistry>,
    options: ResolverOptions,
}

impl Default for RdfRepresentationResolver {
    fn default() -> Self {
        Self::new(LoaderRegistry::global(), ResolverOptions::default())
    }
}

impl RdfRepresentationResolver {
    pub fn new(registry: Arc<LoaderRegistry>, options: ResolverOptions) -> Self {
        Self { registry, options }
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Decides how `kind` is obtained for sources in `format`.
    ///
    /// # Errors
    ///
    /// Returns [RepresentationError::UnsupportedFormat] if `kind` can neither be loaded nor
    /// derived.
    pub fn plan(
        &self,
        format: &SourceFormat,
        kind: RepresentationKind,
    ) -> Result<Derivation, RepresentationError> {
        if self.registry.supports(format, kind) {
            return Ok(Derivation::Direct(kind));
        }

        let has_triples = self.registry.supports(format, RepresentationKind::Triples);
        let has_quads = self.registry.supports(format, RepresentationKind::Quads);
        match kind {
            RepresentationKind::Triples if has_quads => Ok(Derivation::ProjectQuadsToTriples),
            RepresentationKind::Quads if has_triples => Ok(Derivation::WrapTriplesInDefaultGraph),
            RepresentationKind::Datasets if has_triples && (format.is_triples() || !has_quads) => {
                Ok(Derivation::GroupTriples(self.options.triple_grouping))
            }
            RepresentationKind::Datasets if has_quads => Ok(Derivation::GroupQuadsByGraph),
            _ => Err(RepresentationError::UnsupportedFormat {
                format: format.clone(),
                representation: kind,
            }),
        }
    }

    /// Returns the `kind` view of `source`.
    pub fn resolve(
        &self,
        source: &RdfSource,
        kind: RepresentationKind,
    ) -> Result<RdfRepresentation, RepresentationError> {
        Ok(match kind {
            RepresentationKind::Triples => RdfRepresentation::Triples(self.triples(source)?),
            RepresentationKind::Quads => RdfRepresentation::Quads(self.quads(source)?),
            RepresentationKind::Datasets => RdfRepresentation::Datasets(self.datasets(source)?),
        })
    }

    /// Returns the triples of `source`.
    ///
    /// If the triples are derived from quads, the graph names are dropped.
    pub fn triples(&self, source: &RdfSource) -> Result<Partitions<Triple>, RepresentationError> {
        let derivation = self.plan(source.format(), RepresentationKind::Triples)?;
        tracing::debug!(?derivation, %source, "Resolving triples");
        match derivation {
            Derivation::ProjectQuadsToTriples => Ok(self.load_quads(source)?.map(Triple::from)),
            _ => self.load_triples(source),
        }
    }

    /// Returns the quads of `source`.
    ///
    /// If the quads are derived from triples, all of them are in the default graph.
    pub fn quads(&self, source: &RdfSource) -> Result<Partitions<Quad>, RepresentationError> {
        let derivation = self.plan(source.format(), RepresentationKind::Quads)?;
        tracing::debug!(?derivation, %source, "Resolving quads");
        match derivation {
            Derivation::WrapTriplesInDefaultGraph => Ok(self
                .load_triples(source)?
                .map(|triple| triple.in_graph(GraphName::DefaultGraph))),
            _ => self.load_quads(source),
        }
    }

    /// Returns the datasets of `source`.
    ///
    /// If the datasets are derived, each of them holds a single graph.
    pub fn datasets(&self, source: &RdfSource) -> Result<Partitions<Dataset>, RepresentationError> {
        let derivation = self.plan(source.format(), RepresentationKind::Datasets)?;
        tracing::debug!(?derivation, %source, "Resolving datasets");
        let groups = match derivation {
            Derivation::GroupTriples(grouping) => {
                grouping.group(self.load_triples(source)?, self.options.partition_count)
            }
            Derivation::GroupQuadsByGraph => {
                group_by_named_graph(self.load_quads(source)?, self.options.partition_count)
            }
            _ => return self.load_datasets(source),
        };
        Ok(groups.map(|(name, triples)| Dataset::from_named_graph(name, triples)))
    }

    fn load_triples(&self, source: &RdfSource) -> Result<Partitions<Triple>, RepresentationError> {
        let loader = self
            .registry
            .triple_loader(source.format())
            .ok_or_else(|| unsupported(source, RepresentationKind::Triples))?;
        loader(source, &self.options)
    }

    fn load_quads(&self, source: &RdfSource) -> Result<Partitions<Quad>, RepresentationError> {
        let loader = self
            .registry
            .quad_loader(source.format())
            .ok_or_else(|| unsupported(source, RepresentationKind::Quads))?;
        loader(source, &self.options)
    }

    fn load_datasets(&self, source: &RdfSource) -> Result<Partitions<Dataset>, RepresentationError> {
        let loader = self
            .registry
            .dataset_loader(source.format())
            .ok_or_else(|| unsupported(source, RepresentationKind::Datasets))?;
        loader(source, &self.options)
    }
}

fn unsupported(source: &RdfSource, representation: RepresentationKind) -> RepresentationError {
    RepresentationError::UnsupportedFormat {
        format: source.format().clone(),
        representation,
    }
}
