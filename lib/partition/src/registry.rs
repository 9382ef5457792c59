use crate::dataset::Dataset;
use crate::error::RepresentationError;
use crate::format::{RdfSource, SourceFormat};
use crate::partitions::Partitions;
use crate::resolver::{RepresentationKind, ResolverOptions};
use lsq_model::{Quad, Triple};
use oxrdfio::{RdfFormat, RdfParseError, RdfParser};
use rustc_hash::FxHashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

/// Loads a representation of an [RdfSource].
pub type Loader<T> = fn(&RdfSource, &ResolverOptions) -> Result<Partitions<T>, RepresentationError>;

static GLOBAL: LazyLock<Arc<LoaderRegistry>> =
    LazyLock::new(|| Arc::new(LoaderRegistry::with_defaults()));

/// A table of loaders keyed by format and representation.
///
/// The table is consulted by the [RdfRepresentationResolver](crate::RdfRepresentationResolver)
/// before any derivation is attempted.
#[derive(Clone, Default)]
pub struct LoaderRegistry {
    triples: FxHashMap<SourceFormat, Loader<Triple>>,
    quads: FxHashMap<SourceFormat, Loader<Quad>>,
    datasets: FxHashMap<SourceFormat, Loader<Dataset>>,
}

impl LoaderRegistry {
    /// Creates a registry without any loaders.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with triple loaders for N-Triples, Turtle, N3 and RDF/XML and quad
    /// loaders for N-Quads and TriG.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for format in [
            RdfFormat::NTriples,
            RdfFormat::Turtle,
            RdfFormat::N3,
            RdfFormat::RdfXml,
        ] {
            registry.register_triples(format, load_triples);
        }
        for format in [RdfFormat::NQuads, RdfFormat::TriG] {
            registry.register_quads(format, load_quads);
        }
        registry
    }

    /// The shared registry with the default loaders.
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL)
    }

    pub fn register_triples(
        &mut self,
        format: impl Into<SourceFormat>,
        loader: Loader<Triple>,
    ) -> &mut Self {
        self.triples.insert(format.into(), loader);
        self
    }

    pub fn register_quads(
        &mut self,
        format: impl Into<SourceFormat>,
        loader: Loader<Quad>,
    ) -> &mut Self {
        self.quads.insert(format.into(), loader);
        self
    }

    pub fn register_datasets(
        &mut self,
        format: impl Into<SourceFormat>,
        loader: Loader<Dataset>,
    ) -> &mut Self {
        self.datasets.insert(format.into(), loader);
        self
    }

    /// Whether a loader exists for `kind` in `format`.
    pub fn supports(&self, format: &SourceFormat, kind: RepresentationKind) -> bool {
        match kind {
            RepresentationKind::Triples => self.triples.contains_key(format),
            RepresentationKind::Quads => self.quads.contains_key(format),
            RepresentationKind::Datasets => self.datasets.contains_key(format),
        }
    }

    pub fn triple_loader(&self, format: &SourceFormat) -> Option<Loader<Triple>> {
        self.triples.get(format).copied()
    }

    pub fn quad_loader(&self, format: &SourceFormat) -> Option<Loader<Quad>> {
        self.quads.get(format).copied()
    }

    pub fn dataset_loader(&self, format: &SourceFormat) -> Option<Loader<Dataset>> {
        self.datasets.get(format).copied()
    }
}

impl fmt::Debug for LoaderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderRegistry")
            .field("triples", &self.triples.keys().collect::<Vec<_>>())
            .field("quads", &self.quads.keys().collect::<Vec<_>>())
            .field("datasets", &self.datasets.keys().collect::<Vec<_>>())
            .finish()
    }
}

fn load_triples(
    source: &RdfSource,
    options: &ResolverOptions,
) -> Result<Partitions<Triple>, RepresentationError> {
    Ok(load_quads(source, options)?.map(Triple::from))
}

/// Parses the whole source. Malformed statements are skipped.
fn load_quads(
    source: &RdfSource,
    options: &ResolverOptions,
) -> Result<Partitions<Quad>, RepresentationError> {
    let Some(format) = source.format().rdf_format() else {
        return Err(RepresentationError::UnsupportedFormat {
            format: source.format().clone(),
            representation: RepresentationKind::Quads,
        });
    };

    let mut quads = Vec::new();
    let mut malformed = 0_usize;
    for result in RdfParser::from_format(format).for_reader(source.open()?) {
        match result {
            Ok(quad) => quads.push(quad),
            Err(RdfParseError::Io(error)) => return Err(error.into()),
            Err(error) => {
                malformed += 1;
                tracing::warn!(%error, "Skipping malformed RDF statement");
            }
        }
    }
    if malformed > 0 {
        tracing::warn!(malformed, %source, "Skipped malformed statements");
    }
    tracing::debug!(quads = quads.len(), %source, "Loaded RDF source");

    Ok(Partitions::from_iter_chunked(quads, options.partition_size))
}
