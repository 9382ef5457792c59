use crate::dataset::Dataset;
use crate::error::RepresentationError;
use crate::naming::graph_name_from_key;
use crate::partitions::Partitions;
use lsq_model::{GraphName, QuadRef, Triple};
use oxrdfio::{RdfFormat, RdfSerializer, WriterQuadSerializer};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// A sink for named graphs.
pub trait DatasetWriter {
    /// Writes the graph `name` with `triples`.
    fn write_graph(&mut self, name: &str, triples: &[Triple]) -> Result<(), RepresentationError>;

    /// Flushes all written graphs. No graph can be written afterwards.
    fn finish(&mut self) -> Result<(), RepresentationError>;

    /// Writes all graphs of `datasets` and returns the number of written graphs.
    fn write_datasets(
        &mut self,
        datasets: Partitions<Dataset>,
    ) -> Result<usize, RepresentationError> {
        let mut count = 0;
        for dataset in datasets {
            for (name, triples) in dataset.into_named_graphs() {
                self.write_graph(&name, &triples)?;
                count += 1;
            }
        }
        Ok(count)
    }
}

/// Writes named graphs into a file.
///
/// If the format does not support datasets, the graph names are dropped and all triples end up
/// in a single graph.
pub struct FileDatasetWriter {
    path: PathBuf,
    format: RdfFormat,
    serializer: Option<WriterQuadSerializer<BufWriter<File>>>,
}

impl FileDatasetWriter {
    /// Creates (or truncates) the file at `path`.
    pub fn create(path: impl Into<PathBuf>, format: RdfFormat) -> Result<Self, RepresentationError> {
        let path = path.into();
        let file = File::create(&path)?;
        let serializer = RdfSerializer::from_format(format).for_writer(BufWriter::new(file));
        Ok(Self {
            path,
            format,
            serializer: Some(serializer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> RdfFormat {
        self.format
    }
}

impl DatasetWriter for FileDatasetWriter {
    fn write_graph(&mut self, name: &str, triples: &[Triple]) -> Result<(), RepresentationError> {
        let graph_name = if self.format.supports_datasets() {
            graph_name_from_key(name)?
        } else {
            GraphName::DefaultGraph
        };
        let serializer = self.serializer.as_mut().ok_or_else(|| {
            io::Error::other(format!("{} is already finished", self.path.display()))
        })?;
        for triple in triples {
            serializer.serialize_quad(QuadRef::new(
                &triple.subject,
                &triple.predicate,
                &triple.object,
                &graph_name,
            ))?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), RepresentationError> {
        if let Some(serializer) = self.serializer.take() {
            serializer.finish()?.flush()?;
            tracing::debug!(path = %self.path.display(), "Finished writing datasets");
        }
        Ok(())
    }
}
