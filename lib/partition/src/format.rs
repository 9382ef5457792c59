use oxrdfio::RdfFormat;
use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;

/// The declared format of an [RdfSource].
///
/// Formats that are not known to the RDF codecs are kept by name. Only loaders registered for
/// that name can read them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceFormat {
    Rdf(RdfFormat),
    Unknown(String),
}

impl SourceFormat {
    /// Resolves `name` as file extension or media type.
    pub fn from_name(name: &str) -> Self {
        RdfFormat::from_extension(name)
            .or_else(|| RdfFormat::from_media_type(name))
            .map_or_else(|| Self::Unknown(name.to_owned()), Self::Rdf)
    }

    pub fn rdf_format(&self) -> Option<RdfFormat> {
        match self {
            Self::Rdf(format) => Some(*format),
            Self::Unknown(_) => None,
        }
    }

    /// Whether the format can only carry triples.
    pub fn is_triples(&self) -> bool {
        matches!(self, Self::Rdf(format) if !format.supports_datasets())
    }

    /// Whether the format can carry quads.
    pub fn is_quads(&self) -> bool {
        matches!(self, Self::Rdf(format) if format.supports_datasets())
    }
}

impl From<RdfFormat> for SourceFormat {
    fn from(format: RdfFormat) -> Self {
        Self::Rdf(format)
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rdf(format) => f.write_str(format.name()),
            Self::Unknown(name) => f.write_str(name),
        }
    }
}

/// Where the content of an [RdfSource] lives.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RdfData {
    Path(PathBuf),
    Bytes(Arc<[u8]>),
}

/// An RDF dump with a declared format.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RdfSource {
    data: RdfData,
    format: SourceFormat,
}

impl RdfSource {
    pub fn from_path(path: impl Into<PathBuf>, format: impl Into<SourceFormat>) -> Self {
        Self {
            data: RdfData::Path(path.into()),
            format: format.into(),
        }
    }

    pub fn from_bytes(bytes: impl Into<Arc<[u8]>>, format: impl Into<SourceFormat>) -> Self {
        Self {
            data: RdfData::Bytes(bytes.into()),
            format: format.into(),
        }
    }

    pub fn data(&self) -> &RdfData {
        &self.data
    }

    pub fn format(&self) -> &SourceFormat {
        &self.format
    }

    /// Opens a reader over the content.
    pub fn open(&self) -> io::Result<Box<dyn Read + Send>> {
        Ok(match &self.data {
            RdfData::Path(path) => Box::new(BufReader::new(File::open(path)?)),
            RdfData::Bytes(bytes) => Box::new(Cursor::new(Arc::clone(bytes))),
        })
    }
}

impl fmt::Display for RdfSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            RdfData::Path(path) => write!(f, "{} ({})", path.display(), self.format),
            RdfData::Bytes(bytes) => write!(f, "{} bytes ({})", bytes.len(), self.format),
        }
    }
}
