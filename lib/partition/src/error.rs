use crate::format::SourceFormat;
use crate::resolver::RepresentationKind;
use std::io;

/// An error raised while loading, deriving or writing an RDF representation.
#[derive(Debug, thiserror::Error)]
pub enum RepresentationError {
    /// Neither a loader nor a derivation exists for the requested representation.
    #[error("The format {format} does not support the {representation} representation")]
    UnsupportedFormat {
        format: SourceFormat,
        representation: RepresentationKind,
    },
    /// A node for which no graph name can be derived, e.g., a variable.
    #[error("Cannot derive a graph name from the node {node}")]
    UnclassifiedNodeKind { node: String },
    /// A graph name that is neither an IRI nor a blank node label.
    #[error("Invalid graph name '{name}': {message}")]
    InvalidGraphName { name: String, message: String },
    #[error(transparent)]
    Io(#[from] io::Error),
}
