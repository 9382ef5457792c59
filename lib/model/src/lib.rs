mod bgp;
mod error;
mod execution;
pub mod fingerprint;
mod record;

pub use bgp::*;
pub use error::*;
pub use execution::*;
pub use record::*;

// Re-export some oxrdf types.
pub use oxrdf::{
    BlankNode, BlankNodeRef, GraphName, GraphNameRef, IriParseError, Literal, LiteralRef,
    NamedNode, NamedNodeRef, NamedOrBlankNode, NamedOrBlankNodeRef, Quad, QuadRef, Subject,
    SubjectRef, Term, TermRef, Triple, TripleRef, Variable, VariableRef,
};

// Re-export the SPARQL algebra. The grammar itself is treated as a black box.
pub use spargebra::algebra::GraphPattern;
pub use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};
pub use spargebra::{Query, SparqlSyntaxError};
