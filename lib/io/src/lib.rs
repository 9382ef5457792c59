//! Inputs of LSQ: query sightings in HTTP access logs and RDF dumps of query records.
//!
//! - [log] extracts the fields of access-log lines, including the embedded SPARQL query.
//! - [records] turns an arbitrary byte source into a lazy stream of RDF resource records.

mod error;
pub mod log;
pub mod records;

pub use error::*;
