//! Mapping of RDF terms to graph names.
//!
//! The mapping is total over ground terms and injective within each kind of term. Literals and
//! quoted triples carry distinct prefixes, so an IRI does not collide with a literal of the same
//! text.

use crate::error::RepresentationError;
use lsq_model::{
    BlankNode, GraphName, GraphNameRef, NamedNode, NamedNodePattern, Subject, Term, TermPattern,
    TermRef, Triple,
};
use url::form_urlencoded;

/// Prefix of graph names derived from literals.
pub const LITERAL_PREFIX: &str = "x-literal:";

/// Prefix of graph names derived from quoted triples.
pub const QUOTED_TRIPLE_PREFIX: &str = "x-rdfstar:";

/// The key under which the content of the default graph is grouped.
///
/// The key is empty, hence it never equals the key of a named graph.
pub const DEFAULT_GRAPH_NAME: &str = "";

const BLANK_NODE_PREFIX: &str = "_:";

/// Returns the graph name for `term`.
///
/// - IRIs are used as they are.
/// - Blank nodes become `_:` followed by their label.
/// - Literals and quoted triples are serialized in N-Triples syntax, form-urlencoded and prefixed
///   with [LITERAL_PREFIX] or [QUOTED_TRIPLE_PREFIX].
///
/// IRIs are not prefixed. An IRI whose text starts with one of the prefixes, such as
/// `x-literal:%22a%22`, therefore gets the same name as the corresponding literal (`"a"`).
pub fn to_graph_name(term: TermRef<'_>) -> String {
    match term {
        TermRef::NamedNode(node) => node.as_str().to_owned(),
        TermRef::BlankNode(node) => format!("{BLANK_NODE_PREFIX}{}", node.as_str()),
        TermRef::Literal(_) => format!("{LITERAL_PREFIX}{}", encode(&term.to_string())),
        TermRef::Triple(_) => format!("{QUOTED_TRIPLE_PREFIX}{}", encode(&term.to_string())),
    }
}

/// Returns the graph name for a term of a SPARQL triple pattern.
///
/// # Errors
///
/// Variables, and quoted triple patterns containing variables, have no graph name.
pub fn pattern_to_graph_name(pattern: &TermPattern) -> Result<String, RepresentationError> {
    let term = ground_term(pattern)?;
    Ok(to_graph_name(term.as_ref()))
}

/// Returns the key under which the content of `graph_name` is grouped.
pub fn graph_name_key(graph_name: GraphNameRef<'_>) -> String {
    match graph_name {
        GraphNameRef::NamedNode(node) => node.as_str().to_owned(),
        GraphNameRef::BlankNode(node) => format!("{BLANK_NODE_PREFIX}{}", node.as_str()),
        GraphNameRef::DefaultGraph => DEFAULT_GRAPH_NAME.to_owned(),
    }
}

/// Turns a graph name produced by [to_graph_name] or [graph_name_key] back into a [GraphName].
///
/// # Errors
///
/// Returns [RepresentationError::InvalidGraphName] if `name` is neither an IRI nor a blank node.
pub fn graph_name_from_key(name: &str) -> Result<GraphName, RepresentationError> {
    if name == DEFAULT_GRAPH_NAME {
        return Ok(GraphName::DefaultGraph);
    }
    let invalid = |message: String| RepresentationError::InvalidGraphName {
        name: name.to_owned(),
        message,
    };
    match name.strip_prefix(BLANK_NODE_PREFIX) {
        Some(label) => BlankNode::new(label)
            .map(Into::into)
            .map_err(|error| invalid(error.to_string())),
        None => NamedNode::new(name)
            .map(Into::into)
            .map_err(|error| invalid(error.to_string())),
    }
}

fn encode(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn ground_term(pattern: &TermPattern) -> Result<Term, RepresentationError> {
    match pattern {
        TermPattern::NamedNode(node) => Ok(node.clone().into()),
        TermPattern::BlankNode(node) => Ok(node.clone().into()),
        TermPattern::Literal(literal) => Ok(literal.clone().into()),
        TermPattern::Triple(triple) => {
            let subject = match ground_term(&triple.subject)? {
                Term::NamedNode(node) => Subject::NamedNode(node),
                Term::BlankNode(node) => Subject::BlankNode(node),
                Term::Triple(triple) => Subject::Triple(triple),
                Term::Literal(literal) => {
                    return Err(RepresentationError::UnclassifiedNodeKind {
                        node: literal.to_string(),
                    })
                }
            };
            let predicate = match &triple.predicate {
                NamedNodePattern::NamedNode(node) => node.clone(),
                NamedNodePattern::Variable(variable) => {
                    return Err(RepresentationError::UnclassifiedNodeKind {
                        node: variable.to_string(),
                    })
                }
            };
            let object = ground_term(&triple.object)?;
            Ok(Triple::new(subject, predicate, object).into())
        }
        TermPattern::Variable(variable) => Err(RepresentationError::UnclassifiedNodeKind {
            node: variable.to_string(),
        }),
    }
}
