use crate::bgp::graph::BgpGraph;
use crate::record::QueryRecord;
use spargebra::algebra::GraphPattern;
use spargebra::term::TriplePattern;
use spargebra::Query;

/// The structural features of a query.
///
/// The features consist of one [BgpGraph] for each non-empty basic graph pattern of the query,
/// in the order in which the algebra is traversed (left before right, outer before inner).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StructuralFeatures {
    bgps: Vec<BgpGraph>,
}

impl StructuralFeatures {
    pub fn new(bgps: Vec<BgpGraph>) -> Self {
        Self { bgps }
    }

    pub fn bgps(&self) -> &[BgpGraph] {
        &self.bgps
    }

    /// Mutable access to the basic graph patterns, e.g., for attaching executions.
    pub fn bgps_mut(&mut self) -> &mut [BgpGraph] {
        &mut self.bgps
    }

    pub fn bgp_count(&self) -> usize {
        self.bgps.len()
    }

    pub fn triple_pattern_count(&self) -> usize {
        self.bgps.iter().map(|bgp| bgp.hyperedges().len()).sum()
    }

    pub fn join_vertex_count(&self) -> usize {
        self.bgps.iter().map(BgpGraph::join_vertex_count).sum()
    }
}

/// Computes the structural features of `query`.
///
/// Basic graph patterns inside sub-queries, optionals, unions, `GRAPH` and `SERVICE` blocks are
/// included. Patterns inside `EXISTS` expressions and property paths are not.
pub fn analyze_query(query: &Query) -> StructuralFeatures {
    let pattern = match query {
        Query::Select { pattern, .. }
        | Query::Construct { pattern, .. }
        | Query::Describe { pattern, .. }
        | Query::Ask { pattern, .. } => pattern,
    };

    let mut bgps = Vec::new();
    collect_bgps(pattern, &mut bgps);
    StructuralFeatures::new(bgps.into_iter().map(BgpGraph::build).collect())
}

fn collect_bgps(pattern: &GraphPattern, bgps: &mut Vec<Vec<TriplePattern>>) {
    match pattern {
        GraphPattern::Bgp { patterns } => {
            if !patterns.is_empty() {
                bgps.push(patterns.clone());
            }
        }
        GraphPattern::Join { left, right }
        | GraphPattern::LeftJoin { left, right, .. }
        | GraphPattern::Union { left, right }
        | GraphPattern::Minus { left, right } => {
            collect_bgps(left, bgps);
            collect_bgps(right, bgps);
        }
        GraphPattern::Filter { inner, .. }
        | GraphPattern::Graph { inner, .. }
        | GraphPattern::Extend { inner, .. }
        | GraphPattern::OrderBy { inner, .. }
        | GraphPattern::Project { inner, .. }
        | GraphPattern::Distinct { inner }
        | GraphPattern::Reduced { inner }
        | GraphPattern::Slice { inner, .. }
        | GraphPattern::Group { inner, .. }
        | GraphPattern::Service { inner, .. } => collect_bgps(inner, bgps),
        _ => {}
    }
}

/// Parses the text of `record` and attaches the structural features.
///
/// If the text is not a valid query, the parser message is stored as parse error instead.
/// Returns whether the features were attached. Records without text are left untouched.
pub fn analyze_record(record: &mut QueryRecord, base_iri: Option<&str>) -> bool {
    let Some(text) = record.text() else {
        return false;
    };

    match Query::parse(text, base_iri) {
        Ok(query) => {
            record.set_structural_features(analyze_query(&query));
            true
        }
        Err(error) => {
            tracing::debug!(hash = record.hash(), %error, "Query text is not valid SPARQL");
            record.set_parse_error(Some(error.to_string()));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyze(text: &str) -> StructuralFeatures {
        let query = Query::parse(text, None).unwrap();
        analyze_query(&query)
    }

    #[test]
    fn test_single_bgp() {
        let features = analyze("SELECT * WHERE { ?a <http://example.com/p1> ?b . ?b <http://example.com/p2> ?c . ?c <http://example.com/p3> ?d }");
        assert_eq!(features.bgp_count(), 1);
        assert_eq!(features.triple_pattern_count(), 3);
        assert_eq!(features.join_vertex_count(), 2);
    }

    #[test]
    fn test_union_yields_separate_bgps() {
        let features = analyze("SELECT * { { ?a ?b ?c . ?x ?y ?z } UNION { ?a ?b ?c } }");
        assert_eq!(features.bgp_count(), 2);
        assert_eq!(features.triple_pattern_count(), 3);
    }

    #[test]
    fn test_nested_patterns_are_collected() {
        let features = analyze(
            "SELECT ?s WHERE { ?s <http://example.com/p> ?o OPTIONAL { ?o <http://example.com/q> ?x } GRAPH ?g { ?s <http://example.com/r> ?y } \
             FILTER(?o != 1) } ORDER BY ?s LIMIT 10",
        );
        assert_eq!(features.bgp_count(), 3);
        assert_eq!(features.triple_pattern_count(), 3);
    }

    #[test]
    fn test_sub_select_is_collected() {
        let features = analyze(
            "SELECT * WHERE { ?s <http://example.com/p> ?o { SELECT ?o WHERE { ?o <http://example.com/q> ?x } } }",
        );
        assert_eq!(features.triple_pattern_count(), 2);
    }

    #[test]
    fn test_empty_pattern_has_no_bgp() {
        let features = analyze("ASK {}");
        assert_eq!(features.bgp_count(), 0);
        assert_eq!(features.join_vertex_count(), 0);
    }

    #[test]
    fn test_analyze_record() {
        let mut record = QueryRecord::from_text("SELECT * { ?s <http://example.com/p> ?o . ?o <http://example.com/q> ?x }");
        assert!(analyze_record(&mut record, None));
        assert_eq!(record.parse_error(), None);
        assert_eq!(
            record.structural_features().map(StructuralFeatures::join_vertex_count),
            Some(1)
        );
    }

    #[test]
    fn test_analyze_record_with_relative_iris_and_base() {
        let mut record = QueryRecord::from_text("SELECT * { ?s <p> ?o }");
        assert!(analyze_record(&mut record, Some("http://example.com/")));
        let bgp = &record.structural_features().unwrap().bgps()[0];
        insta::assert_snapshot!(bgp.to_basic_pattern()[0].to_string(), @"?s <http://example.com/p> ?o");
    }

    #[test]
    fn test_analyze_record_with_invalid_query() {
        let mut record = QueryRecord::from_text("SELECT * WHERE { ?s ?p }");
        assert!(!analyze_record(&mut record, None));
        assert!(record.parse_error().is_some());
        assert_eq!(record.structural_features(), None);
    }

    #[test]
    fn test_analyze_record_without_text() {
        let mut record = QueryRecord::new();
        assert!(!analyze_record(&mut record, None));
        assert_eq!(record.parse_error(), None);
    }
}
