use crate::error::BgpError;
use crate::execution::BgpExecution;
use rustc_hash::FxHashMap;
use spargebra::term::{NamedNodePattern, TermPattern, TriplePattern};

/// A distinct term of a basic graph pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct JoinVertex {
    term: TermPattern,
    degree: usize,
}

impl JoinVertex {
    /// The term that identifies this vertex.
    pub fn term(&self) -> &TermPattern {
        &self.term
    }

    /// The number of hyperedges that are incident to this vertex.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Whether the vertex is shared by at least two triple patterns.
    pub fn is_join_vertex(&self) -> bool {
        self.degree >= 2
    }
}

/// The hyperedge of a single triple pattern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Hyperedge {
    pattern: TriplePattern,
    vertices: Vec<usize>,
}

impl Hyperedge {
    /// The triple pattern of this hyperedge.
    pub fn pattern(&self) -> &TriplePattern {
        &self.pattern
    }

    /// The indices of the distinct vertices connected by this hyperedge, in the order of their
    /// first occurrence in the triple pattern.
    pub fn vertices(&self) -> &[usize] {
        &self.vertices
    }
}

/// Statistics about the join structure of a basic graph pattern.
///
/// Average and median are stored as integers. The average is truncated towards zero and the
/// median of an even number of degrees is the lower of the two central values. Both are zero if
/// there are no join vertices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct BgpStatistics {
    pub triple_pattern_count: usize,
    pub vertex_count: usize,
    pub join_vertex_count: usize,
    pub avg_join_vertex_degree: usize,
    pub median_join_vertex_degree: usize,
}

/// The join hypergraph of a basic graph pattern.
///
/// # Invariants
///
/// - Every triple pattern yields exactly one hyperedge, in the original order of the patterns.
/// - The vertices are exactly the distinct terms across all patterns.
/// - The degree of a vertex is the number of hyperedges that are incident to it. A term that
///   occurs multiple times in the same pattern (e.g., `?x ?x ?y`) is only connected once.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BgpGraph {
    vertices: Vec<JoinVertex>,
    index: FxHashMap<TermPattern, usize>,
    edges: Vec<Hyperedge>,
    executions: Vec<BgpExecution>,
}

impl BgpGraph {
    /// Builds the hypergraph of `patterns`.
    pub fn build(patterns: impl IntoIterator<Item = TriplePattern>) -> Self {
        let mut graph = Self::default();
        for pattern in patterns {
            graph.add_pattern(pattern);
        }
        graph
    }

    fn add_pattern(&mut self, pattern: TriplePattern) {
        let mut vertices = Vec::with_capacity(3);
        for term in [
            pattern.subject.clone(),
            predicate_term(&pattern.predicate),
            pattern.object.clone(),
        ] {
            let vertex = self.obtain_vertex(term);
            if !vertices.contains(&vertex) {
                vertices.push(vertex);
            }
        }

        for vertex in &vertices {
            self.vertices[*vertex].degree += 1;
        }
        self.edges.push(Hyperedge { pattern, vertices });
    }

    fn obtain_vertex(&mut self, term: TermPattern) -> usize {
        if let Some(vertex) = self.index.get(&term) {
            return *vertex;
        }

        let vertex = self.vertices.len();
        self.index.insert(term.clone(), vertex);
        self.vertices.push(JoinVertex { term, degree: 0 });
        vertex
    }

    /// All vertices in the order of their first occurrence.
    pub fn vertices(&self) -> &[JoinVertex] {
        &self.vertices
    }

    /// Returns the vertex of `term`, if `term` occurs in the pattern.
    pub fn vertex(&self, term: &TermPattern) -> Option<&JoinVertex> {
        self.index.get(term).map(|vertex| &self.vertices[*vertex])
    }

    /// All hyperedges in the order of the triple patterns.
    pub fn hyperedges(&self) -> &[Hyperedge] {
        &self.edges
    }

    /// The vertices that are shared by at least two triple patterns.
    pub fn join_vertices(&self) -> impl Iterator<Item = &JoinVertex> {
        self.vertices.iter().filter(|v| v.is_join_vertex())
    }

    pub fn join_vertex_count(&self) -> usize {
        self.join_vertices().count()
    }

    /// The mean degree of the join vertices, truncated towards zero.
    pub fn avg_join_vertex_degree(&self) -> usize {
        let (count, sum) = self
            .join_vertices()
            .fold((0, 0), |(count, sum), v| (count + 1, sum + v.degree));
        if count == 0 {
            0
        } else {
            sum / count
        }
    }

    /// The median degree of the join vertices. For an even number of join vertices, the lower of
    /// the two central values is returned.
    pub fn median_join_vertex_degree(&self) -> usize {
        let mut degrees = self.join_vertices().map(JoinVertex::degree).collect::<Vec<_>>();
        if degrees.is_empty() {
            return 0;
        }
        degrees.sort_unstable();
        degrees[(degrees.len() - 1) / 2]
    }

    pub fn statistics(&self) -> BgpStatistics {
        BgpStatistics {
            triple_pattern_count: self.edges.len(),
            vertex_count: self.vertices.len(),
            join_vertex_count: self.join_vertex_count(),
            avg_join_vertex_degree: self.avg_join_vertex_degree(),
            median_join_vertex_degree: self.median_join_vertex_degree(),
        }
    }

    /// The recorded executions of this basic graph pattern.
    pub fn executions(&self) -> &[BgpExecution] {
        &self.executions
    }

    pub fn add_execution(&mut self, execution: BgpExecution) {
        self.executions.push(execution);
    }

    /// Finds the first recorded execution that belongs to `benchmark_run`.
    ///
    /// # Errors
    ///
    /// Returns [BgpError::MissingBenchmarkRun] if `benchmark_run` is not set.
    pub fn find_execution_for(
        &self,
        benchmark_run: Option<&str>,
    ) -> Result<Option<&BgpExecution>, BgpError> {
        let benchmark_run = benchmark_run.ok_or(BgpError::MissingBenchmarkRun)?;
        Ok(self
            .executions
            .iter()
            .find(|execution| execution.benchmark_run == benchmark_run))
    }

    /// Reconstructs the triple patterns of the basic graph pattern in their original order.
    pub fn to_basic_pattern(&self) -> Vec<TriplePattern> {
        self.edges.iter().map(|edge| edge.pattern.clone()).collect()
    }
}

fn predicate_term(predicate: &NamedNodePattern) -> TermPattern {
    match predicate {
        NamedNodePattern::NamedNode(node) => TermPattern::NamedNode(node.clone()),
        NamedNodePattern::Variable(variable) => TermPattern::Variable(variable.clone()),
    }
}

#[cfg(test)]
#[allow(clippy::panic_in_result_fn)]
mod tests {
    use super::*;
    use crate::{NamedNode, Variable};

    fn var(name: &str) -> TermPattern {
        TermPattern::Variable(Variable::new_unchecked(name))
    }

    fn iri(iri: &str) -> NamedNodePattern {
        NamedNodePattern::NamedNode(NamedNode::new_unchecked(iri))
    }

    fn tp(subject: TermPattern, predicate: NamedNodePattern, object: TermPattern) -> TriplePattern {
        TriplePattern {
            subject,
            predicate,
            object,
        }
    }

    fn chain() -> Vec<TriplePattern> {
        vec![
            tp(var("a"), iri("http://example.com/p1"), var("b")),
            tp(var("b"), iri("http://example.com/p2"), var("c")),
            tp(var("c"), iri("http://example.com/p3"), var("d")),
        ]
    }

    #[test]
    fn test_chain_has_two_join_vertices() {
        let graph = BgpGraph::build(chain());

        assert_eq!(graph.join_vertex_count(), 2);
        let join_vertices = graph.join_vertices().collect::<Vec<_>>();
        assert_eq!(join_vertices[0].term(), &var("b"));
        assert_eq!(join_vertices[1].term(), &var("c"));
        assert!(join_vertices.iter().all(|v| v.degree() == 2));
    }

    #[test]
    fn test_one_hyperedge_per_pattern() {
        let graph = BgpGraph::build(chain());

        assert_eq!(graph.hyperedges().len(), 3);
        assert_eq!(graph.vertices().len(), 7);
        for edge in graph.hyperedges() {
            assert_eq!(edge.vertices().len(), 3);
        }
    }

    #[test]
    fn test_degree_is_number_of_incident_hyperedges() {
        let graph = BgpGraph::build(chain());
        for (id, vertex) in graph.vertices().iter().enumerate() {
            let incident = graph
                .hyperedges()
                .iter()
                .filter(|e| e.vertices().contains(&id))
                .count();
            assert_eq!(vertex.degree(), incident);
        }
    }

    #[test]
    fn test_repeated_term_in_pattern_is_connected_once() {
        let x = Variable::new_unchecked("x");
        let graph = BgpGraph::build(vec![
            tp(
                var("x"),
                NamedNodePattern::Variable(x),
                var("y"),
            ),
            tp(var("y"), iri("http://example.com/p"), var("z")),
        ]);

        assert_eq!(graph.hyperedges()[0].vertices().len(), 2);
        assert_eq!(graph.vertex(&var("x")).map(JoinVertex::degree), Some(1));
        assert_eq!(graph.vertex(&var("y")).map(JoinVertex::degree), Some(2));
        assert_eq!(graph.join_vertex_count(), 1);
    }

    #[test]
    fn test_predicate_iris_are_vertices() {
        let graph = BgpGraph::build(vec![
            tp(var("a"), iri("http://example.com/p"), var("b")),
            tp(var("c"), iri("http://example.com/p"), var("d")),
        ]);

        let p = TermPattern::NamedNode(NamedNode::new_unchecked("http://example.com/p"));
        assert_eq!(graph.vertex(&p).map(JoinVertex::degree), Some(2));
        assert_eq!(graph.join_vertex_count(), 1);
    }

    #[test]
    fn test_average_degree_is_truncated() {
        // ?s has degree 3, ?o has degree 2 => mean 2.5
        let graph = BgpGraph::build(vec![
            tp(var("s"), iri("http://example.com/p1"), var("o")),
            tp(var("s"), iri("http://example.com/p2"), var("o")),
            tp(var("s"), iri("http://example.com/p3"), var("x")),
        ]);

        assert_eq!(graph.join_vertex_count(), 2);
        assert_eq!(graph.avg_join_vertex_degree(), 2);
    }

    #[test]
    fn test_median_of_even_population_is_lower_central_value() {
        // degrees of the join vertices: ?a = 2, ?b = 4
        let graph = BgpGraph::build(vec![
            tp(var("a"), iri("http://example.com/p1"), var("b")),
            tp(var("a"), iri("http://example.com/p2"), var("b")),
            tp(var("b"), iri("http://example.com/p3"), var("c")),
            tp(var("b"), iri("http://example.com/p4"), var("d")),
        ]);

        let mut degrees = graph.join_vertices().map(JoinVertex::degree).collect::<Vec<_>>();
        degrees.sort_unstable();
        assert_eq!(degrees, vec![2, 4]);
        assert_eq!(graph.median_join_vertex_degree(), 2);
        assert_eq!(graph.avg_join_vertex_degree(), 3);
    }

    #[test]
    fn test_median_of_odd_population() {
        // degrees of the join vertices: ?a = 3, ?b = 2, ?c = 2
        let graph = BgpGraph::build(vec![
            tp(var("a"), iri("http://example.com/p1"), var("b")),
            tp(var("a"), iri("http://example.com/p2"), var("c")),
            tp(var("a"), iri("http://example.com/p3"), var("d")),
            tp(var("b"), iri("http://example.com/p4"), var("c")),
        ]);

        assert_eq!(graph.join_vertex_count(), 3);
        assert_eq!(graph.median_join_vertex_degree(), 2);
        assert_eq!(graph.avg_join_vertex_degree(), 2);
    }

    #[test]
    fn test_statistics_without_join_vertices() {
        let graph = BgpGraph::build(vec![tp(
            var("s"),
            iri("http://example.com/p"),
            var("o"),
        )]);

        assert_eq!(
            graph.statistics(),
            BgpStatistics {
                triple_pattern_count: 1,
                vertex_count: 3,
                join_vertex_count: 0,
                avg_join_vertex_degree: 0,
                median_join_vertex_degree: 0,
            }
        );
    }

    #[test]
    fn test_to_basic_pattern_round_trip() {
        let patterns = chain();
        let graph = BgpGraph::build(patterns.clone());
        assert_eq!(graph.to_basic_pattern(), patterns);
    }

    #[test]
    fn test_to_basic_pattern_keeps_duplicates_and_order() {
        let patterns = vec![
            tp(var("c"), iri("http://example.com/p3"), var("d")),
            tp(var("a"), iri("http://example.com/p1"), var("b")),
            tp(var("c"), iri("http://example.com/p3"), var("d")),
        ];
        let graph = BgpGraph::build(patterns.clone());
        assert_eq!(graph.hyperedges().len(), 3);
        assert_eq!(graph.to_basic_pattern(), patterns);
    }

    #[test]
    fn test_find_execution_for() -> Result<(), BgpError> {
        let mut graph = BgpGraph::build(chain());
        graph.add_execution(BgpExecution::new("run-1").with_result_count(10));
        graph.add_execution(BgpExecution::new("run-2").with_result_count(20));
        graph.add_execution(BgpExecution::new("run-1").with_result_count(30));

        let found = graph.find_execution_for(Some("run-1"))?;
        assert_eq!(found.and_then(|e| e.result_count), Some(10));
        assert_eq!(graph.find_execution_for(Some("run-3"))?, None);
        Ok(())
    }

    #[test]
    fn test_find_execution_for_requires_run() {
        let graph = BgpGraph::build(chain());
        assert_eq!(
            graph.find_execution_for(None),
            Err(BgpError::MissingBenchmarkRun)
        );
    }
}
