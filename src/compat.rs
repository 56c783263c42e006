//! The compatibility (edge-product) graph of two labeled graphs.
//!
//! Vertices are the node pairs `(i, j)` whose labels match. Two vertices are
//! joined by a c-edge when both graphs connect their nodes with matching
//! edges, and by a d-edge when the pairs may coexist without such an edge
//! (neither graph has one, or the edge matcher is node-only). Pairs that
//! disagree on adjacency are not joined at all. Cliques of this graph are
//! exactly the consistent mappings, so the maximum common subgraph problem
//! becomes a clique problem.

use bit_set::BitSet;
use tracing::debug;

use crate::{
    error::MatchError,
    graph::LabeledGraph,
    matcher::{EdgeMatcher, NodeMatcher},
    problem::{Link, MatchProblem},
};

pub struct CompatGraph {
    vertices: Vec<(usize, usize)>,
    c_edges: Vec<BitSet>,
    d_edges: Vec<BitSet>,
}

impl CompatGraph {
    /// Build the compatibility graph of `source` and `target`.
    ///
    /// Fails only if one of the graphs is malformed.
    pub fn build<N, E, M, B>(
        source: &LabeledGraph<N, E>,
        target: &LabeledGraph<N, E>,
        nodes: &M,
        edges: &B,
    ) -> Result<Self, MatchError>
    where
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let problem = MatchProblem::new(source, target, nodes, edges)?;
        Ok(Self::from_problem(&problem))
    }

    pub(crate) fn from_problem<N, E, M, B>(problem: &MatchProblem<'_, N, E, M, B>) -> Self
    where
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let o = problem.forward();
        let (n_source, n_target) = (o.query().node_count(), o.data().node_count());

        let mut vertices = Vec::new();
        for i in 0..n_source {
            for j in 0..n_target {
                if o.nodes_match(i, j) {
                    vertices.push((i, j));
                }
            }
        }

        let size = vertices.len();
        let mut c_edges = vec![BitSet::with_capacity(size); size];
        let mut d_edges = vec![BitSet::with_capacity(size); size];

        for (v1, p1) in vertices.iter().enumerate() {
            for (v2, p2) in vertices.iter().enumerate().skip(v1 + 1) {
                match o.link(*p1, *p2) {
                    Some(Link::Bonded) => {
                        c_edges[v1].insert(v2);
                        c_edges[v2].insert(v1);
                    }
                    Some(Link::Unbonded) => {
                        d_edges[v1].insert(v2);
                        d_edges[v2].insert(v1);
                    }
                    None => (),
                }
            }
        }

        let graph = Self {
            vertices,
            c_edges,
            d_edges,
        };
        debug!(
            "compatibility graph: {} vertices, {} c-edges, {} d-edges",
            graph.len(),
            graph.c_edge_count(),
            graph.d_edge_count()
        );
        graph
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// The `(source, target)` node pair of vertex `v`.
    pub fn pair(&self, v: usize) -> (usize, usize) {
        self.vertices[v]
    }

    pub fn pairs(&self) -> &[(usize, usize)] {
        &self.vertices
    }

    /// Vertices joined to `v` by a c-edge.
    pub fn c_neighbors(&self, v: usize) -> &BitSet {
        &self.c_edges[v]
    }

    /// Vertices joined to `v` by a d-edge.
    pub fn d_neighbors(&self, v: usize) -> &BitSet {
        &self.d_edges[v]
    }

    /// Vertices joined to `v` by either kind of edge.
    pub fn neighbors(&self, v: usize) -> BitSet {
        let mut all = self.c_edges[v].clone();
        all.union_with(&self.d_edges[v]);
        all
    }

    pub fn are_c_adjacent(&self, v: usize, u: usize) -> bool {
        self.c_edges[v].contains(u)
    }

    pub fn are_d_adjacent(&self, v: usize, u: usize) -> bool {
        self.d_edges[v].contains(u)
    }

    pub fn c_edge_count(&self) -> usize {
        self.c_edges.iter().map(|row| row.len()).sum::<usize>() / 2
    }

    pub fn d_edge_count(&self) -> usize {
        self.d_edges.iter().map(|row| row.len()).sum::<usize>() / 2
    }
}
