//! Labeled, undirected graphs and the read-only lookup tables built over
//! them for a single match run.

use std::collections::HashSet;

use petgraph::{
    graph::{EdgeIndex, Graph, NodeIndex},
    Undirected,
};

use thiserror::Error;

use crate::error::{MatchError, Side};

pub type Index = u32;

/// A simple undirected graph with node labels `N` and edge labels `E`.
///
/// Node indices are `0..node_count()` and stay stable for as long as the
/// graph is not mutated; the engine never mutates it.
pub type LabeledGraph<N, E> = Graph<N, E, Undirected, Index>;

/// Structural defects that make a graph unusable for matching.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("edge ({0}, {1}) has an endpoint outside the node range 0..{2}")]
    DanglingEdge(usize, usize, usize),
    #[error("self-loop on node {0}")]
    SelfLoop(usize),
    #[error("parallel edges between nodes {0} and {1}")]
    ParallelEdge(usize, usize),
}

/// Build a [`LabeledGraph`] from a list of node labels and `(u, v, label)`
/// edges, failing on endpoints that do not name a node or on self-loops.
pub fn from_parts<N, E>(
    nodes: Vec<N>,
    edges: impl IntoIterator<Item = (usize, usize, E)>,
) -> Result<LabeledGraph<N, E>, GraphError> {
    let n = nodes.len();
    let mut g: LabeledGraph<N, E> = Graph::with_capacity(n, n);
    for label in nodes {
        g.add_node(label);
    }
    for (u, v, label) in edges {
        if u >= n || v >= n {
            return Err(GraphError::DanglingEdge(u, v, n));
        }
        if u == v {
            return Err(GraphError::SelfLoop(u));
        }
        g.add_edge(NodeIndex::new(u), NodeIndex::new(v), label);
    }
    Ok(g)
}

/// Per-run lookup tables over one input graph: constant-time edge lookup by
/// endpoint pair and plain neighbor lists.
///
/// A view only borrows the graph. Everything the searches need to remember
/// about nodes lives in their own state, never on the graph, so any number of
/// threads can share one view.
pub struct GraphView<'g, N, E> {
    graph: &'g LabeledGraph<N, E>,
    edges: Vec<Option<EdgeIndex<Index>>>,
    neighbors: Vec<Vec<usize>>,
}

impl<'g, N, E> GraphView<'g, N, E> {
    /// Index `graph`, rejecting self-loops and parallel edges.
    pub fn new(graph: &'g LabeledGraph<N, E>, side: Side) -> Result<Self, MatchError> {
        let n = graph.node_count();
        let mut edges = vec![None; n * n];
        let mut neighbors = vec![Vec::new(); n];
        let mut seen = HashSet::new();

        for e in graph.edge_indices() {
            let Some((u, v)) = graph.edge_endpoints(e) else {
                continue;
            };
            let (u, v) = (u.index(), v.index());
            if u == v {
                return Err(MatchError::Input {
                    side,
                    source: GraphError::SelfLoop(u),
                });
            }
            if !seen.insert((u.min(v), u.max(v))) {
                return Err(MatchError::Input {
                    side,
                    source: GraphError::ParallelEdge(u, v),
                });
            }
            edges[u * n + v] = Some(e);
            edges[v * n + u] = Some(e);
            neighbors[u].push(v);
            neighbors[v].push(u);
        }

        for list in neighbors.iter_mut() {
            list.sort_unstable();
        }

        Ok(Self {
            graph,
            edges,
            neighbors,
        })
    }

    pub fn graph(&self) -> &'g LabeledGraph<N, E> {
        self.graph
    }

    pub fn node_count(&self) -> usize {
        self.neighbors.len()
    }

    /// Label of node `i`.
    ///
    /// Panics if `i` is out of range; every caller iterates `0..node_count()`.
    pub fn label(&self, i: usize) -> &N {
        &self.graph[NodeIndex::new(i)]
    }

    /// Label of the edge between `i` and `j`, if there is one.
    pub fn edge(&self, i: usize, j: usize) -> Option<&E> {
        let n = self.node_count();
        if i >= n || j >= n {
            return None;
        }
        self.edges[i * n + j].map(|e| &self.graph[e])
    }

    pub fn has_edge(&self, i: usize, j: usize) -> bool {
        self.edge(i, j).is_some()
    }

    pub fn neighbors(&self, i: usize) -> &[usize] {
        &self.neighbors[i]
    }

    pub fn degree(&self, i: usize) -> usize {
        self.neighbors[i].len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dangling_edge_is_rejected() {
        let res = from_parts(vec!['a', 'b'], [(0, 2, ())]);
        assert_eq!(res.err(), Some(GraphError::DanglingEdge(0, 2, 2)));
    }

    #[test]
    fn self_loop_is_rejected() {
        let res = from_parts(vec!['a', 'b'], [(1, 1, ())]);
        assert_eq!(res.err(), Some(GraphError::SelfLoop(1)));
    }

    #[test]
    fn parallel_edges_are_rejected_by_view() {
        let mut g = LabeledGraph::<char, ()>::default();
        let a = g.add_node('a');
        let b = g.add_node('b');
        g.add_edge(a, b, ());
        g.add_edge(b, a, ());
        let res = GraphView::new(&g, Side::Target);
        assert!(matches!(
            res,
            Err(MatchError::Input {
                side: Side::Target,
                ..
            })
        ));
    }

    #[test]
    fn view_lookups() {
        let g = from_parts(vec!['a', 'b', 'c'], [(0, 1, 7u8), (1, 2, 9)]).unwrap();
        let view = GraphView::new(&g, Side::Source).unwrap();
        assert_eq!(view.edge(0, 1), Some(&7));
        assert_eq!(view.edge(2, 1), Some(&9));
        assert_eq!(view.edge(0, 2), None);
        assert_eq!(view.edge(0, 5), None);
        assert_eq!(view.neighbors(1), &[0, 2]);
        assert_eq!(view.degree(0), 1);
        assert_eq!(view.label(2), &'c');
    }
}
