//! Maximal clique enumeration over a [`CompatGraph`].
//!
//! In [`CliqueMode::Connected`] the engine runs Koch's c-clique enumeration:
//! a clique may only grow through a vertex that is c-adjacent to something
//! already in it, so every reported clique corresponds to one connected
//! common fragment. In [`CliqueMode::Disconnected`] it runs Bron–Kerbosch with
//! pivoting over c-edges and d-edges alike, so a clique may span several
//! fragments. Either way every maximal clique is reported, ties included.

use bit_set::BitSet;
use tracing::{debug, trace, warn};

use crate::{
    compat::CompatGraph,
    config::{CliqueMode, Deadline},
    error::MatchError,
    graph::LabeledGraph,
    mapping::{Mapping, SearchOutcome},
    matcher::{EdgeMatcher, NodeMatcher},
    problem::MatchProblem,
};

/// Enumerates maximal cliques of a compatibility graph and turns them into
/// [`Mapping`]s.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CliqueEngine {
    mode: CliqueMode,
}

impl CliqueEngine {
    pub fn new(mode: CliqueMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CliqueMode {
        self.mode
    }

    /// Return every maximal clique of `graph` as a set of vertex indices, and
    /// whether the enumeration was cut short by `deadline`.
    pub fn cliques(&self, graph: &CompatGraph, deadline: Deadline) -> (Vec<BitSet>, bool) {
        let mut search = Enumeration {
            graph,
            deadline,
            cliques: Vec::new(),
            interrupted: false,
        };
        match self.mode {
            CliqueMode::Connected => search.koch(),
            CliqueMode::Disconnected => search.bron_kerbosch(),
        }
        (search.cliques, search.interrupted)
    }

    /// Translate every maximal clique of `graph` into a mapping.
    ///
    /// Cliques whose pairs reuse a node are skipped. The compatibility graph
    /// never joins such pairs, so this only guards against malformed input.
    pub fn mappings(&self, graph: &CompatGraph, deadline: Deadline) -> SearchOutcome {
        let (cliques, interrupted) = self.cliques(graph, deadline);
        let mut mappings = Vec::with_capacity(cliques.len());
        for clique in cliques {
            match Mapping::from_pairs(clique.iter().map(|v| graph.pair(v))) {
                Ok(m) => mappings.push(m),
                Err(e) => trace!("skipping non-injective clique: {e}"),
            }
        }
        if interrupted {
            warn!("clique enumeration stopped at deadline");
        }
        debug!(
            "clique engine ({:?}) found {} maximal cliques",
            self.mode,
            mappings.len()
        );
        SearchOutcome {
            mappings,
            reached_limit: interrupted,
        }
    }

    /// Build the compatibility graph of `source` and `target` and return the
    /// mappings of its maximal cliques.
    pub fn search<N, E, M, B>(
        &self,
        source: &LabeledGraph<N, E>,
        target: &LabeledGraph<N, E>,
        nodes: &M,
        edges: &B,
        deadline: Deadline,
    ) -> Result<SearchOutcome, MatchError>
    where
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let problem = MatchProblem::new(source, target, nodes, edges)?;
        Ok(self.run(&problem, deadline))
    }

    pub(crate) fn run<N, E, M, B>(
        &self,
        problem: &MatchProblem<'_, N, E, M, B>,
        deadline: Deadline,
    ) -> SearchOutcome
    where
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let graph = CompatGraph::from_problem(problem);
        self.mappings(&graph, deadline)
    }
}

impl Default for CliqueEngine {
    fn default() -> Self {
        Self::new(CliqueMode::Connected)
    }
}

struct Enumeration<'g> {
    graph: &'g CompatGraph,
    deadline: Deadline,
    cliques: Vec<BitSet>,
    interrupted: bool,
}

impl Enumeration<'_> {
    fn out_of_time(&mut self) -> bool {
        if !self.interrupted && self.deadline.expired() {
            self.interrupted = true;
        }
        self.interrupted
    }

    fn report(&mut self, clique: &[usize]) {
        self.cliques.push(clique.iter().copied().collect());
    }

    fn koch(&mut self) {
        // Roots already processed; cliques through them were reported then.
        let mut done = BitSet::with_capacity(self.graph.len());
        let mut clique = Vec::new();

        for u in 0..self.graph.len() {
            if self.out_of_time() {
                return;
            }
            let mut p = self.graph.c_neighbors(u).clone();
            p.difference_with(&done);
            let mut s = self.graph.c_neighbors(u).clone();
            s.intersect_with(&done);
            let d = self.graph.d_neighbors(u).clone();

            clique.push(u);
            self.c_cliques(&mut clique, p, d, s, &done);
            clique.pop();
            done.insert(u);
        }
    }

    /// Koch's recursion. `p` holds candidates c-adjacent to the clique, `d`
    /// vertices adjacent to every member but only through d-edges so far,
    /// `s` excluded vertices that would still extend the clique.
    fn c_cliques(
        &mut self,
        clique: &mut Vec<usize>,
        mut p: BitSet,
        d: BitSet,
        mut s: BitSet,
        done: &BitSet,
    ) {
        if self.out_of_time() {
            return;
        }
        if p.is_empty() {
            if s.is_empty() {
                self.report(clique);
            }
            return;
        }

        let candidates: Vec<usize> = p.iter().collect();
        for u in candidates {
            p.remove(u);
            let mut p2 = p.clone();
            let mut d2 = d.clone();
            let mut s2 = s.clone();

            // d-vertices that u connects become reachable
            for v in d.iter() {
                if self.graph.are_c_adjacent(u, v) {
                    if done.contains(v) {
                        s2.insert(v);
                    } else {
                        p2.insert(v);
                    }
                    d2.remove(v);
                }
            }

            let n = self.graph.neighbors(u);
            p2.intersect_with(&n);
            d2.intersect_with(&n);
            s2.intersect_with(&n);

            clique.push(u);
            self.c_cliques(clique, p2, d2, s2, done);
            clique.pop();
            if self.interrupted {
                return;
            }
            s.insert(u);
        }
    }

    fn bron_kerbosch(&mut self) {
        let neighbors: Vec<BitSet> = (0..self.graph.len())
            .map(|v| self.graph.neighbors(v))
            .collect();
        let p: BitSet = (0..self.graph.len()).collect();
        let mut clique = Vec::new();
        self.bk_pivot(&neighbors, &mut clique, p, BitSet::new());
    }

    fn bk_pivot(
        &mut self,
        neighbors: &[BitSet],
        clique: &mut Vec<usize>,
        mut p: BitSet,
        mut x: BitSet,
    ) {
        if self.out_of_time() {
            return;
        }
        if p.is_empty() {
            if x.is_empty() && !clique.is_empty() {
                self.report(clique);
            }
            return;
        }

        // Pivot on the vertex covering most candidates.
        let pivot = p
            .union(&x)
            .max_by_key(|u| neighbors[*u].intersection(&p).count())
            .unwrap_or(0);
        let candidates: Vec<usize> = p.difference(&neighbors[pivot]).collect();

        for v in candidates {
            let mut p2 = p.clone();
            p2.intersect_with(&neighbors[v]);
            let mut x2 = x.clone();
            x2.intersect_with(&neighbors[v]);

            clique.push(v);
            self.bk_pivot(neighbors, clique, p2, x2);
            clique.pop();
            if self.interrupted {
                return;
            }
            p.remove(v);
            x.insert(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::from_parts,
        matcher::{LabelEq, Relaxed},
    };

    fn sizes(outcome: &SearchOutcome) -> Vec<usize> {
        let mut sizes: Vec<usize> = outcome.mappings.iter().map(Mapping::len).collect();
        sizes.sort_unstable();
        sizes
    }

    #[test]
    fn path_in_longer_path() {
        let s = from_parts(vec!['a', 'b', 'c'], [(0, 1, ()), (1, 2, ())]).unwrap();
        let t = from_parts(vec!['a', 'b', 'c', 'd'], [(0, 1, ()), (1, 2, ()), (2, 3, ())]).unwrap();
        let out = CliqueEngine::default()
            .search(&s, &t, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(out.mappings.len(), 1);
        assert_eq!(
            out.mappings[0],
            Mapping::from_pairs([(0, 0), (1, 1), (2, 2)]).unwrap()
        );
        assert!(!out.reached_limit);
    }

    #[test]
    fn triangle_vs_path() {
        let tri = from_parts(vec!['x'; 3], [(0, 1, ()), (1, 2, ()), (0, 2, ())]).unwrap();
        let path = from_parts(vec!['x'; 3], [(0, 1, ()), (1, 2, ())]).unwrap();

        let strict = CliqueEngine::default()
            .search(&tri, &path, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(sizes(&strict).last(), Some(&2));

        let relaxed = CliqueEngine::default()
            .search(&tri, &path, &LabelEq, &Relaxed(LabelEq), Deadline::none())
            .unwrap();
        assert_eq!(sizes(&relaxed).last(), Some(&3));
    }

    #[test]
    fn connected_mode_keeps_fragments_apart() {
        // a-b c-d vs a-b c-d: two disjoint bonds
        let g = from_parts(vec!['a', 'b', 'c', 'd'], [(0, 1, ()), (2, 3, ())]).unwrap();

        let connected = CliqueEngine::new(CliqueMode::Connected)
            .search(&g, &g, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(sizes(&connected), vec![2, 2]);

        let disconnected = CliqueEngine::new(CliqueMode::Disconnected)
            .search(&g, &g, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(sizes(&disconnected), vec![4]);
    }

    #[test]
    fn no_compatible_pairs() {
        let s = from_parts(vec!['a'], Vec::<(usize, usize, ())>::new()).unwrap();
        let t = from_parts(vec!['b', 'c'], [(0, 1, ())]).unwrap();
        let out = CliqueEngine::default()
            .search(&s, &t, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert!(out.mappings.is_empty());
    }

    #[test]
    fn expired_deadline_is_reported() {
        let g = from_parts(vec!['x'; 4], [(0, 1, ()), (1, 2, ()), (2, 3, ())]).unwrap();
        let out = CliqueEngine::default()
            .search(&g, &g, &LabelEq, &LabelEq, Deadline::after(Some(Default::default())))
            .unwrap();
        assert!(out.reached_limit);
    }
}
