//! VF-style backtracking search for embeddings of one graph into another.
//!
//! The smaller graph is always the query and the larger one the data graph;
//! returned mappings are translated back to source-to-target order. Under a
//! [`Topology::Strict`] edge matcher an embedding must preserve adjacency in
//! both directions (an induced subgraph), and the usual VF look-ahead rules
//! on frontier and remainder sizes prune the search. Under
//! [`Topology::NodeOnly`] any injective, label-compatible assignment of every
//! query node is an embedding.

use tracing::{debug, trace, warn};

use crate::{
    config::{Deadline, SolutionLimit},
    error::MatchError,
    graph::LabeledGraph,
    mapping::{Mapping, SearchOutcome},
    matcher::{EdgeMatcher, NodeMatcher, Topology},
    problem::{MatchProblem, Oriented},
};

const STAGE: &str = "substructure search";

/// Finds complete embeddings of the smaller input graph into the larger one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SubstructureMatcher {
    limit: SolutionLimit,
}

impl SubstructureMatcher {
    pub fn new(limit: SolutionLimit) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> SolutionLimit {
        self.limit
    }

    /// Search for embeddings between `source` and `target`.
    ///
    /// The outcome's `reached_limit` is set when the search stopped at its
    /// solution cap or at `deadline`, in which case it may have missed some.
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
        self.run(&problem, deadline)
    }

    pub(crate) fn run<N, E, M, B>(
        &self,
        problem: &MatchProblem<'_, N, E, M, B>,
        deadline: Deadline,
    ) -> Result<SearchOutcome, MatchError>
    where
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let mut state = VfState::new(problem.smaller_first(), self.limit, deadline);
        state.explore()?;

        if state.timed_out {
            warn!("substructure search stopped at deadline");
        }
        debug!(
            "substructure search found {} embeddings (swapped: {}, limit reached: {})",
            state.found.len(),
            state.oriented.is_swapped(),
            state.stopped
        );
        Ok(SearchOutcome {
            mappings: state.found,
            reached_limit: state.stopped,
        })
    }
}

impl Default for SubstructureMatcher {
    fn default() -> Self {
        Self::new(SolutionLimit::First)
    }
}

struct VfState<'p, 'a, N, E, M, B> {
    oriented: Oriented<'p, 'a, N, E, M, B>,
    query_map: Vec<Option<usize>>,
    data_map: Vec<Option<usize>>,
    query_depths: Vec<Option<usize>>,
    data_depths: Vec<Option<usize>>,
    depth: usize,
    limit: SolutionLimit,
    deadline: Deadline,
    found: Vec<Mapping>,
    stopped: bool,
    timed_out: bool,
}

impl<'p, 'a, N, E, M, B> VfState<'p, 'a, N, E, M, B>
where
    M: NodeMatcher<N>,
    B: EdgeMatcher<E>,
{
    fn new(
        oriented: Oriented<'p, 'a, N, E, M, B>,
        limit: SolutionLimit,
        deadline: Deadline,
    ) -> Self {
        let n_query = oriented.query().node_count();
        let n_data = oriented.data().node_count();
        VfState {
            oriented,
            query_map: vec![None; n_query],
            data_map: vec![None; n_data],
            query_depths: vec![None; n_query],
            data_depths: vec![None; n_data],
            depth: 0,
            limit,
            deadline,
            found: Vec::new(),
            stopped: false,
            timed_out: false,
        }
    }

    fn strict(&self) -> bool {
        self.oriented.topology() == Topology::Strict
    }

    fn is_feasible(&self, q: usize, d: usize) -> bool {
        if !self.oriented.nodes_match(q, d) {
            return false;
        }
        if !self.strict() {
            return true;
        }
        self.core_rule(q, d) && self.look_ahead_rule(q, d)
    }

    /// Every mapped neighbor on either side must stay consistently linked.
    fn core_rule(&self, q: usize, d: usize) -> bool {
        let query = self.oriented.query();
        let data = self.oriented.data();

        for &qn in query.neighbors(q) {
            if let Some(dn) = self.query_map[qn] {
                if self.oriented.link((q, d), (qn, dn)).is_none() {
                    return false;
                }
            }
        }
        for &dn in data.neighbors(d) {
            if let Some(qn) = self.data_map[dn] {
                if self.oriented.link((q, d), (qn, dn)).is_none() {
                    return false;
                }
            }
        }
        true
    }

    /// The data node needs at least as many unmapped neighbors as the query
    /// node, both inside the frontier and beyond it.
    fn look_ahead_rule(&self, q: usize, d: usize) -> bool {
        let (q_frontier, q_new) = Self::unmapped_neighbors(
            self.oriented.query().neighbors(q),
            &self.query_map,
            &self.query_depths,
        );
        let (d_frontier, d_new) = Self::unmapped_neighbors(
            self.oriented.data().neighbors(d),
            &self.data_map,
            &self.data_depths,
        );
        q_frontier <= d_frontier && q_new <= d_new
    }

    fn unmapped_neighbors(
        neighbors: &[usize],
        map: &[Option<usize>],
        depths: &[Option<usize>],
    ) -> (usize, usize) {
        let mut frontier = 0;
        let mut new = 0;
        for &n in neighbors {
            if map[n].is_none() {
                if depths[n].is_some() {
                    frontier += 1;
                } else {
                    new += 1;
                }
            }
        }
        (frontier, new)
    }

    fn push_mapping(&mut self, q: usize, d: usize) {
        self.query_map[q] = Some(d);
        self.data_map[d] = Some(q);
        self.depth += 1;

        if self.query_depths[q].is_none() {
            self.query_depths[q] = Some(self.depth);
        }
        if self.data_depths[d].is_none() {
            self.data_depths[d] = Some(self.depth);
        }

        for &n in self.oriented.query().neighbors(q) {
            if self.query_map[n].is_none() && self.query_depths[n].is_none() {
                self.query_depths[n] = Some(self.depth);
            }
        }
        for &n in self.oriented.data().neighbors(d) {
            if self.data_map[n].is_none() && self.data_depths[n].is_none() {
                self.data_depths[n] = Some(self.depth);
            }
        }
    }

    fn pop_mapping(&mut self, q: usize, d: usize) {
        self.query_map[q] = None;
        self.data_map[d] = None;
        let depth = self.depth;
        for slot in self.query_depths.iter_mut() {
            if slot.is_some_and(|t| t >= depth) {
                *slot = None;
            }
        }
        for slot in self.data_depths.iter_mut() {
            if slot.is_some_and(|t| t >= depth) {
                *slot = None;
            }
        }
        self.depth -= 1;
    }

    fn generate_pairs(&self) -> Vec<(usize, usize)> {
        if self.strict() {
            let query_frontier = (0..self.query_map.len())
                .find(|&i| self.query_map[i].is_none() && self.query_depths[i].is_some());
            if let Some(q) = query_frontier {
                // An empty data frontier leaves q nowhere to go.
                return (0..self.data_map.len())
                    .filter(|&j| self.data_map[j].is_none() && self.data_depths[j].is_some())
                    .map(|j| (q, j))
                    .collect();
            }
        }

        let Some(q) = (0..self.query_map.len()).find(|&i| self.query_map[i].is_none()) else {
            return Vec::new();
        };
        (0..self.data_map.len())
            .filter(|&j| self.data_map[j].is_none())
            .map(|j| (q, j))
            .collect()
    }

    fn record(&mut self) -> Result<(), MatchError> {
        let pairs = self
            .query_map
            .iter()
            .enumerate()
            .map(|(q, d)| {
                d.map(|d| (q, d)).ok_or_else(|| {
                    MatchError::invariant(STAGE, format!("query node {q} unmapped at full depth"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let mapping = self
            .oriented
            .to_mapping(pairs)
            .map_err(|e| MatchError::invariant(STAGE, e.to_string()))?;
        trace!("embedding {:?}", mapping);
        self.found.push(mapping);
        if self.limit.is_reached(self.found.len()) {
            self.stopped = true;
        }
        Ok(())
    }

    fn explore(&mut self) -> Result<(), MatchError> {
        if self.deadline.expired() {
            self.stopped = true;
            self.timed_out = true;
            return Ok(());
        }
        if self.depth == self.query_map.len() {
            return self.record();
        }

        for (q, d) in self.generate_pairs() {
            if self.is_feasible(q, d) {
                self.push_mapping(q, d);
                let result = self.explore();
                self.pop_mapping(q, d);
                result?;
                if self.stopped {
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        graph::from_parts,
        matcher::{LabelEq, Relaxed},
    };

    fn path(labels: &str) -> LabeledGraph<char, ()> {
        let nodes: Vec<char> = labels.chars().collect();
        let edges: Vec<_> = (1..nodes.len()).map(|i| (i - 1, i, ())).collect();
        from_parts(nodes, edges).unwrap()
    }

    #[test]
    fn finds_embedded_path() {
        let s = path("abc");
        let t = path("abcd");
        let out = SubstructureMatcher::default()
            .search(&s, &t, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(
            out.mappings,
            vec![Mapping::from_pairs([(0, 0), (1, 1), (2, 2)]).unwrap()]
        );
        assert!(out.reached_limit);
    }

    #[test]
    fn swapped_search_is_inverted() {
        let s = path("xabc");
        let t = path("abc");
        let out = SubstructureMatcher::new(SolutionLimit::Unbounded)
            .search(&s, &t, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(
            out.mappings,
            vec![Mapping::from_pairs([(1, 0), (2, 1), (3, 2)]).unwrap()]
        );
        assert!(!out.reached_limit);
    }

    #[test]
    fn counts_symmetric_embeddings() {
        // a 3-node path maps onto a 4-node path in 2 positions x 2 directions
        let s = path("xxx");
        let t = path("xxxx");
        let out = SubstructureMatcher::new(SolutionLimit::Unbounded)
            .search(&s, &t, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(out.mappings.len(), 4);

        let capped = SubstructureMatcher::new(SolutionLimit::UpTo(3))
            .search(&s, &t, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(capped.mappings.len(), 3);
        assert!(capped.reached_limit);
    }

    #[test]
    fn embeddings_are_induced() {
        let tri = from_parts(vec!['x'; 3], [(0, 1, ()), (1, 2, ()), (0, 2, ())]).unwrap();
        let p = path("xxx");
        let strict = SubstructureMatcher::default()
            .search(&tri, &p, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert!(strict.mappings.is_empty());

        let relaxed = SubstructureMatcher::default()
            .search(&tri, &p, &LabelEq, &Relaxed(LabelEq), Deadline::none())
            .unwrap();
        assert_eq!(relaxed.mappings.len(), 1);
        assert_eq!(relaxed.mappings[0].len(), 3);
    }

    #[test]
    fn empty_query_has_one_empty_embedding() {
        let s = path("");
        let t = path("ab");
        let out = SubstructureMatcher::default()
            .search(&s, &t, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(out.mappings, vec![Mapping::new()]);
    }

    #[test]
    fn disconnected_query() {
        // a b (no bond) into a-x-b
        let s = from_parts(vec!['a', 'b'], Vec::<(usize, usize, ())>::new()).unwrap();
        let t = from_parts(vec!['a', 'x', 'b'], [(0, 1, ()), (1, 2, ())]).unwrap();
        let out = SubstructureMatcher::default()
            .search(&s, &t, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(out.mappings, vec![Mapping::from_pairs([(0, 0), (1, 2)]).unwrap()]);
    }

    #[test]
    fn expired_deadline_stops_search() {
        let s = path("xxx");
        let out = SubstructureMatcher::default()
            .search(&s, &s, &LabelEq, &LabelEq, Deadline::after(Some(Default::default())))
            .unwrap();
        assert!(out.mappings.is_empty());
        assert!(out.reached_limit);
    }
}
