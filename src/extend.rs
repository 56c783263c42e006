//! McGregor-style extension of seed mappings.
//!
//! Starting from each seed, the engine repeatedly adds one more node pair
//! that is label-compatible, unused on both sides and consistently linked to
//! every pair already present. Every admissible pair is tried; a mapping that
//! admits none is maximal and recorded. Branches whose best possible size is
//! below the largest mapping recorded so far are cut, so only mappings that
//! can tie or beat the current best are produced.

use std::collections::HashSet;

use bit_set::BitSet;
use tracing::{debug, trace, warn};

use crate::{
    config::{CliqueMode, Deadline},
    error::MatchError,
    graph::LabeledGraph,
    mapping::{Mapping, SearchOutcome},
    matcher::{EdgeMatcher, NodeMatcher},
    problem::{Link, MatchProblem, Oriented},
};

const STAGE: &str = "extension";

/// Grows seed mappings into maximal ones.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ExtensionEngine {
    mode: CliqueMode,
}

impl ExtensionEngine {
    /// In [`CliqueMode::Connected`] a new pair must be bonded to a pair
    /// already in the mapping; in [`CliqueMode::Disconnected`] any
    /// consistent pair may be added.
    pub fn new(mode: CliqueMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> CliqueMode {
        self.mode
    }

    /// Extend every mapping in `seeds` between `source` and `target`.
    ///
    /// Fails with [`MatchError::Invariant`] if a seed names a node outside
    /// the graphs or pairs that could never be mapped together.
    pub fn extend<N, E, M, B>(
        &self,
        source: &LabeledGraph<N, E>,
        target: &LabeledGraph<N, E>,
        nodes: &M,
        edges: &B,
        seeds: &[Mapping],
        deadline: Deadline,
    ) -> Result<SearchOutcome, MatchError>
    where
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let problem = MatchProblem::new(source, target, nodes, edges)?;
        self.run(&problem, seeds, deadline)
    }

    pub(crate) fn run<N, E, M, B>(
        &self,
        problem: &MatchProblem<'_, N, E, M, B>,
        seeds: &[Mapping],
        deadline: Deadline,
    ) -> Result<SearchOutcome, MatchError>
    where
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let oriented = problem.smaller_first();
        let mut growth = Growth::new(oriented, self.mode == CliqueMode::Connected, deadline);

        for seed in seeds {
            let pairs = growth.validate(seed)?;
            growth.start(pairs);
            if growth.interrupted {
                warn!("extension stopped at deadline");
                break;
            }
        }

        let mut mappings = Vec::with_capacity(growth.found.len());
        for pairs in growth.found {
            let mapping = growth
                .oriented
                .to_mapping(pairs)
                .map_err(|e| MatchError::invariant(STAGE, e.to_string()))?;
            mappings.push(mapping);
        }
        debug!(
            "extension grew {} seeds into {} mappings (best size {})",
            seeds.len(),
            mappings.len(),
            growth.best
        );
        Ok(SearchOutcome {
            mappings,
            reached_limit: growth.interrupted,
        })
    }
}

impl Default for ExtensionEngine {
    fn default() -> Self {
        Self::new(CliqueMode::Connected)
    }
}

struct Growth<'p, 'a, N, E, M, B> {
    oriented: Oriented<'p, 'a, N, E, M, B>,
    connected: bool,
    deadline: Deadline,
    pairs: Vec<(usize, usize)>,
    query_used: BitSet,
    data_used: BitSet,
    visited: HashSet<Vec<(usize, usize)>>,
    found: Vec<Vec<(usize, usize)>>,
    best: usize,
    interrupted: bool,
}

impl<'p, 'a, N, E, M, B> Growth<'p, 'a, N, E, M, B>
where
    M: NodeMatcher<N>,
    B: EdgeMatcher<E>,
{
    fn new(oriented: Oriented<'p, 'a, N, E, M, B>, connected: bool, deadline: Deadline) -> Self {
        let n_query = oriented.query().node_count();
        let n_data = oriented.data().node_count();
        Growth {
            oriented,
            connected,
            deadline,
            pairs: Vec::new(),
            query_used: BitSet::with_capacity(n_query),
            data_used: BitSet::with_capacity(n_data),
            visited: HashSet::new(),
            found: Vec::new(),
            best: 0,
            interrupted: false,
        }
    }

    /// Check that `seed` is a consistent mapping and return its pairs in
    /// query/data order.
    fn validate(&self, seed: &Mapping) -> Result<Vec<(usize, usize)>, MatchError> {
        let n_source = self.oriented.source_count();
        let n_target = self.oriented.target_count();
        for (s, t) in seed.iter() {
            if s >= n_source || t >= n_target {
                return Err(MatchError::invariant(
                    STAGE,
                    format!("seed pair ({s}, {t}) names a node outside the graphs"),
                ));
            }
        }

        let pairs = self.oriented.pairs_of(seed);
        for (i, &(q, d)) in pairs.iter().enumerate() {
            if !self.oriented.nodes_match(q, d) {
                return Err(MatchError::invariant(
                    STAGE,
                    format!("seed maps query {q} onto data {d} despite incompatible labels"),
                ));
            }
            for &other in &pairs[..i] {
                if self.oriented.link((q, d), other).is_none() {
                    return Err(MatchError::invariant(
                        STAGE,
                        format!("seed pairs ({q}, {d}) and {other:?} conflict"),
                    ));
                }
            }
        }
        Ok(pairs)
    }

    fn start(&mut self, pairs: Vec<(usize, usize)>) {
        let mut key = pairs.clone();
        key.sort_unstable();
        if !self.visited.insert(key) {
            trace!("seed already explored");
            return;
        }

        self.query_used.clear();
        self.data_used.clear();
        for &(q, d) in &pairs {
            self.query_used.insert(q);
            self.data_used.insert(d);
        }
        self.pairs = pairs;
        self.grow();
    }

    /// Pairs that may join the current mapping.
    fn admissible(&self) -> Vec<(usize, usize)> {
        let n_query = self.oriented.query().node_count();
        let n_data = self.oriented.data().node_count();
        let mut out = Vec::new();

        for q in (0..n_query).filter(|q| !self.query_used.contains(*q)) {
            for d in (0..n_data).filter(|d| !self.data_used.contains(*d)) {
                if !self.oriented.nodes_match(q, d) {
                    continue;
                }
                let mut bonded = false;
                let mut consistent = true;
                for &p in &self.pairs {
                    match self.oriented.link((q, d), p) {
                        Some(Link::Bonded) => bonded = true,
                        Some(Link::Unbonded) => (),
                        None => {
                            consistent = false;
                            break;
                        }
                    }
                }
                if consistent && (!self.connected || bonded || self.pairs.is_empty()) {
                    out.push((q, d));
                }
            }
        }
        out
    }

    fn record(&mut self) {
        if self.pairs.len() < self.best {
            return;
        }
        self.best = self.pairs.len();
        let mut pairs = self.pairs.clone();
        pairs.sort_unstable();
        self.found.push(pairs);
    }

    fn grow(&mut self) {
        if self.deadline.expired() {
            self.interrupted = true;
            self.record();
            return;
        }

        let candidates = self.admissible();
        if candidates.is_empty() {
            self.record();
            return;
        }

        // Each remaining node takes part in at most one more pair.
        let queries: BitSet = candidates.iter().map(|(q, _)| *q).collect();
        let data: BitSet = candidates.iter().map(|(_, d)| *d).collect();
        if self.pairs.len() + queries.len().min(data.len()) < self.best {
            return;
        }

        for (q, d) in candidates {
            self.pairs.push((q, d));
            let mut key = self.pairs.clone();
            key.sort_unstable();
            if self.visited.insert(key) {
                self.query_used.insert(q);
                self.data_used.insert(d);
                self.grow();
                self.query_used.remove(q);
                self.data_used.remove(d);
            }
            self.pairs.pop();
            if self.interrupted {
                return;
            }
        }
    }
}
