//! Configuration for a match run.
//!
//! A [`MatchConfig`] picks what to look for ([`MatchMode`]), how the clique
//! search treats disconnected mappings ([`CliqueMode`]), and the caps that
//! bound the backtracking searches. The defaults reproduce the classic
//! behavior: MCS mode, connected cliques, ten VF seeds, no wall-clock limit,
//! and a worker pool of `max(1, min(2, cores - 1))` threads.

use std::time::{Duration, Instant};

use clap::ValueEnum;

/// What a match run looks for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum MatchMode {
    /// Stop at the first embedding of the smaller graph into the larger one.
    FirstSubgraph,
    /// Enumerate embeddings of the smaller graph into the larger one.
    AllSubgraphs,
    /// Find the maximum common subgraph.
    Mcs,
}

/// Which maximal cliques of the compatibility graph count as mappings.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum CliqueMode {
    /// Cliques must be connected through bonded (c-edge) pairs, so every
    /// mapping is one connected common fragment (Koch's c-cliques).
    Connected,
    /// Any set of pairwise consistent pairs, so a mapping may consist of
    /// several disconnected fragments.
    Disconnected,
}

/// How many solutions a backtracking search may collect.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SolutionLimit {
    First,
    UpTo(usize),
    Unbounded,
}

impl SolutionLimit {
    /// Return `true` once `found` solutions exhaust this limit.
    pub fn is_reached(&self, found: usize) -> bool {
        match self {
            SolutionLimit::First => found >= 1,
            SolutionLimit::UpTo(n) => found >= *n,
            SolutionLimit::Unbounded => false,
        }
    }
}

/// Global search configuration.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub mode: MatchMode,
    pub clique_mode: CliqueMode,
    /// Cap on VF solutions used as MCS seeds.
    pub seed_limit: usize,
    /// Cap on embeddings in [`MatchMode::AllSubgraphs`]; `None` is unbounded.
    pub subgraph_limit: Option<usize>,
    /// Wall-clock budget for the whole run; `None` waits for every search to
    /// finish.
    pub time_limit: Option<Duration>,
    /// Worker pool size; `None` uses `max(1, min(2, cores - 1))`.
    pub threads: Option<usize>,
}

impl MatchConfig {
    pub fn new(mode: MatchMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_clique_mode(mut self, clique_mode: CliqueMode) -> Self {
        self.clique_mode = clique_mode;
        self
    }

    pub fn with_seed_limit(mut self, seed_limit: usize) -> Self {
        self.seed_limit = seed_limit;
        self
    }

    pub fn with_subgraph_limit(mut self, limit: usize) -> Self {
        self.subgraph_limit = Some(limit);
        self
    }

    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Solution cap for the VF matcher under this configuration.
    pub fn vf_limit(&self) -> SolutionLimit {
        match self.mode {
            MatchMode::FirstSubgraph => SolutionLimit::First,
            MatchMode::AllSubgraphs => self
                .subgraph_limit
                .map_or(SolutionLimit::Unbounded, SolutionLimit::UpTo),
            MatchMode::Mcs => SolutionLimit::UpTo(self.seed_limit.max(1)),
        }
    }

    /// Size of the worker pool that runs the clique and VF searches.
    pub fn pool_size(&self) -> usize {
        match self.threads {
            Some(n) => n.max(1),
            None => {
                let cores = std::thread::available_parallelism().map_or(1, |n| n.get());
                cores.saturating_sub(1).clamp(1, 2)
            }
        }
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            mode: MatchMode::Mcs,
            clique_mode: CliqueMode::Connected,
            seed_limit: 10,
            subgraph_limit: None,
            time_limit: None,
            threads: None,
        }
    }
}

/// A cooperative wall-clock bound shared by every search of one run.
///
/// Searches poll [`Deadline::expired`] between steps and wind down when it
/// returns `true`, keeping what they found so far.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Deadline {
    at: Option<Instant>,
}

impl Deadline {
    /// A deadline that never expires.
    pub fn none() -> Self {
        Self { at: None }
    }

    /// A deadline `limit` from now, or none.
    pub fn after(limit: Option<Duration>) -> Self {
        Self {
            at: limit.map(|d| Instant::now() + d),
        }
    }

    pub fn expired(&self) -> bool {
        self.at.is_some_and(|at| Instant::now() >= at)
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vf_limit_follows_mode() {
        assert_eq!(MatchConfig::new(MatchMode::FirstSubgraph).vf_limit(), SolutionLimit::First);
        assert_eq!(
            MatchConfig::new(MatchMode::AllSubgraphs).vf_limit(),
            SolutionLimit::Unbounded
        );
        assert_eq!(
            MatchConfig::new(MatchMode::AllSubgraphs)
                .with_subgraph_limit(3)
                .vf_limit(),
            SolutionLimit::UpTo(3)
        );
        assert_eq!(MatchConfig::default().vf_limit(), SolutionLimit::UpTo(10));
    }

    #[test]
    fn pool_is_small() {
        let size = MatchConfig::default().pool_size();
        assert!((1..=2).contains(&size));
        assert_eq!(MatchConfig::default().with_threads(0).pool_size(), 1);
    }

    #[test]
    fn deadlines() {
        assert!(!Deadline::none().expired());
        assert!(Deadline::after(Some(Duration::ZERO)).expired());
        assert!(!Deadline::after(Some(Duration::from_secs(3600))).expired());
    }
}
