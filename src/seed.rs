//! Seed generation: the clique engine and the substructure matcher run side by
//! side on a small worker pool, and their largest mappings become the
//! starting points for extension.

use std::{
    collections::HashSet,
    panic::{catch_unwind, AssertUnwindSafe},
};

use rayon::{ThreadPool, ThreadPoolBuilder};
use tracing::{debug, info_span, warn, Dispatch};

use crate::{
    clique::CliqueEngine,
    config::{CliqueMode, Deadline},
    error::MatchError,
    graph::LabeledGraph,
    mapping::{Mapping, SearchOutcome},
    matcher::{EdgeMatcher, NodeMatcher},
    problem::MatchProblem,
    utils::{panic_message, with_dispatch},
    vf::SubstructureMatcher,
};

/// What the two seed searches produced.
#[derive(Debug, Clone, Default)]
pub struct SeedSet {
    seeds: Vec<Mapping>,
    found: Vec<Mapping>,
    vf_reached_limit: bool,
    clique_reached_limit: bool,
    failed_tasks: Vec<&'static str>,
}

impl SeedSet {
    fn collect(vf: Option<SearchOutcome>, cliques: Option<SearchOutcome>) -> Self {
        let mut set = SeedSet::default();
        if let Some(vf) = vf {
            set.vf_reached_limit = vf.reached_limit;
            set.found.extend(vf.mappings);
        }
        if let Some(cliques) = cliques {
            set.clique_reached_limit = cliques.reached_limit;
            set.found.extend(cliques.mappings);
        }

        let best = set.found.iter().map(Mapping::len).max().unwrap_or(0);
        let mut seen = HashSet::new();
        set.seeds = set
            .found
            .iter()
            .filter(|m| m.len() == best && seen.insert(*m))
            .cloned()
            .collect();
        set
    }

    /// Distinct mappings of the largest size either search reached.
    pub fn seeds(&self) -> &[Mapping] {
        &self.seeds
    }

    /// Every mapping either search produced, substructure matches first.
    pub fn found(&self) -> &[Mapping] {
        &self.found
    }

    /// Size of the seeds, 0 if there are none.
    pub fn size(&self) -> usize {
        self.seeds.first().map_or(0, Mapping::len)
    }

    pub fn is_empty(&self) -> bool {
        self.seeds.is_empty()
    }

    /// `true` if the substructure search stopped at its cap or deadline.
    pub fn vf_reached_limit(&self) -> bool {
        self.vf_reached_limit
    }

    /// `true` if clique enumeration stopped at the deadline.
    pub fn clique_reached_limit(&self) -> bool {
        self.clique_reached_limit
    }

    /// Tasks that failed and contributed nothing.
    pub fn failed_tasks(&self) -> &[&'static str] {
        &self.failed_tasks
    }

    /// `true` if mappings tied with the seeds may be missing. The clique
    /// search enumerates every tie unless it was cut short or failed, in
    /// which case only the capped substructure search is left.
    pub fn is_incomplete(&self, deadline: Deadline) -> bool {
        self.clique_reached_limit
            || (self.vf_reached_limit
                && (deadline.expired() || self.failed_tasks.contains(&"clique")))
    }
}

/// Runs clique enumeration and substructure search concurrently.
#[derive(Debug, Copy, Clone)]
pub struct SeedGenerator {
    cliques: CliqueEngine,
    substructure: SubstructureMatcher,
    pool_size: usize,
}

impl SeedGenerator {
    pub fn new(cliques: CliqueEngine, substructure: SubstructureMatcher, pool_size: usize) -> Self {
        Self {
            cliques,
            substructure,
            pool_size: pool_size.max(1),
        }
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Build the worker pool the seed searches run on, or `None` if the
    /// threads could not be spawned.
    pub fn build_pool(&self) -> Option<ThreadPool> {
        ThreadPoolBuilder::new()
            .num_threads(self.pool_size)
            .thread_name(|i| format!("atom-mapping-seed-{i}"))
            .build()
            .inspect_err(|e| {
                warn!("could not build worker pool ({e}); seed searches run in turn");
            })
            .ok()
    }

    /// Generate seeds for `source` and `target`.
    pub fn generate<N, E, M, B>(
        &self,
        source: &LabeledGraph<N, E>,
        target: &LabeledGraph<N, E>,
        nodes: &M,
        edges: &B,
        deadline: Deadline,
    ) -> Result<SeedSet, MatchError>
    where
        N: Sync,
        E: Sync,
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let problem = MatchProblem::new(source, target, nodes, edges)?;
        let pool = self.build_pool();
        self.run(&problem, deadline, None, pool.as_ref())
    }

    /// Run both searches on `pool`, or one after the other on the calling
    /// thread when there is none.
    pub(crate) fn run<N, E, M, B>(
        &self,
        problem: &MatchProblem<'_, N, E, M, B>,
        deadline: Deadline,
        diagnostics: Option<&Dispatch>,
        pool: Option<&ThreadPool>,
    ) -> Result<SeedSet, MatchError>
    where
        N: Sync,
        E: Sync,
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let clique_task =
            || guarded("clique", diagnostics, || Ok(self.cliques.run(problem, deadline)));
        let vf_task = || {
            guarded("substructure", diagnostics, || {
                self.substructure.run(problem, deadline)
            })
        };

        let (cliques, vf) = match pool {
            Some(pool) => pool.join(clique_task, vf_task),
            None => (clique_task(), vf_task()),
        };

        let mut failed = Vec::new();
        let mut vf = settle("substructure", vf, &mut failed)?;
        let cliques = settle("clique", cliques, &mut failed)?;

        // Embeddings need not be connected; in connected mode only those
        // forming one bonded fragment may seed.
        if let (CliqueMode::Connected, Some(vf)) = (self.cliques.mode(), vf.as_mut()) {
            let before = vf.mappings.len();
            vf.mappings.retain(|m| problem.is_bonded_fragment(m));
            if vf.mappings.len() < before {
                debug!(
                    "dropped {} disconnected substructure matches",
                    before - vf.mappings.len()
                );
            }
        }

        let mut set = SeedSet::collect(vf, cliques);
        set.failed_tasks = failed;
        debug!(
            "{} seeds of size {} from {} candidate mappings",
            set.seeds.len(),
            set.size(),
            set.found.len()
        );
        Ok(set)
    }
}

/// Run one seed task under the injected diagnostics, turning a panic into a
/// [`MatchError::Task`].
fn guarded(
    task: &'static str,
    diagnostics: Option<&Dispatch>,
    f: impl FnOnce() -> Result<SearchOutcome, MatchError>,
) -> Result<SearchOutcome, MatchError> {
    with_dispatch(diagnostics, || {
        let _span = info_span!("seed_task", task).entered();
        match catch_unwind(AssertUnwindSafe(f)) {
            Ok(result) => result,
            Err(payload) => Err(MatchError::Task {
                task,
                detail: panic_message(payload.as_ref()),
            }),
        }
    })
}

/// Keep a task's output, or log its failure and carry on without it.
/// Invariant violations are never swallowed.
fn settle(
    task: &'static str,
    result: Result<SearchOutcome, MatchError>,
    failed: &mut Vec<&'static str>,
) -> Result<Option<SearchOutcome>, MatchError> {
    match result {
        Ok(outcome) => Ok(Some(outcome)),
        Err(e @ MatchError::Invariant { .. }) => Err(e),
        Err(e) => {
            warn!("{e}; continuing with the other seed search");
            failed.push(task);
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::SolutionLimit, graph::from_parts, matcher::LabelEq};

    fn generator() -> SeedGenerator {
        SeedGenerator::new(
            CliqueEngine::default(),
            SubstructureMatcher::new(SolutionLimit::UpTo(10)),
            2,
        )
    }

    #[test]
    fn seeds_are_largest_and_distinct() {
        let s = from_parts(vec!['a', 'b', 'c'], [(0, 1, ()), (1, 2, ())]).unwrap();
        let t = from_parts(vec!['a', 'b', 'c', 'd'], [(0, 1, ()), (1, 2, ()), (2, 3, ())])
            .unwrap();
        let set = generator()
            .generate(&s, &t, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        // both searches find the same embedding
        assert_eq!(set.found().len(), 2);
        assert_eq!(set.seeds().len(), 1);
        assert_eq!(set.size(), 3);
        assert!(set.failed_tasks().is_empty());
    }

    #[test]
    fn clique_seeds_when_no_embedding() {
        let tri = from_parts(vec!['x'; 3], [(0, 1, ()), (1, 2, ()), (0, 2, ())]).unwrap();
        let path = from_parts(vec!['x'; 3], [(0, 1, ()), (1, 2, ())]).unwrap();
        let set = generator()
            .generate(&tri, &path, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(set.size(), 2);
        assert!(set.seeds().iter().all(|m| m.len() == 2));
    }

    #[test]
    fn connected_seeds_are_one_fragment() {
        // a-b c-d embeds into itself, but only one bond is a connected seed
        let g = from_parts(vec!['a', 'b', 'c', 'd'], [(0, 1, ()), (2, 3, ())]).unwrap();
        let set = generator()
            .generate(&g, &g, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(set.size(), 2);
        assert_eq!(set.seeds().len(), 2);

        let disconnected = SeedGenerator::new(
            CliqueEngine::new(CliqueMode::Disconnected),
            SubstructureMatcher::new(SolutionLimit::UpTo(10)),
            2,
        );
        let set = disconnected
            .generate(&g, &g, &LabelEq, &LabelEq, Deadline::none())
            .unwrap();
        assert_eq!(set.size(), 4);
    }

    #[test]
    fn shared_pool_and_calling_thread_agree() {
        let s = from_parts(vec!['x'; 3], [(0, 1, ()), (1, 2, ())]).unwrap();
        let t = from_parts(vec!['x'; 4], [(0, 1, ()), (1, 2, ()), (2, 3, ())]).unwrap();
        let problem = MatchProblem::new(&s, &t, &LabelEq, &LabelEq).unwrap();
        let generator = generator();
        let pool = generator.build_pool().unwrap();

        let first = generator
            .run(&problem, Deadline::none(), None, Some(&pool))
            .unwrap();
        let second = generator
            .run(&problem, Deadline::none(), None, Some(&pool))
            .unwrap();
        let inline = generator
            .run(&problem, Deadline::none(), None, None)
            .unwrap();
        assert_eq!(first.seeds(), second.seeds());
        assert_eq!(first.seeds(), inline.seeds());
        assert_eq!(first.size(), 3);
    }

    #[test]
    fn ties_are_incomplete_without_cliques() {
        let capped = || {
            Some(SearchOutcome {
                mappings: vec![Mapping::from_pairs([(0, 0)]).unwrap()],
                reached_limit: true,
            })
        };

        let mut set = SeedSet::collect(capped(), None);
        set.failed_tasks = vec!["clique"];
        assert!(set.is_incomplete(Deadline::none()));

        let set = SeedSet::collect(capped(), Some(SearchOutcome::default()));
        assert!(!set.is_incomplete(Deadline::none()));
        assert!(set.is_incomplete(Deadline::after(Some(Default::default()))));
    }

    #[test]
    fn panicking_task_is_logged_not_fatal() {
        let mut failed = Vec::new();
        let result = guarded("clique", None, || panic!("worker died"));
        let outcome = settle("clique", result, &mut failed).unwrap();
        assert!(outcome.is_none());
        assert_eq!(failed, vec!["clique"]);

        let set = SeedSet::collect(
            Some(SearchOutcome {
                mappings: vec![Mapping::from_pairs([(0, 0)]).unwrap()],
                reached_limit: false,
            }),
            outcome,
        );
        assert_eq!(set.seeds().len(), 1);
    }

    #[test]
    fn invariant_errors_propagate() {
        let mut failed = Vec::new();
        let result = Err(MatchError::invariant("test", "bad pair"));
        assert!(matches!(
            settle("substructure", result, &mut failed),
            Err(MatchError::Invariant { .. })
        ));
    }
}
