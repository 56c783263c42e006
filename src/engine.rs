//! The match engine: one entry point that wires the searches together.
//!
//! In the subgraph modes only the substructure matcher runs. In MCS mode the
//! clique engine and the substructure matcher run concurrently to produce
//! seeds, the extension engine grows them, and the aggregator keeps the
//! largest distinct mappings.

use std::sync::{Arc, OnceLock};

use rayon::ThreadPool;
use tracing::{info, info_span, warn, Dispatch};

use crate::{
    clique::CliqueEngine,
    config::{Deadline, MatchConfig, MatchMode},
    error::MatchError,
    extend::ExtensionEngine,
    graph::LabeledGraph,
    mapping::Mapping,
    matcher::{AtomMatcher, BondMatcher, EdgeMatcher, NodeMatcher},
    molecule::Molecule,
    problem::MatchProblem,
    results::MatchResults,
    seed::SeedGenerator,
    utils::with_dispatch,
    vf::SubstructureMatcher,
};

/// Runs match queries under one [`MatchConfig`].
///
/// The engine holds no per-run state; one value can serve any number of
/// queries, from any number of threads. The seed worker pool is spawned on
/// the first MCS query and shared by clones of the engine.
#[derive(Debug, Clone)]
pub struct MatchEngine {
    config: MatchConfig,
    cliques: CliqueEngine,
    substructure: SubstructureMatcher,
    extension: ExtensionEngine,
    diagnostics: Option<Dispatch>,
    pool: OnceLock<Option<Arc<ThreadPool>>>,
}

impl MatchEngine {
    pub fn new(config: MatchConfig) -> Self {
        Self {
            cliques: CliqueEngine::new(config.clique_mode),
            substructure: SubstructureMatcher::new(config.vf_limit()),
            extension: ExtensionEngine::new(config.clique_mode),
            diagnostics: None,
            pool: OnceLock::new(),
            config,
        }
    }

    /// Send this engine's log events to `dispatch` instead of the global
    /// default, including events from worker threads.
    pub fn with_diagnostics(mut self, dispatch: Dispatch) -> Self {
        self.diagnostics = Some(dispatch);
        self
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Match `source` against `target`.
    ///
    /// Fails with [`MatchError::Input`] on malformed graphs and with
    /// [`MatchError::Invariant`] if a search produced an impossible mapping.
    /// A failed worker task is logged and the run completes without it.
    pub fn run<N, E, M, B>(
        &self,
        source: &LabeledGraph<N, E>,
        target: &LabeledGraph<N, E>,
        nodes: &M,
        edges: &B,
    ) -> Result<MatchResults, MatchError>
    where
        N: Sync,
        E: Sync,
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        with_dispatch(self.diagnostics.as_ref(), || -> Result<MatchResults, MatchError> {
            let _span = info_span!("match", mode = ?self.config.mode).entered();
            let problem = MatchProblem::new(source, target, nodes, edges)?;
            info!(
                "matching {} source nodes against {} target nodes",
                problem.source().node_count(),
                problem.target().node_count()
            );

            let deadline = Deadline::after(self.config.time_limit);
            let results = match self.config.mode {
                MatchMode::FirstSubgraph | MatchMode::AllSubgraphs => {
                    self.subgraphs(&problem, deadline)?
                }
                MatchMode::Mcs => self.mcs(&problem, deadline)?,
            };

            info!(
                "found {} mappings of size {}{}",
                results.len(),
                results.max_size(),
                if results.reached_limit() {
                    " (search limit reached)"
                } else {
                    ""
                }
            );
            Ok(results)
        })
    }

    fn subgraphs<N, E, M, B>(
        &self,
        problem: &MatchProblem<'_, N, E, M, B>,
        deadline: Deadline,
    ) -> Result<MatchResults, MatchError>
    where
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let outcome = self.substructure.run(problem, deadline)?;
        Ok(MatchResults::aggregate(
            outcome.mappings,
            problem.source().node_count(),
            problem.target().node_count(),
            outcome.reached_limit,
        ))
    }

    fn mcs<N, E, M, B>(
        &self,
        problem: &MatchProblem<'_, N, E, M, B>,
        deadline: Deadline,
    ) -> Result<MatchResults, MatchError>
    where
        N: Sync,
        E: Sync,
        M: NodeMatcher<N>,
        B: EdgeMatcher<E>,
    {
        let generator =
            SeedGenerator::new(self.cliques, self.substructure, self.config.pool_size());
        let pool = self
            .pool
            .get_or_init(|| generator.build_pool().map(Arc::new));
        let seeds = generator.run(
            problem,
            deadline,
            self.diagnostics.as_ref(),
            pool.as_deref(),
        )?;

        // Extension is skipped once the seeds cover the smaller graph, so the
        // seeds must then hold every tie.
        let mut reached_limit = seeds.is_incomplete(deadline);

        let mut found: Vec<Mapping> = seeds.found().to_vec();
        if seeds.size() < problem.max_possible() || seeds.is_empty() {
            let starts: Vec<Mapping> = if seeds.is_empty() && !seeds.failed_tasks().is_empty() {
                warn!("no seeds after failed tasks; extending from scratch");
                vec![Mapping::new()]
            } else {
                seeds.seeds().to_vec()
            };
            let extended = self.extension.run(problem, &starts, deadline)?;
            reached_limit |= extended.reached_limit;
            found.extend(extended.mappings);
        }

        Ok(MatchResults::aggregate(
            found,
            problem.source().node_count(),
            problem.target().node_count(),
            reached_limit,
        ))
    }
}

impl Default for MatchEngine {
    fn default() -> Self {
        Self::new(MatchConfig::default())
    }
}

/// Match two molecules by element and bond order under `config`.
pub fn map_molecules(
    source: &Molecule,
    target: &Molecule,
    config: MatchConfig,
) -> Result<MatchResults, MatchError> {
    MatchEngine::new(config).run(
        source.graph(),
        target.graph(),
        &AtomMatcher::default(),
        &BondMatcher::default(),
    )
}
