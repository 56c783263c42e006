//! Errors raised while matching two graphs.

use std::fmt::Display;

use thiserror::Error;

use crate::graph::GraphError;

/// Which of the two input graphs an error refers to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    Source,
    Target,
}

impl Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Source => write!(f, "source"),
            Side::Target => write!(f, "target"),
        }
    }
}

/// Failure of a match run.
///
/// `Input` is raised before any search starts. `Invariant` means one of the
/// search components produced an impossible mapping and is always propagated
/// to the caller. `Task` describes a worker task that died; the scheduler logs
/// it and carries on with the other task's output, so callers of
/// [`crate::engine::MatchEngine::run`] only see it if they drive the
/// components themselves.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("malformed {side} graph: {source}")]
    Input { side: Side, source: GraphError },

    #[error("mapping invariant violated in {stage}: {detail}")]
    Invariant { stage: &'static str, detail: String },

    #[error("{task} task failed: {detail}")]
    Task { task: &'static str, detail: String },
}

impl MatchError {
    pub(crate) fn invariant(stage: &'static str, detail: impl Into<String>) -> Self {
        MatchError::Invariant {
            stage,
            detail: detail.into(),
        }
    }
}
