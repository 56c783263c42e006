//! The final, read-only answer of a match run.

use std::collections::HashSet;

use crate::mapping::Mapping;

static EMPTY: Mapping = Mapping::new();

/// Read access to the mappings a match run produced.
pub trait MappingQuery {
    /// Every distinct mapping of the maximum size reached, in the order the
    /// searches found them.
    fn all_mappings(&self) -> &[Mapping];

    /// The first mapping, or the empty mapping if there is none.
    fn first_mapping(&self) -> &Mapping;

    /// `true` iff some mapping covers every source node.
    fn is_subgraph(&self) -> bool;
}

/// Deduplicated maximum-size mappings between a source and a target graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResults {
    mappings: Vec<Mapping>,
    source_count: usize,
    target_count: usize,
    reached_limit: bool,
}

impl MatchResults {
    /// Pool `found` mappings and keep the distinct ones of maximum size.
    ///
    /// Empty mappings are dropped, so a run that found nothing yields no
    /// mappings at all rather than a single empty one.
    pub fn aggregate(
        found: impl IntoIterator<Item = Mapping>,
        source_count: usize,
        target_count: usize,
        reached_limit: bool,
    ) -> Self {
        let found: Vec<Mapping> = found.into_iter().filter(|m| !m.is_empty()).collect();
        let best = found.iter().map(Mapping::len).max().unwrap_or(0);

        let mut seen = HashSet::new();
        let mut mappings = Vec::new();
        for m in found {
            if m.len() == best && !seen.contains(&m) {
                seen.insert(m.clone());
                mappings.push(m);
            }
        }

        Self {
            mappings,
            source_count,
            target_count,
            reached_limit,
        }
    }

    /// Size of the largest mapping, 0 if none was found.
    pub fn max_size(&self) -> usize {
        self.mappings.first().map_or(0, Mapping::len)
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    pub fn source_count(&self) -> usize {
        self.source_count
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    /// `true` if some search stopped at its solution cap or at the deadline,
    /// so a larger or different mapping may have been missed.
    pub fn reached_limit(&self) -> bool {
        self.reached_limit
    }

    /// Tanimoto coefficient `|M| / (|S| + |T| - |M|)` over node counts.
    /// Two empty graphs are identical.
    pub fn tanimoto_similarity(&self) -> f64 {
        let common = self.max_size();
        let union = self.source_count + self.target_count - common;
        if union == 0 {
            1.0
        } else {
            common as f64 / union as f64
        }
    }

    /// Euclidean distance `sqrt(|S| + |T| - 2|M|)` over node counts.
    pub fn euclidean_distance(&self) -> f64 {
        let common = self.max_size();
        ((self.source_count + self.target_count - 2 * common) as f64).sqrt()
    }
}

impl MappingQuery for MatchResults {
    fn all_mappings(&self) -> &[Mapping] {
        &self.mappings
    }

    fn first_mapping(&self) -> &Mapping {
        self.mappings.first().unwrap_or(&EMPTY)
    }

    fn is_subgraph(&self) -> bool {
        !self.mappings.is_empty() && self.max_size() == self.source_count
    }
}
