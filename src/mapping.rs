//! Injective partial node mappings between a source and a target graph.

use std::collections::{BTreeMap, BTreeSet};

use petgraph::graph::{EdgeIndex, NodeIndex};
use thiserror::Error;

use crate::graph::{Index, LabeledGraph};

/// Thrown by [`Mapping::from_pairs`] when the pairs do not form an injective
/// function.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    #[error("source node {0} is mapped twice")]
    DuplicateSource(usize),
    #[error("target node {0} is the image of two source nodes")]
    DuplicateTarget(usize),
}

/// An injective partial function from source node indices to target node
/// indices.
///
/// Pairs are kept ordered by source index, so two mappings compare equal (and
/// hash equal) iff they contain exactly the same pairs. That ordered pair set
/// is the deduplication key used everywhere in the crate.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Mapping {
    pairs: BTreeMap<usize, usize>,
    images: BTreeSet<usize>,
}

impl Mapping {
    /// The empty mapping.
    pub const fn new() -> Self {
        Self {
            pairs: BTreeMap::new(),
            images: BTreeSet::new(),
        }
    }

    /// Build a mapping from `(source, target)` pairs, rejecting pairs that
    /// would make it non-injective.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (usize, usize)>,
    ) -> Result<Self, MappingError> {
        let mut mapping = Self::new();
        for (s, t) in pairs {
            mapping.insert(s, t)?;
        }
        Ok(mapping)
    }

    fn insert(&mut self, source: usize, target: usize) -> Result<(), MappingError> {
        if self.pairs.contains_key(&source) {
            return Err(MappingError::DuplicateSource(source));
        }
        if !self.images.insert(target) {
            return Err(MappingError::DuplicateTarget(target));
        }
        self.pairs.insert(source, target);
        Ok(())
    }

    /// Number of mapped pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Image of `source`, if mapped.
    pub fn get(&self, source: usize) -> Option<usize> {
        self.pairs.get(&source).copied()
    }

    pub fn contains_source(&self, source: usize) -> bool {
        self.pairs.contains_key(&source)
    }

    pub fn contains_target(&self, target: usize) -> bool {
        self.images.contains(&target)
    }

    /// Iterate over `(source, target)` pairs in increasing source order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.pairs.iter().map(|(s, t)| (*s, *t))
    }

    /// The same pairs with source and target swapped.
    pub fn inverse(&self) -> Mapping {
        Mapping {
            pairs: self.pairs.iter().map(|(s, t)| (*t, *s)).collect(),
            images: self.pairs.keys().copied().collect(),
        }
    }

    /// Return the bond mapping induced by this atom mapping: every source
    /// edge whose endpoints are both mapped onto the endpoints of a target
    /// edge, paired with that target edge.
    pub fn edge_pairs<N, E>(
        &self,
        source: &LabeledGraph<N, E>,
        target: &LabeledGraph<N, E>,
    ) -> Vec<(EdgeIndex<Index>, EdgeIndex<Index>)> {
        let mut out = Vec::new();
        for e in source.edge_indices() {
            let Some((u, v)) = source.edge_endpoints(e) else {
                continue;
            };
            let (Some(tu), Some(tv)) = (self.get(u.index()), self.get(v.index())) else {
                continue;
            };
            if tu >= target.node_count() || tv >= target.node_count() {
                continue;
            }
            if let Some(f) = target.find_edge(NodeIndex::new(tu), NodeIndex::new(tv)) {
                out.push((e, f));
            }
        }
        out
    }
}

/// What a single search component produced.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    /// Mappings found, in discovery order.
    pub mappings: Vec<Mapping>,
    /// `true` if the search stopped at its solution cap or its deadline
    /// before exhausting the search space.
    pub reached_limit: bool,
}
