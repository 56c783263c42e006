//! Node and edge compatibility predicates.
//!
//! The engine never looks inside labels. It only asks a [`NodeMatcher`]
//! whether a source node may be paired with a target node, and an
//! [`EdgeMatcher`] whether a source edge may be paired with a target edge.
//! Arguments always come in `(source, target)` order, even when a search runs
//! with the two graphs swapped, so asymmetric (query-style) matchers behave.
//!
//! Any `Fn(&L, &L) -> bool + Sync` closure is a matcher. The types below cover
//! the usual cases: exact labels, wildcards, and the chemistry variants with
//! charge, ring and bond-order sensitivity.

use clap::ValueEnum;

use crate::molecule::{Atom, Bond, BondOrder};

/// How strictly edges constrain a mapping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, ValueEnum)]
pub enum Topology {
    /// Two mapped pairs must agree on adjacency: either both graphs have an
    /// edge between them (and the edges match) or neither does.
    Strict,
    /// Edges never rule a pair of pairs out. Matching edges still count as
    /// bonded for connectivity, everything else is treated as unbonded.
    NodeOnly,
}

/// Decides whether a source node label may map onto a target node label.
pub trait NodeMatcher<N>: Sync {
    fn matches(&self, source: &N, target: &N) -> bool;
}

/// Decides whether a source edge label may map onto a target edge label.
pub trait EdgeMatcher<E>: Sync {
    fn matches(&self, source: &E, target: &E) -> bool;

    /// How edges constrain the mapping as a whole.
    fn topology(&self) -> Topology {
        Topology::Strict
    }
}

impl<N, F> NodeMatcher<N> for F
where
    F: Fn(&N, &N) -> bool + Sync,
{
    fn matches(&self, source: &N, target: &N) -> bool {
        self(source, target)
    }
}

impl<E, F> EdgeMatcher<E> for F
where
    F: Fn(&E, &E) -> bool + Sync,
{
    fn matches(&self, source: &E, target: &E) -> bool {
        self(source, target)
    }
}

/// Labels must be equal.
#[derive(Debug, Copy, Clone, Default)]
pub struct LabelEq;

impl<L: PartialEq> NodeMatcher<L> for LabelEq {
    fn matches(&self, source: &L, target: &L) -> bool {
        source == target
    }
}

impl<L: PartialEq> EdgeMatcher<L> for LabelEq {
    fn matches(&self, source: &L, target: &L) -> bool {
        source == target
    }
}

/// Every label matches every other label.
#[derive(Debug, Copy, Clone, Default)]
pub struct AnyLabel;

impl<L> NodeMatcher<L> for AnyLabel {
    fn matches(&self, _: &L, _: &L) -> bool {
        true
    }
}

impl<L> EdgeMatcher<L> for AnyLabel {
    fn matches(&self, _: &L, _: &L) -> bool {
        true
    }
}

/// Wrap an edge matcher so that edges become a soft constraint
/// ([`Topology::NodeOnly`]).
#[derive(Debug, Copy, Clone, Default)]
pub struct Relaxed<B>(pub B);

impl<E, B: EdgeMatcher<E>> EdgeMatcher<E> for Relaxed<B> {
    fn matches(&self, source: &E, target: &E) -> bool {
        self.0.matches(source, target)
    }

    fn topology(&self) -> Topology {
        Topology::NodeOnly
    }
}

/// Atom compatibility with optional charge, ring and aromaticity
/// sensitivity.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AtomMatcher {
    any_element: bool,
    charge: bool,
    ring: bool,
    aromatic: bool,
}

impl AtomMatcher {
    /// Atoms match iff their elements are equal.
    pub fn element() -> Self {
        Self {
            any_element: false,
            charge: false,
            ring: false,
            aromatic: false,
        }
    }

    /// Query atom: matches any element.
    pub fn any() -> Self {
        Self {
            any_element: true,
            ..Self::element()
        }
    }

    /// Also require equal formal charges.
    pub fn charge_sensitive(mut self) -> Self {
        self.charge = true;
        self
    }

    /// Also require equal ring membership.
    pub fn ring_sensitive(mut self) -> Self {
        self.ring = true;
        self
    }

    /// Aromatic atoms only match aromatic atoms.
    pub fn aromatic_sensitive(mut self) -> Self {
        self.aromatic = true;
        self
    }
}

impl Default for AtomMatcher {
    fn default() -> Self {
        Self::element()
    }
}

impl NodeMatcher<Atom> for AtomMatcher {
    fn matches(&self, source: &Atom, target: &Atom) -> bool {
        (self.any_element || source.element() == target.element())
            && (!self.charge || source.charge() == target.charge())
            && (!self.ring || source.is_in_ring() == target.is_in_ring())
            && (!self.aromatic || source.is_aromatic() == target.is_aromatic())
    }
}

/// Bond compatibility with optional order and ring sensitivity.
///
/// Aromatic bonds only match aromatic bonds when orders are compared.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BondMatcher {
    order: bool,
    ring: bool,
    topology: Topology,
}

impl BondMatcher {
    /// Bonds match iff their orders are equal.
    pub fn order() -> Self {
        Self {
            order: true,
            ring: false,
            topology: Topology::Strict,
        }
    }

    /// Any bond matches any bond; only adjacency matters.
    pub fn any() -> Self {
        Self {
            order: false,
            ..Self::order()
        }
    }

    /// Also require equal ring membership.
    pub fn ring_sensitive(mut self) -> Self {
        self.ring = true;
        self
    }

    /// Treat edges as a soft constraint.
    pub fn node_only(mut self) -> Self {
        self.topology = Topology::NodeOnly;
        self
    }
}

impl Default for BondMatcher {
    fn default() -> Self {
        Self::order()
    }
}

impl EdgeMatcher<Bond> for BondMatcher {
    fn matches(&self, source: &Bond, target: &Bond) -> bool {
        let order_ok = !self.order
            || match (source.order(), target.order()) {
                (BondOrder::Aromatic, BondOrder::Aromatic) => true,
                (BondOrder::Aromatic, _) | (_, BondOrder::Aromatic) => false,
                (a, b) => a == b,
            };
        order_ok && (!self.ring || source.is_in_ring() == target.is_in_ring())
    }

    fn topology(&self) -> Topology {
        self.topology
    }
}
