//! Graph-theoretic representation of a molecule.
//!
//! Atoms are nodes and bonds are edges of a [`LabeledGraph`]. Ring membership
//! and aromaticity are plain flags on the labels: whoever builds the molecule
//! decides them. The mol file loader derives both from the bond graph.

use std::{collections::HashSet, fmt::Display, str::FromStr};

use crate::graph::LabeledGraph;

pub type MGraph = LabeledGraph<Atom, Bond>;

/// Thrown by [`Element::from_str`] if the string does not represent a valid
/// chemical element.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseElementError;

const SYMBOLS: [&str; 118] = [
    "H", "He", "Li", "Be", "B", "C", "N", "O", "F", "Ne", "Na", "Mg", "Al", "Si", "P", "S", "Cl",
    "Ar", "K", "Ca", "Sc", "Ti", "V", "Cr", "Mn", "Fe", "Co", "Ni", "Cu", "Zn", "Ga", "Ge", "As",
    "Se", "Br", "Kr", "Rb", "Sr", "Y", "Zr", "Nb", "Mo", "Tc", "Ru", "Rh", "Pd", "Ag", "Cd", "In",
    "Sn", "Sb", "Te", "I", "Xe", "Cs", "Ba", "La", "Ce", "Pr", "Nd", "Pm", "Sm", "Eu", "Gd", "Tb",
    "Dy", "Ho", "Er", "Tm", "Yb", "Lu", "Hf", "Ta", "W", "Re", "Os", "Ir", "Pt", "Au", "Hg", "Tl",
    "Pb", "Bi", "Po", "At", "Rn", "Fr", "Ra", "Ac", "Th", "Pa", "U", "Np", "Pu", "Am", "Cm", "Bk",
    "Cf", "Es", "Fm", "Md", "No", "Lr", "Rf", "Db", "Sg", "Bh", "Hs", "Mt", "Ds", "Rg", "Cn", "Nh",
    "Fl", "Mc", "Lv", "Ts", "Og",
];

/// A chemical element, stored as its atomic number.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Element(u8);

impl Element {
    pub const HYDROGEN: Element = Element(1);
    pub const CARBON: Element = Element(6);
    pub const NITROGEN: Element = Element(7);
    pub const OXYGEN: Element = Element(8);
    pub const SULFUR: Element = Element(16);
    pub const CHLORINE: Element = Element(17);

    /// Return the element with atomic number `z`, if there is one.
    pub fn from_atomic_number(z: u8) -> Option<Self> {
        (1..=SYMBOLS.len() as u8).contains(&z).then_some(Element(z))
    }

    pub fn atomic_number(&self) -> u8 {
        self.0
    }

    pub fn symbol(&self) -> &'static str {
        SYMBOLS[self.0 as usize - 1]
    }
}

impl Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Element {
    type Err = ParseElementError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SYMBOLS
            .iter()
            .position(|sym| *sym == s)
            .map(|i| Element(i as u8 + 1))
            .ok_or(ParseElementError)
    }
}

/// The nodes of a [`Molecule`] graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom {
    element: Element,
    charge: i8,
    in_ring: bool,
    aromatic: bool,
}

impl Atom {
    /// Construct a neutral, acyclic [`Atom`] of type `element`.
    pub fn new(element: Element) -> Self {
        Self {
            element,
            charge: 0,
            in_ring: false,
            aromatic: false,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn in_ring(mut self, in_ring: bool) -> Self {
        self.in_ring = in_ring;
        self
    }

    pub fn aromatic(mut self, aromatic: bool) -> Self {
        self.aromatic = aromatic;
        self
    }

    pub fn element(&self) -> Element {
        self.element
    }

    pub fn charge(&self) -> i8 {
        self.charge
    }

    pub fn is_in_ring(&self) -> bool {
        self.in_ring
    }

    pub fn is_aromatic(&self) -> bool {
        self.aromatic
    }
}

/// Bond orders as they appear in the `.mol` bond block.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BondOrder {
    Single,
    Double,
    Triple,
    Aromatic,
}

/// Thrown by [`BondOrder::try_from`] when given anything other than 1 to 4.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ParseBondError;

impl TryFrom<usize> for BondOrder {
    type Error = ParseBondError;
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(BondOrder::Single),
            2 => Ok(BondOrder::Double),
            3 => Ok(BondOrder::Triple),
            4 => Ok(BondOrder::Aromatic),
            _ => Err(ParseBondError),
        }
    }
}

/// The edges of a [`Molecule`] graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Bond {
    order: BondOrder,
    in_ring: bool,
}

impl Bond {
    pub fn new(order: BondOrder) -> Self {
        Self {
            order,
            in_ring: false,
        }
    }

    pub fn in_ring(mut self, in_ring: bool) -> Self {
        self.in_ring = in_ring;
        self
    }

    pub fn order(&self) -> BondOrder {
        self.order
    }

    pub fn is_in_ring(&self) -> bool {
        self.in_ring
    }
}

/// A simple, loopless graph with [`Atom`]s as nodes and [`Bond`]s as edges.
#[derive(Debug, Clone)]
pub struct Molecule {
    graph: MGraph,
}

impl Molecule {
    /// Construct a [`Molecule`] from an existing `MGraph`.
    pub fn from_graph(g: MGraph) -> Self {
        Self { graph: g }
    }

    /// Return a representation of this molecule as an `MGraph`.
    pub fn graph(&self) -> &MGraph {
        &self.graph
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Return `true` iff this molecule contains self-loops or multiple edges
    /// between any pair of nodes.
    pub fn is_malformed(&self) -> bool {
        let mut uniq = HashSet::new();
        !self.graph.edge_indices().all(|ix| {
            self.graph.edge_endpoints(ix).is_some_and(|(src, dst)| {
                src != dst && uniq.insert((src.min(dst), src.max(dst)))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::from_parts;

    #[test]
    fn element_to_string() {
        assert_eq!(Element::HYDROGEN.to_string(), "H");
        assert_eq!(Element::CHLORINE.to_string(), "Cl");
    }

    #[test]
    fn element_from_string() {
        assert_eq!(str::parse("H"), Ok(Element::HYDROGEN));
        assert_eq!(str::parse::<Element>("Og").map(|e| e.atomic_number()), Ok(118));
        assert!(str::parse::<Element>("Foo").is_err());
    }

    #[test]
    fn atomic_number_range() {
        assert_eq!(Element::from_atomic_number(6), Some(Element::CARBON));
        assert_eq!(Element::from_atomic_number(0), None);
        assert_eq!(Element::from_atomic_number(119), None);
    }

    #[test]
    fn bond_orders_from_molfile_codes() {
        assert_eq!(BondOrder::try_from(4), Ok(BondOrder::Aromatic));
        assert_eq!(BondOrder::try_from(8), Err(ParseBondError));
    }

    #[test]
    fn detects_parallel_bonds() {
        let c = Atom::new(Element::CARBON);
        let single = Bond::new(BondOrder::Single);
        let ok = Molecule::from_graph(from_parts(vec![c, c], [(0, 1, single)]).unwrap());
        assert!(!ok.is_malformed());

        let mut g = ok.graph().clone();
        let (a, b) = g.edge_endpoints(g.edge_indices().next().unwrap()).unwrap();
        g.add_edge(b, a, single);
        assert!(Molecule::from_graph(g).is_malformed());
    }
}
