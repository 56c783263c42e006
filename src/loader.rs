//! A small reader for V2000 `.mol` files.
//!
//! Reads the counts line, the atom block (element and charge code), the bond
//! block and `M  CHG` property lines. Hydrogens are dropped along with their
//! bonds. Ring membership is derived from the bond graph (a bond is in a ring
//! iff it is not a bridge) and atoms touching an aromatic bond are marked
//! aromatic.

use std::{fs, path::Path};

use petgraph::{
    algo::has_path_connecting,
    visit::{EdgeFiltered, EdgeRef},
};
use thiserror::Error;

use crate::{
    graph::{from_parts, GraphError},
    molecule::{Atom, Bond, BondOrder, Element, MGraph, Molecule},
};

/// Thrown by [`parse_molfile_str`] and [`parse`] on malformed input.
#[derive(Debug, Error)]
pub enum ParserError {
    #[error("line {0}: unexpected end of input")]
    Truncated(usize),
    #[error("line {line}: {field} is not a number")]
    NotANumber { line: usize, field: &'static str },
    #[error("line {line}: unknown element {symbol:?}")]
    UnknownElement { line: usize, symbol: String },
    #[error("line {line}: bond type {code} is not supported")]
    BondType { line: usize, code: usize },
    #[error("line {line}: atom {atom} does not exist")]
    AtomIndex { line: usize, atom: usize },
    #[error("bad bond structure: {0}")]
    Graph(#[from] GraphError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Read the first molecule from the file at `path`.
pub fn parse(path: &Path) -> Result<Molecule, ParserError> {
    let contents = fs::read_to_string(path)?;
    parse_molfile_str(&contents)
}

/// Parse one V2000 mol block.
pub fn parse_molfile_str(input: &str) -> Result<Molecule, ParserError> {
    let lines: Vec<&str> = input.lines().collect();
    let line = |i: usize| lines.get(i).copied().ok_or(ParserError::Truncated(i + 1));

    let counts = line(3)?;
    let num_atoms = field(counts, 0..3, 4, "atom count")?;
    let num_bonds = field(counts, 3..6, 4, "bond count")?;

    // Atom block; hydrogens get no node.
    let mut atoms = Vec::with_capacity(num_atoms);
    let mut node_of = Vec::with_capacity(num_atoms);
    for i in 0..num_atoms {
        let n = 4 + i;
        let text = line(n)?;
        let symbol = text
            .get(31..34)
            .ok_or(ParserError::Truncated(n + 1))?
            .trim();
        let element: Element = symbol.parse().map_err(|_| ParserError::UnknownElement {
            line: n + 1,
            symbol: symbol.to_string(),
        })?;
        let charge = match text.get(36..39).map(str::trim) {
            None | Some("") => 0,
            Some(code) => charge_from_code(code.parse().map_err(|_| ParserError::NotANumber {
                line: n + 1,
                field: "charge code",
            })?),
        };

        if element == Element::HYDROGEN {
            node_of.push(None);
        } else {
            node_of.push(Some(atoms.len()));
            atoms.push(Atom::new(element).with_charge(charge));
        }
    }

    // Bond block
    let mut bonds = Vec::with_capacity(num_bonds);
    for i in 0..num_bonds {
        let n = 4 + num_atoms + i;
        let text = line(n)?;
        let one = field(text, 0..3, n + 1, "first atom")?;
        let two = field(text, 3..6, n + 1, "second atom")?;
        let code = field(text, 6..9, n + 1, "bond type")?;

        let node = |atom: usize| {
            atom.checked_sub(1)
                .and_then(|ix| node_of.get(ix))
                .copied()
                .ok_or(ParserError::AtomIndex { line: n + 1, atom })
        };
        let (Some(u), Some(v)) = (node(one)?, node(two)?) else {
            continue;
        };
        let order = BondOrder::try_from(code)
            .map_err(|_| ParserError::BondType { line: n + 1, code })?;
        bonds.push((u, v, Bond::new(order)));
    }

    // Property block: any M  CHG line replaces every atom-block charge.
    let mut charges: Option<Vec<i8>> = None;
    for (n, text) in lines.iter().enumerate().skip(4 + num_atoms + num_bonds) {
        if text.starts_with("M  END") {
            break;
        }
        if !text.starts_with("M  CHG") {
            continue;
        }
        let charges = charges.get_or_insert_with(|| vec![0; num_atoms]);
        let values: Vec<&str> = text[6..].split_whitespace().collect();
        for pair in values.get(1..).unwrap_or_default().chunks(2) {
            let [atom, value] = pair else {
                return Err(ParserError::Truncated(n + 1));
            };
            let not_a_number = |field| ParserError::NotANumber { line: n + 1, field };
            let atom: usize = atom.parse().map_err(|_| not_a_number("charged atom"))?;
            let value: i8 = value.parse().map_err(|_| not_a_number("charge"))?;
            let slot = atom
                .checked_sub(1)
                .and_then(|ix| charges.get_mut(ix))
                .ok_or(ParserError::AtomIndex { line: n + 1, atom })?;
            *slot = value;
        }
    }
    if let Some(charges) = charges {
        for (ix, node) in node_of.iter().enumerate() {
            if let Some(node) = node {
                atoms[*node] = atoms[*node].with_charge(charges[ix]);
            }
        }
    }

    let mut graph = from_parts(atoms, bonds)?;
    perceive_rings(&mut graph);
    Ok(Molecule::from_graph(graph))
}

fn field(
    text: &str,
    range: std::ops::Range<usize>,
    line: usize,
    name: &'static str,
) -> Result<usize, ParserError> {
    text.get(range)
        .ok_or(ParserError::Truncated(line))?
        .trim()
        .parse()
        .map_err(|_| ParserError::NotANumber { line, field: name })
}

fn charge_from_code(code: u8) -> i8 {
    match code {
        1 => 3,
        2 => 2,
        3 => 1,
        5 => -1,
        6 => -2,
        7 => -3,
        _ => 0,
    }
}

/// Flag ring bonds (non-bridges), their atoms, and atoms on aromatic bonds.
fn perceive_rings(graph: &mut MGraph) {
    let mut ring_bonds = Vec::new();
    for e in graph.edge_indices() {
        let Some((u, v)) = graph.edge_endpoints(e) else {
            continue;
        };
        let without = EdgeFiltered::from_fn(&*graph, |edge| edge.id() != e);
        if has_path_connecting(&without, u, v, None) {
            ring_bonds.push(e);
        }
    }

    for e in ring_bonds {
        graph[e] = graph[e].in_ring(true);
        if let Some((u, v)) = graph.edge_endpoints(e) {
            graph[u] = graph[u].in_ring(true);
            graph[v] = graph[v].in_ring(true);
        }
    }

    let aromatic: Vec<_> = graph
        .edge_indices()
        .filter(|e| graph[*e].order() == BondOrder::Aromatic)
        .filter_map(|e| graph.edge_endpoints(e))
        .collect();
    for (u, v) in aromatic {
        graph[u] = graph[u].aromatic(true);
        graph[v] = graph[v].aromatic(true);
    }
}
