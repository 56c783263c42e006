use pyo3::{exceptions::PyValueError, prelude::*};

use crate::{
    config::{MatchConfig, MatchMode},
    engine::map_molecules,
    loader::parse_molfile_str,
    results::MappingQuery,
};

fn value_error(e: impl std::fmt::Display) -> PyErr {
    PyValueError::new_err(e.to_string())
}

/// Maximum common substructure atom mapping between two mol blocks, as
/// 0-based `(source, target)` atom pairs. Hydrogens are not mapped.
#[pyfunction]
fn atom_mapping(source: String, target: String) -> PyResult<Vec<(usize, usize)>> {
    let source = parse_molfile_str(&source).map_err(value_error)?;
    let target = parse_molfile_str(&target).map_err(value_error)?;
    let results = map_molecules(&source, &target, MatchConfig::default()).map_err(value_error)?;
    Ok(results.first_mapping().iter().collect())
}

/// Return `True` iff `query` occurs in `target` as a substructure.
#[pyfunction]
fn is_substructure(query: String, target: String) -> PyResult<bool> {
    let query = parse_molfile_str(&query).map_err(value_error)?;
    let target = parse_molfile_str(&target).map_err(value_error)?;
    let results = map_molecules(&query, &target, MatchConfig::new(MatchMode::FirstSubgraph))
        .map_err(value_error)?;
    Ok(results.is_subgraph())
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` setting in the `Cargo.toml`, else Python will not be able to
/// import the module.
#[pymodule]
#[pyo3(name = "atom_mapping")]
fn _atom_mapping(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(atom_mapping, m)?)?;
    m.add_function(wrap_pyfunction!(is_substructure, m)?)?;
    Ok(())
}
