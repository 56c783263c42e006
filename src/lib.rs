// Labeled graphs and per-run lookup tables
pub mod graph;

// Molecule definition
pub mod molecule;

// Data IO
pub mod loader;

// Node and edge compatibility predicates
pub mod matcher;

// Injective node mappings
pub mod mapping;

// Search configuration and deadlines
pub mod config;

// Error types
pub mod error;

// Compatibility graph and its cliques
pub mod clique;
pub mod compat;

// Backtracking substructure search
pub mod vf;

// Concurrent seed searches
pub mod seed;

// Seed extension
pub mod extend;

// Result aggregation and queries
pub mod results;

// The whole pipeline
pub mod engine;

// Shared inputs of one match run
mod problem;

// Utility functions
mod utils;

// Python library
#[cfg(feature = "python")]
pub mod python;

pub use engine::{map_molecules, MatchEngine};
pub use error::MatchError;
pub use mapping::Mapping;
pub use results::{MappingQuery, MatchResults};
