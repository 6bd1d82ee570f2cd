#![deny(missing_docs)]
#![doc = "Permutation simulation and reference environments for the AMS vs. Drug exercise."]

/// Simulation parameters.
pub mod config;
/// Observation expansion, label shuffling and the simulated null distribution.
pub mod permute;
/// The exercise's table and the environments built from it.
pub mod reference;

pub use config::SimConfig;
pub use permute::{observations, shuffle_table, simulate, Simulation};
pub use reference::{
    placeholder_environment, reference_environment, reference_table, run_provenance,
    STUDENT_VARIABLES,
};
