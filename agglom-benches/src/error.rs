//! Benchmark setup error type.

use agglom_core::{AgglomError, InputError, ScoringError};

use crate::planted::PlantedError;

/// Errors that may occur while preparing benchmark inputs.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Planted-partition parameters were rejected.
    #[error("planted graph generation failed: {0}")]
    Planted(#[from] PlantedError),
    /// Generated edges or communities failed validation.
    #[error("generated input was invalid: {0}")]
    Input(#[from] InputError),
    /// Building or running the pipeline failed.
    #[error("pipeline failed: {0}")]
    Pipeline(#[from] AgglomError),
    /// A scoring pass failed during setup.
    #[error("scoring failed: {0}")]
    Scoring(#[from] ScoringError),
}
