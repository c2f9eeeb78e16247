//! Error types for the evolutionary engine.

use thiserror::Error;

/// Main error type for `morphogen_core` operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvolutionError {
    /// Genome and fitness lists must line up one-to-one.
    #[error("Length mismatch: {genomes} genomes but {scores} fitness scores")]
    LengthMismatch { genomes: usize, scores: usize },

    /// A configuration value is outside its documented bounds.
    #[error("Invalid config `{field}`: {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Configuration could not be read or parsed.
    #[error("Config error: {0}")]
    Config(String),

    /// The fitness evaluator failed or broke its contract.
    #[error("Evaluator error: {0}")]
    Evaluator(String),
}

/// Result type alias for `morphogen_core` operations.
pub type Result<T> = std::result::Result<T, EvolutionError>;

impl EvolutionError {
    #[must_use]
    pub fn invalid_config<F: Into<String>, R: Into<String>>(field: F, reason: R) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    #[must_use]
    pub fn evaluator<S: Into<String>>(msg: S) -> Self {
        Self::Evaluator(msg.into())
    }
}
