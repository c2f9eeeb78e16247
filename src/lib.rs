//! # Morphogen
//!
//! Command-line front end for the Morphogen evolutionary optimizer.
//!
//! The engine lives in `morphogen_core` and persistence in `morphogen_io`;
//! this crate wires them into a runnable experiment with a built-in
//! surrogate evaluator.

/// On-disk run driver
pub mod runner;
/// Genome-only fitness stand-in
pub mod surrogate;

pub use runner::{RunOptions, RunSummary, Runner};
pub use surrogate::{surrogate_evaluator, surrogate_fitness};
