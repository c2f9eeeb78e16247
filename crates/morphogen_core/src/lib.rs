//! # Morphogen Core
//!
//! The evolutionary engine for Morphogen: evolves creature genomes (a body
//! graph of nodes and muscles plus an optional neural controller) from
//! externally supplied fitness scores.
//!
//! This crate contains:
//! - Body, fixed-topology and NEAT mutation and crossover operators
//! - Innovation tracking for NEAT structural mutation
//! - Compatibility distance, speciation and fitness sharing
//! - Truncation, tournament, rank and per-species selection
//! - The per-generation orchestrator and a multi-generation run driver
//! - Metrics collection and structured logging
//!
//! ## Determinism
//!
//! Every random draw comes from a caller-supplied RNG. Seeded runs use one
//! ChaCha8 stream per generation, so results do not depend on how a run was
//! split into sessions.
//!
//! ## Example
//!
//! ```
//! use morphogen_core::config::EvolutionConfig;
//! use morphogen_core::innovation::InnovationRegistry;
//! use morphogen_core::population::{create_initial_population, evolve_population};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let config = EvolutionConfig { population_size: 8, ..EvolutionConfig::default() };
//! let mut registry = InnovationRegistry::new();
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//!
//! let population = create_initial_population(&config, &mut registry, &mut rng).unwrap();
//! let fitness: Vec<f64> = population.iter().map(|g| g.muscle_count() as f64).collect();
//! let outcome = evolve_population(&population, &fitness, &config, 0, &mut registry, &mut rng).unwrap();
//! registry.clear_generation_cache();
//!
//! assert_eq!(outcome.population.len(), 8);
//! ```

/// Body genome operators (creation, mutation, crossover)
pub mod body;
/// Compatibility distance between genomes
pub mod compatibility;
/// Configuration management for evolution parameters
pub mod config;
/// Evolve request/response exchange
pub mod contract;
/// Mutation decay schedule and adaptive boost
pub mod decay;
pub mod error;
/// Fitness evaluator boundary
pub mod evaluator;
/// Parent links and ancestor queries
pub mod genealogy;
/// Innovation numbers for NEAT structural mutation
pub mod innovation;
/// Metrics collection and logging setup
pub mod metrics;
/// NEAT controller operators
pub mod neat;
/// Fixed-topology controller operators
pub mod neural;
/// One generation step
pub mod population;
/// Whole-creature operators
pub mod reproduction;
/// Multi-generation run driver
pub mod run;
pub mod sampling;
/// Survivor selection policies
pub mod selection;
/// Fitness sharing
pub mod sharing;
/// Threshold speciation
pub mod speciation;

pub use config::EvolutionConfig;
pub use error::{EvolutionError, Result};
pub use innovation::InnovationRegistry;
pub use population::{evolve_population, GenerationOutcome};
