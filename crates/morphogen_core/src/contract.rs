//! Stateless evolve request/response exchange.
//!
//! A caller that persists runs elsewhere sends one generation's genomes and
//! scores plus the registry counters it saved last time, and gets back the
//! next generation and the updated counters.

use crate::config::EvolutionConfig;
use crate::error::Result;
use crate::innovation::InnovationRegistry;
use crate::population::evolve_population;
use crate::run::generation_rng;
use morphogen_data::{CreatureGenome, PopulationStats};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvolveRequest {
    pub genomes: Vec<CreatureGenome>,
    #[serde(alias = "fitness_scores")]
    pub fitness_scores: Vec<f64>,
    #[serde(default)]
    pub config: EvolutionConfig,
    #[serde(default)]
    pub generation: u32,
    #[serde(default)]
    pub innovation_counter_connection: usize,
    #[serde(default)]
    pub innovation_counter_node: usize,
    /// Overrides `config.seed` for this request.
    #[serde(default)]
    pub seed: Option<u64>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvolveResponse {
    pub genomes: Vec<CreatureGenome>,
    /// Generation index of `genomes`.
    pub generation: u32,
    pub stats: PopulationStats,
    pub innovation_counter_connection: usize,
    pub innovation_counter_node: usize,
}

/// Validates, evolves one generation and closes it.
///
/// The registry is rebuilt from the request counters and raised past any
/// innovation already present in the genomes, so stale counters never
/// reissue a live id. Seeded requests are reproducible.
pub fn handle_evolve_request(request: EvolveRequest) -> Result<EvolveResponse> {
    request.config.validate()?;
    let mut registry = InnovationRegistry::from_counters(
        request.innovation_counter_connection,
        request.innovation_counter_node,
    );
    registry.reserve_past(request.genomes.iter().filter_map(|g| g.controller.as_neat()));

    let mut rng = match request.seed.or(request.config.seed) {
        Some(seed) => generation_rng(seed, request.generation),
        None => ChaCha8Rng::from_entropy(),
    };
    let outcome = evolve_population(
        &request.genomes,
        &request.fitness_scores,
        &request.config,
        request.generation,
        &mut registry,
        &mut rng,
    )?;
    registry.clear_generation_cache();

    Ok(EvolveResponse {
        genomes: outcome.population,
        generation: request.generation + 1,
        stats: outcome.stats,
        innovation_counter_connection: registry.connection_counter(),
        innovation_counter_node: registry.node_counter(),
    })
}
