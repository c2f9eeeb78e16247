//! Fitness sharing: raw fitness divided by local population density.

use crate::compatibility::genome_distance;
use crate::config::EvolutionConfig;
use crate::error::{EvolutionError, Result};
use morphogen_data::CreatureGenome;

/// `1 - (d / radius)^alpha` inside the radius, 0 at or beyond it.
#[must_use]
pub fn sharing_kernel(distance: f64, radius: f64, alpha: f64) -> f64 {
    if radius <= 0.0 || distance >= radius {
        return 0.0;
    }
    1.0 - (distance / radius).powf(alpha)
}

/// Niche count of every genome; the genome itself contributes 1.
#[must_use]
pub fn niche_counts(population: &[CreatureGenome], config: &EvolutionConfig) -> Vec<f64> {
    let n = population.len();
    let radius = config.sharing.sharing_radius;
    let alpha = config.sharing.sharing_alpha;
    let mut counts = vec![1.0; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let sh = sharing_kernel(genome_distance(&population[i], &population[j], config), radius, alpha);
            counts[i] += sh;
            counts[j] += sh;
        }
    }
    counts
}

/// Shared fitness `raw / niche_count`, in input order.
pub fn shared_fitness(
    population: &[CreatureGenome],
    fitness: &[f64],
    config: &EvolutionConfig,
) -> Result<Vec<f64>> {
    if population.len() != fitness.len() {
        return Err(EvolutionError::LengthMismatch {
            genomes: population.len(),
            scores: fitness.len(),
        });
    }
    let counts = niche_counts(population, config);
    Ok(fitness.iter().zip(counts).map(|(f, c)| f / c).collect())
}
