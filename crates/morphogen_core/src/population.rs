//! One generation step of the evolutionary engine.
//!
//! [`evolve_population`] is a pure synchronous transformation of
//! `(population, fitness, config, generation)` into the next population and
//! its statistics. The only state carried between calls is the caller's
//! [`InnovationRegistry`]; clearing its generation cache is the caller's job.

use crate::config::{EvolutionConfig, SelectionMethod};
use crate::decay::apply_decay;
use crate::error::{EvolutionError, Result};
use crate::innovation::InnovationRegistry;
use crate::reproduction::CreatureLogic;
use crate::sampling::chance;
use crate::selection::{compare_fitness, select_survivors};
use crate::sharing::shared_fitness;
use crate::speciation::{membership, speciate, Species};
use morphogen_data::{CreatureGenome, PopulationStats};
use rand::Rng;
use std::cmp::Ordering;
use std::collections::HashMap;

/// Result of one generation step.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub population: Vec<CreatureGenome>,
    pub stats: PopulationStats,
    /// Species of the input population; empty unless selecting by species.
    pub species: Vec<Species>,
}

/// Builds `population_size` random founders.
pub fn create_initial_population<R: Rng>(
    config: &EvolutionConfig,
    registry: &mut InnovationRegistry,
    rng: &mut R,
) -> Result<Vec<CreatureGenome>> {
    config.validate()?;
    Ok((0..config.population_size)
        .map(|_| CreatureGenome::new_random_with_rng(config, registry, rng))
        .collect())
}

/// Selects survivors and refills the population with offspring.
///
/// Fails without side effects when the score list does not line up with
/// the population or the configuration is out of bounds. An empty
/// population yields an empty one.
pub fn evolve_population<R: Rng>(
    population: &[CreatureGenome],
    fitness: &[f64],
    config: &EvolutionConfig,
    generation: u32,
    registry: &mut InnovationRegistry,
    rng: &mut R,
) -> Result<GenerationOutcome> {
    evolve_population_boosted(population, fitness, config, generation, 1.0, registry, rng)
}

/// [`evolve_population`] with mutation rates and magnitudes additionally
/// scaled by `mutation_boost`.
pub fn evolve_population_boosted<R: Rng>(
    population: &[CreatureGenome],
    fitness: &[f64],
    config: &EvolutionConfig,
    generation: u32,
    mutation_boost: f64,
    registry: &mut InnovationRegistry,
    rng: &mut R,
) -> Result<GenerationOutcome> {
    if population.len() != fitness.len() {
        return Err(EvolutionError::LengthMismatch {
            genomes: population.len(),
            scores: fitness.len(),
        });
    }
    let config = config.normalized();
    config.validate()?;

    if population.is_empty() {
        return Ok(GenerationOutcome {
            population: Vec::new(),
            stats: PopulationStats {
                generation,
                ..PopulationStats::default()
            },
            species: Vec::new(),
        });
    }

    let effective = if config.sharing.use_fitness_sharing {
        shared_fitness(population, fitness, &config)?
    } else {
        fitness.to_vec()
    };
    let species = if config.selection.method == SelectionMethod::Speciation {
        speciate(population, &config)
    } else {
        Vec::new()
    };

    let survivors = select_survivors(fitness, &effective, &species, &config, rng);
    let mut next: Vec<CreatureGenome> = survivors
        .iter()
        .map(|&i| {
            let mut g = population[i].clone();
            g.survival_streak += 1;
            g
        })
        .collect();

    let offspring_config = apply_decay(&config, generation, mutation_boost);
    let pools = parent_pools(&survivors, &species, population.len());
    let birth = generation + 1;
    let mut crossover_offspring = 0;
    let mut mutation_offspring = 0;

    while next.len() < population.len() {
        let p1 = survivors[rng.gen_range(0..survivors.len())];
        let mates = pools.get(&p1).map_or(survivors.as_slice(), Vec::as_slice);
        let p2 = mates[rng.gen_range(0..mates.len())];

        let child = if config.crossover.use_crossover && chance(rng, config.crossover.rate) {
            let (primary, secondary) = match compare_fitness(fitness[p1], fitness[p2]) {
                Ordering::Less => (p2, p1),
                _ => (p1, p2),
            };
            let mut a = population[primary].clone();
            let mut b = population[secondary].clone();
            a.normalize();
            b.normalize();
            crossover_offspring += 1;
            a.crossover_with_rng(&b, fitness[primary], fitness[secondary], &offspring_config, rng)
                .into_offspring(vec![a.id, b.id], birth, rng)
        } else {
            let mut clone = population[p1].clone();
            clone.normalize();
            if config.mutation.use_mutation {
                clone.mutate_with_config(&offspring_config, registry, rng);
                mutation_offspring += 1;
            }
            let parent = clone.id;
            clone.into_offspring(vec![parent], birth, rng)
        };
        next.push(child);
    }

    let mut stats = compute_stats(fitness, &next, generation);
    stats.species_count = species.len();
    stats.survivor_count = survivors.len();
    stats.crossover_offspring = crossover_offspring;
    stats.mutation_offspring = mutation_offspring;
    if stats.non_finite_fitness > 0 {
        tracing::warn!(
            count = stats.non_finite_fitness,
            generation,
            "non-finite fitness values in evaluated population"
        );
    }
    tracing::debug!(
        generation,
        survivors = stats.survivor_count,
        species = stats.species_count,
        crossover = crossover_offspring,
        mutation = mutation_offspring,
        "evolved population"
    );

    Ok(GenerationOutcome {
        population: next,
        stats,
        species,
    })
}

/// Survivor index to the survivors sharing its species. Empty without
/// species, meaning every survivor is a valid mate.
fn parent_pools(survivors: &[usize], species: &[Species], len: usize) -> HashMap<usize, Vec<usize>> {
    if species.is_empty() {
        return HashMap::new();
    }
    let of = membership(species, len);
    let mut by_species: HashMap<usize, Vec<usize>> = HashMap::new();
    for &s in survivors {
        by_species.entry(of[s]).or_default().push(s);
    }
    survivors
        .iter()
        .map(|&s| (s, by_species.get(&of[s]).cloned().unwrap_or_else(|| vec![s])))
        .collect()
}

/// Fitness statistics over the evaluated scores and structural averages
/// over `next`. NaN scores propagate into the mean and the worst value.
#[must_use]
pub fn compute_stats(fitness: &[f64], next: &[CreatureGenome], generation: u32) -> PopulationStats {
    let mut stats = PopulationStats {
        generation,
        ..PopulationStats::default()
    };
    if !fitness.is_empty() {
        let mut sorted = fitness.to_vec();
        sorted.sort_by(|a, b| compare_fitness(*a, *b));
        let n = sorted.len();
        stats.worst_fitness = sorted[0];
        stats.best_fitness = sorted[n - 1];
        stats.avg_fitness = fitness.iter().sum::<f64>() / n as f64;
        stats.median_fitness = if n % 2 == 1 {
            sorted[n / 2]
        } else {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        };
        stats.non_finite_fitness = fitness.iter().filter(|f| !f.is_finite()).count();
    }
    if !next.is_empty() {
        let n = next.len() as f64;
        stats.avg_nodes = next.iter().map(|g| g.node_count() as f64).sum::<f64>() / n;
        stats.avg_muscles = next.iter().map(|g| g.muscle_count() as f64).sum::<f64>() / n;
        stats.avg_connections = next
            .iter()
            .map(|g| g.controller.as_neat().map_or(0, |net| net.enabled_connection_count()) as f64)
            .sum::<f64>()
            / n;
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_stats_median_even_and_odd() {
        let s = compute_stats(&[1.0, 4.0, 2.0, 3.0], &[], 0);
        assert_eq!(s.median_fitness, 2.5);
        assert_eq!(s.best_fitness, 4.0);
        assert_eq!(s.worst_fitness, 1.0);
        assert_eq!(s.avg_fitness, 2.5);
        let s = compute_stats(&[5.0, 1.0, 3.0], &[], 2);
        assert_eq!(s.median_fitness, 3.0);
        assert_eq!(s.generation, 2);
    }

    #[test]
    fn test_stats_propagate_nan() {
        let s = compute_stats(&[1.0, f64::NAN, 3.0], &[], 0);
        assert!(s.avg_fitness.is_nan());
        assert!(s.worst_fitness.is_nan());
        assert_eq!(s.best_fitness, 3.0);
        assert_eq!(s.non_finite_fitness, 1);
    }

    #[test]
    fn test_initial_population_size() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut registry = InnovationRegistry::new();
        let config = EvolutionConfig {
            population_size: 12,
            ..EvolutionConfig::default()
        };
        let pop = create_initial_population(&config, &mut registry, &mut rng).unwrap();
        assert_eq!(pop.len(), 12);
        let ids: std::collections::HashSet<_> = pop.iter().map(|g| g.id).collect();
        assert_eq!(ids.len(), 12);
    }

    #[test]
    fn test_empty_population_is_not_an_error() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut registry = InnovationRegistry::new();
        let out = evolve_population(&[], &[], &EvolutionConfig::default(), 3, &mut registry, &mut rng).unwrap();
        assert!(out.population.is_empty());
        assert_eq!(out.stats.generation, 3);
    }
}
