//! Threshold speciation over the compatibility metric.

use crate::compatibility::genome_distance;
use crate::config::EvolutionConfig;
use morphogen_data::CreatureGenome;
use serde::{Deserialize, Serialize};

/// A group of compatible genomes, by index into the population it was built
/// from. Rebuilt every generation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Species {
    pub id: usize,
    /// Index of the genome new members are compared against.
    pub representative: usize,
    pub members: Vec<usize>,
}

impl Species {
    /// Mean of `fitness` over the members; NaN propagates.
    #[must_use]
    pub fn average_fitness(&self, fitness: &[f64]) -> f64 {
        if self.members.is_empty() {
            return 0.0;
        }
        self.members.iter().map(|&i| fitness[i]).sum::<f64>() / self.members.len() as f64
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Assigns each genome, in order, to the first species whose representative
/// is closer than the compatibility threshold, founding a new species
/// otherwise. Representatives are the founding members and never change
/// during the pass.
#[must_use]
pub fn speciate(population: &[CreatureGenome], config: &EvolutionConfig) -> Vec<Species> {
    let threshold = config.speciation.compatibility_threshold;
    let mut species: Vec<Species> = Vec::new();
    for (i, genome) in population.iter().enumerate() {
        let home = species.iter_mut().find(|s| {
            genome_distance(genome, &population[s.representative], config) < threshold
        });
        match home {
            Some(s) => s.members.push(i),
            None => species.push(Species {
                id: species.len(),
                representative: i,
                members: vec![i],
            }),
        }
    }
    tracing::debug!(count = species.len(), "speciated population");
    species
}

/// Species index of every genome.
#[must_use]
pub fn membership(species: &[Species], population_len: usize) -> Vec<usize> {
    let mut of = vec![0; population_len];
    for (s, sp) in species.iter().enumerate() {
        for &m in &sp.members {
            if m < population_len {
                of[m] = s;
            }
        }
    }
    of
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_fitness() {
        let s = Species {
            id: 0,
            representative: 0,
            members: vec![0, 2],
        };
        assert_eq!(s.average_fitness(&[1.0, 100.0, 3.0]), 2.0);
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_empty_population_has_no_species() {
        assert!(speciate(&[], &EvolutionConfig::default()).is_empty());
    }
}
