//! Closed-form stand-in for a physics evaluator.
//!
//! Scores a creature from its genome alone so that runs can be driven end to
//! end without a simulator. The score rewards muscle work relative to body
//! mass and spread, which is enough pressure for the engine to act on.

use morphogen_core::evaluator::ParallelEvaluator;
use morphogen_core::EvolutionConfig;
use morphogen_data::{Controller, CreatureGenome, FitnessResult};

/// Stiffness at which a muscle delivers half of its stroke.
const HALF_STIFFNESS: f64 = 100.0;
/// Per-node upkeep subtracted from the score.
const NODE_COST: f64 = 0.05;

/// Scores one genome. Bodies without muscles cannot move and are
/// disqualified with a zero score.
#[must_use]
pub fn surrogate_fitness(genome: &CreatureGenome, _config: &EvolutionConfig) -> FitnessResult {
    let body = &genome.body;
    if body.muscles.is_empty() {
        return FitnessResult::disqualified(0.0, "no muscles");
    }

    let work: f64 = body
        .muscles
        .iter()
        .map(|m| {
            let stroke = m.amplitude * body.global_amplitude_multiplier * m.rest_length;
            let rate = m.frequency * body.global_frequency_multiplier;
            let coupling = m.stiffness / (m.stiffness + HALF_STIFFNESS);
            stroke * rate * coupling * (1.0 - 0.5 * m.damping)
        })
        .sum();
    let mass: f64 = body.nodes.iter().map(|n| n.mass).sum();
    let spread = horizontal_spread(genome);

    let score = (work / (1.0 + mass)) * (1.0 + spread.ln_1p()) * controller_factor(&genome.controller)
        - NODE_COST * body.nodes.len() as f64;

    let mut result = FitnessResult::scored(score);
    result.metadata.insert("work".into(), work.into());
    result.metadata.insert("mass".into(), mass.into());
    result
}

/// Evaluator over [`surrogate_fitness`] on the rayon pool.
pub fn surrogate_evaluator(
) -> ParallelEvaluator<fn(&CreatureGenome, &EvolutionConfig) -> FitnessResult> {
    ParallelEvaluator::new(surrogate_fitness as fn(&CreatureGenome, &EvolutionConfig) -> FitnessResult)
}

fn horizontal_spread(genome: &CreatureGenome) -> f64 {
    let nodes = &genome.body.nodes;
    span(nodes.iter().map(|n| n.position[0])) + span(nodes.iter().map(|n| n.position[2]))
}

fn span(values: impl Iterator<Item = f64>) -> f64 {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if hi >= lo {
        hi - lo
    } else {
        0.0
    }
}

/// Mild bonus for carrying a controller, growing with its size.
fn controller_factor(controller: &Controller) -> f64 {
    match controller {
        Controller::None => 1.0,
        Controller::Fixed(net) => {
            let n = net.param_count().max(1) as f64;
            let mean_abs = net.params().map(|w| w.abs()).sum::<f64>() / n;
            1.0 + 0.1 * mean_abs.tanh()
        }
        Controller::Neat(neat) => 1.0 + 0.02 * (neat.enabled_connection_count() as f64).min(10.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphogen_core::evaluator::FitnessEvaluator;
    use morphogen_core::innovation::InnovationRegistry;
    use morphogen_core::population::create_initial_population;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_muscleless_body_disqualified() {
        let genome = CreatureGenome::founder(uuid::Uuid::nil(), Default::default(), Controller::None);
        let result = surrogate_fitness(&genome, &EvolutionConfig::default());
        assert!(result.disqualified);
        assert_eq!(result.fitness, 0.0);
    }

    #[test]
    fn test_parallel_scores_match_direct_calls() {
        let config = EvolutionConfig {
            population_size: 12,
            ..EvolutionConfig::default()
        };
        let mut registry = InnovationRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let population = create_initial_population(&config, &mut registry, &mut rng).unwrap();

        let results = surrogate_evaluator().evaluate(&population, &config).unwrap();
        assert_eq!(results.len(), population.len());
        for (genome, result) in population.iter().zip(&results) {
            assert!(result.fitness.is_finite());
            assert_eq!(result.fitness, surrogate_fitness(genome, &config).fitness);
            assert!(result.metadata.contains_key("work"));
        }
    }

    #[test]
    fn test_more_amplitude_scores_higher() {
        let config = EvolutionConfig::default();
        let mut registry = InnovationRegistry::new();
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let genome = create_initial_population(&config, &mut registry, &mut rng).unwrap().remove(0);
        let mut stronger = genome.clone();
        stronger.body.global_amplitude_multiplier *= 2.0;
        assert!(
            surrogate_fitness(&stronger, &config).fitness > surrogate_fitness(&genome, &config).fitness
        );
    }
}
