//! Boundary to whatever turns a genome into a fitness score.
//!
//! The engine never simulates; it only consumes one [`FitnessResult`] per
//! genome, in input order.

use crate::config::EvolutionConfig;
use crate::error::{EvolutionError, Result};
use morphogen_data::{CreatureGenome, FitnessResult};
use rayon::prelude::*;

/// Scores a whole population.
pub trait FitnessEvaluator: Send + Sync {
    fn evaluate(&self, genomes: &[CreatureGenome], config: &EvolutionConfig) -> Result<Vec<FitnessResult>>;
}

/// Sequential evaluator around a per-genome closure.
pub struct FnEvaluator<F> {
    score: F,
}

impl<F> FnEvaluator<F>
where
    F: Fn(&CreatureGenome, &EvolutionConfig) -> FitnessResult + Send + Sync,
{
    pub fn new(score: F) -> Self {
        Self { score }
    }
}

impl<F> FitnessEvaluator for FnEvaluator<F>
where
    F: Fn(&CreatureGenome, &EvolutionConfig) -> FitnessResult + Send + Sync,
{
    fn evaluate(&self, genomes: &[CreatureGenome], config: &EvolutionConfig) -> Result<Vec<FitnessResult>> {
        Ok(genomes.iter().map(|g| (self.score)(g, config)).collect())
    }
}

/// Rayon evaluator around a per-genome closure. Order is preserved.
pub struct ParallelEvaluator<F> {
    score: F,
}

impl<F> ParallelEvaluator<F>
where
    F: Fn(&CreatureGenome, &EvolutionConfig) -> FitnessResult + Send + Sync,
{
    pub fn new(score: F) -> Self {
        Self { score }
    }
}

impl<F> FitnessEvaluator for ParallelEvaluator<F>
where
    F: Fn(&CreatureGenome, &EvolutionConfig) -> FitnessResult + Send + Sync,
{
    fn evaluate(&self, genomes: &[CreatureGenome], config: &EvolutionConfig) -> Result<Vec<FitnessResult>> {
        Ok(genomes.par_iter().map(|g| (self.score)(g, config)).collect())
    }
}

/// Runs `evaluator` and checks it returned exactly one result per genome.
pub fn evaluate_checked<E: FitnessEvaluator + ?Sized>(
    evaluator: &E,
    genomes: &[CreatureGenome],
    config: &EvolutionConfig,
) -> Result<Vec<FitnessResult>> {
    let results = evaluator.evaluate(genomes, config)?;
    if results.len() != genomes.len() {
        return Err(EvolutionError::evaluator(format!(
            "expected {} results, got {}",
            genomes.len(),
            results.len()
        )));
    }
    Ok(results)
}

/// Fitness values in order. Disqualified genomes keep the value the
/// evaluator reported.
#[must_use]
pub fn fitness_scores(results: &[FitnessResult]) -> Vec<f64> {
    results.iter().map(|r| r.fitness).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reproduction::CreatureLogic;
    use crate::innovation::InnovationRegistry;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    struct Truncating;

    impl FitnessEvaluator for Truncating {
        fn evaluate(&self, genomes: &[CreatureGenome], _config: &EvolutionConfig) -> Result<Vec<FitnessResult>> {
            Ok(genomes.iter().skip(1).map(|_| FitnessResult::scored(1.0)).collect())
        }
    }

    fn population(n: usize) -> Vec<CreatureGenome> {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut registry = InnovationRegistry::new();
        let config = EvolutionConfig::default();
        (0..n)
            .map(|_| CreatureGenome::new_random_with_rng(&config, &mut registry, &mut rng))
            .collect()
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let pop = population(16);
        let config = EvolutionConfig::default();
        let score = |g: &CreatureGenome, _: &EvolutionConfig| FitnessResult::scored(g.node_count() as f64);
        let seq = FnEvaluator::new(score).evaluate(&pop, &config).unwrap();
        let par = ParallelEvaluator::new(score).evaluate(&pop, &config).unwrap();
        assert_eq!(fitness_scores(&seq), fitness_scores(&par));
    }

    #[test]
    fn test_short_result_list_is_rejected() {
        let pop = population(3);
        let err = evaluate_checked(&Truncating, &pop, &EvolutionConfig::default()).unwrap_err();
        assert!(matches!(err, EvolutionError::Evaluator(_)));
    }
}
