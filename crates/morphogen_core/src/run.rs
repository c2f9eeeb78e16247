//! Multi-generation driver owning all run-scoped state.

use crate::config::EvolutionConfig;
use crate::decay::AdaptiveState;
use crate::error::{EvolutionError, Result};
use crate::evaluator::{evaluate_checked, fitness_scores, FitnessEvaluator};
use crate::genealogy::LineageIndex;
use crate::innovation::InnovationRegistry;
use crate::metrics::Metrics;
use crate::population::{create_initial_population, evolve_population_boosted};
use crate::selection::compare_fitness;
use morphogen_data::{CreatureGenome, PopulationStats};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// RNG for `generation` of the run seeded with `seed`. Founders draw from
/// stream 0, generation `g` from stream `g + 1`, so a resumed run continues
/// exactly as an uninterrupted one.
#[must_use]
pub fn generation_rng(seed: u64, generation: u32) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(u64::from(generation) + 1);
    rng
}

fn founder_rng(seed: u64) -> ChaCha8Rng {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    rng.set_stream(0);
    rng
}

/// Serializable checkpoint of an [`EvolutionRun`].
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RunState {
    pub seed: u64,
    pub generation: u32,
    pub config: EvolutionConfig,
    pub innovation_counter_connection: usize,
    pub innovation_counter_node: usize,
    pub adaptive_boost_level: u32,
    pub gens_since_boost_change: u32,
    #[serde(default)]
    pub best_fitness: Option<f64>,
    pub population: Vec<CreatureGenome>,
    #[serde(default)]
    pub lineage: LineageIndex,
    #[serde(default)]
    pub history: Vec<PopulationStats>,
}

pub struct EvolutionRun {
    config: EvolutionConfig,
    seed: u64,
    generation: u32,
    registry: InnovationRegistry,
    adaptive: AdaptiveState,
    population: Vec<CreatureGenome>,
    lineage: LineageIndex,
    history: Vec<PopulationStats>,
    metrics: Metrics,
}

impl EvolutionRun {
    /// Starts a run with random founders. Without a configured seed one is
    /// drawn and kept so the run can still be checkpointed and resumed.
    pub fn new(config: EvolutionConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.unwrap_or_else(rand::random);
        let mut registry = InnovationRegistry::new();
        let population = create_initial_population(&config, &mut registry, &mut founder_rng(seed))?;
        let mut lineage = LineageIndex::new();
        lineage.record_all(&population);
        tracing::info!(seed, size = population.len(), "Run started");
        Ok(Self {
            config,
            seed,
            generation: 0,
            registry,
            adaptive: AdaptiveState::default(),
            population,
            lineage,
            history: Vec::new(),
            metrics: Metrics::new(),
        })
    }

    /// Resumes from a checkpoint.
    pub fn from_state(state: RunState) -> Result<Self> {
        state.config.validate()?;
        let mut registry =
            InnovationRegistry::from_counters(state.innovation_counter_connection, state.innovation_counter_node);
        registry.reserve_past(state.population.iter().filter_map(|g| g.controller.as_neat()));
        let mut adaptive = AdaptiveState::from_counters(state.adaptive_boost_level, state.gens_since_boost_change);
        adaptive.best_fitness = state.best_fitness;
        Ok(Self {
            config: state.config,
            seed: state.seed,
            generation: state.generation,
            registry,
            adaptive,
            population: state.population,
            lineage: state.lineage,
            history: state.history,
            metrics: Metrics::new(),
        })
    }

    #[must_use]
    pub fn to_state(&self) -> RunState {
        RunState {
            seed: self.seed,
            generation: self.generation,
            config: self.config.clone(),
            innovation_counter_connection: self.registry.connection_counter(),
            innovation_counter_node: self.registry.node_counter(),
            adaptive_boost_level: self.adaptive.boost_level,
            gens_since_boost_change: self.adaptive.gens_since_boost_change,
            best_fitness: self.adaptive.best_fitness,
            population: self.population.clone(),
            lineage: self.lineage.clone(),
            history: self.history.clone(),
        }
    }

    /// Evaluates the current population, evolves it and closes the
    /// generation.
    pub fn step<E: FitnessEvaluator + ?Sized>(&mut self, evaluator: &E) -> Result<PopulationStats> {
        let results = evaluate_checked(evaluator, &self.population, &self.config)?;
        let disqualified = results.iter().filter(|r| r.disqualified).count();
        if disqualified > 0 {
            self.metrics.record_disqualified(disqualified);
            tracing::debug!(disqualified, generation = self.generation, "disqualified genomes");
        }
        let scores = fitness_scores(&results);

        if let Some(best) = scores.iter().copied().max_by(|a, b| compare_fitness(*a, *b)) {
            self.adaptive.observe(best, &self.config.adaptive);
        }
        let boost = self.adaptive.multiplier(&self.config.adaptive);

        let started = Instant::now();
        let mut rng = generation_rng(self.seed, self.generation);
        let outcome = evolve_population_boosted(
            &self.population,
            &scores,
            &self.config,
            self.generation,
            boost,
            &mut self.registry,
            &mut rng,
        )?;
        self.registry.clear_generation_cache();
        self.metrics.record_generation(&outcome.stats, started.elapsed());

        self.lineage.record_all(&outcome.population);
        self.population = outcome.population;
        self.generation += 1;
        self.history.push(outcome.stats.clone());
        Ok(outcome.stats)
    }

    /// Runs `generations` steps and returns their stats.
    pub fn run<E: FitnessEvaluator + ?Sized>(
        &mut self,
        evaluator: &E,
        generations: u32,
    ) -> Result<Vec<PopulationStats>> {
        (0..generations).map(|_| self.step(evaluator)).collect()
    }

    /// Fitness of the current population without evolving it.
    pub fn evaluate<E: FitnessEvaluator + ?Sized>(&self, evaluator: &E) -> Result<Vec<f64>> {
        evaluate_checked(evaluator, &self.population, &self.config).map(|r| fitness_scores(&r))
    }

    /// Current genome with the highest score under `evaluator`.
    pub fn champion<E: FitnessEvaluator + ?Sized>(&self, evaluator: &E) -> Result<CreatureGenome> {
        let scores = self.evaluate(evaluator)?;
        scores
            .iter()
            .enumerate()
            .max_by(|a, b| compare_fitness(*a.1, *b.1))
            .map(|(i, _)| self.population[i].clone())
            .ok_or_else(|| EvolutionError::evaluator("empty population has no champion"))
    }

    #[must_use]
    pub fn population(&self) -> &[CreatureGenome] {
        &self.population
    }

    #[must_use]
    pub fn generation(&self) -> u32 {
        self.generation
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn config(&self) -> &EvolutionConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &InnovationRegistry {
        &self.registry
    }

    #[must_use]
    pub fn adaptive(&self) -> &AdaptiveState {
        &self.adaptive
    }

    #[must_use]
    pub fn lineage(&self) -> &LineageIndex {
        &self.lineage
    }

    #[must_use]
    pub fn history(&self) -> &[PopulationStats] {
        &self.history
    }

    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::FnEvaluator;
    use morphogen_data::FitnessResult;

    fn evaluator() -> FnEvaluator<impl Fn(&CreatureGenome, &EvolutionConfig) -> FitnessResult + Send + Sync> {
        FnEvaluator::new(|g: &CreatureGenome, _: &EvolutionConfig| {
            FitnessResult::scored(g.body.muscles.iter().map(|m| m.amplitude).sum())
        })
    }

    fn config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 10,
            seed: Some(99),
            ..EvolutionConfig::default()
        }
    }

    #[test]
    fn test_step_advances_and_keeps_size() {
        let mut run = EvolutionRun::new(config()).unwrap();
        let stats = run.run(&evaluator(), 3).unwrap();
        assert_eq!(stats.len(), 3);
        assert_eq!(run.generation(), 3);
        assert_eq!(run.population().len(), 10);
        assert_eq!(stats[2].generation, 2);
        assert_eq!(run.metrics().generations(), 3);
    }

    #[test]
    fn test_resume_matches_uninterrupted() {
        let eval = evaluator();
        let mut straight = EvolutionRun::new(config()).unwrap();
        straight.run(&eval, 4).unwrap();

        let mut first = EvolutionRun::new(config()).unwrap();
        first.run(&eval, 2).unwrap();
        let mut resumed = EvolutionRun::from_state(first.to_state()).unwrap();
        resumed.run(&eval, 2).unwrap();

        assert_eq!(straight.population(), resumed.population());
        assert_eq!(straight.history(), resumed.history());
    }

    #[test]
    fn test_state_json_keeps_counters() {
        let mut config = config();
        config.neural.mode = crate::config::NeuralMode::Neat;
        let mut run = EvolutionRun::new(config).unwrap();
        run.run(&evaluator(), 2).unwrap();
        let json = serde_json::to_string(&run.to_state()).unwrap();
        assert!(json.contains("innovationCounterConnection"));
        let state: RunState = serde_json::from_str(&json).unwrap();
        assert_eq!(state.generation, 2);
        assert_eq!(state.innovation_counter_connection, run.registry().connection_counter());
        assert_eq!(state.population.len(), 10);
    }
}
