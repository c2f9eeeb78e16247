//! Whole-creature operators built from the body and controller operators.

use crate::body::BodyLogic;
use crate::config::{EvolutionConfig, NeuralMode};
use crate::innovation::InnovationRegistry;
use crate::neat::NeatLogic;
use crate::neural::NeuralLogic;
use crate::sampling::fresh_id;
use morphogen_data::{BodyGenome, Controller, CreatureGenome, NeatGenome, NeuralGenome};
use rand::Rng;
use uuid::Uuid;

pub trait CreatureLogic {
    /// Random founder with a controller matching `neural.mode`.
    fn new_random_with_rng<R: Rng>(
        config: &EvolutionConfig,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) -> Self;

    /// Mutates the body and whichever controller the genome carries. The
    /// two halves draw from independent rates.
    fn mutate_with_config<R: Rng>(
        &mut self,
        config: &EvolutionConfig,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    );

    /// Child with `self` as primary parent. Controllers of different kinds
    /// are not recombined; the child keeps the primary's.
    fn crossover_with_rng<R: Rng>(
        &self,
        other: &Self,
        self_fitness: f64,
        other_fitness: f64,
        config: &EvolutionConfig,
        rng: &mut R,
    ) -> Self;

    /// Stamps offspring identity: fresh id, no streak, parents, birth
    /// generation.
    fn into_offspring<R: Rng>(self, parents: Vec<Uuid>, birth_generation: u32, rng: &mut R) -> Self;
}

impl CreatureLogic for CreatureGenome {
    fn new_random_with_rng<R: Rng>(
        config: &EvolutionConfig,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) -> Self {
        let body = BodyGenome::new_random_with_rng(&config.body, rng);
        let controller = match config.neural.mode {
            NeuralMode::Off => Controller::None,
            NeuralMode::Fixed => Controller::Fixed(NeuralGenome::new_random_with_rng(&config.neural, rng)),
            NeuralMode::Neat => Controller::Neat(NeatGenome::new_minimal_with_rng(
                &config.neural,
                &config.neat,
                registry,
                rng,
            )),
        };
        CreatureGenome::founder(fresh_id(rng), body, controller)
    }

    fn mutate_with_config<R: Rng>(
        &mut self,
        config: &EvolutionConfig,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) {
        self.body.mutate_with_config(config, rng);
        match &mut self.controller {
            Controller::None => {}
            Controller::Fixed(net) => net.mutate_with_rng(config.neural.rate, config.neural.magnitude, rng),
            Controller::Neat(net) => net.mutate_with_config(&config.neat, registry, rng),
        }
    }

    fn crossover_with_rng<R: Rng>(
        &self,
        other: &Self,
        self_fitness: f64,
        other_fitness: f64,
        config: &EvolutionConfig,
        rng: &mut R,
    ) -> Self {
        let body = self
            .body
            .crossover_with_rng(&other.body, config.crossover.body_method, &config.body, rng);
        let controller = match (&self.controller, &other.controller) {
            (Controller::Fixed(a), Controller::Fixed(b)) => {
                Controller::Fixed(a.crossover_with_rng(b, &config.neural, rng))
            }
            (Controller::Neat(a), Controller::Neat(b)) => Controller::Neat(a.crossover_with_rng(
                b,
                self_fitness,
                other_fitness,
                &config.neat,
                rng,
            )),
            (own, _) => own.clone(),
        };
        CreatureGenome {
            body,
            controller,
            ..self.clone()
        }
    }

    fn into_offspring<R: Rng>(mut self, parents: Vec<Uuid>, birth_generation: u32, rng: &mut R) -> Self {
        self.id = fresh_id(rng);
        self.parent_ids = parents;
        self.survival_streak = 0;
        self.birth_generation = birth_generation;
        self
    }
}
