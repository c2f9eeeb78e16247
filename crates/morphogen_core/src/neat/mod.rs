//! Evolvable-topology controllers.
//!
//! Structure only grows through the [`InnovationRegistry`], so two genomes
//! that made the same structural change in the same generation carry the
//! same innovation ids and line up gene for gene in crossover and distance.
//!
//! Node ids: inputs are `0..inputs`, outputs follow, and a hidden node
//! created by node innovation `k` gets id `io_count + k`.

pub mod alignment;
pub mod crossover;
pub mod mutation;
pub mod topology;

use crate::config::{NeatConfig, NeuralConfig};
use crate::innovation::InnovationRegistry;
use crate::sampling::{chance, symmetric};
pub use morphogen_data::{NeatConnection, NeatGenome, NeatNode, NodeType};
use rand::Rng;

pub trait NeatLogic {
    fn new_minimal_with_rng<R: Rng>(
        neural: &NeuralConfig,
        neat: &NeatConfig,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) -> Self;

    fn mutate_with_config<R: Rng>(
        &mut self,
        neat: &NeatConfig,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    );

    /// Aligned crossover; disjoint and excess genes follow the fitter
    /// parent, or both parents on a tie.
    fn crossover_with_rng<R: Rng>(
        &self,
        other: &Self,
        self_fitness: f64,
        other_fitness: f64,
        neat: &NeatConfig,
        rng: &mut R,
    ) -> Self;

    fn compatibility_distance(&self, other: &Self, neat: &NeatConfig) -> f64;

    fn would_create_cycle(&self, from: usize, to: usize) -> bool;
}

impl NeatLogic for NeatGenome {
    fn new_minimal_with_rng<R: Rng>(
        neural: &NeuralConfig,
        neat: &NeatConfig,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) -> Self {
        create_minimal_with_rng(neural.input_size, neural.output_size, neat, registry, rng)
    }

    fn mutate_with_config<R: Rng>(
        &mut self,
        neat: &NeatConfig,
        registry: &mut InnovationRegistry,
        rng: &mut R,
    ) {
        mutation::mutate_with_config(self, neat, registry, rng)
    }

    fn crossover_with_rng<R: Rng>(
        &self,
        other: &Self,
        self_fitness: f64,
        other_fitness: f64,
        neat: &NeatConfig,
        rng: &mut R,
    ) -> Self {
        crossover::neat_crossover_with_rng(self, other, self_fitness, other_fitness, neat, rng)
    }

    fn compatibility_distance(&self, other: &Self, neat: &NeatConfig) -> f64 {
        crate::compatibility::neat_distance(self, other, neat)
    }

    fn would_create_cycle(&self, from: usize, to: usize) -> bool {
        topology::would_create_cycle(self, from, to)
    }
}

/// Inputs wired straight to outputs; each pair is connected with
/// probability `initial_connectivity`.
pub fn create_minimal_with_rng<R: Rng>(
    inputs: usize,
    outputs: usize,
    neat: &NeatConfig,
    registry: &mut InnovationRegistry,
    rng: &mut R,
) -> NeatGenome {
    let mut genome = NeatGenome::default();
    for id in 0..inputs {
        genome.nodes.push(NeatNode {
            id,
            node_type: NodeType::Input,
            bias: 0.0,
            innovation: None,
        });
    }
    for id in inputs..inputs + outputs {
        genome.nodes.push(NeatNode {
            id,
            node_type: NodeType::Output,
            bias: 0.0,
            innovation: None,
        });
    }
    for from in 0..inputs {
        for to in inputs..inputs + outputs {
            if chance(rng, neat.initial_connectivity) {
                genome.connections.push(NeatConnection {
                    from_node: from,
                    to_node: to,
                    weight: symmetric(rng, neat.weight_range),
                    enabled: true,
                    innovation: registry.connection_innovation(from, to),
                });
            }
        }
    }
    genome
}

/// Id a hidden node created by node innovation `innovation` takes.
#[must_use]
pub fn hidden_node_id(genome: &NeatGenome, innovation: usize) -> usize {
    genome.io_count() + innovation
}

pub(crate) fn clamp_weight(w: f64, limit: f64) -> f64 {
    if w.is_nan() {
        0.0
    } else {
        w.clamp(-limit, limit)
    }
}
