#![allow(dead_code)]

use morphogen_core::config::{EvolutionConfig, NeuralMode};
use morphogen_core::innovation::InnovationRegistry;
use morphogen_core::population::create_initial_population;
use morphogen_data::{
    BodyGenome, BodyNode, Controller, CreatureGenome, Muscle, NeatConnection, NeatGenome, NeatNode,
    NodeType,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use uuid::Uuid;

pub fn rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Builder over [`EvolutionConfig`] for tests.
pub struct ConfigBuilder {
    config: EvolutionConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: EvolutionConfig {
                population_size: 20,
                seed: Some(7),
                ..EvolutionConfig::default()
            },
        }
    }

    pub fn size(mut self, n: usize) -> Self {
        self.config.population_size = n;
        self
    }

    pub fn mode(mut self, mode: NeuralMode) -> Self {
        self.config.neural.mode = mode;
        self
    }

    pub fn with<F: FnOnce(&mut EvolutionConfig)>(mut self, modifier: F) -> Self {
        modifier(&mut self.config);
        self
    }

    pub fn build(self) -> EvolutionConfig {
        self.config
    }
}

/// Random founders plus the registry that numbered them.
pub fn population(config: &EvolutionConfig, seed: u64) -> (Vec<CreatureGenome>, InnovationRegistry) {
    let mut registry = InnovationRegistry::new();
    let pop = create_initial_population(config, &mut registry, &mut rng(seed)).unwrap();
    registry.clear_generation_cache();
    (pop, registry)
}

/// `0, 1, 2, ...` as fitness.
pub fn ascending(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

pub fn node(id: usize, x: f64) -> BodyNode {
    BodyNode {
        id,
        position: [x, 1.0, 0.0],
        size: 0.5,
        mass: 1.0,
        friction: 0.5,
        restitution: 0.2,
    }
}

pub fn muscle(id: usize, a: usize, b: usize) -> Muscle {
    Muscle {
        id,
        node_a: a,
        node_b: b,
        rest_length: 1.0,
        stiffness: 100.0,
        damping: 0.5,
        frequency: 1.0,
        amplitude: 0.3,
        phase: 0.0,
    }
}

/// A chain body of `nodes` nodes joined by `nodes - 1` muscles.
pub fn chain_body(nodes: usize) -> BodyGenome {
    BodyGenome {
        nodes: (0..nodes).map(|i| node(i, i as f64)).collect(),
        muscles: (1..nodes).map(|i| muscle(i - 1, i - 1, i)).collect(),
        ..BodyGenome::default()
    }
}

pub fn creature(id: u128, body: BodyGenome, controller: Controller) -> CreatureGenome {
    CreatureGenome::founder(Uuid::from_u128(id), body, controller)
}

/// Two inputs (0, 1), one output (2) and the given connections.
pub fn neat(connections: &[(usize, usize, f64, usize)]) -> NeatGenome {
    let mut nodes = vec![
        NeatNode {
            id: 0,
            node_type: NodeType::Input,
            bias: 0.0,
            innovation: None,
        },
        NeatNode {
            id: 1,
            node_type: NodeType::Input,
            bias: 0.0,
            innovation: None,
        },
        NeatNode {
            id: 2,
            node_type: NodeType::Output,
            bias: 0.0,
            innovation: None,
        },
    ];
    for &(from, to, _, _) in connections {
        for id in [from, to] {
            if !nodes.iter().any(|n| n.id == id) {
                nodes.push(NeatNode {
                    id,
                    node_type: NodeType::Hidden,
                    bias: 0.0,
                    innovation: Some(id - 3),
                });
            }
        }
    }
    NeatGenome {
        nodes,
        connections: connections
            .iter()
            .map(|&(from_node, to_node, weight, innovation)| NeatConnection {
                from_node,
                to_node,
                weight,
                enabled: true,
                innovation,
            })
            .collect(),
    }
}
