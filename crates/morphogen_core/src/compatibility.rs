//! Genomic distance used by speciation and fitness sharing.

use crate::body::{BodyLogic, AMPLITUDE, FREQUENCY};
use crate::config::{EvolutionConfig, NeatConfig, SharingConfig};
use crate::neat::alignment::GeneAlignment;
use crate::neural::NeuralLogic;
use morphogen_data::{BodyGenome, Controller, CreatureGenome, NeatGenome};
use std::collections::HashMap;

/// `c1 * E / N + c2 * D / N + c3 * W̄`.
///
/// Two genomes without connections fall back to the mean absolute bias
/// difference over the node ids they share, or 0 with none shared.
#[must_use]
pub fn neat_distance(a: &NeatGenome, b: &NeatGenome, neat: &NeatConfig) -> f64 {
    if a.connections.is_empty() && b.connections.is_empty() {
        return bias_distance(a, b);
    }
    let alignment = GeneAlignment::new(a, b);
    let n = if neat.normalize_by_size {
        a.connections.len().max(b.connections.len()).max(1) as f64
    } else {
        1.0
    };
    neat.excess_coefficient * alignment.excess_count() as f64 / n
        + neat.disjoint_coefficient * alignment.disjoint_count() as f64 / n
        + neat.weight_coefficient * alignment.mean_weight_difference()
}

fn bias_distance(a: &NeatGenome, b: &NeatGenome) -> f64 {
    let biases: HashMap<usize, f64> = a.nodes.iter().map(|n| (n.id, n.bias)).collect();
    let diffs: Vec<f64> = b
        .nodes
        .iter()
        .filter_map(|n| biases.get(&n.id).map(|bias| (bias - n.bias).abs()))
        .collect();
    if diffs.is_empty() {
        0.0
    } else {
        diffs.iter().sum::<f64>() / diffs.len() as f64
    }
}

/// Structural body distance: weighted node and muscle count differences
/// plus the mean range-normalized frequency and amplitude difference over
/// muscle positions both bodies have.
#[must_use]
pub fn body_distance(a: &BodyGenome, b: &BodyGenome, sharing: &SharingConfig) -> f64 {
    let node_diff = a.nodes.len().abs_diff(b.nodes.len()) as f64;
    let muscle_diff = a.muscles.len().abs_diff(b.muscles.len()) as f64;
    let shared = a.muscles.len().min(b.muscles.len());
    let param_diff = if shared == 0 {
        0.0
    } else {
        let total: f64 = a
            .muscles
            .iter()
            .zip(&b.muscles)
            .map(|(ma, mb)| {
                let freq = (ma.frequency - mb.frequency).abs() / FREQUENCY.span();
                let amp = (ma.amplitude - mb.amplitude).abs() / AMPLITUDE.span();
                (freq + amp) / 2.0
            })
            .sum();
        total / shared as f64
    };
    sharing.node_weight * node_diff
        + sharing.muscle_weight * muscle_diff
        + sharing.param_weight * param_diff
}

/// Distance between two creatures: the controller metric when both carry
/// the same kind of network, else the body metric.
#[must_use]
pub fn genome_distance(a: &CreatureGenome, b: &CreatureGenome, config: &EvolutionConfig) -> f64 {
    match (&a.controller, &b.controller) {
        (Controller::Neat(na), Controller::Neat(nb)) => neat_distance(na, nb, &config.neat),
        (Controller::Fixed(fa), Controller::Fixed(fb)) => fa.genetic_distance(fb, &config.neat),
        _ => a.body.structural_distance(&b.body, &config.sharing),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morphogen_data::{NeatConnection, NeatNode, NodeType};

    fn conn(innovation: usize, weight: f64) -> NeatConnection {
        NeatConnection {
            from_node: 0,
            to_node: innovation + 1,
            weight,
            enabled: true,
            innovation,
        }
    }

    fn node(id: usize, bias: f64) -> NeatNode {
        NeatNode {
            id,
            node_type: NodeType::Output,
            bias,
            innovation: None,
        }
    }

    #[test]
    fn test_neat_distance_formula() {
        let a = NeatGenome {
            nodes: Vec::new(),
            connections: vec![conn(0, 1.0), conn(1, 1.0), conn(2, 1.0), conn(5, 1.0)],
        };
        let b = NeatGenome {
            nodes: Vec::new(),
            connections: vec![conn(0, 0.0), conn(1, 1.0), conn(2, 1.0), conn(3, 1.0)],
        };
        let neat = NeatConfig::default();
        // E = 1 (5), D = 1 (3), W = 1/3, N = 4.
        let expected = 1.0 / 4.0 + 1.0 / 4.0 + 0.4 / 3.0;
        assert!((neat_distance(&a, &b, &neat) - expected).abs() < 1e-12);
        assert!((neat_distance(&b, &a, &neat) - expected).abs() < 1e-12);
        assert_eq!(neat_distance(&a, &a, &neat), 0.0);

        let unnormalized = NeatConfig {
            normalize_by_size: false,
            ..neat
        };
        let expected = 1.0 + 1.0 + 0.4 / 3.0;
        assert!((neat_distance(&a, &b, &unnormalized) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_genomes_use_bias_difference() {
        let a = NeatGenome {
            nodes: vec![node(0, 0.5), node(1, 1.0)],
            connections: Vec::new(),
        };
        let b = NeatGenome {
            nodes: vec![node(1, 0.0), node(7, 3.0)],
            connections: Vec::new(),
        };
        let neat = NeatConfig::default();
        assert_eq!(neat_distance(&a, &b, &neat), 1.0);
        let c = NeatGenome {
            nodes: vec![node(9, 2.0)],
            connections: Vec::new(),
        };
        assert_eq!(neat_distance(&a, &c, &neat), 0.0);
    }

    #[test]
    fn test_body_distance_counts() {
        let a = BodyGenome::default();
        let mut b = BodyGenome::default();
        b.nodes.push(morphogen_data::BodyNode {
            id: 0,
            position: [0.0; 3],
            size: 0.5,
            mass: 1.0,
            friction: 0.5,
            restitution: 0.2,
        });
        let sharing = SharingConfig::default();
        assert_eq!(body_distance(&a, &b, &sharing), 1.0);
        assert_eq!(body_distance(&b, &a, &sharing), 1.0);
        assert_eq!(body_distance(&b, &b, &sharing), 0.0);
    }
}
