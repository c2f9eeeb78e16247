use super::topology::{add_connection, add_node, disable_connection, enable_connection};
use super::*;
use crate::sampling::gaussian;

/// Weight and bias mutation followed by one independent trial per
/// structural event type.
pub fn mutate_with_config<R: Rng>(
    genome: &mut NeatGenome,
    neat: &NeatConfig,
    registry: &mut InnovationRegistry,
    rng: &mut R,
) {
    for conn in &mut genome.connections {
        if chance(rng, neat.weight_mutation_rate) {
            conn.weight = mutate_value(conn.weight, neat, rng);
        }
    }
    for node in genome
        .nodes
        .iter_mut()
        .filter(|n| n.node_type != NodeType::Input)
    {
        if chance(rng, neat.weight_mutation_rate) {
            node.bias = mutate_value(node.bias, neat, rng);
        }
    }

    if chance(rng, neat.add_connection_rate) {
        add_connection(genome, neat, registry, rng);
    }
    if chance(rng, neat.add_node_rate) {
        add_node(genome, registry, rng);
    }
    if chance(rng, neat.enable_rate) {
        enable_connection(genome, neat, rng);
    }
    if chance(rng, neat.disable_rate) {
        disable_connection(genome, rng);
    }
}

/// Perturbs with probability `perturb_rate`, otherwise redraws.
fn mutate_value<R: Rng>(value: f64, neat: &NeatConfig, rng: &mut R) -> f64 {
    let next = if chance(rng, neat.perturb_rate) {
        value + gaussian(rng) * neat.weight_perturb_power
    } else {
        symmetric(rng, neat.weight_range)
    };
    clamp_weight(next, neat.weight_limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn quiet() -> NeatConfig {
        NeatConfig {
            add_connection_rate: 0.0,
            add_node_rate: 0.0,
            enable_rate: 0.0,
            disable_rate: 0.0,
            weight_mutation_rate: 0.0,
            ..NeatConfig::default()
        }
    }

    #[test]
    fn test_zero_rates_are_identity() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut registry = InnovationRegistry::new();
        let neat = quiet();
        let original = create_minimal_with_rng(3, 2, &neat, &mut registry, &mut rng);
        let mut g = original.clone();
        mutate_with_config(&mut g, &neat, &mut registry, &mut rng);
        assert_eq!(g, original);
    }

    #[test]
    fn test_weights_stay_within_limit() {
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut registry = InnovationRegistry::new();
        let neat = NeatConfig {
            weight_mutation_rate: 1.0,
            weight_perturb_power: 50.0,
            weight_limit: 2.0,
            ..quiet()
        };
        let mut g = create_minimal_with_rng(3, 2, &neat, &mut registry, &mut rng);
        for _ in 0..20 {
            mutate_with_config(&mut g, &neat, &mut registry, &mut rng);
        }
        assert!(g.connections.iter().all(|c| c.weight.abs() <= 2.0));
        assert!(g.nodes.iter().all(|n| n.bias.abs() <= 2.0));
        assert!(g
            .nodes
            .iter()
            .filter(|n| n.node_type == NodeType::Input)
            .all(|n| n.bias == 0.0));
    }

    #[test]
    fn test_structural_mutation_keeps_genome_valid() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut registry = InnovationRegistry::new();
        let neat = NeatConfig {
            add_connection_rate: 0.5,
            add_node_rate: 0.5,
            enable_rate: 0.3,
            disable_rate: 0.3,
            ..NeatConfig::default()
        };
        let mut g = create_minimal_with_rng(4, 3, &neat, &mut registry, &mut rng);
        for _ in 0..200 {
            mutate_with_config(&mut g, &neat, &mut registry, &mut rng);
            assert!(g.is_well_formed());
            assert_eq!(g.count_of(NodeType::Input), 4);
            assert_eq!(g.count_of(NodeType::Output), 3);
        }
        assert!(g.count_of(NodeType::Hidden) > 0);
    }
}
