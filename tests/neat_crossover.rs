mod common;

use common::neat;
use morphogen_core::config::NeatConfig;
use morphogen_core::neat::alignment::GeneAlignment;
use morphogen_core::neat::NeatLogic;
use std::collections::HashSet;

#[test]
fn test_innovation_beyond_other_max_is_excess() {
    // A carries {0, 1, 2, 3}; B carries {0, 1, 2, 5}. Gene 5 lies past A's
    // max of 3, so it is excess; gene 3 lies inside B's range, so disjoint.
    let a = neat(&[(0, 2, 0.5, 0), (1, 2, 0.5, 1), (0, 3, 1.0, 2), (3, 2, 1.0, 3)]);
    let b = neat(&[(0, 2, 0.5, 0), (1, 2, 0.5, 1), (0, 3, 1.0, 2), (1, 3, 1.0, 5)]);
    let alignment = GeneAlignment::new(&a, &b);

    assert_eq!(alignment.matching.len(), 3);
    let excess: Vec<usize> = alignment.excess_b.iter().map(|c| c.innovation).collect();
    assert_eq!(excess, vec![5]);
    let disjoint: Vec<usize> = alignment.disjoint_a.iter().map(|c| c.innovation).collect();
    assert_eq!(disjoint, vec![3]);
    assert!(alignment.excess_a.is_empty());
    assert!(alignment.disjoint_b.is_empty());
}

#[test]
fn test_child_is_structurally_valid() {
    let a = neat(&[(0, 2, 0.5, 0), (1, 2, -0.5, 1), (0, 3, 1.0, 2), (3, 2, 1.0, 3)]);
    let b = neat(&[(0, 2, 0.1, 0), (1, 4, 1.0, 4), (4, 2, 1.0, 5)]);
    let config = NeatConfig::default();
    for seed in 0..20 {
        for (fa, fb) in [(1.0, 2.0), (2.0, 1.0), (1.0, 1.0)] {
            let child = a.crossover_with_rng(&b, fa, fb, &config, &mut common::rng(seed));
            let ids: HashSet<usize> = child.nodes.iter().map(|n| n.id).collect();
            for c in &child.connections {
                assert!(ids.contains(&c.from_node) && ids.contains(&c.to_node));
            }
            let innovations: Vec<usize> = child.connections.iter().map(|c| c.innovation).collect();
            let mut sorted = innovations.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(innovations, sorted, "genes sorted by innovation without duplicates");
        }
    }
}

#[test]
fn test_fitter_parent_supplies_unmatched_genes() {
    let a = neat(&[(0, 2, 0.5, 0), (0, 3, 1.0, 2), (3, 2, 1.0, 3)]);
    let b = neat(&[(0, 2, 0.5, 0), (1, 2, 1.0, 1)]);
    let config = NeatConfig::default();
    let child = a.crossover_with_rng(&b, 0.0, 10.0, &config, &mut common::rng(4));
    let innovations: Vec<usize> = child.connections.iter().map(|c| c.innovation).collect();
    assert_eq!(innovations, vec![0, 1]);
    assert!(child.nodes.iter().all(|n| n.id != 3));
}

#[test]
fn test_equal_fitness_inherits_from_both() {
    let a = neat(&[(0, 2, 0.5, 0), (0, 3, 1.0, 2), (3, 2, 1.0, 3)]);
    let b = neat(&[(0, 2, 0.5, 0), (1, 2, 1.0, 1)]);
    let config = NeatConfig {
        feedforward_only: false,
        ..NeatConfig::default()
    };
    let child = a.crossover_with_rng(&b, 3.0, 3.0, &config, &mut common::rng(4));
    let innovations: Vec<usize> = child.connections.iter().map(|c| c.innovation).collect();
    assert_eq!(innovations, vec![0, 1, 2, 3]);
}
