mod common;

use morphogen_core::config::NeuralMode;
use morphogen_core::speciation::{membership, speciate};
use morphogen_data::Controller;

fn bodies(sizes: &[usize]) -> Vec<morphogen_data::CreatureGenome> {
    sizes
        .iter()
        .enumerate()
        .map(|(i, &n)| common::creature(i as u128, common::chain_body(n), Controller::None))
        .collect()
}

#[test]
fn test_groups_by_threshold_in_input_order() {
    let config = common::ConfigBuilder::new()
        .mode(NeuralMode::Off)
        .with(|c| c.speciation.compatibility_threshold = 3.0)
        .build();
    // Chain distance is twice the node count difference.
    let population = bodies(&[3, 3, 5, 3, 5, 8]);
    let species = speciate(&population, &config);

    assert_eq!(species.len(), 3);
    assert_eq!(species[0].members, vec![0, 1, 3]);
    assert_eq!(species[1].members, vec![2, 4]);
    assert_eq!(species[2].members, vec![5]);
    assert_eq!(species[1].representative, 2);
    assert_eq!(membership(&species, population.len()), vec![0, 0, 1, 0, 1, 2]);
}

#[test]
fn test_every_genome_lands_in_one_species() {
    let config = common::ConfigBuilder::new().size(30).mode(NeuralMode::Neat).build();
    let (population, _) = common::population(&config, 11);
    let species = speciate(&population, &config);
    let mut seen: Vec<usize> = species.iter().flat_map(|s| s.members.iter().copied()).collect();
    seen.sort_unstable();
    assert_eq!(seen, (0..population.len()).collect::<Vec<_>>());
}

#[test]
fn test_order_changes_grouping_deterministically() {
    let config = common::ConfigBuilder::new()
        .mode(NeuralMode::Off)
        .with(|c| c.speciation.compatibility_threshold = 5.0)
        .build();
    // 3 -> 5 -> 7: distance 4 between neighbours, 8 end to end.
    let forward = speciate(&bodies(&[3, 5, 7]), &config);
    let middle_first = speciate(&bodies(&[5, 3, 7]), &config);
    assert_eq!(forward.len(), 2);
    assert_eq!(middle_first.len(), 1);
    assert_eq!(speciate(&bodies(&[3, 5, 7]), &config), forward);
}
