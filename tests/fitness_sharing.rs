mod common;

use morphogen_core::config::NeuralMode;
use morphogen_core::sharing::{niche_counts, shared_fitness, sharing_kernel};
use morphogen_core::EvolutionError;
use morphogen_data::Controller;

#[test]
fn test_kernel_boundaries() {
    for radius in [0.5, 3.0, 12.0] {
        assert_eq!(sharing_kernel(0.0, radius, 1.0), 1.0);
        assert_eq!(sharing_kernel(radius, radius, 1.0), 0.0);
        assert_eq!(sharing_kernel(radius * 1.5, radius, 1.0), 0.0);
    }
}

#[test]
fn test_identical_trio_splits_and_loner_keeps_fitness() {
    let config = common::ConfigBuilder::new()
        .mode(NeuralMode::Off)
        .with(|c| {
            c.sharing.use_fitness_sharing = true;
            c.sharing.sharing_radius = 3.0;
        })
        .build();
    let twin = common::chain_body(3);
    let population = vec![
        common::creature(1, twin.clone(), Controller::None),
        common::creature(2, twin.clone(), Controller::None),
        common::creature(3, twin, Controller::None),
        common::creature(4, common::chain_body(10), Controller::None),
    ];

    let shared = shared_fitness(&population, &[100.0; 4], &config).unwrap();
    for s in &shared[..3] {
        assert!((s - 100.0 / 3.0).abs() < 1e-9, "got {s}");
    }
    assert!((shared[3] - 100.0).abs() < 1e-9);
    assert_eq!(niche_counts(&population, &config), vec![3.0, 3.0, 3.0, 1.0]);
}

#[test]
fn test_length_mismatch_rejected() {
    let config = common::ConfigBuilder::new().build();
    let (population, _) = common::population(&config, 1);
    let err = shared_fitness(&population, &[1.0, 2.0], &config).unwrap_err();
    assert_eq!(
        err,
        EvolutionError::LengthMismatch {
            genomes: population.len(),
            scores: 2
        }
    );
}
