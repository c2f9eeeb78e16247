mod common;

use morphogen_core::config::{SelectionConfig, SelectionMethod};
use morphogen_core::selection::{by_species, rank, select_survivors, survivor_quota, tournament, truncation};
use morphogen_core::speciation::Species;
use std::collections::HashSet;

fn distinct(picked: &[usize]) -> bool {
    picked.iter().collect::<HashSet<_>>().len() == picked.len()
}

#[test]
fn test_quota_rounds_and_clamps() {
    let selection = |cull: f64, elites: Option<usize>| SelectionConfig {
        cull_percentage: cull,
        elite_count: elites,
        ..SelectionConfig::default()
    };
    assert_eq!(survivor_quota(10, &selection(0.5, None)), 5);
    assert_eq!(survivor_quota(7, &selection(0.5, None)), 4);
    assert_eq!(survivor_quota(3, &selection(0.9, None)), 1);
    assert_eq!(survivor_quota(10, &selection(0.9, Some(4))), 4);
    assert_eq!(survivor_quota(2, &selection(0.1, Some(9))), 2);
    assert_eq!(survivor_quota(0, &selection(0.5, None)), 0);
}

#[test]
fn test_truncation_keeps_best() {
    let fitness = [3.0, 9.0, 1.0, 7.0, 5.0];
    assert_eq!(truncation(&[0, 1, 2, 3, 4], &fitness, 2), vec![1, 3]);
}

#[test]
fn test_nan_never_outranks_a_score() {
    let fitness = [f64::NAN, -50.0, f64::NAN, 2.0];
    assert_eq!(truncation(&[0, 1, 2, 3], &fitness, 2), vec![3, 1]);
}

#[test]
fn test_tournament_winners_are_distinct() {
    let fitness = common::ascending(20);
    let pool: Vec<usize> = (0..20).collect();
    for seed in 0..10 {
        let picked = tournament(&pool, &fitness, 10, 3, &mut common::rng(seed));
        assert_eq!(picked.len(), 10);
        assert!(distinct(&picked));
    }
}

#[test]
fn test_full_tournament_is_truncation() {
    // With a huge tournament every draw nearly always finds the best left.
    let fitness = common::ascending(6);
    let pool: Vec<usize> = (0..6).collect();
    let picked = tournament(&pool, &fitness, 1, 200, &mut common::rng(5));
    assert_eq!(picked, vec![5]);
}

#[test]
fn test_rank_samples_without_replacement() {
    let fitness = common::ascending(12);
    let pool: Vec<usize> = (0..12).collect();
    let picked = rank(&pool, &fitness, 12, 2.0, &mut common::rng(3));
    let mut sorted = picked.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, pool);
}

#[test]
fn test_rank_favours_the_top() {
    let fitness = common::ascending(10);
    let pool: Vec<usize> = (0..10).collect();
    let mut best_hits = 0;
    let mut worst_hits = 0;
    for seed in 0..200 {
        let picked = rank(&pool, &fitness, 1, 1.0, &mut common::rng(seed));
        match picked[0] {
            9 => best_hits += 1,
            0 => worst_hits += 1,
            _ => {}
        }
    }
    assert!(best_hits > worst_hits * 3, "best {best_hits} worst {worst_hits}");
}

#[test]
fn test_species_minimum_is_guaranteed() {
    let fitness = [10.0, 9.0, 8.0, 7.0, 0.5, 0.1];
    let species = vec![
        Species {
            id: 0,
            representative: 0,
            members: vec![0, 1, 2, 3],
        },
        Species {
            id: 1,
            representative: 4,
            members: vec![4, 5],
        },
    ];
    let picked = by_species(&[0, 1, 2, 3, 4, 5], &fitness, &species, 3, 1);
    assert_eq!(picked.len(), 3);
    assert!(picked.contains(&4), "weak species keeps its best member");
    assert!(picked.contains(&0));
    assert!(distinct(&picked));
}

#[test]
fn test_elites_always_survive() {
    let config = common::ConfigBuilder::new()
        .with(|c| {
            c.selection.method = SelectionMethod::Tournament;
            c.selection.tournament_size = 1;
            c.selection.elite_count = Some(2);
        })
        .build();
    let fitness = common::ascending(10);
    for seed in 0..10 {
        let survivors = select_survivors(&fitness, &fitness, &[], &config, &mut common::rng(seed));
        assert_eq!(survivors.len(), 5);
        assert_eq!(&survivors[..2], &[9, 8]);
        assert!(distinct(&survivors));
    }
}

#[test]
fn test_elites_use_raw_fitness() {
    let config = common::ConfigBuilder::new()
        .with(|c| {
            c.selection.elite_count = Some(1);
            c.selection.cull_percentage = 0.9;
        })
        .build();
    let raw = [1.0, 5.0, 2.0];
    let shared = [9.0, 0.1, 2.0];
    let survivors = select_survivors(&raw, &shared, &[], &config, &mut common::rng(0));
    assert_eq!(survivors, vec![1]);
}
