mod common;

use morphogen_core::config::NeuralMode;
use morphogen_core::run::EvolutionRun;
use morphogen_io::history::{population_digest, read_events, HistoryEvent, HISTORY_FILE};
use morphogen_io::persistence::{load_run_state, load_snapshot, save_run_state};
use morphogen_lib::runner::{RunOptions, Runner, CHECKPOINT_FILE, SNAPSHOT_FILE};
use morphogen_lib::surrogate_evaluator;
use std::path::PathBuf;
use uuid::Uuid;

fn scratch(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("morphogen-{tag}-{}", Uuid::new_v4()))
}

#[test]
fn test_gzip_checkpoint_resumes_exactly() {
    let config = common::ConfigBuilder::new()
        .size(12)
        .mode(NeuralMode::Neat)
        .with(|c| c.seed = Some(31))
        .build();
    let eval = surrogate_evaluator();
    let dir = scratch("checkpoint");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join(CHECKPOINT_FILE);

    let mut straight = EvolutionRun::new(config.clone()).unwrap();
    straight.run(&eval, 4).unwrap();

    let mut first = EvolutionRun::new(config).unwrap();
    first.run(&eval, 2).unwrap();
    save_run_state(&first.to_state(), &path).unwrap();
    drop(first);

    let state = load_run_state(&path).unwrap();
    assert_eq!(state.generation, 2);
    let mut resumed = EvolutionRun::from_state(state).unwrap();
    resumed.run(&eval, 2).unwrap();

    assert_eq!(resumed.generation(), 4);
    assert_eq!(straight.population(), resumed.population());
    assert_eq!(straight.history(), resumed.history());
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_snapshot_matches_last_logged_digest() {
    let out = scratch("snapshot");
    let options = RunOptions {
        generations: 3,
        out_dir: out.clone(),
        checkpoint_every: 0,
        snapshot: true,
    };
    let config = common::ConfigBuilder::new().size(10).build();
    Runner::start(config, options).unwrap().execute(&surrogate_evaluator()).unwrap();

    let snapshot = load_snapshot(out.join(SNAPSHOT_FILE)).unwrap();
    assert_eq!(snapshot.generation, 3);

    let events = read_events(out.join(HISTORY_FILE)).unwrap();
    assert!(matches!(events.first(), Some(HistoryEvent::RunStarted { seed: 7, .. })));
    let last_digest = events
        .iter()
        .rev()
        .find_map(|e| match e {
            HistoryEvent::Generation { digest, .. } => Some(digest.clone()),
            _ => None,
        })
        .unwrap();
    assert_eq!(population_digest(&snapshot.genomes).unwrap(), last_digest);

    // Only the final checkpoint is written when periodic ones are off.
    let checkpoints = events
        .iter()
        .filter(|e| matches!(e, HistoryEvent::Checkpoint { .. }))
        .count();
    assert_eq!(checkpoints, 1);
    std::fs::remove_dir_all(out).ok();
}

#[test]
fn test_missing_checkpoint_is_reported() {
    let err = Runner::resume(&scratch("missing").join(CHECKPOINT_FILE), RunOptions::default());
    assert!(err.is_err());
}
