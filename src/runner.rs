//! Drives an [`EvolutionRun`] on disk: history log, periodic checkpoints and
//! the end-of-run artifacts.

use anyhow::{Context, Result};
use morphogen_core::evaluator::FitnessEvaluator;
use morphogen_core::genealogy::DEFAULT_ANCESTOR_BUDGET;
use morphogen_core::run::EvolutionRun;
use morphogen_core::EvolutionConfig;
use morphogen_io::history::HistoryLogger;
use morphogen_io::lineage::AncestryTree;
use morphogen_io::persistence::{load_run_state, save_run_state, save_snapshot, PopulationSnapshot};
use morphogen_io::write_json_file;
use std::path::{Path, PathBuf};
use uuid::Uuid;

pub const CHECKPOINT_FILE: &str = "run.json.gz";
pub const CHAMPION_FILE: &str = "champion.json";
pub const ANCESTRY_FILE: &str = "ancestry.dot";
pub const SNAPSHOT_FILE: &str = "population.rkyv";

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub generations: u32,
    pub out_dir: PathBuf,
    /// Checkpoint every this many generations; 0 only checkpoints at the end.
    pub checkpoint_every: u32,
    /// Also write the final population as an rkyv snapshot.
    pub snapshot: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            generations: 50,
            out_dir: PathBuf::from("runs/latest"),
            checkpoint_every: 10,
            snapshot: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Generation index reached.
    pub generation: u32,
    /// Best raw score over the generations run in this session.
    pub best_fitness: Option<f64>,
    pub champion_id: Option<Uuid>,
    pub checkpoint: PathBuf,
}

pub struct Runner {
    run: EvolutionRun,
    history: HistoryLogger,
    options: RunOptions,
}

impl Runner {
    /// Starts a fresh run in `options.out_dir`.
    pub fn start(config: EvolutionConfig, options: RunOptions) -> Result<Self> {
        let run = EvolutionRun::new(config).context("starting run")?;
        let mut history = HistoryLogger::new_at(&options.out_dir)?;
        history.log_run_started(run.seed(), run.population().len())?;
        Ok(Self { run, history, options })
    }

    /// Continues the run checkpointed at `checkpoint`, appending to the
    /// history in `options.out_dir`.
    pub fn resume(checkpoint: &Path, options: RunOptions) -> Result<Self> {
        let state = load_run_state(checkpoint)
            .with_context(|| format!("loading checkpoint {}", checkpoint.display()))?;
        let run = EvolutionRun::from_state(state).context("restoring run")?;
        tracing::info!(generation = run.generation(), seed = run.seed(), "Run resumed");
        let history = HistoryLogger::new_at(&options.out_dir)?;
        Ok(Self { run, history, options })
    }

    #[must_use]
    pub fn run(&self) -> &EvolutionRun {
        &self.run
    }

    pub fn execute<E: FitnessEvaluator + ?Sized>(&mut self, evaluator: &E) -> Result<RunSummary> {
        let mut best: Option<f64> = None;
        for _ in 0..self.options.generations {
            let stats = self.run.step(evaluator)?;
            self.history.log_generation(&stats, self.run.population())?;
            if stats.best_fitness.is_finite() {
                best = Some(best.map_or(stats.best_fitness, |b| b.max(stats.best_fitness)));
            }
            let every = self.options.checkpoint_every;
            if every > 0 && self.run.generation() % every == 0 {
                self.checkpoint()?;
            }
        }

        let checkpoint = self.checkpoint()?;
        let champion_id = self.write_artifacts(evaluator)?;
        Ok(RunSummary {
            generation: self.run.generation(),
            best_fitness: best,
            champion_id,
            checkpoint,
        })
    }

    fn checkpoint(&mut self) -> Result<PathBuf> {
        let path = self.options.out_dir.join(CHECKPOINT_FILE);
        save_run_state(&self.run.to_state(), &path)?;
        self.history.log_checkpoint(self.run.generation(), &path)?;
        Ok(path)
    }

    fn write_artifacts<E: FitnessEvaluator + ?Sized>(&self, evaluator: &E) -> Result<Option<Uuid>> {
        let out = &self.options.out_dir;
        if self.options.snapshot {
            let snapshot = PopulationSnapshot {
                generation: self.run.generation(),
                genomes: self.run.population().to_vec(),
                stats: self.run.history().last().cloned(),
            };
            save_snapshot(&snapshot, out.join(SNAPSHOT_FILE))?;
        }

        if self.run.population().is_empty() {
            return Ok(None);
        }
        let champion = self.run.champion(evaluator)?;
        write_json_file(&champion, out.join(CHAMPION_FILE))?;

        let tree = AncestryTree::build_ancestry(
            self.run.lineage(),
            self.run.population(),
            champion.id,
            DEFAULT_ANCESTOR_BUDGET,
        );
        std::fs::write(out.join(ANCESTRY_FILE), tree.to_dot())?;
        Ok(Some(champion.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surrogate::surrogate_evaluator;
    use morphogen_io::history::read_generations;
    use morphogen_io::persistence::load_snapshot;

    fn options(generations: u32) -> RunOptions {
        RunOptions {
            generations,
            out_dir: std::env::temp_dir().join(format!("morphogen-runner-{}", Uuid::new_v4())),
            checkpoint_every: 2,
            snapshot: true,
        }
    }

    fn config() -> EvolutionConfig {
        EvolutionConfig {
            population_size: 8,
            seed: Some(21),
            ..EvolutionConfig::default()
        }
    }

    #[test]
    fn test_execute_writes_artifacts() {
        let opts = options(3);
        let out = opts.out_dir.clone();
        let mut runner = Runner::start(config(), opts).unwrap();
        let summary = runner.execute(&surrogate_evaluator()).unwrap();

        assert_eq!(summary.generation, 3);
        assert!(summary.champion_id.is_some());
        assert!(summary.checkpoint.exists());
        assert!(out.join(CHAMPION_FILE).exists());
        assert!(out.join(ANCESTRY_FILE).exists());
        assert_eq!(load_snapshot(out.join(SNAPSHOT_FILE)).unwrap().genomes.len(), 8);
        assert_eq!(read_generations(out.join("history.jsonl")).unwrap().len(), 3);
        std::fs::remove_dir_all(out).ok();
    }

    #[test]
    fn test_resume_continues_generation_count() {
        let opts = options(2);
        let out = opts.out_dir.clone();
        Runner::start(config(), opts.clone())
            .unwrap()
            .execute(&surrogate_evaluator())
            .unwrap();

        let mut resumed = Runner::resume(&out.join(CHECKPOINT_FILE), opts).unwrap();
        let summary = resumed.execute(&surrogate_evaluator()).unwrap();
        assert_eq!(summary.generation, 4);
        assert_eq!(resumed.run().history().len(), 4);
        std::fs::remove_dir_all(out).ok();
    }
}
