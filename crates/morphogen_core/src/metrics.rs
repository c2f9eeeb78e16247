//! Run metrics and logging setup.
//!
//! Counters are atomics so an evaluator running on the rayon pool can bump
//! them through a shared reference.

use morphogen_data::PopulationStats;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Cumulative counters of one run.
pub struct Metrics {
    generations: AtomicU64,
    crossover_offspring: AtomicU64,
    mutation_offspring: AtomicU64,
    disqualified: AtomicU64,
    evolve_micros: AtomicU64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self {
            generations: AtomicU64::new(0),
            crossover_offspring: AtomicU64::new(0),
            mutation_offspring: AtomicU64::new(0),
            disqualified: AtomicU64::new(0),
            evolve_micros: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }

    /// Records a finished generation and logs its summary.
    pub fn record_generation(&self, stats: &PopulationStats, duration: Duration) {
        self.generations.fetch_add(1, Ordering::Relaxed);
        self.crossover_offspring
            .fetch_add(stats.crossover_offspring as u64, Ordering::Relaxed);
        self.mutation_offspring
            .fetch_add(stats.mutation_offspring as u64, Ordering::Relaxed);
        self.evolve_micros
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);

        tracing::info!(
            generation = stats.generation,
            best = stats.best_fitness,
            avg = stats.avg_fitness,
            median = stats.median_fitness,
            species = stats.species_count,
            avg_nodes = stats.avg_nodes,
            duration_ms = duration.as_millis() as u64,
            "Generation evolved"
        );
    }

    pub fn record_disqualified(&self, count: usize) {
        self.disqualified.fetch_add(count as u64, Ordering::Relaxed);
    }

    #[must_use]
    pub fn generations(&self) -> u64 {
        self.generations.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn crossover_offspring(&self) -> u64 {
        self.crossover_offspring.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn mutation_offspring(&self) -> u64 {
        self.mutation_offspring.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn disqualified(&self) -> u64 {
        self.disqualified.load(Ordering::Relaxed)
    }

    /// Time spent inside the engine, evaluation excluded.
    #[must_use]
    pub fn evolve_time(&self) -> Duration {
        Duration::from_micros(self.evolve_micros.load(Ordering::Relaxed))
    }

    /// Gets elapsed time since metrics creation.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Installs a fmt subscriber. `RUST_LOG` wins over `default_level`.
/// Calling it twice is harmless.
pub fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing::subscriber::set_global_default(
        tracing_subscriber::fmt().with_env_filter(filter).finish(),
    )
    .ok();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_generation_accumulates() {
        let metrics = Metrics::new();
        let stats = PopulationStats {
            crossover_offspring: 3,
            mutation_offspring: 2,
            ..PopulationStats::default()
        };
        metrics.record_generation(&stats, Duration::from_millis(4));
        metrics.record_generation(&stats, Duration::from_millis(4));
        assert_eq!(metrics.generations(), 2);
        assert_eq!(metrics.crossover_offspring(), 6);
        assert_eq!(metrics.mutation_offspring(), 4);
        assert_eq!(metrics.evolve_time(), Duration::from_millis(8));
    }

    #[test]
    fn test_init_logging_twice() {
        init_logging("warn");
        init_logging("debug");
    }
}
