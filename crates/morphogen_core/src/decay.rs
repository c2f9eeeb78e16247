//! Mutation schedules: time decay and adaptive stagnation boost.
//!
//! Both produce multipliers that are folded into an effective
//! [`EvolutionConfig`] before offspring are made. Rates are capped at 1.

use crate::config::{AdaptiveConfig, DecayConfig, DecayMode, EvolutionConfig};
use serde::{Deserialize, Serialize};

/// Multiplier for `generation`: 1 when off, otherwise moving from 1 to
/// `final_fraction` over `decay_generations` and staying there.
#[must_use]
pub fn decay_multiplier(decay: &DecayConfig, generation: u32) -> f64 {
    let progress = if decay.decay_generations == 0 {
        1.0
    } else {
        (f64::from(generation) / f64::from(decay.decay_generations)).min(1.0)
    };
    match decay.mode {
        DecayMode::Off => 1.0,
        DecayMode::Linear => 1.0 - (1.0 - decay.final_fraction) * progress,
        DecayMode::Exponential => decay.final_fraction.powf(progress),
    }
}

/// Scales every per-gene mutation rate by `rate_factor` and every
/// perturbation size by `magnitude_factor`. Structural rates are left
/// alone.
#[must_use]
pub fn scale_mutation(config: &EvolutionConfig, rate_factor: f64, magnitude_factor: f64) -> EvolutionConfig {
    let mut scaled = config.clone();
    scaled.mutation.rate = (config.mutation.rate * rate_factor).min(1.0);
    scaled.mutation.magnitude = config.mutation.magnitude * magnitude_factor;
    scaled.neural.rate = (config.neural.rate * rate_factor).min(1.0);
    scaled.neural.magnitude = config.neural.magnitude * magnitude_factor;
    scaled.neat.weight_mutation_rate = (config.neat.weight_mutation_rate * rate_factor).min(1.0);
    scaled.neat.weight_perturb_power = config.neat.weight_perturb_power * magnitude_factor;
    scaled
}

/// Effective configuration for offspring of `generation`, with an extra
/// `boost` on top of the decay multiplier.
#[must_use]
pub fn apply_decay(config: &EvolutionConfig, generation: u32, boost: f64) -> EvolutionConfig {
    let m = decay_multiplier(&config.decay, generation) * boost;
    if m == 1.0 {
        return config.clone();
    }
    scale_mutation(config, m, m)
}

/// Adaptive boost bookkeeping persisted with a run.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AdaptiveState {
    #[serde(alias = "adaptiveBoostLevel")]
    pub boost_level: u32,
    #[serde(alias = "gensSinceBoostChange")]
    pub gens_since_boost_change: u32,
    /// Best raw fitness seen so far.
    pub best_fitness: Option<f64>,
}

impl AdaptiveState {
    /// Restores persisted counters.
    #[must_use]
    pub fn from_counters(boost_level: u32, gens_since_boost_change: u32) -> Self {
        Self {
            boost_level,
            gens_since_boost_change,
            best_fitness: None,
        }
    }

    /// Updates the level from this generation's best fitness. An
    /// improvement steps down one level; `stagnation_generations` without
    /// one steps up.
    pub fn observe(&mut self, best: f64, adaptive: &AdaptiveConfig) {
        if !adaptive.enabled {
            return;
        }
        let improved = best.is_finite()
            && self
                .best_fitness
                .map_or(true, |prev| best > prev + adaptive.improvement_epsilon);
        if improved {
            self.best_fitness = Some(best);
            if self.boost_level > 0 {
                self.boost_level -= 1;
                tracing::debug!(level = self.boost_level, "fitness improved, lowering mutation boost");
            }
            self.gens_since_boost_change = 0;
            return;
        }
        self.gens_since_boost_change += 1;
        if self.gens_since_boost_change >= adaptive.stagnation_generations {
            if self.boost_level < adaptive.max_boost_level {
                self.boost_level += 1;
                tracing::debug!(level = self.boost_level, "fitness stagnated, raising mutation boost");
            }
            self.gens_since_boost_change = 0;
        }
    }

    /// `boost_factor ^ level`, or 1 when disabled.
    #[must_use]
    pub fn multiplier(&self, adaptive: &AdaptiveConfig) -> f64 {
        if !adaptive.enabled {
            return 1.0;
        }
        let exponent = i32::try_from(self.boost_level).unwrap_or(i32::MAX);
        adaptive.boost_factor.powi(exponent)
    }
}
