pub mod crossover;
pub mod mutation;
pub mod topology;

use crate::config::{BodyConfig, BodyCrossoverMethod, EvolutionConfig, SharingConfig};
use crate::sampling::gaussian;
pub use morphogen_data::{BodyGenome, BodyNode, Muscle};
use rand::Rng;
use std::f64::consts::TAU;

/// Closed interval a numeric body gene must stay inside.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneRange {
    pub min: f64,
    pub max: f64,
}

impl GeneRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.clamp(self.min, self.max)
    }

    pub fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        rng.gen_range(self.min..=self.max)
    }

    /// Gaussian step scaled by `magnitude` times the range span, clamped.
    pub fn perturb<R: Rng>(&self, value: f64, magnitude: f64, rng: &mut R) -> f64 {
        self.clamp(value + gaussian(rng) * magnitude * self.span())
    }
}

pub const POSITION_XZ: GeneRange = GeneRange::new(-10.0, 10.0);
pub const POSITION_Y: GeneRange = GeneRange::new(0.1, 10.0);
pub const NODE_SIZE: GeneRange = GeneRange::new(0.2, 1.0);
pub const NODE_MASS: GeneRange = GeneRange::new(0.1, 5.0);
pub const NODE_FRICTION: GeneRange = GeneRange::new(0.0, 1.0);
pub const NODE_RESTITUTION: GeneRange = GeneRange::new(0.0, 1.0);
pub const REST_LENGTH: GeneRange = GeneRange::new(0.1, 10.0);
pub const STIFFNESS: GeneRange = GeneRange::new(10.0, 500.0);
pub const DAMPING: GeneRange = GeneRange::new(0.0, 1.0);
pub const FREQUENCY: GeneRange = GeneRange::new(0.1, 5.0);
pub const AMPLITUDE: GeneRange = GeneRange::new(0.05, 0.6);
pub const GLOBAL_MULTIPLIER: GeneRange = GeneRange::new(0.25, 4.0);

/// Wraps a phase into `[0, 2π)`.
#[must_use]
pub fn wrap_phase(phase: f64) -> f64 {
    if phase.is_finite() {
        phase.rem_euclid(TAU)
    } else {
        0.0
    }
}

/// Body genome operators.
pub trait BodyLogic {
    fn new_random_with_rng<R: Rng>(config: &BodyConfig, rng: &mut R) -> Self;

    fn mutate_with_config<R: Rng>(&mut self, config: &EvolutionConfig, rng: &mut R);

    /// Child of `self` (primary parent) and `other`.
    fn crossover_with_rng<R: Rng>(
        &self,
        other: &Self,
        method: BodyCrossoverMethod,
        bounds: &BodyConfig,
        rng: &mut R,
    ) -> Self;

    fn structural_distance(&self, other: &Self, config: &SharingConfig) -> f64;
}

impl BodyLogic for BodyGenome {
    fn new_random_with_rng<R: Rng>(config: &BodyConfig, rng: &mut R) -> Self {
        topology::create_body_random_with_rng(config, rng)
    }

    fn mutate_with_config<R: Rng>(&mut self, config: &EvolutionConfig, rng: &mut R) {
        mutation::mutate_with_config(self, config, rng)
    }

    fn crossover_with_rng<R: Rng>(
        &self,
        other: &Self,
        method: BodyCrossoverMethod,
        bounds: &BodyConfig,
        rng: &mut R,
    ) -> Self {
        crossover::body_crossover_with_rng(self, other, method, bounds, rng)
    }

    fn structural_distance(&self, other: &Self, config: &SharingConfig) -> f64 {
        crate::compatibility::body_distance(self, other, config)
    }
}
