//! Fixed-topology controller operators.

use crate::config::{NeatConfig, NeuralConfig, NeuralCrossoverMethod};
use crate::sampling::{chance, gaussian};
pub use morphogen_data::NeuralGenome;
use rand::Rng;

/// Weights and biases of fixed controllers stay inside `[-limit, limit]`.
pub const FIXED_WEIGHT_LIMIT: f64 = 5.0;

pub trait NeuralLogic {
    fn new_random_with_rng<R: Rng>(config: &NeuralConfig, rng: &mut R) -> Self;

    /// Per-parameter Gaussian perturbation with probability `rate`.
    fn mutate_with_rng<R: Rng>(&mut self, rate: f64, magnitude: f64, rng: &mut R);

    fn crossover_with_rng<R: Rng>(&self, other: &Self, config: &NeuralConfig, rng: &mut R) -> Self;

    fn genetic_distance(&self, other: &Self, coefficients: &NeatConfig) -> f64;
}

impl NeuralLogic for NeuralGenome {
    fn new_random_with_rng<R: Rng>(config: &NeuralConfig, rng: &mut R) -> Self {
        let mut genome = NeuralGenome::zeros(config.input_size, config.hidden_size, config.output_size);
        for w in genome.params_mut() {
            *w = rng.gen_range(-1.0..=1.0);
        }
        genome
    }

    fn mutate_with_rng<R: Rng>(&mut self, rate: f64, magnitude: f64, rng: &mut R) {
        for w in self.params_mut() {
            if chance(rng, rate) {
                *w = clamp_weight(*w + gaussian(rng) * magnitude);
            }
        }
    }

    /// Different shapes cannot be aligned; the child is then a copy of
    /// `self`.
    fn crossover_with_rng<R: Rng>(&self, other: &Self, config: &NeuralConfig, rng: &mut R) -> Self {
        let mut child = self.clone();
        if !self.same_shape(other) || !self.is_well_formed() || !other.is_well_formed() {
            return child;
        }
        for (c, &o) in child.params_mut().zip(other.params()) {
            *c = match config.crossover_method {
                NeuralCrossoverMethod::Uniform => {
                    if rng.gen::<bool>() {
                        o
                    } else {
                        *c
                    }
                }
                NeuralCrossoverMethod::Blend => {
                    let t: f64 = rng.gen();
                    t * *c + (1.0 - t) * o
                }
                NeuralCrossoverMethod::Sbx => sbx(*c, o, config.sbx_eta, rng),
            };
            *c = clamp_weight(*c);
        }
        child
    }

    /// Weight term is `c3` times the mean absolute parameter difference over
    /// aligned positions; unaligned parameters count as excess genes.
    fn genetic_distance(&self, other: &Self, coefficients: &NeatConfig) -> f64 {
        let (a, b): (Vec<f64>, Vec<f64>) = (self.params().copied().collect(), other.params().copied().collect());
        let shared = a.len().min(b.len());
        let longest = a.len().max(b.len());
        if longest == 0 {
            return 0.0;
        }
        let weight_diff = if shared == 0 {
            0.0
        } else {
            a.iter().zip(&b).map(|(x, y)| (x - y).abs()).sum::<f64>() / shared as f64
        };
        let unaligned = (longest - shared) as f64;
        let n = if coefficients.normalize_by_size { longest as f64 } else { 1.0 };
        coefficients.excess_coefficient * unaligned / n + coefficients.weight_coefficient * weight_diff
    }
}

fn clamp_weight(w: f64) -> f64 {
    if w.is_nan() {
        0.0
    } else {
        w.clamp(-FIXED_WEIGHT_LIMIT, FIXED_WEIGHT_LIMIT)
    }
}

/// One child of simulated binary crossover with distribution index `eta`.
fn sbx<R: Rng>(x1: f64, x2: f64, eta: f64, rng: &mut R) -> f64 {
    let u: f64 = rng.gen();
    let exponent = 1.0 / (eta + 1.0);
    let beta = if u <= 0.5 {
        (2.0 * u).powf(exponent)
    } else {
        (1.0 / (2.0 * (1.0 - u))).powf(exponent)
    };
    let (c1, c2) = (
        0.5 * ((1.0 + beta) * x1 + (1.0 - beta) * x2),
        0.5 * ((1.0 - beta) * x1 + (1.0 + beta) * x2),
    );
    if rng.gen::<bool>() {
        c1
    } else {
        c2
    }
}
