//! Random draws shared by the mutation and crossover operators.

use rand::Rng;
use rand_distr::StandardNormal;
use uuid::Uuid;

/// Bernoulli trial that tolerates probabilities outside `[0, 1]`.
///
/// Decay and adaptive boosts can push an effective rate past 1.0, which
/// `Rng::gen_bool` would reject.
pub fn chance<R: Rng>(rng: &mut R, p: f64) -> bool {
    rng.gen::<f64>() < p
}

/// Standard normal sample.
pub fn gaussian<R: Rng>(rng: &mut R) -> f64 {
    rng.sample(StandardNormal)
}

/// Uniform sample from `[-range, range]`; zero when `range` is not positive.
pub fn symmetric<R: Rng>(rng: &mut R, range: f64) -> f64 {
    if range > 0.0 {
        rng.gen_range(-range..=range)
    } else {
        0.0
    }
}

/// Creature id drawn from the run's RNG so seeded runs stay reproducible.
pub fn fresh_id<R: Rng>(rng: &mut R) -> Uuid {
    Uuid::from_u128(rng.gen::<u128>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_chance_extremes() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!((0..100).all(|_| !chance(&mut rng, 0.0)));
        assert!((0..100).all(|_| chance(&mut rng, 1.5)));
    }

    #[test]
    fn test_symmetric_zero_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert_eq!(symmetric(&mut rng, 0.0), 0.0);
        let v = symmetric(&mut rng, 2.0);
        assert!((-2.0..=2.0).contains(&v));
    }

    #[test]
    fn test_fresh_id_is_seeded() {
        let a = fresh_id(&mut ChaCha8Rng::seed_from_u64(9));
        let b = fresh_id(&mut ChaCha8Rng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
