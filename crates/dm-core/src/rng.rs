//! The model's single random stream.
//!
//! # Determinism strategy
//!
//! Every stochastic decision in a run (sex assignment, event draws, spouse
//! choice, migration durations, ...) is taken from one [`SimRng`] seeded
//! once at startup.  Reproducing a run therefore needs the seed *and* the
//! exact processing order, which the event engine keeps fixed by iterating
//! containers in insertion order and phases in a constant sequence.
//!
//! `SimRng` is deliberately not `Clone`: forking the stream would silently
//! break that property.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

pub struct SimRng {
    inner: SmallRng,
    seed:  u64,
}

impl SimRng {
    pub fn new(seed: u64) -> Self {
        SimRng {
            inner: SmallRng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this stream was created from, kept for the run record.
    #[inline]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.inner
    }

    /// Sample a uniformly distributed value of any `Standard`-distributed type.
    #[inline]
    pub fn random<T>(&mut self) -> T
    where
        rand::distributions::Standard: Distribution<T>,
    {
        self.inner.r#gen()
    }

    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.inner.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.inner.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniform float in `[low, high)`; returns `low` for an empty interval.
    #[inline]
    pub fn uniform(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        self.inner.gen_range(low..high)
    }

    /// Standard normal draw (Box-Muller, one value per call).
    pub fn standard_normal(&mut self) -> f64 {
        // 1 - U keeps the log argument in (0, 1].
        let u1: f64 = 1.0 - self.inner.r#gen::<f64>();
        let u2: f64 = self.inner.r#gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// Choose a random element from a slice, `None` if it is empty.
    #[inline]
    pub fn choose<'a, T>(&mut self, slice: &'a [T]) -> Option<&'a T> {
        use rand::seq::SliceRandom;
        slice.choose(&mut self.inner)
    }

    /// Pick an index with probability proportional to `weights`.
    ///
    /// Returns `None` if the weights are empty, all zero, or invalid
    /// (negative / non-finite).
    pub fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let dist = WeightedIndex::new(weights).ok()?;
        Some(dist.sample(&mut self.inner))
    }
}

impl std::fmt::Debug for SimRng {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimRng").field("seed", &self.seed).finish_non_exhaustive()
    }
}
