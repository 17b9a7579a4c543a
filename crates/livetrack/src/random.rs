//! Pluggable randomness for the simulated feeds.
//!
//! Every random choice the generators make goes through [`RandomSource`], so
//! tests can swap in [`ScriptedRandom`] and assert exact event sequences.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// A source of uniformly distributed values in `[0, 1)`.
pub trait RandomSource: Send + std::fmt::Debug {
    /// Draw the next value in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Pick an index in `0..len`, scaling a unit draw the way a
    /// `floor(random * len)` lookup does.
    ///
    /// `len` must be non-zero.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    fn pick_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0, "pick_index called with an empty range");
        let idx = (self.next_unit() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }

    /// Draw a value uniformly from `[low, high)`.
    fn in_range(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_unit() * (high - low)
    }

    /// Return `true` with probability `p`.
    fn chance(&mut self, p: f64) -> bool {
        self.next_unit() < p
    }
}

impl<R: RandomSource + ?Sized> RandomSource for Box<R> {
    fn next_unit(&mut self) -> f64 {
        (**self).next_unit()
    }
}

/// Draws from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_unit(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// A reproducible generator seeded from a `u64`.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    /// Create a generator from a fixed seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_unit(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of unit values, cycling when exhausted.
#[derive(Debug, Clone)]
pub struct ScriptedRandom {
    values: Vec<f64>,
    cursor: usize,
}

impl ScriptedRandom {
    /// Create a scripted source.
    ///
    /// Values are clamped into `[0, 1)`. An empty script always yields `0.0`.
    #[must_use]
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        let values = values
            .into_iter()
            .map(|v| v.clamp(0.0, 1.0 - f64::EPSILON))
            .collect();
        Self { values, cursor: 0 }
    }

    /// Number of values drawn so far.
    #[must_use]
    pub fn draws(&self) -> usize {
        self.cursor
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.cursor % self.values.len()];
        self.cursor += 1;
        value
    }
}

/// Build the boxed source a session should use: seeded when a seed is
/// configured, thread-local otherwise.
#[must_use]
pub fn from_seed(seed: Option<u64>) -> Box<dyn RandomSource> {
    match seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_replays_in_order() {
        let mut rng = ScriptedRandom::new([0.1, 0.2, 0.3]);
        assert!((rng.next_unit() - 0.1).abs() < f64::EPSILON);
        assert!((rng.next_unit() - 0.2).abs() < f64::EPSILON);
        assert!((rng.next_unit() - 0.3).abs() < f64::EPSILON);
        assert!((rng.next_unit() - 0.1).abs() < f64::EPSILON);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_scripted_empty_yields_zero() {
        let mut rng = ScriptedRandom::new([]);
        assert!(rng.next_unit().abs() < f64::EPSILON);
    }

    #[test]
    fn test_scripted_clamps_one() {
        let mut rng = ScriptedRandom::new([1.0]);
        assert!(rng.next_unit() < 1.0);
        assert_eq!(ScriptedRandom::new([1.0]).pick_index(4), 3);
    }

    #[test]
    fn test_pick_index_floors() {
        let mut rng = ScriptedRandom::new([0.0, 0.24, 0.25, 0.99]);
        assert_eq!(rng.pick_index(4), 0);
        assert_eq!(rng.pick_index(4), 0);
        assert_eq!(rng.pick_index(4), 1);
        assert_eq!(rng.pick_index(4), 3);
    }

    #[test]
    fn test_in_range() {
        let mut rng = ScriptedRandom::new([0.5]);
        assert!((rng.in_range(-90.0, 90.0)).abs() < 1e-9);
    }

    #[test]
    fn test_chance() {
        let mut rng = ScriptedRandom::new([0.29, 0.3]);
        assert!(rng.chance(0.3));
        assert!(!rng.chance(0.3));
    }

    #[test]
    fn test_seeded_is_reproducible() {
        let mut a = SeededRandom::new(42);
        let mut b = SeededRandom::new(42);
        for _ in 0..16 {
            let x = a.next_unit();
            assert!((0.0..1.0).contains(&x));
            assert!((x - b.next_unit()).abs() < f64::EPSILON);
        }
    }

    #[test]
    fn test_thread_random_in_unit_range() {
        let mut rng = ThreadRandom;
        for _ in 0..64 {
            assert!((0.0..1.0).contains(&rng.next_unit()));
        }
    }

    #[test]
    fn test_boxed_source_delegates() {
        let mut rng: Box<dyn RandomSource> = Box::new(ScriptedRandom::new([0.75]));
        assert_eq!(rng.pick_index(4), 3);
    }
}
