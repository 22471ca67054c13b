//! Injectable randomness for the composer and fallback selection.
//!
//! The engine never reaches for an ambient global RNG directly; callers
//! pass a [`RandomSource`] so tests can script exact outcomes.

use rand::Rng;

/// A source of uniform randomness.
pub trait RandomSource {
    /// Next value in `[0, 1)`.
    fn next_f64(&mut self) -> f64;

    /// Uniform index into a collection of `len` elements.
    ///
    /// `len` must be non-zero.
    fn pick_index(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64) as usize;
        idx.min(len - 1)
    }
}

/// Default source backed by the thread-local RNG.
#[derive(Debug, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_f64(&mut self) -> f64 {
        rand::rng().random::<f64>()
    }
}

/// Deterministic source that replays a fixed script of values.
///
/// Once the script is exhausted it keeps returning the final value.
/// Intended for tests that need to pin composer decisions.
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }
}

impl RandomSource for SequenceSource {
    fn next_f64(&mut self) -> f64 {
        let value = self
            .values
            .get(self.pos)
            .or_else(|| self.values.last())
            .copied()
            .unwrap_or(0.0);
        self.pos += 1;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_rng_in_range() {
        let mut rng = ThreadRngSource;
        for _ in 0..100 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_pick_index_in_bounds() {
        let mut rng = ThreadRngSource;
        for _ in 0..100 {
            let idx = rng.pick_index(7);
            assert!(idx < 7);
        }
    }

    #[test]
    fn test_sequence_source_replays_script() {
        let mut rng = SequenceSource::new(vec![0.0, 0.5, 0.99]);
        assert_eq!(rng.next_f64(), 0.0);
        assert_eq!(rng.next_f64(), 0.5);
        assert_eq!(rng.next_f64(), 0.99);
        // Exhausted: repeats the final value.
        assert_eq!(rng.next_f64(), 0.99);
    }

    #[test]
    fn test_sequence_source_empty_returns_zero() {
        let mut rng = SequenceSource::new(vec![]);
        assert_eq!(rng.next_f64(), 0.0);
    }

    #[test]
    fn test_sequence_pick_index_maps_to_slot() {
        let mut rng = SequenceSource::new(vec![0.0, 0.5, 0.999]);
        assert_eq!(rng.pick_index(10), 0);
        assert_eq!(rng.pick_index(10), 5);
        assert_eq!(rng.pick_index(10), 9);
    }

    #[test]
    fn test_pick_index_single_element() {
        let mut rng = SequenceSource::new(vec![0.99]);
        assert_eq!(rng.pick_index(1), 0);
    }
}
