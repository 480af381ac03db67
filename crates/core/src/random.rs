//! # Randomness Source
//!
//! Technique-name generation and synthetic-profile selection are the only
//! non-deterministic steps in a duel. Both draw from a [`RandomSource`] so
//! tests can pin the sequence.

use std::sync::atomic::{AtomicUsize, Ordering};

use rand::Rng;

/// Injectable source of uniform indices
pub trait RandomSource: Send + Sync {
    /// Pick an index in `0..len`. `len` is never zero.
    fn pick(&self, len: usize) -> usize;
}

/// Production source backed by the thread-local RNG
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn pick(&self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        rand::thread_rng().gen_range(0..len)
    }
}

/// Deterministic source that replays a fixed sequence (wrapped into range)
#[derive(Debug)]
pub struct SequenceRandom {
    values: Vec<usize>,
    cursor: AtomicUsize,
}

impl SequenceRandom {
    pub fn new(values: Vec<usize>) -> Self {
        Self {
            values,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Always returns the same value
    pub fn constant(value: usize) -> Self {
        Self::new(vec![value])
    }
}

impl RandomSource for SequenceRandom {
    fn pick(&self, len: usize) -> usize {
        if self.values.is_empty() || len == 0 {
            return 0;
        }
        let i = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
        self.values[i] % len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thread_random_stays_in_range() {
        let rng = ThreadRandom;
        for _ in 0..200 {
            assert!(rng.pick(6) < 6);
        }
        assert_eq!(rng.pick(1), 0);
    }

    #[test]
    fn test_sequence_random_replays_and_wraps() {
        let rng = SequenceRandom::new(vec![1, 7, 2]);
        assert_eq!(rng.pick(3), 1);
        assert_eq!(rng.pick(3), 1); // 7 % 3
        assert_eq!(rng.pick(3), 2);
        assert_eq!(rng.pick(3), 1);
    }
}
