//! Random number generator abstraction for determinism.
//!
//! In production, this wraps a real RNG. In tests, a seeded or scripted
//! implementation is injected so that draws are repeatable.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Abstraction over random number generation.
pub trait DeterministicRng: Send + Sync {
    /// Generate a random `u32` in the range `[min, max]` inclusive.
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32;

    /// Pick a uniformly random index into a sequence of `len` elements.
    ///
    /// Returns `None` when `len` is zero.
    fn pick_index(&mut self, len: usize) -> Option<usize> {
        let last = u32::try_from(len.checked_sub(1)?).unwrap_or(u32::MAX);
        let picked = self.next_u32_range(0, last) as usize;
        Some(picked.min(len - 1))
    }
}

/// Production RNG seeded from the operating system.
#[derive(Debug)]
pub struct OsSeededRng(StdRng);

impl OsSeededRng {
    /// Creates an RNG seeded from OS entropy.
    #[must_use]
    pub fn new() -> Self {
        Self(StdRng::from_os_rng())
    }

    /// Creates an RNG with a fixed seed, for reproducible sessions.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl Default for OsSeededRng {
    fn default() -> Self {
        Self::new()
    }
}

impl DeterministicRng for OsSeededRng {
    fn next_u32_range(&mut self, min: u32, max: u32) -> u32 {
        self.0.random_range(min..=max)
    }
}
