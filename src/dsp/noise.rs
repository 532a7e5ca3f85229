//! White noise source.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Uniform white noise in [-1, 1].
pub struct Noise {
    rng: StdRng,
}

impl Noise {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Seeded generator for deterministic renders and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    #[inline]
    pub fn process(&mut self) -> f32 {
        self.rng.gen_range(-1.0..=1.0)
    }
}

impl Default for Noise {
    fn default() -> Self {
        Self::new()
    }
}
