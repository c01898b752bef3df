//! Shared helpers for integration tests.

use std::sync::Mutex;

use filecrypt::error::Result;
use filecrypt::RandomSource;
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};

/// A reproducible random source. Never use outside tests.
pub struct SeededRandom(Mutex<StdRng>);

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self(Mutex::new(StdRng::seed_from_u64(seed)))
    }
}

impl RandomSource for SeededRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        self.0.lock().unwrap().fill_bytes(dest);
        Ok(())
    }
}
