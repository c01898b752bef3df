//! Randomness capability.
//!
//! Salts, data keys and nonces are all drawn through [`RandomSource`]. The
//! production source is `ring::rand::SystemRandom`, which is safe to share
//! across threads. Tests plug in a seeded generator to get reproducible
//! artifacts.

use ring::rand::{SecureRandom, SystemRandom};

use crate::error::{FileCryptError, Result};

/// A source of cryptographically secure random bytes.
///
/// Implementations must be safe to draw from concurrently; encrypt calls on
/// different threads share a single source.
pub trait RandomSource: Send + Sync {
    /// Fill `dest` entirely with random bytes.
    fn fill(&self, dest: &mut [u8]) -> Result<()>;
}

impl RandomSource for SystemRandom {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        SecureRandom::fill(self, dest).map_err(|_| FileCryptError::RandomnessFailure)
    }
}

impl<R: RandomSource + ?Sized> RandomSource for &R {
    fn fill(&self, dest: &mut [u8]) -> Result<()> {
        (**self).fill(dest)
    }
}

/// Draw a fixed-size array from `rng`.
pub(crate) fn array<const N: usize>(rng: &dyn RandomSource) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    rng.fill(&mut buf)?;
    Ok(buf)
}
