//! Key derivation and ownership.
//!
//! This module owns two responsibilities:
//! 1. Deriving the password-derived key (PDK) from a password and salt with
//!    PBKDF2-HMAC-SHA256.
//! 2. Holding key material in types that are opaque, non-cloneable and
//!    zeroised on drop.
//!
//! ## Key hierarchy
//!
//! ```text
//! password ──PBKDF2-HMAC-SHA256(salt, 100 000 rounds)──► PDK
//!                                                         │ wraps (AES-256-GCM)
//!                                                         ▼
//!                                        DataKey (random, per file)
//!                                                         │ encrypts (AES-256-GCM)
//!                                                         ▼
//!                                                    file content
//! ```
//!
//! Neither key is ever persisted in plaintext. The PDK is recomputed on every
//! decrypt from the salt stored in the key-file.

use std::fmt;
use std::num::NonZeroU32;

use ring::pbkdf2;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::crypto::KEY_LEN;
use crate::error::Result;
use crate::random::{self, RandomSource};

/// Size of the KDF salt in bytes.
pub const SALT_LEN: usize = 16;

/// PBKDF2 round count. The key-file has no parameter field, so this is fixed
/// for the lifetime of the format.
pub const PBKDF2_ITERATIONS: u32 = 100_000;

static PBKDF2_ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

/// A per-file KDF salt. Not secret; stored at the front of the key-file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Draw a fresh salt.
    pub fn generate(rng: &dyn RandomSource) -> Result<Self> {
        Ok(Self(random::array(rng)?))
    }

    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

// ---------------------------------------------------------------------------
// Password-derived key
// ---------------------------------------------------------------------------

/// The key derived from the user's password. Used only to wrap and unwrap
/// the data key.
///
/// - Not `Clone`.
/// - Zeroised on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PasswordDerivedKey {
    bytes: [u8; KEY_LEN],
}

impl PasswordDerivedKey {
    /// `pub(crate)`: raw bytes never leave the crate.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for PasswordDerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordDerivedKey")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Data key
// ---------------------------------------------------------------------------

/// The random per-file key that encrypts the file content.
///
/// - Not `Clone`. A data key belongs to exactly one encryption.
/// - Zeroised on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct DataKey {
    bytes: [u8; KEY_LEN],
}

impl DataKey {
    /// Draw 32 bytes from the random source.
    pub fn generate(rng: &dyn RandomSource) -> Result<Self> {
        Ok(Self {
            bytes: random::array(rng)?,
        })
    }

    /// Construct a data key from raw bytes, e.g. a freshly unwrapped key.
    pub fn from_bytes(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }
}

impl fmt::Debug for DataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataKey").field("bytes", &"[REDACTED]").finish()
    }
}

// ---------------------------------------------------------------------------
// Derivation
// ---------------------------------------------------------------------------

/// Derive the PDK for `password` and `salt`.
///
/// Deterministic: the same inputs always give the same key. An empty password
/// is accepted and simply yields a weak key; policy belongs to the caller.
/// Nothing is cached between calls.
pub fn derive_key(password: &[u8], salt: &Salt) -> PasswordDerivedKey {
    let mut bytes = [0u8; KEY_LEN];
    pbkdf2::derive(
        PBKDF2_ALGORITHM,
        iterations(),
        salt.as_bytes(),
        password,
        &mut bytes,
    );
    PasswordDerivedKey { bytes }
}

fn iterations() -> NonZeroU32 {
    NonZeroU32::MIN.saturating_add(PBKDF2_ITERATIONS - 1)
}
