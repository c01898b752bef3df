//! # filecrypt
//!
//! Password-protected envelope encryption for files at rest.
//!
//! Protecting a file produces two artifacts, and both are needed together
//! with the password to recover the content:
//!
//! - a **key-file** holding a random per-file data key, wrapped with
//!   AES-256-GCM under a key derived from the password (PBKDF2-HMAC-SHA256);
//! - a **cipher-file** holding the content sealed with AES-256-GCM under
//!   that data key.
//!
//! ## Public API
//!
//! The surface is two synchronous functions over in-memory buffers,
//! [`encrypt_file`] and [`decrypt_file`], plus a chunked streaming variant in
//! [`envelope`] for inputs that should not be held in memory. Reading and
//! writing files, choosing names and prompting for passwords are left to the
//! caller.

// Module declarations.
pub mod audit;
pub mod cipher;
pub mod codec;
pub(crate) mod crypto;
pub mod envelope;
pub mod error;
pub mod keys;
pub mod random;
pub mod stream;
pub mod wrap;

pub use crypto::{KEY_LEN, NONCE_LEN, TAG_LEN};
pub use envelope::EncryptedFile;
pub use error::{FileCryptError, FormatError};
pub use random::RandomSource;

use ring::rand::SystemRandom;

/// Encrypt `file_bytes` under `password`.
///
/// Returns the cipher-file and key-file. Every call draws a fresh salt, data
/// key and nonces from the operating system's CSPRNG, so encrypting the same
/// input twice never yields the same artifacts.
pub fn encrypt_file(file_bytes: &[u8], password: &str) -> Result<EncryptedFile, FileCryptError> {
    envelope::encrypt_with(file_bytes, password.as_bytes(), &SystemRandom::new())
}

/// Recover the original bytes from a cipher-file, its key-file and the
/// password.
///
/// Callers should report every error generically; see
/// [`FileCryptError::is_rejection`].
pub fn decrypt_file(
    cipher_file: &[u8],
    key_file: &[u8],
    password: &str,
) -> Result<Vec<u8>, FileCryptError> {
    envelope::decrypt(cipher_file, key_file, password.as_bytes())
}
