//! Error types for filecrypt.
//!
//! Every error variant is a distinct failure mode of the envelope. Error
//! messages are intentionally minimal. They signal *what* failed without
//! revealing *why* in ways that could act as a password or padding oracle.

use thiserror::Error;

/// The single error type for all filecrypt operations.
#[derive(Debug, Error)]
pub enum FileCryptError {
    /// A key-file or cipher-file is structurally invalid. Raised by the
    /// codec before any cryptographic operation is attempted.
    #[error("malformed input: {0}")]
    Format(#[from] FormatError),

    /// An AEAD tag did not verify. This covers a wrong password, a key-file
    /// paired with the wrong cipher-file, truncation and tampering alike.
    /// The cause is deliberately not distinguished.
    #[error("authentication failed")]
    AuthenticationFailure,

    /// Reading or writing a stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The random source failed to produce bytes.
    #[error("randomness source failed")]
    RandomnessFailure,

    /// A key could not be loaded into the AEAD.
    #[error("invalid key")]
    InvalidKey,

    /// Sealing failed. The underlying `ring` operation returned an error.
    #[error("encryption failed")]
    EncryptionFailure,
}

/// Structural problems found while unpacking one of the two layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    /// The key-file is not exactly the fixed key-file length.
    #[error("key-file must be {expected} bytes, got {actual}")]
    KeyFileLength { expected: usize, actual: usize },

    /// The cipher-file is shorter than its nonce and tag header.
    #[error("cipher-file must be at least {minimum} bytes, got {actual}")]
    CipherFileTooShort { minimum: usize, actual: usize },

    /// A chunked stream ended before its nonce prefix was complete.
    #[error("stream header truncated")]
    StreamHeaderTruncated,
}

impl FileCryptError {
    /// True for failures that a caller must report generically (wrong
    /// password, tampering, malformed files).
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Format(_) | Self::AuthenticationFailure)
    }
}

pub type Result<T> = std::result::Result<T, FileCryptError>;
