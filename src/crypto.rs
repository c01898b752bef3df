//! Low-level AEAD operations.
//!
//! This module and `keys` are the only places in the crate that import
//! `ring` primitives directly. Key wrapping, file encryption and the chunked
//! stream all seal and open through the functions exposed here.
//!
//! Primitive choices:
//! - **Cipher**: AES-256-GCM (authenticated encryption)
//! - **Nonce**: 96-bit (12 bytes), fresh per operation from the injected `RandomSource`
//! - **Tag**: 128-bit (16 bytes), stored detached from the ciphertext
//! - **Key size**: 256 bits (32 bytes)
//! - **Associated data**: none

use ring::aead::{self, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};

use crate::error::{FileCryptError, Result};
use crate::random::{self, RandomSource};

/// The AEAD algorithm used throughout filecrypt.
const ALGORITHM: &aead::Algorithm = &AES_256_GCM;

/// Size of the nonce in bytes (96 bits).
pub const NONCE_LEN: usize = 12;

/// Size of the GCM authentication tag in bytes.
pub const TAG_LEN: usize = 16;

/// Size of every symmetric key in bytes (256 bits).
pub const KEY_LEN: usize = 32;

/// Output of a single detached seal.
pub(crate) struct Sealed {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

fn aead_key(key_bytes: &[u8; KEY_LEN]) -> Result<LessSafeKey> {
    let unbound = UnboundKey::new(ALGORITHM, key_bytes).map_err(|_| FileCryptError::InvalidKey)?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under a freshly drawn nonce.
///
/// The nonce and tag are returned separately from the ciphertext so the
/// codec can lay them out in front of it.
pub(crate) fn seal(
    key_bytes: &[u8; KEY_LEN],
    rng: &dyn RandomSource,
    plaintext: &[u8],
) -> Result<Sealed> {
    let nonce: [u8; NONCE_LEN] = random::array(rng)?;
    let mut ciphertext = plaintext.to_vec();
    let tag = seal_in_place(key_bytes, nonce, &mut ciphertext)?;
    Ok(Sealed {
        nonce,
        tag,
        ciphertext,
    })
}

/// Encrypt `in_out` in place under an explicit nonce and return the tag.
///
/// Callers are responsible for never repeating `nonce` under the same key.
pub(crate) fn seal_in_place(
    key_bytes: &[u8; KEY_LEN],
    nonce: [u8; NONCE_LEN],
    in_out: &mut [u8],
) -> Result<[u8; TAG_LEN]> {
    let key = aead_key(key_bytes)?;
    let tag = key
        .seal_in_place_separate_tag(
            Nonce::assume_unique_for_key(nonce),
            aead::Aad::empty(),
            in_out,
        )
        .map_err(|_| FileCryptError::EncryptionFailure)?;

    let mut out = [0u8; TAG_LEN];
    out.copy_from_slice(tag.as_ref());
    Ok(out)
}

/// Decrypt and authenticate a detached ciphertext.
///
/// If the key is wrong or any of nonce, tag or ciphertext has been altered,
/// GCM verification fails and no plaintext is returned.
pub(crate) fn open(
    key_bytes: &[u8; KEY_LEN],
    nonce: &[u8; NONCE_LEN],
    tag: &[u8; TAG_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(ciphertext.len() + TAG_LEN);
    buf.extend_from_slice(ciphertext);
    buf.extend_from_slice(tag);
    let len = open_in_place(key_bytes, *nonce, &mut buf)?;
    buf.truncate(len);
    Ok(buf)
}

/// Decrypt `ciphertext ‖ tag` in place and return the plaintext length.
///
/// On failure the buffer contents are unspecified and must be discarded.
pub(crate) fn open_in_place(
    key_bytes: &[u8; KEY_LEN],
    nonce: [u8; NONCE_LEN],
    in_out: &mut [u8],
) -> Result<usize> {
    let key = aead_key(key_bytes)?;
    let plaintext = key
        .open_in_place(Nonce::assume_unique_for_key(nonce), aead::Aad::empty(), in_out)
        .map_err(|_| FileCryptError::AuthenticationFailure)?;
    Ok(plaintext.len())
}
