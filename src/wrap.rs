//! Data-key wrapping.
//!
//! The per-file data key is sealed under the PDK with AES-256-GCM and no
//! associated data. The wrapped form is the only form in which a data key is
//! ever persisted.

use crate::crypto::{self, KEY_LEN, NONCE_LEN, TAG_LEN};
use crate::error::{FileCryptError, Result};
use crate::keys::{DataKey, PasswordDerivedKey};
use crate::random::RandomSource;

/// A data key sealed under a PDK.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedKey {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: [u8; KEY_LEN],
}

/// Seal `data_key` under `pdk` with a fresh nonce.
pub fn wrap(
    data_key: &DataKey,
    pdk: &PasswordDerivedKey,
    rng: &dyn RandomSource,
) -> Result<WrappedKey> {
    let sealed = crypto::seal(pdk.as_bytes(), rng, data_key.as_bytes())?;
    let ciphertext: [u8; KEY_LEN] = sealed
        .ciphertext
        .as_slice()
        .try_into()
        .map_err(|_| FileCryptError::EncryptionFailure)?;

    Ok(WrappedKey {
        nonce: sealed.nonce,
        tag: sealed.tag,
        ciphertext,
    })
}

/// Open a wrapped data key.
///
/// A tag mismatch is the expected outcome for a wrong password or a damaged
/// key-file, and is reported as [`FileCryptError::AuthenticationFailure`].
pub fn unwrap(wrapped: &WrappedKey, pdk: &PasswordDerivedKey) -> Result<DataKey> {
    let mut plain = crypto::open(pdk.as_bytes(), &wrapped.nonce, &wrapped.tag, &wrapped.ciphertext)?;

    let bytes: Result<[u8; KEY_LEN]> = plain
        .as_slice()
        .try_into()
        .map_err(|_| FileCryptError::AuthenticationFailure);
    zeroize::Zeroize::zeroize(&mut plain);

    Ok(DataKey::from_bytes(bytes?))
}
