//! Single-shot file content encryption.
//!
//! The whole file is sealed as one AES-256-GCM message under the data key.
//! For inputs too large to hold in memory see [`crate::stream`].

use crate::crypto::{self, NONCE_LEN, TAG_LEN};
use crate::error::Result;
use crate::keys::DataKey;
use crate::random::RandomSource;

/// File content sealed under a data key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedContent {
    pub nonce: [u8; NONCE_LEN],
    pub tag: [u8; TAG_LEN],
    pub ciphertext: Vec<u8>,
}

/// Encrypt `plaintext` under `data_key` with a fresh nonce.
///
/// Works for any length including zero; the ciphertext is always exactly as
/// long as the plaintext.
pub fn encrypt(
    plaintext: &[u8],
    data_key: &DataKey,
    rng: &dyn RandomSource,
) -> Result<EncryptedContent> {
    let sealed = crypto::seal(data_key.as_bytes(), rng, plaintext)?;
    Ok(EncryptedContent {
        nonce: sealed.nonce,
        tag: sealed.tag,
        ciphertext: sealed.ciphertext,
    })
}

/// Decrypt and authenticate file content.
///
/// Fails with `AuthenticationFailure` for a wrong key, any corruption of
/// nonce, tag or ciphertext, or a cipher-file paired with the wrong key-file.
pub fn decrypt(content: &EncryptedContent, data_key: &DataKey) -> Result<Vec<u8>> {
    crypto::open(
        data_key.as_bytes(),
        &content.nonce,
        &content.tag,
        &content.ciphertext,
    )
}
