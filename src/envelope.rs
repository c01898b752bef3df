//! The two-artifact envelope.
//!
//! Encryption runs: fresh salt → PDK → fresh data key wrapped under the PDK →
//! content sealed under the data key → both layouts packed. Nothing is
//! returned until every byte of both artifacts exists. Decryption unpacks
//! both layouts before deriving anything, so malformed input never costs a
//! KDF run.

use std::io::{Read, Write};

use tracing::{debug, warn};

use crate::cipher;
use crate::codec::{self, KeyFile};
use crate::error::{FileCryptError, Result};
use crate::keys::{self, DataKey, Salt};
use crate::random::RandomSource;
use crate::stream;
use crate::wrap;

/// The pair of artifacts produced by one encryption.
///
/// Both blobs are opaque to callers and must be stored and re-supplied
/// together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedFile {
    pub cipher_file: Vec<u8>,
    pub key_file: Vec<u8>,
}

/// Generate the key material for one file and pack its key-file.
fn seal_new_key(password: &[u8], rng: &dyn RandomSource) -> Result<(DataKey, Vec<u8>)> {
    let salt = Salt::generate(rng)?;
    let pdk = keys::derive_key(password, &salt);
    let data_key = DataKey::generate(rng)?;
    let wrapped = wrap::wrap(&data_key, &pdk, rng)?;
    Ok((data_key, codec::pack_key_file(&salt, &wrapped)))
}

/// Recover the data key from a key-file.
fn open_key(key_file: &KeyFile, password: &[u8]) -> Result<DataKey> {
    let pdk = keys::derive_key(password, &key_file.salt);
    wrap::unwrap(&key_file.wrapped, &pdk).inspect_err(|e| {
        if matches!(e, FileCryptError::AuthenticationFailure) {
            warn!("key-file rejected");
        }
    })
}

/// Encrypt `plaintext` under `password`, drawing all randomness from `rng`.
pub fn encrypt_with(
    plaintext: &[u8],
    password: &[u8],
    rng: &dyn RandomSource,
) -> Result<EncryptedFile> {
    let (data_key, key_file) = seal_new_key(password, rng)?;
    let content = cipher::encrypt(plaintext, &data_key, rng)?;
    let cipher_file = codec::pack_cipher_file(&content);

    debug!(
        plaintext_len = plaintext.len(),
        cipher_file_len = cipher_file.len(),
        "file encrypted"
    );
    Ok(EncryptedFile {
        cipher_file,
        key_file,
    })
}

/// Decrypt a cipher-file with its key-file and password.
///
/// Fails with `Format` if either artifact is structurally invalid, and with
/// `AuthenticationFailure` for a wrong password, a mismatched pair or any
/// tampering.
pub fn decrypt(cipher_file: &[u8], key_file: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    let key_file = KeyFile::unpack(key_file)?;
    let content = codec::unpack_cipher_file(cipher_file)?;

    let data_key = open_key(&key_file, password)?;
    let plaintext = cipher::decrypt(&content, &data_key).inspect_err(|e| {
        if matches!(e, FileCryptError::AuthenticationFailure) {
            warn!("cipher-file rejected");
        }
    })?;

    debug!(plaintext_len = plaintext.len(), "file decrypted");
    Ok(plaintext)
}

/// Stream-encrypt `reader` into `writer` under `password`.
///
/// Returns the key-file bytes and the number of plaintext bytes consumed.
/// The key-file layout is identical to the single-shot envelope.
pub fn encrypt_stream_with_password<R: Read, W: Write>(
    reader: R,
    writer: W,
    password: &[u8],
    rng: &dyn RandomSource,
) -> Result<(Vec<u8>, u64)> {
    let (data_key, key_file) = seal_new_key(password, rng)?;
    let total = stream::encrypt_stream(reader, writer, &data_key, rng)?;

    debug!(plaintext_len = total, "stream encrypted");
    Ok((key_file, total))
}

/// Stream-decrypt `reader` into `writer` with a key-file and password.
///
/// See [`stream::decrypt_stream`] for why `writer` must be staged.
pub fn decrypt_stream_with_password<R: Read, W: Write>(
    reader: R,
    writer: W,
    key_file: &[u8],
    password: &[u8],
) -> Result<u64> {
    let key_file = KeyFile::unpack(key_file)?;
    let data_key = open_key(&key_file, password)?;
    let total = stream::decrypt_stream(reader, writer, &data_key).inspect_err(|e| {
        if matches!(e, FileCryptError::AuthenticationFailure) {
            warn!("stream rejected");
        }
    })?;

    debug!(plaintext_len = total, "stream decrypted");
    Ok(total)
}
