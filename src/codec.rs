//! Binary layouts for the two artifacts.
//!
//! Both layouts are plain concatenations of opaque byte fields; there is no
//! magic, version or length prefix. Unpacking validates length first and only
//! then slices.
//!
//! ```text
//! KeyFile    (76 bytes fixed):
//!   [0:16)  salt
//!   [16:28) nonce      (wraps the data key)
//!   [28:44) tag
//!   [44:76) wrapped data key
//!
//! CipherFile (28 + N bytes):
//!   [0:12)  nonce      (encrypts the file content)
//!   [12:28) tag
//!   [28:)   ciphertext (N = plaintext length)
//! ```

use crate::cipher::EncryptedContent;
use crate::crypto::{KEY_LEN, NONCE_LEN, TAG_LEN};
use crate::error::{FormatError, Result};
use crate::keys::{Salt, SALT_LEN};
use crate::wrap::WrappedKey;

/// Exact length of a key-file.
pub const KEY_FILE_LEN: usize = SALT_LEN + NONCE_LEN + TAG_LEN + KEY_LEN;

/// Length of the cipher-file header; also the size of an empty file's cipher-file.
pub const CIPHER_FILE_HEADER_LEN: usize = NONCE_LEN + TAG_LEN;

const SALT_END: usize = SALT_LEN;
const KEY_NONCE_END: usize = SALT_END + NONCE_LEN;
const KEY_TAG_END: usize = KEY_NONCE_END + TAG_LEN;

/// Everything stored in a key-file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyFile {
    pub salt: Salt,
    pub wrapped: WrappedKey,
}

impl KeyFile {
    pub fn pack(&self) -> Vec<u8> {
        pack_key_file(&self.salt, &self.wrapped)
    }

    pub fn unpack(bytes: &[u8]) -> Result<Self> {
        unpack_key_file(bytes)
    }
}

/// Serialize a salt and wrapped key into the 76-byte key-file layout.
pub fn pack_key_file(salt: &Salt, wrapped: &WrappedKey) -> Vec<u8> {
    let mut out = Vec::with_capacity(KEY_FILE_LEN);
    out.extend_from_slice(salt.as_bytes());
    out.extend_from_slice(&wrapped.nonce);
    out.extend_from_slice(&wrapped.tag);
    out.extend_from_slice(&wrapped.ciphertext);
    out
}

/// Parse a key-file. Anything other than exactly 76 bytes is rejected.
pub fn unpack_key_file(bytes: &[u8]) -> Result<KeyFile> {
    if bytes.len() != KEY_FILE_LEN {
        return Err(FormatError::KeyFileLength {
            expected: KEY_FILE_LEN,
            actual: bytes.len(),
        }
        .into());
    }

    let mut salt = [0u8; SALT_LEN];
    let mut nonce = [0u8; NONCE_LEN];
    let mut tag = [0u8; TAG_LEN];
    let mut ciphertext = [0u8; KEY_LEN];
    salt.copy_from_slice(&bytes[..SALT_END]);
    nonce.copy_from_slice(&bytes[SALT_END..KEY_NONCE_END]);
    tag.copy_from_slice(&bytes[KEY_NONCE_END..KEY_TAG_END]);
    ciphertext.copy_from_slice(&bytes[KEY_TAG_END..]);

    Ok(KeyFile {
        salt: Salt::from_bytes(salt),
        wrapped: WrappedKey {
            nonce,
            tag,
            ciphertext,
        },
    })
}

/// Serialize encrypted content into the cipher-file layout.
pub fn pack_cipher_file(content: &EncryptedContent) -> Vec<u8> {
    let mut out = Vec::with_capacity(CIPHER_FILE_HEADER_LEN + content.ciphertext.len());
    out.extend_from_slice(&content.nonce);
    out.extend_from_slice(&content.tag);
    out.extend_from_slice(&content.ciphertext);
    out
}

/// Parse a cipher-file. Inputs shorter than the 28-byte header are rejected.
pub fn unpack_cipher_file(bytes: &[u8]) -> Result<EncryptedContent> {
    if bytes.len() < CIPHER_FILE_HEADER_LEN {
        return Err(FormatError::CipherFileTooShort {
            minimum: CIPHER_FILE_HEADER_LEN,
            actual: bytes.len(),
        }
        .into());
    }

    let mut nonce = [0u8; NONCE_LEN];
    let mut tag = [0u8; TAG_LEN];
    nonce.copy_from_slice(&bytes[..NONCE_LEN]);
    tag.copy_from_slice(&bytes[NONCE_LEN..CIPHER_FILE_HEADER_LEN]);

    Ok(EncryptedContent {
        nonce,
        tag,
        ciphertext: bytes[CIPHER_FILE_HEADER_LEN..].to_vec(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FileCryptError;

    fn sample_key_file() -> KeyFile {
        KeyFile {
            salt: Salt::from_bytes([0x11; SALT_LEN]),
            wrapped: WrappedKey {
                nonce: [0x22; NONCE_LEN],
                tag: [0x33; TAG_LEN],
                ciphertext: [0x44; KEY_LEN],
            },
        }
    }

    #[test]
    fn test_key_file_offsets() {
        let bytes = sample_key_file().pack();

        assert_eq!(bytes.len(), 76);
        assert!(bytes[0..16].iter().all(|&b| b == 0x11));
        assert!(bytes[16..28].iter().all(|&b| b == 0x22));
        assert!(bytes[28..44].iter().all(|&b| b == 0x33));
        assert!(bytes[44..76].iter().all(|&b| b == 0x44));
        assert_eq!(KeyFile::unpack(&bytes).unwrap(), sample_key_file());
    }

    #[test]
    fn test_cipher_file_offsets() {
        let content = EncryptedContent {
            nonce: [0xAA; NONCE_LEN],
            tag: [0xBB; TAG_LEN],
            ciphertext: vec![1, 2, 3],
        };
        let bytes = pack_cipher_file(&content);

        assert_eq!(bytes.len(), 31);
        assert!(bytes[0..12].iter().all(|&b| b == 0xAA));
        assert!(bytes[12..28].iter().all(|&b| b == 0xBB));
        assert_eq!(&bytes[28..], &[1, 2, 3]);
        assert_eq!(unpack_cipher_file(&bytes).unwrap(), content);
    }

    #[test]
    fn test_short_key_file_rejected() {
        for len in [0, 1, 44, 75] {
            let result = unpack_key_file(&vec![0u8; len]);
            assert!(matches!(
                result,
                Err(FileCryptError::Format(FormatError::KeyFileLength { actual, .. })) if actual == len
            ));
        }
    }

    #[test]
    fn test_oversized_key_file_rejected() {
        assert!(matches!(
            unpack_key_file(&[0u8; 77]),
            Err(FileCryptError::Format(FormatError::KeyFileLength { expected: 76, actual: 77 }))
        ));
    }

    #[test]
    fn test_short_cipher_file_rejected() {
        for len in [0, 12, 27] {
            assert!(matches!(
                unpack_cipher_file(&vec![0u8; len]),
                Err(FileCryptError::Format(FormatError::CipherFileTooShort { minimum: 28, .. }))
            ));
        }
    }

    #[test]
    fn test_header_only_cipher_file_is_empty_payload() {
        let content = unpack_cipher_file(&[0u8; 28]).unwrap();
        assert!(content.ciphertext.is_empty());
    }
}
