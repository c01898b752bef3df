//! Chunked streaming file encryption.
//!
//! Large files are sealed in bounded chunks so neither side has to hold the
//! whole file in memory. The construction follows STREAM: every chunk is an
//! independent AES-256-GCM message whose nonce binds it to its position and
//! marks whether it is the final chunk.
//!
//! ```text
//! [ nonce prefix (7) ][ chunk 0 ][ chunk 1 ] ... [ final chunk ]
//! chunk       = ciphertext (<= 64 KiB) ‖ tag (16)
//! chunk nonce = prefix (7) ‖ counter (u32 BE) ‖ last flag (0x00 | 0x01)
//! ```
//!
//! Reordering, dropping, duplicating or appending chunks all change the
//! nonce a chunk is opened with, so the file either verifies as a unit or is
//! rejected. The final chunk may be empty; an empty input is a single empty
//! final chunk.

use std::io::{self, Read, Write};

use tracing::trace;
use zeroize::Zeroizing;

use crate::crypto::{self, NONCE_LEN, TAG_LEN};
use crate::error::{FileCryptError, FormatError, Result};
use crate::keys::DataKey;
use crate::random::{self, RandomSource};

/// Plaintext bytes per chunk.
pub const STREAM_CHUNK_LEN: usize = 64 * 1024;

/// Length of the random per-stream nonce prefix.
pub const NONCE_PREFIX_LEN: usize = 7;

const LAST_CHUNK: u8 = 0x01;
const MIDDLE_CHUNK: u8 = 0x00;

fn chunk_nonce(prefix: &[u8; NONCE_PREFIX_LEN], counter: u32, last: bool) -> [u8; NONCE_LEN] {
    let mut nonce = [0u8; NONCE_LEN];
    nonce[..NONCE_PREFIX_LEN].copy_from_slice(prefix);
    nonce[NONCE_PREFIX_LEN..NONCE_LEN - 1].copy_from_slice(&counter.to_be_bytes());
    nonce[NONCE_LEN - 1] = if last { LAST_CHUNK } else { MIDDLE_CHUNK };
    nonce
}

/// Read until `buf` is full or the reader is exhausted.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

/// Encrypt everything `reader` yields into `writer`.
///
/// Returns the number of plaintext bytes consumed. A chunk is only written
/// once it is sealed; the writer never sees plaintext.
pub fn encrypt_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    data_key: &DataKey,
    rng: &dyn RandomSource,
) -> Result<u64> {
    let prefix: [u8; NONCE_PREFIX_LEN] = random::array(rng)?;
    writer.write_all(&prefix)?;

    // Plaintext buffers are wiped on every exit path, errors included.
    let mut current = Zeroizing::new(vec![0u8; STREAM_CHUNK_LEN]);
    let mut next = Zeroizing::new(vec![0u8; STREAM_CHUNK_LEN]);
    let mut len = read_full(&mut reader, &mut current[..])?;
    let mut counter: u32 = 0;
    let mut total: u64 = 0;

    loop {
        // A full chunk is only final if nothing follows it.
        let (last, next_len) = if len < STREAM_CHUNK_LEN {
            (true, 0)
        } else {
            let n = read_full(&mut reader, &mut next[..])?;
            (n == 0, n)
        };

        let nonce = chunk_nonce(&prefix, counter, last);
        let tag = crypto::seal_in_place(data_key.as_bytes(), nonce, &mut current[..len])?;
        writer.write_all(&current[..len])?;
        writer.write_all(&tag)?;
        total += len as u64;
        trace!(chunk = counter, len, last, "sealed chunk");

        if last {
            break;
        }
        counter = counter
            .checked_add(1)
            .ok_or(FileCryptError::EncryptionFailure)?;
        std::mem::swap(&mut current, &mut next);
        len = next_len;
    }

    writer.flush()?;
    Ok(total)
}

/// Decrypt a chunked stream from `reader` into `writer`.
///
/// Each chunk's plaintext is written only after that chunk authenticates.
/// A failure part-way through leaves earlier verified chunks in `writer`, so
/// callers must stage output and discard it unless this returns `Ok`.
pub fn decrypt_stream<R: Read, W: Write>(
    mut reader: R,
    mut writer: W,
    data_key: &DataKey,
) -> Result<u64> {
    let mut prefix = [0u8; NONCE_PREFIX_LEN];
    if read_full(&mut reader, &mut prefix)? < NONCE_PREFIX_LEN {
        return Err(FormatError::StreamHeaderTruncated.into());
    }

    let sealed_len = STREAM_CHUNK_LEN + TAG_LEN;
    let mut current = Zeroizing::new(vec![0u8; sealed_len]);
    let mut next = Zeroizing::new(vec![0u8; sealed_len]);
    let mut len = read_full(&mut reader, &mut current[..])?;
    let mut counter: u32 = 0;
    let mut total: u64 = 0;

    loop {
        // No room for a tag: the final chunk is missing.
        if len < TAG_LEN {
            return Err(FileCryptError::AuthenticationFailure);
        }

        let (last, next_len) = if len < sealed_len {
            (true, 0)
        } else {
            let n = read_full(&mut reader, &mut next[..])?;
            (n == 0, n)
        };

        let nonce = chunk_nonce(&prefix, counter, last);
        let plain_len = crypto::open_in_place(data_key.as_bytes(), nonce, &mut current[..len])?;
        writer.write_all(&current[..plain_len])?;
        total += plain_len as u64;
        trace!(chunk = counter, len = plain_len, last, "opened chunk");

        if last {
            break;
        }
        counter = counter
            .checked_add(1)
            .ok_or(FileCryptError::AuthenticationFailure)?;
        std::mem::swap(&mut current, &mut next);
        len = next_len;
    }

    writer.flush()?;
    Ok(total)
}
