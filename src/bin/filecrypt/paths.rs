//! Default artifact names.
//!
//! `report.pdf` encrypts to `report_encrypted.bin`, whose key-file is
//! `report_encrypted_key.bin`. Decrypting `report_encrypted.bin` looks for
//! `report_encrypted_key.bin` and writes `report_encrypted_decrypted`.

use std::path::{Path, PathBuf};

pub const ENCRYPTED_SUFFIX: &str = "_encrypted.bin";
pub const KEY_SUFFIX: &str = "_key.bin";
pub const DECRYPTED_SUFFIX: &str = "_decrypted";

/// Replace the extension of `path` (if any) with `suffix`.
pub fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.file_stem().unwrap_or_default().to_os_string();
    name.push(suffix);
    path.with_file_name(name)
}

pub fn encrypted_output(input: &Path) -> PathBuf {
    with_suffix(input, ENCRYPTED_SUFFIX)
}

/// The key-file that sits next to an encrypted file.
pub fn key_file_for(encrypted: &Path) -> PathBuf {
    with_suffix(encrypted, KEY_SUFFIX)
}

pub fn decrypted_output(encrypted: &Path) -> PathBuf {
    with_suffix(encrypted, DECRYPTED_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_names() {
        let input = Path::new("docs/report.pdf");
        let encrypted = encrypted_output(input);

        assert_eq!(encrypted, Path::new("docs/report_encrypted.bin"));
        assert_eq!(key_file_for(&encrypted), Path::new("docs/report_encrypted_key.bin"));
        assert_eq!(decrypted_output(&encrypted), Path::new("docs/report_encrypted_decrypted"));
    }

    #[test]
    fn test_name_without_extension() {
        assert_eq!(encrypted_output(Path::new("notes")), Path::new("notes_encrypted.bin"));
    }
}
