//! Minimal example: protect a file and get it back.
//!
//! Run with: `cargo run --example protect_file`
//!
//! Writes `<tmp>/filecrypt-demo/report_encrypted.bin` and its key-file, shows
//! that a wrong password is rejected, then decrypts with the right one.
//! Operation records are appended to `<tmp>/filecrypt-demo/audit.jsonl`.

use std::fs;

use filecrypt::audit::{AuditSink, FileAuditSink, Operation, OperationRecord};
use filecrypt::{decrypt_file, encrypt_file};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Setup
    let dir = std::env::temp_dir().join("filecrypt-demo");
    fs::create_dir_all(&dir)?;
    let mut audit = FileAuditSink::new(dir.join("audit.jsonl"))?;

    let original = b"Q3 figures: revenue up, costs down.";
    let cipher_path = dir.join("report_encrypted.bin");
    let key_path = dir.join("report_encrypted_key.bin");

    // 2. Encrypt and store both artifacts
    let sealed = encrypt_file(original, "correct horse")?;
    fs::write(&cipher_path, &sealed.cipher_file)?;
    fs::write(&key_path, &sealed.key_file)?;
    audit.append(&OperationRecord::now(
        Operation::Encrypt,
        "report.txt",
        vec![cipher_path.clone(), key_path.clone()],
        original.len() as u64,
        false,
    ))?;
    println!(
        "Encrypted {} bytes -> {} ({} bytes) + {} ({} bytes)",
        original.len(),
        cipher_path.display(),
        sealed.cipher_file.len(),
        key_path.display(),
        sealed.key_file.len()
    );

    // 3. A wrong password is rejected without detail
    let cipher_file = fs::read(&cipher_path)?;
    let key_file = fs::read(&key_path)?;
    match decrypt_file(&cipher_file, &key_file, "battery staple") {
        Ok(_) => unreachable!("wrong password accepted"),
        Err(e) => println!("Wrong password: {e}"),
    }

    // 4. The right password restores the content
    let restored = decrypt_file(&cipher_file, &key_file, "correct horse")?;
    assert_eq!(restored, original);
    println!("Restored: {}", String::from_utf8_lossy(&restored));

    Ok(())
}
