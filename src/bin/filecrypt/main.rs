//! filecrypt: protect a file with a password.
//!
//! Commands:
//!   encrypt <input>   - write `<name>_encrypted.bin` and its `_key.bin`
//!   decrypt <input>   - recover the original from an encrypted file and key-file
//!
//! Both outputs of `encrypt` are produced in full before either is moved into
//! place. Every failure of the cryptographic core is reported with the same
//! message so the CLI cannot be used as an oracle.

mod output;
mod paths;

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand};
use ring::rand::SystemRandom;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use filecrypt::audit::{AuditSink, FileAuditSink, Operation, OperationRecord};
use filecrypt::{envelope, FileCryptError};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "filecrypt",
    version,
    about = "Password-protected file encryption",
    long_about = "filecrypt: encrypt a file into an encrypted payload plus a separate key-file; \
                  both and the password are required to decrypt"
)]
struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Append a JSON line per successful operation to this file
    #[arg(long, global = true, env = "FILECRYPT_AUDIT_LOG")]
    audit_log: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Encrypt a file
    Encrypt(EncryptArgs),

    /// Decrypt a file
    Decrypt(DecryptArgs),
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Password (required)
    #[arg(
        short = 'p',
        long,
        env = "FILECRYPT_PASSWORD",
        hide_env_values = true,
        value_parser = NonEmptyStringValueParser::new()
    )]
    password: String,

    /// Overwrite existing output files
    #[arg(short = 'f', long)]
    force: bool,

    /// Use the chunked stream format instead of loading the file into memory
    #[arg(long)]
    stream: bool,
}

#[derive(Args, Debug)]
struct EncryptArgs {
    /// File to encrypt
    input: PathBuf,

    /// Encrypted output (default: <input>_encrypted.bin)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Key-file output (default: <output>_key.bin)
    #[arg(short = 'k', long)]
    key: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Args, Debug)]
struct DecryptArgs {
    /// Encrypted file
    input: PathBuf,

    /// Key-file (default: derived from the input name)
    #[arg(short = 'k', long)]
    key: Option<PathBuf>,

    /// Decrypted output (default: <input>_decrypted)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

// ── Entry point ────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Open the audit log before touching any file so a bad path fails early.
    let mut sink = match &cli.audit_log {
        Some(path) => Some(
            FileAuditSink::new(path)
                .with_context(|| format!("opening audit log {}", path.display()))?,
        ),
        None => None,
    };

    let record = match &cli.command {
        Commands::Encrypt(args) => cmd_encrypt(args)?,
        Commands::Decrypt(args) => cmd_decrypt(args)?,
    };

    if let Some(sink) = sink.as_mut() {
        record_operation(sink, &record);
    }
    Ok(())
}

/// The operation already succeeded; a failing sink only gets a warning.
fn record_operation(sink: &mut dyn AuditSink, record: &OperationRecord) {
    if let Err(e) = sink.append(record) {
        warn!(error = %e, "audit record not written");
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "filecrypt=debug" } else { "filecrypt=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Collapse core failures into one message. I/O errors keep their detail.
fn user_facing(err: FileCryptError, action: &str) -> anyhow::Error {
    match err {
        FileCryptError::Io(e) => anyhow::Error::new(e).context(format!("{action} failed")),
        _ => anyhow!("{action} failed: wrong password, mismatched key-file, or damaged input"),
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

fn ensure_input(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(anyhow!("input file {} does not exist", path.display()));
    }
    Ok(())
}

// ── Commands ───────────────────────────────────────────────────────────────────

fn cmd_encrypt(args: &EncryptArgs) -> Result<OperationRecord> {
    ensure_input(&args.input)?;
    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| paths::encrypted_output(&args.input));
    let key_path = args
        .key
        .clone()
        .unwrap_or_else(|| paths::key_file_for(&out_path));
    if out_path == key_path {
        return Err(anyhow!("output and key-file must be different paths"));
    }

    let force = args.common.force;
    output::ensure_writable(&out_path, force)?;
    output::ensure_writable(&key_path, force)?;

    let password = args.common.password.as_bytes();
    let rng = SystemRandom::new();

    let mut cipher_tmp = output::stage(&out_path)?;
    let (key_file, plaintext_len) = if args.common.stream {
        let reader = BufReader::new(
            File::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?,
        );
        let writer = BufWriter::new(cipher_tmp.as_file_mut());
        envelope::encrypt_stream_with_password(reader, writer, password, &rng)
            .map_err(|e| user_facing(e, "encryption"))?
    } else {
        let data = read_input(&args.input)?;
        let sealed =
            envelope::encrypt_with(&data, password, &rng).map_err(|e| user_facing(e, "encryption"))?;
        cipher_tmp.write_all(&sealed.cipher_file)?;
        (sealed.key_file, data.len() as u64)
    };

    let mut key_tmp = output::stage(&key_path)?;
    key_tmp.write_all(&key_file)?;

    // Both artifacts are complete on disk; only now do they get their names.
    output::commit(cipher_tmp, &out_path, force)?;
    if let Err(e) = output::commit(key_tmp, &key_path, force) {
        // A cipher-file without its key-file is unrecoverable; never leave one behind.
        if let Err(rm) = fs::remove_file(&out_path) {
            warn!(error = %rm, path = %out_path.display(), "could not remove orphaned output");
        }
        return Err(e);
    }
    debug!(plaintext_len, stream = args.common.stream, "encrypt complete");

    println!("encrypted");
    println!("output:   {}", out_path.display());
    println!("key-file: {}", key_path.display());
    info!(output = %out_path.display(), key = %key_path.display(), "file encrypted");

    Ok(OperationRecord::now(
        Operation::Encrypt,
        &args.input,
        vec![out_path, key_path],
        plaintext_len,
        args.common.stream,
    ))
}

fn cmd_decrypt(args: &DecryptArgs) -> Result<OperationRecord> {
    ensure_input(&args.input)?;
    let key_path = match &args.key {
        Some(k) => k.clone(),
        None => {
            let guess = paths::key_file_for(&args.input);
            if !guess.is_file() {
                return Err(anyhow!("no key-file found at {}; pass one with -k", guess.display()));
            }
            guess
        }
    };
    let out_path = args
        .output
        .clone()
        .unwrap_or_else(|| paths::decrypted_output(&args.input));

    let force = args.common.force;
    output::ensure_writable(&out_path, force)?;

    let password = args.common.password.as_bytes();
    let key_file = read_input(&key_path)?;

    let plaintext_len = if args.common.stream {
        let reader = BufReader::new(
            File::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?,
        );
        let mut tmp = output::stage(&out_path)?;
        let total = envelope::decrypt_stream_with_password(
            reader,
            BufWriter::new(tmp.as_file_mut()),
            &key_file,
            password,
        )
        .map_err(|e| user_facing(e, "decryption"))?;
        output::commit(tmp, &out_path, force)?;
        total
    } else {
        let cipher_file = read_input(&args.input)?;
        let plaintext = envelope::decrypt(&cipher_file, &key_file, password)
            .map_err(|e| user_facing(e, "decryption"))?;
        output::write_atomic(&out_path, &plaintext, force)?;
        plaintext.len() as u64
    };

    println!("decrypted");
    println!("output: {}", out_path.display());
    info!(output = %out_path.display(), "file decrypted");

    Ok(OperationRecord::now(
        Operation::Decrypt,
        &args.input,
        vec![out_path],
        plaintext_len,
        args.common.stream,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_empty_password_rejected_at_cli() {
        let result = Cli::try_parse_from(["filecrypt", "encrypt", "in.txt", "-p", ""]);
        assert!(result.is_err());
    }

    #[test]
    fn test_encrypt_decrypt_through_commands() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        fs::write(&input, b"hello").unwrap();

        let cli = Cli::try_parse_from([
            "filecrypt",
            "encrypt",
            input.to_str().unwrap(),
            "-p",
            "hunter2",
        ])
        .unwrap();
        let Commands::Encrypt(args) = cli.command else { panic!("expected encrypt") };
        let record = cmd_encrypt(&args).unwrap();

        let encrypted = dir.path().join("notes_encrypted.bin");
        let key = dir.path().join("notes_encrypted_key.bin");
        assert_eq!(record.outputs, vec![encrypted.clone(), key.clone()]);
        assert_eq!(fs::read(&encrypted).unwrap().len(), 28 + 5);
        assert_eq!(fs::read(&key).unwrap().len(), 76);

        let cli = Cli::try_parse_from([
            "filecrypt",
            "decrypt",
            encrypted.to_str().unwrap(),
            "-p",
            "hunter1",
        ])
        .unwrap();
        let Commands::Decrypt(args) = cli.command else { panic!("expected decrypt") };
        let err = cmd_decrypt(&args).unwrap_err();
        assert!(err.to_string().contains("decryption failed"));
        assert!(!dir.path().join("notes_encrypted_decrypted").exists());

        let cli = Cli::try_parse_from([
            "filecrypt",
            "decrypt",
            encrypted.to_str().unwrap(),
            "-p",
            "hunter2",
        ])
        .unwrap();
        let Commands::Decrypt(args) = cli.command else { panic!("expected decrypt") };
        cmd_decrypt(&args).unwrap();
        assert_eq!(
            fs::read(dir.path().join("notes_encrypted_decrypted")).unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_failed_key_file_commit_removes_cipher_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.txt");
        fs::write(&input, b"hello").unwrap();

        // A non-empty directory where the key-file should go cannot be replaced.
        let key_dir = dir.path().join("keydir");
        fs::create_dir_all(key_dir.join("inner")).unwrap();
        let out = dir.path().join("out.bin");

        let cli = Cli::try_parse_from([
            "filecrypt",
            "encrypt",
            input.to_str().unwrap(),
            "-p",
            "pw",
            "-f",
            "-o",
            out.to_str().unwrap(),
            "-k",
            key_dir.to_str().unwrap(),
        ])
        .unwrap();
        let Commands::Encrypt(args) = cli.command else { panic!("expected encrypt") };

        assert!(cmd_encrypt(&args).is_err());
        assert!(!out.exists(), "cipher-file must not outlive a failed key-file write");
        assert!(key_dir.join("inner").is_dir());
    }

    struct BrokenSink;

    impl AuditSink for BrokenSink {
        fn append(&mut self, _record: &OperationRecord) -> std::io::Result<()> {
            Err(std::io::Error::other("disk full"))
        }
    }

    #[test]
    fn test_audit_failure_does_not_fail_operation() {
        let record = OperationRecord::now(Operation::Decrypt, "in", vec!["out".into()], 3, false);
        // Must return normally; the outputs are already committed at this point.
        record_operation(&mut BrokenSink, &record);
    }

    #[test]
    fn test_failed_stream_decrypt_leaves_no_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("big.dat");
        fs::write(&input, vec![9u8; 200_000]).unwrap();

        let cli = Cli::try_parse_from([
            "filecrypt",
            "encrypt",
            input.to_str().unwrap(),
            "-p",
            "pw",
            "--stream",
        ])
        .unwrap();
        let Commands::Encrypt(args) = cli.command else { panic!("expected encrypt") };
        cmd_encrypt(&args).unwrap();

        // Corrupt the last byte: earlier chunks still verify, the final one does not.
        let encrypted = dir.path().join("big_encrypted.bin");
        let mut bytes = fs::read(&encrypted).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        fs::write(&encrypted, bytes).unwrap();

        let out = dir.path().join("restored.dat");
        let cli = Cli::try_parse_from([
            "filecrypt",
            "decrypt",
            encrypted.to_str().unwrap(),
            "-p",
            "pw",
            "-o",
            out.to_str().unwrap(),
            "--stream",
        ])
        .unwrap();
        let Commands::Decrypt(args) = cli.command else { panic!("expected decrypt") };
        assert!(cmd_decrypt(&args).is_err());
        assert!(!out.exists());
    }
}
