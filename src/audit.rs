//! Append-only operation records.
//!
//! Every successful encrypt or decrypt performed by a front end can be
//! recorded here. Records carry paths, sizes and a timestamp; they never
//! carry passwords, keys or content.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A sink that receives operation records. Implement this to forward
/// records to a file, database or other persistent store.
pub trait AuditSink: Send {
    /// Append a record.
    fn append(&mut self, record: &OperationRecord) -> std::io::Result<()>;
}

/// Which direction the envelope was applied in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Encrypt,
    Decrypt,
}

/// A permanent record of one completed operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationRecord {
    pub operation: Operation,
    /// The file that was read.
    pub input: PathBuf,
    /// Every file that was written, in write order.
    pub outputs: Vec<PathBuf>,
    /// Size of the plaintext side of the operation.
    pub plaintext_len: u64,
    /// Whether the chunked stream format was used.
    pub streamed: bool,
    pub timestamp: DateTime<Utc>,
}

impl OperationRecord {
    /// Build a record stamped with the current time.
    pub fn now(
        operation: Operation,
        input: impl Into<PathBuf>,
        outputs: Vec<PathBuf>,
        plaintext_len: u64,
        streamed: bool,
    ) -> Self {
        Self {
            operation,
            input: input.into(),
            outputs,
            plaintext_len,
            streamed,
            timestamp: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Built-in sink: file
// ---------------------------------------------------------------------------

/// Writes records as JSON lines (one per record) to a file.
/// Creates the file if it doesn't exist; appends if it does.
pub struct FileAuditSink {
    file: std::fs::File,
}

impl FileAuditSink {
    /// Open or create a file for append-only logging.
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file })
    }
}

impl AuditSink for FileAuditSink {
    fn append(&mut self, record: &OperationRecord) -> std::io::Result<()> {
        let line = serde_json::to_string(record)?;
        writeln!(self.file, "{line}")?;
        self.file.flush()
    }
}
