//! Audit Log: an append-only ledger of action outcomes.
//! State (the open file handle) is owned by exactly this component; all
//! writes are serialized through it — no cross-component locks.

use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::debug;

use crate::error::{Error, Result};
use crate::model::AuditEntry;

const APP_DIR_NAME: &str = "SwiftSweep";
const LOG_FILE_NAME: &str = "cleanup_actions.log";

struct Inner {
    file: std::fs::File,
}

/// Append-only audit ledger. One line per entry, UTF-8, `AuditEntry`'s
/// `" | "`-delimited format. Tolerant of partial writes: a
/// crash mid-line leaves a trailing fragment that `read_all` silently
/// skips rather than failing the whole read.
pub struct AuditLog {
    path: PathBuf,
    inner: Mutex<Inner>,
}

impl AuditLog {
    /// Open (creating if necessary) the audit log at `path` for appending.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)?;
        Ok(Self {
            path,
            inner: Mutex::new(Inner { file }),
        })
    }

    /// The conventional log location: `~/Library/Logs/SwiftSweep/
    /// cleanup_actions.log` (or platform equivalent of `dirs::data_dir()`
    /// joined appropriately).
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::home_dir()
            .ok_or_else(|| Error::Configuration("could not resolve home directory".into()))?;
        Ok(base.join("Library/Logs").join(APP_DIR_NAME).join(LOG_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry as a single line. Never mutates an existing line;
    /// this is the only write operation the log exposes.
    pub fn append(&self, entry: &AuditEntry) -> Result<()> {
        let mut inner = self.inner.lock();
        writeln!(inner.file, "{}", entry.to_line())?;
        inner.file.flush()?;
        debug!(rule = %entry.rule_id, action = ?entry.action_type, "audit entry appended");
        Ok(())
    }

    /// Read every well-formed entry currently on disk, skipping any
    /// trailing fragment a crash left mid-write.
    pub fn read_all(&self) -> Result<Vec<AuditEntry>> {
        let text = std::fs::read_to_string(&self.path)?;
        Ok(text.lines().filter_map(AuditEntry::from_line).collect())
    }

    /// The last `limit` well-formed entries, oldest first.
    pub fn tail(&self, limit: usize) -> Result<Vec<AuditEntry>> {
        let mut entries = self.read_all()?;
        if entries.len() > limit {
            entries.drain(..entries.len() - limit);
        }
        Ok(entries)
    }
}
