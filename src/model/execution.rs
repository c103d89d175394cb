use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// How the Action Executor should treat a path: move it to the user trash
/// (reversible) or remove it recursively (permanent). `Delete` is retained
/// for completeness; no built-in rule emits it, and callers default to
/// `Trash`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    Trash,
    Delete,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Trash
    }
}

/// The outcome of acting on a single path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Success,
    Failed,
    Skipped,
}

/// Per-path outcome of an execution batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemResult {
    pub path: PathBuf,
    pub status: ItemStatus,
    pub size_bytes: u64,
    pub error: Option<ItemError>,
}

/// A classified, per-item failure — carries the same taxonomy as
/// [`crate::error::Error`] so callers can match on `kind` without parsing
/// `message`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemError {
    pub kind: ErrorKind,
    pub message: String,
}

/// Result of one `execute`/`execute_batch` call. Never fails catastrophically
/// on partial failures: per-item errors are recorded here, not propagated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub success_count: usize,
    pub failed_count: usize,
    pub skipped_count: usize,
    pub total_bytes: u64,
    pub items: Vec<ItemResult>,
}

impl ExecutionResult {
    pub fn record(&mut self, item: ItemResult) {
        match item.status {
            ItemStatus::Success => {
                self.success_count += 1;
                self.total_bytes += item.size_bytes;
            }
            ItemStatus::Failed => self.failed_count += 1,
            ItemStatus::Skipped => self.skipped_count += 1,
        }
        self.items.push(item);
    }
}
