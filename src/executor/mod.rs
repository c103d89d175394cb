//! Action Executor: turns a recommendation's actions (or a
//! batch of recommendations' actions) into validated, deduplicated
//! filesystem mutations with per-item results and audit logging.

pub mod dedup;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};

use crate::audit::AuditLog;
use crate::error::ErrorKind;
use crate::helper::HelperClient;
use crate::model::{
    Action, ActionType, AuditEntry, ExecutionMode, ExecutionResult, ItemError, ItemResult,
    ItemStatus, Recommendation,
};
use crate::validator::{OperationIntent, PathValidator, RejectionReason};

/// Cooperative cancellation flag shared between a caller and a running
/// `execute`/`execute_batch` call. Checked once per item, at the per-item
/// loop's natural yield point.
#[derive(Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Progress callback invoked once per item, before it is acted upon:
/// `(path, index, total)`.
pub type ProgressCallback = Arc<dyn Fn(&Path, usize, usize) + Send + Sync>;

/// Turns validated recommendation actions into filesystem mutations. Owns
/// no mutable state of its own beyond what it borrows (the validator is
/// read-only per call, the audit log serializes its own writes).
pub struct ActionExecutor {
    validator: PathValidator,
    helper: Option<Arc<dyn HelperClient>>,
    audit_log: Arc<AuditLog>,
}

impl ActionExecutor {
    pub fn new(validator: PathValidator, audit_log: Arc<AuditLog>) -> Self {
        Self {
            validator,
            helper: None,
            audit_log,
        }
    }

    pub fn with_helper(mut self, helper: Arc<dyn HelperClient>) -> Self {
        self.helper = Some(helper);
        self
    }

    /// Execute one batch of paths under a single rule id. Implements spec
    /// §4.10's full algorithm: normalize/dedup, per-item validate + size +
    /// mutate (or dry-run), helper retry on permission failure, and one
    /// audit entry for the whole call (skipped entirely in dry-run mode).
    pub async fn execute(
        &self,
        paths: Vec<PathBuf>,
        mode: ExecutionMode,
        dry_run: bool,
        rule_id: &str,
        progress: Option<ProgressCallback>,
        cancellation: &CancellationToken,
    ) -> ExecutionResult {
        let normalized = dedup::normalize_and_dedup(paths);
        let total = normalized.len();
        let mut result = ExecutionResult::default();

        for (index, path) in normalized.into_iter().enumerate() {
            if cancellation.is_cancelled() {
                debug!(rule = rule_id, "execution cancelled, marking remaining items skipped");
                result.record(ItemResult {
                    path,
                    status: ItemStatus::Skipped,
                    size_bytes: 0,
                    error: None,
                });
                continue;
            }

            if let Some(progress) = &progress {
                progress(&path, index, total);
            }

            let item = self.execute_one(&path, mode, dry_run).await;
            result.record(item);
        }

        if !dry_run {
            self.append_audit_entry(rule_id, mode, &result);
        }

        result
    }

    /// Like [`ActionExecutor::execute`], but takes the `cleanup_trash`/
    /// `cleanup_delete` actions across a set of recommendations, grouping
    /// each recommendation's paths under its own inferred rule id so each
    /// underlying call still produces exactly one audit entry (spec
    /// §4.10's "append one AuditEntry per non-dry-run invocation",
    /// applied per originating rule rather than folding distinct rules
    /// into one entry — see `DESIGN.md`).
    pub async fn execute_batch(
        &self,
        recommendations: &[Recommendation],
        mode: ActionType,
        dry_run: bool,
        progress: Option<ProgressCallback>,
        cancellation: &CancellationToken,
    ) -> ExecutionResult {
        let execution_mode = match mode {
            ActionType::CleanupDelete => ExecutionMode::Delete,
            _ => ExecutionMode::Trash,
        };

        let mut aggregate = ExecutionResult::default();
        for recommendation in recommendations {
            let paths = cleanup_paths(recommendation, mode);
            if paths.is_empty() {
                continue;
            }
            let rule_id = infer_rule_id(&recommendation.id);
            let batch = self
                .execute(paths, execution_mode, dry_run, &rule_id, progress.clone(), cancellation)
                .await;
            merge_into(&mut aggregate, batch);
            if cancellation.is_cancelled() {
                break;
            }
        }
        aggregate
    }

    async fn execute_one(&self, path: &Path, mode: ExecutionMode, dry_run: bool) -> ItemResult {
        let intent = match mode {
            ExecutionMode::Trash => OperationIntent::Trash,
            ExecutionMode::Delete => OperationIntent::Delete,
        };

        let validated = match self.validator.validate(path, intent) {
            Ok(validated) => validated,
            Err(reason) => {
                return ItemResult {
                    path: path.to_path_buf(),
                    status: ItemStatus::Failed,
                    size_bytes: 0,
                    error: Some(ItemError {
                        kind: ErrorKind::Validation,
                        message: rejection_message(reason),
                    }),
                };
            }
        };

        if validated.outcome == crate::validator::ResolutionOutcome::Missing {
            return ItemResult {
                path: validated.canonical,
                status: ItemStatus::Skipped,
                size_bytes: 0,
                error: None,
            };
        }

        let canonical = validated.canonical;
        let size_bytes = recursive_size(&canonical);

        if dry_run {
            return ItemResult {
                path: canonical,
                status: ItemStatus::Success,
                size_bytes,
                error: None,
            };
        }

        match self.mutate(&canonical, mode).await {
            Ok(()) => ItemResult {
                path: canonical,
                status: ItemStatus::Success,
                size_bytes,
                error: None,
            },
            Err(primary_message) => self.retry_through_helper_or_fail(canonical, mode, size_bytes, primary_message).await,
        }
    }

    /// Raw mutation: trash moves to the user trash, delete removes
    /// recursively. Runs on the blocking pool since both are synchronous,
    /// potentially slow filesystem operations.
    async fn mutate(&self, canonical: &Path, mode: ExecutionMode) -> Result<(), String> {
        let canonical = canonical.to_path_buf();
        let join = tokio::task::spawn_blocking(move || match mode {
            ExecutionMode::Trash => trash::delete(&canonical).map_err(|err| err.to_string()),
            ExecutionMode::Delete => remove_recursively(&canonical).map_err(|err| err.to_string()),
        })
        .await;
        match join {
            Ok(inner) => inner,
            Err(join_err) => Err(join_err.to_string()),
        }
    }

    async fn retry_through_helper_or_fail(
        &self,
        canonical: PathBuf,
        mode: ExecutionMode,
        size_bytes: u64,
        primary_message: String,
    ) -> ItemResult {
        let helper_eligible = self.validator.is_helper_eligible(&canonical);
        if let (true, Some(helper)) = (helper_eligible, &self.helper) {
            match helper.delete_one(&canonical, mode).await {
                Ok(()) => {
                    return ItemResult {
                        path: canonical,
                        status: ItemStatus::Success,
                        size_bytes,
                        error: None,
                    };
                }
                Err(err) => {
                    warn!(path = %canonical.display(), error = %err, "helper retry failed");
                    return ItemResult {
                        path: canonical,
                        status: ItemStatus::Failed,
                        size_bytes: 0,
                        error: Some(ItemError {
                            kind: err.kind(),
                            message: err.to_string(),
                        }),
                    };
                }
            }
        }
        ItemResult {
            path: canonical,
            status: ItemStatus::Failed,
            size_bytes: 0,
            error: Some(ItemError {
                kind: ErrorKind::Permission,
                message: primary_message,
            }),
        }
    }

    fn append_audit_entry(&self, rule_id: &str, mode: ExecutionMode, result: &ExecutionResult) {
        let action_type = match mode {
            ExecutionMode::Trash => ActionType::CleanupTrash,
            ExecutionMode::Delete => ActionType::CleanupDelete,
        };
        let entry = AuditEntry {
            timestamp: Utc::now(),
            rule_id: rule_id.to_string(),
            action_type,
            item_count: result.items.len(),
            items_processed: result.success_count,
            total_bytes: result.total_bytes,
            success: result.failed_count == 0,
            error: result
                .items
                .iter()
                .find_map(|item| item.error.as_ref().map(|e| e.message.clone())),
        };
        if let Err(err) = self.audit_log.append(&entry) {
            warn!(error = %err, "failed to append audit entry");
        }
    }
}

fn cleanup_paths(recommendation: &Recommendation, mode: ActionType) -> Vec<PathBuf> {
    recommendation
        .actions
        .iter()
        .filter(|action: &&Action| action.action_type == mode)
        .flat_map(|action| action.paths().to_vec())
        .collect()
}

/// Recover the originating rule id from a stable recommendation id of the
/// shape `{rule_id}_{12 hex digits}` (see
/// [`crate::model::stable_recommendation_id`]). Falls back to the full id
/// if it doesn't match that shape (e.g. a hand-built id in a test).
fn infer_rule_id(recommendation_id: &str) -> String {
    let bytes = recommendation_id.as_bytes();
    if bytes.len() > 13 {
        let suffix_start = bytes.len() - 13;
        if bytes[suffix_start] == b'_' {
            let suffix = &recommendation_id[suffix_start + 1..];
            if suffix.len() == 12 && suffix.bytes().all(|b| b.is_ascii_hexdigit()) {
                return recommendation_id[..suffix_start].to_string();
            }
        }
    }
    recommendation_id.to_string()
}

fn merge_into(aggregate: &mut ExecutionResult, batch: ExecutionResult) {
    aggregate.success_count += batch.success_count;
    aggregate.failed_count += batch.failed_count;
    aggregate.skipped_count += batch.skipped_count;
    aggregate.total_bytes += batch.total_bytes;
    aggregate.items.extend(batch.items);
}

fn rejection_message(reason: RejectionReason) -> String {
    match reason {
        RejectionReason::OutsideAllowedRoots => "outside_allowed_roots".to_string(),
        RejectionReason::SymlinkEscape => "symlink_escape".to_string(),
        RejectionReason::ForbiddenSystemPrefix => "forbidden_system_prefix".to_string(),
        RejectionReason::NotAuthorized => "not_authorized".to_string(),
        RejectionReason::IoError => "io_error".to_string(),
    }
}

fn recursive_size(path: &Path) -> u64 {
    if path.is_file() {
        return std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    }
    walkdir::WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

fn remove_recursively(path: &Path) -> std::io::Result<()> {
    if path.is_dir() {
        std::fs::remove_dir_all(path)
    } else {
        std::fs::remove_file(path)
    }
}
