use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The concrete operation a user may authorize from a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    CleanupTrash,
    CleanupDelete,
    OpenFinder,
    Rescan,
    EmptyTrash,
    UninstallPlan,
    OptimizeTask,
}

/// Sum-typed action payload: a path list, nothing, or an opaque identifier
/// (e.g. an app bundle id for `uninstall_plan`, a hotspot id for
/// `optimize_task`). Kept as a tagged union rather than an all-optional
/// struct so downstream formatting can match exhaustively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionPayload {
    Paths(Vec<PathBuf>),
    None,
    Identifier(String),
}

/// A concrete operation the user may authorize, owned by its
/// [`Recommendation`](super::Recommendation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub action_type: ActionType,
    pub payload: ActionPayload,
    pub requires_confirmation: bool,
    pub supports_dry_run: bool,
}

impl Action {
    /// Build a destructive cleanup action (`cleanup_trash`/`cleanup_delete`)
    /// over a deterministically sorted path list, since rules are expected
    /// to sort emitted actions' path lists deterministically.
    pub fn cleanup(action_type: ActionType, mut paths: Vec<PathBuf>) -> Self {
        debug_assert!(matches!(
            action_type,
            ActionType::CleanupTrash | ActionType::CleanupDelete
        ));
        paths.sort();
        Self {
            action_type,
            payload: ActionPayload::Paths(paths),
            requires_confirmation: true,
            supports_dry_run: true,
        }
    }

    pub fn rescan() -> Self {
        Self {
            action_type: ActionType::Rescan,
            payload: ActionPayload::None,
            requires_confirmation: false,
            supports_dry_run: false,
        }
    }

    pub fn open_finder(path: impl Into<PathBuf>) -> Self {
        Self {
            action_type: ActionType::OpenFinder,
            payload: ActionPayload::Paths(vec![path.into()]),
            requires_confirmation: false,
            supports_dry_run: false,
        }
    }

    pub fn empty_trash() -> Self {
        Self {
            action_type: ActionType::EmptyTrash,
            payload: ActionPayload::None,
            requires_confirmation: true,
            supports_dry_run: true,
        }
    }

    pub fn uninstall_plan(app_id: impl Into<String>) -> Self {
        Self {
            action_type: ActionType::UninstallPlan,
            payload: ActionPayload::Identifier(app_id.into()),
            requires_confirmation: true,
            supports_dry_run: true,
        }
    }

    pub fn optimize_task(hotspot_id: impl Into<String>) -> Self {
        Self {
            action_type: ActionType::OptimizeTask,
            payload: ActionPayload::Identifier(hotspot_id.into()),
            requires_confirmation: false,
            supports_dry_run: false,
        }
    }

    /// Paths carried by this action, if its payload is a path list.
    pub fn paths(&self) -> &[PathBuf] {
        match &self.payload {
            ActionPayload::Paths(paths) => paths,
            _ => &[],
        }
    }
}
