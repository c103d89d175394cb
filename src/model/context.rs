use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse category a cleanup candidate falls into; used by rules to filter
/// the flat candidate list without re-deriving it from the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanupCategory {
    DeveloperCache,
    BrowserCache,
    ApplicationCache,
    Trash,
    MailAttachment,
    Screenshot,
    Other,
}

/// Current system resource metrics, as gathered by the Context Builder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SystemMetrics {
    pub cpu_usage_fraction: f64,
    pub memory_usage_fraction: f64,
    pub memory_total_bytes: u64,
    pub memory_used_bytes: u64,
    pub disk_usage_fraction: f64,
    pub disk_total_bytes: u64,
    pub disk_free_bytes: u64,
}

/// One entry from the bounded cleanup-candidate scan. `modified_at` is
/// `None` when the scan couldn't read the filesystem timestamp; rules that
/// need an age (e.g. screenshot or mail-attachment cleanup) must treat a
/// missing timestamp as "age unknown", not as "old".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CleanupCandidate {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub category: CleanupCategory,
    pub modified_at: Option<DateTime<Utc>>,
}

/// One entry from a flat listing of the user's downloads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DownloadedFile {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: Option<DateTime<Utc>>,
}

/// One entry from the installed-app listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstalledApp {
    pub id: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub last_used_at: Option<DateTime<Utc>>,
}

/// One immutable snapshot of system signals used for a single evaluation
/// round. Any field may be `None`; rules MUST treat `None` as "signal
/// unavailable" and return no recommendations for capabilities they can't
/// satisfy, rather than guessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationContext {
    pub system_metrics: Option<SystemMetrics>,
    pub cleanup_candidates: Option<Vec<CleanupCandidate>>,
    pub downloads: Option<Vec<DownloadedFile>>,
    pub installed_apps: Option<Vec<InstalledApp>>,
    pub timestamp: DateTime<Utc>,
}

impl RecommendationContext {
    /// An empty context timestamped `now`, with every signal absent. Tests
    /// and callers build on top of this via the `with_*` setters.
    pub fn empty(timestamp: DateTime<Utc>) -> Self {
        Self {
            system_metrics: None,
            cleanup_candidates: None,
            downloads: None,
            installed_apps: None,
            timestamp,
        }
    }

    pub fn with_system_metrics(mut self, metrics: SystemMetrics) -> Self {
        self.system_metrics = Some(metrics);
        self
    }

    pub fn with_cleanup_candidates(mut self, candidates: Vec<CleanupCandidate>) -> Self {
        self.cleanup_candidates = Some(candidates);
        self
    }

    pub fn with_downloads(mut self, downloads: Vec<DownloadedFile>) -> Self {
        self.downloads = Some(downloads);
        self
    }

    pub fn with_installed_apps(mut self, apps: Vec<InstalledApp>) -> Self {
        self.installed_apps = Some(apps);
        self
    }
}
