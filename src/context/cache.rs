//! Context cache: a TTL-bounded JSON snapshot of the
//! expensive parts of a [`RecommendationContext`] under
//! `~/Library/Application Support/<app>/insights_cache.json`. System
//! metrics are cheap to re-measure and are never cached; only the scan
//! results are.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{CleanupCandidate, DownloadedFile, InstalledApp, RecommendationContext};

/// Default time-to-live before a cached scan is considered stale.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

const APP_DIR_NAME: &str = "SwiftSweep";
const CACHE_FILE_NAME: &str = "insights_cache.json";

/// The on-disk shape of the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct CacheFile {
    timestamp: DateTime<Utc>,
    downloads_files: Vec<DownloadedFile>,
    cleanup_items: Vec<CleanupCandidate>,
    installed_apps: Option<Vec<InstalledApp>>,
}

impl CacheFile {
    fn from_context(context: &RecommendationContext) -> Self {
        Self {
            timestamp: context.timestamp,
            downloads_files: context.downloads.clone().unwrap_or_default(),
            cleanup_items: context.cleanup_candidates.clone().unwrap_or_default(),
            installed_apps: context.installed_apps.clone(),
        }
    }

    fn into_context(self) -> RecommendationContext {
        RecommendationContext {
            system_metrics: None,
            cleanup_candidates: Some(self.cleanup_items),
            downloads: Some(self.downloads_files),
            installed_apps: self.installed_apps,
            timestamp: self.timestamp,
        }
    }
}

/// Owns the on-disk cache file plus an in-memory mirror so repeated
/// `is_expired` checks within one process don't reread the file. Owned
/// by exactly one component, like the rest of the pipeline's mutable state.
pub struct ContextCache {
    path: PathBuf,
    ttl: Duration,
    state: Mutex<Option<CacheFile>>,
}

impl ContextCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
            state: Mutex::new(None),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// The conventional cache location: `~/Library/Application
    /// Support/SwiftSweep/insights_cache.json` (or platform equivalent of
    /// `dirs::data_dir()`, injectable via [`ContextCache::new`] for tests).
    pub fn default_path() -> Result<PathBuf> {
        let base = dirs::data_dir()
            .ok_or_else(|| Error::Configuration("could not resolve application support directory".into()))?;
        Ok(base.join(APP_DIR_NAME).join(CACHE_FILE_NAME))
    }

    /// Whether the cache is stale (missing, unreadable, or older than the
    /// configured TTL). Consults the in-memory mirror first; otherwise
    /// checks the file's modification time without a full parse.
    pub fn is_expired(&self) -> bool {
        if let Some(cached) = self.state.lock().as_ref() {
            return cache_age_exceeds_ttl(cached.timestamp, self.ttl);
        }
        match std::fs::metadata(&self.path).and_then(|m| m.modified()) {
            Ok(modified) => SystemTime::now()
                .duration_since(modified)
                .map(|age| age > self.ttl)
                .unwrap_or(true),
            Err(_) => true,
        }
    }

    /// Drop the in-memory mirror and delete the backing file, forcing the
    /// next `load` to miss.
    pub fn invalidate(&self) {
        *self.state.lock() = None;
        let _ = std::fs::remove_file(&self.path);
    }

    /// Load a non-expired cached context, if one exists. `system_metrics`
    /// on the returned context is always `None` — it is never cached.
    pub fn load(&self) -> Result<Option<RecommendationContext>> {
        {
            let guard = self.state.lock();
            if let Some(cached) = guard.as_ref() {
                return Ok(if cache_age_exceeds_ttl(cached.timestamp, self.ttl) {
                    None
                } else {
                    Some(cached.clone().into_context())
                });
            }
        }
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => return Ok(None),
        };
        let file: CacheFile =
            serde_json::from_str(&text).map_err(|e| Error::Serialization(e.to_string()))?;
        let expired = cache_age_exceeds_ttl(file.timestamp, self.ttl);
        *self.state.lock() = Some(file.clone());
        Ok(if expired { None } else { Some(file.into_context()) })
    }

    /// Persist `context`'s scan results to disk and the in-memory mirror.
    pub fn store(&self, context: &RecommendationContext) -> Result<()> {
        let file = CacheFile::from_context(context);
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&file).map_err(|e| Error::Serialization(e.to_string()))?;
        std::fs::write(&self.path, json)?;
        *self.state.lock() = Some(file);
        Ok(())
    }
}

fn cache_age_exceeds_ttl(timestamp: DateTime<Utc>, ttl: Duration) -> bool {
    match Utc::now().signed_duration_since(timestamp).to_std() {
        Ok(age) => age > ttl,
        Err(_) => false, // timestamp is in the future (clock skew): treat as fresh
    }
}
