//! Context Builder: produces one [`RecommendationContext`]
//! snapshot per evaluation round. Every signal is independently optional —
//! a source that can't answer returns `None` rather than a guess.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::model::{
    CleanupCandidate, CleanupCategory, DownloadedFile, InstalledApp, RecommendationContext,
    SystemMetrics,
};

use super::cache::ContextCache;

/// Upper bound on entries reported by the cleanup scan and downloads
/// listing, so a single build stays bounded even on a Downloads folder with
/// years of accumulated installers.
pub const MAX_SCAN_ENTRIES: usize = 5_000;

/// Source of current system resource metrics. This crate carries no
/// platform-metrics dependency of its own — production callers inject an
/// adapter over their platform API; the default reports the signal
/// unavailable.
pub trait SystemMetricsSource: Send + Sync {
    fn read(&self) -> Option<SystemMetrics>;
}

/// Default metrics source: always reports the signal unavailable, so rules
/// requiring `RuleCapability::SystemMetrics` correctly abstain.
pub struct UnavailableMetricsSource;

impl SystemMetricsSource for UnavailableMetricsSource {
    fn read(&self) -> Option<SystemMetrics> {
        None
    }
}

/// Source of the installed-app listing, independently optional. Like system
/// metrics, enumerating installed applications is a platform integration
/// point outside this crate's scope.
pub trait InstalledAppsSource: Send + Sync {
    fn list(&self) -> Option<Vec<InstalledApp>>;
}

pub struct UnavailableAppsSource;

impl InstalledAppsSource for UnavailableAppsSource {
    fn list(&self) -> Option<Vec<InstalledApp>> {
        None
    }
}

/// One root the cleanup-candidate scan walks one level deep, tagging each
/// child with `category`. An optional `filter` restricts which children
/// become candidates at all (e.g. only screenshot-named files on Desktop),
/// so one physical directory can host more than one logical category.
#[derive(Clone)]
struct CleanupRoot {
    path: PathBuf,
    category: CleanupCategory,
    filter: Option<fn(&Path) -> bool>,
}

/// Builds [`RecommendationContext`] snapshots, optionally short-circuited
/// by a [`ContextCache`].
pub struct ContextBuilder {
    home: PathBuf,
    cleanup_roots: Vec<CleanupRoot>,
    metrics_source: Arc<dyn SystemMetricsSource>,
    apps_source: Arc<dyn InstalledAppsSource>,
    cache: Option<Arc<ContextCache>>,
}

impl ContextBuilder {
    pub fn new(home: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            cleanup_roots: Vec::new(),
            metrics_source: Arc::new(UnavailableMetricsSource),
            apps_source: Arc::new(UnavailableAppsSource),
            cache: None,
        }
    }

    pub fn with_metrics_source(mut self, source: Arc<dyn SystemMetricsSource>) -> Self {
        self.metrics_source = source;
        self
    }

    pub fn with_apps_source(mut self, source: Arc<dyn InstalledAppsSource>) -> Self {
        self.apps_source = source;
        self
    }

    pub fn with_cache(mut self, cache: Arc<ContextCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Register a directory whose immediate children should each become one
    /// [`CleanupCandidate`] tagged with `category` (e.g. `~/Library/Caches`
    /// tagged `ApplicationCache`, `~/.Trash` tagged `Trash`).
    pub fn with_cleanup_root(mut self, path: impl Into<PathBuf>, category: CleanupCategory) -> Self {
        self.cleanup_roots.push(CleanupRoot {
            path: path.into(),
            category,
            filter: None,
        });
        self
    }

    /// Like [`ContextBuilder::with_cleanup_root`], but only children
    /// passing `filter` become candidates — lets one physical directory
    /// (e.g. `~/Desktop`) host more than one logical category.
    pub fn with_filtered_cleanup_root(
        mut self,
        path: impl Into<PathBuf>,
        category: CleanupCategory,
        filter: fn(&Path) -> bool,
    ) -> Self {
        self.cleanup_roots.push(CleanupRoot {
            path: path.into(),
            category,
            filter: Some(filter),
        });
        self
    }

    /// Build (or serve from cache) one context snapshot.
    pub async fn build(&self) -> Result<RecommendationContext> {
        if let Some(cache) = &self.cache {
            if !cache.is_expired() {
                if let Some(cached) = cache.load()? {
                    debug!("context cache hit");
                    return Ok(RecommendationContext {
                        system_metrics: self.metrics_source.read(),
                        ..cached
                    });
                }
            }
        }

        info!("building recommendation context");
        let system_metrics = self.metrics_source.read();
        let cleanup_candidates = self.scan_cleanup_candidates().await?;
        let downloads = self.scan_downloads().await?;
        let installed_apps = self.apps_source.list();

        let context = RecommendationContext {
            system_metrics,
            cleanup_candidates: Some(cleanup_candidates),
            downloads: Some(downloads),
            installed_apps,
            timestamp: Utc::now(),
        };

        if let Some(cache) = &self.cache {
            cache.store(&context)?;
        }
        Ok(context)
    }

    async fn scan_cleanup_candidates(&self) -> Result<Vec<CleanupCandidate>> {
        let mut candidates = Vec::new();
        for root in &self.cleanup_roots {
            if candidates.len() >= MAX_SCAN_ENTRIES {
                break;
            }
            let remaining = MAX_SCAN_ENTRIES - candidates.len();
            let path = root.path.clone();
            let filter = root.filter;
            let entries = tokio::task::spawn_blocking(move || scan_directory_sizes(&path, remaining, filter))
                .await
                .map_err(blocking_join_error)?;
            for (path, size_bytes, modified_at) in entries {
                candidates.push(CleanupCandidate {
                    path,
                    size_bytes,
                    category: root.category,
                    modified_at,
                });
            }
        }
        debug!(count = candidates.len(), "cleanup candidate scan complete");
        Ok(candidates)
    }

    async fn scan_downloads(&self) -> Result<Vec<DownloadedFile>> {
        let downloads_dir = self.home.join("Downloads");
        let entries =
            tokio::task::spawn_blocking(move || list_downloads(&downloads_dir, MAX_SCAN_ENTRIES))
                .await
                .map_err(blocking_join_error)?;
        debug!(count = entries.len(), "downloads listing complete");
        Ok(entries)
    }
}

fn blocking_join_error(err: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(err.to_string()))
}

fn scan_directory_sizes(
    root: &Path,
    limit: usize,
    filter: Option<fn(&Path) -> bool>,
) -> Vec<(PathBuf, u64, Option<DateTime<Utc>>)> {
    let mut results = Vec::new();
    let entries = match std::fs::read_dir(root) {
        Ok(entries) => entries,
        Err(_) => return results,
    };
    for entry in entries.flatten() {
        if results.len() >= limit {
            break;
        }
        let path = entry.path();
        if let Some(filter) = filter {
            if !filter(&path) {
                continue;
            }
        }
        let size = directory_size(&path);
        let modified_at = entry
            .metadata()
            .ok()
            .and_then(|m| m.modified().ok())
            .map(system_time_to_utc);
        results.push((path, size, modified_at));
    }
    results
}

fn directory_size(path: &Path) -> u64 {
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

fn list_downloads(dir: &Path, limit: usize) -> Vec<DownloadedFile> {
    let mut out = Vec::new();
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => return out,
    };
    for entry in entries.flatten() {
        if out.len() >= limit {
            break;
        }
        let metadata = match entry.metadata() {
            Ok(metadata) => metadata,
            Err(_) => continue,
        };
        if !metadata.is_file() {
            continue;
        }
        let created_at = metadata
            .created()
            .ok()
            .map(system_time_to_utc)
            .unwrap_or_else(Utc::now);
        let last_accessed_at = metadata.accessed().ok().map(system_time_to_utc);
        out.push(DownloadedFile {
            path: entry.path(),
            size_bytes: metadata.len(),
            created_at,
            last_accessed_at,
        });
    }
    out
}

fn system_time_to_utc(time: SystemTime) -> DateTime<Utc> {
    DateTime::<Utc>::from(time)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_home_yields_empty_optional_signals() {
        let home = tempfile::tempdir().unwrap();
        let builder = ContextBuilder::new(home.path());
        let context = builder.build().await.unwrap();
        assert!(context.system_metrics.is_none());
        assert!(context.installed_apps.is_none());
        assert_eq!(context.downloads, Some(vec![]));
        assert_eq!(context.cleanup_candidates, Some(vec![]));
    }

    #[tokio::test]
    async fn downloads_are_listed_with_sizes() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(home.path().join("Downloads")).unwrap();
        std::fs::write(home.path().join("Downloads/installer.dmg"), vec![0u8; 2048]).unwrap();

        let builder = ContextBuilder::new(home.path());
        let context = builder.build().await.unwrap();
        let downloads = context.downloads.unwrap();
        assert_eq!(downloads.len(), 1);
        assert_eq!(downloads[0].size_bytes, 2048);
    }

    #[tokio::test]
    async fn cleanup_roots_are_tagged_by_category() {
        let home = tempfile::tempdir().unwrap();
        let caches = home.path().join("Library/Caches");
        std::fs::create_dir_all(caches.join("com.example.app")).unwrap();
        std::fs::write(caches.join("com.example.app/blob.bin"), vec![0u8; 4096]).unwrap();

        let builder =
            ContextBuilder::new(home.path()).with_cleanup_root(caches, CleanupCategory::ApplicationCache);
        let context = builder.build().await.unwrap();
        let candidates = context.cleanup_candidates.unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].category, CleanupCategory::ApplicationCache);
        assert_eq!(candidates[0].size_bytes, 4096);
    }

    #[tokio::test]
    async fn cache_hit_short_circuits_the_scan() {
        let home = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(home.path().join("Downloads")).unwrap();
        std::fs::write(home.path().join("Downloads/a.dmg"), vec![0u8; 10]).unwrap();

        let cache = Arc::new(ContextCache::new(home.path().join("insights_cache.json")));
        let builder = ContextBuilder::new(home.path()).with_cache(cache.clone());
        let first = builder.build().await.unwrap();
        assert_eq!(first.downloads.as_ref().unwrap().len(), 1);

        // Mutate the filesystem after the cache was populated; a cache hit
        // must not observe the new file.
        std::fs::write(home.path().join("Downloads/b.dmg"), vec![0u8; 10]).unwrap();
        let second = builder.build().await.unwrap();
        assert_eq!(second.downloads.as_ref().unwrap().len(), 1);

        cache.invalidate();
        let third = builder.build().await.unwrap();
        assert_eq!(third.downloads.as_ref().unwrap().len(), 2);
    }
}
