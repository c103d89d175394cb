//! Runtime setup: wires the pipeline's components together the way a real
//! caller (not a test) would, under one user's home directory.

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::audit::AuditLog;
use crate::context::{ContextBuilder, ContextCache};
use crate::executor::ActionExecutor;
use crate::model::CleanupCategory;
use crate::rules::RuleEngine;
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::settings::RuleSettings;
use crate::validator::PathValidator;

/// Every component a CLI command needs, assembled once per invocation.
pub struct Pipeline {
    pub context_builder: ContextBuilder,
    pub rule_engine: RuleEngine,
    pub executor: ActionExecutor,
    pub settings: RuleSettings,
    pub audit_log: Arc<AuditLog>,
}

/// Resolve the home directory a pipeline should scan: `--home` if given,
/// else the current user's home directory.
pub fn resolve_home(home_override: Option<std::path::PathBuf>) -> Result<std::path::PathBuf> {
    home_override
        .or_else(dirs::home_dir)
        .context("could not resolve home directory")
}

/// Build a [`Pipeline`] scanning under `home`, with the standard cleanup
/// roots (developer caches, browser caches, trash, downloads
/// screenshots/temp files) registered and persisted settings loaded from
/// their default path, falling back to defaults on any error.
pub fn build_pipeline(home: std::path::PathBuf) -> Result<Pipeline> {
    let cache = ContextCache::default_path()
        .map(ContextCache::new)
        .ok()
        .map(Arc::new);

    let mut context_builder = ContextBuilder::new(home.clone())
        .with_cleanup_root(home.join("Library/Caches"), CleanupCategory::ApplicationCache)
        .with_cleanup_root(home.join(".Trash"), CleanupCategory::Trash)
        .with_filtered_cleanup_root(
            home.join("Desktop"),
            CleanupCategory::Screenshot,
            is_screenshot_like,
        );
    if let Some(cache) = cache {
        context_builder = context_builder.with_cache(cache);
    }

    let scheduler = Arc::new(Scheduler::new(SchedulerConfig::default()));
    let rule_engine = RuleEngine::new(scheduler);
    for rule in crate::rules::builtin::all() {
        rule_engine.register(rule);
    }

    let settings_path = RuleSettings::default_path().ok();
    let settings = settings_path
        .as_deref()
        .map(RuleSettings::load)
        .unwrap_or_default();

    let audit_path = AuditLog::default_path().context("could not resolve audit log path")?;
    let audit_log = Arc::new(AuditLog::open(audit_path).context("could not open audit log")?);

    let validator = PathValidator::new(home);
    let executor = ActionExecutor::new(validator, audit_log.clone());

    Ok(Pipeline {
        context_builder,
        rule_engine,
        executor,
        settings,
        audit_log,
    })
}

fn is_screenshot_like(path: &std::path::Path) -> bool {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    name.starts_with("screen shot") || name.starts_with("screenshot") || name.ends_with(".tmp")
}
