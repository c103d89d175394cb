//! Command handlers: one function per subcommand, each driving the core
//! pipeline end to end and printing a human- or machine-readable summary.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::executor::CancellationToken;
use crate::iotrace::{detect_hotspots, Aggregator, IoTracer, RingBuffer};
use crate::model::{ActionType, Recommendation, Severity};

use super::setup::{build_pipeline, resolve_home};

/// Exit code used when one or more rules emitted `critical`
/// severity and the caller requested fail-on-critical.
pub const EXIT_CRITICAL: i32 = 2;

fn min_severity_from_str(s: &str) -> Severity {
    match s.to_ascii_lowercase().as_str() {
        "critical" => Severity::Critical,
        "info" => Severity::Info,
        _ => Severity::Warning,
    }
}

fn print_recommendations(recommendations: &[Recommendation]) {
    if recommendations.is_empty() {
        println!("No recommendations.");
        return;
    }
    for rec in recommendations {
        let reclaim = rec
            .estimated_reclaim_bytes
            .map(crate::model::format_bytes)
            .unwrap_or_else(|| "-".to_string());
        println!(
            "[{:?}] {} ({}) — {}",
            rec.severity, rec.title, reclaim, rec.id
        );
        for evidence in &rec.evidence {
            println!("    {}: {}", evidence.label, evidence.value);
        }
    }
}

pub async fn handle_scan_command(
    home: Option<std::path::PathBuf>,
    fail_on_critical: bool,
    json: bool,
) -> Result<i32> {
    let home = resolve_home(home)?;
    let pipeline = build_pipeline(home)?;

    let context = pipeline.context_builder.build().await?;
    let (recommendations, failures) = pipeline.rule_engine.evaluate(&context, &pipeline.settings).await;
    for failure in &failures {
        eprintln!("rule '{}' failed: {}", failure.rule_id, failure.message);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&recommendations)?);
    } else {
        print_recommendations(&recommendations);
    }

    let any_critical = recommendations.iter().any(|r| r.severity == Severity::Critical);
    if fail_on_critical && any_critical {
        return Ok(EXIT_CRITICAL);
    }
    Ok(0)
}

pub async fn handle_clean_command(
    home: Option<std::path::PathBuf>,
    dry_run: bool,
    yes: bool,
    min_severity: String,
    fail_on_critical: bool,
) -> Result<i32> {
    let home = resolve_home(home)?;
    let pipeline = build_pipeline(home)?;

    let context = pipeline.context_builder.build().await?;
    let (recommendations, failures) = pipeline.rule_engine.evaluate(&context, &pipeline.settings).await;
    for failure in &failures {
        eprintln!("rule '{}' failed: {}", failure.rule_id, failure.message);
    }

    let threshold = min_severity_from_str(&min_severity);
    let accepted: Vec<Recommendation> = recommendations
        .iter()
        .filter(|r| r.severity.priority() <= threshold.priority())
        .cloned()
        .collect();

    let effective_dry_run = dry_run || !yes;
    if effective_dry_run {
        info!("clean running as a dry run; pass --yes to execute");
    }

    let cancellation = CancellationToken::new();
    let result = pipeline
        .executor
        .execute_batch(&accepted, ActionType::CleanupTrash, effective_dry_run, None, &cancellation)
        .await;

    println!(
        "processed {} recommendations: {} succeeded, {} failed, {} skipped, {} reclaimed",
        accepted.len(),
        result.success_count,
        result.failed_count,
        result.skipped_count,
        crate::model::format_bytes(result.total_bytes),
    );

    let any_critical = recommendations.iter().any(|r| r.severity == Severity::Critical);
    if fail_on_critical && any_critical {
        return Ok(EXIT_CRITICAL);
    }
    Ok(0)
}

pub async fn handle_trace_command(home: Option<std::path::PathBuf>, json: bool) -> Result<i32> {
    let home = resolve_home(home)?;
    let pipeline = build_pipeline(home)?;

    let buffer = Arc::new(RingBuffer::new(4096));
    let tracer = IoTracer::new(buffer.clone());
    let aggregator = Aggregator::new(buffer.clone());

    tracer.start();
    let context = pipeline.context_builder.build().await?;
    if let Some(candidates) = &context.cleanup_candidates {
        for candidate in candidates.iter().take(200) {
            if let Some(parent) = candidate.path.parent() {
                let _ = tracer.tracked_contents(parent).await;
            }
        }
    }
    tracer.stop();

    let slice = aggregator.tick();
    let path_stats = aggregator.path_stats();
    let duration = slice.map(|s| Duration::from_nanos(s.duration_nanos)).unwrap_or_default();
    let mut optimizations = detect_hotspots(&path_stats, &aggregator.slices(), duration);
    crate::model::sort_optimizations(&mut optimizations);

    if json {
        println!("{}", serde_json::to_string_pretty(&optimizations)?);
    } else if optimizations.is_empty() {
        println!("No hotspots detected.");
    } else {
        for optimization in &optimizations {
            println!(
                "[{:?}] {} — {}",
                optimization.severity, optimization.suggestion, optimization.estimated_improvement
            );
        }
    }
    Ok(0)
}

pub async fn handle_audit_command(home: Option<std::path::PathBuf>, limit: usize) -> Result<i32> {
    let _ = home;
    let audit_path = crate::audit::AuditLog::default_path().context("could not resolve audit log path")?;
    let audit_log = crate::audit::AuditLog::open(audit_path)?;
    let entries = audit_log.tail(limit)?;
    if entries.is_empty() {
        println!("No audit entries.");
    }
    for entry in entries {
        println!(
            "{} {} {:?} items={}/{} bytes={} success={}",
            entry.timestamp.to_rfc3339(),
            entry.rule_id,
            entry.action_type,
            entry.items_processed,
            entry.item_count,
            entry.total_bytes,
            entry.success,
        );
    }
    Ok(0)
}
