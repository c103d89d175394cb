//! `low_disk_space`: fires when overall disk usage crosses a
//! critical or warning fraction. A pure monitoring insight — it names no
//! specific files to delete, only a non-confirming `rescan` action so the
//! caller can re-evaluate once the user has freed space elsewhere.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::model::{
    Action, Confidence, Evidence, RecommendationContext, Recommendation, Risk, RuleCapability,
    Severity,
};
use crate::rules::{Rule, RuleCategory};
use crate::settings::RuleSettings;

const RULE_ID: &str = "low_disk_space";
const DEFAULT_CRITICAL_FRACTION_PERMILLE: i64 = 900;
const DEFAULT_WARNING_FRACTION_PERMILLE: i64 = 800;

pub struct LowDiskSpaceRule;

impl Rule for LowDiskSpaceRule {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Storage
    }

    fn capabilities(&self) -> BTreeSet<RuleCapability> {
        [RuleCapability::SystemMetrics].into_iter().collect()
    }

    fn evaluate(&self, context: &RecommendationContext, settings: &RuleSettings) -> Result<Vec<Recommendation>> {
        let Some(metrics) = context.system_metrics.as_ref() else {
            return Ok(Vec::new());
        };

        // Thresholds are stored as permille (parts per thousand) so they
        // fit the integer-only settings value type while still expressing
        // a fraction.
        let critical_permille = settings.threshold(RULE_ID, "critical_permille", DEFAULT_CRITICAL_FRACTION_PERMILLE);
        let warning_permille = settings.threshold(RULE_ID, "warning_permille", DEFAULT_WARNING_FRACTION_PERMILLE);
        let usage_permille = (metrics.disk_usage_fraction * 1000.0) as i64;

        let (severity, severity_tag) = if usage_permille >= critical_permille {
            (Severity::Critical, "critical")
        } else if usage_permille >= warning_permille {
            (Severity::Warning, "warning")
        } else {
            return Ok(Vec::new());
        };

        // Severity-qualified rather than hashed: a dismissed warning-level
        // finding must not collide with a later critical-level one.
        let id = format!("{RULE_ID}_{severity_tag}");
        let recommendation = Recommendation::new(
            id,
            "Disk space is running low",
            format!(
                "{:.0}% of disk used, {} free of {}",
                metrics.disk_usage_fraction * 100.0,
                crate::model::format_bytes(metrics.disk_free_bytes),
                crate::model::format_bytes(metrics.disk_total_bytes),
            ),
            severity,
            Risk::Low,
            Confidence::High,
            None,
            vec![
                Evidence::metric_percentage("Disk usage", metrics.disk_usage_fraction),
                Evidence::metric_bytes("Free space", metrics.disk_free_bytes),
                Evidence::metric_bytes("Total capacity", metrics.disk_total_bytes),
            ],
            vec![Action::rescan()],
            BTreeSet::from([RuleCapability::SystemMetrics]),
        );
        Ok(vec![recommendation])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SystemMetrics;

    fn context_with_usage(fraction: f64) -> RecommendationContext {
        RecommendationContext::empty(chrono::Utc::now()).with_system_metrics(SystemMetrics {
            cpu_usage_fraction: 0.1,
            memory_usage_fraction: 0.5,
            memory_total_bytes: 16_000_000_000,
            memory_used_bytes: 8_000_000_000,
            disk_usage_fraction: fraction,
            disk_total_bytes: 500_000_000_000,
            disk_free_bytes: ((1.0 - fraction) * 500_000_000_000.0) as u64,
        })
    }

    #[test]
    fn below_warning_produces_nothing() {
        let recs = LowDiskSpaceRule
            .evaluate(&context_with_usage(0.5), &RuleSettings::new())
            .unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn at_warning_threshold_is_warning_severity() {
        let recs = LowDiskSpaceRule
            .evaluate(&context_with_usage(0.85), &RuleSettings::new())
            .unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].severity, Severity::Warning);
    }

    #[test]
    fn at_critical_threshold_is_critical_severity() {
        let recs = LowDiskSpaceRule
            .evaluate(&context_with_usage(0.95), &RuleSettings::new())
            .unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].severity, Severity::Critical);
    }

    #[test]
    fn missing_metrics_produces_nothing() {
        let context = RecommendationContext::empty(chrono::Utc::now());
        let recs = LowDiskSpaceRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn critical_disk_usage_carries_a_non_confirming_rescan_action() {
        let recs = LowDiskSpaceRule
            .evaluate(&context_with_usage(0.92), &RuleSettings::new())
            .unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].actions.len(), 1);
        let action = &recs[0].actions[0];
        assert_eq!(action.action_type, crate::model::ActionType::Rescan);
        assert!(!action.requires_confirmation);
    }

    #[test]
    fn low_disk_scenario_matches_the_documented_end_to_end_example() {
        let context = RecommendationContext::empty(chrono::Utc::now()).with_system_metrics(SystemMetrics {
            cpu_usage_fraction: 0.1,
            memory_usage_fraction: 0.5,
            memory_total_bytes: 16_000_000_000,
            memory_used_bytes: 8_000_000_000,
            disk_usage_fraction: 0.92,
            disk_total_bytes: 62_500_000_000,
            disk_free_bytes: 5_000_000_000,
        });

        let recs = LowDiskSpaceRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert_eq!(recs.len(), 1);
        let rec = &recs[0];
        assert_eq!(rec.id, "low_disk_space_critical");
        assert_eq!(rec.severity, Severity::Critical);
        assert!(rec
            .evidence
            .iter()
            .any(|e| e.label == "Disk usage" && e.value.to_string() == "92%"));
        assert!(rec
            .evidence
            .iter()
            .any(|e| e.label == "Free space" && e.value.to_string() == "5.0 GB"));
    }

    #[test]
    fn warning_and_critical_ids_never_collide() {
        let warning = LowDiskSpaceRule
            .evaluate(&context_with_usage(0.85), &RuleSettings::new())
            .unwrap();
        let critical = LowDiskSpaceRule
            .evaluate(&context_with_usage(0.95), &RuleSettings::new())
            .unwrap();
        assert_ne!(warning[0].id, critical[0].id);
        assert_eq!(warning[0].id, "low_disk_space_warning");
        assert_eq!(critical[0].id, "low_disk_space_critical");
    }
}
