//! `unused_apps`: apps unused for a long stretch, aggregated
//! into one high-confidence finding, plus a separate low-confidence
//! "usage unknown" finding for apps with no recorded last-used timestamp
//! at all.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::model::{
    stable_recommendation_id, Action, Confidence, Evidence, Recommendation, RecommendationContext,
    Risk, RuleCapability, Severity,
};
use crate::rules::{Rule, RuleCategory};
use crate::settings::RuleSettings;

use super::support::{top_n_by_size, witness_evidence};

const RULE_ID: &str = "unused_apps";
const DEFAULT_UNUSED_DAYS: i64 = 90;
const DEFAULT_PER_APP_MIN_BYTES: i64 = 50 * 1024 * 1024;
const DEFAULT_TOTAL_MIN_BYTES: i64 = 500 * 1024 * 1024;
const WITNESS_LIMIT: usize = 10;

pub struct UnusedAppsRule;

impl Rule for UnusedAppsRule {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Storage
    }

    fn capabilities(&self) -> BTreeSet<RuleCapability> {
        [RuleCapability::InstalledApps].into_iter().collect()
    }

    fn evaluate(&self, context: &RecommendationContext, settings: &RuleSettings) -> Result<Vec<Recommendation>> {
        let Some(apps) = context.installed_apps.as_ref() else {
            return Ok(Vec::new());
        };

        let unused_days = settings.threshold(RULE_ID, "unused_days", DEFAULT_UNUSED_DAYS).max(0);
        let per_app_min = settings
            .threshold(RULE_ID, "per_app_min_bytes", DEFAULT_PER_APP_MIN_BYTES)
            .max(0) as u64;
        let total_min = settings
            .threshold(RULE_ID, "total_min_bytes", DEFAULT_TOTAL_MIN_BYTES)
            .max(0) as u64;

        let now = context.timestamp;
        let mut recommendations = Vec::new();

        let confirmed_unused: Vec<_> = apps
            .iter()
            .filter(|app| app.size_bytes >= per_app_min)
            .filter(|app| {
                app.last_used_at
                    .map(|last_used| (now - last_used).num_days() >= unused_days)
                    .unwrap_or(false)
            })
            .collect();

        let confirmed_total: u64 = confirmed_unused.iter().map(|a| a.size_bytes).sum();
        if confirmed_total >= total_min {
            let witnesses = top_n_by_size(
                confirmed_unused.iter().map(|a| (a.path.clone(), a.size_bytes)).collect(),
                WITNESS_LIMIT,
            );
            let mut evidence = vec![
                Evidence::aggregate_count("Unused apps", confirmed_unused.len() as u64),
                Evidence::metric_bytes("Total size", confirmed_total),
            ];
            evidence.extend(witness_evidence("Unused app", &witnesses));

            recommendations.push(Recommendation::new(
                stable_recommendation_id(RULE_ID, "confirmed"),
                "Apps you haven't opened in a while",
                format!(
                    "{} apps unused for {unused_days}+ days, totaling {}",
                    confirmed_unused.len(),
                    crate::model::format_bytes(confirmed_total)
                ),
                Severity::Info,
                Risk::Medium,
                Confidence::High,
                Some(confirmed_total),
                evidence,
                vec![Action::uninstall_plan("bulk_unused_apps")],
                BTreeSet::from([RuleCapability::InstalledApps]),
            ));
        }

        let usage_unknown: Vec<_> = apps
            .iter()
            .filter(|app| app.last_used_at.is_none() && app.size_bytes >= per_app_min)
            .collect();

        if !usage_unknown.is_empty() {
            let witnesses = top_n_by_size(
                usage_unknown.iter().map(|a| (a.path.clone(), a.size_bytes)).collect(),
                WITNESS_LIMIT,
            );
            let total_unknown: u64 = usage_unknown.iter().map(|a| a.size_bytes).sum();
            let mut evidence = vec![Evidence::aggregate_count("Apps with unknown usage", usage_unknown.len() as u64)];
            evidence.extend(witness_evidence("Usage unknown", &witnesses));

            recommendations.push(Recommendation::new(
                stable_recommendation_id(RULE_ID, "unknown"),
                "Some apps have no recorded usage history",
                format!("{} apps report no last-used timestamp", usage_unknown.len()),
                Severity::Info,
                Risk::Medium,
                Confidence::Low,
                Some(total_unknown),
                evidence,
                vec![],
                BTreeSet::from([RuleCapability::InstalledApps]),
            ));
        }

        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::InstalledApp;
    use chrono::{Duration, Utc};
    use std::path::PathBuf;

    fn app(id: &str, size_bytes: u64, last_used_days_ago: Option<i64>) -> InstalledApp {
        InstalledApp {
            id: id.to_string(),
            path: PathBuf::from(format!("/Applications/{id}.app")),
            size_bytes,
            last_used_at: last_used_days_ago.map(|days| Utc::now() - Duration::days(days)),
        }
    }

    #[test]
    fn confirmed_unused_apps_aggregate_when_over_threshold() {
        let context = RecommendationContext::empty(Utc::now()).with_installed_apps(vec![
            app("big.one", 300 * 1024 * 1024, Some(120)),
            app("big.two", 300 * 1024 * 1024, Some(200)),
        ]);
        let recs = UnusedAppsRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].confidence, Confidence::High);
    }

    #[test]
    fn recently_used_app_is_excluded() {
        let context = RecommendationContext::empty(Utc::now())
            .with_installed_apps(vec![app("fresh", 900 * 1024 * 1024, Some(2))]);
        let recs = UnusedAppsRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn unknown_usage_apps_get_a_separate_low_confidence_finding() {
        let context =
            RecommendationContext::empty(Utc::now()).with_installed_apps(vec![app("mystery", 200 * 1024 * 1024, None)]);
        let recs = UnusedAppsRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].confidence, Confidence::Low);
    }

    #[test]
    fn small_apps_never_count_toward_either_finding() {
        let context = RecommendationContext::empty(Utc::now()).with_installed_apps(vec![app("tiny", 1024, Some(400))]);
        let recs = UnusedAppsRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert!(recs.is_empty());
    }
}
