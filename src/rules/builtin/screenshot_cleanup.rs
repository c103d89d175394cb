//! `screenshot_cleanup`: old screenshots and other short-lived
//! temp files sitting on the Desktop. The category filtering (which files
//! even count as screenshots) happens at scan time via
//! [`is_screenshot_name`], wired into the Context Builder's Desktop root;
//! this rule only applies the age and total-size thresholds.

use std::collections::BTreeSet;
use std::path::Path;

use crate::error::Result;
use crate::model::{
    stable_recommendation_id, Action, ActionType, CleanupCategory, Confidence, Evidence,
    Recommendation, RecommendationContext, Risk, RuleCapability, Severity,
};
use crate::rules::{Rule, RuleCategory};
use crate::settings::RuleSettings;

use super::support::{top_n_by_size, witness_evidence};

const RULE_ID: &str = "screenshot_cleanup";
const DEFAULT_AGE_DAYS: i64 = 14;
const DEFAULT_TOTAL_MIN_BYTES: i64 = 20 * 1024 * 1024;
const WITNESS_LIMIT: usize = 10;

const TEMP_EXTENSIONS: &[&str] = &["tmp", "crdownload", "part", "download"];

/// Screenshot/temp file name test used as the Desktop scan root's filter.
/// macOS names screenshots `Screen Shot <date> at <time>.png` (older
/// releases) or `Screenshot <date> at <time>.png` (current releases).
pub fn is_screenshot_name(path: &Path) -> bool {
    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
        return false;
    };
    if stem.starts_with("Screenshot") || stem.starts_with("Screen Shot") {
        return true;
    }
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TEMP_EXTENSIONS.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

pub struct ScreenshotCleanupRule;

impl Rule for ScreenshotCleanupRule {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Storage
    }

    fn capabilities(&self) -> BTreeSet<RuleCapability> {
        [RuleCapability::CleanupItems].into_iter().collect()
    }

    fn evaluate(&self, context: &RecommendationContext, settings: &RuleSettings) -> Result<Vec<Recommendation>> {
        let Some(candidates) = context.cleanup_candidates.as_ref() else {
            return Ok(Vec::new());
        };

        let age_days = settings.threshold(RULE_ID, "age_days", DEFAULT_AGE_DAYS).max(0);
        let total_min = settings
            .threshold(RULE_ID, "total_min_bytes", DEFAULT_TOTAL_MIN_BYTES)
            .max(0) as u64;
        let now = context.timestamp;

        let old: Vec<_> = candidates
            .iter()
            .filter(|c| c.category == CleanupCategory::Screenshot)
            .filter(|c| {
                c.modified_at
                    .map(|modified| (now - modified).num_days() >= age_days)
                    .unwrap_or(false)
            })
            .collect();

        let total_bytes: u64 = old.iter().map(|c| c.size_bytes).sum();
        if total_bytes < total_min {
            return Ok(Vec::new());
        }

        let paths: Vec<_> = old.iter().map(|c| c.path.clone()).collect();
        let witnesses = top_n_by_size(old.iter().map(|c| (c.path.clone(), c.size_bytes)).collect(), WITNESS_LIMIT);

        let mut evidence = vec![
            Evidence::aggregate_count("Old screenshots/temp files", old.len() as u64),
            Evidence::metric_bytes("Total size", total_bytes),
        ];
        evidence.extend(witness_evidence("Screenshot", &witnesses));

        let id = stable_recommendation_id(RULE_ID, &format!("{age_days}d"));
        let recommendation = Recommendation::new(
            id,
            "Old screenshots are piling up on the Desktop",
            format!(
                "{} screenshots/temp files untouched for {age_days}+ days, totaling {}",
                old.len(),
                crate::model::format_bytes(total_bytes)
            ),
            Severity::Info,
            Risk::Low,
            Confidence::High,
            Some(total_bytes),
            evidence,
            vec![Action::cleanup(ActionType::CleanupTrash, paths)],
            BTreeSet::from([RuleCapability::CleanupItems]),
        );
        Ok(vec![recommendation])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CleanupCandidate;
    use chrono::{Duration, Utc};
    use std::path::PathBuf;

    fn candidate(path: &str, size_bytes: u64, age_days: i64) -> CleanupCandidate {
        CleanupCandidate {
            path: PathBuf::from(path),
            size_bytes,
            category: CleanupCategory::Screenshot,
            modified_at: Some(Utc::now() - Duration::days(age_days)),
        }
    }

    #[test]
    fn recognizes_both_screenshot_naming_conventions() {
        assert!(is_screenshot_name(Path::new(
            "/home/u/Desktop/Screenshot 2026-01-02 at 10.00.00.png"
        )));
        assert!(is_screenshot_name(Path::new(
            "/home/u/Desktop/Screen Shot 2020-01-02 at 10.00.00 AM.png"
        )));
        assert!(is_screenshot_name(Path::new("/home/u/Desktop/install.crdownload")));
        assert!(!is_screenshot_name(Path::new("/home/u/Desktop/resume.pdf")));
    }

    #[test]
    fn below_total_threshold_produces_nothing() {
        let context = RecommendationContext::empty(Utc::now())
            .with_cleanup_candidates(vec![candidate("/home/u/Desktop/Screenshot 1.png", 1024, 30)]);
        let recs = ScreenshotCleanupRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn recent_screenshots_are_excluded() {
        let context = RecommendationContext::empty(Utc::now())
            .with_cleanup_candidates(vec![candidate("/home/u/Desktop/Screenshot 1.png", 30 * 1024 * 1024, 1)]);
        let recs = ScreenshotCleanupRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn old_screenshots_over_threshold_are_flagged() {
        let context = RecommendationContext::empty(Utc::now())
            .with_cleanup_candidates(vec![candidate("/home/u/Desktop/Screenshot 1.png", 30 * 1024 * 1024, 30)]);
        let recs = ScreenshotCleanupRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert_eq!(recs.len(), 1);
    }

    #[test]
    fn missing_modified_at_is_treated_as_age_unknown_not_old() {
        let candidate = CleanupCandidate {
            path: PathBuf::from("/home/u/Desktop/Screenshot weird.png"),
            size_bytes: 30 * 1024 * 1024,
            category: CleanupCategory::Screenshot,
            modified_at: None,
        };
        let context = RecommendationContext::empty(Utc::now()).with_cleanup_candidates(vec![candidate]);
        let recs = ScreenshotCleanupRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert!(recs.is_empty());
    }
}
