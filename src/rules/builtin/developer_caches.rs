//! `developer_caches`: sums known developer-tool cache
//! directories (Xcode DerivedData, CocoaPods, Homebrew, etc.). Severity
//! bumps to warning when a recognized heavy developer tool contributes.

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

const RULE_ID: &str = "developer_caches";
const DEFAULT_TOTAL_MIN_BYTES: i64 = 500 * 1024 * 1024;
const DEFAULT_PER_PATH_MIN_BYTES: i64 = 50 * 1024 * 1024;
const WITNESS_LIMIT: usize = 10;

const WARNING_MARKERS: &[&str] = &["DerivedData", "Xcode", "CocoaPods", "Homebrew", "Cellar"];

fn is_warning_worthy(path: &Path) -> bool {
    let text = path.to_string_lossy();
    WARNING_MARKERS.iter().any(|marker| text.contains(marker))
}

pub struct DeveloperCachesRule;

impl Rule for DeveloperCachesRule {
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

        let total_min = settings.threshold(RULE_ID, "total_min_bytes", DEFAULT_TOTAL_MIN_BYTES).max(0) as u64;
        let per_path_min = settings
            .threshold(RULE_ID, "per_path_min_bytes", DEFAULT_PER_PATH_MIN_BYTES)
            .max(0) as u64;

        let qualifying: Vec<_> = candidates
            .iter()
            .filter(|c| c.category == CleanupCategory::DeveloperCache && c.size_bytes >= per_path_min)
            .collect();

        let total_bytes: u64 = qualifying.iter().map(|c| c.size_bytes).sum();
        if total_bytes < total_min {
            return Ok(Vec::new());
        }

        let severity = if qualifying.iter().any(|c| is_warning_worthy(&c.path)) {
            Severity::Warning
        } else {
            Severity::Info
        };

        let paths: Vec<_> = qualifying.iter().map(|c| c.path.clone()).collect();
        let witnesses = top_n_by_size(
            qualifying.iter().map(|c| (c.path.clone(), c.size_bytes)).collect(),
            WITNESS_LIMIT,
        );

        let mut evidence = vec![
            Evidence::aggregate_count("Developer cache directories", qualifying.len() as u64),
            Evidence::metric_bytes("Total size", total_bytes),
        ];
        evidence.extend(witness_evidence("Developer cache", &witnesses));

        let id = stable_recommendation_id(RULE_ID, "developer_cache_bundle");
        let recommendation = Recommendation::new(
            id,
            "Developer caches have grown large",
            format!(
                "{} developer cache directories totaling {}",
                qualifying.len(),
                crate::model::format_bytes(total_bytes)
            ),
            severity,
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
