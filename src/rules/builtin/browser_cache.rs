//! `browser_cache`: known browser cache directories exceeding
//! a default threshold. Aggregated across all browsers the scan found,
//! same shape as `developer_caches` but without a severity escalation.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::model::{
    stable_recommendation_id, Action, ActionType, CleanupCategory, Confidence, Evidence,
    Recommendation, RecommendationContext, Risk, RuleCapability, Severity,
};
use crate::rules::{Rule, RuleCategory};
use crate::settings::RuleSettings;

use super::support::{top_n_by_size, witness_evidence};

const RULE_ID: &str = "browser_cache";
const DEFAULT_TOTAL_MIN_BYTES: i64 = 250 * 1024 * 1024;
const WITNESS_LIMIT: usize = 10;

pub struct BrowserCacheRule;

impl Rule for BrowserCacheRule {
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

        let total_min = settings
            .threshold(RULE_ID, "total_min_bytes", DEFAULT_TOTAL_MIN_BYTES)
            .max(0) as u64;

        let qualifying: Vec<_> = candidates
            .iter()
            .filter(|c| c.category == CleanupCategory::BrowserCache)
            .collect();

        let total_bytes: u64 = qualifying.iter().map(|c| c.size_bytes).sum();
        if total_bytes < total_min {
            return Ok(Vec::new());
        }

        let paths: Vec<_> = qualifying.iter().map(|c| c.path.clone()).collect();
        let witnesses = top_n_by_size(
            qualifying.iter().map(|c| (c.path.clone(), c.size_bytes)).collect(),
            WITNESS_LIMIT,
        );

        let mut evidence = vec![
            Evidence::aggregate_count("Browser cache directories", qualifying.len() as u64),
            Evidence::metric_bytes("Total size", total_bytes),
        ];
        evidence.extend(witness_evidence("Browser cache", &witnesses));

        let id = stable_recommendation_id(RULE_ID, "browser_cache_bundle");
        let recommendation = Recommendation::new(
            id,
            "Browser caches have grown large",
            format!(
                "{} browser cache directories totaling {}",
                qualifying.len(),
                crate::model::format_bytes(total_bytes)
            ),
            Severity::Info,
            Risk::Medium,
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
    use chrono::Utc;
    use std::path::PathBuf;

    fn candidate(path: &str, size_bytes: u64) -> CleanupCandidate {
        CleanupCandidate {
            path: PathBuf::from(path),
            size_bytes,
            category: CleanupCategory::BrowserCache,
            modified_at: None,
        }
    }

    #[test]
    fn below_total_threshold_produces_nothing() {
        let context = RecommendationContext::empty(Utc::now())
            .with_cleanup_candidates(vec![candidate("/home/u/Library/Caches/Chrome", 1024)]);
        let recs = BrowserCacheRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert!(recs.is_empty());
    }

    #[test]
    fn aggregates_across_multiple_browsers() {
        let context = RecommendationContext::empty(Utc::now()).with_cleanup_candidates(vec![
            candidate("/home/u/Library/Caches/Chrome", 200 * 1024 * 1024),
            candidate("/home/u/Library/Caches/Firefox", 100 * 1024 * 1024),
        ]);
        let recs = BrowserCacheRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].estimated_reclaim_bytes, Some(300 * 1024 * 1024));
        assert_eq!(recs[0].risk, Risk::Medium);
    }

    #[test]
    fn other_categories_are_ignored() {
        let context = RecommendationContext::empty(Utc::now()).with_cleanup_candidates(vec![CleanupCandidate {
            path: PathBuf::from("/home/u/Library/Developer/DerivedData"),
            size_bytes: 900 * 1024 * 1024,
            category: CleanupCategory::DeveloperCache,
            modified_at: None,
        }]);
        let recs = BrowserCacheRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert!(recs.is_empty());
    }
}
