//! `large_caches`: flags any single application cache
//! directory over a size threshold. One recommendation per qualifying
//! directory, unlike the aggregate rules — its estimated reclaim is that
//! directory's own size, not a sum.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::model::{
    stable_recommendation_id, Action, ActionType, CleanupCategory, Confidence, Evidence,
    Recommendation, RecommendationContext, Risk, RuleCapability, Severity,
};
use crate::rules::{Rule, RuleCategory};
use crate::settings::RuleSettings;

const RULE_ID: &str = "large_caches";
const DEFAULT_THRESHOLD_BYTES: i64 = 200 * 1024 * 1024;

pub struct LargeCachesRule;

impl Rule for LargeCachesRule {
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

        let threshold = settings
            .threshold(RULE_ID, "threshold_bytes", DEFAULT_THRESHOLD_BYTES)
            .max(0) as u64;

        let mut recommendations: Vec<Recommendation> = candidates
            .iter()
            .filter(|c| c.category == CleanupCategory::ApplicationCache && c.size_bytes > threshold)
            .map(|candidate| {
                let id = stable_recommendation_id(RULE_ID, &candidate.path.to_string_lossy());
                Recommendation::new(
                    id,
                    "Large application cache directory",
                    format!(
                        "{} is {}",
                        candidate.path.display(),
                        crate::model::format_bytes(candidate.size_bytes)
                    ),
                    Severity::Info,
                    Risk::Low,
                    Confidence::High,
                    Some(candidate.size_bytes),
                    vec![
                        Evidence::path("Cache directory", candidate.path.clone()),
                        Evidence::metric_bytes("Size", candidate.size_bytes),
                    ],
                    vec![Action::cleanup(ActionType::CleanupTrash, vec![candidate.path.clone()])],
                    BTreeSet::from([RuleCapability::CleanupItems]),
                )
            })
            .collect();

        // Rules must produce their own deterministic order among their own
        // findings; the engine's total-order sort applies afterward.
        recommendations.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(recommendations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CleanupCandidate;
    use std::path::PathBuf;

    fn candidate(path: &str, size_bytes: u64, category: CleanupCategory) -> CleanupCandidate {
        CleanupCandidate {
            path: PathBuf::from(path),
            size_bytes,
            category,
            modified_at: None,
        }
    }

    #[test]
    fn one_recommendation_per_qualifying_directory() {
        let context = RecommendationContext::empty(chrono::Utc::now()).with_cleanup_candidates(vec![
            candidate("/home/u/Library/Caches/a", 300 * 1024 * 1024, CleanupCategory::ApplicationCache),
            candidate("/home/u/Library/Caches/b", 50 * 1024 * 1024, CleanupCategory::ApplicationCache),
            candidate("/home/u/Library/Caches/c", 250 * 1024 * 1024, CleanupCategory::ApplicationCache),
        ]);
        let recs = LargeCachesRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert_eq!(recs.len(), 2);
        for rec in &recs {
            assert!(rec.estimated_reclaim_bytes.unwrap() > 200 * 1024 * 1024);
        }
    }

    #[test]
    fn other_categories_never_qualify() {
        let context = RecommendationContext::empty(chrono::Utc::now()).with_cleanup_candidates(vec![candidate(
            "/home/u/Library/Developer/DerivedData",
            900 * 1024 * 1024,
            CleanupCategory::DeveloperCache,
        )]);
        let recs = LargeCachesRule.evaluate(&context, &RuleSettings::new()).unwrap();
        assert!(recs.is_empty());
    }
}
