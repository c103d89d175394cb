//! `trash_reminder`: nudges the user to empty `~/.Trash` once
//! it accumulates. Escalates to warning severity past a second, larger
//! threshold. Risk is medium rather than low: emptying the Trash is
//! permanent, even though it is something the user asked for.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::model::{
    stable_recommendation_id, Action, CleanupCategory, Confidence, Evidence, Recommendation,
    RecommendationContext, Risk, RuleCapability, Severity,
};
use crate::rules::{Rule, RuleCategory};
use crate::settings::RuleSettings;

const RULE_ID: &str = "trash_reminder";
const DEFAULT_WARNING_MIN_BYTES: i64 = 1024 * 1024 * 1024;
const DEFAULT_CRITICAL_MIN_BYTES: i64 = 10 * 1024 * 1024 * 1024;

pub struct TrashReminderRule;

impl Rule for TrashReminderRule {
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

        let warning_min = settings
            .threshold(RULE_ID, "warning_min_bytes", DEFAULT_WARNING_MIN_BYTES)
            .max(0) as u64;
        let critical_min = settings
            .threshold(RULE_ID, "critical_min_bytes", DEFAULT_CRITICAL_MIN_BYTES)
            .max(0) as u64;

        let total_bytes: u64 = candidates
            .iter()
            .filter(|c| c.category == CleanupCategory::Trash)
            .map(|c| c.size_bytes)
            .sum();

        let severity = if total_bytes >= critical_min {
            Severity::Warning
        } else if total_bytes >= warning_min {
            Severity::Info
        } else {
            return Ok(Vec::new());
        };

        let id = stable_recommendation_id(RULE_ID, "trash_total");
        let recommendation = Recommendation::new(
            id,
            "Your Trash is taking up a lot of space",
            format!(
                "The Trash holds {}, and it stays on disk until you empty it",
                crate::model::format_bytes(total_bytes)
            ),
            severity,
            Risk::Medium,
            Confidence::High,
            Some(total_bytes),
            vec![Evidence::metric_bytes("Trash size", total_bytes)],
            vec![Action::empty_trash()],
            BTreeSet::from([RuleCapability::CleanupItems]),
        );
        Ok(vec![recommendation])
    }
}
