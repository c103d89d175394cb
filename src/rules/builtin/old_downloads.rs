//! `old_downloads`: files in `~/Downloads` that haven't been
//! touched in a while. "Touched" prefers the last-accessed timestamp when
//! the filesystem reports one, falling back to creation time.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::error::Result;
use crate::model::{
    stable_recommendation_id, Action, ActionType, Confidence, Evidence, Recommendation,
    RecommendationContext, Risk, RuleCapability, Severity,
};
use crate::rules::{Rule, RuleCategory};
use crate::settings::RuleSettings;

use super::support::{top_n_by_size, witness_evidence};

const RULE_ID: &str = "old_downloads";
const DEFAULT_AGE_DAYS: i64 = 30;
const WITNESS_LIMIT: usize = 10;

pub struct OldDownloadsRule;

impl Rule for OldDownloadsRule {
    fn id(&self) -> &str {
        RULE_ID
    }

    fn category(&self) -> RuleCategory {
        RuleCategory::Storage
    }

    fn capabilities(&self) -> BTreeSet<RuleCapability> {
        [RuleCapability::DownloadsAccess].into_iter().collect()
    }

    fn evaluate(&self, context: &RecommendationContext, settings: &RuleSettings) -> Result<Vec<Recommendation>> {
        let Some(downloads) = context.downloads.as_ref() else {
            return Ok(Vec::new());
        };

        let age_days = settings.threshold(RULE_ID, "age_days", DEFAULT_AGE_DAYS).max(0);
        let now = context.timestamp;

        let old: Vec<_> = downloads
            .iter()
            .filter(|file| {
                let last_touched = file.last_accessed_at.unwrap_or(file.created_at).max(file.created_at);
                (now - last_touched).num_days() >= age_days
            })
            .collect();

        if old.is_empty() {
            return Ok(Vec::new());
        }

        let total_bytes: u64 = old.iter().map(|f| f.size_bytes).sum();
        let paths: Vec<_> = old.iter().map(|f| f.path.clone()).collect();
        let witnesses = top_n_by_size(old.iter().map(|f| (f.path.clone(), f.size_bytes)).collect(), WITNESS_LIMIT);

        let mut evidence = vec![
            Evidence::aggregate_count("Old files", old.len() as u64),
            Evidence::metric_bytes("Total reclaimable", total_bytes),
        ];
        evidence.extend(witness_evidence("Old download", &witnesses));

        let confidence = if old.iter().all(|f| f.last_accessed_at.is_some()) {
            Confidence::High
        } else {
            Confidence::Medium
        };

        let id = stable_recommendation_id(RULE_ID, &format!("{age_days}d"));
        let recommendation = Recommendation::new(
            id,
            "Old downloads are taking up space",
            format!(
                "{} files in Downloads untouched for {age_days}+ days, totaling {}",
                old.len(),
                crate::model::format_bytes(total_bytes)
            ),
            Severity::Info,
            Risk::Low,
            confidence,
            Some(total_bytes),
            evidence,
            vec![Action::cleanup(ActionType::CleanupTrash, paths)],
            BTreeSet::from([RuleCapability::DownloadsAccess]),
        );
        Ok(vec![recommendation])
    }
}
