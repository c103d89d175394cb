//! `mail_attachments`: Mail.app's downloaded-attachment cache,
//! aged out the same way as `old_downloads` but over the cleanup-candidate
//! scan rather than the dedicated downloads listing.

use std::collections::BTreeSet;

use crate::error::Result;
use crate::model::{
    stable_recommendation_id, Action, ActionType, CleanupCategory, Confidence, Evidence,
    Recommendation, RecommendationContext, Risk, RuleCapability, Severity,
};
use crate::rules::{Rule, RuleCategory};
use crate::settings::RuleSettings;

use super::support::{top_n_by_size, witness_evidence};

const RULE_ID: &str = "mail_attachments";
const DEFAULT_AGE_DAYS: i64 = 60;
const DEFAULT_TOTAL_MIN_BYTES: i64 = 100 * 1024 * 1024;
const WITNESS_LIMIT: usize = 10;

pub struct MailAttachmentsRule;

impl Rule for MailAttachmentsRule {
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
            .filter(|c| c.category == CleanupCategory::MailAttachment)
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
            Evidence::aggregate_count("Old mail attachments", old.len() as u64),
            Evidence::metric_bytes("Total size", total_bytes),
        ];
        evidence.extend(witness_evidence("Mail attachment", &witnesses));

        let id = stable_recommendation_id(RULE_ID, &format!("{age_days}d"));
        let recommendation = Recommendation::new(
            id,
            "Mail attachments are taking up space",
            format!(
                "{} downloaded attachments untouched for {age_days}+ days, totaling {}",
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
