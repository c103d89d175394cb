use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::action::Action;
use super::capability::RuleCapability;
use super::evidence::Evidence;

/// How urgently a recommendation should be surfaced. Ordered so that
/// `Critical < Warning < Info` in priority (critical sorts first); see
/// [`Severity::priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

impl Severity {
    /// Lower values sort first: critical (0) before warning (1) before
    /// info (2). Kept as an explicit function rather than deriving `Ord`
    /// on declaration order so the sort contract is named and
    /// testable on its own.
    pub fn priority(self) -> u8 {
        match self {
            Severity::Critical => 0,
            Severity::Warning => 1,
            Severity::Info => 2,
        }
    }
}

/// How risky acting on a recommendation is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Risk {
    Low,
    Medium,
    High,
}

/// How confident the producing rule is in this finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// A structured suggestion the user can accept or dismiss, composed of
/// evidence and optional actions. Immutable once produced by a rule;
/// discarded when the user resolves it or the context is rebuilt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub severity: Severity,
    pub risk: Risk,
    pub confidence: Confidence,
    pub estimated_reclaim_bytes: Option<u64>,
    pub evidence: Vec<Evidence>,
    pub actions: Vec<Action>,
    pub capabilities: BTreeSet<RuleCapability>,
}

impl Recommendation {
    /// Construct a recommendation, enforcing the invariant that evidence
    /// is always non-empty (actions may legitimately be empty: a pure
    /// insight with nothing to authorize).
    ///
    /// # Panics
    /// Panics if `evidence` is empty — rules are expected to always
    /// populate evidence; an empty list is a rule bug, not
    /// a runtime condition to recover from.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        summary: impl Into<String>,
        severity: Severity,
        risk: Risk,
        confidence: Confidence,
        estimated_reclaim_bytes: Option<u64>,
        evidence: Vec<Evidence>,
        actions: Vec<Action>,
        capabilities: BTreeSet<RuleCapability>,
    ) -> Self {
        assert!(
            !evidence.is_empty(),
            "recommendation evidence must be non-empty"
        );
        Self {
            id: id.into(),
            title: title.into(),
            summary: summary.into(),
            severity,
            risk,
            confidence,
            estimated_reclaim_bytes,
            evidence,
            actions,
            capabilities,
        }
    }

    /// The total-order sort key: `(severity priority,
    /// -estimated_reclaim_bytes, id)`. Exposed as a key rather than an
    /// `Ord` impl so the engine's sort is explicit about what it orders by.
    fn sort_key(&self) -> (u8, std::cmp::Reverse<u64>, &str) {
        (
            self.severity.priority(),
            std::cmp::Reverse(self.estimated_reclaim_bytes.unwrap_or(0)),
            self.id.as_str(),
        )
    }

    /// Total-order comparator over the sort key.
    pub fn compare(a: &Recommendation, b: &Recommendation) -> Ordering {
        a.sort_key().cmp(&b.sort_key())
    }
}

/// Sort a batch of recommendations in place by the total order above.
pub fn sort_recommendations(recommendations: &mut [Recommendation]) {
    recommendations.sort_by(Recommendation::compare);
}

/// Derive a stable recommendation id from a rule id and a logical finding
/// key, so ids are stable across re-evaluations of identical contexts.
/// Uses a short SHA-256 digest rather than a random id generator.
pub fn stable_recommendation_id(rule_id: &str, finding_key: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(rule_id.as_bytes());
    hasher.update(b"\0");
    hasher.update(finding_key.as_bytes());
    let digest = hasher.finalize();
    format!("{rule_id}_{:x}", digest)[..rule_id.len() + 1 + 12].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::evidence::Evidence;

    fn make(id: &str, severity: Severity, reclaim: Option<u64>) -> Recommendation {
        Recommendation::new(
            id,
            "title",
            "summary",
            severity,
            Risk::Low,
            Confidence::High,
            reclaim,
            vec![Evidence::metadata("x", "y")],
            vec![],
            BTreeSet::new(),
        )
    }

    #[test]
    fn critical_sorts_before_warning_before_info() {
        let mut recs = vec![
            make("b_info", Severity::Info, None),
            make("a_critical", Severity::Critical, None),
            make("c_warning", Severity::Warning, None),
        ];
        sort_recommendations(&mut recs);
        assert_eq!(
            recs.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["a_critical", "c_warning", "b_info"]
        );
    }

    #[test]
    fn equal_severity_sorts_by_reclaim_bytes_descending() {
        let mut recs = vec![
            make("small", Severity::Info, Some(100)),
            make("large", Severity::Info, Some(10_000)),
            make("unset", Severity::Info, None),
        ];
        sort_recommendations(&mut recs);
        assert_eq!(
            recs.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
            vec!["large", "small", "unset"]
        );
    }

    #[test]
    fn ties_break_by_id_ascending() {
        let mut recs = vec![
            make("zeta", Severity::Warning, Some(50)),
            make("alpha", Severity::Warning, Some(50)),
        ];
        sort_recommendations(&mut recs);
        assert_eq!(recs[0].id, "alpha");
        assert_eq!(recs[1].id, "zeta");
    }

    #[test]
    fn stable_id_is_deterministic() {
        let a = stable_recommendation_id("old_downloads", "a.dmg");
        let b = stable_recommendation_id("old_downloads", "a.dmg");
        assert_eq!(a, b);
        let c = stable_recommendation_id("old_downloads", "b.txt");
        assert_ne!(a, c);
    }

    #[test]
    #[should_panic(expected = "evidence must be non-empty")]
    fn evidence_must_be_non_empty() {
        Recommendation::new(
            "x",
            "t",
            "s",
            Severity::Info,
            Risk::Low,
            Confidence::Low,
            None,
            vec![],
            vec![],
            BTreeSet::new(),
        );
    }
}
