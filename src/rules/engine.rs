//! Rule Engine: registers rules, runs them in parallel under
//! the Scheduler, and aggregates their output into one sorted,
//! failure-isolated batch.

use std::collections::BTreeSet;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use crate::model::{sort_recommendations, Recommendation, RecommendationContext, RuleCapability};
use crate::scheduler::{Priority, Scheduler};
use crate::settings::RuleSettings;

use super::Rule;

/// A single rule's failure, surfaced alongside (not in place of) the
/// recommendations that did evaluate successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleFailure {
    pub rule_id: String,
    pub message: String,
}

/// Owns the registry of rules. Registration is idempotent by rule id:
/// a later `register` with the same id replaces the earlier one rather
/// than producing a duplicate entry.
pub struct RuleEngine {
    rules: DashMap<String, Arc<dyn Rule>>,
    scheduler: Arc<Scheduler>,
}

impl RuleEngine {
    pub fn new(scheduler: Arc<Scheduler>) -> Self {
        Self {
            rules: DashMap::new(),
            scheduler,
        }
    }

    pub fn register(&self, rule: Arc<dyn Rule>) {
        self.rules.insert(rule.id().to_string(), rule);
    }

    pub fn unregister(&self, id: &str) {
        self.rules.remove(id);
    }

    pub fn registered_ids(&self) -> Vec<String> {
        self.rules.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Run every enabled, capability-satisfied rule against `context` under
    /// the scheduler, isolating per-rule failures, and return the sorted
    /// recommendations plus any failures.
    pub async fn evaluate(
        &self,
        context: &RecommendationContext,
        settings: &RuleSettings,
    ) -> (Vec<Recommendation>, Vec<RuleFailure>) {
        let satisfied = satisfied_capabilities(context);
        let candidates: Vec<Arc<dyn Rule>> = self
            .rules
            .iter()
            .map(|entry| entry.value().clone())
            .filter(|rule| settings.is_enabled(rule.id()))
            .filter(|rule| rule.capabilities().is_subset(&satisfied))
            .collect();

        info!(candidate_count = candidates.len(), "evaluating rules");

        let context = context.clone();
        let settings = settings.clone();
        let outcomes = self
            .scheduler
            .map_concurrently(candidates, Priority::Normal, move |rule| {
                let context = context.clone();
                let settings = settings.clone();
                async move { run_rule(rule, context, settings).await }
            })
            .await;

        let mut recommendations = Vec::new();
        let mut failures = Vec::new();
        for outcome in outcomes {
            match outcome {
                Ok(RuleOutcome { rule_id, result: Ok(recs) }) => {
                    debug!(rule = %rule_id, produced = recs.len(), "rule evaluated");
                    recommendations.extend(recs);
                }
                Ok(RuleOutcome { rule_id, result: Err(message) }) => {
                    warn!(rule = %rule_id, error = %message, "rule failed, omitted from results");
                    failures.push(RuleFailure { rule_id, message });
                }
                Err(scheduler_err) => {
                    warn!(error = %scheduler_err, "rule could not be scheduled");
                    failures.push(RuleFailure {
                        rule_id: "<unscheduled>".to_string(),
                        message: scheduler_err.to_string(),
                    });
                }
            }
        }

        sort_recommendations(&mut recommendations);
        (recommendations, failures)
    }
}

struct RuleOutcome {
    rule_id: String,
    result: std::result::Result<Vec<Recommendation>, String>,
}

/// Run one rule off the async task (a rule is a pure, potentially CPU-bound
/// function) and translate a panic into a `RuleOutcome` error rather than
/// letting it take down the batch — panics are the one failure mode
/// `Rule::evaluate`'s `Result` signature can't express on its own.
async fn run_rule(rule: Arc<dyn Rule>, context: RecommendationContext, settings: RuleSettings) -> RuleOutcome {
    let rule_id = rule.id().to_string();
    let join = tokio::task::spawn_blocking(move || {
        std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| rule.evaluate(&context, &settings)))
    })
    .await;

    let result = match join {
        Ok(Ok(Ok(recommendations))) => Ok(recommendations),
        Ok(Ok(Err(err))) => Err(err.to_string()),
        Ok(Err(panic)) => Err(panic_message(panic)),
        Err(join_err) => Err(join_err.to_string()),
    };
    RuleOutcome { rule_id, result }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "rule panicked".to_string()
    }
}

fn satisfied_capabilities(context: &RecommendationContext) -> BTreeSet<RuleCapability> {
    let mut satisfied = BTreeSet::new();
    if context.system_metrics.is_some() {
        satisfied.insert(RuleCapability::SystemMetrics);
    }
    if context.cleanup_candidates.is_some() {
        satisfied.insert(RuleCapability::CleanupItems);
    }
    if context.downloads.is_some() {
        satisfied.insert(RuleCapability::DownloadsAccess);
    }
    if context.installed_apps.is_some() {
        satisfied.insert(RuleCapability::InstalledApps);
    }
    satisfied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Confidence, Evidence, Risk, Severity};
    use crate::rules::RuleCategory;
    use crate::scheduler::SchedulerConfig;
    use std::collections::BTreeSet;

    struct AlwaysFiresRule;
    impl Rule for AlwaysFiresRule {
        fn id(&self) -> &str {
            "always_fires"
        }
        fn category(&self) -> RuleCategory {
            RuleCategory::Storage
        }
        fn capabilities(&self) -> BTreeSet<RuleCapability> {
            BTreeSet::new()
        }
        fn evaluate(
            &self,
            _context: &RecommendationContext,
            _settings: &RuleSettings,
        ) -> crate::error::Result<Vec<Recommendation>> {
            Ok(vec![Recommendation::new(
                "always_fires_x",
                "t",
                "s",
                Severity::Info,
                Risk::Low,
                Confidence::High,
                None,
                vec![Evidence::metadata("k", "v")],
                vec![],
                BTreeSet::new(),
            )])
        }
    }

    struct PanickingRule;
    impl Rule for PanickingRule {
        fn id(&self) -> &str {
            "panics"
        }
        fn category(&self) -> RuleCategory {
            RuleCategory::Storage
        }
        fn capabilities(&self) -> BTreeSet<RuleCapability> {
            BTreeSet::new()
        }
        fn evaluate(
            &self,
            _context: &RecommendationContext,
            _settings: &RuleSettings,
        ) -> crate::error::Result<Vec<Recommendation>> {
            panic!("boom");
        }
    }

    struct NeedsMetricsRule;
    impl Rule for NeedsMetricsRule {
        fn id(&self) -> &str {
            "needs_metrics"
        }
        fn category(&self) -> RuleCategory {
            RuleCategory::Storage
        }
        fn capabilities(&self) -> BTreeSet<RuleCapability> {
            [RuleCapability::SystemMetrics].into_iter().collect()
        }
        fn evaluate(
            &self,
            _context: &RecommendationContext,
            _settings: &RuleSettings,
        ) -> crate::error::Result<Vec<Recommendation>> {
            Ok(vec![Recommendation::new(
                "needs_metrics_x",
                "t",
                "s",
                Severity::Info,
                Risk::Low,
                Confidence::High,
                None,
                vec![Evidence::metadata("k", "v")],
                vec![],
                BTreeSet::new(),
            )])
        }
    }

    fn engine() -> RuleEngine {
        RuleEngine::new(Arc::new(Scheduler::new(SchedulerConfig::default())))
    }

    #[tokio::test]
    async fn a_failing_rule_does_not_block_others() {
        let engine = engine();
        engine.register(Arc::new(AlwaysFiresRule));
        engine.register(Arc::new(PanickingRule));

        let context = RecommendationContext::empty(chrono::Utc::now());
        let settings = RuleSettings::new();
        let (recommendations, failures) = engine.evaluate(&context, &settings).await;

        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].id, "always_fires_x");
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].rule_id, "panics");
    }

    #[tokio::test]
    async fn rule_with_unsatisfied_capability_does_not_run() {
        let engine = engine();
        engine.register(Arc::new(NeedsMetricsRule));

        let context = RecommendationContext::empty(chrono::Utc::now());
        let settings = RuleSettings::new();
        let (recommendations, failures) = engine.evaluate(&context, &settings).await;

        assert!(recommendations.is_empty());
        assert!(failures.is_empty());
    }

    #[tokio::test]
    async fn disabled_rule_does_not_run() {
        let engine = engine();
        engine.register(Arc::new(AlwaysFiresRule));

        let context = RecommendationContext::empty(chrono::Utc::now());
        let mut settings = RuleSettings::new();
        settings.set_enabled("always_fires", false);
        let (recommendations, _) = engine.evaluate(&context, &settings).await;
        assert!(recommendations.is_empty());
    }

    #[tokio::test]
    async fn unregister_removes_a_rule() {
        let engine = engine();
        engine.register(Arc::new(AlwaysFiresRule));
        engine.unregister("always_fires");

        let context = RecommendationContext::empty(chrono::Utc::now());
        let settings = RuleSettings::new();
        let (recommendations, _) = engine.evaluate(&context, &settings).await;
        assert!(recommendations.is_empty());
    }
}
