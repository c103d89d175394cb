//! Rule Engine subsystem: the `Rule` plug-in contract,
//! the engine that runs registered rules under the scheduler, and the 9
//! built-in rules.

pub mod builtin;
pub mod engine;

use std::collections::BTreeSet;

use crate::error::Result;
use crate::model::{RecommendationContext, RuleCapability};
use crate::settings::RuleSettings;

pub use engine::{RuleEngine, RuleFailure};

/// Coarse grouping a rule declares itself under as part of the `Rule`
/// plug-in contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Storage,
    Privacy,
    Performance,
    Security,
}

/// A pure function from context to recommendations, plus the static
/// declarations the engine needs to decide whether to run it at all.
///
/// Implementations must be pure with respect to `context` and `settings`:
/// no hidden I/O, no mutation of shared state. Any filesystem or metric
/// reads a rule needs must already be present on `context` — that's the
/// entire point of the Context Builder existing as a separate stage.
pub trait Rule: Send + Sync {
    /// Stable identifier; used for settings lookup and recommendation id
    /// derivation.
    fn id(&self) -> &str;
    fn category(&self) -> RuleCategory;
    /// Context fields this rule needs. The engine only runs a rule whose
    /// capabilities are all satisfied by non-`None` fields of the current
    /// context.
    fn capabilities(&self) -> BTreeSet<RuleCapability>;
    fn evaluate(&self, context: &RecommendationContext, settings: &RuleSettings) -> Result<Vec<crate::model::Recommendation>>;
}
