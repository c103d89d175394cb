use serde::{Deserialize, Serialize};

/// A named input a rule requires to be present in the context. Declared
/// statically by each rule; the engine only runs a rule whose capabilities
/// are all satisfied by non-`None` fields of the current context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCapability {
    SystemMetrics,
    CleanupItems,
    DownloadsAccess,
    InstalledApps,
    SpotlightQuery,
    HelperRequired,
}
