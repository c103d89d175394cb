//! The shared data contracts every subsystem in this crate exchanges:
//! Recommendation/Evidence/Action on the rule-engine side, IOEvent/
//! IOTimeSlice/IOPathStats/IOOptimization on the tracer side, and
//! ExecutionResult/AuditEntry on the executor side.

pub mod action;
pub mod audit;
pub mod capability;
pub mod context;
pub mod evidence;
pub mod execution;
pub mod io_event;
pub mod io_stats;
pub mod optimization;
pub mod recommendation;

pub use action::{Action, ActionPayload, ActionType};
pub use audit::AuditEntry;
pub use capability::RuleCapability;
pub use context::{
    CleanupCandidate, CleanupCategory, DownloadedFile, InstalledApp, RecommendationContext,
    SystemMetrics,
};
pub use evidence::{format_bytes, Evidence, EvidenceKind, EvidenceValue};
pub use execution::{ExecutionMode, ExecutionResult, ItemError, ItemResult, ItemStatus};
pub use io_event::{sanitize_path, IOEvent, IOOperation};
pub use io_stats::{IOPathStats, IOTimeSlice};
pub use optimization::{sort_optimizations, HotspotKind, IOOptimization, OptimizationSeverity};
pub use recommendation::{
    sort_recommendations, stable_recommendation_id, Confidence, Recommendation, Risk, Severity,
};
