//! Context Builder subsystem: gathers the signals a
//! [`crate::model::RecommendationContext`] is built from, with an optional
//! TTL cache in front of the scan.

pub mod builder;
pub mod cache;

pub use builder::{ContextBuilder, InstalledAppsSource, SystemMetricsSource};
pub use cache::ContextCache;
