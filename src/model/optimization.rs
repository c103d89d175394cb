use serde::{Deserialize, Serialize};

/// Severity bucket for a detected hotspot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationSeverity {
    Low,
    Medium,
    High,
}

impl OptimizationSeverity {
    fn priority(self) -> u8 {
        match self {
            OptimizationSeverity::High => 0,
            OptimizationSeverity::Medium => 1,
            OptimizationSeverity::Low => 2,
        }
    }
}

/// A hotspot type, each carrying the witness data that justified it. Kept
/// as a tagged union (rather than a flat struct with optional fields) so a
/// formatter can exhaustively match each hotspot's specific evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum HotspotKind {
    FrequentSmallReads {
        path: String,
        operation_count: u64,
        avg_read_bytes: u64,
    },
    HighLatency {
        path: String,
        avg_latency_nanos: u64,
    },
    HeavyWrite {
        path: String,
        bytes_per_sec: f64,
    },
    FragmentedAccess {
        path: String,
        ops_per_sec: f64,
    },
}

impl HotspotKind {
    /// A numeric impact estimate used to order hotspots within the same
    /// severity bucket: sorted by severity, then by estimated
    /// numeric impact descending.
    fn impact(&self) -> f64 {
        match self {
            HotspotKind::FrequentSmallReads {
                operation_count, ..
            } => *operation_count as f64,
            HotspotKind::HighLatency {
                avg_latency_nanos, ..
            } => *avg_latency_nanos as f64,
            HotspotKind::HeavyWrite { bytes_per_sec, .. } => *bytes_per_sec,
            HotspotKind::FragmentedAccess { ops_per_sec, .. } => *ops_per_sec,
        }
    }
}

/// An optimization suggestion derived from one analysis pass over
/// I/O statistics. Pure data: the Hotspot Detector is a pure function
/// producing a `Vec<IOOptimization>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IOOptimization {
    pub hotspot: HotspotKind,
    pub severity: OptimizationSeverity,
    pub suggestion: String,
    pub estimated_improvement: String,
}

/// Sort hotspots by severity (high first), then by estimated numeric
/// impact descending.
pub fn sort_optimizations(optimizations: &mut [IOOptimization]) {
    optimizations.sort_by(|a, b| {
        a.severity
            .priority()
            .cmp(&b.severity.priority())
            .then_with(|| {
                b.hotspot
                    .impact()
                    .partial_cmp(&a.hotspot.impact())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
    });
}
