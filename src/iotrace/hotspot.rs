//! Hotspot Detector: a pure function from I/O statistics to a
//! list of [`IOOptimization`]s. All thresholds are constants of this
//! detector, never of a rule.

use std::time::Duration;

use crate::model::{HotspotKind, IOOptimization, IOPathStats, IOTimeSlice, OptimizationSeverity};

const FREQUENT_SMALL_READS_MIN_OPS: u64 = 10;
const FREQUENT_SMALL_READS_MAX_AVG_BYTES: u64 = 4 * 1024;
const HIGH_LATENCY_THRESHOLD_NANOS: u64 = 10_000_000; // 10 ms
const HEAVY_WRITE_THRESHOLD_BYTES_PER_SEC: f64 = 10.0 * 1024.0 * 1024.0; // 10 MiB/s
const FRAGMENTED_ACCESS_THRESHOLD_OPS_PER_SEC: f64 = 100.0;

/// Pure function from accumulated statistics to a ranked list of
/// optimizations. `tracing_duration` must be the wall-clock span the
/// statistics were collected over; a zero duration yields no rate-based
/// hotspots (division by zero is avoided rather than propagated).
pub fn detect_hotspots(
    path_stats: &[IOPathStats],
    _slices: &[IOTimeSlice],
    tracing_duration: Duration,
) -> Vec<IOOptimization> {
    let seconds = tracing_duration.as_secs_f64();
    let mut optimizations = Vec::new();

    for stats in path_stats {
        if stats.operation_count > FREQUENT_SMALL_READS_MIN_OPS && stats.operation_count > 0 {
            let avg_read_bytes = stats.read_bytes / stats.operation_count;
            if avg_read_bytes < FREQUENT_SMALL_READS_MAX_AVG_BYTES {
                optimizations.push(IOOptimization {
                    hotspot: HotspotKind::FrequentSmallReads {
                        path: stats.sanitized_path.clone(),
                        operation_count: stats.operation_count,
                        avg_read_bytes,
                    },
                    severity: OptimizationSeverity::Medium,
                    suggestion: format!(
                        "Batch reads for {} into fewer, larger reads",
                        stats.sanitized_path
                    ),
                    estimated_improvement: format!(
                        "~{} fewer syscalls per pass",
                        stats.operation_count.saturating_sub(1)
                    ),
                });
            }
        }

        if stats.avg_latency_nanos > HIGH_LATENCY_THRESHOLD_NANOS {
            optimizations.push(IOOptimization {
                hotspot: HotspotKind::HighLatency {
                    path: stats.sanitized_path.clone(),
                    avg_latency_nanos: stats.avg_latency_nanos,
                },
                severity: OptimizationSeverity::High,
                suggestion: format!("Investigate slow I/O on {}", stats.sanitized_path),
                estimated_improvement: format!(
                    "avg latency {:.1} ms could be reduced",
                    stats.avg_latency_nanos as f64 / 1_000_000.0
                ),
            });
        }

        if seconds > 0.0 {
            let bytes_per_sec = stats.write_bytes as f64 / seconds;
            if bytes_per_sec > HEAVY_WRITE_THRESHOLD_BYTES_PER_SEC {
                optimizations.push(IOOptimization {
                    hotspot: HotspotKind::HeavyWrite {
                        path: stats.sanitized_path.clone(),
                        bytes_per_sec,
                    },
                    severity: OptimizationSeverity::Medium,
                    suggestion: format!("Throttle or buffer writes to {}", stats.sanitized_path),
                    estimated_improvement: format!("{:.1} MiB/s sustained", bytes_per_sec / (1024.0 * 1024.0)),
                });
            }

            let ops_per_sec = stats.operation_count as f64 / seconds;
            if ops_per_sec > FRAGMENTED_ACCESS_THRESHOLD_OPS_PER_SEC {
                optimizations.push(IOOptimization {
                    hotspot: HotspotKind::FragmentedAccess {
                        path: stats.sanitized_path.clone(),
                        ops_per_sec,
                    },
                    severity: OptimizationSeverity::Low,
                    suggestion: format!("Coalesce fragmented access to {}", stats.sanitized_path),
                    estimated_improvement: format!("{ops_per_sec:.0} ops/s observed"),
                });
            }
        }
    }

    crate::model::sort_optimizations(&mut optimizations);
    optimizations
}
