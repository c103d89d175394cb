use serde::{Deserialize, Serialize};

/// A bounded-interval aggregate of I/O events, produced by the Aggregator
/// once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IOTimeSlice {
    pub start_nanos: u64,
    pub duration_nanos: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub read_ops: u64,
    pub write_ops: u64,
    pub avg_latency_nanos: u64,
    pub p99_latency_nanos: u64,
}

/// Rolling statistics for one sanitized path, updated monotonically while
/// tracing is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IOPathStats {
    pub sanitized_path: String,
    pub total_bytes: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
    pub operation_count: u64,
    pub avg_latency_nanos: u64,
}

impl IOPathStats {
    pub fn new(sanitized_path: String) -> Self {
        Self {
            sanitized_path,
            total_bytes: 0,
            read_bytes: 0,
            write_bytes: 0,
            operation_count: 0,
            avg_latency_nanos: 0,
        }
    }
}
