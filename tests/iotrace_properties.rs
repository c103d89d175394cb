//! Property-based tests for the ring buffer's capacity/sampling invariants
//! and the hotspot detector's determinism.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::time::Duration;

use swiftsweep_core::iotrace::{detect_hotspots, RingBuffer};
use swiftsweep_core::model::{IOEvent, IOOperation, IOPathStats};

fn event(n: u64, bytes: u64) -> IOEvent {
    IOEvent {
        timestamp_nanos: n,
        operation: IOOperation::Read,
        sanitized_path: format!(".../file{}", n % 7),
        bytes_transferred: bytes,
        duration_nanos: 1_000,
        pid: None,
    }
}

proptest! {
    /// A buffer of capacity `capacity` never holds more than `capacity`
    /// events, no matter how many are appended, at any sample rate.
    #[test]
    fn prop_buffer_never_exceeds_capacity(
        capacity in 1usize..64,
        append_count in 0usize..500,
        sample_rate in 0.0f64..=1.0,
    ) {
        let buffer = RingBuffer::new(capacity);
        buffer.set_sample_rate(sample_rate);
        for i in 0..append_count {
            buffer.append(event(i as u64, 128));
        }
        let stats = buffer.stats();
        prop_assert!(stats.count <= capacity);
        prop_assert_eq!(stats.total_appended, append_count as u64);
    }

    /// Every appended event is either retained or counted as dropped —
    /// the two always add up to the total appended, across any mix of
    /// sample rate and overflow.
    #[test]
    fn prop_retained_plus_dropped_accounts_for_everything(
        capacity in 1usize..32,
        append_count in 0usize..200,
        sample_rate in 0.0f64..=1.0,
    ) {
        let buffer = RingBuffer::new(capacity);
        buffer.set_sample_rate(sample_rate);
        for i in 0..append_count {
            buffer.append(event(i as u64, 64));
        }
        let stats = buffer.stats();
        prop_assert_eq!(stats.total_dropped + stats.count as u64, stats.total_appended);
    }

    /// A sample rate of exactly `0.0` admits nothing; the buffer stays
    /// empty regardless of how many events are offered.
    #[test]
    fn prop_zero_sample_rate_admits_nothing(append_count in 0usize..200) {
        let buffer = RingBuffer::new(128);
        buffer.set_sample_rate(0.0);
        for i in 0..append_count {
            buffer.append(event(i as u64, 64));
        }
        prop_assert_eq!(buffer.stats().count, 0);
    }

    /// The hotspot detector is a pure function: the same statistics over
    /// the same duration always produce the same optimizations, in the
    /// same order.
    #[test]
    fn prop_hotspot_detection_is_deterministic(
        operation_count in 0u64..1000,
        read_bytes in 0u64..10_000_000,
        avg_latency_nanos in 0u64..50_000_000,
    ) {
        let stats = vec![IOPathStats {
            sanitized_path: ".../hot-file".to_string(),
            total_bytes: read_bytes,
            read_bytes,
            write_bytes: 0,
            operation_count,
            avg_latency_nanos,
        }];
        let duration = Duration::from_secs(5);

        let first = detect_hotspots(&stats, &[], duration);
        let second = detect_hotspots(&stats, &[], duration);
        prop_assert_eq!(first, second);
    }

    /// A zero tracing duration never produces a divide-by-zero panic and
    /// never emits a rate-based hotspot (heavy write / fragmented access),
    /// since there is no time base to compute a rate over.
    #[test]
    fn prop_zero_duration_yields_no_rate_based_hotspots(write_bytes in 0u64..10_000_000) {
        let stats = vec![IOPathStats {
            sanitized_path: ".../file".to_string(),
            total_bytes: write_bytes,
            read_bytes: 0,
            write_bytes,
            operation_count: 10_000,
            avg_latency_nanos: 0,
        }];
        let optimizations = detect_hotspots(&stats, &[], Duration::ZERO);
        for optimization in &optimizations {
            prop_assert!(!matches!(
                optimization.hotspot,
                swiftsweep_core::model::HotspotKind::HeavyWrite { .. }
                    | swiftsweep_core::model::HotspotKind::FragmentedAccess { .. }
            ));
        }
    }
}

#[test]
fn drain_never_returns_more_than_requested() {
    let buffer = RingBuffer::new(16);
    for i in 0..10 {
        buffer.append(event(i, 32));
    }
    let drained = buffer.drain(3);
    assert_eq!(drained.len(), 3);
    assert_eq!(buffer.stats().count, 7);
}
