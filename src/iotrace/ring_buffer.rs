//! Ring Buffer: a bounded, lossy event queue with sampling.
//! Single-writer-at-a-time discipline: every operation locks the whole
//! inner state and releases it before returning — there is no iterator
//! that outlives a single call.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::model::IOEvent;

/// A multiplicative constant with good avalanche behavior for a simple
/// counter-based hash (the fractional part of the golden ratio, scaled to
/// u64), used to make sampling deterministic and reproducible across runs
/// without needing an RNG dependency.
const HASH_MULTIPLIER: u64 = 0x9E3779B97F4A7C15;

/// Point-in-time statistics for a [`RingBuffer`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RingBufferStats {
    pub capacity: usize,
    pub count: usize,
    pub total_appended: u64,
    pub total_dropped: u64,
    pub sample_rate: f64,
}

impl RingBufferStats {
    /// Fraction of appended events that were ultimately dropped (via
    /// sampling rejection or overflow eviction). `0.0` if nothing has been
    /// appended yet.
    pub fn drop_rate(&self) -> f64 {
        if self.total_appended == 0 {
            0.0
        } else {
            self.total_dropped as f64 / self.total_appended as f64
        }
    }
}

struct Inner {
    capacity: usize,
    events: VecDeque<IOEvent>,
    sample_rate: f64,
    sample_counter: u64,
    total_appended: u64,
    total_dropped: u64,
}

impl Inner {
    /// Deterministic admission decision for the sampling rule: hash the
    /// per-buffer counter, take it as a uniform value in `[0, 1)`, and
    /// admit iff that value is below the sample rate.
    fn sampled_in(&mut self) -> bool {
        self.sample_counter = self.sample_counter.wrapping_add(1);
        let hashed = self.sample_counter.wrapping_mul(HASH_MULTIPLIER);
        let uniform = (hashed >> 40) as f64 / (1u64 << 24) as f64;
        uniform < self.sample_rate
    }
}

/// Bounded event queue with fixed memory and lossy overflow.
pub struct RingBuffer {
    inner: Mutex<Inner>,
}

impl RingBuffer {
    /// Create a buffer with the given capacity and an initial sample rate
    /// of `1.0` (admit everything, subject only to overflow).
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                capacity: capacity.max(1),
                events: VecDeque::with_capacity(capacity.max(1)),
                sample_rate: 1.0,
                sample_counter: 0,
                total_appended: 0,
                total_dropped: 0,
            }),
        }
    }

    /// Admit an event, subject to sampling and overflow eviction.
    pub fn append(&self, event: IOEvent) {
        let mut inner = self.inner.lock();
        inner.total_appended += 1;

        if !inner.sampled_in() {
            inner.total_dropped += 1;
            return;
        }

        if inner.events.len() >= inner.capacity {
            inner.events.pop_front();
            inner.total_dropped += 1;
        }
        inner.events.push_back(event);
    }

    /// Remove and return up to `max` events in arrival order.
    pub fn drain(&self, max: usize) -> Vec<IOEvent> {
        let mut inner = self.inner.lock();
        let take = max.min(inner.events.len());
        inner.events.drain(..take).collect()
    }

    /// Non-destructive read of up to `max` events, oldest first.
    pub fn peek(&self, max: usize) -> Vec<IOEvent> {
        let inner = self.inner.lock();
        inner.events.iter().take(max).cloned().collect()
    }

    /// Clamp and set the sampling rate.
    pub fn set_sample_rate(&self, rate: f64) {
        let mut inner = self.inner.lock();
        inner.sample_rate = rate.clamp(0.0, 1.0);
    }

    pub fn stats(&self) -> RingBufferStats {
        let inner = self.inner.lock();
        RingBufferStats {
            capacity: inner.capacity,
            count: inner.events.len(),
            total_appended: inner.total_appended,
            total_dropped: inner.total_dropped,
            sample_rate: inner.sample_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::IOOperation;

    fn event(n: u64) -> IOEvent {
        IOEvent {
            timestamp_nanos: n,
            operation: IOOperation::Read,
            sanitized_path: format!("file{n}"),
            bytes_transferred: 1024,
            duration_nanos: 1000,
            pid: None,
        }
    }

    #[test]
    fn never_exceeds_capacity() {
        let buffer = RingBuffer::new(4);
        for i in 0..100 {
            buffer.append(event(i));
        }
        let stats = buffer.stats();
        assert!(stats.count <= 4);
        assert_eq!(stats.total_appended, 100);
        assert!(stats.total_dropped > 0);
    }

    #[test]
    fn drain_returns_arrival_order() {
        let buffer = RingBuffer::new(10);
        for i in 0..5 {
            buffer.append(event(i));
        }
        let drained = buffer.drain(10);
        let timestamps: Vec<_> = drained.iter().map(|e| e.timestamp_nanos).collect();
        assert_eq!(timestamps, vec![0, 1, 2, 3, 4]);
        assert_eq!(buffer.stats().count, 0);
    }

    #[test]
    fn peek_does_not_remove() {
        let buffer = RingBuffer::new(10);
        buffer.append(event(1));
        let peeked = buffer.peek(10);
        assert_eq!(peeked.len(), 1);
        assert_eq!(buffer.stats().count, 1);
    }

    #[test]
    fn sample_rate_one_only_drops_via_overflow() {
        let buffer = RingBuffer::new(1000);
        buffer.set_sample_rate(1.0);
        for i in 0..500 {
            buffer.append(event(i));
        }
        assert_eq!(buffer.stats().total_dropped, 0);
    }

    #[test]
    fn sample_rate_zero_drops_everything() {
        let buffer = RingBuffer::new(1000);
        buffer.set_sample_rate(0.0);
        for i in 0..50 {
            buffer.append(event(i));
        }
        let stats = buffer.stats();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total_dropped, 50);
    }

    #[test]
    fn sample_rate_clamps_to_unit_interval() {
        let buffer = RingBuffer::new(10);
        buffer.set_sample_rate(5.0);
        assert_eq!(buffer.stats().sample_rate, 1.0);
        buffer.set_sample_rate(-5.0);
        assert_eq!(buffer.stats().sample_rate, 0.0);
    }

    #[test]
    fn dropped_count_is_monotone_nondecreasing() {
        let buffer = RingBuffer::new(4);
        let mut last = 0;
        for i in 0..50 {
            buffer.append(event(i));
            let current = buffer.stats().total_dropped;
            assert!(current >= last);
            last = current;
        }
    }
}
