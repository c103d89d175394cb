//! Aggregator: converts raw [`IOEvent`]s into per-interval
//! [`IOTimeSlice`]s and rolling per-path [`IOPathStats`]. Runs as a
//! background cooperative task that wakes on a fixed interval; state is
//! owned exclusively by this component.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use parking_lot::Mutex;
use tokio::sync::watch;

use crate::model::{IOEvent, IOOperation, IOPathStats, IOTimeSlice};

use super::ring_buffer::RingBuffer;

/// Default number of events drained per tick.
pub const DEFAULT_DRAIN_BATCH: usize = 5000;
/// Default history length retained for time slices.
pub const DEFAULT_MAX_HISTORY: usize = 300;
/// Default wake interval for the background aggregation loop.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Owns the slice history and per-path statistics map. `run` drives the
/// periodic tick as a cooperative background task; `tick` is also callable
/// directly (tests, and any caller that wants to force a drain now).
pub struct Aggregator {
    buffer: Arc<RingBuffer>,
    slices: Mutex<VecDeque<IOTimeSlice>>,
    max_history: usize,
    path_stats: DashMap<String, IOPathStats>,
    drain_batch: usize,
}

impl Aggregator {
    pub fn new(buffer: Arc<RingBuffer>) -> Self {
        Self {
            buffer,
            slices: Mutex::new(VecDeque::new()),
            max_history: DEFAULT_MAX_HISTORY,
            path_stats: DashMap::new(),
            drain_batch: DEFAULT_DRAIN_BATCH,
        }
    }

    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }

    pub fn with_drain_batch(mut self, drain_batch: usize) -> Self {
        self.drain_batch = drain_batch;
        self
    }

    /// Drain up to `drain_batch` events and, if any were present, fold them
    /// into one new [`IOTimeSlice`] and update path statistics. Returns the
    /// produced slice, or `None` if the batch was empty (an empty tick is
    /// skipped and does not append a slice).
    pub fn tick(&self) -> Option<IOTimeSlice> {
        let events = self.buffer.drain(self.drain_batch);
        if events.is_empty() {
            return None;
        }

        let slice = fold_into_slice(&events);
        self.update_path_stats(&events);

        let mut slices = self.slices.lock();
        if slices.len() >= self.max_history {
            slices.pop_front();
        }
        slices.push_back(slice);
        Some(slice)
    }

    fn update_path_stats(&self, events: &[IOEvent]) {
        for event in events {
            let mut entry = self
                .path_stats
                .entry(event.sanitized_path.clone())
                .or_insert_with(|| IOPathStats::new(event.sanitized_path.clone()));
            entry.operation_count += 1;
            entry.total_bytes += event.bytes_transferred;
            match event.operation {
                IOOperation::Read => entry.read_bytes += event.bytes_transferred,
                IOOperation::Write => entry.write_bytes += event.bytes_transferred,
                _ => {}
            }
            if event.duration_nanos > 0 {
                let count = entry.operation_count as f64;
                entry.avg_latency_nanos = (entry.avg_latency_nanos as f64
                    + (event.duration_nanos as f64 - entry.avg_latency_nanos as f64) / count)
                    as u64;
            }
        }
    }

    /// Time-slice history, oldest first, up to the configured cap.
    pub fn slices(&self) -> Vec<IOTimeSlice> {
        self.slices.lock().iter().copied().collect()
    }

    /// Snapshot of current per-path statistics.
    pub fn path_stats(&self) -> Vec<IOPathStats> {
        self.path_stats.iter().map(|entry| entry.clone()).collect()
    }

    /// Run the periodic aggregation loop until `cancel` reports `true`.
    /// Checks cancellation once per iteration at its natural yield point
    /// (the interval tick).
    pub async fn run(self: Arc<Self>, interval: Duration, mut cancel: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                _ = cancel.changed() => {
                    if *cancel.borrow() {
                        break;
                    }
                }
            }
        }
    }
}

fn fold_into_slice(events: &[IOEvent]) -> IOTimeSlice {
    let start_nanos = events.iter().map(|e| e.timestamp_nanos).min().unwrap_or(0);
    let end_nanos = events.iter().map(|e| e.timestamp_nanos).max().unwrap_or(0);

    let mut read_bytes = 0u64;
    let mut write_bytes = 0u64;
    let mut read_ops = 0u64;
    let mut write_ops = 0u64;
    let mut durations: Vec<u64> = Vec::new();

    for event in events {
        match event.operation {
            IOOperation::Read => {
                read_bytes += event.bytes_transferred;
                read_ops += 1;
            }
            IOOperation::Write => {
                write_bytes += event.bytes_transferred;
                write_ops += 1;
            }
            _ => {}
        }
        if event.duration_nanos > 0 {
            durations.push(event.duration_nanos);
        }
    }

    let (avg_latency_nanos, p99_latency_nanos) = if durations.is_empty() {
        (0, 0)
    } else {
        durations.sort_unstable();
        let sum: u64 = durations.iter().sum();
        let avg = sum / durations.len() as u64;
        let p99_index = ((durations.len() as f64) * 0.99).floor() as usize;
        let p99_index = p99_index.min(durations.len() - 1);
        (avg, durations[p99_index])
    };

    IOTimeSlice {
        start_nanos,
        duration_nanos: end_nanos.saturating_sub(start_nanos),
        read_bytes,
        write_bytes,
        read_ops,
        write_ops,
        avg_latency_nanos,
        p99_latency_nanos,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::iotrace::tracer::IoTracer;

    #[tokio::test]
    async fn one_hundred_writes_fold_into_one_slice() {
        let buffer = Arc::new(RingBuffer::new(1_000));
        let tracer = IoTracer::new(buffer.clone());
        tracer.start();

        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("target.bin");
        let payload = vec![0u8; 1024];
        for _ in 0..100 {
            tracer.tracked_write(&file, &payload).await.unwrap();
        }
        tracer.stop();

        let aggregator = Aggregator::new(buffer);
        let slice = aggregator.tick().expect("non-empty tick produces a slice");
        assert_eq!(slice.write_ops, 100);
        assert_eq!(slice.write_bytes, 100 * 1024);
        assert!(slice.avg_latency_nanos > 0);

        let stats = aggregator.path_stats();
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].operation_count, 100);
    }

    #[test]
    fn empty_tick_appends_no_slice() {
        let buffer = Arc::new(RingBuffer::new(16));
        let aggregator = Aggregator::new(buffer);
        assert!(aggregator.tick().is_none());
        assert!(aggregator.slices().is_empty());
    }

    #[test]
    fn history_is_capped() {
        let buffer = Arc::new(RingBuffer::new(16));
        let aggregator = Aggregator::new(buffer.clone()).with_max_history(2);
        for i in 0..5u64 {
            buffer.append(crate::model::IOEvent {
                timestamp_nanos: i,
                operation: IOOperation::Read,
                sanitized_path: "a".into(),
                bytes_transferred: 10,
                duration_nanos: 5,
                pid: None,
            });
            aggregator.tick();
        }
        assert!(aggregator.slices().len() <= 2);
    }
}
