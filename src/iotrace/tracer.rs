//! I/O Tracer: tracked equivalents of read/write/list-directory
//! that time themselves, sanitize the path, and append an [`IOEvent`] to a
//! shared [`RingBuffer`]. The only filesystem operations this crate
//! self-observes — this is not a system-wide FS auditor.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::model::{sanitize_path, IOEvent, IOOperation};

use super::ring_buffer::RingBuffer;

/// Wraps tracked filesystem operations and appends timed events to a
/// shared ring buffer. Lifecycle is fire-and-forget on `stop()`: in-flight
/// calls complete and still emit; only new calls after `stop()` are
/// silenced.
pub struct IoTracer {
    buffer: Arc<RingBuffer>,
    active: AtomicBool,
    epoch: Instant,
}

impl IoTracer {
    pub fn new(buffer: Arc<RingBuffer>) -> Self {
        Self {
            buffer,
            active: AtomicBool::new(false),
            epoch: Instant::now(),
        }
    }

    pub fn start(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    /// Stop recording new events. Does not flush the buffer — draining is
    /// the Aggregator's responsibility.
    pub fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn now_nanos(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    fn emit(&self, operation: IOOperation, path: &Path, bytes: u64, duration_nanos: u64) {
        if !self.is_active() {
            return;
        }
        self.buffer.append(IOEvent {
            timestamp_nanos: self.now_nanos(),
            operation,
            sanitized_path: sanitize_path(path),
            bytes_transferred: bytes,
            duration_nanos,
            pid: Some(std::process::id()),
        });
    }

    /// Read the full contents of `path`, timing the call and emitting an
    /// event regardless of outcome.
    pub async fn tracked_read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        let start = Instant::now();
        let result = tokio::fs::read(path).await;
        let elapsed = start.elapsed().as_nanos() as u64;
        match &result {
            Ok(data) => self.emit(IOOperation::Read, path, data.len() as u64, elapsed),
            Err(_) => self.emit(IOOperation::Read, path, 0, elapsed),
        }
        result
    }

    /// Write `data` to `path`, timing the call and emitting an event
    /// regardless of outcome.
    pub async fn tracked_write(&self, path: &Path, data: &[u8]) -> std::io::Result<()> {
        let start = Instant::now();
        let result = tokio::fs::write(path, data).await;
        let elapsed = start.elapsed().as_nanos() as u64;
        match &result {
            Ok(()) => self.emit(IOOperation::Write, path, data.len() as u64, elapsed),
            Err(_) => self.emit(IOOperation::Write, path, 0, elapsed),
        }
        result
    }

    /// List the immediate contents of directory `path`.
    pub async fn tracked_contents(&self, path: &Path) -> std::io::Result<Vec<PathBuf>> {
        let start = Instant::now();
        let result = list_dir(path).await;
        let elapsed = start.elapsed().as_nanos() as u64;
        match &result {
            Ok(entries) => self.emit(IOOperation::Readdir, path, entries.len() as u64, elapsed),
            Err(_) => self.emit(IOOperation::Readdir, path, 0, elapsed),
        }
        result
    }
}

async fn list_dir(path: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut read_dir = tokio::fs::read_dir(path).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        entries.push(entry.path());
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tracked_write_then_read_emits_events() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.bin");
        let buffer = Arc::new(RingBuffer::new(16));
        let tracer = IoTracer::new(buffer.clone());
        tracer.start();

        tracer.tracked_write(&file, b"hello").await.unwrap();
        let read_back = tracer.tracked_read(&file).await.unwrap();
        assert_eq!(read_back, b"hello");

        let stats = buffer.stats();
        assert_eq!(stats.count, 2);
    }

    #[tokio::test]
    async fn stopped_tracer_emits_nothing() {
        let buffer = Arc::new(RingBuffer::new(16));
        let tracer = IoTracer::new(buffer.clone());
        // never started
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.bin");
        let _ = tracer.tracked_write(&file, b"hello").await;
        assert_eq!(buffer.stats().count, 0);
    }

    #[tokio::test]
    async fn error_path_still_emits_event() {
        let buffer = Arc::new(RingBuffer::new(16));
        let tracer = IoTracer::new(buffer.clone());
        tracer.start();
        let missing = PathBuf::from("/no/such/path/for/swiftsweep/test");
        let result = tracer.tracked_read(&missing).await;
        assert!(result.is_err());
        assert_eq!(buffer.stats().count, 1);
    }
}
