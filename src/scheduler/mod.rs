//! Scheduler: bounds concurrency for cooperative tasks with
//! priorities, timeouts, and backpressure. State (running count, pending
//! FIFOs per priority, config) is owned by exactly this component; callers
//! only ever reach it through `schedule`/`map_concurrently`/`status` —
//! there are no cross-component locks.

use std::collections::VecDeque;
use std::future::Future;
use std::time::Duration;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Scheduling priority. Declaration order doubles as array index (`Low` =
/// 0 .. `Critical` = 3); dequeuing walks priorities highest-first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Normal,
    High,
    Critical,
}

const PRIORITY_COUNT: usize = 4;

/// Scheduler-wide, hot-swappable configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    pub max_concurrency: usize,
    pub max_queue_size: usize,
    pub default_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            max_queue_size: 256,
            default_timeout: Duration::from_secs(30),
        }
    }
}

/// Typed failure modes for a scheduled task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    Timeout,
    QueueFull,
    Cancelled,
}

impl std::fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SchedulerError::Timeout => write!(f, "task timed out"),
            SchedulerError::QueueFull => write!(f, "scheduler queue is full"),
            SchedulerError::Cancelled => write!(f, "task cancelled"),
        }
    }
}

impl std::error::Error for SchedulerError {}

/// Snapshot of scheduler occupancy and configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SchedulerStatus {
    pub running: usize,
    pub pending: usize,
    pub config: SchedulerConfig,
}

struct State {
    running: usize,
    queues: [VecDeque<oneshot::Sender<()>>; PRIORITY_COUNT],
    config: SchedulerConfig,
    cancelled: bool,
}

/// Bounded, prioritized, cooperative task scheduler.
pub struct Scheduler {
    state: Mutex<State>,
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            state: Mutex::new(State {
                running: 0,
                queues: Default::default(),
                config,
                cancelled: false,
            }),
        }
    }

    /// Await a slot, run `task`, and return its result or a typed error.
    /// Uses the scheduler's configured default timeout.
    pub async fn schedule<F, Fut, T>(&self, priority: Priority, task: F) -> Result<T, SchedulerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let timeout = self.state.lock().config.default_timeout;
        self.schedule_with_timeout(priority, timeout, task).await
    }

    /// Like [`Scheduler::schedule`] but with an explicit per-call timeout,
    /// independent of the scheduler's default. Privileged helper
    /// calls use this to carry their own timeout.
    pub async fn schedule_with_timeout<F, Fut, T>(
        &self,
        priority: Priority,
        timeout: Duration,
        task: F,
    ) -> Result<T, SchedulerError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        self.acquire(priority).await?;
        let result = tokio::time::timeout(timeout, task()).await;
        self.release();
        result.map_err(|_| SchedulerError::Timeout)
    }

    async fn acquire(&self, priority: Priority) -> Result<(), SchedulerError> {
        let rx = {
            let mut state = self.state.lock();
            if state.cancelled {
                return Err(SchedulerError::Cancelled);
            }
            if state.running < state.config.max_concurrency {
                state.running += 1;
                return Ok(());
            }
            let pending_total: usize = state.queues.iter().map(VecDeque::len).sum();
            if pending_total >= state.config.max_queue_size {
                return Err(SchedulerError::QueueFull);
            }
            let (tx, rx) = oneshot::channel();
            state.queues[priority as usize].push_back(tx);
            rx
        };
        rx.await.map_err(|_| SchedulerError::Cancelled)
    }

    fn release(&self) {
        let mut state = self.state.lock();
        state.running -= 1;
        for idx in (0..PRIORITY_COUNT).rev() {
            if let Some(tx) = state.queues[idx].pop_front() {
                state.running += 1;
                // Receiver may already be gone if the caller's future was
                // dropped; a failed send just leaves the slot unclaimed,
                // so walk to the next candidate instead of losing it.
                if tx.send(()).is_ok() {
                    break;
                }
                state.running -= 1;
            }
        }
    }

    /// Run `items` through `f` with bounded concurrency, preserving input
    /// order in the returned `Vec`.
    pub async fn map_concurrently<T, F, Fut, R>(
        &self,
        items: Vec<T>,
        priority: Priority,
        f: F,
    ) -> Vec<Result<R, SchedulerError>>
    where
        F: Fn(T) -> Fut,
        Fut: Future<Output = R>,
        T: Send,
        R: Send,
    {
        let tasks = items.into_iter().enumerate().map(|(index, item)| {
            let f = &f;
            async move {
                let outcome = self.schedule(priority, || f(item)).await;
                (index, outcome)
            }
        });
        let mut results = futures::future::join_all(tasks).await;
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, outcome)| outcome).collect()
    }

    /// Atomically replace the scheduler's configuration.
    pub fn update_config(&self, config: SchedulerConfig) {
        self.state.lock().config = config;
    }

    pub fn status(&self) -> SchedulerStatus {
        let state = self.state.lock();
        let pending = state.queues.iter().map(VecDeque::len).sum();
        SchedulerStatus {
            running: state.running,
            pending,
            config: state.config,
        }
    }

    /// Mark the scheduler cancelled: new `schedule` calls fail immediately
    /// with `Cancelled`, and every task currently waiting for a slot is
    /// woken with `Cancelled` too.
    pub fn cancel_all_pending(&self) {
        let mut state = self.state.lock();
        state.cancelled = true;
        for queue in state.queues.iter_mut() {
            queue.clear();
        }
    }
}
