//! Bounded scan worker pool
//!
//! One rayon pool per process, injected wherever scanning happens. Async
//! callers get a `oneshot` receiver per task and suspend on it while the
//! pool threads work. Panics are caught on the worker thread and delivered
//! to the receiver as `Err`, so one failing task never takes down a sibling.
//!
//! Shutdown is explicit: stop accepting, wait up to a grace period for
//! in-flight tasks to drain, then close the pool. A closed pool never
//! starts a queued task and never delivers a result, so every abandoned
//! task's receiver reports `RecvError`. A task already running cannot be
//! interrupted; it finishes on its thread and its result is dropped.

use crate::error::{PipelineError, Result};
use parking_lot::Mutex;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::sync::{oneshot, Notify};
use tracing::{debug, info, warn};

/// Result of [`WorkerPool::shutdown`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// Every in-flight task finished within the grace period
    Graceful,
    /// Grace period expired. `abandoned` tasks were queued or running; none
    /// of them delivers a result.
    Forced { abandoned: usize },
}

#[derive(Default)]
struct InFlight {
    count: AtomicUsize,
    drained: Notify,
}

/// Decrements the in-flight count when the task finishes, panicked or not
struct InFlightGuard(Arc<InFlight>);

impl InFlightGuard {
    fn enter(state: Arc<InFlight>) -> Self {
        state.count.fetch_add(1, Ordering::AcqRel);
        Self(state)
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.0.count.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.0.drained.notify_waiters();
        }
    }
}

pub struct WorkerPool {
    pool: Mutex<Option<Arc<ThreadPool>>>,
    size: usize,
    accepting: AtomicBool,
    /// Set by a forced shutdown; checked by every task before and after its job
    closed: Arc<AtomicBool>,
    submitted: AtomicU64,
    in_flight: Arc<InFlight>,
}

impl WorkerPool {
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(PipelineError::invalid_input(
                "worker pool needs at least one thread",
            ));
        }

        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("textsearcher-worker-{}", i))
            .build()
            .map_err(|e| PipelineError::PoolBuild(e.to_string()))?;

        info!(workers, "worker pool started");

        Ok(Self {
            pool: Mutex::new(Some(Arc::new(pool))),
            size: workers,
            accepting: AtomicBool::new(true),
            closed: Arc::new(AtomicBool::new(false)),
            submitted: AtomicU64::new(0),
            in_flight: Arc::new(InFlight::default()),
        })
    }

    /// Pool sized to the available processors
    pub fn with_default_size() -> Result<Self> {
        Self::new(num_cpus::get().max(1))
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Tasks submitted but not yet finished
    pub fn in_flight(&self) -> usize {
        self.in_flight.count.load(Ordering::Acquire)
    }

    /// Total tasks ever accepted
    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn is_shut_down(&self) -> bool {
        !self.accepting.load(Ordering::Acquire)
    }

    /// Queue `job` on the pool.
    ///
    /// The receiver yields `Err(panic payload)` if the job panicked. After a
    /// forced shutdown the sender is dropped unsent and the receiver reports
    /// `RecvError`.
    pub fn submit<F, T>(&self, job: F) -> Result<oneshot::Receiver<thread::Result<T>>>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if self.is_shut_down() {
            return Err(PipelineError::PoolShutdown);
        }
        let pool = self
            .pool
            .lock()
            .as_ref()
            .map(Arc::clone)
            .ok_or(PipelineError::PoolShutdown)?;

        let (tx, rx) = oneshot::channel();
        let guard = InFlightGuard::enter(Arc::clone(&self.in_flight));
        self.submitted.fetch_add(1, Ordering::Relaxed);
        let closed = Arc::clone(&self.closed);

        pool.spawn(move || {
            let _guard = guard;
            if closed.load(Ordering::Acquire) {
                return;
            }
            let outcome = panic::catch_unwind(AssertUnwindSafe(job));
            if closed.load(Ordering::Acquire) {
                return;
            }
            // Receiver is gone when the caller timed out or was cancelled
            let _ = tx.send(outcome);
        });

        Ok(rx)
    }

    async fn wait_idle(&self) {
        loop {
            let notified = self.in_flight.drained.notified();
            if self.in_flight() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Stop accepting work, drain for up to `grace`, then release the threads.
    ///
    /// If the grace period expires the pool is closed first: queued tasks
    /// are skipped and no remaining task delivers a result.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&self, grace: Duration) -> ShutdownOutcome {
        self.accepting.store(false, Ordering::Release);
        debug!(in_flight = self.in_flight(), ?grace, "worker pool draining");

        let drained = tokio::time::timeout(grace, self.wait_idle()).await.is_ok();
        if !drained {
            self.closed.store(true, Ordering::Release);
        }

        // Dropping the last handle lets rayon threads exit once idle
        drop(self.pool.lock().take());

        if drained {
            info!("worker pool shut down");
            ShutdownOutcome::Graceful
        } else {
            let abandoned = self.in_flight();
            warn!(abandoned, ?grace, "worker pool shutdown forced");
            ShutdownOutcome::Forced { abandoned }
        }
    }
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("size", &self.size)
            .field("in_flight", &self.in_flight())
            .field("submitted", &self.submitted())
            .field("shut_down", &self.is_shut_down())
            .finish()
    }
}
