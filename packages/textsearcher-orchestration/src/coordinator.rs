//! Pipeline coordinator
//!
//! Task graph for one invocation:
//!
//! ```text
//! content ─▶ chunk (pool) ─▶ [scan(chunk₀) … scan(chunkₙ₋₁)] on WorkerPool
//!                                │ join_all (barrier)
//!                                ▼
//!           for i in 0..n: rebase(result_i) ─▶ Aggregator ─▶ ScanReport
//! ```
//!
//! Completion order on the pool is arbitrary; folding happens after the
//! barrier in chunk-index order, so the merged lists are document-ordered.
//!
//! One deadline, started when the invocation starts, bounds chunking and
//! the barrier together. When it expires (or the run is cancelled) the
//! call returns at once; a task already scanning finishes and is
//! discarded, queued tasks of the run skip their scan.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::pool::{ShutdownOutcome, WorkerPool};
use crate::report::{ChunkFailure, FailureKind, RunMetrics, ScanReport};
use chrono::Utc;
use futures::future::join_all;
use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use textsearcher_core::{
    rebase, Aggregator, Chunk, Dictionary, LineChunker, MatchIndex, ScanError, Scanner,
};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

type TaskOutcome = std::result::Result<
    std::thread::Result<std::result::Result<MatchIndex, ScanError>>,
    oneshot::error::RecvError,
>;

/// Per-invocation overrides
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Overrides `PipelineConfig::chunk_size`
    pub chunk_size: Option<usize>,
    /// Overrides `PipelineConfig::deadline_ms`
    pub deadline: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl RunOptions {
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }

    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }
}

/// Fans chunks out to the worker pool and folds the results back in order
pub struct PipelineCoordinator {
    pool: Arc<WorkerPool>,
    dictionary: Arc<Dictionary>,
    scanner: Arc<dyn Scanner>,
    config: PipelineConfig,
}

impl PipelineCoordinator {
    /// Build a coordinator that owns a fresh pool of `config.concurrency` threads
    pub fn new(config: PipelineConfig, dictionary: Dictionary) -> Result<Self> {
        config.validate()?;
        let pool = Arc::new(WorkerPool::new(config.concurrency)?);
        Ok(Self::with_pool(config, Arc::new(dictionary), pool))
    }

    /// Build a coordinator on an existing, shared pool
    pub fn with_pool(
        config: PipelineConfig,
        dictionary: Arc<Dictionary>,
        pool: Arc<WorkerPool>,
    ) -> Self {
        let scanner = config.match_mode.scanner();
        Self {
            pool,
            dictionary,
            scanner,
            config,
        }
    }

    /// Replace the scanner selected by `match_mode`
    pub fn with_scanner(mut self, scanner: Arc<dyn Scanner>) -> Self {
        self.scanner = scanner;
        self
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    pub fn dictionary(&self) -> &Arc<Dictionary> {
        &self.dictionary
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub async fn process(&self, content: &str) -> Result<ScanReport> {
        self.process_with(content, RunOptions::default()).await
    }

    pub async fn process_with(&self, content: &str, options: RunOptions) -> Result<ScanReport> {
        let started = Instant::now();
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();

        // Validation happens before anything is scheduled
        let chunk_size = options.chunk_size.unwrap_or(self.config.chunk_size);
        let chunker = LineChunker::new(chunk_size)?;
        if options.cancel.as_ref().is_some_and(|t| t.is_cancelled()) {
            return Err(PipelineError::Cancelled);
        }

        let limit = options.deadline.or_else(|| self.config.deadline());
        let bounds = Bounds {
            expires_at: limit.map(|limit| tokio::time::Instant::now() + limit),
            limit,
            cancel: options.cancel.clone().unwrap_or_else(CancellationToken::new),
        };

        // Queued tasks of this run check this before scanning; it fires on
        // every exit path, including the caller dropping this future
        let abandon = CancellationToken::new();
        let _abandon_on_exit = abandon.clone().drop_guard();

        let chunks: Vec<Arc<Chunk>> = self
            .chunk_on_pool(chunker, content, &bounds)
            .await?
            .into_iter()
            .map(Arc::new)
            .collect();
        let lines: usize = chunks.iter().map(|c| c.line_count()).sum();

        info!(
            %run_id,
            chunks = chunks.len(),
            lines,
            chunk_size,
            scanner = self.scanner.name(),
            "scan started"
        );

        let mut pending = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            let scanner = Arc::clone(&self.scanner);
            let dictionary = Arc::clone(&self.dictionary);
            let task_chunk = Arc::clone(chunk);
            let abandoned = abandon.clone();
            pending.push(self.pool.submit(move || {
                if abandoned.is_cancelled() {
                    return Err(ScanError::new(task_chunk.index, "run abandoned"));
                }
                scanner.scan(&task_chunk, &dictionary)
            })?);
        }

        let outcomes = bounds.run(join_all(pending)).await?;

        let mut aggregator = Aggregator::new();
        let mut failures = Vec::new();
        for (chunk, outcome) in chunks.iter().zip(outcomes) {
            match settle(chunk, outcome) {
                Ok(local) => {
                    debug!(chunk = chunk.index, matches = local.total_matches(), "chunk scanned");
                    aggregator.fold(rebase(local, chunk));
                }
                Err(failure) => {
                    warn!(
                        %run_id,
                        chunk = failure.chunk_index,
                        kind = ?failure.kind,
                        error = %failure.message,
                        "chunk scan failed, continuing without it"
                    );
                    failures.push(failure);
                }
            }
        }

        let index = aggregator.finish();
        let metrics = RunMetrics {
            chunks_total: chunks.len(),
            chunks_failed: failures.len(),
            lines,
            matches: index.total_matches(),
            duration_ms: started.elapsed().as_millis() as u64,
        };

        info!(
            %run_id,
            names = index.len(),
            matches = metrics.matches,
            failed = metrics.chunks_failed,
            duration_ms = metrics.duration_ms,
            "scan finished"
        );

        Ok(ScanReport {
            run_id,
            started_at,
            index,
            failures,
            metrics,
        })
    }

    /// Split `content` on a pool thread so large documents never block the
    /// runtime. Empty content schedules nothing.
    async fn chunk_on_pool(
        &self,
        chunker: LineChunker,
        content: &str,
        bounds: &Bounds,
    ) -> Result<Vec<Chunk>> {
        if content.is_empty() {
            return Ok(Vec::new());
        }

        let owned = content.to_owned();
        let receiver = self.pool.submit(move || chunker.chunk(&owned))?;
        match bounds.run(receiver).await? {
            Ok(Ok(chunks)) => Ok(chunks),
            Ok(Err(payload)) => Err(PipelineError::invalid_input(format!(
                "chunking failed: {}",
                panic_message(payload.as_ref())
            ))),
            Err(_) => Err(PipelineError::PoolShutdown),
        }
    }

    /// Shut the pool down with the configured grace period
    pub async fn shutdown(&self) -> ShutdownOutcome {
        self.pool.shutdown(self.config.shutdown_grace()).await
    }
}

/// Deadline and cancellation shared by every wait of one invocation.
///
/// The deadline is fixed when the invocation starts, so chunking and
/// scanning draw on the same budget.
struct Bounds {
    expires_at: Option<tokio::time::Instant>,
    limit: Option<Duration>,
    cancel: CancellationToken,
}

impl Bounds {
    async fn run<F>(&self, work: F) -> Result<F::Output>
    where
        F: Future,
    {
        let bounded = async {
            match (self.expires_at, self.limit) {
                (Some(at), Some(limit)) => tokio::time::timeout_at(at, work).await.map_err(|_| {
                    PipelineError::Timeout {
                        deadline_ms: limit.as_millis() as u64,
                    }
                }),
                _ => Ok(work.await),
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(PipelineError::Cancelled),
            result = bounded => result,
        }
    }
}

fn settle(chunk: &Chunk, outcome: TaskOutcome) -> std::result::Result<MatchIndex, ChunkFailure> {
    let failure = |kind, message: String| ChunkFailure {
        chunk_index: chunk.index,
        start_line_offset: chunk.start_line_offset,
        kind,
        message,
    };

    match outcome {
        Ok(Ok(Ok(local))) => Ok(local),
        Ok(Ok(Err(e))) => Err(failure(FailureKind::Error, e.message)),
        Ok(Err(payload)) => Err(failure(FailureKind::Panic, panic_message(payload.as_ref()))),
        Err(_) => Err(failure(
            FailureKind::Abandoned,
            "task dropped before completion".to_string(),
        )),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "scanner panicked".to_string()
    }
}
