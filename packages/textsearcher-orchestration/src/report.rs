//! Per-invocation results

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use textsearcher_core::AggregatedIndex;
use uuid::Uuid;

/// Why a chunk contributed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Scanner returned an error
    Error,
    /// Scanner panicked on the worker thread
    Panic,
    /// Task was dropped before it ran (pool released)
    Abandoned,
}

/// An isolated chunk-level failure. The invocation itself still succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkFailure {
    pub chunk_index: usize,
    pub start_line_offset: usize,
    pub kind: FailureKind,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetrics {
    pub chunks_total: usize,
    pub chunks_failed: usize,
    pub lines: usize,
    pub matches: usize,
    pub duration_ms: u64,
}

/// Output of one pipeline invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub index: AggregatedIndex,
    pub failures: Vec<ChunkFailure>,
    pub metrics: RunMetrics,
}

impl ScanReport {
    /// True when every chunk was scanned
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}
