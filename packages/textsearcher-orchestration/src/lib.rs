/*
 * Textsearcher Orchestration - Concurrent Chunked Name Search
 *
 * Architecture:
 * - WorkerPool: bounded rayon pool, explicit graceful/forced shutdown
 * - PipelineCoordinator: chunk fan-out, join barrier, ordered fold
 * - Deadline and cancellation per invocation
 * - Sources (memory, file, HTTP) and sinks (log, writer, memory, totals)
 * - YAML + environment configuration
 */

pub mod config;
pub mod coordinator;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod pool;
pub mod report;
pub mod service;
pub mod sink;
pub mod source;
pub mod telemetry;
pub mod totals;

// Re-exports
pub use config::{ConfigError, PipelineConfig, PipelineConfigBuilder};
pub use coordinator::{PipelineCoordinator, RunOptions};
pub use error::{ErrorCategory, PipelineError, Result};
#[cfg(feature = "http")]
pub use http::{validate_url, HttpSource};
pub use pool::{ShutdownOutcome, WorkerPool};
pub use report::{ChunkFailure, FailureKind, RunMetrics, ScanReport};
pub use service::{SearchService, SourceOutcome};
pub use sink::{format_positions, LogSink, MemorySink, OutputFormat, ResultSink, WriterSink};
pub use source::{ContentSource, FetchError, FileSource, StaticSource};
pub use telemetry::init_tracing;
pub use totals::{CumulativeIndex, Totals};

pub use textsearcher_core::{AggregatedIndex, Dictionary, MatchMode, TextPosition};
pub use tokio_util::sync::CancellationToken;
