//! Source → pipeline → sinks
//!
//! A source that cannot be read is a total failure for that source only:
//! the pipeline is never invoked for it and the other sources are
//! unaffected.

use crate::coordinator::{PipelineCoordinator, RunOptions};
use crate::error::{PipelineError, Result};
use crate::report::ScanReport;
use crate::sink::ResultSink;
use crate::source::ContentSource;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, info};

/// Outcome of one source in [`SearchService::run_all`]
#[derive(Debug)]
pub struct SourceOutcome {
    pub source_id: String,
    pub result: Result<ScanReport>,
}

impl SourceOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

pub struct SearchService {
    coordinator: Arc<PipelineCoordinator>,
    sinks: Vec<Arc<dyn ResultSink>>,
}

impl SearchService {
    pub fn new(coordinator: Arc<PipelineCoordinator>) -> Self {
        Self {
            coordinator,
            sinks: Vec::new(),
        }
    }

    pub fn with_sink(mut self, sink: Arc<dyn ResultSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn coordinator(&self) -> &Arc<PipelineCoordinator> {
        &self.coordinator
    }

    pub async fn run_source(&self, source: &dyn ContentSource) -> Result<ScanReport> {
        self.run_source_with(source, RunOptions::default()).await
    }

    /// Fetch, scan and publish one source
    pub async fn run_source_with(
        &self,
        source: &dyn ContentSource,
        options: RunOptions,
    ) -> Result<ScanReport> {
        let source_id = source.id().to_string();

        let content = match source.fetch().await {
            Ok(content) => content,
            Err(e) => {
                error!(source = %source_id, error = %e, "content unavailable, source skipped");
                return Err(PipelineError::Fetch {
                    source_id,
                    error: e,
                });
            }
        };
        info!(source = %source_id, bytes = content.len(), "content fetched");

        let report = self.coordinator.process_with(&content, options).await?;

        for sink in &self.sinks {
            sink.publish(&source_id, &report)?;
        }
        Ok(report)
    }

    /// Process every source concurrently; outcomes come back in input order
    pub async fn run_all(&self, sources: &[Box<dyn ContentSource>]) -> Vec<SourceOutcome> {
        let runs = sources.iter().map(|source| async move {
            SourceOutcome {
                source_id: source.id().to_string(),
                result: self.run_source(source.as_ref()).await,
            }
        });
        let outcomes = join_all(runs).await;

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        info!(sources = outcomes.len(), failed, "all sources processed");
        outcomes
    }
}
