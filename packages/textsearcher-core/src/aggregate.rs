//! Result aggregation
//!
//! Folds rebased chunk indexes into one [`AggregatedIndex`]. Lists are
//! appended, never overwritten. Feeding chunks in chunk-index order keeps
//! every list sorted by (line, column) no matter which chunk finished first.

use crate::model::{AggregatedIndex, MatchIndex};
use tracing::debug;

/// Incremental aggregator
#[derive(Debug, Default)]
pub struct Aggregator {
    index: AggregatedIndex,
    chunks_merged: usize,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one chunk's (already rebased) matches
    pub fn fold(&mut self, chunk_result: MatchIndex) {
        debug!(
            chunk = self.chunks_merged,
            names = chunk_result.len(),
            matches = chunk_result.total_matches(),
            "merging chunk result"
        );
        self.index.append(chunk_result);
        self.chunks_merged += 1;
    }

    pub fn chunks_merged(&self) -> usize {
        self.chunks_merged
    }

    pub fn finish(self) -> AggregatedIndex {
        self.index
    }
}

/// Merge chunk results in the order given
pub fn merge<I>(chunk_results: I) -> AggregatedIndex
where
    I: IntoIterator<Item = MatchIndex>,
{
    let mut aggregator = Aggregator::new();
    for result in chunk_results {
        aggregator.fold(result);
    }
    aggregator.finish()
}
