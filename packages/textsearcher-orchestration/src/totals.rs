//! Cross-invocation totals
//!
//! Opt-in replacement for a process-wide results map: attach a
//! [`CumulativeIndex`] as a sink and it counts matches per name over every
//! report it sees. Nothing else in the pipeline keeps state between runs.

use crate::error::Result;
use crate::report::ScanReport;
use crate::sink::ResultSink;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub runs: usize,
    /// name → occurrences over all runs
    pub matches: BTreeMap<String, usize>,
    /// name → sources it was found in, in publish order
    pub sources: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Default)]
pub struct CumulativeIndex {
    totals: Mutex<Totals>,
}

impl CumulativeIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Totals {
        self.totals.lock().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.totals.lock().matches.get(name).copied().unwrap_or(0)
    }

    pub fn runs(&self) -> usize {
        self.totals.lock().runs
    }

    pub fn reset(&self) {
        *self.totals.lock() = Totals::default();
    }
}

impl ResultSink for CumulativeIndex {
    fn publish(&self, source_id: &str, report: &ScanReport) -> Result<()> {
        let mut totals = self.totals.lock();
        totals.runs += 1;
        for (name, positions) in report.index.iter() {
            *totals.matches.entry(name.to_string()).or_default() += positions.len();
            totals
                .sources
                .entry(name.to_string())
                .or_default()
                .push(source_id.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RunMetrics;
    use chrono::Utc;
    use textsearcher_core::{AggregatedIndex, MatchIndex, TextPosition};
    use uuid::Uuid;

    fn report(name: &str, hits: usize) -> ScanReport {
        let mut local = MatchIndex::new();
        for line in 0..hits {
            local.insert(name, TextPosition::new(line, 0));
        }
        let mut index = AggregatedIndex::new();
        index.append(local);
        ScanReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            index,
            failures: Vec::new(),
            metrics: RunMetrics::default(),
        }
    }

    #[test]
    fn test_totals_accumulate_across_runs() {
        let totals = CumulativeIndex::new();
        totals.publish("a", &report("John", 2)).unwrap();
        totals.publish("b", &report("John", 3)).unwrap();
        totals.publish("b", &report("Mark", 1)).unwrap();

        assert_eq!(totals.runs(), 3);
        assert_eq!(totals.count("John"), 5);
        assert_eq!(totals.count("Mark"), 1);
        assert_eq!(totals.count("Paul"), 0);
        assert_eq!(totals.snapshot().sources["John"], vec!["a", "b"]);

        totals.reset();
        assert_eq!(totals.snapshot(), Totals::default());
    }
}
