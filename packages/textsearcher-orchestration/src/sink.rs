//! Result sinks
//!
//! A sink receives every finished [`ScanReport`] together with the id of
//! the source it came from. Formatting and dictionary filtering happen
//! here, never in the aggregator.

use crate::error::{PipelineError, Result};
use crate::report::ScanReport;
use parking_lot::Mutex;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use textsearcher_core::{Dictionary, TextPosition};
use tracing::info;

pub trait ResultSink: Send + Sync {
    fn publish(&self, source_id: &str, report: &ScanReport) -> Result<()>;
}

/// `[[lineOffset=0, charOffset=0], [lineOffset=1, charOffset=10]]`
pub fn format_positions(positions: &[TextPosition]) -> String {
    let items: Vec<String> = positions.iter().map(ToString::to_string).collect();
    format!("[{}]", items.join(", "))
}

/// Logs `Name --> [positions]` per dictionary name at `info`
pub struct LogSink {
    dictionary: Arc<Dictionary>,
}

impl LogSink {
    pub fn new(dictionary: Arc<Dictionary>) -> Self {
        Self { dictionary }
    }
}

impl ResultSink for LogSink {
    fn publish(&self, source_id: &str, report: &ScanReport) -> Result<()> {
        for (name, positions) in report.index.filtered(&self.dictionary).iter() {
            info!(source = source_id, "{} --> {}", name, format_positions(positions));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Header line per source, then `Name --> [positions]` lines
    #[default]
    Text,
    /// One JSON object per report
    JsonLines,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    source: &'a str,
    #[serde(flatten)]
    report: &'a ScanReport,
}

/// Writes reports to any `Write` (stdout, a file, a buffer)
pub struct WriterSink<W: Write + Send> {
    writer: Mutex<W>,
    format: OutputFormat,
    dictionary: Option<Arc<Dictionary>>,
}

impl<W: Write + Send> WriterSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self {
            writer: Mutex::new(writer),
            format,
            dictionary: None,
        }
    }

    /// Only emit names contained in `dictionary`
    pub fn filtered_by(mut self, dictionary: Arc<Dictionary>) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer.into_inner()
    }

    fn write_text(&self, out: &mut W, source_id: &str, report: &ScanReport) -> Result<()> {
        writeln!(
            out,
            "# {} ({} matches, {} of {} chunks failed)",
            source_id,
            report.index.total_matches(),
            report.metrics.chunks_failed,
            report.metrics.chunks_total
        )?;
        for (name, positions) in report.index.iter() {
            writeln!(out, "{} --> {}", name, format_positions(positions))?;
        }
        Ok(())
    }
}

impl<W: Write + Send> ResultSink for WriterSink<W> {
    fn publish(&self, source_id: &str, report: &ScanReport) -> Result<()> {
        let filtered;
        let report = match &self.dictionary {
            Some(dictionary) => {
                filtered = ScanReport {
                    index: report.index.filtered(dictionary),
                    ..report.clone()
                };
                &filtered
            }
            None => report,
        };

        let mut out = self.writer.lock();
        match self.format {
            OutputFormat::Text => self.write_text(&mut *out, source_id, report)?,
            OutputFormat::JsonLines => {
                let record = JsonRecord {
                    source: source_id,
                    report,
                };
                serde_json::to_writer(&mut *out, &record).map_err(PipelineError::serialization)?;
                writeln!(out)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

/// Keeps every published report in memory
#[derive(Default)]
pub struct MemorySink {
    reports: Mutex<Vec<(String, ScanReport)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.reports.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.lock().is_empty()
    }

    pub fn get(&self, source_id: &str) -> Option<ScanReport> {
        self.reports
            .lock()
            .iter()
            .find(|(id, _)| id == source_id)
            .map(|(_, report)| report.clone())
    }

    pub fn take(&self) -> Vec<(String, ScanReport)> {
        std::mem::take(&mut *self.reports.lock())
    }
}

impl ResultSink for MemorySink {
    fn publish(&self, source_id: &str, report: &ScanReport) -> Result<()> {
        self.reports
            .lock()
            .push((source_id.to_string(), report.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RunMetrics;
    use chrono::Utc;
    use textsearcher_core::{AggregatedIndex, MatchIndex};
    use uuid::Uuid;

    fn report(entries: &[(&str, usize, usize)]) -> ScanReport {
        let mut local = MatchIndex::new();
        for (name, line, column) in entries {
            local.insert(name, TextPosition::new(*line, *column));
        }
        let mut index = AggregatedIndex::new();
        index.append(local);
        ScanReport {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            metrics: RunMetrics {
                chunks_total: 1,
                matches: index.total_matches(),
                ..RunMetrics::default()
            },
            index,
            failures: Vec::new(),
        }
    }

    #[test]
    fn test_format_positions() {
        assert_eq!(
            format_positions(&[TextPosition::new(0, 0), TextPosition::new(1, 10)]),
            "[[lineOffset=0, charOffset=0], [lineOffset=1, charOffset=10]]"
        );
        assert_eq!(format_positions(&[]), "[]");
    }

    #[test]
    fn test_text_writer_filters_to_dictionary() {
        let sink = WriterSink::new(Vec::new(), OutputFormat::Text)
            .filtered_by(Arc::new(Dictionary::person_names()));
        sink.publish("doc", &report(&[("John", 0, 0), ("Zorg", 2, 1)]))
            .unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(
            text,
            "# doc (1 matches, 0 of 1 chunks failed)\nJohn --> [[lineOffset=0, charOffset=0]]\n"
        );
    }

    #[test]
    fn test_json_lines_writer() {
        let sink = WriterSink::new(Vec::new(), OutputFormat::JsonLines);
        sink.publish("a", &report(&[("John", 1, 10)])).unwrap();
        sink.publish("b", &report(&[])).unwrap();

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["source"], "a");
        assert_eq!(lines[0]["index"]["John"][0]["column_number"], 10);
        assert_eq!(lines[1]["metrics"]["chunks_total"], 1);
    }

    #[test]
    fn test_memory_sink() {
        let sink = MemorySink::new();
        sink.publish("a", &report(&[("John", 0, 0)])).unwrap();
        assert_eq!(sink.len(), 1);
        assert!(sink.get("a").unwrap().index.contains("John"));
        assert_eq!(sink.take().len(), 1);
        assert!(sink.is_empty());
    }
}
