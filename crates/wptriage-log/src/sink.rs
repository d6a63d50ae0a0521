use crate::error::ParseError;
use crate::ir::Summary;
use std::path::PathBuf;

/// Something worth telling the operator about during a run.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    /// Analysis of `path` started.
    Started { path: PathBuf, source_id: String },
    /// A line carrying the error marker could not be turned into a record.
    ParseFailed { line_no: usize, error: ParseError },
    /// The source was fully read.
    Parsed {
        lines_read: usize,
        error_lines: usize,
        records: usize,
    },
    /// A report was written to `path`.
    ReportWritten { path: PathBuf, rows: usize },
    Summary(Summary),
}

/// Receiver for [`AnalysisEvent`]s. One sink is created per run and passed
/// down explicitly.
pub trait EventSink {
    fn record(&mut self, event: AnalysisEvent);
}

/// Forwards events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn record(&mut self, event: AnalysisEvent) {
        match event {
            AnalysisEvent::Started { path, source_id } => {
                log::debug!("Analyzing {:?} as source `{}`", path, source_id);
            }
            AnalysisEvent::ParseFailed { line_no, error } => {
                log::error!("Error parsing log entry at line {}: {}", line_no, error);
            }
            AnalysisEvent::Parsed {
                lines_read,
                error_lines,
                records,
            } => {
                log::debug!(
                    "Read {} lines, {} error lines, {} records",
                    lines_read,
                    error_lines,
                    records
                );
            }
            AnalysisEvent::ReportWritten { path, rows } => {
                log::info!("Report generated: {} ({} rows)", path.display(), rows);
            }
            AnalysisEvent::Summary(summary) => {
                log::info!("Analysis Summary:");
                log::info!("Total Errors: {}", summary.total);
                let by_priority: Vec<String> = summary
                    .by_priority
                    .iter()
                    .map(|(priority, count)| format!("{priority}: {count}"))
                    .collect();
                log::info!("Errors by Priority: {{{}}}", by_priority.join(", "));
                let by_component: Vec<String> = summary
                    .top_components()
                    .iter()
                    .map(|(name, count)| format!("{name}: {count}"))
                    .collect();
                log::info!("Errors by Component: {{{}}}", by_component.join(", "));
            }
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub events: Vec<AnalysisEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse_failures(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, AnalysisEvent::ParseFailed { .. }))
            .count()
    }
}

impl EventSink for MemorySink {
    fn record(&mut self, event: AnalysisEvent) {
        self.events.push(event);
    }
}
