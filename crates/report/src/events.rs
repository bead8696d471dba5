//! Observer contract for aggregator notifications.
//!
//! Observers are registered on the [`ErrorAggregator`](crate::ErrorAggregator)
//! when it is built, so every consumer is visible at the composition root.

use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEvent {
    ReportAdded { file: String, total_errors: usize },
    ReportRemoved { file: String },
    ReportsCleared,
    ExportCompleted { path: PathBuf, format: ExportFormat },
}

pub trait ReportObserver: Send {
    fn on_report_event(&self, event: &ReportEvent);
}

impl<F> ReportObserver for F
where
    F: Fn(&ReportEvent) + Send,
{
    fn on_report_event(&self, event: &ReportEvent) {
        self(event)
    }
}
