//! JSON and CSV export of the aggregated reports.

use std::path::Path;

use serde::Serialize;

use crate::aggregator::{now_rfc3339, ErrorAggregator, ErrorReport, ErrorStatistics};
use crate::error::ExportError;
use crate::events::{ExportFormat, ReportEvent};

pub const CSV_HEADER: &str = "File,Type,Severity,Line,Column,Message,ErrorCode,Suggestions";

/// Written instead of a header-only file when there are no errors.
pub const CSV_NO_ERRORS: &str = "No errors found";

#[derive(Serialize)]
struct JsonExport<'a> {
    timestamp: String,
    statistics: &'a ErrorStatistics,
    reports: Vec<&'a ErrorReport>,
}

/// Quote a CSV field, doubling embedded quotes.
pub fn csv_field(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

impl ErrorAggregator {
    pub fn to_json_string(&self) -> Result<String, ExportError> {
        let export = JsonExport {
            timestamp: now_rfc3339(),
            statistics: self.statistics(),
            reports: self.all_reports(),
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }

    pub fn to_csv_string(&self) -> String {
        let mut rows = Vec::new();
        for report in self.all_reports() {
            for e in &report.errors {
                let fields = [
                    report.file.clone(),
                    e.kind.as_str().to_owned(),
                    e.severity.as_str().to_owned(),
                    e.line.to_string(),
                    e.column.to_string(),
                    e.message.clone(),
                    e.code.as_str().to_owned(),
                    e.suggestions.join("; "),
                ];
                let quoted: Vec<String> = fields.iter().map(|f| csv_field(f)).collect();
                rows.push(quoted.join(","));
            }
        }

        if rows.is_empty() {
            return format!("{}\n", CSV_NO_ERRORS);
        }
        let mut out = String::from(CSV_HEADER);
        out.push('\n');
        for row in rows {
            out.push_str(&row);
            out.push('\n');
        }
        out
    }

    pub fn export_to_json(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json_string()?;
        write_export(path, &json)?;
        tracing::info!(path = %path.display(), "exported reports as JSON");
        self.notify(ReportEvent::ExportCompleted {
            path: path.to_path_buf(),
            format: ExportFormat::Json,
        });
        Ok(())
    }

    pub fn export_to_csv(&self, path: &Path) -> Result<(), ExportError> {
        write_export(path, &self.to_csv_string())?;
        tracing::info!(path = %path.display(), "exported reports as CSV");
        self.notify(ReportEvent::ExportCompleted {
            path: path.to_path_buf(),
            format: ExportFormat::Csv,
        });
        Ok(())
    }
}

fn write_export(path: &Path, contents: &str) -> Result<(), ExportError> {
    std::fs::write(path, contents).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_field_doubles_quotes() {
        assert_eq!(csv_field("a \"b\", c"), "\"a \"\"b\"\", c\"");
        assert_eq!(csv_field(""), "\"\"");
    }
}
