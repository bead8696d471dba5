//! Per-file report store with running cross-file statistics.
//!
//! There is one live report per file path. Adding a report for a path that
//! already has one first subtracts the old report's counts, so
//! `statistics.total_errors` always equals the sum over live reports.

use std::collections::BTreeMap;

use serde::Serialize;

use sun_core::config::EngineConfig;
use sun_core::error::{ErrorCode, LexError, ParseError, Severity};

use crate::diagnostic::DiagnosticInfo;
use crate::events::{ReportEvent, ReportObserver};
use crate::formatter::{self, ErrorKind, ReportStyle};

/// One individual error as stored in a report and exported as a CSV row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorRecord {
    pub kind: ErrorKind,
    pub severity: Severity,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub code: ErrorCode,
    pub suggestions: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    pub file: String,
    /// RFC 3339
    pub timestamp: String,
    pub total_errors: usize,
    pub lexical_errors: usize,
    pub syntax_errors: usize,
    pub diagnostics: Vec<DiagnosticInfo>,
    pub human_report: String,
    pub suggestions: Vec<String>,
    pub errors: Vec<ErrorRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorStatistics {
    pub total_files: usize,
    pub total_errors: usize,
    pub lexical_error_count: usize,
    pub syntax_error_count: usize,
    pub errors_by_code: BTreeMap<String, usize>,
    pub errors_by_file: BTreeMap<String, usize>,
}

impl ErrorStatistics {
    fn add(&mut self, report: &ErrorReport) {
        self.total_files += 1;
        self.total_errors += report.total_errors;
        self.lexical_error_count += report.lexical_errors;
        self.syntax_error_count += report.syntax_errors;
        for e in &report.errors {
            *self.errors_by_code.entry(e.code.as_str().to_owned()).or_insert(0) += 1;
        }
        if report.total_errors > 0 {
            *self.errors_by_file.entry(report.file.clone()).or_insert(0) += report.total_errors;
        }
    }

    fn subtract(&mut self, report: &ErrorReport) {
        self.total_files = self.total_files.saturating_sub(1);
        self.total_errors = self.total_errors.saturating_sub(report.total_errors);
        self.lexical_error_count = self.lexical_error_count.saturating_sub(report.lexical_errors);
        self.syntax_error_count = self.syntax_error_count.saturating_sub(report.syntax_errors);
        for e in &report.errors {
            decrement(&mut self.errors_by_code, e.code.as_str(), 1);
        }
        decrement(&mut self.errors_by_file, &report.file, report.total_errors);
    }
}

fn decrement(map: &mut BTreeMap<String, usize>, key: &str, by: usize) {
    if let Some(count) = map.get_mut(key) {
        *count = count.saturating_sub(by);
        if *count == 0 {
            map.remove(key);
        }
    }
}

pub(crate) fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string())
}

pub struct ErrorAggregator {
    reports: BTreeMap<String, ErrorReport>,
    statistics: ErrorStatistics,
    observers: Vec<Box<dyn ReportObserver>>,
    error_threshold: usize,
    source_name: String,
}

impl ErrorAggregator {
    pub fn new(config: &EngineConfig) -> Self {
        ErrorAggregator {
            reports: BTreeMap::new(),
            statistics: ErrorStatistics::default(),
            observers: Vec::new(),
            error_threshold: config.error_threshold,
            source_name: config.source_name.clone(),
        }
    }

    pub fn with_observer(mut self, observer: impl ReportObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    pub(crate) fn notify(&self, event: ReportEvent) {
        for o in &self.observers {
            o.on_report_event(&event);
        }
    }

    /// Build the report for `file_path` and make it the live one, replacing
    /// any earlier report for the same path.
    pub fn add_report(
        &mut self,
        file_path: &str,
        source: &str,
        syntax: &[ParseError],
        lexical: &[LexError],
    ) -> &ErrorReport {
        let report = self.build_report(file_path, source, syntax, lexical);
        tracing::debug!(
            file = file_path,
            total_errors = report.total_errors,
            "report added"
        );

        if let Some(previous) = self.reports.remove(file_path) {
            self.statistics.subtract(&previous);
        }
        self.statistics.add(&report);
        let total_errors = report.total_errors;
        self.reports.insert(file_path.to_owned(), report);

        self.notify(ReportEvent::ReportAdded {
            file: file_path.to_owned(),
            total_errors,
        });
        &self.reports[file_path]
    }

    fn build_report(
        &self,
        file_path: &str,
        source: &str,
        syntax: &[ParseError],
        lexical: &[LexError],
    ) -> ErrorReport {
        let diagnostics = formatter::create_diagnostics(source, syntax, lexical, &self.source_name);
        let human_report = formatter::create_human_report(source, syntax, lexical, ReportStyle::Plain);

        let mut suggestions: Vec<String> = Vec::new();
        let per_error = lexical
            .iter()
            .flat_map(|e| e.suggestions.iter())
            .chain(syntax.iter().flat_map(|e| e.suggestions.iter()));
        for s in per_error {
            if !suggestions.contains(s) {
                suggestions.push(s.clone());
            }
        }
        for extra in formatter::triggered_recommendations(syntax, lexical)
            .into_iter()
            .take(3)
        {
            if !suggestions.iter().any(|s| s == extra) {
                suggestions.push(extra.to_owned());
            }
        }

        let errors = lexical
            .iter()
            .map(|e| ErrorRecord {
                kind: ErrorKind::Lexical,
                severity: Severity::Error,
                line: e.position.line,
                column: e.position.column,
                message: e.message.clone(),
                code: e.code,
                suggestions: e.suggestions.clone(),
            })
            .chain(syntax.iter().map(|e| ErrorRecord {
                kind: ErrorKind::Syntax,
                severity: e.severity,
                line: e.position.line,
                column: e.position.column,
                message: e.message.clone(),
                code: e.code,
                suggestions: e.suggestions.clone(),
            }))
            .collect();

        ErrorReport {
            file: file_path.to_owned(),
            timestamp: now_rfc3339(),
            total_errors: syntax.len() + lexical.len(),
            lexical_errors: lexical.len(),
            syntax_errors: syntax.len(),
            diagnostics,
            human_report,
            suggestions,
            errors,
        }
    }

    pub fn get_report(&self, file_path: &str) -> Option<&ErrorReport> {
        self.reports.get(file_path)
    }

    /// Live reports ordered by file path.
    pub fn all_reports(&self) -> Vec<&ErrorReport> {
        self.reports.values().collect()
    }

    pub fn statistics(&self) -> &ErrorStatistics {
        &self.statistics
    }

    /// Drop a single file's report and its contribution to the statistics.
    pub fn remove_report(&mut self, file_path: &str) -> Option<ErrorReport> {
        let report = self.reports.remove(file_path)?;
        self.statistics.subtract(&report);
        self.notify(ReportEvent::ReportRemoved {
            file: file_path.to_owned(),
        });
        Some(report)
    }

    pub fn clear_reports(&mut self) {
        self.reports.clear();
        self.statistics = ErrorStatistics::default();
        self.notify(ReportEvent::ReportsCleared);
    }

    // ── Summary ──────────────────────────────────────────────────────

    pub fn generate_summary_report(&self) -> String {
        let stats = &self.statistics;
        let mut out = String::new();
        out.push_str("Error Summary\n");
        out.push_str("=============\n");
        out.push_str(&format!("Files analyzed: {}\n", stats.total_files));
        out.push_str(&format!(
            "Total errors: {} ({} lexical, {} syntax)\n",
            stats.total_errors, stats.lexical_error_count, stats.syntax_error_count
        ));

        if stats.total_errors == 0 {
            out.push_str("\nNo errors found.\n");
        } else {
            out.push_str("\nTop error codes:\n");
            for (i, (code, count)) in top_five(&stats.errors_by_code).into_iter().enumerate() {
                out.push_str(&format!("  {}. {}: {}\n", i + 1, code, count));
            }
            out.push_str("\nFiles with the most errors:\n");
            for (i, (file, count)) in top_five(&stats.errors_by_file).into_iter().enumerate() {
                out.push_str(&format!("  {}. {}: {}\n", i + 1, file, count));
            }
        }

        out.push_str("\nRecommendations:\n");
        for r in self.summary_recommendations() {
            out.push_str(&format!("  - {}\n", r));
        }
        out
    }

    /// Two to four recommendations from the error mix and volume.
    pub fn summary_recommendations(&self) -> Vec<String> {
        let stats = &self.statistics;
        let mut out = Vec::new();

        if stats.total_errors == 0 {
            out.push("All files parse cleanly; keep running the check as files change.".to_owned());
        } else if stats.lexical_error_count > stats.syntax_error_count {
            out.push(
                "Most errors are lexical: fix file encodings and stray characters first."
                    .to_owned(),
            );
        } else {
            out.push(
                "Most errors are syntactic: start with missing delimiters and misspelled keywords."
                    .to_owned(),
            );
        }

        if stats.total_errors > self.error_threshold {
            out.push(format!(
                "More than {} errors: work through one file at a time, starting with the file with the most errors.",
                self.error_threshold
            ));
        }

        if stats
            .errors_by_code
            .contains_key(ErrorCode::PossibleMisspelling.as_str())
        {
            out.push("Several keywords look misspelled; apply the suggested corrections.".to_owned());
        }

        out.push("Re-run the check after each fix; later errors often disappear with earlier ones.".to_owned());
        out
    }
}

/// Highest counts first; ties broken by key.
fn top_five(map: &BTreeMap<String, usize>) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = map.iter().map(|(k, v)| (k.as_str(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries.truncate(5);
    entries
}
