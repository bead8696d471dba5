//! `check`, `summary` and `export`: run the pipeline over files on disk and
//! feed the results into one aggregator.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process;

use serde::Serialize;
use sun_core::{analyze, EngineConfig, LexError, ParseError, Severity, SunFrontend};
use sun_report::{
    create_human_report, ErrorAggregator, ErrorReport, ErrorStatistics, ExportFormat, ReportStyle,
};

use crate::{report_error, OutputFormat};

/// One file after tokenizing and parsing.
struct CheckedFile {
    name: String,
    source: String,
    syntax: Vec<ParseError>,
    lexical: Vec<LexError>,
}

impl CheckedFile {
    fn has_errors(&self) -> bool {
        !self.lexical.is_empty() || self.syntax.iter().any(|e| e.severity == Severity::Error)
    }
}

/// Read and analyze every file, exiting on the first unreadable one.
fn check_files(
    files: &[PathBuf],
    config: &EngineConfig,
    output: OutputFormat,
    quiet: bool,
) -> Vec<CheckedFile> {
    let frontend = SunFrontend::new(config.clone());
    let mut checked = Vec::with_capacity(files.len());
    for path in files {
        let source = match std::fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                let msg = format!("cannot read {}: {}", path.display(), e);
                report_error(&msg, output, quiet);
                process::exit(1);
            }
        };
        let (stream, parsed) = match analyze(&frontend, &source) {
            Ok(r) => r,
            Err(e) => {
                report_error(&format!("{}: {}", path.display(), e), output, quiet);
                process::exit(1);
            }
        };
        tracing::debug!(
            file = %path.display(),
            lexical = stream.errors.len(),
            syntax = parsed.errors.len(),
            "checked"
        );
        checked.push(CheckedFile {
            name: path.display().to_string(),
            source,
            syntax: parsed.errors,
            lexical: stream.errors,
        });
    }
    checked
}

fn aggregate(checked: &[CheckedFile], config: &EngineConfig) -> ErrorAggregator {
    let mut aggregator = ErrorAggregator::new(config);
    for file in checked {
        aggregator.add_report(&file.name, &file.source, &file.syntax, &file.lexical);
    }
    aggregator
}

fn print_json<T: Serialize>(value: &T) {
    let json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|e| format!("{{\"error\": \"serialization: {}\"}}", e));
    println!("{}", json);
}

pub(crate) fn cmd_check(
    files: &[PathBuf],
    config: &EngineConfig,
    no_color: bool,
    output: OutputFormat,
    quiet: bool,
) {
    let checked = check_files(files, config, output, quiet);
    let failed = checked.iter().filter(|f| f.has_errors()).count();

    if !quiet {
        match output {
            OutputFormat::Json => {
                let aggregator = aggregate(&checked, config);
                let reports: Vec<&ErrorReport> = aggregator.all_reports();
                print_json(&reports);
            }
            OutputFormat::Text => {
                let style = if no_color || !std::io::stdout().is_terminal() {
                    ReportStyle::Plain
                } else {
                    ReportStyle::Ansi
                };
                for file in &checked {
                    println!("{}", file.name);
                    println!(
                        "{}",
                        create_human_report(&file.source, &file.syntax, &file.lexical, style)
                    );
                }
                if checked.len() > 1 {
                    println!("{} of {} files have errors", failed, checked.len());
                }
            }
        }
    }

    if failed > 0 {
        process::exit(1);
    }
}

#[derive(Serialize)]
struct SummaryOutput<'a> {
    statistics: &'a ErrorStatistics,
    recommendations: Vec<String>,
}

pub(crate) fn cmd_summary(
    files: &[PathBuf],
    config: &EngineConfig,
    output: OutputFormat,
    quiet: bool,
) {
    let checked = check_files(files, config, output, quiet);
    let aggregator = aggregate(&checked, config);
    if quiet {
        return;
    }
    match output {
        OutputFormat::Json => print_json(&SummaryOutput {
            statistics: aggregator.statistics(),
            recommendations: aggregator.summary_recommendations(),
        }),
        OutputFormat::Text => print!("{}", aggregator.generate_summary_report()),
    }
}

pub(crate) fn cmd_export(
    files: &[PathBuf],
    config: &EngineConfig,
    json: Option<&Path>,
    csv: Option<&Path>,
    output: OutputFormat,
    quiet: bool,
) {
    let checked = check_files(files, config, output, quiet);
    let aggregator = aggregate(&checked, config);
    let total = aggregator.statistics().total_errors;

    for (path, format) in [(json, ExportFormat::Json), (csv, ExportFormat::Csv)] {
        let Some(path) = path else { continue };
        let result = match format {
            ExportFormat::Json => aggregator.export_to_json(path),
            ExportFormat::Csv => aggregator.export_to_csv(path),
        };
        if let Err(e) = result {
            report_error(&e.to_string(), output, quiet);
            process::exit(1);
        }
        if !quiet {
            match output {
                OutputFormat::Text => {
                    println!("Exported {} errors to {}", total, path.display())
                }
                OutputFormat::Json => print_json(&serde_json::json!({
                    "exported": path.display().to_string(),
                    "totalErrors": total,
                })),
            }
        }
    }
}
