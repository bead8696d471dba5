//! Aggregator export and statistics tests over real Sun sources.

use std::sync::{Arc, Mutex};

use proptest::prelude::*;
use sun_core::{analyze, EngineConfig, LexError, ParseError, SunFrontend};
use sun_report::{ErrorAggregator, ExportFormat, ReportEvent, CSV_HEADER, CSV_NO_ERRORS};

fn errors(src: &str) -> (Vec<ParseError>, Vec<LexError>) {
    let (stream, out) = analyze(&SunFrontend::default(), src).unwrap();
    (out.errors, stream.errors)
}

fn add(agg: &mut ErrorAggregator, file: &str, src: &str) {
    let (s, l) = errors(src);
    agg.add_report(file, src, &s, &l);
}

/// Split one CSV row on commas outside quotes, undoing RFC 4180 quoting.
fn split_row(row: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = row.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => fields.push(std::mem::take(&mut field)),
            other => field.push(other),
        }
    }
    fields.push(field);
    fields
}

#[test]
fn csv_has_one_row_per_error() {
    let mut agg = ErrorAggregator::new(&EngineConfig::default());
    // 3 syntax errors
    add(&mut agg, "a.sun", "let = 1\nlet = 2\nlet = 3\n");
    // 1 lexical + 1 syntax error, with quotes in the message
    add(&mut agg, "b.sun", "let s = \"open\n@clinet\n");
    assert_eq!(agg.statistics().total_errors, 5);

    let csv = agg.to_csv_string();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], CSV_HEADER);
    for row in &lines[1..] {
        assert_eq!(split_row(row).len(), 8, "row: {}", row);
    }

    let lexical = lines
        .iter()
        .map(|r| split_row(r))
        .find(|f| f[1] == "lexical")
        .expect("lexical row");
    assert_eq!(lexical[0], "b.sun");
    assert_eq!(lexical[2], "error");
    assert_eq!(lexical[3], "1");
    assert_eq!(lexical[4], "9");
    assert_eq!(lexical[6], "UNTERMINATED_STRING");
    assert!(lexical[7].contains("closing quote (\")"));
}

#[test]
fn csv_without_errors_is_the_sentinel_line() {
    let mut agg = ErrorAggregator::new(&EngineConfig::default());
    add(&mut agg, "ok.sun", "render x\n");
    assert_eq!(agg.to_csv_string(), format!("{}\n", CSV_NO_ERRORS));
}

#[test]
fn exports_write_files_and_notify() {
    let dir = tempfile::tempdir().unwrap();
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut agg = ErrorAggregator::new(&EngineConfig::default())
        .with_observer(move |e: &ReportEvent| sink.lock().unwrap().push(e.clone()));
    add(&mut agg, "a.sun", "let = 1\n");

    let json_path = dir.path().join("report.json");
    agg.export_to_json(&json_path).unwrap();
    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert!(json["timestamp"].is_string());
    assert_eq!(json["statistics"]["totalErrors"], 1);
    assert_eq!(json["reports"][0]["file"], "a.sun");
    assert_eq!(json["reports"][0]["diagnostics"][0]["severity"], 1);

    let csv_path = dir.path().join("report.csv");
    agg.export_to_csv(&csv_path).unwrap();
    assert!(std::fs::read_to_string(&csv_path)
        .unwrap()
        .starts_with(CSV_HEADER));

    let formats: Vec<ExportFormat> = events
        .lock()
        .unwrap()
        .iter()
        .filter_map(|e| match e {
            ReportEvent::ExportCompleted { format, .. } => Some(*format),
            _ => None,
        })
        .collect();
    assert_eq!(formats, vec![ExportFormat::Json, ExportFormat::Csv]);
}

#[test]
fn export_to_missing_directory_is_an_io_error() {
    let agg = ErrorAggregator::new(&EngineConfig::default());
    let err = agg
        .export_to_json(std::path::Path::new("/definitely/missing/dir/out.json"))
        .unwrap_err();
    assert!(err.to_string().contains("out.json"));
}

// ── Statistics consistency ───────────────────────────────────────────

const SOURCES: &[&str] = &[
    "render x\n",
    "let = 1\n",
    "let = 1\nlet = 2\nlet = 3\n",
    "fucntion f() {\n}\n",
    "let x = § 1\nwhen a b\n",
    "component App {\n",
];

#[derive(Debug, Clone)]
enum Op {
    Add(usize, usize),
    Remove(usize),
    Clear,
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0..4usize, 0..SOURCES.len()).prop_map(|(f, s)| Op::Add(f, s)),
        2 => (0..4usize).prop_map(Op::Remove),
        1 => Just(Op::Clear),
    ]
}

proptest! {
    #[test]
    fn total_errors_matches_live_reports(ops in prop::collection::vec(arb_op(), 0..30)) {
        let mut agg = ErrorAggregator::new(&EngineConfig::default());
        for op in ops {
            match op {
                Op::Add(f, s) => add(&mut agg, &format!("f{}.sun", f), SOURCES[s]),
                Op::Remove(f) => {
                    agg.remove_report(&format!("f{}.sun", f));
                }
                Op::Clear => agg.clear_reports(),
            }
            let reports = agg.all_reports();
            let stats = agg.statistics();
            let sum: usize = reports.iter().map(|r| r.total_errors).sum();
            prop_assert_eq!(stats.total_errors, sum);
            prop_assert_eq!(stats.total_files, reports.len());
            prop_assert_eq!(
                stats.lexical_error_count + stats.syntax_error_count,
                stats.total_errors
            );
            let by_code: usize = stats.errors_by_code.values().sum();
            prop_assert_eq!(by_code, stats.total_errors);
        }
    }
}
