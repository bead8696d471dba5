//! Document service tests: lifecycle, re-validation, failure containment
//! and the query providers, driven through the public API (not via the
//! LSP protocol).

use std::sync::{Arc, Mutex};

use lsp_types::{CodeActionOrCommand, HoverContents, Position, Range, Uri};
use sun_core::{
    EngineConfig, ErrorCode, Frontend, FrontendError, KeywordDictionary, ParseOutput, SunFrontend,
    TokenStream,
};
use sun_lsp::{DocumentService, ServiceEvent, SERVICE_SOURCE};
use sun_report::{DiagnosticPosition, DiagnosticSeverity, ErrorAggregator};

const URI: &str = "file:///project/app.sun";

fn service() -> DocumentService {
    DocumentService::from_config(EngineConfig::default())
}

fn uri() -> Uri {
    URI.parse::<Uri>().expect("URI parse")
}

// ──────────────────────────────────────────────
// Lifecycle
// ──────────────────────────────────────────────

#[test]
fn clean_document_has_no_diagnostics() {
    let mut svc = service();
    let diags = svc.open(URI, "sun", 1, "component App {\n  render x\n}\n".into());
    assert!(diags.is_empty());
    assert_eq!(svc.aggregator().statistics().total_files, 1);
}

#[test]
fn change_replaces_diagnostics_and_report() {
    let mut svc = service();
    let first = svc
        .open(URI, "sun", 1, "let = 1\nlet = 2\nlet = 3\n".into())
        .len();
    assert_eq!(first, 3);
    assert_eq!(svc.aggregator().statistics().total_errors, 3);

    let diags = svc.change(URI, 2, "let = 1\n".into()).unwrap();
    assert_eq!(diags.len(), 1);
    assert_eq!(svc.aggregator().statistics().total_errors, 1);
    assert_eq!(svc.document(URI).unwrap().version, 2);
}

#[test]
fn stale_change_is_ignored() {
    let mut svc = service();
    svc.open(URI, "sun", 5, "let a = 1\n".into());
    assert!(svc.change(URI, 4, "let = \n".into()).is_none());
    assert!(svc.diagnostics(URI).is_empty());
    assert_eq!(svc.document(URI).unwrap().text, "let a = 1\n");
}

#[test]
fn close_discards_diagnostics_and_report() {
    let mut svc = service();
    svc.open(URI, "sun", 1, "let = 1\n".into());
    assert!(svc.close(URI).is_empty());
    assert!(svc.document(URI).is_none());
    assert!(svc.diagnostics(URI).is_empty());
    assert_eq!(svc.aggregator().statistics().total_errors, 0);
    assert!(svc.change(URI, 2, "let a = 1".into()).is_none());
}

#[test]
fn observers_see_lifecycle_in_order() {
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let mut svc = service().with_observer(move |e: &ServiceEvent| sink.lock().unwrap().push(e.clone()));

    svc.open(URI, "sun", 1, "let = 1\n".into());
    svc.change(URI, 2, "let a = 1\n".into());
    svc.close(URI);

    let events = events.lock().unwrap();
    assert_eq!(
        *events,
        vec![
            ServiceEvent::DocumentOpened { uri: URI.into(), version: 1 },
            ServiceEvent::DiagnosticsUpdated { uri: URI.into(), version: 1, count: 1 },
            ServiceEvent::DocumentChanged { uri: URI.into(), version: 2 },
            ServiceEvent::DiagnosticsUpdated { uri: URI.into(), version: 2, count: 0 },
            ServiceEvent::DocumentClosed { uri: URI.into() },
        ]
    );
}

// ──────────────────────────────────────────────
// Failure containment
// ──────────────────────────────────────────────

struct BrokenFrontend {
    panic: bool,
    inner: SunFrontend,
}

impl Frontend for BrokenFrontend {
    fn tokenize(&self, source: &str) -> Result<TokenStream, FrontendError> {
        if self.panic {
            panic!("tokenizer exploded");
        }
        self.inner.tokenize(source)
    }

    fn parse(&self, _stream: &TokenStream, _source: &str) -> Result<ParseOutput, FrontendError> {
        Err(FrontendError::Other("parser unavailable".into()))
    }

    fn dictionary(&self) -> &KeywordDictionary {
        self.inner.dictionary()
    }

    fn config(&self) -> &EngineConfig {
        self.inner.config()
    }
}

fn broken_service(panic: bool) -> DocumentService {
    let config = EngineConfig::default();
    let frontend = BrokenFrontend {
        panic,
        inner: SunFrontend::new(config.clone()),
    };
    DocumentService::new(frontend, ErrorAggregator::new(&config))
}

fn assert_single_fault(diags: &[sun_report::DiagnosticInfo], detail: &str) {
    assert_eq!(diags.len(), 1);
    let d = &diags[0];
    assert_eq!(d.source, SERVICE_SOURCE);
    assert_eq!(d.severity, DiagnosticSeverity::Error);
    assert_eq!(d.range.start, DiagnosticPosition::new(0, 0));
    assert!(d.message.contains(detail), "message: {}", d.message);
}

#[test]
fn front_end_error_becomes_one_synthetic_diagnostic() {
    let mut svc = broken_service(false);
    let diags = svc.open(URI, "sun", 1, "let a = 1\n".into());
    assert_single_fault(diags, "parser unavailable");
    assert!(svc.aggregator().get_report(URI).is_none());
}

#[test]
fn panic_becomes_one_synthetic_diagnostic() {
    let mut svc = broken_service(true);
    let diags = svc.open(URI, "sun", 1, "let a = 1\n".into());
    assert_single_fault(diags, "tokenizer exploded");
    let diags = svc.change(URI, 2, "let b = 2\n".into()).unwrap();
    assert_single_fault(diags, "tokenizer exploded");
}

// ──────────────────────────────────────────────
// Queries
// ──────────────────────────────────────────────

#[test]
fn hover_over_when_covers_four_characters() {
    let mut svc = service();
    svc.open(URI, "sun", 1, "when x then y\n".into());
    let hover = svc.hover(URI, Position::new(0, 1)).expect("hover");
    assert_eq!(
        hover.range,
        Some(Range::new(Position::new(0, 0), Position::new(0, 4)))
    );
    match hover.contents {
        HoverContents::Markup(m) => assert!(m.value.contains("**when**")),
        other => panic!("unexpected hover contents: {:?}", other),
    }
    assert!(svc.hover(URI, Position::new(0, 5)).is_none());
    assert!(svc.hover("file:///not-open.sun", Position::new(0, 1)).is_none());
}

#[test]
fn completions_are_offered_without_a_document() {
    let svc = service();
    let labels: Vec<String> = svc.completions().into_iter().map(|c| c.label).collect();
    for expected in ["function", "component", "when", "@use", "@config"] {
        assert!(labels.iter().any(|l| l == expected), "missing {}", expected);
    }
}

fn titles(actions: &[CodeActionOrCommand]) -> Vec<String> {
    actions
        .iter()
        .map(|a| match a {
            CodeActionOrCommand::CodeAction(a) => a.title.clone(),
            CodeActionOrCommand::Command(c) => c.title.clone(),
        })
        .collect()
}

#[test]
fn misspelling_quick_fix_from_stored_diagnostics() {
    let mut svc = service();
    let diags = svc.open(URI, "sun", 1, "fucntion greet() {\n}\n".into());
    assert_eq!(diags[0].code, Some(ErrorCode::PossibleMisspelling));

    let everything = Range::new(Position::new(0, 0), Position::new(5, 0));
    let actions = svc.code_actions(&uri(), everything, &[]);
    assert_eq!(
        titles(&actions),
        vec![
            "Replace with 'function'".to_string(),
            "Format document".to_string(),
            "Organize directives".to_string(),
        ]
    );
}

#[test]
fn missing_brace_quick_fix_inserts_brace() {
    let mut svc = service();
    let diags = svc.open(URI, "sun", 1, "function greet()\n  return 1\n}\n".into());
    assert!(diags
        .iter()
        .any(|d| d.code == Some(ErrorCode::MissingOpenBrace)));

    let everything = Range::new(Position::new(0, 0), Position::new(5, 0));
    let actions = svc.code_actions(&uri(), everything, &[]);
    assert!(titles(&actions).contains(&"Insert '{'".to_string()));
}

#[test]
fn code_actions_for_unknown_document_are_empty() {
    let svc = service();
    let r = Range::new(Position::new(0, 0), Position::new(0, 1));
    assert!(svc.code_actions(&uri(), r, &[]).is_empty());
}

#[test]
fn published_columns_count_utf16_units() {
    let mut svc = service();
    // `)` is character 12 but UTF-16 unit 13: the emoji takes two units.
    let stored = svc.open(URI, "sun", 1, "let s = \"😀\" )\n".into()).to_vec();
    assert!(!stored.is_empty());

    let published = svc.lsp_diagnostics(&uri());
    assert_eq!(published.len(), stored.len());
    let closer = stored
        .iter()
        .position(|d| d.range.start == DiagnosticPosition::new(0, 12))
        .expect("diagnostic on the stray ')'");
    assert_eq!(published[closer].range.start, Position::new(0, 13));
}
