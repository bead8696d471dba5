//! Whole-pipeline properties over arbitrary, mostly malformed Sun input.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use proptest::prelude::*;
use sun_core::{analyze, EngineConfig, ParseOutput, SunFrontend, TokenStream};

/// Generous wall-clock bound for one analysis of a short generated input.
const ANALYSIS_LIMIT: Duration = Duration::from_secs(5);

/// Fragments that combine into plausible and implausible Sun source.
const FRAGMENTS: &[&str] = &[
    "function", "fucntion", "component", "compnent", "when", "wehn", "then", "else", "let",
    "state", "return", "render", "import", "export", "@use", "@clinet", "foo", "Bar", "42",
    "\"str\"", "'open", "{", "}", "(", ")", "[", "]", ",", ":", ".", "=", "==", "+", "&&",
    ";", "§", "/*", "// note", "\n", "\n", " ", " ",
];

/// Run the whole pipeline on a worker thread; a pass that never returns
/// fails the case instead of stalling the suite.
fn analyze_bounded(config: EngineConfig, src: &str) -> (TokenStream, ParseOutput) {
    let (tx, rx) = mpsc::channel();
    let owned = src.to_owned();
    thread::spawn(move || {
        let _ = tx.send(analyze(&SunFrontend::new(config), &owned));
    });
    match rx.recv_timeout(ANALYSIS_LIMIT) {
        Ok(result) => result.expect("terminated stream"),
        Err(_) => panic!("analysis did not terminate on {:?}", src),
    }
}

fn arb_source() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..60).prop_map(|parts| parts.join(" "))
}

proptest! {
    #[test]
    fn every_input_yields_a_best_effort_result(src in arb_source()) {
        let config = EngineConfig::default();
        let (stream, out) = analyze_bounded(config.clone(), &src);

        prop_assert!(out.errors.len() <= config.max_errors);
        let line_count = src.split('\n').count() as u32;
        for e in &out.errors {
            prop_assert!(!e.suggestions.is_empty(), "no suggestions for {:?}", e.message);
            prop_assert!(e.position.line >= 1 && e.position.line <= line_count);
            prop_assert!(e.position.column >= 1);
        }
        for e in &stream.errors {
            prop_assert!(!e.suggestions.is_empty());
            prop_assert!(e.position.line <= line_count);
        }
    }

    #[test]
    fn analysis_is_deterministic(src in arb_source()) {
        let (_, a) = analyze_bounded(EngineConfig::default(), &src);
        let (_, b) = analyze_bounded(EngineConfig::default(), &src);
        let messages = |errs: &[sun_core::ParseError]| -> Vec<String> {
            errs.iter().map(|e| e.message.clone()).collect()
        };
        prop_assert_eq!(messages(&a.errors), messages(&b.errors));
    }
}

#[test]
fn malformed_directive_arguments_terminate() {
    for src in ["@use )", "@use then", "@client else", "@use ]", "@clinet else ( ) then"] {
        let (_, out) = analyze_bounded(EngineConfig::default(), src);
        assert!(!out.errors.is_empty(), "no errors for {:?}", src);
    }
}

#[test]
fn empty_source_is_clean() {
    let (stream, out) = analyze(&SunFrontend::default(), "").unwrap();
    assert!(stream.errors.is_empty());
    assert!(out.errors.is_empty());
    assert!(out.tree.items.is_empty());
}
