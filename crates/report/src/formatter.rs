//! Diagnostic formatter: raw lexical/syntax errors to located, snippeted
//! records, a human report, and editor diagnostics.
//!
//! Every function here is pure: identical input gives identical output.

use serde::Serialize;

use sun_core::context::source_line;
use sun_core::error::{ErrorCategory, ErrorCode, LexError, ParseError, Severity};
use sun_core::token::Position;

use crate::diagnostic::{
    DiagnosticInfo, DiagnosticPosition, DiagnosticRange, DiagnosticSeverity, DiagnosticTag,
    RelatedInformation,
};

/// The whole human report when there is nothing to report.
pub const SUCCESS_MESSAGE: &str = "No syntax errors found.";

pub const CLOSING_TIP: &str =
    "Tip: later errors are often caused by earlier ones. Fix the first error and run the check again.";

const GENERIC_RECOMMENDATIONS: [&str; 2] = [
    "Review the reported lines against the Sun syntax reference.",
    "Fix errors from the top of the file down and re-run the check after each fix.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Lexical,
    Syntax,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Lexical => "lexical",
            ErrorKind::Syntax => "syntax",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedError {
    pub kind: ErrorKind,
    pub code: ErrorCode,
    pub severity: Severity,
    pub message: String,
    pub position: Position,
    /// "line X, column Y"
    pub location: String,
    /// Source line plus a caret line; empty when the line does not exist.
    pub snippet: String,
    pub suggestions: Vec<String>,
}

/// Output styling for [`create_human_report`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportStyle {
    /// ANSI colors for terminals.
    Ansi,
    Plain,
}

// ── Formatting ───────────────────────────────────────────────────────

pub fn format_syntax_errors(source: &str, errors: &[ParseError]) -> Vec<FormattedError> {
    errors
        .iter()
        .map(|e| FormattedError {
            kind: ErrorKind::Syntax,
            code: e.code,
            severity: e.severity,
            message: e.message.clone(),
            position: e.position,
            location: e.position.to_string(),
            snippet: snippet(source, e.position),
            suggestions: e.suggestions.clone(),
        })
        .collect()
}

pub fn format_lexical_errors(source: &str, errors: &[LexError]) -> Vec<FormattedError> {
    errors
        .iter()
        .map(|e| FormattedError {
            kind: ErrorKind::Lexical,
            code: e.code,
            severity: Severity::Error,
            message: e.message.clone(),
            position: e.position,
            location: e.position.to_string(),
            snippet: snippet(source, e.position),
            suggestions: e.suggestions.clone(),
        })
        .collect()
}

/// The source line at `position` followed by a caret under its column.
pub fn snippet(source: &str, position: Position) -> String {
    match source_line(source, position.line) {
        Some(line) => format!(
            "{}\n{}^",
            line,
            " ".repeat(position.column.saturating_sub(1) as usize)
        ),
        None => String::new(),
    }
}

// ── Recommendations ──────────────────────────────────────────────────

/// Fixed advice triggered by the kinds of errors present. Empty when no
/// pattern matches.
pub fn triggered_recommendations(
    syntax: &[ParseError],
    lexical: &[LexError],
) -> Vec<&'static str> {
    let mut out = Vec::new();

    let character_trouble = lexical.iter().any(|e| {
        let msg = e.message.to_lowercase();
        msg.contains("character") || msg.contains("encoding")
    });
    if character_trouble {
        out.push("Save the file as UTF-8 and remove stray or invisible characters.");
    }

    let categories: Vec<ErrorCategory> = syntax.iter().map(|e| e.code.category()).collect();
    if categories
        .iter()
        .any(|c| matches!(c, ErrorCategory::Expected | ErrorCategory::Missing))
    {
        out.push("Check for missing braces, parentheses and keywords around the reported positions.");
    }
    if categories.contains(&ErrorCategory::Unexpected) {
        out.push("Remove stray tokens and punctuation the parser did not expect.");
    }
    if categories.contains(&ErrorCategory::Misspelling) {
        out.push("Check keyword spelling; suggested corrections are listed with each error.");
    }
    out
}

/// Triggered recommendations, or the two generic ones when none trigger.
pub fn recommendations(syntax: &[ParseError], lexical: &[LexError]) -> Vec<&'static str> {
    let triggered = triggered_recommendations(syntax, lexical);
    if triggered.is_empty() {
        GENERIC_RECOMMENDATIONS.to_vec()
    } else {
        triggered
    }
}

// ── Human report ─────────────────────────────────────────────────────

struct Palette {
    bold: &'static str,
    red: &'static str,
    yellow: &'static str,
    cyan: &'static str,
    green: &'static str,
    dim: &'static str,
    reset: &'static str,
}

const ANSI: Palette = Palette {
    bold: "\x1b[1m",
    red: "\x1b[31m",
    yellow: "\x1b[33m",
    cyan: "\x1b[36m",
    green: "\x1b[32m",
    dim: "\x1b[2m",
    reset: "\x1b[0m",
};

const PLAIN: Palette = Palette {
    bold: "",
    red: "",
    yellow: "",
    cyan: "",
    green: "",
    dim: "",
    reset: "",
};

pub fn create_human_report(
    source: &str,
    syntax: &[ParseError],
    lexical: &[LexError],
    style: ReportStyle,
) -> String {
    if syntax.is_empty() && lexical.is_empty() {
        return SUCCESS_MESSAGE.to_owned();
    }
    let p = match style {
        ReportStyle::Ansi => &ANSI,
        ReportStyle::Plain => &PLAIN,
    };

    let total = syntax.len() + lexical.len();
    let mut out = format!(
        "{}Found {} {} ({} lexical, {} syntax){}\n",
        p.bold,
        total,
        if total == 1 { "problem" } else { "problems" },
        lexical.len(),
        syntax.len(),
        p.reset
    );

    let sections = [
        ("Lexical errors", format_lexical_errors(source, lexical)),
        ("Syntax errors", format_syntax_errors(source, syntax)),
    ];
    for (title, errors) in &sections {
        if errors.is_empty() {
            continue;
        }
        out.push('\n');
        heading(&mut out, p, title);
        for (i, e) in errors.iter().enumerate() {
            render_error(&mut out, p, i + 1, e);
        }
    }

    out.push('\n');
    heading(&mut out, p, "Recommendations");
    for r in recommendations(syntax, lexical) {
        out.push_str(&format!("  - {}\n", r));
    }
    out.push('\n');
    out.push_str(&format!("{}{}{}\n", p.dim, CLOSING_TIP, p.reset));
    out
}

fn heading(out: &mut String, p: &Palette, title: &str) {
    out.push_str(&format!("{}{}{}\n", p.bold, title, p.reset));
    out.push_str(&"\u{2500}".repeat(title.chars().count()));
    out.push('\n');
}

fn render_error(out: &mut String, p: &Palette, n: usize, e: &FormattedError) {
    let color = match e.severity {
        Severity::Error => p.red,
        Severity::Warning => p.yellow,
        Severity::Info => p.cyan,
    };
    out.push_str(&format!(
        "{:>3}. {}{}[{}]{} {}\n",
        n,
        color,
        e.severity,
        e.code,
        p.reset,
        e.message
    ));
    out.push_str(&format!("     {}at {}{}\n", p.cyan, e.location, p.reset));
    for line in e.snippet.lines() {
        out.push_str(&format!("     | {}\n", line));
    }
    if !e.suggestions.is_empty() {
        out.push_str("     Suggestions:\n");
        for s in &e.suggestions {
            out.push_str(&format!("       {}-{} {}\n", p.green, p.reset, s));
        }
    }
}

// ── Editor diagnostics ───────────────────────────────────────────────

/// 0-based diagnostics for lexical then syntax errors.
pub fn create_diagnostics(
    source: &str,
    syntax: &[ParseError],
    lexical: &[LexError],
    source_name: &str,
) -> Vec<DiagnosticInfo> {
    let lexical_diags = lexical.iter().map(|e| DiagnosticInfo {
        range: DiagnosticRange::from_one_based(e.position.line, e.position.column, e.length),
        severity: DiagnosticSeverity::Error,
        message: e.message.clone(),
        source: source_name.to_owned(),
        code: Some(e.code),
        related_information: related(source, e.position, &e.suggestions),
        tags: Vec::new(),
    });

    let syntax_diags = syntax.iter().map(|e| DiagnosticInfo {
        range: DiagnosticRange::from_one_based(
            e.position.line,
            e.position.column,
            e.token.width(),
        ),
        severity: e.severity.into(),
        message: e.message.clone(),
        source: source_name.to_owned(),
        code: Some(e.code),
        related_information: related(source, e.position, &e.suggestions),
        tags: tags_for(e.code),
    });

    lexical_diags.chain(syntax_diags).collect()
}

fn tags_for(code: ErrorCode) -> Vec<DiagnosticTag> {
    match code {
        ErrorCode::UnexpectedToken | ErrorCode::LineSkipped => vec![DiagnosticTag::Unnecessary],
        _ => Vec::new(),
    }
}

/// Suggestions anchored to the whole of the error's line.
fn related(source: &str, position: Position, suggestions: &[String]) -> Vec<RelatedInformation> {
    let line = position.line.saturating_sub(1);
    let width = source_line(source, position.line)
        .map(|l| l.chars().count() as u32)
        .unwrap_or(0);
    let range = DiagnosticRange::new(
        DiagnosticPosition::new(line, 0),
        DiagnosticPosition::new(line, width),
    );
    suggestions
        .iter()
        .map(|s| RelatedInformation {
            range,
            message: s.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sun_core::{analyze, SunFrontend};

    fn errors(src: &str) -> (Vec<ParseError>, Vec<LexError>) {
        let (stream, out) = analyze(&SunFrontend::default(), src).unwrap();
        (out.errors, stream.errors)
    }

    #[test]
    fn empty_input_is_exactly_the_success_message() {
        assert_eq!(
            create_human_report("anything", &[], &[], ReportStyle::Ansi),
            SUCCESS_MESSAGE
        );
        assert_eq!(
            create_human_report("", &[], &[], ReportStyle::Plain),
            SUCCESS_MESSAGE
        );
    }

    #[test]
    fn snippet_places_caret_under_column() {
        let src = "let a = 1\nfunction foo bar\n";
        assert_eq!(
            snippet(src, Position::new(2, 14)),
            "function foo bar\n             ^"
        );
        assert_eq!(snippet(src, Position::new(9, 1)), "");
    }

    #[test]
    fn report_groups_lexical_before_syntax() {
        let src = "let x = § 1\nfunction foo()\n  return 1\n}\n";
        let (syntax, lexical) = errors(src);
        let report = create_human_report(src, &syntax, &lexical, ReportStyle::Plain);
        let lex_at = report.find("Lexical errors").unwrap();
        let syn_at = report.find("Syntax errors").unwrap();
        assert!(lex_at < syn_at);
        assert!(report.contains("[UNEXPECTED_CHARACTER]"));
        assert!(report.contains("Missing '{' after function name"));
        assert!(report.contains("Save the file as UTF-8"));
        assert!(report.contains("Check for missing braces"));
        assert!(report.trim_end().ends_with(CLOSING_TIP));
        assert!(!report.contains('\x1b'));
    }

    #[test]
    fn ansi_style_adds_color_codes() {
        let (syntax, lexical) = errors("let = 1\n");
        let report = create_human_report("let = 1\n", &syntax, &lexical, ReportStyle::Ansi);
        assert!(report.contains("\x1b[31m"));
    }

    #[test]
    fn generic_recommendations_when_nothing_triggers() {
        let (syntax, lexical) = errors("component App {\n  render x\n");
        let report = create_human_report("", &syntax, &lexical, ReportStyle::Plain);
        // MISSING_CLOSE_BRACE triggers the delimiter advice, so no fallback.
        assert!(!report.contains(GENERIC_RECOMMENDATIONS[0]));

        let (syntax, _) = errors("when then go\n");
        assert_eq!(syntax[0].code, ErrorCode::InvalidWhen);
        assert_eq!(recommendations(&syntax, &[]), GENERIC_RECOMMENDATIONS.to_vec());
    }

    #[test]
    fn diagnostics_are_zero_based_with_token_width() {
        let src = "function foo bar {\n}\n";
        let (syntax, lexical) = errors(src);
        let diags = create_diagnostics(src, &syntax, &lexical, "sun");
        let d = &diags[0];
        assert_eq!(d.code, Some(ErrorCode::MissingOpenBrace));
        assert_eq!(d.range.start, DiagnosticPosition::new(0, 13));
        assert_eq!(d.range.end, DiagnosticPosition::new(0, 16));
        assert_eq!(d.severity, DiagnosticSeverity::Error);
        assert_eq!(d.source, "sun");
        assert_eq!(d.related_information[0].range.end.character, 18);
    }

    #[test]
    fn lexical_diagnostics_are_always_errors() {
        let src = "let s = \"open\n";
        let (syntax, lexical) = errors(src);
        let diags = create_diagnostics(src, &syntax, &lexical, "sun");
        assert_eq!(diags[0].code, Some(ErrorCode::UnterminatedString));
        assert_eq!(diags[0].severity, DiagnosticSeverity::Error);
        assert_eq!(diags[0].range.end.character, 13);
    }

    #[test]
    fn misspelling_is_a_warning_and_skips_are_unnecessary() {
        let src = "fucntion f() {\n}\n";
        let (syntax, lexical) = errors(src);
        let diags = create_diagnostics(src, &syntax, &lexical, "sun");
        assert_eq!(diags[0].severity, DiagnosticSeverity::Warning);
        assert_eq!(tags_for(ErrorCode::LineSkipped), vec![DiagnosticTag::Unnecessary]);
    }

    #[test]
    fn formatting_is_pure() {
        let src = "let = 1\nwehn x then y\n";
        let (syntax, lexical) = errors(src);
        assert_eq!(
            format_syntax_errors(src, &syntax),
            format_syntax_errors(src, &syntax)
        );
        assert_eq!(
            create_diagnostics(src, &syntax, &lexical, "sun"),
            create_diagnostics(src, &syntax, &lexical, "sun")
        );
    }
}
