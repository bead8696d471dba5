//! Quick fixes derived from diagnostic codes, plus the two document-wide
//! source actions that are always offered.

use std::collections::HashMap;

use lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Diagnostic, NumberOrString, Position, Range,
    TextEdit, Uri, WorkspaceEdit,
};
use sun_core::suggest::extract_did_you_mean;
use sun_core::{ErrorCategory, ErrorCode};

pub const FORMAT_DOCUMENT: &str = "Format document";
pub const ORGANIZE_DIRECTIVES: &str = "Organize directives";

fn error_code(diagnostic: &Diagnostic) -> Option<ErrorCode> {
    match &diagnostic.code {
        Some(NumberOrString::String(s)) => s.parse().ok(),
        _ => None,
    }
}

/// First `'...'` quoted span in a message.
fn quoted_text(message: &str) -> Option<&str> {
    let start = message.find('\'')? + 1;
    let len = message[start..].find('\'')?;
    Some(&message[start..start + len])
}

fn single_edit(uri: &Uri, edit: TextEdit) -> WorkspaceEdit {
    WorkspaceEdit {
        changes: Some(HashMap::from([(uri.clone(), vec![edit])])),
        ..Default::default()
    }
}

fn quick_fix(uri: &Uri, title: String, diagnostic: &Diagnostic, edit: TextEdit) -> CodeAction {
    CodeAction {
        title,
        kind: Some(CodeActionKind::QUICKFIX),
        diagnostics: Some(vec![diagnostic.clone()]),
        edit: Some(single_edit(uri, edit)),
        is_preferred: Some(true),
        ..Default::default()
    }
}

/// The quick fix for one diagnostic, if its code has one.
pub fn fix_for(uri: &Uri, diagnostic: &Diagnostic) -> Option<CodeAction> {
    let code = error_code(diagnostic)?;
    let range = diagnostic.range;
    match code.category() {
        ErrorCategory::Missing => {
            let missing = quoted_text(&diagnostic.message)?;
            let edit = TextEdit::new(Range::new(range.start, range.start), format!("{} ", missing));
            Some(quick_fix(
                uri,
                format!("Insert '{}'", missing),
                diagnostic,
                edit,
            ))
        }
        ErrorCategory::Misspelling => {
            let replacement = extract_did_you_mean(&diagnostic.message)?;
            let edit = TextEdit::new(range, replacement.to_string());
            Some(quick_fix(
                uri,
                format!("Replace with '{}'", replacement),
                diagnostic,
                edit,
            ))
        }
        ErrorCategory::Unexpected => Some(quick_fix(
            uri,
            "Remove unexpected token".to_string(),
            diagnostic,
            TextEdit::new(range, String::new()),
        )),
        _ => None,
    }
}

pub fn compute_code_actions(
    uri: &Uri,
    content: &str,
    diagnostics: &[Diagnostic],
) -> Vec<CodeActionOrCommand> {
    let mut actions: Vec<CodeActionOrCommand> = diagnostics
        .iter()
        .filter_map(|d| fix_for(uri, d))
        .map(CodeActionOrCommand::CodeAction)
        .collect();

    let whole = whole_document(content);
    actions.push(CodeActionOrCommand::CodeAction(CodeAction {
        title: FORMAT_DOCUMENT.to_string(),
        kind: Some(CodeActionKind::SOURCE),
        edit: Some(single_edit(
            uri,
            TextEdit::new(whole, format_document(content)),
        )),
        ..Default::default()
    }));
    actions.push(CodeActionOrCommand::CodeAction(CodeAction {
        title: ORGANIZE_DIRECTIVES.to_string(),
        kind: Some(CodeActionKind::SOURCE_ORGANIZE_IMPORTS),
        edit: Some(single_edit(
            uri,
            TextEdit::new(whole, organize_directives(content)),
        )),
        ..Default::default()
    }));
    actions
}

// ── Document-wide rewrites ───────────────────────────────────────────

fn whole_document(content: &str) -> Range {
    let last_line = content.split('\n').count().saturating_sub(1);
    let last_len = content
        .rsplit('\n')
        .next()
        .map(|l| l.encode_utf16().count())
        .unwrap_or(0);
    Range::new(
        Position::new(0, 0),
        Position::new(last_line as u32, last_len as u32),
    )
}

/// Strip trailing whitespace and collapse runs of blank lines.
pub fn format_document(content: &str) -> String {
    let mut out = String::with_capacity(content.len());
    let mut blank_run = 0;
    for line in content.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }
    let trimmed = out.trim_end_matches('\n').len();
    out.truncate(trimmed);
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Hoist `@directive` lines to the top, sorted and de-duplicated.
pub fn organize_directives(content: &str) -> String {
    let mut directives: Vec<&str> = Vec::new();
    let mut rest: Vec<&str> = Vec::new();
    for line in content.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with('@') {
            directives.push(trimmed);
        } else {
            rest.push(line);
        }
    }
    directives.sort_unstable();
    directives.dedup();

    let body_start = rest
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(rest.len());
    let body = &rest[body_start..];

    let mut out = String::new();
    for d in &directives {
        out.push_str(d);
        out.push('\n');
    }
    if !directives.is_empty() && !body.is_empty() {
        out.push('\n');
    }
    for line in body {
        out.push_str(line);
        out.push('\n');
    }
    out
}
