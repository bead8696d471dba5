//! `sun-report` diagnostics to `lsp-types` conversion.
//!
//! The engine counts columns in characters; LSP positions count UTF-16
//! code units. Every position crossing this boundary is re-measured
//! against the line it points into.

use lsp_types::{
    Diagnostic, DiagnosticRelatedInformation, DiagnosticSeverity, DiagnosticTag, Location,
    NumberOrString, Position, Range, Uri,
};
use sun_report::{self as report, DiagnosticInfo};

// ── UTF-16 columns ──────────────────────────────────────────────────

/// UTF-16 offset of character column `column` in `line`. Columns past the
/// end of the line are carried over one unit per character.
pub fn utf16_column(line: &str, column: u32) -> u32 {
    let mut units = 0;
    let mut seen = 0;
    for c in line.chars().take(column as usize) {
        units += c.len_utf16() as u32;
        seen += 1;
    }
    units + (column - seen)
}

/// Character column of UTF-16 offset `character` in `line`. An offset
/// inside a surrogate pair lands on the character it splits.
pub fn char_column(line: &str, character: u32) -> usize {
    let mut units = 0;
    let mut count = 0;
    for (i, c) in line.chars().enumerate() {
        let next = units + c.len_utf16() as u32;
        if next > character {
            return i;
        }
        units = next;
        count = i + 1;
    }
    count + (character - units) as usize
}

fn line_of(text: &str, line: u32) -> &str {
    text.lines().nth(line as usize).unwrap_or("")
}

pub fn position(text: &str, p: report::DiagnosticPosition) -> Position {
    Position::new(p.line, utf16_column(line_of(text, p.line), p.character))
}

pub fn range(text: &str, r: report::DiagnosticRange) -> Range {
    Range::new(position(text, r.start), position(text, r.end))
}

fn severity(s: report::DiagnosticSeverity) -> DiagnosticSeverity {
    match s {
        report::DiagnosticSeverity::Error => DiagnosticSeverity::ERROR,
        report::DiagnosticSeverity::Warning => DiagnosticSeverity::WARNING,
        report::DiagnosticSeverity::Information => DiagnosticSeverity::INFORMATION,
        report::DiagnosticSeverity::Hint => DiagnosticSeverity::HINT,
    }
}

fn tag(t: report::DiagnosticTag) -> DiagnosticTag {
    match t {
        report::DiagnosticTag::Unnecessary => DiagnosticTag::UNNECESSARY,
        report::DiagnosticTag::Deprecated => DiagnosticTag::DEPRECATED,
    }
}

/// Suggestions become related information pointing back into `uri`.
/// `text` is the document the diagnostic was computed from.
pub fn to_lsp_diagnostic(uri: &Uri, text: &str, info: &DiagnosticInfo) -> Diagnostic {
    let related: Vec<DiagnosticRelatedInformation> = info
        .related_information
        .iter()
        .map(|r| DiagnosticRelatedInformation {
            location: Location {
                uri: uri.clone(),
                range: range(text, r.range),
            },
            message: r.message.clone(),
        })
        .collect();

    Diagnostic {
        range: range(text, info.range),
        severity: Some(severity(info.severity)),
        code: info
            .code
            .map(|c| NumberOrString::String(c.as_str().to_string())),
        source: Some(info.source.clone()),
        message: info.message.clone(),
        related_information: if related.is_empty() {
            None
        } else {
            Some(related)
        },
        tags: if info.tags.is_empty() {
            None
        } else {
            Some(info.tags.iter().map(|t| tag(*t)).collect())
        },
        ..Default::default()
    }
}

pub fn to_lsp_diagnostics(uri: &Uri, text: &str, infos: &[DiagnosticInfo]) -> Vec<Diagnostic> {
    infos.iter().map(|i| to_lsp_diagnostic(uri, text, i)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sun_core::ErrorCode;
    use sun_report::{DiagnosticRange, RelatedInformation};

    #[test]
    fn fields_carry_over() {
        let uri: Uri = "file:///a.sun".parse().unwrap();
        let info = DiagnosticInfo {
            range: DiagnosticRange::from_one_based(2, 3, 4),
            severity: report::DiagnosticSeverity::Warning,
            message: "Unknown word 'fucntion'. Did you mean 'function'?".into(),
            source: "sun".into(),
            code: Some(ErrorCode::PossibleMisspelling),
            related_information: vec![RelatedInformation {
                range: DiagnosticRange::from_one_based(2, 1, 10),
                message: "Did you mean 'function'?".into(),
            }],
            tags: vec![report::DiagnosticTag::Unnecessary],
        };

        let d = to_lsp_diagnostic(&uri, "", &info);
        assert_eq!(d.range, Range::new(Position::new(1, 2), Position::new(1, 6)));
        assert_eq!(d.severity, Some(DiagnosticSeverity::WARNING));
        assert_eq!(
            d.code,
            Some(NumberOrString::String("POSSIBLE_MISSPELLING".into()))
        );
        let related = d.related_information.unwrap();
        assert_eq!(related[0].location.uri, uri);
        assert_eq!(d.tags, Some(vec![DiagnosticTag::UNNECESSARY]));
    }

    #[test]
    fn columns_after_astral_characters_count_utf16_units() {
        let uri: Uri = "file:///a.sun".parse().unwrap();
        let text = "let s = \"😀\" fucntion\n";
        let info = DiagnosticInfo {
            range: DiagnosticRange::from_one_based(1, 13, 8),
            severity: report::DiagnosticSeverity::Warning,
            message: "Unknown word 'fucntion'".into(),
            source: "sun".into(),
            code: Some(ErrorCode::PossibleMisspelling),
            related_information: Vec::new(),
            tags: Vec::new(),
        };

        let d = to_lsp_diagnostic(&uri, text, &info);
        assert_eq!(d.range, Range::new(Position::new(0, 13), Position::new(0, 21)));
    }

    #[test]
    fn column_conversions_agree() {
        let line = "a😀b";
        assert_eq!(utf16_column(line, 0), 0);
        assert_eq!(utf16_column(line, 1), 1);
        assert_eq!(utf16_column(line, 2), 3);
        assert_eq!(utf16_column(line, 5), 6);
        assert_eq!(char_column(line, 3), 2);
        assert_eq!(char_column(line, 2), 1);
        assert_eq!(char_column(line, 4), 3);
        assert_eq!(char_column(line, 6), 5);
        assert_eq!(utf16_column("plain", 3), 3);
    }
}
