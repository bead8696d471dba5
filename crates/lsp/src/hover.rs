//! Hover information for keywords and directives.
//!
//! Scans outward from the cursor to the identifier boundaries on the
//! current line, then looks the word up in the keyword dictionary.
//! Scanning works on characters; the cursor and the returned range are in
//! UTF-16 code units.

use lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position, Range};
use sun_core::KeywordDictionary;

use crate::convert::{char_column, utf16_column};

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Character span `[start, end)` of the identifier touching `character`.
pub fn word_range(line: &str, character: usize) -> Option<(usize, usize)> {
    let chars: Vec<char> = line.chars().collect();
    if character > chars.len() {
        return None;
    }
    let mut start = character;
    while start > 0 && is_ident_char(chars[start - 1]) {
        start -= 1;
    }
    let mut end = character;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    if start == end {
        None
    } else {
        Some((start, end))
    }
}

/// Hover for the keyword or `@directive` under `position`, with a range
/// covering exactly the word.
pub fn compute_hover(
    dictionary: &KeywordDictionary,
    content: &str,
    position: Position,
) -> Option<Hover> {
    let line = content.lines().nth(position.line as usize)?;
    let (mut start, end) = word_range(line, char_column(line, position.character))?;
    let chars: Vec<char> = line.chars().collect();
    let word: String = chars[start..end].iter().collect();

    let markdown = if start > 0 && chars[start - 1] == '@' {
        start -= 1;
        let directive = format!("@{}", word);
        let desc = dictionary.directives.get(&directive)?;
        format!("**{}** -- {}", directive, desc)
    } else {
        dictionary.describe(&word)?.to_string()
    };

    let range = Range::new(
        Position::new(position.line, utf16_column(line, start as u32)),
        Position::new(position.line, utf16_column(line, end as u32)),
    );
    Some(make_hover(markdown, range))
}

/// Create a Hover with markdown content.
fn make_hover(markdown: String, range: Range) -> Hover {
    Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: markdown,
        }),
        range: Some(range),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hover_at(content: &str, line: u32, character: u32) -> Option<Hover> {
        compute_hover(
            KeywordDictionary::builtin(),
            content,
            Position::new(line, character),
        )
    }

    fn markdown(h: &Hover) -> &str {
        match &h.contents {
            HoverContents::Markup(m) => &m.value,
            _ => panic!("expected markup"),
        }
    }

    #[test]
    fn when_keyword_range_covers_the_word() {
        let h = hover_at("when x then y", 0, 2).unwrap();
        assert!(markdown(&h).starts_with("**when**"));
        assert_eq!(
            h.range,
            Some(Range::new(Position::new(0, 0), Position::new(0, 4)))
        );
    }

    #[test]
    fn non_keywords_and_whitespace_have_no_hover() {
        assert!(hover_at("when x then y", 0, 5).is_none());
        assert!(hover_at("let   a = 1", 0, 4).is_none());
        assert!(hover_at("when", 3, 0).is_none());
    }

    #[test]
    fn directives_include_the_marker() {
        let h = hover_at("  @client", 0, 5).unwrap();
        assert!(markdown(&h).starts_with("**@client**"));
        assert_eq!(
            h.range,
            Some(Range::new(Position::new(0, 2), Position::new(0, 9)))
        );
    }

    #[test]
    fn positions_after_astral_characters_are_utf16() {
        // The emoji is two UTF-16 units, so `when` starts at unit 5.
        let content = "\"😀\" when x then y";
        let h = hover_at(content, 0, 7).unwrap();
        assert!(markdown(&h).starts_with("**when**"));
        assert_eq!(
            h.range,
            Some(Range::new(Position::new(0, 5), Position::new(0, 9)))
        );
    }

    #[test]
    fn word_range_touching_end_of_word() {
        assert_eq!(word_range("then", 4), Some((0, 4)));
        assert_eq!(word_range("a b", 1), Some((0, 1)));
        assert_eq!(word_range("  ", 1), None);
        assert_eq!(word_range("ab", 9), None);
    }
}
