//! "Did you mean?" matching and suggestion text.
//!
//! Misspellings are resolved against the keyword dictionary with a bounded
//! Levenshtein distance. The explicit misspelling table is consulted first.

use crate::context::ParseContext;
use crate::dictionary::KeywordDictionary;
use crate::token::{Token, TokenKind};

/// Fallback used when no specific suggestion applies.
pub const GENERIC_SUGGESTION: &str = "Check the syntax near this location";

/// Levenshtein edit distance, two-row dynamic programming.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b_chars: Vec<char> = b.chars().collect();
    let b_len = b_chars.len();
    if a.is_empty() {
        return b_len;
    }
    if b_len == 0 {
        return a.chars().count();
    }

    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for (i, a_char) in a.chars().enumerate() {
        curr_row[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != *b_char);
            curr_row[j + 1] = (prev_row[j + 1] + 1)
                .min(curr_row[j] + 1)
                .min(prev_row[j] + cost);
        }
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Edit budget for a word: never more than `max`, and shrinking for short
/// words so `x` is not "corrected" to `if`.
pub fn effective_threshold(word: &str, max: usize) -> usize {
    let len = word.chars().count();
    max.min(len.saturating_sub(1) / 2)
}

/// Closest candidate within `threshold`, excluding exact matches.
/// Ties keep the earlier candidate.
pub fn closest<'a>(
    word: &str,
    candidates: impl IntoIterator<Item = &'a str>,
    threshold: usize,
) -> Option<(&'a str, usize)> {
    let mut best: Option<(&'a str, usize)> = None;
    for candidate in candidates {
        let distance = edit_distance(word, candidate);
        if distance == 0 || distance > threshold {
            continue;
        }
        match best {
            Some((_, d)) if d <= distance => {}
            _ => best = Some((candidate, distance)),
        }
    }
    best
}

pub fn did_you_mean(keyword: &str) -> String {
    format!("Did you mean '{}'?", keyword)
}

/// Pull the replacement out of a "Did you mean 'x'?" message.
pub fn extract_did_you_mean(message: &str) -> Option<&str> {
    let start = message.find("Did you mean '")? + "Did you mean '".len();
    let rest = &message[start..];
    let end = rest.find('\'')?;
    Some(&rest[..end])
}

/// Build the ordered, de-duplicated suggestion list for an error.
///
/// Sources, in order: one phrase per expected kind, the template for the
/// current construct, and keyword hints for fragments found in the token
/// text. Falls back to [`GENERIC_SUGGESTION`] so the list is never empty.
pub fn suggestions_for(
    dictionary: &KeywordDictionary,
    token: &Token,
    expected: &[TokenKind],
    context: &ParseContext,
) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |s: String| {
        if !out.contains(&s) {
            out.push(s);
        }
    };

    for kind in expected {
        if let Some(phrase) = dictionary.expected_phrase(*kind) {
            push(phrase.to_owned());
        }
    }

    if let Some(template) = dictionary.construct_template(context.current_construct) {
        push(template.to_owned());
    }

    if token.kind == TokenKind::Text {
        for keyword in dictionary.fragment_hints(&token.text) {
            push(format!("Did you mean to use the '{}' keyword?", keyword));
        }
    }

    if out.is_empty() {
        out.push(GENERIC_SUGGESTION.to_owned());
    }
    out
}
