//! Recovery engine: restores forward progress after a parse failure.
//!
//! [`RecoveryEngine::recover`] tries a fixed sequence of strategies and takes
//! the first that applies:
//!
//! 1. sync-point scan
//! 2. insertion of a missing delimiter
//! 3. deletion of one clearly-wrong token
//! 4. substitution of a misspelled keyword
//! 5. statement-boundary scan
//! 6. line skip (always applies)
//!
//! Unless the cursor is already at the end of the stream, the returned
//! position is strictly greater than the cursor, so a parse loop driven by
//! `recover` terminates on any finite token stream.

use serde::Serialize;

use crate::config::RecoveryLimits;
use crate::context::{Construct, ContextBuilder, ParseContext};
use crate::dictionary::KeywordDictionary;
use crate::error::{ErrorCode, ParseError, Severity};
use crate::suggest;
use crate::token::{Token, TokenKind, KNOWN_OPERATORS};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryStrategy {
    AtEnd,
    SyncPoint,
    InsertMissing,
    DeleteToken,
    Substitute,
    StatementBoundary,
    SkipLine,
}

/// The repair a strategy applied, when it applied one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartialTree {
    /// A virtual token the parser should treat as present.
    Inserted(Token),
    Replaced { original: Token, replacement: Token },
    Skipped(Vec<Token>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecoveryResult {
    pub recovered: bool,
    pub new_position: usize,
    pub errors: Vec<ParseError>,
    pub partial_tree: Option<PartialTree>,
    pub strategy: RecoveryStrategy,
}

impl RecoveryResult {
    fn new(
        strategy: RecoveryStrategy,
        new_position: usize,
        errors: Vec<ParseError>,
        partial_tree: Option<PartialTree>,
    ) -> Self {
        RecoveryResult {
            recovered: true,
            new_position,
            errors,
            partial_tree,
            strategy,
        }
    }
}

pub struct RecoveryEngine<'a> {
    tokens: &'a [Token],
    source: Option<&'a str>,
    dictionary: &'a KeywordDictionary,
    limits: RecoveryLimits,
}

impl<'a> RecoveryEngine<'a> {
    pub fn new(tokens: &'a [Token], dictionary: &'a KeywordDictionary) -> Self {
        RecoveryEngine {
            tokens,
            source: None,
            dictionary,
            limits: RecoveryLimits::default(),
        }
    }

    /// Source text used to fill `line_content` in error contexts.
    pub fn with_source(mut self, source: &'a str) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_limits(mut self, limits: RecoveryLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    pub fn dictionary(&self) -> &'a KeywordDictionary {
        self.dictionary
    }

    pub fn limits(&self) -> RecoveryLimits {
        self.limits
    }

    /// Context builder pre-loaded with this engine's tokens, source and window.
    pub fn context_at(&self, cursor: usize) -> ContextBuilder<'a> {
        ParseContext::builder(self.tokens, cursor)
            .source(self.source)
            .window(self.limits.context_window)
    }

    pub fn at_end(&self, cursor: usize) -> bool {
        self.tokens
            .get(cursor)
            .map_or(true, |t| t.kind == TokenKind::Eof)
    }

    // ── Bookkeeping ─────────────────────────────────────────────────

    /// Record a failure without moving the cursor. The code is
    /// `EXPECTED_TOKEN` when `expected` is non-empty, `UNEXPECTED_TOKEN`
    /// otherwise.
    pub fn record_error(
        &self,
        message: impl Into<String>,
        token: &Token,
        expected: &[TokenKind],
        context: Option<ParseContext>,
    ) -> ParseError {
        let code = if expected.is_empty() {
            ErrorCode::UnexpectedToken
        } else {
            ErrorCode::ExpectedToken
        };
        self.record_coded(code, Severity::Error, message, token, expected, context)
    }

    pub fn record_coded(
        &self,
        code: ErrorCode,
        severity: Severity,
        message: impl Into<String>,
        token: &Token,
        expected: &[TokenKind],
        context: Option<ParseContext>,
    ) -> ParseError {
        self.build_error(code, severity, message.into(), token, expected, context, None)
    }

    /// Record a `POSSIBLE_MISSPELLING` warning whose first suggestion is
    /// "Did you mean '<replacement>'?".
    pub fn record_misspelling(
        &self,
        token: &Token,
        replacement: &str,
        context: Option<ParseContext>,
    ) -> ParseError {
        let hint = suggest::did_you_mean(replacement);
        self.build_error(
            ErrorCode::PossibleMisspelling,
            Severity::Warning,
            format!("Unknown word '{}'. {}", token.text, hint),
            token,
            &[],
            context,
            Some(hint),
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn build_error(
        &self,
        code: ErrorCode,
        severity: Severity,
        message: String,
        token: &Token,
        expected: &[TokenKind],
        context: Option<ParseContext>,
        lead: Option<String>,
    ) -> ParseError {
        let context = context.unwrap_or_else(|| {
            let cursor = self
                .tokens
                .iter()
                .position(|t| t == token)
                .unwrap_or(self.tokens.len());
            self.context_at(cursor).build()
        });

        let mut suggestions = Vec::new();
        if let Some(lead) = lead {
            suggestions.push(lead);
        }
        for s in suggest::suggestions_for(self.dictionary, token, expected, &context) {
            if !suggestions.contains(&s) {
                suggestions.push(s);
            }
        }
        // The generic fallback only makes sense on its own.
        if suggestions.len() > 1 {
            suggestions.retain(|s| s != suggest::GENERIC_SUGGESTION);
        }

        tracing::trace!(code = code.as_str(), %message, position = %token.position, "recorded parse error");

        ParseError {
            message,
            position: token.position,
            token: token.clone(),
            expected: expected.to_vec(),
            suggestions,
            severity,
            code,
            context,
        }
    }

    // ── Driver ──────────────────────────────────────────────────────

    /// Restore forward progress from `cursor`. Never fails.
    pub fn recover(&self, cursor: usize, context: Option<&ParseContext>) -> RecoveryResult {
        if self.at_end(cursor) {
            return RecoveryResult::new(RecoveryStrategy::AtEnd, cursor, Vec::new(), None);
        }

        let context = match context {
            Some(ctx) => ctx.clone(),
            None => self.context_at(cursor).build(),
        };

        let result = self
            .sync_point(cursor)
            .or_else(|| self.insert_missing(cursor, &context))
            .or_else(|| self.delete_token(cursor, &context))
            .or_else(|| self.substitute(cursor, &context))
            .or_else(|| self.statement_boundary(cursor))
            .unwrap_or_else(|| self.skip_line(cursor, &context));

        tracing::debug!(
            cursor,
            new_position = result.new_position,
            strategy = ?result.strategy,
            errors = result.errors.len(),
            "recovered"
        );
        result
    }

    // ── Strategies ──────────────────────────────────────────────────

    /// Nearest synchronization token after the cursor, within the lookahead.
    pub fn sync_point(&self, cursor: usize) -> Option<RecoveryResult> {
        let end = cursor
            .saturating_add(1)
            .saturating_add(self.limits.sync_lookahead)
            .min(self.tokens.len());
        for index in cursor + 1..end {
            let kind = self.tokens[index].kind;
            if kind == TokenKind::Eof {
                return None;
            }
            if kind.is_sync_point() {
                return Some(RecoveryResult::new(
                    RecoveryStrategy::SyncPoint,
                    index,
                    Vec::new(),
                    None,
                ));
            }
        }
        None
    }

    /// Report a missing delimiter and treat it as inserted.
    pub fn insert_missing(&self, cursor: usize, context: &ParseContext) -> Option<RecoveryResult> {
        let error = self.missing_delimiter(cursor, context)?;
        let inserted = match error.expected.first() {
            Some(TokenKind::LBrace) => Token::new(TokenKind::LBrace, "{", 0, 0),
            _ => Token::new(TokenKind::Then, "then", 0, 0),
        };
        let inserted = Token {
            position: error.position,
            ..inserted
        };
        Some(RecoveryResult::new(
            RecoveryStrategy::InsertMissing,
            cursor + 1,
            vec![error],
            Some(PartialTree::Inserted(inserted)),
        ))
    }

    /// Detect a known missing-delimiter shape for the current construct:
    /// a `function`/`component` header with no `{` since its keyword, or a
    /// `when` condition with no `then`.
    pub fn missing_delimiter(&self, cursor: usize, context: &ParseContext) -> Option<ParseError> {
        let token = self.tokens.get(cursor)?;
        let construct = context.current_construct;
        let (opener, delimiter, code) = match construct {
            Construct::Function => (TokenKind::Function, TokenKind::LBrace, ErrorCode::MissingOpenBrace),
            Construct::Component => (TokenKind::Component, TokenKind::LBrace, ErrorCode::MissingOpenBrace),
            Construct::When => (TokenKind::When, TokenKind::Then, ErrorCode::MissingToken),
            _ => return None,
        };
        if token.kind == delimiter {
            return None;
        }

        let start = cursor.saturating_sub(self.limits.insertion_lookbehind);
        let window = &self.tokens[start..=cursor];
        let opened_at = window.iter().rposition(|t| t.kind == opener)?;
        if window[opened_at..].iter().any(|t| t.kind == delimiter) {
            return None;
        }

        let message = match construct {
            Construct::When => "Missing 'then' after when condition".to_owned(),
            _ => format!("Missing '{{' after {} name", construct.name()),
        };
        Some(self.record_coded(
            code,
            Severity::Error,
            message,
            token,
            &[delimiter],
            Some(context.clone()),
        ))
    }

    /// Skip exactly one token whose shape is clearly wrong here.
    pub fn delete_token(&self, cursor: usize, context: &ParseContext) -> Option<RecoveryResult> {
        let token = self.tokens.get(cursor)?;
        let next = self.tokens.get(cursor + 1);

        let wrong = match token.kind {
            TokenKind::Symbol => !KNOWN_OPERATORS.contains(&token.text.as_str()),
            kind if kind.is_punctuation() => next.is_some_and(|n| n.kind == kind),
            kind if kind.is_literal() => !context.current_construct.accepts_literals(),
            _ => false,
        };
        if !wrong {
            return None;
        }

        let error = self.record_coded(
            ErrorCode::UnexpectedToken,
            Severity::Error,
            format!("Unexpected token '{}'", token.display_text()),
            token,
            &[],
            Some(context.clone()),
        );
        Some(RecoveryResult::new(
            RecoveryStrategy::DeleteToken,
            cursor + 1,
            vec![error],
            Some(PartialTree::Skipped(vec![token.clone()])),
        ))
    }

    /// Replace a word within edit distance of a keyword and advance past it.
    pub fn substitute(&self, cursor: usize, context: &ParseContext) -> Option<RecoveryResult> {
        let token = self.tokens.get(cursor)?;
        if token.kind != TokenKind::Text {
            return None;
        }
        let correction = self
            .dictionary
            .correction(&token.text, self.limits.max_edit_distance)?;

        let error = self.record_misspelling(token, correction.keyword, Some(context.clone()));
        let replacement = Token {
            kind: TokenKind::keyword(correction.keyword).unwrap_or(TokenKind::Text),
            text: correction.keyword.to_owned(),
            position: token.position,
        };
        Some(RecoveryResult::new(
            RecoveryStrategy::Substitute,
            cursor + 1,
            vec![error],
            Some(PartialTree::Replaced {
                original: token.clone(),
                replacement,
            }),
        ))
    }

    /// Next newline, `;` or synchronization token, however far away.
    pub fn statement_boundary(&self, cursor: usize) -> Option<RecoveryResult> {
        self.tokens
            .iter()
            .enumerate()
            .skip(cursor + 1)
            .take_while(|(_, t)| t.kind != TokenKind::Eof)
            .find(|(_, t)| t.kind == TokenKind::Semicolon || t.kind.is_sync_point())
            .map(|(index, _)| {
                RecoveryResult::new(RecoveryStrategy::StatementBoundary, index, Vec::new(), None)
            })
    }

    /// Advance to the first token of the next source line, or to the end.
    pub fn skip_line(&self, cursor: usize, context: &ParseContext) -> RecoveryResult {
        let Some(token) = self.tokens.get(cursor) else {
            return RecoveryResult::new(RecoveryStrategy::AtEnd, cursor, Vec::new(), None);
        };
        let line = token.position.line;
        let mut index = cursor + 1;
        while let Some(t) = self.tokens.get(index) {
            if t.kind == TokenKind::Eof || t.position.line != line {
                break;
            }
            index += 1;
        }

        let skipped = self.tokens[cursor..index].to_vec();
        let error = self.record_coded(
            ErrorCode::LineSkipped,
            Severity::Warning,
            format!("Skipped the rest of line {} to continue parsing", line),
            token,
            &[],
            Some(context.clone()),
        );
        RecoveryResult::new(
            RecoveryStrategy::SkipLine,
            index,
            vec![error],
            Some(PartialTree::Skipped(skipped)),
        )
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
