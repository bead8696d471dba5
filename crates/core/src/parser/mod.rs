//! Recovering parser for Sun.
//!
//! Internal routines return `Result<_, ParseError>`. A failure is recorded
//! and the [`RecoveryEngine`] picks the cursor to resume from, so one bad
//! line never hides the rest of the file. Collection stops once
//! `max_errors` diagnostics have been recorded.

use crate::ast::{Item, Statement, SyntaxTree};
use crate::config::EngineConfig;
use crate::context::{Construct, ParseContext};
use crate::dictionary::KeywordDictionary;
use crate::error::{ErrorCode, FrontendError, ParseError, Severity};
use crate::recovery::{PartialTree, RecoveryEngine};
use crate::token::{Token, TokenKind};

mod expressions;
mod statements;

/// Best-effort tree plus every syntax error recorded while building it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParseOutput {
    pub tree: SyntaxTree,
    pub errors: Vec<ParseError>,
}

/// Parse a token stream that ends with `Eof`.
pub fn parse(
    tokens: &[Token],
    source: Option<&str>,
    dictionary: &KeywordDictionary,
    config: &EngineConfig,
) -> Result<ParseOutput, FrontendError> {
    match tokens.last() {
        None => return Err(FrontendError::EmptyTokenStream),
        Some(t) if t.kind != TokenKind::Eof => return Err(FrontendError::Unterminated),
        Some(_) => {}
    }

    let mut engine = RecoveryEngine::new(tokens, dictionary).with_limits(config.limits());
    if let Some(src) = source {
        engine = engine.with_source(src);
    }
    let mut p = Parser::new(tokens, engine, config.max_errors);
    let tree = p.parse_file();
    tracing::debug!(
        items = tree.items.len(),
        errors = p.errors.len(),
        halted = p.halted,
        "parsed"
    );
    Ok(ParseOutput {
        tree,
        errors: p.errors,
    })
}

// ──────────────────────────────────────────────
// Parser
// ──────────────────────────────────────────────

pub(crate) struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    engine: RecoveryEngine<'a>,
    errors: Vec<ParseError>,
    /// Ordered outer to inner; the last entry is the current construct.
    constructs: Vec<Construct>,
    max_errors: usize,
    halted: bool,
}

impl<'a> Parser<'a> {
    fn new(tokens: &'a [Token], engine: RecoveryEngine<'a>, max_errors: usize) -> Self {
        Parser {
            tokens,
            pos: 0,
            engine,
            errors: Vec::new(),
            constructs: Vec::new(),
            max_errors,
            halted: max_errors == 0,
        }
    }

    fn eof_index(&self) -> usize {
        self.tokens.len() - 1
    }

    fn cur(&self) -> &'a Token {
        &self.tokens[self.pos.min(self.eof_index())]
    }

    fn peek(&self) -> TokenKind {
        self.cur().kind
    }

    fn peek_next(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos + 1)
    }

    fn cur_line(&self) -> u32 {
        self.cur().position.line
    }

    fn advance(&mut self) -> &'a Token {
        let t = self.cur();
        if self.pos < self.eof_index() {
            self.pos += 1;
        }
        t
    }

    fn at(&self, kind: TokenKind) -> bool {
        self.peek() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> Result<&'a Token, ParseError> {
        if self.at(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(&[kind]))
        }
    }

    fn expect_name(&mut self) -> Result<String, ParseError> {
        Ok(self.expect(TokenKind::Text)?.text.clone())
    }

    fn skip_separators(&mut self) {
        while matches!(self.peek(), TokenKind::Newline | TokenKind::Semicolon) {
            self.advance();
        }
    }

    fn skip_newlines(&mut self) {
        while self.at(TokenKind::Newline) {
            self.advance();
        }
    }

    // -- Context and errors --------------------------------------

    fn current_construct(&self) -> Construct {
        self.constructs.last().copied().unwrap_or_default()
    }

    fn context(&self) -> ParseContext {
        let enclosing = self
            .constructs
            .len()
            .checked_sub(1)
            .map(|n| &self.constructs[..n])
            .unwrap_or_default();
        self.engine
            .context_at(self.pos)
            .construct(self.current_construct())
            .enclosing(enclosing.iter().copied())
            .build()
    }

    fn with_construct<T>(
        &mut self,
        construct: Construct,
        f: impl FnOnce(&mut Self) -> Result<T, ParseError>,
    ) -> Result<T, ParseError> {
        self.constructs.push(construct);
        let result = f(self);
        self.constructs.pop();
        result
    }

    /// Error for the current token. With `expected` kinds the message names
    /// them; otherwise the token itself is reported as unexpected.
    fn unexpected(&self, expected: &[TokenKind]) -> ParseError {
        let token = self.cur();
        let message = if expected.is_empty() {
            format!("Unexpected token '{}'", token.display_text())
        } else {
            let names: Vec<&str> = expected.iter().map(|k| k.describe()).collect();
            format!(
                "Expected {}, found '{}'",
                names.join(" or "),
                token.display_text()
            )
        };
        self.engine
            .record_error(message, token, expected, Some(self.context()))
    }

    fn coded(
        &self,
        code: ErrorCode,
        severity: Severity,
        message: impl Into<String>,
        expected: &[TokenKind],
    ) -> ParseError {
        self.engine.record_coded(
            code,
            severity,
            message,
            self.cur(),
            expected,
            Some(self.context()),
        )
    }

    fn push_error(&mut self, error: ParseError) {
        if self.halted {
            return;
        }
        self.errors.push(error);
        if self.errors.len() >= self.max_errors {
            tracing::debug!(max_errors = self.max_errors, "error limit reached");
            self.halted = true;
        }
    }

    /// Record `error` and move to wherever the recovery engine says parsing
    /// can resume. A recovery diagnostic for the same token replaces the
    /// generic one.
    fn recover_from(&mut self, error: ParseError) {
        if self.halted {
            return;
        }
        let result = self.engine.recover(self.pos, Some(&error.context));
        let specific = result
            .errors
            .first()
            .is_some_and(|e| e.position == error.position && e.code != ErrorCode::LineSkipped);
        if !specific {
            self.push_error(error);
        }
        for e in result.errors {
            self.push_error(e);
        }
        self.pos = result.new_position.min(self.eof_index());
    }

    /// Kind of the current token, reading a misspelled keyword that is
    /// directly followed by more words on its line as the keyword it
    /// resembles. The substitution is recorded as a warning.
    fn effective_kind(&mut self) -> TokenKind {
        let token = self.cur();
        if token.kind != TokenKind::Text {
            return token.kind;
        }
        let juxtaposed = self.peek_next().is_some_and(|next| {
            next.position.line == token.position.line
                && matches!(
                    next.kind,
                    TokenKind::Text | TokenKind::StringLit | TokenKind::Number
                )
        });
        if !juxtaposed {
            return token.kind;
        }
        let context = self.context();
        let Some(result) = self.engine.substitute(self.pos, &context) else {
            return token.kind;
        };
        let kind = match &result.partial_tree {
            Some(PartialTree::Replaced { replacement, .. }) => replacement.kind,
            _ => return token.kind,
        };
        if !starts_declaration(kind) {
            return token.kind;
        }
        for e in result.errors {
            self.push_error(e);
        }
        kind
    }

    // -- File ----------------------------------------------------

    fn parse_file(&mut self) -> SyntaxTree {
        let mut items = Vec::new();
        loop {
            self.skip_separators();
            if self.halted || self.at(TokenKind::Eof) {
                break;
            }
            let start = self.pos;
            match self.parse_item() {
                Ok(item) => items.push(item),
                Err(e) => self.recover_from(e),
            }
            if self.pos == start && !self.at(TokenKind::Eof) {
                self.advance();
            }
        }
        SyntaxTree { items }
    }

    fn parse_item(&mut self) -> Result<Item, ParseError> {
        match self.effective_kind() {
            TokenKind::Directive => self.parse_directive(),
            TokenKind::Function => self.parse_callable(Construct::Function),
            TokenKind::Component => self.parse_callable(Construct::Component),
            TokenKind::Import => self.parse_import(),
            TokenKind::Export => self.parse_export(),
            TokenKind::RBrace => {
                Err(self.coded(
                    ErrorCode::UnexpectedToken,
                    Severity::Error,
                    "Unexpected '}' with no open block",
                    &[],
                ))
            }
            kind => Ok(Item::Statement(self.parse_statement_as(kind)?)),
        }
    }

    fn parse_directive(&mut self) -> Result<Item, ParseError> {
        let line = self.cur_line();
        let context = self.context();
        let token = self.advance();
        let dictionary = self.engine.dictionary();
        if !dictionary.is_directive(&token.text) {
            let max = self.engine.limits().max_edit_distance;
            let error = match dictionary.closest_directive(&token.text, max) {
                Some(known) => self.engine.record_misspelling(token, known, Some(context)),
                None => self.engine.record_coded(
                    ErrorCode::UnknownDirective,
                    Severity::Warning,
                    format!("Unknown directive '{}'", token.text),
                    token,
                    &[],
                    Some(context),
                ),
            };
            self.push_error(error);
        }

        let args = self.with_construct(Construct::Directive, |p| {
            let mut args = Vec::new();
            while !p.at_statement_end() {
                let start = p.pos;
                args.push(p.expression()?);
                // `)`, `]`, `then` and `else` yield a missing expression
                // without consuming anything.
                if p.pos == start {
                    return Err(p.unexpected(&[]));
                }
                p.eat(TokenKind::Comma);
            }
            Ok(args)
        })?;
        self.end_statement()?;
        Ok(Item::Directive {
            name: token.text.clone(),
            args,
            line,
        })
    }

    /// `function name(params) { ... }` and `component Name(params) { ... }`.
    fn parse_callable(&mut self, construct: Construct) -> Result<Item, ParseError> {
        let line = self.cur_line();
        self.advance();
        self.with_construct(construct, |p| {
            if !p.at(TokenKind::Text) {
                let code = match construct {
                    Construct::Component => ErrorCode::InvalidComponent,
                    _ => ErrorCode::InvalidFunction,
                };
                return Err(p.coded(
                    code,
                    Severity::Error,
                    format!("Expected a name after '{}'", construct.name()),
                    &[TokenKind::Text],
                ));
            }
            let name = p.expect_name()?;
            let params = if p.at(TokenKind::LParen) {
                p.parse_params()?
            } else {
                Vec::new()
            };
            p.open_block()?;
            let body = p.parse_block_body(line)?;
            Ok(match construct {
                Construct::Component => Item::Component {
                    name,
                    params,
                    body,
                    line,
                },
                _ => Item::Function {
                    name,
                    params,
                    body,
                    line,
                },
            })
        })
    }

    fn parse_params(&mut self) -> Result<Vec<String>, ParseError> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RParen) {
                break;
            }
            params.push(self.expect_name()?);
            self.skip_newlines();
            if self.eat(TokenKind::Comma) {
                continue;
            }
            self.expect(TokenKind::RParen)?;
            break;
        }
        Ok(params)
    }

    fn parse_import(&mut self) -> Result<Item, ParseError> {
        let line = self.cur_line();
        self.advance();
        let path = match self.peek() {
            TokenKind::StringLit => unquote(&self.advance().text),
            TokenKind::Text => self.advance().text.clone(),
            _ => return Err(self.unexpected(&[TokenKind::StringLit])),
        };
        self.end_statement()?;
        Ok(Item::Import { path, line })
    }

    fn parse_export(&mut self) -> Result<Item, ParseError> {
        let line = self.cur_line();
        self.advance();
        let item = match self.effective_kind() {
            TokenKind::Function => self.parse_callable(Construct::Function)?,
            TokenKind::Component => self.parse_callable(Construct::Component)?,
            _ => return Err(self.unexpected(&[TokenKind::Function, TokenKind::Component])),
        };
        Ok(Item::Export {
            item: Box::new(item),
            line,
        })
    }

    // -- Blocks --------------------------------------------------

    /// Consume `{`, or report it missing and carry on as if it were there.
    fn open_block(&mut self) -> Result<(), ParseError> {
        if self.eat(TokenKind::LBrace) {
            return Ok(());
        }
        let context = self.context();
        match self.engine.missing_delimiter(self.pos, &context) {
            Some(error) => {
                self.push_error(error);
                Ok(())
            }
            None => Err(self.unexpected(&[TokenKind::LBrace])),
        }
    }

    /// Statements up to the closing `}` of a block opened on `line`.
    fn parse_block_body(&mut self, line: u32) -> Result<Vec<Statement>, ParseError> {
        self.with_construct(Construct::Block, |p| {
            let mut body = Vec::new();
            loop {
                p.skip_separators();
                if p.halted {
                    break;
                }
                match p.peek() {
                    TokenKind::RBrace => {
                        p.advance();
                        break;
                    }
                    TokenKind::Eof => {
                        let error = p.coded(
                            ErrorCode::MissingCloseBrace,
                            Severity::Error,
                            format!("Missing '}}' to close the block opened on line {}", line),
                            &[TokenKind::RBrace],
                        );
                        p.push_error(error);
                        break;
                    }
                    _ => {}
                }
                let start = p.pos;
                let stmt_line = p.cur_line();
                match p.parse_statement() {
                    Ok(stmt) => body.push(stmt),
                    Err(e) => {
                        p.recover_from(e);
                        body.push(Statement::Error { line: stmt_line });
                    }
                }
                if p.pos == start && !p.at(TokenKind::Eof) {
                    p.advance();
                }
            }
            Ok(body)
        })
    }

    /// Newline, `;`, `}` or end of input: a statement may stop here.
    fn at_statement_end(&self) -> bool {
        matches!(
            self.peek(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::RBrace | TokenKind::Eof
        )
    }

    fn end_statement(&self) -> Result<(), ParseError> {
        if self.at_statement_end() {
            Ok(())
        } else {
            Err(self.unexpected(&[TokenKind::Newline]))
        }
    }
}

/// Keywords that may begin a statement or declaration.
fn starts_declaration(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Function
            | TokenKind::Component
            | TokenKind::When
            | TokenKind::Let
            | TokenKind::State
            | TokenKind::Return
            | TokenKind::Render
            | TokenKind::Import
            | TokenKind::Export
    )
}

/// Strip the surrounding quotes from a string literal's source text.
pub(crate) fn unquote(text: &str) -> String {
    let mut chars = text.chars();
    let Some(quote) = chars.next() else {
        return String::new();
    };
    let inner = chars.as_str();
    inner.strip_suffix(quote).unwrap_or(inner).to_owned()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expr;
    use crate::lexer;

    fn parse_src(src: &str) -> ParseOutput {
        parse_with(src, &EngineConfig::default())
    }

    fn parse_with(src: &str, config: &EngineConfig) -> ParseOutput {
        let stream = lexer::tokenize(src);
        parse(&stream.tokens, Some(src), KeywordDictionary::builtin(), config)
            .expect("terminated stream")
    }

    fn codes(out: &ParseOutput) -> Vec<ErrorCode> {
        out.errors.iter().map(|e| e.code).collect()
    }

    #[test]
    fn valid_program_has_no_errors() {
        let src = r#"
@use "strict"
import "ui"

component Greeting(name) {
  state count = 0
  when count > 1 then render "many" else render name
  render name
}

export function add(a, b) {
  let total = a + b * 2
  return total
}
"#;
        let out = parse_src(src);
        assert!(out.errors.is_empty(), "unexpected errors: {:?}", out.errors);
        assert_eq!(out.tree.items.len(), 4);
        assert_eq!(out.tree.components().count(), 1);
        match &out.tree.items[3] {
            Item::Export { item, .. } => assert_eq!(item.name(), Some("add")),
            other => panic!("expected export, got {:?}", other),
        }
    }

    #[test]
    fn missing_open_brace_is_inserted() {
        let out = parse_src("function foo()\n  return 1\n}\n");
        assert_eq!(codes(&out), vec![ErrorCode::MissingOpenBrace]);
        assert_eq!(out.errors[0].message, "Missing '{' after function name");
        match &out.tree.items[0] {
            Item::Function { name, body, .. } => {
                assert_eq!(name, "foo");
                assert!(matches!(body[0], Statement::Return { .. }));
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn misspelled_keyword_is_parsed_as_keyword() {
        let out = parse_src("fucntion greet() {\n  return 1\n}\n");
        assert_eq!(codes(&out), vec![ErrorCode::PossibleMisspelling]);
        assert_eq!(out.errors[0].severity, Severity::Warning);
        assert!(out.errors[0].message.contains("Did you mean 'function'?"));
        assert_eq!(out.tree.functions().count(), 1);
    }

    #[test]
    fn missing_then_is_reported_and_branch_kept() {
        let out = parse_src("when ready render done\n");
        assert_eq!(codes(&out), vec![ErrorCode::MissingToken]);
        assert_eq!(out.errors[0].message, "Missing 'then' after when condition");
        match &out.tree.items[0] {
            Item::Statement(Statement::When { then, .. }) => {
                assert!(matches!(**then, Statement::Render { .. }))
            }
            other => panic!("expected when, got {:?}", other),
        }
    }

    #[test]
    fn unclosed_block_reports_missing_close_brace() {
        let out = parse_src("component App {\n  render x\n");
        assert_eq!(codes(&out), vec![ErrorCode::MissingCloseBrace]);
        assert!(out.errors[0].message.contains("line 1"));
    }

    #[test]
    fn errors_on_separate_lines_are_all_reported() {
        let src = "let = 1\nlet y = 2\nlet z 3\nrender y\n";
        let out = parse_src(src);
        let lines: Vec<u32> = out.errors.iter().map(|e| e.position.line).collect();
        assert_eq!(lines, vec![1, 3]);
        assert!(out
            .tree
            .items
            .iter()
            .any(|i| matches!(i, Item::Statement(Statement::Render { .. }))));
    }

    #[test]
    fn error_context_tracks_enclosing_constructs() {
        let out = parse_src("function f() {\n  let = 1\n}\n");
        let ctx = &out.errors[0].context;
        assert_eq!(ctx.current_construct, Construct::Block);
        assert_eq!(ctx.enclosing_constructs, vec![Construct::Function]);
        assert_eq!(ctx.line_content, "  let = 1");
    }

    #[test]
    fn unknown_directive_suggests_closest() {
        let out = parse_src("@clinet\n@bogus\n");
        assert_eq!(
            codes(&out),
            vec![ErrorCode::PossibleMisspelling, ErrorCode::UnknownDirective]
        );
        assert_eq!(out.errors[0].suggestions[0], "Did you mean '@client'?");
    }

    #[test]
    fn stray_closing_brace_is_reported() {
        let out = parse_src("}\nrender x\n");
        assert_eq!(codes(&out), vec![ErrorCode::UnexpectedToken]);
        assert_eq!(out.tree.items.len(), 1);
    }

    #[test]
    fn expression_precedence() {
        let out = parse_src("let v = a + b * c\n");
        match &out.tree.items[0] {
            Item::Statement(Statement::Let { value, .. }) => match value {
                Expr::Binary { op, rhs, .. } => {
                    assert_eq!(op, "+");
                    assert!(matches!(**rhs, Expr::Binary { ref op, .. } if op == "*"));
                }
                other => panic!("expected binary, got {:?}", other),
            },
            other => panic!("expected let, got {:?}", other),
        }
    }

    #[test]
    fn max_errors_limit_stops_collection() {
        let mut src = String::new();
        for _ in 0..20 {
            src.push_str("let = 1\n");
        }
        let config = EngineConfig {
            max_errors: 5,
            ..Default::default()
        };
        let out = parse_with(&src, &config);
        assert_eq!(out.errors.len(), 5);
    }

    #[test]
    fn unterminated_stream_is_a_frontend_fault() {
        let tokens = vec![Token::new(TokenKind::Text, "x", 1, 1)];
        let err = parse(
            &tokens,
            None,
            KeywordDictionary::builtin(),
            &EngineConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, FrontendError::Unterminated));
        assert!(matches!(
            parse(&[], None, KeywordDictionary::builtin(), &EngineConfig::default()),
            Err(FrontendError::EmptyTokenStream)
        ));
    }

    /// Parse on a worker thread so a parser that stops advancing fails the
    /// test instead of hanging it.
    fn parse_within(src: &str, limit: std::time::Duration) -> ParseOutput {
        let (tx, rx) = std::sync::mpsc::channel();
        let owned = src.to_owned();
        std::thread::spawn(move || {
            let _ = tx.send(parse_src(&owned));
        });
        rx.recv_timeout(limit)
            .unwrap_or_else(|_| panic!("parser did not terminate on {:?}", src))
    }

    #[test]
    fn directive_arguments_always_advance() {
        let limit = std::time::Duration::from_secs(5);
        for src in [
            "@use )\nrender x\n",
            "@use then\nrender x\n",
            "@use \"x\" )\nrender x\n",
            "@client else\nrender x\n",
            "@use ]\nrender x\n",
            "@clinet else ( ) then\nrender x\n",
        ] {
            let out = parse_within(src, limit);
            assert!(!out.errors.is_empty(), "no errors for {:?}", src);
            assert!(out.errors.len() < EngineConfig::default().max_errors);
            assert!(
                out.tree
                    .items
                    .iter()
                    .any(|i| matches!(i, Item::Statement(Statement::Render { .. }))),
                "line after {:?} was lost",
                src
            );
        }
    }

    #[test]
    fn directive_with_stray_closer_reports_the_closer() {
        let out = parse_src("@use \"x\" )\n");
        let closer = out
            .errors
            .iter()
            .find(|e| e.code == ErrorCode::UnexpectedToken)
            .expect("unexpected-token error");
        assert_eq!(closer.position.line, 1);
        assert_eq!(closer.position.column, 10);
    }

    #[test]
    fn unquote_strips_matching_quotes() {
        assert_eq!(unquote("\"ui\""), "ui");
        assert_eq!(unquote("'x'"), "x");
        assert_eq!(unquote("\"open"), "open");
    }
}
