//! Tokenizer for Sun source text.
//!
//! Never fails: malformed input becomes [`LexError`]s next to a best-effort
//! token stream that always ends with a single `Eof` token. Newlines are
//! significant and kept as tokens because they terminate statements.

use crate::error::{ErrorCode, LexError};
use crate::token::{Position, Token, TokenKind};

const OPERATOR_CHARS: &str = "+-*/%=!<>&|^~?";

const ZERO_WIDTH: &[char] = &['\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}'];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl TokenStream {
    pub fn is_terminated(&self) -> bool {
        self.tokens.last().map(|t| t.kind) == Some(TokenKind::Eof)
    }
}

pub fn tokenize(src: &str) -> TokenStream {
    let mut lx = Lexer::new(src);
    lx.run();
    TokenStream {
        tokens: lx.tokens,
        errors: lx.errors,
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: u32,
    column: u32,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl Lexer {
    fn new(src: &str) -> Self {
        let src = src.strip_prefix('\u{FEFF}').unwrap_or(src);
        Lexer {
            chars: src.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn here(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn text_from(&self, start: usize) -> String {
        self.chars[start..self.pos].iter().collect()
    }

    fn push(&mut self, kind: TokenKind, text: String, at: Position) {
        self.tokens.push(Token {
            kind,
            text,
            position: at,
        });
    }

    fn single(&mut self, kind: TokenKind) {
        let at = self.here();
        let start = self.pos;
        self.bump();
        let text = self.text_from(start);
        self.push(kind, text, at);
    }

    fn run(&mut self) {
        while let Some(c) = self.peek() {
            // Line comment
            if c == '/' && self.peek_at(1) == Some('/') {
                while self.peek().is_some_and(|c| c != '\n') {
                    self.bump();
                }
                continue;
            }

            // Block comment
            if c == '/' && self.peek_at(1) == Some('*') {
                self.block_comment();
                continue;
            }

            if c == '\n' {
                self.single(TokenKind::Newline);
                continue;
            }

            if c.is_whitespace() {
                self.bump();
                continue;
            }

            if c == '"' || c == '\'' {
                self.string(c);
                continue;
            }

            if c.is_ascii_digit() {
                self.number();
                continue;
            }

            if c.is_alphabetic() || c == '_' {
                self.word();
                continue;
            }

            let kind = match c {
                '{' => Some(TokenKind::LBrace),
                '}' => Some(TokenKind::RBrace),
                '(' => Some(TokenKind::LParen),
                ')' => Some(TokenKind::RParen),
                '[' => Some(TokenKind::LBracket),
                ']' => Some(TokenKind::RBracket),
                ',' => Some(TokenKind::Comma),
                ':' => Some(TokenKind::Colon),
                '.' => Some(TokenKind::Dot),
                ';' => Some(TokenKind::Semicolon),
                _ => None,
            };
            if let Some(kind) = kind {
                self.single(kind);
                continue;
            }

            if c == '@' && self.peek_at(1).is_some_and(|n| n.is_alphabetic() || n == '_') {
                self.directive();
                continue;
            }

            if OPERATOR_CHARS.contains(c) {
                self.operator();
                continue;
            }

            self.invalid(c);
        }

        let at = self.here();
        self.tokens.push(Token::eof(at));
    }

    fn block_comment(&mut self) {
        let at = self.here();
        self.bump();
        self.bump();
        loop {
            match self.peek() {
                None => {
                    self.errors.push(LexError::new(
                        ErrorCode::UnterminatedComment,
                        "Unterminated block comment",
                        at,
                        2,
                        "Close the comment with '*/'",
                    ));
                    return;
                }
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    return;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
    }

    fn string(&mut self, quote: char) {
        let at = self.here();
        let start = self.pos;
        self.bump();
        let mut terminated = false;
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.bump();
            if c == quote {
                terminated = true;
                break;
            }
            if c == '\\' && self.peek().is_some_and(|n| n != '\n') {
                self.bump();
            }
        }
        let text = self.text_from(start);
        if !terminated {
            self.errors.push(LexError::new(
                ErrorCode::UnterminatedString,
                "Unterminated string literal",
                at,
                text.chars().count() as u32,
                format!("Add a closing quote ({}) to end the string", quote),
            ));
        }
        self.push(TokenKind::StringLit, text, at);
    }

    fn number(&mut self) {
        let at = self.here();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            self.bump();
            while self.peek().is_some_and(|c| c.is_ascii_digit()) {
                self.bump();
            }
        }
        let text = self.text_from(start);
        self.push(TokenKind::Number, text, at);
    }

    fn word(&mut self) {
        let at = self.here();
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        let text = self.text_from(start);
        let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Text);
        self.push(kind, text, at);
    }

    fn directive(&mut self) {
        let at = self.here();
        let start = self.pos;
        self.bump();
        while self.peek().is_some_and(|c| c.is_alphanumeric() || c == '_') {
            self.bump();
        }
        let text = self.text_from(start);
        self.push(TokenKind::Directive, text, at);
    }

    fn operator(&mut self) {
        let at = self.here();
        let start = self.pos;
        while let Some(c) = self.peek() {
            let comment_start =
                c == '/' && matches!(self.peek_at(1), Some('/') | Some('*')) && self.pos > start;
            if !OPERATOR_CHARS.contains(c) || comment_start {
                break;
            }
            self.bump();
        }
        let text = self.text_from(start);
        let kind = if text == "=" {
            TokenKind::Equals
        } else {
            TokenKind::Symbol
        };
        self.push(kind, text, at);
    }

    fn invalid(&mut self, c: char) {
        let at = self.here();
        self.bump();
        let error = if c == '\u{FFFD}' {
            LexError::new(
                ErrorCode::InvalidEncoding,
                "Invalid character encoding (U+FFFD replacement character)",
                at,
                1,
                "Re-save the file as UTF-8 and retype this character",
            )
        } else if c.is_control() || ZERO_WIDTH.contains(&c) {
            LexError::new(
                ErrorCode::InvalidEncoding,
                format!("Invisible or control character U+{:04X}", c as u32),
                at,
                1,
                "Delete this invisible character",
            )
        } else {
            LexError::new(
                ErrorCode::UnexpectedCharacter,
                format!("Unexpected character '{}'", c),
                at,
                1,
                "Remove or replace this character",
            )
        };
        self.errors.push(error);
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
