use serde::{Deserialize, Serialize};
use std::fmt;

/// 1-based source position, counted in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub fn new(line: u32, column: u32) -> Self {
        Position { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // Keywords
    Function,
    Component,
    When,
    Then,
    Else,
    Let,
    State,
    Return,
    Render,
    Import,
    Export,
    True,
    False,
    /// Bare word that is not a keyword
    Text,
    /// Quoted string literal, quotes included
    StringLit,
    Number,
    /// `@name` directive marker
    Directive,
    // Punctuation
    LBrace,
    RBrace,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Dot,
    Equals,
    Semicolon,
    /// Run of operator characters (`+`, `==`, `&&`, ...)
    Symbol,
    Newline,
    Eof,
}

/// Binary operators the parser accepts inside expressions.
pub const KNOWN_OPERATORS: &[&str] = &[
    "+", "-", "*", "/", "%", "==", "!=", "<", ">", "<=", ">=", "&&", "||", "!", "->", "=>",
];

impl TokenKind {
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "function" => TokenKind::Function,
            "component" => TokenKind::Component,
            "when" => TokenKind::When,
            "then" => TokenKind::Then,
            "else" => TokenKind::Else,
            "let" => TokenKind::Let,
            "state" => TokenKind::State,
            "return" => TokenKind::Return,
            "render" => TokenKind::Render,
            "import" => TokenKind::Import,
            "export" => TokenKind::Export,
            "true" => TokenKind::True,
            "false" => TokenKind::False,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::Function
                | TokenKind::Component
                | TokenKind::When
                | TokenKind::Then
                | TokenKind::Else
                | TokenKind::Let
                | TokenKind::State
                | TokenKind::Return
                | TokenKind::Render
                | TokenKind::Import
                | TokenKind::Export
                | TokenKind::True
                | TokenKind::False
        )
    }

    /// Keywords that open a named block or conditional construct.
    pub fn is_block_opener(self) -> bool {
        matches!(
            self,
            TokenKind::Function | TokenKind::Component | TokenKind::When
        )
    }

    /// Safe re-entry points after a parse failure.
    pub fn is_sync_point(self) -> bool {
        self.is_block_opener()
            || matches!(
                self,
                TokenKind::LBrace | TokenKind::RBrace | TokenKind::Newline
            )
    }

    pub fn is_punctuation(self) -> bool {
        matches!(
            self,
            TokenKind::LBrace
                | TokenKind::RBrace
                | TokenKind::LParen
                | TokenKind::RParen
                | TokenKind::LBracket
                | TokenKind::RBracket
                | TokenKind::Comma
                | TokenKind::Colon
                | TokenKind::Dot
                | TokenKind::Semicolon
                | TokenKind::Symbol
        )
    }

    pub fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::StringLit | TokenKind::Number | TokenKind::True | TokenKind::False
        )
    }

    /// Stable identifier, identical to the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Function => "FUNCTION",
            TokenKind::Component => "COMPONENT",
            TokenKind::When => "WHEN",
            TokenKind::Then => "THEN",
            TokenKind::Else => "ELSE",
            TokenKind::Let => "LET",
            TokenKind::State => "STATE",
            TokenKind::Return => "RETURN",
            TokenKind::Render => "RENDER",
            TokenKind::Import => "IMPORT",
            TokenKind::Export => "EXPORT",
            TokenKind::True => "TRUE",
            TokenKind::False => "FALSE",
            TokenKind::Text => "TEXT",
            TokenKind::StringLit => "STRING_LIT",
            TokenKind::Number => "NUMBER",
            TokenKind::Directive => "DIRECTIVE",
            TokenKind::LBrace => "L_BRACE",
            TokenKind::RBrace => "R_BRACE",
            TokenKind::LParen => "L_PAREN",
            TokenKind::RParen => "R_PAREN",
            TokenKind::LBracket => "L_BRACKET",
            TokenKind::RBracket => "R_BRACKET",
            TokenKind::Comma => "COMMA",
            TokenKind::Colon => "COLON",
            TokenKind::Dot => "DOT",
            TokenKind::Equals => "EQUALS",
            TokenKind::Semicolon => "SEMICOLON",
            TokenKind::Symbol => "SYMBOL",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Eof => "EOF",
        }
    }

    /// Human description used in "expected ..." messages.
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Function => "'function'",
            TokenKind::Component => "'component'",
            TokenKind::When => "'when'",
            TokenKind::Then => "'then'",
            TokenKind::Else => "'else'",
            TokenKind::Let => "'let'",
            TokenKind::State => "'state'",
            TokenKind::Return => "'return'",
            TokenKind::Render => "'render'",
            TokenKind::Import => "'import'",
            TokenKind::Export => "'export'",
            TokenKind::True => "'true'",
            TokenKind::False => "'false'",
            TokenKind::Text => "a name",
            TokenKind::StringLit => "a string",
            TokenKind::Number => "a number",
            TokenKind::Directive => "a directive",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::Dot => "'.'",
            TokenKind::Equals => "'='",
            TokenKind::Semicolon => "';'",
            TokenKind::Symbol => "an operator",
            TokenKind::Newline => "end of line",
            TokenKind::Eof => "end of input",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: Position,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: u32, column: u32) -> Self {
        Token {
            kind,
            text: text.into(),
            position: Position::new(line, column),
        }
    }

    pub fn eof(position: Position) -> Self {
        Token {
            kind: TokenKind::Eof,
            text: String::new(),
            position,
        }
    }

    /// Width in characters, never less than one so ranges stay visible.
    pub fn width(&self) -> u32 {
        match self.kind {
            TokenKind::Newline | TokenKind::Eof => 1,
            _ => (self.text.chars().count() as u32).max(1),
        }
    }

    /// Text as shown to users in messages.
    pub fn display_text(&self) -> &str {
        match self.kind {
            TokenKind::Newline => "end of line",
            TokenKind::Eof => "end of input",
            _ => &self.text,
        }
    }
}
