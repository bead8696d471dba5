use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::context::ParseContext;
use crate::token::{Position, Token, TokenKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable error codes shared by lexical and syntax errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Lexical
    UnexpectedCharacter,
    InvalidEncoding,
    UnterminatedString,
    UnterminatedComment,
    // Syntax
    ExpectedToken,
    UnexpectedToken,
    MissingToken,
    MissingOpenBrace,
    MissingCloseBrace,
    PossibleMisspelling,
    InvalidFunction,
    InvalidComponent,
    InvalidWhen,
    UnknownDirective,
    LineSkipped,
}

/// Coarse grouping of error codes, used for recommendations and quick fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Expected,
    Missing,
    Unexpected,
    Misspelling,
    Construct,
    Skipped,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::UnexpectedCharacter,
        ErrorCode::InvalidEncoding,
        ErrorCode::UnterminatedString,
        ErrorCode::UnterminatedComment,
        ErrorCode::ExpectedToken,
        ErrorCode::UnexpectedToken,
        ErrorCode::MissingToken,
        ErrorCode::MissingOpenBrace,
        ErrorCode::MissingCloseBrace,
        ErrorCode::PossibleMisspelling,
        ErrorCode::InvalidFunction,
        ErrorCode::InvalidComponent,
        ErrorCode::InvalidWhen,
        ErrorCode::UnknownDirective,
        ErrorCode::LineSkipped,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::UnexpectedCharacter => "UNEXPECTED_CHARACTER",
            ErrorCode::InvalidEncoding => "INVALID_ENCODING",
            ErrorCode::UnterminatedString => "UNTERMINATED_STRING",
            ErrorCode::UnterminatedComment => "UNTERMINATED_COMMENT",
            ErrorCode::ExpectedToken => "EXPECTED_TOKEN",
            ErrorCode::UnexpectedToken => "UNEXPECTED_TOKEN",
            ErrorCode::MissingToken => "MISSING_TOKEN",
            ErrorCode::MissingOpenBrace => "MISSING_OPEN_BRACE",
            ErrorCode::MissingCloseBrace => "MISSING_CLOSE_BRACE",
            ErrorCode::PossibleMisspelling => "POSSIBLE_MISSPELLING",
            ErrorCode::InvalidFunction => "INVALID_FUNCTION",
            ErrorCode::InvalidComponent => "INVALID_COMPONENT",
            ErrorCode::InvalidWhen => "INVALID_WHEN",
            ErrorCode::UnknownDirective => "UNKNOWN_DIRECTIVE",
            ErrorCode::LineSkipped => "LINE_SKIPPED",
        }
    }

    pub fn category(self) -> ErrorCategory {
        match self {
            ErrorCode::UnexpectedCharacter
            | ErrorCode::InvalidEncoding
            | ErrorCode::UnterminatedString
            | ErrorCode::UnterminatedComment => ErrorCategory::Lexical,
            ErrorCode::ExpectedToken => ErrorCategory::Expected,
            ErrorCode::MissingToken | ErrorCode::MissingOpenBrace | ErrorCode::MissingCloseBrace => {
                ErrorCategory::Missing
            }
            ErrorCode::UnexpectedToken => ErrorCategory::Unexpected,
            ErrorCode::PossibleMisspelling => ErrorCategory::Misspelling,
            ErrorCode::InvalidFunction
            | ErrorCode::InvalidComponent
            | ErrorCode::InvalidWhen
            | ErrorCode::UnknownDirective => ErrorCategory::Construct,
            ErrorCode::LineSkipped => ErrorCategory::Skipped,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ErrorCode {
    type Err = UnknownErrorCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorCode::ALL
            .iter()
            .copied()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| UnknownErrorCode(s.to_owned()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown error code '{0}'")]
pub struct UnknownErrorCode(pub String);

/// A raw lexical error reported by the tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexError {
    pub message: String,
    pub position: Position,
    /// Width of the offending text in characters (at least 1).
    pub length: u32,
    pub code: ErrorCode,
    pub suggestions: Vec<String>,
}

impl LexError {
    pub fn new(
        code: ErrorCode,
        message: impl Into<String>,
        position: Position,
        length: u32,
        suggestion: impl Into<String>,
    ) -> Self {
        LexError {
            message: message.into(),
            position,
            length: length.max(1),
            code,
            suggestions: vec![suggestion.into()],
        }
    }
}

/// A syntax error recorded by the recovery engine. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseError {
    pub message: String,
    pub position: Position,
    pub token: Token,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub expected: Vec<TokenKind>,
    /// Ordered, never empty.
    pub suggestions: Vec<String>,
    pub severity: Severity,
    pub code: ErrorCode,
    pub context: ParseContext,
}

/// Fault raised by a front end that could not produce a usable token stream
/// or syntax tree. Unlike [`ParseError`] this is a service fault, not data.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    #[error("tokenizer produced an empty token stream")]
    EmptyTokenStream,

    #[error("token stream is not terminated by an end-of-input token")]
    Unterminated,

    #[error("front end failure: {0}")]
    Other(String),
}
