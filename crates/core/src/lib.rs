//! sun-core: Sun front end and fault-tolerant parse-error recovery.
//!
//! Provides the tokenizer, the recovering parser, the recovery engine that
//! keeps a parse alive across malformed input, and the keyword dictionary
//! behind "did you mean?" suggestions.
//!
//! # Public API
//!
//! - [`Frontend`] / [`SunFrontend`] -- tokenize + parse seam used by reporters
//! - [`RecoveryEngine`] -- `record_error` and `recover`
//! - [`KeywordDictionary`] -- swappable keyword, misspelling and hover data
//! - [`EngineConfig`] -- limits and thresholds, loadable from `sun.toml`
//! - Error records: [`LexError`], [`ParseError`], [`ErrorCode`], [`Severity`]

pub mod ast;
pub mod config;
pub mod context;
pub mod dictionary;
pub mod error;
pub mod frontend;
pub mod lexer;
pub mod parser;
pub mod recovery;
pub mod suggest;
pub mod token;

// ── Convenience re-exports ───────────────────────────────────────────

pub use ast::SyntaxTree;
pub use config::{ConfigError, EngineConfig, RecoveryLimits, DEFAULT_MAX_ERRORS};
pub use context::{Construct, ParseContext};
pub use dictionary::KeywordDictionary;
pub use error::{ErrorCategory, ErrorCode, FrontendError, LexError, ParseError, Severity};
pub use frontend::{analyze, Frontend, SunFrontend};
pub use lexer::{tokenize, TokenStream};
pub use parser::ParseOutput;
pub use recovery::{PartialTree, RecoveryEngine, RecoveryResult, RecoveryStrategy};
pub use token::{Position, Token, TokenKind};
