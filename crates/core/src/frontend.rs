//! Front-end abstraction for the diagnostics pipeline.
//!
//! The [`Frontend`] trait hides the tokenizer and parser behind one seam so
//! reporting and editor tooling never depend on a concrete grammar.
//! [`SunFrontend`] is the default implementation for `.sun` sources.

use std::sync::Arc;

use crate::config::EngineConfig;
use crate::dictionary::KeywordDictionary;
use crate::error::FrontendError;
use crate::lexer::{self, TokenStream};
use crate::parser::{self, ParseOutput};

/// Tokenizer plus recovering parser.
///
/// Both calls report malformed *input* as data inside their output. An `Err`
/// means the front end itself failed.
pub trait Frontend {
    fn tokenize(&self, source: &str) -> Result<TokenStream, FrontendError>;

    fn parse(&self, stream: &TokenStream, source: &str) -> Result<ParseOutput, FrontendError>;

    /// Dictionary used for suggestions, hover text and completions.
    fn dictionary(&self) -> &KeywordDictionary;

    fn config(&self) -> &EngineConfig;
}

/// Tokenize and parse in one step.
pub fn analyze<F: Frontend + ?Sized>(
    frontend: &F,
    source: &str,
) -> Result<(TokenStream, ParseOutput), FrontendError> {
    let stream = frontend.tokenize(source)?;
    let output = frontend.parse(&stream, source)?;
    Ok((stream, output))
}

#[derive(Debug, Clone)]
pub struct SunFrontend {
    dictionary: Arc<KeywordDictionary>,
    config: EngineConfig,
}

impl SunFrontend {
    pub fn new(config: EngineConfig) -> Self {
        SunFrontend {
            dictionary: Arc::new(KeywordDictionary::builtin().clone()),
            config,
        }
    }

    pub fn with_dictionary(mut self, dictionary: Arc<KeywordDictionary>) -> Self {
        self.dictionary = dictionary;
        self
    }
}

impl Default for SunFrontend {
    fn default() -> Self {
        SunFrontend::new(EngineConfig::default())
    }
}

impl Frontend for SunFrontend {
    fn tokenize(&self, source: &str) -> Result<TokenStream, FrontendError> {
        let stream = lexer::tokenize(source);
        tracing::trace!(
            tokens = stream.tokens.len(),
            lex_errors = stream.errors.len(),
            "tokenized"
        );
        Ok(stream)
    }

    fn parse(&self, stream: &TokenStream, source: &str) -> Result<ParseOutput, FrontendError> {
        parser::parse(&stream.tokens, Some(source), &self.dictionary, &self.config)
    }

    fn dictionary(&self) -> &KeywordDictionary {
        &self.dictionary
    }

    fn config(&self) -> &EngineConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn analyze_returns_lexical_and_syntax_errors() {
        let frontend = SunFrontend::default();
        let (stream, output) = analyze(&frontend, "let x = § 1\nwehn x then y\n").unwrap();
        assert_eq!(stream.errors.len(), 1);
        assert_eq!(stream.errors[0].code, ErrorCode::UnexpectedCharacter);
        assert!(output
            .errors
            .iter()
            .any(|e| e.code == ErrorCode::PossibleMisspelling));
    }

    #[test]
    fn swapped_dictionary_drives_suggestions() {
        let dict = KeywordDictionary::from_json(
            r#"{"keywords": ["function", "when"], "misspellings": {"wenn": "when"}}"#,
        )
        .unwrap();
        let frontend = SunFrontend::default().with_dictionary(Arc::new(dict));
        let (_, output) = analyze(&frontend, "wenn ready then go\n").unwrap();
        assert_eq!(output.errors[0].suggestions[0], "Did you mean 'when'?");
    }
}
