//! Parse context attached to every recorded error.
//!
//! A [`ParseContext`] is always fully populated: the [`ContextBuilder`]
//! fills every field with an explicit default, so formatting and suggestion
//! code never has to deal with a half-built record.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::token::Token;

/// Named syntactic unit whose shape drives recovery and suggestion templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Construct {
    #[default]
    TopLevel,
    Function,
    Component,
    When,
    Block,
    Directive,
    Expression,
}

impl Construct {
    pub fn name(self) -> &'static str {
        match self {
            Construct::TopLevel => "toplevel",
            Construct::Function => "function",
            Construct::Component => "component",
            Construct::When => "when",
            Construct::Block => "block",
            Construct::Directive => "directive",
            Construct::Expression => "expression",
        }
    }

    /// Whether a bare literal is a plausible token at this point.
    pub fn accepts_literals(self) -> bool {
        matches!(
            self,
            Construct::When | Construct::Block | Construct::Directive | Construct::Expression
        )
    }
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParseContext {
    pub current_construct: Construct,
    /// Ordered outer to inner.
    pub enclosing_constructs: Vec<Construct>,
    pub nearby_tokens: Vec<Token>,
    pub line_content: String,
}

impl ParseContext {
    pub fn builder<'a>(tokens: &'a [Token], cursor: usize) -> ContextBuilder<'a> {
        ContextBuilder::new(tokens, cursor)
    }
}

pub struct ContextBuilder<'a> {
    tokens: &'a [Token],
    cursor: usize,
    source: Option<&'a str>,
    window: usize,
    current: Construct,
    enclosing: Vec<Construct>,
}

impl<'a> ContextBuilder<'a> {
    pub fn new(tokens: &'a [Token], cursor: usize) -> Self {
        ContextBuilder {
            tokens,
            cursor,
            source: None,
            window: 2,
            current: Construct::TopLevel,
            enclosing: Vec::new(),
        }
    }

    pub fn source(mut self, source: Option<&'a str>) -> Self {
        self.source = source;
        self
    }

    /// Number of tokens kept on each side of the cursor.
    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn construct(mut self, construct: Construct) -> Self {
        self.current = construct;
        self
    }

    pub fn enclosing(mut self, enclosing: impl IntoIterator<Item = Construct>) -> Self {
        self.enclosing = enclosing.into_iter().collect();
        self
    }

    pub fn build(self) -> ParseContext {
        let nearby_tokens = if self.tokens.is_empty() {
            Vec::new()
        } else {
            let cursor = self.cursor.min(self.tokens.len() - 1);
            let start = cursor.saturating_sub(self.window);
            let end = (cursor + self.window + 1).min(self.tokens.len());
            self.tokens[start..end].to_vec()
        };

        let line_content = match (self.source, self.line()) {
            (Some(src), Some(line)) => source_line(src, line).unwrap_or_default().to_owned(),
            _ => String::new(),
        };

        ParseContext {
            current_construct: self.current,
            enclosing_constructs: self.enclosing,
            nearby_tokens,
            line_content,
        }
    }

    fn line(&self) -> Option<u32> {
        let last = self.tokens.len().checked_sub(1)?;
        Some(self.tokens[self.cursor.min(last)].position.line)
    }
}

/// Fetch a 1-based line from `source`, without its line terminator.
pub fn source_line(source: &str, line: u32) -> Option<&str> {
    let index = usize::try_from(line).ok()?.checked_sub(1)?;
    source
        .split('\n')
        .nth(index)
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
}
