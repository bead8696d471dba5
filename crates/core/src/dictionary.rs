//! Swappable keyword data: keywords, known misspellings, hover text,
//! directive catalogue and suggestion phrases.
//!
//! The built-in dictionary is embedded from `data/dictionary.json`; hosts may
//! load their own with [`KeywordDictionary::from_json`].

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::context::Construct;
use crate::suggest;
use crate::token::TokenKind;

static BUILTIN_JSON: &str = include_str!("../data/dictionary.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub fragment: String,
    pub keyword: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordDictionary {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub misspellings: BTreeMap<String, String>,
    #[serde(default)]
    pub descriptions: BTreeMap<String, String>,
    #[serde(default)]
    pub directives: BTreeMap<String, String>,
    /// Keyed by [`TokenKind::as_str`].
    #[serde(default)]
    pub expected_phrases: BTreeMap<String, String>,
    /// Keyed by [`Construct::name`].
    #[serde(default)]
    pub construct_templates: BTreeMap<String, String>,
    #[serde(default)]
    pub fragments: Vec<Fragment>,
}

/// A keyword correction found for a misspelled word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction<'a> {
    pub keyword: &'a str,
    /// 0 when the word came from the misspelling table.
    pub distance: usize,
}

impl KeywordDictionary {
    /// The dictionary shipped with the crate.
    pub fn builtin() -> &'static KeywordDictionary {
        static BUILTIN: OnceLock<KeywordDictionary> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            KeywordDictionary::from_json(BUILTIN_JSON).expect("embedded dictionary.json is valid")
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.iter().any(|k| k == word)
    }

    /// Resolve a misspelled word: the explicit table first, then the closest
    /// keyword within the word's edit budget.
    pub fn correction(&self, word: &str, max_distance: usize) -> Option<Correction<'_>> {
        let lowered = word.to_lowercase();
        if let Some(keyword) = self.misspellings.get(&lowered) {
            return Some(Correction {
                keyword,
                distance: 0,
            });
        }
        if self.is_keyword(word) {
            return None;
        }
        let threshold = suggest::effective_threshold(word, max_distance);
        suggest::closest(
            &lowered,
            self.keywords.iter().map(String::as_str),
            threshold,
        )
        .map(|(keyword, distance)| Correction { keyword, distance })
    }

    pub fn describe(&self, keyword: &str) -> Option<&str> {
        self.descriptions.get(keyword).map(String::as_str)
    }

    pub fn is_directive(&self, name: &str) -> bool {
        self.directives.contains_key(name)
    }

    /// Closest known directive for an unknown `@name`.
    pub fn closest_directive(&self, name: &str, max_distance: usize) -> Option<&str> {
        let threshold = suggest::effective_threshold(name, max_distance);
        suggest::closest(name, self.directives.keys().map(String::as_str), threshold)
            .map(|(d, _)| d)
    }

    pub fn expected_phrase(&self, kind: TokenKind) -> Option<&str> {
        self.expected_phrases.get(kind.as_str()).map(String::as_str)
    }

    pub fn construct_template(&self, construct: Construct) -> Option<&str> {
        self.construct_templates
            .get(construct.name())
            .map(String::as_str)
    }

    /// Keywords hinted at by fragments contained in `text`, in table order.
    pub fn fragment_hints(&self, text: &str) -> Vec<&str> {
        let lowered = text.to_lowercase();
        let mut hints: Vec<&str> = Vec::new();
        for f in &self.fragments {
            let hinted = lowered.contains(&f.fragment) && lowered != f.keyword;
            if hinted && !hints.contains(&f.keyword.as_str()) {
                hints.push(&f.keyword);
            }
        }
        hints
    }
}
