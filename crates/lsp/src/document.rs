//! Session state for documents open in the editor.

use std::collections::HashMap;

use sun_report::DiagnosticInfo;

/// One open document and the diagnostics of its last validation.
#[derive(Debug, Clone)]
pub struct DocumentSession {
    pub uri: String,
    pub language_id: String,
    /// Editor-reported version number.
    pub version: i32,
    pub text: String,
    /// Always corresponds to `text` at `version`.
    pub diagnostics: Vec<DiagnosticInfo>,
}

/// Open documents keyed by URI. A document absent from the store is closed.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: HashMap<String, DocumentSession>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a newly opened document, replacing any stale session for the URI.
    pub fn open(&mut self, uri: &str, language_id: &str, version: i32, text: String) {
        self.documents.insert(
            uri.to_owned(),
            DocumentSession {
                uri: uri.to_owned(),
                language_id: language_id.to_owned(),
                version,
                text,
                diagnostics: Vec::new(),
            },
        );
    }

    /// Replace the text of an open document.
    ///
    /// Returns `false` when the document is not open or `version` is older
    /// than the stored one; the session is left untouched in both cases.
    pub fn change(&mut self, uri: &str, version: i32, text: String) -> bool {
        match self.documents.get_mut(uri) {
            Some(doc) if version >= doc.version => {
                doc.version = version;
                doc.text = text;
                true
            }
            _ => false,
        }
    }

    pub fn set_diagnostics(&mut self, uri: &str, diagnostics: Vec<DiagnosticInfo>) {
        if let Some(doc) = self.documents.get_mut(uri) {
            doc.diagnostics = diagnostics;
        }
    }

    /// Stop tracking a closed document.
    pub fn close(&mut self, uri: &str) -> Option<DocumentSession> {
        self.documents.remove(uri)
    }

    pub fn get(&self, uri: &str) -> Option<&DocumentSession> {
        self.documents.get(uri)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
