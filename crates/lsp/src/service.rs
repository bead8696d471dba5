//! The document diagnostics service.
//!
//! Open documents move through Closed -> Open -> (Validating -> Validated)*
//! -> Closed. Every open or change runs tokenize, parse, format and
//! aggregate to completion before returning, so the stored diagnostics
//! always describe the stored text. A front-end failure or panic is turned
//! into one synthetic diagnostic at (0,0) instead of leaving stale results.

use std::panic::{self, AssertUnwindSafe};

use lsp_types::{CodeActionOrCommand, CompletionItem, Diagnostic, Hover, Position, Range, Uri};
use sun_core::{analyze, EngineConfig, Frontend, SunFrontend};
use sun_report::{
    DiagnosticInfo, DiagnosticPosition, DiagnosticRange, DiagnosticSeverity, ErrorAggregator,
};

use crate::code_action;
use crate::completion;
use crate::convert;
use crate::document::{DocumentSession, DocumentStore};
use crate::events::{ServiceEvent, ServiceObserver};
use crate::hover;

/// `source` of diagnostics raised by the service itself.
pub const SERVICE_SOURCE: &str = "sun-lsp";

pub struct DocumentService {
    frontend: Box<dyn Frontend>,
    aggregator: ErrorAggregator,
    documents: DocumentStore,
    observers: Vec<Box<dyn ServiceObserver>>,
}

impl DocumentService {
    pub fn new(frontend: impl Frontend + 'static, aggregator: ErrorAggregator) -> Self {
        DocumentService {
            frontend: Box::new(frontend),
            aggregator,
            documents: DocumentStore::new(),
            observers: Vec::new(),
        }
    }

    /// Service over the default Sun front end and a fresh aggregator.
    pub fn from_config(config: EngineConfig) -> Self {
        let aggregator = ErrorAggregator::new(&config);
        DocumentService::new(SunFrontend::new(config), aggregator)
    }

    pub fn with_observer(mut self, observer: impl ServiceObserver + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    fn notify(&self, event: ServiceEvent) {
        for o in &self.observers {
            o.on_service_event(&event);
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    pub fn open(
        &mut self,
        uri: &str,
        language_id: &str,
        version: i32,
        text: String,
    ) -> &[DiagnosticInfo] {
        self.documents.open(uri, language_id, version, text);
        self.notify(ServiceEvent::DocumentOpened {
            uri: uri.to_owned(),
            version,
        });
        self.validate(uri);
        self.diagnostics(uri)
    }

    /// Apply a full-text change and re-validate.
    ///
    /// Returns `None` when the document is not open or the change is older
    /// than the stored version.
    pub fn change(&mut self, uri: &str, version: i32, text: String) -> Option<&[DiagnosticInfo]> {
        if !self.documents.change(uri, version, text) {
            tracing::debug!(uri, version, "ignoring change");
            return None;
        }
        self.notify(ServiceEvent::DocumentChanged {
            uri: uri.to_owned(),
            version,
        });
        self.validate(uri);
        Some(self.diagnostics(uri))
    }

    /// Forget the document and its report. The returned list is what the
    /// client should publish: always empty.
    pub fn close(&mut self, uri: &str) -> Vec<DiagnosticInfo> {
        if self.documents.close(uri).is_some() {
            self.aggregator.remove_report(uri);
            self.notify(ServiceEvent::DocumentClosed {
                uri: uri.to_owned(),
            });
        }
        Vec::new()
    }

    fn validate(&mut self, uri: &str) {
        let Some(doc) = self.documents.get(uri) else {
            return;
        };
        let version = doc.version;
        let frontend = &*self.frontend;
        let text = doc.text.as_str();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| analyze(frontend, text)));
        let diagnostics = match outcome {
            Ok(Ok((stream, output))) => {
                let report = self
                    .aggregator
                    .add_report(uri, text, &output.errors, &stream.errors);
                report.diagnostics.clone()
            }
            Ok(Err(e)) => {
                tracing::warn!(uri, error = %e, "front end failed");
                self.aggregator.remove_report(uri);
                vec![internal_fault(&e.to_string())]
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(uri, panic = %message, "validation panicked");
                self.aggregator.remove_report(uri);
                vec![internal_fault(&message)]
            }
        };

        tracing::debug!(uri, version, count = diagnostics.len(), "validated");
        let count = diagnostics.len();
        self.documents.set_diagnostics(uri, diagnostics);
        self.notify(ServiceEvent::DiagnosticsUpdated {
            uri: uri.to_owned(),
            version,
            count,
        });
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Diagnostics of the last validation; empty for unknown documents.
    pub fn diagnostics(&self, uri: &str) -> &[DiagnosticInfo] {
        self.documents
            .get(uri)
            .map(|d| d.diagnostics.as_slice())
            .unwrap_or(&[])
    }

    /// Stored diagnostics in LSP form, with UTF-16 columns measured against
    /// the stored text.
    pub fn lsp_diagnostics(&self, uri: &Uri) -> Vec<Diagnostic> {
        match self.documents.get(uri.as_str()) {
            Some(doc) => convert::to_lsp_diagnostics(uri, &doc.text, &doc.diagnostics),
            None => Vec::new(),
        }
    }

    pub fn document(&self, uri: &str) -> Option<&DocumentSession> {
        self.documents.get(uri)
    }

    pub fn aggregator(&self) -> &ErrorAggregator {
        &self.aggregator
    }

    pub fn completions(&self) -> Vec<CompletionItem> {
        completion::compute_completions(self.frontend.dictionary())
    }

    pub fn hover(&self, uri: &str, position: Position) -> Option<Hover> {
        let doc = self.documents.get(uri)?;
        hover::compute_hover(self.frontend.dictionary(), &doc.text, position)
    }

    /// Quick fixes for the diagnostics the client sent, or for the stored
    /// diagnostics overlapping `range` when it sent none.
    pub fn code_actions(
        &self,
        uri: &Uri,
        range: Range,
        client_diagnostics: &[Diagnostic],
    ) -> Vec<CodeActionOrCommand> {
        let Some(doc) = self.documents.get(uri.as_str()) else {
            return Vec::new();
        };
        let stored;
        let diagnostics = if client_diagnostics.is_empty() {
            stored = convert::to_lsp_diagnostics(uri, &doc.text, &doc.diagnostics)
                .into_iter()
                .filter(|d| overlaps(d.range, range))
                .collect::<Vec<_>>();
            &stored
        } else {
            client_diagnostics
        };
        code_action::compute_code_actions(uri, &doc.text, diagnostics)
    }
}

fn overlaps(a: Range, b: Range) -> bool {
    let key = |p: Position| (p.line, p.character);
    key(a.start) <= key(b.end) && key(b.start) <= key(a.end)
}

fn internal_fault(detail: &str) -> DiagnosticInfo {
    let origin = DiagnosticPosition::new(0, 0);
    DiagnosticInfo {
        range: DiagnosticRange::new(origin, origin),
        severity: DiagnosticSeverity::Error,
        message: format!("Internal error while validating document: {}", detail),
        source: SERVICE_SOURCE.to_string(),
        code: None,
        related_information: Vec::new(),
        tags: Vec::new(),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
