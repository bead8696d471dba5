//! Sun Language Server Protocol implementation for IDE integration.
//!
//! The [`DocumentService`] owns per-document state and re-runs the
//! tokenize, parse, format, aggregate pipeline on every change. The
//! providers ([`completion`], [`hover`], [`code_action`]) answer queries
//! against the last completed validation. [`server`] adapts all of it to
//! `lsp-server` over stdio for the `sun lsp` CLI subcommand.

pub mod code_action;
pub mod completion;
pub mod convert;
pub mod document;
pub mod events;
pub mod hover;
pub mod server;
pub mod service;

pub use document::{DocumentSession, DocumentStore};
pub use events::{ServiceEvent, ServiceObserver};
pub use service::{DocumentService, SERVICE_SOURCE};

use sun_core::EngineConfig;

/// Run the LSP server over stdio. This is the public entry point
/// called by `sun lsp`.
pub fn run(config: EngineConfig) -> Result<(), Box<dyn std::error::Error>> {
    server::run(config)
}
