//! Editor-shaped diagnostic records.
//!
//! Positions are 0-based `{line, character}` pairs and severities/tags use
//! the numeric values common to editor tooling protocols, so an IDE
//! integration only has to copy fields across.

use serde::{Serialize, Serializer};

use sun_core::error::{ErrorCode, Severity};

/// Zero-based line and character. `character` counts Unicode scalar
/// values; `sun-lsp` re-measures it in UTF-16 units for clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct DiagnosticPosition {
    pub line: u32,
    pub character: u32,
}

impl DiagnosticPosition {
    pub fn new(line: u32, character: u32) -> Self {
        DiagnosticPosition { line, character }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DiagnosticRange {
    pub start: DiagnosticPosition,
    pub end: DiagnosticPosition,
}

impl DiagnosticRange {
    pub fn new(start: DiagnosticPosition, end: DiagnosticPosition) -> Self {
        DiagnosticRange { start, end }
    }

    /// Range for `width` characters starting at a 1-based line/column.
    pub fn from_one_based(line: u32, column: u32, width: u32) -> Self {
        let line = line.saturating_sub(1);
        let start = column.saturating_sub(1);
        DiagnosticRange {
            start: DiagnosticPosition::new(line, start),
            end: DiagnosticPosition::new(line, start + width.max(1)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DiagnosticSeverity {
    Error = 1,
    Warning = 2,
    Information = 3,
    Hint = 4,
}

impl From<Severity> for DiagnosticSeverity {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => DiagnosticSeverity::Error,
            Severity::Warning => DiagnosticSeverity::Warning,
            Severity::Info => DiagnosticSeverity::Information,
        }
    }
}

impl Serialize for DiagnosticSeverity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DiagnosticTag {
    Unnecessary = 1,
    Deprecated = 2,
}

impl Serialize for DiagnosticTag {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

/// A suggestion rendered as a pseudo-location on the error's line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedInformation {
    pub range: DiagnosticRange,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosticInfo {
    pub range: DiagnosticRange,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related_information: Vec<RelatedInformation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<DiagnosticTag>,
}
