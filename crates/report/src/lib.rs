//! sun-report: turns raw lexical and syntax errors into diagnostics,
//! human-readable reports and cross-file statistics.
//!
//! - [`formatter`] -- stateless formatting and editor diagnostics
//! - [`ErrorAggregator`] -- live per-file reports, statistics, summary, export

pub mod aggregator;
pub mod diagnostic;
pub mod error;
pub mod events;
pub mod export;
pub mod formatter;

pub use aggregator::{ErrorAggregator, ErrorRecord, ErrorReport, ErrorStatistics};
pub use diagnostic::{
    DiagnosticInfo, DiagnosticPosition, DiagnosticRange, DiagnosticSeverity, DiagnosticTag,
    RelatedInformation,
};
pub use error::ExportError;
pub use events::{ExportFormat, ReportEvent, ReportObserver};
pub use export::{CSV_HEADER, CSV_NO_ERRORS};
pub use formatter::{
    create_diagnostics, create_human_report, format_lexical_errors, format_syntax_errors,
    FormattedError, ReportStyle, SUCCESS_MESSAGE,
};
