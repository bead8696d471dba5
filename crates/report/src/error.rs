use std::path::PathBuf;

/// Failure writing an export file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("cannot write export file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The report snapshot could not be serialized.
    #[error("cannot serialize reports: {0}")]
    Json(#[from] serde_json::Error),
}
