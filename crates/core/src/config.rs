//! Engine configuration, loadable from the `[engine]` table of `sun.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default maximum number of syntax errors collected before parsing stops.
pub const DEFAULT_MAX_ERRORS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub max_errors: usize,
    /// Upper bound for keyword substitution; per-word budgets may be lower.
    pub max_edit_distance: usize,
    /// How far the sync-point scan looks ahead.
    pub sync_lookahead: usize,
    /// How far back insertion recovery looks for an unopened construct.
    pub insertion_lookbehind: usize,
    /// Tokens kept on each side of an error in its context.
    pub context_window: usize,
    /// Total error count above which summaries recommend a file-by-file pass.
    pub error_threshold: usize,
    /// `source` tag on produced diagnostics.
    pub source_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_errors: DEFAULT_MAX_ERRORS,
            max_edit_distance: 2,
            sync_lookahead: 64,
            insertion_lookbehind: 8,
            context_window: 2,
            error_threshold: 10,
            source_name: "sun".to_owned(),
        }
    }
}

/// The subset of configuration the recovery engine needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecoveryLimits {
    pub max_edit_distance: usize,
    pub sync_lookahead: usize,
    pub insertion_lookbehind: usize,
    pub context_window: usize,
}

impl Default for RecoveryLimits {
    fn default() -> Self {
        EngineConfig::default().limits()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
}

impl EngineConfig {
    pub fn limits(&self) -> RecoveryLimits {
        RecoveryLimits {
            max_edit_distance: self.max_edit_distance,
            sync_lookahead: self.sync_lookahead.max(1),
            insertion_lookbehind: self.insertion_lookbehind,
            context_window: self.context_window,
        }
    }

    pub fn from_toml_str(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str::<ConfigFile>(text)
            .map(|file| file.engine)
            .map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text, path)
    }
}
