//! Error types for the CLI

use spyglass::SpyError;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// Errors that can occur in the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Registry configuration file could not be loaded
    #[error("Configuration error in {}: {source}", path.display())]
    Config {
        /// Configuration file
        path: PathBuf,
        /// Load or parse failure
        #[source]
        source: SpyError,
    },

    /// Scenario name not known
    #[error("Unknown scenario '{name}' (see `spyglass list`)")]
    UnknownScenario {
        /// Requested name
        name: String,
    },

    /// At least one scenario failed
    #[error("{failed} of {total} scenarios failed")]
    ScenariosFailed {
        /// Failed scenarios
        failed: usize,
        /// Scenarios run
        total: usize,
    },

    /// IO error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Create a configuration error for the file at `path`
    #[must_use]
    pub fn config(path: impl AsRef<Path>, source: SpyError) -> Self {
        Self::Config {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an unknown scenario error
    #[must_use]
    pub fn unknown_scenario(name: impl Into<String>) -> Self {
        Self::UnknownScenario { name: name.into() }
    }
}
