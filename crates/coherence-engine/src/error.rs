//! Error types for the platform binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during startup, loading, and export.

use std::path::PathBuf;

/// Top-level error for the platform binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: coherence_core::config::ConfigError,
    },

    /// The job corpus could not be listed.
    #[error("corpus error: {source}")]
    Corpus {
        /// The underlying corpus error.
        #[from]
        source: crate::corpus::CorpusError,
    },

    /// A file-system operation failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The path being operated on.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Report serialization failed.
    #[error("report serialization failed: {source}")]
    Report {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// The tracing subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Wrap an I/O error with the path it occurred at.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
