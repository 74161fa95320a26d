//! Error types for arbwatch-cli

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for arbwatch-cli operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in arbwatch-cli
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from arbwatch-core
    #[error(transparent)]
    Core(#[from] arbwatch_core::Error),

    /// Error from arbwatch-content
    #[error(transparent)]
    Content(#[from] arbwatch_content::Error),

    /// Error from arbwatch-client
    #[error(transparent)]
    Client(#[from] arbwatch_client::Error),

    /// Error from arbwatch-analyze
    #[error(transparent)]
    Analyze(#[from] arbwatch_analyze::Error),

    /// I/O error tied to a specific path
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that was being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file or value error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid command input
    #[error("{0}")]
    Usage(String),

    /// A check ran to completion and found problems
    #[error("{0}")]
    Failed(String),
}

impl Error {
    /// Wrap an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Create a usage error.
    pub fn usage<S: Into<String>>(message: S) -> Self {
        Error::Usage(message.into())
    }

    /// Create a check failure.
    pub fn failed<S: Into<String>>(message: S) -> Self {
        Error::Failed(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_is_transparent() {
        let err: Error = arbwatch_core::Error::UnknownDevice("99".to_string()).into();
        assert_eq!(
            err.to_string(),
            arbwatch_core::Error::UnknownDevice("99".to_string()).to_string()
        );
    }

    #[test]
    fn test_config_display() {
        assert_eq!(
            Error::config("bad key").to_string(),
            "Configuration error: bad key"
        );
    }
}
