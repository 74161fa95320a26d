//! Error types for arbwatch-analyze.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for arbwatch-analyze operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while analyzing a firmware package
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error tied to a specific path
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that was being accessed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// External program could not be started
    #[error("Failed to start {program}: {source}")]
    Spawn {
        /// Program path or name
        program: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// External program exceeded its time budget
    #[error("{program} timed out after {secs}s")]
    Timeout {
        /// Program path or name
        program: String,
        /// Budget in seconds
        secs: u64,
    },

    /// External program exited unsuccessfully
    #[error("{tool} failed (exit {status:?}): {stderr}")]
    ToolFailed {
        /// Tool name
        tool: String,
        /// Exit code, if the process exited normally
        status: Option<i32>,
        /// Captured standard error
        stderr: String,
    },

    /// Extraction produced no xbl_config image
    #[error("No xbl_config image found in {}", .0.display())]
    ImageNotFound(PathBuf),

    /// Tool output lacked a required value
    #[error("Missing '{0}' in analyzer output")]
    MissingField(&'static str),
}

impl Error {
    /// Wrap an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
