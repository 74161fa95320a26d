//! Error types for arbwatch-core.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for arbwatch-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in arbwatch-core
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// I/O error tied to a specific path
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// Path that was being read or written
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed input that could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Device id not present in the catalog
    #[error("Unknown device: {0}")]
    UnknownDevice(String),

    /// Region code not known, or not offered for a device
    #[error("Unknown region '{region}' for device '{device}'")]
    UnknownRegion {
        /// Device id the region was requested for
        device: String,
        /// Offending region code
        region: String,
    },

    /// Input failed validation
    #[error("Validation error: {message}")]
    Validation {
        /// Field that failed validation, if known
        field: Option<String>,
        /// What went wrong
        message: String,
    },
}

impl Error {
    /// Wrap an I/O error with the path it concerns.
    pub fn io_with_path(source: std::io::Error, path: impl AsRef<Path>) -> Self {
        Error::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Creates a new parse error.
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Error::Parse(message.into())
    }

    /// Creates a new configuration error.
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Error::Validation {
            field: None,
            message: message.into(),
        }
    }

    /// Creates a new validation error with a field name.
    pub fn validation_field<F, M>(field: F, message: M) -> Self
    where
        F: Into<String>,
        M: Into<String>,
    {
        Error::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    /// Returns whether the error points at bad input rather than a failing environment.
    pub fn is_user_error(&self) -> bool {
        match self {
            Error::Io { .. } | Error::Json(_) => false,
            Error::Parse(_)
            | Error::Config(_)
            | Error::UnknownDevice(_)
            | Error::UnknownRegion { .. }
            | Error::Validation { .. } => true,
        }
    }
}
