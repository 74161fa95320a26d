//! Error types for arbwatch-content.

use thiserror::Error;

use crate::placeholders::Field;

/// Result type alias for arbwatch-content operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while editing placeholder documents
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from arbwatch-core
    #[error(transparent)]
    Core(#[from] arbwatch_core::Error),

    /// No START/END pair for the field and id
    #[error("No {field} marker pair for '{id}'")]
    MissingMarker {
        /// Field that was looked up
        field: Field,
        /// Marker id
        id: String,
    },

    /// More than one START/END pair for the field and id
    #[error("Duplicate {field} marker pairs for '{id}'")]
    DuplicateMarker {
        /// Field that was looked up
        field: Field,
        /// Marker id
        id: String,
    },

    /// Value cannot be placed between markers
    #[error("Invalid {field} value for '{id}': {reason}")]
    InvalidValue {
        /// Field being written
        field: Field,
        /// Marker id
        id: String,
        /// Why the value was rejected
        reason: String,
    },
}

impl Error {
    /// Creates a new invalid-value error.
    pub fn invalid_value(field: Field, id: &str, reason: impl Into<String>) -> Self {
        Error::InvalidValue {
            field,
            id: id.to_string(),
            reason: reason.into(),
        }
    }
}
