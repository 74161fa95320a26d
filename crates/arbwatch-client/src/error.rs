//! Error types for arbwatch-client

use thiserror::Error;

/// Result type alias for arbwatch-client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in arbwatch-client
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// Error from arbwatch-core
    #[error("Core error: {0}")]
    Core(#[from] arbwatch_core::Error),

    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be interpreted
    #[error("Unexpected response from {source_name}: {message}")]
    Response {
        /// Source that produced the response
        source_name: String,
        /// What was wrong with it
        message: String,
    },

    /// No source produced a download link
    #[error("No firmware found for {device} {region}")]
    NotFound {
        /// Device id
        device: String,
        /// Region code
        region: String,
    },
}

impl Error {
    /// Creates a new response error.
    pub fn response(source_name: &str, message: impl Into<String>) -> Self {
        Error::Response {
            source_name: source_name.to_string(),
            message: message.into(),
        }
    }

    /// Whether the error means "nothing found" rather than a failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = Error::NotFound {
            device: "15".to_string(),
            region: "GLO".to_string(),
        };
        assert_eq!(err.to_string(), "No firmware found for 15 GLO");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_response_display() {
        let err = Error::response("springer", "missing data-devices attribute");
        assert_eq!(
            err.to_string(),
            "Unexpected response from springer: missing data-devices attribute"
        );
        assert!(!err.is_not_found());
    }
}
