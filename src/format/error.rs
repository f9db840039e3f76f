//! Error types for label document import.

use thiserror::Error;

/// Errors that can occur while reading a label document.
#[derive(Error, Debug)]
pub enum FormatError {
    /// The text is not well-formed JSON
    #[error("Label file is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The JSON is well-formed but not a usable label document
    #[error("Invalid label file format: {message}")]
    Validation {
        /// Description of what is wrong
        message: String,
    },
}

impl FormatError {
    /// Create a validation error with a message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }
}
