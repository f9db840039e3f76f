//! Error types for editor operations.

use thiserror::Error;

use crate::format::FormatError;

/// Errors raised by the editing core.
#[derive(Error, Debug)]
pub enum EditorError {
    /// A keypoint was placed outside the image extent
    #[error("Position ({x:.2}, {y:.2}) lies outside the image")]
    OutOfBounds {
        /// Display-space x of the rejected position
        x: f64,
        /// Display-space y of the rejected position
        y: f64,
    },

    /// An operation referenced a keypoint index that does not exist
    #[error("Keypoint index {index} out of range (store holds {len})")]
    Index {
        /// The offending index
        index: usize,
        /// Number of keypoints at the time of the call
        len: usize,
    },

    /// The image asset could not be decoded
    #[error("Failed to load image '{filename}': {reason}")]
    Decode {
        /// Name of the asset being loaded
        filename: String,
        /// Decoder or network message
        reason: String,
    },

    /// The operation needs a loaded image
    #[error("No image loaded")]
    NoImage,

    /// Every keypoint id has been handed out
    #[error("No keypoint ids left")]
    IdsExhausted,

    /// A download export was requested for an empty store
    #[error("No keypoints to export")]
    NothingToExport,

    /// Label document could not be read
    #[error(transparent)]
    Format(#[from] FormatError),
}

impl EditorError {
    /// Create a decode failure.
    pub fn decode(filename: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            filename: filename.into(),
            reason: reason.into(),
        }
    }
}
