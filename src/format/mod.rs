//! Label document import/export.
//!
//! Labels are exchanged as a single JSON document per image (see
//! [`LabelDocument`]). Export always writes original-image pixel coordinates;
//! import validates the whole document before anything is loaded.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pointmark::format::{ExportTarget, LabelCodec};
//!
//! let doc = LabelCodec::document(&store, Some("cat.jpg"), chrono::Utc::now(), ExportTarget::Download);
//! let json = LabelCodec::encode(&doc)?;
//! let parsed = LabelCodec::decode(&json)?;
//! ```

mod error;
mod labels;

#[cfg(test)]
mod tests;

pub use error::FormatError;
pub use labels::{
    ExportTarget, ImageInfo, KeypointRecord, LabelCodec, LabelDocument, LabelImport, LabelMetadata,
};
