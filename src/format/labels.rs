//! Keypoint label document.
//!
//! One JSON document per image. Coordinates are always in original-image
//! pixels, so a document stays valid regardless of how the image was viewed
//! while it was edited.
//!
//! ```json
//! {
//!   "image": { "width": 800, "height": 600, "filename": "cat.jpg" },
//!   "keypoints": [
//!     { "id": 1, "name": "Nose", "x": 412.5, "y": 300.0,
//!       "coordinates_type": "original_image_pixels" }
//!   ],
//!   "metadata": { "created_at": "...", "tool_version": "2.0.0",
//!                 "total_keypoints": 1, "features": ["named_keypoints"] }
//! }
//! ```

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::labels;
use crate::coords::ImageSize;
use crate::format::error::FormatError;
use crate::model::KeypointId;
use crate::store::{KeypointEntry, KeypointStore};

/// Complete label document as written on export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelDocument {
    pub image: ImageInfo,
    pub keypoints: Vec<KeypointRecord>,
    pub metadata: LabelMetadata,
}

/// The image the labels belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    pub filename: String,
}

/// One exported keypoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeypointRecord {
    pub id: KeypointId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub coordinates_type: String,
}

/// Provenance of a label document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelMetadata {
    /// ISO 8601 UTC timestamp with millisecond precision
    pub created_at: String,
    pub tool_version: String,
    pub total_keypoints: usize,
    pub features: Vec<String>,
}

/// Where an exported document is headed. Only changes the feature tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    /// File download
    Download,
    /// Remote save endpoint
    RemoteSave,
}

impl ExportTarget {
    fn features(&self) -> Vec<String> {
        let mut features: Vec<String> = labels::FEATURES.iter().map(|f| f.to_string()).collect();
        if *self == ExportTarget::RemoteSave {
            features.push(labels::SERVER_SAVE_FEATURE.to_string());
        }
        features
    }
}

/// A parsed, validated label document ready to be loaded into a store.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelImport {
    pub keypoints: Vec<KeypointEntry>,
    /// Image dimensions recorded in the document, when both are present
    pub image: Option<ImageSize>,
}

impl LabelImport {
    /// Whether the recorded dimensions disagree with `current`.
    pub fn dimension_mismatch(&self, current: ImageSize) -> bool {
        self.image.is_some_and(|recorded| recorded != current)
    }
}

#[derive(Deserialize)]
struct RawEntry {
    #[serde(default)]
    id: Option<KeypointId>,
    #[serde(default)]
    name: Option<String>,
    x: f64,
    y: f64,
}

/// Round to the exported precision. Values too large to scale are already
/// coarser than that precision and are kept as they are.
fn round_coordinate(value: f64) -> f64 {
    let factor = 10f64.powi(labels::COORDINATE_DECIMALS);
    let scaled = value * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        value
    }
}

/// Reads and writes label documents.
pub struct LabelCodec;

impl LabelCodec {
    /// Build the document for the current store contents.
    pub fn document(
        store: &KeypointStore,
        filename: Option<&str>,
        created_at: DateTime<Utc>,
        target: ExportTarget,
    ) -> LabelDocument {
        let image = store.mapper().image();
        let keypoints: Vec<KeypointRecord> = store
            .iter()
            .map(|kp| KeypointRecord {
                id: kp.id(),
                name: kp.name().to_string(),
                x: round_coordinate(kp.original().x),
                y: round_coordinate(kp.original().y),
                coordinates_type: labels::COORDINATES_TYPE.to_string(),
            })
            .collect();

        LabelDocument {
            image: ImageInfo {
                width: image.width,
                height: image.height,
                filename: filename
                    .filter(|name| !name.is_empty())
                    .unwrap_or(labels::UNKNOWN_FILENAME)
                    .to_string(),
            },
            metadata: LabelMetadata {
                created_at: created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
                tool_version: labels::TOOL_VERSION.to_string(),
                total_keypoints: keypoints.len(),
                features: target.features(),
            },
            keypoints,
        }
    }

    /// Serialize with 2-space indentation.
    pub fn encode(document: &LabelDocument) -> Result<String, FormatError> {
        let json = serde_json::to_string_pretty(document)?;
        log::info!(
            "Encoded {} keypoints for '{}'",
            document.keypoints.len(),
            document.image.filename
        );
        Ok(json)
    }

    /// Parse and validate a label document.
    ///
    /// Only `keypoints` is required. Every entry needs numeric `x`/`y`; `id`
    /// and `name` are optional. Explicit ids must be unique (0 counts as
    /// absent). Nothing is returned unless the whole document is valid.
    pub fn decode(text: &str) -> Result<LabelImport, FormatError> {
        let root: Value = serde_json::from_str(text)?;

        let entries = root
            .get("keypoints")
            .and_then(Value::as_array)
            .ok_or_else(|| FormatError::validation("Missing keypoints array"))?;

        let mut seen = HashSet::new();
        let mut keypoints = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            let raw = RawEntry::deserialize(entry).map_err(|e| {
                FormatError::validation(format!("Keypoint {}: {}", index, e))
            })?;

            if raw.id == Some(KeypointId::MAX) {
                return Err(FormatError::validation(format!(
                    "Keypoint {}: id {} is out of range",
                    index,
                    KeypointId::MAX
                )));
            }
            if let Some(id) = raw.id.filter(|id| *id > 0) {
                if !seen.insert(id) {
                    return Err(FormatError::validation(format!(
                        "Duplicate keypoint id {}",
                        id
                    )));
                }
            }

            keypoints.push(KeypointEntry {
                id: raw.id,
                name: raw.name,
                x: raw.x,
                y: raw.y,
            });
        }

        let image = root.get("image").and_then(|image| {
            let width = image.get("width")?.as_u64()?;
            let height = image.get("height")?.as_u64()?;
            Some(ImageSize::new(
                u32::try_from(width).ok()?,
                u32::try_from(height).ok()?,
            ))
        });

        log::info!("Decoded label document with {} keypoints", keypoints.len());
        Ok(LabelImport { keypoints, image })
    }

    /// Download filename for an image's labels.
    ///
    /// `cat.jpg` becomes `cat.json`; without a filename the name is stamped
    /// with the current time in milliseconds.
    pub fn export_filename(filename: Option<&str>, now: DateTime<Utc>) -> String {
        match filename.filter(|name| !name.is_empty()) {
            Some(name) => {
                let stem = match name.rfind('.') {
                    Some(dot) if dot + 1 < name.len() && !name[dot..].contains('/') => {
                        &name[..dot]
                    }
                    _ => name,
                };
                format!("{}.json", stem)
            }
            None => format!("image_labels_{}.json", now.timestamp_millis()),
        }
    }
}
