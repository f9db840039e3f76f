//! Payloads for the remote "save labels" endpoint.
//!
//! The server that launched the editor with `?imageUrl=...&imagePath=...`
//! accepts the label document back at `/save_labels` on the same origin,
//! together with the opaque image path it handed out.

use serde::{Deserialize, Serialize};

use crate::format::LabelDocument;

/// Body of the save request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveRequest {
    pub labels: LabelDocument,
    /// Echoed back unchanged from the launch parameters
    pub image_path: Option<String>,
}

/// Reply from the save endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveResponse {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    /// Where the server wrote the labels
    #[serde(default)]
    pub path: Option<String>,
}

impl SaveResponse {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    /// One-line acknowledgment for the user.
    pub fn summary(&self) -> String {
        if self.is_success() {
            match &self.path {
                Some(path) => format!("Labels saved to server successfully ({})", path),
                None => "Labels saved to server successfully!".to_string(),
            }
        } else {
            format!(
                "Error saving labels: {}",
                self.message.as_deref().unwrap_or("unknown error")
            )
        }
    }
}

/// Save endpoint on the same origin as `image_url`.
///
/// Returns `None` when the URL has no `scheme://host` prefix.
pub fn save_endpoint(image_url: &str) -> Option<String> {
    let (scheme, rest) = image_url.split_once("://")?;
    let host = rest.split(['/', '?', '#']).next()?;
    if scheme.is_empty() || host.is_empty() {
        return None;
    }
    Some(format!("{}://{}/save_labels", scheme, host))
}
