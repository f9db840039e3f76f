//! Data models for the point annotation editor.

mod keypoint;
mod mode;

pub use keypoint::{Keypoint, KeypointId, default_name};
pub use mode::Mode;
