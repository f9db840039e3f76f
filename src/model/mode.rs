//! Editing mode.

/// Persistent, user-toggled editing mode.
///
/// Orthogonal to the transient pointer state kept by the interaction
/// controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Plain drags pan the view
    #[default]
    Navigation,
    /// Plain clicks place keypoints
    Keypoint,
}

impl Mode {
    /// Get the display name for this mode.
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Navigation => "Navigation Mode",
            Mode::Keypoint => "Add Keypoint Mode",
        }
    }

    /// The other mode.
    pub fn toggled(&self) -> Mode {
        match self {
            Mode::Navigation => Mode::Keypoint,
            Mode::Keypoint => Mode::Navigation,
        }
    }
}
