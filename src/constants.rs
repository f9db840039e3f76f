//! Global constants for the point annotation editor

/// Zoom limits and step factors.
pub mod zoom {
    /// Smallest allowed view scale
    pub const MIN_SCALE: f64 = 0.1;
    /// Largest allowed view scale
    pub const MAX_SCALE: f64 = 10.0;
    /// Factor applied by the zoom-in/zoom-out controls
    pub const STEP_FACTOR: f64 = 1.2;
    /// Exponent per wheel notch (factor is `e^intensity`)
    pub const WHEEL_INTENSITY: f64 = 0.1;
}

/// Hit-testing thresholds.
pub mod hit {
    /// Pick radius around a keypoint, in canvas pixels at scale 1.
    pub const RADIUS: f64 = 10.0;
}

/// Layout of the image inside its container.
pub mod layout {
    /// Padding subtracted from the container before fitting
    pub const CONTAINER_PADDING: f64 = 40.0;
    /// Minimum display extent on either axis
    pub const MIN_DISPLAY_SIZE: f64 = 200.0;
}

/// Keypoint marker geometry (in screen pixels; divided by scale when drawn).
pub mod marker {
    pub const RADIUS: f64 = 6.0;
    pub const LINE_WIDTH: f64 = 2.0;
    pub const SELECTED_LINE_WIDTH: f64 = 3.0;
    pub const GLOW_EXTRA_RADIUS: f64 = 2.0;
    pub const GLOW_BLUR: f64 = 10.0;
    pub const LABEL_FONT_SIZE: f64 = 12.0;
    pub const LABEL_OFFSET_Y: f64 = 4.0;
}

/// Label document constants.
pub mod labels {
    /// Value written to every keypoint's `coordinates_type`
    pub const COORDINATES_TYPE: &str = "original_image_pixels";
    /// Tool version recorded in exported metadata
    pub const TOOL_VERSION: &str = "2.0.0";
    /// Filename used when the image has none
    pub const UNKNOWN_FILENAME: &str = "unknown";
    /// Decimal digits kept for exported coordinates
    pub const COORDINATE_DECIMALS: i32 = 6;
    /// Feature tags for a download export
    pub const FEATURES: &[&str] = &["named_keypoints", "drag_drop_support", "mode_switching"];
    /// Extra feature tag for the remote save payload
    pub const SERVER_SAVE_FEATURE: &str = "server_save";
}

/// Image loading.
pub mod image {
    /// Filename used when a remote URL has no last path segment
    pub const FALLBACK_URL_FILENAME: &str = "loaded_image.jpg";
}
