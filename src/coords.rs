//! Conversion between display space and original-image space.
//!
//! Display space is the image as fit into its container at 1:1 canvas
//! resolution, before zoom/pan. Original-image space is the asset's own pixel
//! grid and is the only frame that gets persisted.

use serde::{Deserialize, Serialize};

use crate::constants::layout;

/// A 2D point. The coordinate frame is given by context.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Natural pixel dimensions of a decoded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub width: u32,
    pub height: u32,
}

impl ImageSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }
}

/// Size of the image in display space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplaySize {
    pub width: f64,
    pub height: f64,
}

impl DisplaySize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Size of the canvas backing store for this display, in whole pixels.
    pub fn canvas_pixels(&self) -> (u32, u32) {
        (self.width.round() as u32, self.height.round() as u32)
    }

    /// Fit an image into a container, preserving aspect ratio.
    ///
    /// The container loses [`layout::CONTAINER_PADDING`] on each axis and is
    /// never considered smaller than [`layout::MIN_DISPLAY_SIZE`].
    pub fn fit(image: ImageSize, container_width: f64, container_height: f64) -> Self {
        let avail_w = (container_width - layout::CONTAINER_PADDING).max(layout::MIN_DISPLAY_SIZE);
        let avail_h = (container_height - layout::CONTAINER_PADDING).max(layout::MIN_DISPLAY_SIZE);

        let image_aspect = image.aspect();
        if image_aspect > avail_w / avail_h {
            Self::new(avail_w, avail_w / image_aspect)
        } else {
            Self::new(avail_h * image_aspect, avail_h)
        }
    }
}

/// Stateless projection between display and original-image pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    image: ImageSize,
    display: DisplaySize,
}

impl CoordinateMapper {
    pub fn new(image: ImageSize, display: DisplaySize) -> Self {
        Self { image, display }
    }

    pub fn image(&self) -> ImageSize {
        self.image
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    /// Display-space point to original-image pixels.
    pub fn to_original(&self, display: Point) -> Point {
        Point::new(
            display.x / self.display.width * f64::from(self.image.width),
            display.y / self.display.height * f64::from(self.image.height),
        )
    }

    /// Original-image pixels to display space.
    pub fn to_display(&self, original: Point) -> Point {
        Point::new(
            original.x / f64::from(self.image.width) * self.display.width,
            original.y / f64::from(self.image.height) * self.display.height,
        )
    }

    /// Whether a display-space point lies on the image (edges inclusive).
    pub fn contains_display(&self, display: Point) -> bool {
        display.x >= 0.0
            && display.x <= self.display.width
            && display.y >= 0.0
            && display.y <= self.display.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn mapper() -> CoordinateMapper {
        CoordinateMapper::new(ImageSize::new(800, 600), DisplaySize::new(400.0, 300.0))
    }

    #[test]
    fn test_point_distance() {
        let p1 = Point::new(0.0, 0.0);
        let p2 = Point::new(3.0, 4.0);
        assert_abs_diff_eq!(p1.distance_to(&p2), 5.0);
    }

    #[test]
    fn test_to_original_scales_up() {
        let original = mapper().to_original(Point::new(200.0, 150.0));
        assert_abs_diff_eq!(original.x, 400.0);
        assert_abs_diff_eq!(original.y, 300.0);
    }

    #[test]
    fn test_round_trip_over_image_extent() {
        // Awkward ratio so the projection is not exact in binary
        let m = CoordinateMapper::new(ImageSize::new(1923, 1081), DisplaySize::new(733.7, 412.4));
        for i in 0..=20 {
            for j in 0..=20 {
                let original = Point::new(1923.0 * f64::from(i) / 20.0, 1081.0 * f64::from(j) / 20.0);
                let back = m.to_original(m.to_display(original));
                assert_abs_diff_eq!(back.x, original.x, epsilon = 1e-6);
                assert_abs_diff_eq!(back.y, original.y, epsilon = 1e-6);
            }
        }
    }

    #[test]
    fn test_contains_display_edges() {
        let m = mapper();
        assert!(m.contains_display(Point::new(0.0, 0.0)));
        assert!(m.contains_display(Point::new(400.0, 300.0)));
        assert!(!m.contains_display(Point::new(-5.0, 10.0)));
        assert!(!m.contains_display(Point::new(200.0, 300.1)));
    }

    #[test]
    fn test_fit_wide_image_is_width_limited() {
        let size = DisplaySize::fit(ImageSize::new(800, 400), 840.0, 840.0);
        assert_abs_diff_eq!(size.width, 800.0);
        assert_abs_diff_eq!(size.height, 400.0);
    }

    #[test]
    fn test_fit_tall_image_is_height_limited() {
        let size = DisplaySize::fit(ImageSize::new(300, 600), 1000.0, 640.0);
        assert_abs_diff_eq!(size.height, 600.0);
        assert_abs_diff_eq!(size.width, 300.0);
    }

    #[test]
    fn test_fit_respects_minimum_size() {
        let size = DisplaySize::fit(ImageSize::new(100, 100), 50.0, 50.0);
        assert_abs_diff_eq!(size.width, 200.0);
        assert_abs_diff_eq!(size.height, 200.0);
    }

    #[test]
    fn test_fit_keeps_aspect_locked() {
        let image = ImageSize::new(1920, 1080);
        let size = DisplaySize::fit(image, 1013.0, 777.0);
        assert_abs_diff_eq!(
            size.width / f64::from(image.width),
            size.height / f64::from(image.height),
            epsilon = 1e-12
        );
    }
}
