//! Drawing of the image and its keypoint markers.
//!
//! Everything is drawn in display space under the viewport transform. Marker
//! sizes are divided by the view scale so markers keep a constant on-screen
//! size at any zoom.

use crate::constants::marker;
use crate::coords::{DisplaySize, Point};
use crate::store::KeypointStore;
use crate::viewport::Viewport;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    /// `#rrggbb` form for canvas styles.
    pub fn to_css(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Fill and outline of a marker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub fill: Color,
    pub stroke: Color,
    /// Outline width in screen pixels
    pub line_width: f64,
    /// Draw a blurred ring outside the marker
    pub glow: bool,
}

impl MarkerStyle {
    pub const NORMAL: MarkerStyle = MarkerStyle {
        fill: Color::rgb(0xff, 0x47, 0x57),
        stroke: Color::WHITE,
        line_width: marker::LINE_WIDTH,
        glow: false,
    };

    pub const SELECTED: MarkerStyle = MarkerStyle {
        fill: Color::rgb(0xff, 0xa7, 0x26),
        stroke: Color::rgb(0xff, 0x98, 0x00),
        line_width: marker::SELECTED_LINE_WIDTH,
        glow: true,
    };
}

/// Drawing surface the renderer paints on.
///
/// Coordinates passed between `push_transform` and `pop_transform` are in
/// display space.
pub trait DrawTarget {
    /// Clear the whole surface.
    fn clear(&mut self, width: f64, height: f64);

    /// Apply `translate(pan)` then `scale(scale)` until the matching pop.
    fn push_transform(&mut self, pan: (f64, f64), scale: f64);

    fn pop_transform(&mut self);

    /// Draw the loaded image stretched to `size`, at the origin.
    fn draw_image(&mut self, size: DisplaySize);

    /// Filled circle with an outline.
    fn circle(&mut self, center: Point, radius: f64, fill: Color, stroke: Color, line_width: f64);

    /// Unfilled blurred ring.
    fn glow_ring(&mut self, center: Point, radius: f64, color: Color, line_width: f64, blur: f64);

    /// Text centred horizontally on `at`, with `at.y` as the baseline.
    fn label(&mut self, text: &str, at: Point, font_px: f64, color: Color);
}

/// Paints the current editor state onto a [`DrawTarget`].
pub struct Renderer;

impl Renderer {
    /// Redraw the image and all markers.
    pub fn draw(target: &mut impl DrawTarget, viewport: &Viewport, store: &KeypointStore) {
        let display = viewport.display();
        target.clear(display.width, display.height);

        target.push_transform(viewport.pan(), viewport.scale());
        target.draw_image(display);
        for (index, keypoint) in store.iter().enumerate() {
            let style = if store.selected() == Some(index) {
                MarkerStyle::SELECTED
            } else {
                MarkerStyle::NORMAL
            };
            Self::draw_marker(target, keypoint.display(), index, style, viewport.scale());
        }
        target.pop_transform();
    }

    fn draw_marker(
        target: &mut impl DrawTarget,
        center: Point,
        index: usize,
        style: MarkerStyle,
        scale: f64,
    ) {
        let radius = marker::RADIUS / scale;
        target.circle(
            center,
            radius,
            style.fill,
            style.stroke,
            style.line_width / scale,
        );

        if style.glow {
            target.glow_ring(
                center,
                radius + marker::GLOW_EXTRA_RADIUS / scale,
                style.stroke,
                style.line_width / scale,
                marker::GLOW_BLUR / scale,
            );
        }

        // Markers are numbered from 1 in list order
        target.label(
            &(index + 1).to_string(),
            Point::new(center.x, center.y + marker::LABEL_OFFSET_Y / scale),
            marker::LABEL_FONT_SIZE / scale,
            Color::WHITE,
        );
    }
}
