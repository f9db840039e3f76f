//! Zoom/pan state of the image view.
//!
//! The view draws display space through `translate(pan) * scale(scale)`, so a
//! canvas pixel `c` shows display point `(c - pan) / scale`.
//!
//! Zoom is all-or-nothing: a change that would leave `[MIN_SCALE, MAX_SCALE]`
//! is rejected and leaves both scale and pan untouched, rather than clamping.

use crate::constants::{hit, zoom};
use crate::coords::{DisplaySize, Point};
use crate::input::ClientRect;

/// Zoom and pan over a fixed display size.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    scale: f64,
    pan_x: f64,
    pan_y: f64,
    display: DisplaySize,
    fitted: bool,
}

impl Viewport {
    /// Create a viewport that has not been fit to a container yet.
    pub fn new(display: DisplaySize) -> Self {
        Self {
            scale: 1.0,
            pan_x: 0.0,
            pan_y: 0.0,
            display,
            fitted: false,
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn pan(&self) -> (f64, f64) {
        (self.pan_x, self.pan_y)
    }

    pub fn display(&self) -> DisplaySize {
        self.display
    }

    /// Zoom as a rounded percentage, for status display.
    pub fn zoom_percent(&self) -> u32 {
        // Scale is bounded to [0.1, 10], so this is always in 10..=1000
        (self.scale * 100.0).round() as u32
    }

    /// Client pixels to canvas-internal pixels.
    ///
    /// The canvas backing store is the display size rounded to whole pixels;
    /// CSS may stretch it, so the offset inside the element is rescaled by
    /// `backing / css` per axis.
    pub fn client_to_canvas(&self, client: Point, rect: &ClientRect) -> Point {
        let (backing_w, backing_h) = self.display.canvas_pixels();
        let ratio_x = if rect.width > 0.0 {
            f64::from(backing_w) / rect.width
        } else {
            1.0
        };
        let ratio_y = if rect.height > 0.0 {
            f64::from(backing_h) / rect.height
        } else {
            1.0
        };
        Point::new(
            (client.x - rect.left) * ratio_x,
            (client.y - rect.top) * ratio_y,
        )
    }

    /// Canvas pixels to display space, undoing pan and scale.
    pub fn canvas_to_display(&self, canvas: Point) -> Point {
        Point::new(
            (canvas.x - self.pan_x) / self.scale,
            (canvas.y - self.pan_y) / self.scale,
        )
    }

    /// Client pixels straight to display space.
    pub fn screen_to_display(&self, client: Point, rect: &ClientRect) -> Point {
        self.canvas_to_display(self.client_to_canvas(client, rect))
    }

    /// Hit radius in display space at the current scale.
    pub fn hit_threshold(&self) -> f64 {
        hit::RADIUS / self.scale
    }

    fn accepts(new_scale: f64) -> bool {
        (zoom::MIN_SCALE..=zoom::MAX_SCALE).contains(&new_scale)
    }

    /// Zoom by `factor`, keeping the image point under `anchor` (canvas pixels) fixed.
    ///
    /// Returns false, changing nothing, if the new scale would be out of range.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        let new_scale = self.scale * factor;
        if !Self::accepts(new_scale) {
            log::debug!(
                "Zoom rejected: {:.3} x {:.3} leaves [{}, {}]",
                self.scale,
                factor,
                zoom::MIN_SCALE,
                zoom::MAX_SCALE
            );
            return false;
        }

        self.pan_x = anchor.x - (anchor.x - self.pan_x) * factor;
        self.pan_y = anchor.y - (anchor.y - self.pan_y) * factor;
        self.scale = new_scale;
        log::debug!(
            "Zoom-to-cursor: {:.2}x at ({:.1}, {:.1}), pan: ({:.1}, {:.1})",
            self.scale,
            anchor.x,
            anchor.y,
            self.pan_x,
            self.pan_y
        );
        true
    }

    /// Zoom by `factor` around the pan origin (pan is left alone).
    pub fn zoom_step(&mut self, factor: f64) -> bool {
        let new_scale = self.scale * factor;
        if !Self::accepts(new_scale) {
            return false;
        }
        self.scale = new_scale;
        log::debug!("Zoom step: {:.2}x", self.scale);
        true
    }

    pub fn zoom_in(&mut self) -> bool {
        self.zoom_step(zoom::STEP_FACTOR)
    }

    pub fn zoom_out(&mut self) -> bool {
        self.zoom_step(1.0 / zoom::STEP_FACTOR)
    }

    /// Back to scale 1 with no pan.
    pub fn reset(&mut self) {
        self.scale = 1.0;
        self.pan_x = 0.0;
        self.pan_y = 0.0;
        log::debug!("View reset");
    }

    /// Shift the view by a screen-pixel delta.
    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.pan_x += dx;
        self.pan_y += dy;
    }

    /// Adopt new display dimensions after a container resize.
    ///
    /// Scale and pan are preserved, except on the first fit after the
    /// viewport was created, which also resets the view.
    pub fn resize(&mut self, display: DisplaySize) {
        self.display = display;
        if !self.fitted {
            self.reset();
            self.fitted = true;
        }
    }
}

/// Zoom factor for one wheel event: `e^0.1` when scrolling up, `e^-0.1` otherwise.
pub fn wheel_zoom_factor(delta_y: f64) -> f64 {
    let direction = if delta_y < 0.0 { 1.0 } else { -1.0 };
    (direction * zoom::WHEEL_INTENSITY).exp()
}
