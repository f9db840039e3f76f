//! Canvas 2D drawing target for the browser build.

use std::f64::consts::TAU;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::coords::{DisplaySize, Point};
use crate::render::{Color, DrawTarget};

/// [`DrawTarget`] over a `CanvasRenderingContext2d`.
///
/// Canvas calls that can throw are logged and skipped; a failed marker
/// must not abort the rest of the frame.
pub struct CanvasTarget {
    ctx: CanvasRenderingContext2d,
    image: Option<HtmlImageElement>,
}

impl CanvasTarget {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx, image: None }
    }

    /// Replace the decoded image drawn under the markers.
    pub fn set_image(&mut self, image: HtmlImageElement) {
        self.image = Some(image);
    }

    fn check(result: Result<(), JsValue>, what: &str) {
        if let Err(e) = result {
            log::warn!("Canvas {} failed: {:?}", what, e);
        }
    }

    fn arc(&self, center: Point, radius: f64) {
        self.ctx.begin_path();
        Self::check(self.ctx.arc(center.x, center.y, radius, 0.0, TAU), "arc");
    }
}

impl DrawTarget for CanvasTarget {
    fn clear(&mut self, width: f64, height: f64) {
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    fn push_transform(&mut self, pan: (f64, f64), scale: f64) {
        self.ctx.save();
        Self::check(self.ctx.translate(pan.0, pan.1), "translate");
        Self::check(self.ctx.scale(scale, scale), "scale");
    }

    fn pop_transform(&mut self) {
        self.ctx.restore();
    }

    fn draw_image(&mut self, size: DisplaySize) {
        if let Some(image) = &self.image {
            Self::check(
                self.ctx
                    .draw_image_with_html_image_element_and_dw_and_dh(
                        image,
                        0.0,
                        0.0,
                        size.width,
                        size.height,
                    ),
                "drawImage",
            );
        }
    }

    fn circle(&mut self, center: Point, radius: f64, fill: Color, stroke: Color, line_width: f64) {
        self.ctx.set_fill_style_str(&fill.to_css());
        self.ctx.set_stroke_style_str(&stroke.to_css());
        self.ctx.set_line_width(line_width);
        self.arc(center, radius);
        self.ctx.fill();
        self.ctx.stroke();
    }

    fn glow_ring(&mut self, center: Point, radius: f64, color: Color, line_width: f64, blur: f64) {
        self.ctx.save();
        self.ctx.set_shadow_color(&color.to_css());
        self.ctx.set_shadow_blur(blur);
        self.ctx.set_stroke_style_str(&color.to_css());
        self.ctx.set_line_width(line_width);
        self.arc(center, radius);
        self.ctx.stroke();
        self.ctx.restore();
    }

    fn label(&mut self, text: &str, at: Point, font_px: f64, color: Color) {
        self.ctx.set_fill_style_str(&color.to_css());
        self.ctx.set_font(&format!("{}px Arial", font_px));
        self.ctx.set_text_align("center");
        Self::check(self.ctx.fill_text(text, at.x, at.y), "fillText");
    }
}
