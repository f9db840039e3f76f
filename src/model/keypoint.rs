//! Keypoint entity.

use crate::coords::{CoordinateMapper, Point};

/// Identifier of a keypoint, unique within one store lifetime.
pub type KeypointId = u32;

/// Name given to a keypoint that has none.
pub fn default_name(id: KeypointId) -> String {
    format!("Point {id}")
}

/// One labeled location on the image.
///
/// The original-image position is authoritative. The display position is a
/// cached projection and is only ever written together with the original
/// position, through a [`CoordinateMapper`].
#[derive(Debug, Clone, PartialEq)]
pub struct Keypoint {
    id: KeypointId,
    name: String,
    original: Point,
    display: Point,
}

impl Keypoint {
    /// Create a keypoint from its canonical position.
    pub(crate) fn from_original(
        id: KeypointId,
        name: String,
        original: Point,
        mapper: &CoordinateMapper,
    ) -> Self {
        Self {
            id,
            name,
            original,
            display: mapper.to_display(original),
        }
    }

    /// Create a keypoint from a display-space position.
    pub(crate) fn from_display(id: KeypointId, display: Point, mapper: &CoordinateMapper) -> Self {
        Self {
            id,
            name: default_name(id),
            original: mapper.to_original(display),
            display,
        }
    }

    pub fn id(&self) -> KeypointId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Position in original-image pixels.
    pub fn original(&self) -> Point {
        self.original
    }

    /// Position in current display space.
    pub fn display(&self) -> Point {
        self.display
    }

    /// Set a new name; empty names fall back to the default.
    pub(crate) fn rename(&mut self, name: &str) {
        self.name = if name.is_empty() {
            default_name(self.id)
        } else {
            name.to_string()
        };
    }

    /// Move to a display-space position, updating both projections.
    pub(crate) fn move_to_display(&mut self, display: Point, mapper: &CoordinateMapper) {
        self.original = mapper.to_original(display);
        self.display = display;
    }

    /// Recompute the display cache from the canonical position.
    pub(crate) fn reproject(&mut self, mapper: &CoordinateMapper) {
        self.display = mapper.to_display(self.original);
    }
}
