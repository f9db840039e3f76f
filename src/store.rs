//! Ordered keypoint storage.
//!
//! Append order doubles as z-order: later keypoints draw on top and win hit
//! tests. Selection is tracked by index and kept consistent across removals.

use crate::coords::{CoordinateMapper, DisplaySize, Point};
use crate::error::EditorError;
use crate::model::{Keypoint, KeypointId, default_name};

/// A keypoint read from a label document, in original-image pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct KeypointEntry {
    /// Requested id; `None` allocates a fresh one
    pub id: Option<KeypointId>,
    /// Requested name; `None` uses the default
    pub name: Option<String>,
    pub x: f64,
    pub y: f64,
}

/// Keypoints of the currently loaded image.
#[derive(Debug, Clone)]
pub struct KeypointStore {
    keypoints: Vec<Keypoint>,
    next_id: KeypointId,
    selected: Option<usize>,
    mapper: CoordinateMapper,
}

impl KeypointStore {
    /// Create an empty store projecting through `mapper`.
    pub fn new(mapper: CoordinateMapper) -> Self {
        Self {
            keypoints: Vec::new(),
            next_id: 1,
            selected: None,
            mapper,
        }
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Get the number of keypoints.
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    /// Check if there are no keypoints.
    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Get a keypoint by index.
    pub fn get(&self, index: usize) -> Option<&Keypoint> {
        self.keypoints.get(index)
    }

    /// Get all keypoints in append order.
    pub fn iter(&self) -> impl Iterator<Item = &Keypoint> {
        self.keypoints.iter()
    }

    /// The id the next added keypoint will receive.
    pub fn next_id(&self) -> KeypointId {
        self.next_id
    }

    /// Index of the selected keypoint, if any.
    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    /// Whether a display-space point lies on the image.
    pub fn contains(&self, display: Point) -> bool {
        self.mapper.contains_display(display)
    }

    fn check_index(&self, index: usize) -> Result<(), EditorError> {
        if index < self.keypoints.len() {
            Ok(())
        } else {
            Err(EditorError::Index {
                index,
                len: self.keypoints.len(),
            })
        }
    }

    /// Append a keypoint at a display-space position.
    pub fn add(&mut self, display: Point) -> Result<&Keypoint, EditorError> {
        if !self.contains(display) {
            return Err(EditorError::OutOfBounds {
                x: display.x,
                y: display.y,
            });
        }

        let id = self.next_id;
        self.next_id = id.checked_add(1).ok_or(EditorError::IdsExhausted)?;
        let keypoint = Keypoint::from_display(id, display, &self.mapper);
        log::info!(
            "Added keypoint {} at ({:.2}, {:.2}) original px",
            id,
            keypoint.original().x,
            keypoint.original().y
        );
        self.keypoints.push(keypoint);
        Ok(&self.keypoints[self.keypoints.len() - 1])
    }

    /// Remove the keypoint at `index`, shifting the selection as needed.
    pub fn remove(&mut self, index: usize) -> Result<Keypoint, EditorError> {
        self.check_index(index)?;
        let removed = self.keypoints.remove(index);

        self.selected = match self.selected {
            Some(s) if s == index => None,
            Some(s) if s > index => Some(s - 1),
            other => other,
        };

        log::info!("Removed keypoint {} ({})", removed.id(), removed.name());
        Ok(removed)
    }

    /// Move the keypoint at `index` to a display-space position.
    ///
    /// Positions off the image are ignored and return `Ok(false)`; an unknown
    /// index is an error.
    pub fn move_to(&mut self, index: usize, display: Point) -> Result<bool, EditorError> {
        self.check_index(index)?;
        if !self.contains(display) {
            return Ok(false);
        }
        self.keypoints[index].move_to_display(display, &self.mapper);
        Ok(true)
    }

    /// Rename the keypoint at `index`. An empty name restores the default.
    pub fn rename(&mut self, index: usize, name: &str) -> Result<(), EditorError> {
        self.check_index(index)?;
        self.keypoints[index].rename(name);
        Ok(())
    }

    /// Find the topmost keypoint within `threshold` display pixels.
    pub fn hit_test(&self, display: Point, threshold: f64) -> Option<usize> {
        self.keypoints
            .iter()
            .rposition(|kp| kp.display().distance_to(&display) <= threshold)
    }

    /// Toggle selection of `index`.
    pub fn select(&mut self, index: usize) -> Result<Option<usize>, EditorError> {
        self.check_index(index)?;
        self.selected = if self.selected == Some(index) {
            None
        } else {
            Some(index)
        };
        Ok(self.selected)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Recompute every display projection for new display dimensions.
    pub fn reproject_all(&mut self, display: DisplaySize) {
        self.mapper = CoordinateMapper::new(self.mapper.image(), display);
        for keypoint in &mut self.keypoints {
            keypoint.reproject(&self.mapper);
        }
    }

    /// Remove all keypoints and restart id allocation at 1.
    pub fn clear(&mut self) {
        self.keypoints.clear();
        self.next_id = 1;
        self.selected = None;
    }

    /// Replace the contents with imported entries.
    ///
    /// Explicit ids are kept; missing ones (or 0) are allocated after the
    /// largest explicit id. Duplicate ids must be rejected by the caller.
    /// Fails without touching the store if the ids would not fit in
    /// [`KeypointId`].
    pub fn bulk_load(&mut self, entries: Vec<KeypointEntry>) -> Result<(), EditorError> {
        let max_explicit = entries
            .iter()
            .filter_map(|e| e.id.filter(|id| *id > 0))
            .max()
            .unwrap_or(0);
        let mut next_auto = max_explicit
            .checked_add(1)
            .ok_or(EditorError::IdsExhausted)?;

        let mut keypoints = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = match entry.id.filter(|id| *id > 0) {
                Some(id) => id,
                None => {
                    let id = next_auto;
                    next_auto = id.checked_add(1).ok_or(EditorError::IdsExhausted)?;
                    id
                }
            };
            let name = entry
                .name
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| default_name(id));
            keypoints.push(Keypoint::from_original(
                id,
                name,
                Point::new(entry.x, entry.y),
                &self.mapper,
            ));
        }

        let max_id = keypoints.iter().map(Keypoint::id).max().unwrap_or(0);
        self.next_id = max_id.checked_add(1).ok_or(EditorError::IdsExhausted)?;
        self.keypoints = keypoints;
        self.selected = None;
        log::info!(
            "Loaded {} keypoints, next id {}",
            self.keypoints.len(),
            self.next_id
        );
        Ok(())
    }
}
