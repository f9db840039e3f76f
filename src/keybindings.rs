//! Customizable keybindings for the editor.
//!
//! Each view action is bound to one or more DOM keys. The modifier key used
//! for ctrl-panning is not rebindable; it is read from the pointer event.

use serde::{Deserialize, Serialize};

use crate::input::Key;

/// Keyboard-triggered editor actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAction {
    ZoomIn,
    ZoomOut,
    ResetView,
    /// Leave keypoint mode (no effect in navigation mode)
    ExitKeypointMode,
}

impl KeyAction {
    /// All actions, in settings order.
    pub fn all() -> &'static [KeyAction] {
        &[
            KeyAction::ZoomIn,
            KeyAction::ZoomOut,
            KeyAction::ResetView,
            KeyAction::ExitKeypointMode,
        ]
    }
}

/// Keybinding configuration for the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyBindings {
    pub zoom_in: Vec<Key>,
    pub zoom_out: Vec<Key>,
    pub reset_view: Vec<Key>,
    pub exit_keypoint_mode: Vec<Key>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            zoom_in: vec![Key::Char('+'), Key::Char('=')],
            zoom_out: vec![Key::Char('-')],
            reset_view: vec![Key::Char('0')],
            exit_keypoint_mode: vec![Key::Escape],
        }
    }
}

impl KeyBindings {
    /// Get the action that corresponds to a key press, if any.
    pub fn action_for_key(&self, key: &Key) -> Option<KeyAction> {
        KeyAction::all()
            .iter()
            .copied()
            .find(|action| self.keys_for(*action).contains(key))
    }

    /// Get the keys bound to an action.
    pub fn keys_for(&self, action: KeyAction) -> &[Key] {
        match action {
            KeyAction::ZoomIn => &self.zoom_in,
            KeyAction::ZoomOut => &self.zoom_out,
            KeyAction::ResetView => &self.reset_view,
            KeyAction::ExitKeypointMode => &self.exit_keypoint_mode,
        }
    }

    /// Replace the keys bound to an action.
    pub fn set_keys(&mut self, action: KeyAction, keys: Vec<Key>) {
        let slot = match action {
            KeyAction::ZoomIn => &mut self.zoom_in,
            KeyAction::ZoomOut => &mut self.zoom_out,
            KeyAction::ResetView => &mut self.reset_view,
            KeyAction::ExitKeypointMode => &mut self.exit_keypoint_mode,
        };
        *slot = keys;
    }

    /// Check if a key is already used by any binding other than `exclude`.
    /// Returns the conflicting action, if any.
    pub fn key_conflict(&self, key: &Key, exclude: Option<KeyAction>) -> Option<KeyAction> {
        KeyAction::all()
            .iter()
            .copied()
            .filter(|action| Some(*action) != exclude)
            .find(|action| self.keys_for(*action).contains(key))
    }

    /// First key bound to two different actions, with both actions.
    pub fn first_conflict(&self) -> Option<(Key, KeyAction, KeyAction)> {
        KeyAction::all().iter().copied().find_map(|action| {
            self.keys_for(action).iter().find_map(|key| {
                self.key_conflict(key, Some(action))
                    .map(|other| (key.clone(), action, other))
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_bindings() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.action_for_key(&Key::Char('+')),
            Some(KeyAction::ZoomIn)
        );
        assert_eq!(
            bindings.action_for_key(&Key::Char('=')),
            Some(KeyAction::ZoomIn)
        );
        assert_eq!(
            bindings.action_for_key(&Key::Char('-')),
            Some(KeyAction::ZoomOut)
        );
        assert_eq!(
            bindings.action_for_key(&Key::Char('0')),
            Some(KeyAction::ResetView)
        );
        assert_eq!(
            bindings.action_for_key(&Key::Escape),
            Some(KeyAction::ExitKeypointMode)
        );
        assert_eq!(bindings.action_for_key(&Key::Char('x')), None);
        assert_eq!(bindings.action_for_key(&Key::Control), None);
    }

    #[test]
    fn test_set_keys() {
        let mut bindings = KeyBindings::default();
        bindings.set_keys(KeyAction::ResetView, vec![Key::Char('r')]);
        assert_eq!(bindings.action_for_key(&Key::Char('0')), None);
        assert_eq!(
            bindings.action_for_key(&Key::Char('r')),
            Some(KeyAction::ResetView)
        );
        assert_eq!(bindings.keys_for(KeyAction::ResetView), &[Key::Char('r')]);
    }

    #[test]
    fn test_key_conflict() {
        let bindings = KeyBindings::default();
        assert_eq!(
            bindings.key_conflict(&Key::Char('='), None),
            Some(KeyAction::ZoomIn)
        );
        assert_eq!(
            bindings.key_conflict(&Key::Char('='), Some(KeyAction::ZoomIn)),
            None
        );
        assert_eq!(bindings.key_conflict(&Key::Char('q'), None), None);
    }

    #[test]
    fn test_first_conflict() {
        let mut bindings = KeyBindings::default();
        assert_eq!(bindings.first_conflict(), None);

        bindings.set_keys(KeyAction::ResetView, vec![Key::Char('r'), Key::Char('-')]);
        assert_eq!(
            bindings.first_conflict(),
            Some((Key::Char('-'), KeyAction::ZoomOut, KeyAction::ResetView))
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let bindings: KeyBindings = serde_json::from_str(r#"{"zoom_out":["_"]}"#).unwrap();
        assert_eq!(bindings.zoom_out, vec![Key::Char('_')]);
        assert_eq!(bindings.zoom_in, KeyBindings::default().zoom_in);
    }
}
