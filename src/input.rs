//! Raw pointer and keyboard input as delivered by the host page.
//!
//! These types carry device-level values only (client pixels, DOM button
//! numbers, DOM key names). Conversion into display space happens in
//! [`crate::viewport::Viewport`].

use serde::{Deserialize, Serialize};

use crate::coords::Point;

/// Mouse buttons, numbered as in DOM `MouseEvent.button`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Primary,
    Middle,
    Secondary,
    Other(i16),
}

impl MouseButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            0 => MouseButton::Primary,
            1 => MouseButton::Middle,
            2 => MouseButton::Secondary,
            other => MouseButton::Other(other),
        }
    }
}

/// Keyboard modifiers held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Ctrl is the only modifier the editor reacts to (ctrl-pan).
    pub ctrl: bool,
}

impl Modifiers {
    pub fn ctrl() -> Self {
        Self { ctrl: true }
    }
}

/// Bounding rectangle of the canvas element in client (CSS) pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClientRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl ClientRect {
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
}

/// A pointer press, move or release.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerInput {
    /// Pointer position in client pixels.
    pub client: Point,
    /// Canvas element rectangle at the time of the event.
    pub rect: ClientRect,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl PointerInput {
    pub fn new(client: Point, rect: ClientRect, button: MouseButton) -> Self {
        Self {
            client,
            rect,
            button,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

/// A wheel notch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelInput {
    pub client: Point,
    pub rect: ClientRect,
    /// DOM `WheelEvent.deltaY`; negative scrolls up (zoom in).
    pub delta_y: f64,
}

/// Keyboard keys, identified by their DOM `KeyboardEvent.key` value.
///
/// Serialized as the DOM key name so configuration files stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Key {
    Char(char),
    Escape,
    Control,
    Named(String),
}

impl Key {
    /// Parse a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Key::Char(c),
            _ => match key {
                "Escape" | "Esc" => Key::Escape,
                "Control" => Key::Control,
                other => Key::Named(other.to_string()),
            },
        }
    }

    /// The DOM name of this key.
    pub fn dom_name(&self) -> String {
        match self {
            Key::Char(c) => c.to_string(),
            Key::Escape => "Escape".to_string(),
            Key::Control => "Control".to_string(),
            Key::Named(name) => name.clone(),
        }
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Key::from_dom(&value)
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.dom_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_buttons() {
        assert_eq!(MouseButton::from_dom(0), MouseButton::Primary);
        assert_eq!(MouseButton::from_dom(1), MouseButton::Middle);
        assert_eq!(MouseButton::from_dom(2), MouseButton::Secondary);
        assert_eq!(MouseButton::from_dom(4), MouseButton::Other(4));
    }

    #[test]
    fn test_dom_keys() {
        assert_eq!(Key::from_dom("+"), Key::Char('+'));
        assert_eq!(Key::from_dom("0"), Key::Char('0'));
        assert_eq!(Key::from_dom("Escape"), Key::Escape);
        assert_eq!(Key::from_dom("Control"), Key::Control);
        assert_eq!(Key::from_dom("ArrowUp"), Key::Named("ArrowUp".to_string()));
        assert_eq!(Key::from_dom("Enter").dom_name(), "Enter");
    }

    #[test]
    fn test_key_serializes_as_dom_name() {
        let json = serde_json::to_string(&vec![Key::Char('='), Key::Escape]).unwrap();
        assert_eq!(json, r#"["=","Escape"]"#);

        let keys: Vec<Key> = serde_json::from_str(r#"["-","Control"]"#).unwrap();
        assert_eq!(keys, vec![Key::Char('-'), Key::Control]);
    }
}
