//! Input types for pointer and keyboard events.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };

    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Ctrl on Windows/Linux, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Any modifier other than Shift is held.
    pub fn has_non_shift(&self) -> bool {
        self.ctrl || self.meta || self.alt
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
    },
    Scroll {
        position: Point,
        delta: Vec2,
        modifiers: Modifiers,
    },
}

/// A logical key, as reported by the host (`KeyboardEvent.key` on the web).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable character. Letters are stored lowercase.
    Character(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Delete,
    Backspace,
    Escape,
    Enter,
    Tab,
    /// Anything else, by name.
    Other(String),
}

impl Key {
    /// Parse a host key name such as `"a"`, `"V"`, `"ArrowLeft"` or `"Escape"`.
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowUp" => Key::ArrowUp,
            "ArrowDown" => Key::ArrowDown,
            "ArrowLeft" => Key::ArrowLeft,
            "ArrowRight" => Key::ArrowRight,
            "Delete" => Key::Delete,
            "Backspace" => Key::Backspace,
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            "Tab" => Key::Tab,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::character(c),
                    _ => Key::Other(name.to_string()),
                }
            }
        }
    }

    /// A character key, folded to lowercase.
    pub fn character(c: char) -> Self {
        Key::Character(c.to_ascii_lowercase())
    }
}

/// What currently has keyboard focus when a key event arrives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FocusTarget {
    /// The canvas itself or nothing in particular.
    #[default]
    Canvas,
    TextInput,
    TextArea,
    ContentEditable,
    /// A non-text control such as a button.
    Control,
}

impl FocusTarget {
    /// Whether typing into this target produces text.
    pub fn accepts_text(self) -> bool {
        matches!(
            self,
            FocusTarget::TextInput | FocusTarget::TextArea | FocusTarget::ContentEditable
        )
    }
}

/// A key press delivered by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
    /// Set by the platform for auto-repeated key downs.
    #[serde(default)]
    pub repeat: bool,
    #[serde(default)]
    pub target: FocusTarget,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key,
            modifiers,
            repeat: false,
            target: FocusTarget::Canvas,
        }
    }

    /// Shorthand for a key name without modifiers, e.g. `KeyEvent::named("v")`.
    pub fn named(name: &str) -> Self {
        Self::new(Key::from_name(name), Modifiers::NONE)
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn with_target(mut self, target: FocusTarget) -> Self {
        self.target = target;
        self
    }

    pub fn repeated(mut self) -> Self {
        self.repeat = true;
        self
    }
}

/// Keys currently held down.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    pressed: HashSet<Key>,
}

impl KeyboardState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key down. Returns true if the key was not already held.
    pub fn press(&mut self, key: &Key) -> bool {
        self.pressed.insert(key.clone())
    }

    pub fn release(&mut self, key: &Key) {
        self.pressed.remove(key);
    }

    pub fn is_pressed(&self, key: &Key) -> bool {
        self.pressed.contains(key)
    }

    /// Forget all held keys (focus loss).
    pub fn clear(&mut self) {
        self.pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("V"), Key::Character('v'));
        assert_eq!(Key::from_name("v"), Key::Character('v'));
        assert_eq!(Key::from_name("ArrowRight"), Key::ArrowRight);
        assert_eq!(Key::from_name("Esc"), Key::Escape);
        assert_eq!(Key::from_name("F5"), Key::Other("F5".to_string()));
        assert_eq!(Key::from_name("="), Key::Character('='));
    }

    #[test]
    fn test_focus_accepts_text() {
        assert!(FocusTarget::TextInput.accepts_text());
        assert!(FocusTarget::TextArea.accepts_text());
        assert!(FocusTarget::ContentEditable.accepts_text());
        assert!(!FocusTarget::Canvas.accepts_text());
        assert!(!FocusTarget::Control.accepts_text());
    }

    #[test]
    fn test_modifier_helpers() {
        assert!(!Modifiers::SHIFT.has_non_shift());
        assert!(Modifiers::ALT.has_non_shift());
        assert!(Modifiers::CTRL.command());
        let meta = Modifiers {
            meta: true,
            ..Modifiers::NONE
        };
        assert!(meta.command());
    }

    #[test]
    fn test_key_press_tracking() {
        let mut keys = KeyboardState::new();
        let a = Key::character('a');

        assert!(keys.press(&a));
        assert!(keys.is_pressed(&a));
        assert!(!keys.press(&a));

        keys.release(&a);
        assert!(!keys.is_pressed(&a));
        assert!(keys.press(&a));

        keys.clear();
        assert!(!keys.is_pressed(&a));
    }
}
