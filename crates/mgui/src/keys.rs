//! Keys, modifiers and key combinations.
//!
//! Accelerators are written as strings such as `"Ctrl+S"` or
//! `"Ctrl+Shift+Z"` and parse into a [`KeyCombination`]:
//!
//! ```
//! use mgui::keys::{Key, KeyCombination, Modifiers};
//!
//! let save: KeyCombination = "Ctrl+S".parse().unwrap();
//! assert_eq!(save, KeyCombination::new(Key::S, Modifiers::CTRL));
//! assert_eq!(save.to_string(), "Ctrl+S");
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A keyboard accelerator attached to a command.
pub type Accelerator = KeyCombination;

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// The Shift key is held.
    pub shift: bool,
    /// The Control key is held.
    pub control: bool,
    /// The Alt key is held (Option on macOS).
    pub alt: bool,
    /// The Meta/Super key is held.
    pub meta: bool,
}

impl Modifiers {
    /// No modifiers pressed.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
        meta: false,
    };

    /// Shift modifier only.
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };

    /// Control modifier only.
    pub const CTRL: Self = Self {
        control: true,
        ..Self::NONE
    };

    /// Alt modifier only.
    pub const ALT: Self = Self {
        alt: true,
        ..Self::NONE
    };

    /// Meta modifier only.
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };

    /// Control + Shift modifiers.
    pub const CTRL_SHIFT: Self = Self {
        shift: true,
        control: true,
        ..Self::NONE
    };

    /// Check if no modifier is held.
    pub fn is_empty(&self) -> bool {
        *self == Self::NONE
    }
}

/// A portable key identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[rustfmt::skip]
pub enum Key {
    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Numbers (main keyboard)
    Digit0, Digit1, Digit2, Digit3, Digit4,
    Digit5, Digit6, Digit7, Digit8, Digit9,

    // Function keys
    F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,

    // Navigation
    ArrowUp, ArrowDown, ArrowLeft, ArrowRight,
    Home, End, PageUp, PageDown,

    // Editing
    Backspace, Delete, Insert,
    Enter, Tab, Space, Escape,

    // Punctuation and symbols
    Minus, Equal,
    BracketLeft, BracketRight, Backslash,
    Semicolon, Quote,
    Comma, Period, Slash,
    Grave,

    /// A native key value with no portable name.
    Unknown(u32),
}

#[rustfmt::skip]
const LETTERS: [Key; 26] = [
    Key::A, Key::B, Key::C, Key::D, Key::E, Key::F, Key::G, Key::H, Key::I,
    Key::J, Key::K, Key::L, Key::M, Key::N, Key::O, Key::P, Key::Q, Key::R,
    Key::S, Key::T, Key::U, Key::V, Key::W, Key::X, Key::Y, Key::Z,
];

#[rustfmt::skip]
const DIGITS: [Key; 10] = [
    Key::Digit0, Key::Digit1, Key::Digit2, Key::Digit3, Key::Digit4,
    Key::Digit5, Key::Digit6, Key::Digit7, Key::Digit8, Key::Digit9,
];

#[rustfmt::skip]
const FUNCTION_KEYS: [Key; 12] = [
    Key::F1, Key::F2, Key::F3, Key::F4, Key::F5, Key::F6,
    Key::F7, Key::F8, Key::F9, Key::F10, Key::F11, Key::F12,
];

impl Key {
    /// The letter key for an ASCII letter, either case.
    pub fn from_letter(c: char) -> Option<Key> {
        let c = c.to_ascii_uppercase();
        c.is_ascii_uppercase()
            .then(|| LETTERS[(c as u8 - b'A') as usize])
    }

    /// The digit key for an ASCII digit.
    pub fn from_digit(c: char) -> Option<Key> {
        c.to_digit(10).map(|d| DIGITS[d as usize])
    }

    /// The function key `F<n>` for `n` in 1..=12.
    pub fn function(n: u8) -> Option<Key> {
        (1..=12).contains(&n).then(|| FUNCTION_KEYS[(n - 1) as usize])
    }

    /// Check if this is a navigation key.
    pub fn is_navigation(&self) -> bool {
        matches!(
            self,
            Key::ArrowUp
                | Key::ArrowDown
                | Key::ArrowLeft
                | Key::ArrowRight
                | Key::Home
                | Key::End
                | Key::PageUp
                | Key::PageDown
        )
    }

    fn name(&self) -> Option<&'static str> {
        let name = match self {
            Key::ArrowUp => "Up",
            Key::ArrowDown => "Down",
            Key::ArrowLeft => "Left",
            Key::ArrowRight => "Right",
            Key::Home => "Home",
            Key::End => "End",
            Key::PageUp => "PageUp",
            Key::PageDown => "PageDown",
            Key::Backspace => "Backspace",
            Key::Delete => "Delete",
            Key::Insert => "Insert",
            Key::Enter => "Enter",
            Key::Tab => "Tab",
            Key::Space => "Space",
            Key::Escape => "Escape",
            Key::Minus => "-",
            Key::Equal => "=",
            Key::BracketLeft => "[",
            Key::BracketRight => "]",
            Key::Backslash => "\\",
            Key::Semicolon => ";",
            Key::Quote => "'",
            Key::Comma => ",",
            Key::Period => ".",
            Key::Slash => "/",
            Key::Grave => "`",
            _ => return None,
        };
        Some(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(pos) = LETTERS.iter().position(|k| k == self) {
            return write!(f, "{}", (b'A' + pos as u8) as char);
        }
        if let Some(pos) = DIGITS.iter().position(|k| k == self) {
            return write!(f, "{pos}");
        }
        if let Some(pos) = FUNCTION_KEYS.iter().position(|k| k == self) {
            return write!(f, "F{}", pos + 1);
        }
        match (self, self.name()) {
            (_, Some(name)) => f.write_str(name),
            (Key::Unknown(code), None) => write!(f, "0x{code:x}"),
            _ => f.write_str("Unknown"),
        }
    }
}

impl FromStr for Key {
    type Err = KeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(key) = Key::from_letter(c).or_else(|| Key::from_digit(c)) {
                return Ok(key);
            }
        }

        let lower = s.to_ascii_lowercase();
        if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
            return Key::function(n).ok_or_else(|| KeyParseError::UnknownKey(s.to_string()));
        }

        let key = match lower.as_str() {
            "up" | "arrowup" => Key::ArrowUp,
            "down" | "arrowdown" => Key::ArrowDown,
            "left" | "arrowleft" => Key::ArrowLeft,
            "right" | "arrowright" => Key::ArrowRight,
            "home" => Key::Home,
            "end" => Key::End,
            "pageup" | "pgup" => Key::PageUp,
            "pagedown" | "pgdn" => Key::PageDown,
            "backspace" | "back" => Key::Backspace,
            "delete" | "del" => Key::Delete,
            "insert" | "ins" => Key::Insert,
            "enter" | "return" => Key::Enter,
            "tab" => Key::Tab,
            "space" | "spacebar" => Key::Space,
            "escape" | "esc" => Key::Escape,
            "minus" | "-" => Key::Minus,
            "equal" | "equals" | "=" => Key::Equal,
            "bracketleft" | "[" => Key::BracketLeft,
            "bracketright" | "]" => Key::BracketRight,
            "backslash" | "\\" => Key::Backslash,
            "semicolon" | ";" => Key::Semicolon,
            "quote" | "'" => Key::Quote,
            "comma" | "," => Key::Comma,
            "period" | "." => Key::Period,
            "slash" | "/" => Key::Slash,
            "grave" | "`" => Key::Grave,
            _ => return Err(KeyParseError::UnknownKey(s.to_string())),
        };
        Ok(key)
    }
}

/// Error type for parsing keys and key combinations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    /// The string is empty.
    #[error("empty key combination")]
    Empty,
    /// Only modifiers were given.
    #[error("no key specified (only modifiers)")]
    NoKey,
    /// More than one non-modifier key was given.
    #[error("more than one key in `{0}`")]
    MultipleKeys(String),
    /// Unknown key name.
    #[error("unknown key: {0}")]
    UnknownKey(String),
}

/// One key with modifiers, such as "Ctrl+S" or "Alt+F4".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyCombination {
    /// The primary key.
    pub key: Key,
    /// The modifier keys that must be held.
    pub modifiers: Modifiers,
}

impl KeyCombination {
    /// Create a new key combination from a key and modifiers.
    pub const fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    /// Create a key combination with no modifiers.
    pub const fn key_only(key: Key) -> Self {
        Self::new(key, Modifiers::NONE)
    }

    /// Create a Ctrl+key combination.
    pub const fn ctrl(key: Key) -> Self {
        Self::new(key, Modifiers::CTRL)
    }

    /// Create a Ctrl+Shift+key combination.
    pub const fn ctrl_shift(key: Key) -> Self {
        Self::new(key, Modifiers::CTRL_SHIFT)
    }

    /// Check if this combination matches a key press.
    pub fn matches(&self, key: Key, modifiers: Modifiers) -> bool {
        self.key == key && self.modifiers == modifiers
    }
}

impl fmt::Display for KeyCombination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.modifiers;
        for (held, name) in [
            (m.control, "Ctrl+"),
            (m.alt, "Alt+"),
            (m.shift, "Shift+"),
            (m.meta, "Meta+"),
        ] {
            if held {
                f.write_str(name)?;
            }
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyCombination {
    type Err = KeyParseError;

    /// Parse a combination such as `"Ctrl+Shift+S"`.
    ///
    /// Modifier names are case-insensitive: `Ctrl`/`Control`, `Alt`/`Option`,
    /// `Shift`, and `Meta`/`Cmd`/`Super`. `+` itself cannot be used as the
    /// key; write `"Ctrl+Equal"` instead.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(KeyParseError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        let mut key: Option<Key> = None;

        for part in s.split('+') {
            let part = part.trim();
            match part.to_ascii_lowercase().as_str() {
                "ctrl" | "control" | "primary" => modifiers.control = true,
                "alt" | "option" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "meta" | "cmd" | "command" | "super" => modifiers.meta = true,
                "" => return Err(KeyParseError::UnknownKey(s.to_string())),
                _ => {
                    if key.is_some() {
                        return Err(KeyParseError::MultipleKeys(s.to_string()));
                    }
                    key = Some(part.parse()?);
                }
            }
        }

        key.map(|k| KeyCombination::new(k, modifiers))
            .ok_or(KeyParseError::NoKey)
    }
}
