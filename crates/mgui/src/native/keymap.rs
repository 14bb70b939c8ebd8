//! Translation between native key values and portable keys.
//!
//! Native key events arrive as X11/GDK keysyms plus a modifier bitmask. The
//! tables here map them onto [`Key`] and [`Modifiers`] and back.

use crate::keys::{Key, KeyCombination, Modifiers};

/// Modifier mask bits as delivered in a native key event's state field.
pub mod mask {
    pub const SHIFT: u32 = 1 << 0;
    pub const LOCK: u32 = 1 << 1;
    pub const CONTROL: u32 = 1 << 2;
    /// Usually Alt.
    pub const MOD1: u32 = 1 << 3;
    pub const SUPER: u32 = 1 << 26;
    pub const META: u32 = 1 << 28;
}

/// Non-character keysyms.
#[rustfmt::skip]
const SPECIAL_KEYS: &[(u32, Key)] = &[
    (0xff08, Key::Backspace),
    (0xff09, Key::Tab),
    (0xff0d, Key::Enter),
    (0xff1b, Key::Escape),
    (0xff50, Key::Home),
    (0xff51, Key::ArrowLeft),
    (0xff52, Key::ArrowUp),
    (0xff53, Key::ArrowRight),
    (0xff54, Key::ArrowDown),
    (0xff55, Key::PageUp),
    (0xff56, Key::PageDown),
    (0xff57, Key::End),
    (0xff63, Key::Insert),
    (0xffff, Key::Delete),
    (0x0020, Key::Space),
    (0x0027, Key::Quote),
    (0x002c, Key::Comma),
    (0x002d, Key::Minus),
    (0x002e, Key::Period),
    (0x002f, Key::Slash),
    (0x003b, Key::Semicolon),
    (0x003d, Key::Equal),
    (0x005b, Key::BracketLeft),
    (0x005c, Key::Backslash),
    (0x005d, Key::BracketRight),
    (0x0060, Key::Grave),
];

const KEYSYM_F1: u32 = 0xffbe;

/// Map a native keysym to a portable key.
///
/// Letters map case-insensitively; unmapped values become
/// [`Key::Unknown`].
pub fn key_from_keysym(keysym: u32) -> Key {
    if let Some(c) = char::from_u32(keysym).filter(char::is_ascii_alphanumeric)
        && let Some(key) = Key::from_letter(c).or_else(|| Key::from_digit(c))
    {
        return key;
    }
    if (KEYSYM_F1..KEYSYM_F1 + 12).contains(&keysym) {
        if let Some(key) = Key::function((keysym - KEYSYM_F1 + 1) as u8) {
            return key;
        }
    }
    SPECIAL_KEYS
        .iter()
        .find(|(sym, _)| *sym == keysym)
        .map_or(Key::Unknown(keysym), |(_, key)| *key)
}

/// Map a portable key to its native keysym (lowercase for letters).
pub fn keysym_from_key(key: Key) -> Option<u32> {
    if let Key::Unknown(code) = key {
        return Some(code);
    }
    let text = key.to_string();
    let mut chars = text.chars();
    if let (Some(c), None) = (chars.next(), chars.next())
        && c.is_ascii_alphanumeric()
    {
        return Some(c.to_ascii_lowercase() as u32);
    }
    if let Some(n) = text.strip_prefix('F').and_then(|n| n.parse::<u32>().ok()) {
        return Some(KEYSYM_F1 + n - 1);
    }
    SPECIAL_KEYS
        .iter()
        .find(|(_, k)| *k == key)
        .map(|(sym, _)| *sym)
}

/// Decode a native modifier mask. Lock and unknown bits are ignored.
pub fn modifiers_from_state(state: u32) -> Modifiers {
    Modifiers {
        shift: state & mask::SHIFT != 0,
        control: state & mask::CONTROL != 0,
        alt: state & mask::MOD1 != 0,
        meta: state & (mask::SUPER | mask::META) != 0,
    }
}

/// Encode modifiers as a native mask.
pub fn state_from_modifiers(modifiers: Modifiers) -> u32 {
    let mut state = 0;
    if modifiers.shift {
        state |= mask::SHIFT;
    }
    if modifiers.control {
        state |= mask::CONTROL;
    }
    if modifiers.alt {
        state |= mask::MOD1;
    }
    if modifiers.meta {
        state |= mask::SUPER;
    }
    state
}

/// Decode a native key event into a key combination.
pub fn combination_from_event(keysym: u32, state: u32) -> KeyCombination {
    KeyCombination::new(key_from_keysym(keysym), modifiers_from_state(state))
}
