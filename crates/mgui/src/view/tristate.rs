//! Tri-state attributes.

use std::fmt;

/// State of a propagating view attribute.
///
/// `Latent` means "on as soon as every ancestor is on". An explicit `Off`
/// is never overridden by an ancestor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriState {
    On,
    Off,
    Latent,
}

impl TriState {
    /// Whether the attribute is effectively on.
    pub fn is_on(self) -> bool {
        self == TriState::On
    }
}

impl fmt::Display for TriState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TriState::On => "on",
            TriState::Off => "off",
            TriState::Latent => "latent",
        })
    }
}

/// The three attributes that propagate down a view tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Visible,
    Enabled,
    Active,
}

impl Attribute {
    pub const ALL: [Attribute; 3] = [Attribute::Visible, Attribute::Enabled, Attribute::Active];

    /// State a freshly created view starts in.
    pub fn initial_state(self) -> TriState {
        match self {
            Attribute::Visible => TriState::Latent,
            Attribute::Enabled => TriState::On,
            Attribute::Active => TriState::Off,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Attribute::Visible => "visible",
            Attribute::Enabled => "enabled",
            Attribute::Active => "active",
        })
    }
}
