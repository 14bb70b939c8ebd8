//! Platform action contract.
//!
//! A [`Command`](super::Command) is registered against an
//! [`ActionRegistrar`], which creates the platform action and hands back a
//! [`CommandImpl`] for it. When the platform activates the action it passes
//! an [`ActionValue`], which the command converts back into its typed
//! parameter.

use std::fmt;
use std::rc::Rc;

use crate::error::CommandError;
use crate::keys::KeyCombination;

/// The parameter/state type of an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterKind {
    /// Stateless, no parameter.
    None,
    /// Boolean state (checkable).
    Bool,
    /// Integer state (radio group).
    Int,
    /// String parameter, stateless.
    Str,
}

impl ParameterKind {
    /// Whether actions of this kind carry a state.
    pub fn is_stateful(self) -> bool {
        matches!(self, ParameterKind::Bool | ParameterKind::Int)
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParameterKind::None => "none",
            ParameterKind::Bool => "bool",
            ParameterKind::Int => "int",
            ParameterKind::Str => "string",
        })
    }
}

/// A dynamically typed action parameter or state.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ActionValue {
    #[default]
    None,
    Bool(bool),
    Int(i32),
    Str(String),
}

impl ActionValue {
    /// The kind of this value.
    pub fn kind(&self) -> ParameterKind {
        match self {
            ActionValue::None => ParameterKind::None,
            ActionValue::Bool(_) => ParameterKind::Bool,
            ActionValue::Int(_) => ParameterKind::Int,
            ActionValue::Str(_) => ParameterKind::Str,
        }
    }
}

/// A Rust type usable as a command parameter.
pub trait ActionParameter: Sized + 'static {
    const KIND: ParameterKind;

    fn from_value(value: &ActionValue) -> Option<Self>;
    fn into_value(self) -> ActionValue;
}

impl ActionParameter for () {
    const KIND: ParameterKind = ParameterKind::None;

    fn from_value(value: &ActionValue) -> Option<Self> {
        matches!(value, ActionValue::None).then_some(())
    }

    fn into_value(self) -> ActionValue {
        ActionValue::None
    }
}

impl ActionParameter for bool {
    const KIND: ParameterKind = ParameterKind::Bool;

    fn from_value(value: &ActionValue) -> Option<Self> {
        match value {
            ActionValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> ActionValue {
        ActionValue::Bool(self)
    }
}

impl ActionParameter for i32 {
    const KIND: ParameterKind = ParameterKind::Int;

    fn from_value(value: &ActionValue) -> Option<Self> {
        match value {
            ActionValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    fn into_value(self) -> ActionValue {
        ActionValue::Int(self)
    }
}

impl ActionParameter for String {
    const KIND: ParameterKind = ParameterKind::Str;

    fn from_value(value: &ActionValue) -> Option<Self> {
        match value {
            ActionValue::Str(v) => Some(v.clone()),
            _ => None,
        }
    }

    fn into_value(self) -> ActionValue {
        ActionValue::Str(self)
    }
}

/// Callback run when the platform activates an action.
pub type Activation = Rc<dyn Fn(&ActionValue)>;

/// Everything a registrar needs to create a platform action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSpec {
    /// Unique name within the registrar.
    pub name: String,
    /// Parameter/state type.
    pub kind: ParameterKind,
    /// Initial state for stateful kinds.
    pub initial_state: ActionValue,
    /// Accelerator to install in the registrar's accelerator table.
    pub accelerator: Option<KeyCombination>,
}

impl ActionSpec {
    /// A spec for `kind` with the kind's default initial state.
    pub fn new(name: impl Into<String>, kind: ParameterKind) -> Self {
        let initial_state = match kind {
            ParameterKind::Bool => ActionValue::Bool(false),
            ParameterKind::Int => ActionValue::Int(0),
            ParameterKind::None | ParameterKind::Str => ActionValue::None,
        };
        Self {
            name: name.into(),
            kind,
            initial_state,
            accelerator: None,
        }
    }

    /// Set the accelerator.
    pub fn with_accelerator(mut self, accelerator: Option<KeyCombination>) -> Self {
        self.accelerator = accelerator;
        self
    }
}

/// A registered platform action, owned by its command.
///
/// Dropping it removes the action (and its accelerator) from the registrar.
pub trait CommandImpl {
    /// The action's name.
    fn name(&self) -> &str;

    fn set_enabled(&self, enabled: bool);
    fn is_enabled(&self) -> bool;

    /// Set the state of a stateful action.
    fn set_state(&self, state: ActionValue) -> Result<(), CommandError>;
    fn state(&self) -> ActionValue;
}

/// Creates platform actions for commands.
pub trait ActionRegistrar {
    /// Create the platform action for `spec`. `activate` runs whenever the
    /// platform activates it.
    fn add_action(
        &self,
        spec: ActionSpec,
        activate: Activation,
    ) -> Result<Box<dyn CommandImpl>, CommandError>;
}
