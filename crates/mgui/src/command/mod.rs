//! Commands: named, acceleratable actions bound to a method.
//!
//! A [`Command`] ties an action name (and optional accelerator) to a method
//! on its owner: the application, a window or a control. The platform side
//! of the action is created lazily by [`Command::register`], once, against an
//! [`ActionRegistrar`] (normally the owner's [`ActionGroup`]).
//!
//! Application and window commands are registered when their owner is
//! built. Control commands are registered explicitly by the control.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use mgui::command::{ActionGroup, ActionValue, Command};
//!
//! struct Editor {
//!     saves: Cell<u32>,
//! }
//!
//! impl Editor {
//!     fn save(&self, _: ()) {
//!         self.saves.set(self.saves.get() + 1);
//!     }
//! }
//!
//! let editor = Rc::new(Editor { saves: Cell::new(0) });
//! let actions = ActionGroup::new("win");
//!
//! let save = Command::new(Rc::downgrade(&editor), "save", Editor::save)
//!     .with_accelerator("Ctrl+S".parse().unwrap());
//! save.register(&actions).unwrap();
//!
//! save.execute(()).unwrap();                         // direct call
//! actions.activate("save", ActionValue::None).unwrap(); // platform activation
//! assert_eq!(editor.saves.get(), 2);
//! ```

mod action;
mod group;

use std::cell::OnceCell;
use std::fmt;
use std::rc::{Rc, Weak};

use mgui_core::logging::targets;

pub use action::{
    ActionParameter, ActionRegistrar, ActionSpec, ActionValue, Activation, CommandImpl,
    ParameterKind,
};
pub use group::{AcceleratorTable, ActionGroup, ActionKey};

use crate::error::{report_error, CommandError};
use crate::keys::Accelerator;
use crate::native::HandlerOutcome;

struct CommandInner<O, P, R> {
    owner: Weak<O>,
    method: fn(&O, P) -> R,
    name: String,
    accelerator: Option<Accelerator>,
    platform: OnceCell<Box<dyn CommandImpl>>,
}

/// A typed command bound to a method on `O` taking `P` and returning `R`.
pub struct Command<O: 'static, P: 'static = (), R: 'static = ()> {
    inner: Rc<CommandInner<O, P, R>>,
}

impl<O, P, R> Command<O, P, R>
where
    O: 'static,
    P: ActionParameter,
    R: HandlerOutcome + 'static,
{
    /// Create an unregistered command.
    pub fn new(owner: Weak<O>, name: impl Into<String>, method: fn(&O, P) -> R) -> Self {
        Self {
            inner: Rc::new(CommandInner {
                owner,
                method,
                name: name.into(),
                accelerator: None,
                platform: OnceCell::new(),
            }),
        }
    }

    /// Attach an accelerator. Only valid before registration.
    pub fn with_accelerator(self, accelerator: Accelerator) -> Self {
        self.with_optional_accelerator(Some(accelerator))
    }

    /// Attach or clear an accelerator. Only valid before registration.
    pub fn with_optional_accelerator(mut self, accelerator: Option<Accelerator>) -> Self {
        match Rc::get_mut(&mut self.inner) {
            Some(inner) if inner.platform.get().is_none() => inner.accelerator = accelerator,
            _ => tracing::warn!(
                target: targets::COMMAND,
                name = %self.inner.name,
                "accelerator change ignored on a registered command"
            ),
        }
        self
    }

    /// The action name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The accelerator, if any.
    pub fn accelerator(&self) -> Option<Accelerator> {
        self.inner.accelerator
    }

    /// Whether [`register`](Self::register) has succeeded.
    pub fn is_registered(&self) -> bool {
        self.inner.platform.get().is_some()
    }

    /// Call the bound method directly.
    ///
    /// Fails with [`CommandError::OwnerGone`] if the owner has been dropped;
    /// the method is not invoked in that case.
    pub fn execute(&self, param: P) -> Result<R, CommandError> {
        let owner = self.inner.owner.upgrade().ok_or_else(|| CommandError::OwnerGone {
            name: self.inner.name.clone(),
        })?;
        tracing::trace!(target: targets::COMMAND, name = %self.inner.name, "execute");
        Ok((self.inner.method)(&owner, param))
    }

    /// Create the platform action. A second call is a no-op.
    pub fn register(&self, registrar: &dyn ActionRegistrar) -> Result<(), CommandError> {
        if self.is_registered() {
            tracing::trace!(target: targets::COMMAND, name = %self.inner.name, "already registered");
            return Ok(());
        }

        let spec = ActionSpec::new(self.inner.name.clone(), P::KIND)
            .with_accelerator(self.inner.accelerator);
        let weak = Rc::downgrade(&self.inner);
        let activate: Activation = Rc::new(move |value: &ActionValue| {
            if let Some(inner) = weak.upgrade() {
                activate_command(&inner, value);
            }
        });

        let platform = registrar.add_action(spec, activate)?;
        // Registration cannot re-enter this command, so the cell is empty.
        let _ = self.inner.platform.set(platform);
        Ok(())
    }

    /// Enable or disable the platform action.
    pub fn set_enabled(&self, enabled: bool) -> Result<(), CommandError> {
        self.platform()?.set_enabled(enabled);
        Ok(())
    }

    /// Whether the platform action is enabled.
    pub fn is_enabled(&self) -> Result<bool, CommandError> {
        Ok(self.platform()?.is_enabled())
    }

    /// Set the check mark of a boolean command.
    pub fn set_checked(&self, checked: bool) -> Result<(), CommandError> {
        self.platform()?.set_state(ActionValue::Bool(checked))
    }

    /// Set the state of a stateful command.
    pub fn set_state(&self, state: P) -> Result<(), CommandError> {
        self.platform()?.set_state(state.into_value())
    }

    /// The current state of a stateful command.
    pub fn state(&self) -> Result<Option<P>, CommandError> {
        Ok(P::from_value(&self.platform()?.state()))
    }

    fn platform(&self) -> Result<&dyn CommandImpl, CommandError> {
        match self.inner.platform.get() {
            Some(platform) => Ok(platform.as_ref()),
            None => {
                tracing::error!(target: targets::COMMAND, name = %self.inner.name, "command used before register()");
                Err(CommandError::NotRegistered {
                    name: self.inner.name.clone(),
                })
            }
        }
    }
}

fn activate_command<O, P, R>(inner: &CommandInner<O, P, R>, value: &ActionValue)
where
    P: ActionParameter,
    R: HandlerOutcome,
{
    let Some(param) = P::from_value(value) else {
        let err = CommandError::ParameterMismatch {
            name: inner.name.clone(),
            expected: P::KIND,
            got: value.kind(),
        };
        report_error(&inner.name, &err);
        return;
    };
    let Some(owner) = inner.owner.upgrade() else {
        tracing::debug!(target: targets::COMMAND, name = %inner.name, "activation after owner dropped");
        return;
    };
    tracing::trace!(target: targets::COMMAND, name = %inner.name, "activated");
    if let Err(err) = (inner.method)(&owner, param).into_outcome() {
        report_error(&inner.name, err.as_ref());
    }
}

impl<O: 'static, P: 'static, R: 'static> fmt::Debug for Command<O, P, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.inner.name)
            .field("accelerator", &self.inner.accelerator)
            .field("registered", &self.inner.platform.get().is_some())
            .finish()
    }
}
