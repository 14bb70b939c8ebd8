//! The portable action registrar.
//!
//! An [`ActionGroup`] is the action namespace of one owner: the application
//! (prefix `app`) or a window (prefix `win`). It stores each action's
//! enabled flag and state, activates actions by name, and keeps the scope's
//! [`AcceleratorTable`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use mgui_core::logging::targets;
use slotmap::{new_key_type, SlotMap};

use crate::command::action::{
    ActionRegistrar, ActionSpec, ActionValue, Activation, CommandImpl, ParameterKind,
};
use crate::error::CommandError;
use crate::keys::KeyCombination;

new_key_type! {
    /// Identifies an action inside its group.
    pub struct ActionKey;
}

// ============================================================================
// Accelerator table
// ============================================================================

/// Maps key combinations to action names within one scope.
#[derive(Debug, Clone, Default)]
pub struct AcceleratorTable {
    entries: HashMap<KeyCombination, String>,
}

impl AcceleratorTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `combo` to `action`, returning the action it was bound to before.
    pub fn insert(&mut self, combo: KeyCombination, action: impl Into<String>) -> Option<String> {
        self.entries.insert(combo, action.into())
    }

    /// Remove every binding pointing at `action`.
    pub fn remove_action(&mut self, action: &str) {
        self.entries.retain(|_, name| name != action);
    }

    /// The action bound to `combo`.
    pub fn lookup(&self, combo: &KeyCombination) -> Option<&str> {
        self.entries.get(combo).map(String::as_str)
    }

    /// The combination bound to `action`, if any.
    pub fn accelerator_for(&self, action: &str) -> Option<KeyCombination> {
        self.entries
            .iter()
            .find(|(_, name)| *name == action)
            .map(|(combo, _)| *combo)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// Action group
// ============================================================================

struct ActionEntry {
    name: String,
    kind: ParameterKind,
    enabled: Cell<bool>,
    state: RefCell<ActionValue>,
    activate: Activation,
}

struct GroupInner {
    prefix: String,
    actions: RefCell<SlotMap<ActionKey, ActionEntry>>,
    /// Names in registration order.
    order: RefCell<Vec<(String, ActionKey)>>,
    accelerators: RefCell<AcceleratorTable>,
}

impl GroupInner {
    fn key(&self, name: &str) -> Option<ActionKey> {
        self.order
            .borrow()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, key)| *key)
    }

    fn remove(&self, key: ActionKey) {
        let Some(entry) = self.actions.borrow_mut().remove(key) else {
            return;
        };
        self.order.borrow_mut().retain(|(_, k)| *k != key);
        self.accelerators.borrow_mut().remove_action(&entry.name);
        tracing::trace!(target: targets::COMMAND, prefix = %self.prefix, name = %entry.name, "action removed");
    }
}

/// A named set of actions with a scoped accelerator table.
///
/// Cloning yields another handle to the same group.
#[derive(Clone)]
pub struct ActionGroup {
    inner: Rc<GroupInner>,
}

impl ActionGroup {
    /// Create an empty group. `prefix` qualifies action names in menus,
    /// e.g. `app` in `app.quit`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            inner: Rc::new(GroupInner {
                prefix: prefix.into(),
                actions: RefCell::new(SlotMap::with_key()),
                order: RefCell::new(Vec::new()),
                accelerators: RefCell::new(AcceleratorTable::new()),
            }),
        }
    }

    /// The group's prefix.
    pub fn prefix(&self) -> &str {
        &self.inner.prefix
    }

    /// Whether an action called `name` exists.
    pub fn has_action(&self, name: &str) -> bool {
        self.inner.key(name).is_some()
    }

    /// Action names in registration order.
    pub fn list_actions(&self) -> Vec<String> {
        self.inner
            .order
            .borrow()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner.order.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the action is enabled.
    pub fn is_enabled(&self, name: &str) -> Result<bool, CommandError> {
        self.with_entry(name, |e| e.enabled.get())
    }

    /// Enable or disable an action.
    pub fn set_enabled(&self, name: &str, enabled: bool) -> Result<(), CommandError> {
        self.with_entry(name, |e| e.enabled.set(enabled))
    }

    /// The action's current state.
    pub fn state(&self, name: &str) -> Result<ActionValue, CommandError> {
        self.with_entry(name, |e| e.state.borrow().clone())
    }

    /// The action's parameter kind.
    pub fn kind(&self, name: &str) -> Result<ParameterKind, CommandError> {
        self.with_entry(name, |e| e.kind)
    }

    /// Activate an action with an explicit value.
    ///
    /// For stateful actions the value becomes the new state before the
    /// handler runs.
    #[tracing::instrument(skip(self, value), target = "mgui::command", level = "trace")]
    pub fn activate(&self, name: &str, value: ActionValue) -> Result<(), CommandError> {
        let activate = {
            let key = self.inner.key(name).ok_or_else(|| unknown(name))?;
            let actions = self.inner.actions.borrow();
            let entry = actions.get(key).ok_or_else(|| unknown(name))?;
            if !entry.enabled.get() {
                return Err(CommandError::Disabled {
                    name: name.to_string(),
                });
            }
            if value.kind() != entry.kind {
                return Err(CommandError::ParameterMismatch {
                    name: name.to_string(),
                    expected: entry.kind,
                    got: value.kind(),
                });
            }
            if entry.kind.is_stateful() {
                *entry.state.borrow_mut() = value.clone();
            }
            Rc::clone(&entry.activate)
        };
        // Borrows are released: the handler may touch this group.
        activate(&value);
        Ok(())
    }

    /// Activate an action the way an accelerator or menu item does: boolean
    /// actions toggle, integer actions re-apply their state, string actions
    /// receive an empty string.
    pub fn activate_default(&self, name: &str) -> Result<(), CommandError> {
        let value = self.with_entry(name, |e| match (e.kind, &*e.state.borrow()) {
            (ParameterKind::Bool, ActionValue::Bool(on)) => ActionValue::Bool(!on),
            (ParameterKind::Int, state) => state.clone(),
            (ParameterKind::Str, _) => ActionValue::Str(String::new()),
            _ => ActionValue::None,
        })?;
        self.activate(name, value)
    }

    /// The action bound to `combo` in this scope.
    pub fn lookup_accelerator(&self, combo: &KeyCombination) -> Option<String> {
        self.inner
            .accelerators
            .borrow()
            .lookup(combo)
            .map(str::to_string)
    }

    /// The combination bound to `name`, if any.
    pub fn accelerator_for(&self, name: &str) -> Option<KeyCombination> {
        self.inner.accelerators.borrow().accelerator_for(name)
    }

    /// Activate the action bound to `combo`, if any and enabled.
    ///
    /// Returns `true` if an action ran.
    pub fn dispatch_accelerator(&self, combo: &KeyCombination) -> bool {
        let Some(name) = self.lookup_accelerator(combo) else {
            return false;
        };
        match self.activate_default(&name) {
            Ok(()) => {
                tracing::debug!(target: targets::COMMAND, %combo, action = %name, "accelerator fired");
                true
            }
            Err(err) => {
                tracing::debug!(target: targets::COMMAND, %combo, %err, "accelerator ignored");
                false
            }
        }
    }

    fn with_entry<T>(&self, name: &str, f: impl FnOnce(&ActionEntry) -> T) -> Result<T, CommandError> {
        let key = self.inner.key(name).ok_or_else(|| unknown(name))?;
        let actions = self.inner.actions.borrow();
        actions.get(key).map(f).ok_or_else(|| unknown(name))
    }
}

fn unknown(name: &str) -> CommandError {
    CommandError::UnknownAction {
        name: name.to_string(),
    }
}

impl ActionRegistrar for ActionGroup {
    fn add_action(
        &self,
        spec: ActionSpec,
        activate: Activation,
    ) -> Result<Box<dyn CommandImpl>, CommandError> {
        if self.has_action(&spec.name) {
            tracing::error!(target: targets::COMMAND, prefix = %self.prefix(), name = %spec.name, "duplicate action name");
            return Err(CommandError::DuplicateAction { name: spec.name });
        }

        let key = self.inner.actions.borrow_mut().insert(ActionEntry {
            name: spec.name.clone(),
            kind: spec.kind,
            enabled: Cell::new(true),
            state: RefCell::new(spec.initial_state),
            activate,
        });
        self.inner
            .order
            .borrow_mut()
            .push((spec.name.clone(), key));

        if let Some(combo) = spec.accelerator {
            let previous = self
                .inner
                .accelerators
                .borrow_mut()
                .insert(combo, spec.name.clone());
            if let Some(previous) = previous {
                tracing::warn!(
                    target: targets::COMMAND,
                    %combo,
                    from = %previous,
                    to = %spec.name,
                    "accelerator rebound"
                );
            }
        }

        tracing::debug!(target: targets::COMMAND, prefix = %self.prefix(), name = %spec.name, "action registered");
        Ok(Box::new(ActionHandle {
            group: Rc::downgrade(&self.inner),
            key,
            name: spec.name,
        }))
    }
}

impl fmt::Debug for ActionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionGroup")
            .field("prefix", &self.inner.prefix)
            .field("actions", &self.list_actions())
            .finish()
    }
}

/// [`CommandImpl`] handed out by [`ActionGroup`].
struct ActionHandle {
    group: Weak<GroupInner>,
    key: ActionKey,
    name: String,
}

impl ActionHandle {
    fn with_entry<T>(&self, f: impl FnOnce(&ActionEntry) -> T) -> Option<T> {
        let group = self.group.upgrade()?;
        let actions = group.actions.borrow();
        actions.get(self.key).map(f)
    }
}

impl CommandImpl for ActionHandle {
    fn name(&self) -> &str {
        &self.name
    }

    fn set_enabled(&self, enabled: bool) {
        self.with_entry(|e| e.enabled.set(enabled));
    }

    fn is_enabled(&self) -> bool {
        self.with_entry(|e| e.enabled.get()).unwrap_or(false)
    }

    fn set_state(&self, state: ActionValue) -> Result<(), CommandError> {
        self.with_entry(|e| {
            if !e.kind.is_stateful() || state.kind() != e.kind {
                return Err(CommandError::ParameterMismatch {
                    name: self.name.clone(),
                    expected: e.kind,
                    got: state.kind(),
                });
            }
            *e.state.borrow_mut() = state;
            Ok(())
        })
        .unwrap_or_else(|| Err(unknown(&self.name)))
    }

    fn state(&self) -> ActionValue {
        self.with_entry(|e| e.state.borrow().clone())
            .unwrap_or_default()
    }
}

impl Drop for ActionHandle {
    fn drop(&mut self) {
        if let Some(group) = self.group.upgrade() {
            group.remove(self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::Key;

    fn recorder() -> (Rc<RefCell<Vec<ActionValue>>>, Activation) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        (log, Rc::new(move |v: &ActionValue| sink.borrow_mut().push(v.clone())))
    }

    #[test]
    fn test_register_and_activate() {
        let group = ActionGroup::new("app");
        let (log, activate) = recorder();
        let _handle = group
            .add_action(ActionSpec::new("quit", ParameterKind::None), activate)
            .unwrap();

        group.activate("quit", ActionValue::None).unwrap();
        assert_eq!(log.borrow().len(), 1);
        assert_eq!(group.list_actions(), vec!["quit".to_string()]);

        assert!(matches!(
            group.activate("quit", ActionValue::Int(1)),
            Err(CommandError::ParameterMismatch { .. })
        ));
        assert!(matches!(
            group.activate("nope", ActionValue::None),
            Err(CommandError::UnknownAction { .. })
        ));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let group = ActionGroup::new("win");
        let (_, a) = recorder();
        let (_, b) = recorder();
        let _first = group.add_action(ActionSpec::new("close", ParameterKind::None), a).unwrap();
        let second = group.add_action(ActionSpec::new("close", ParameterKind::None), b);
        assert!(matches!(second, Err(CommandError::DuplicateAction { .. })));
    }

    #[test]
    fn test_bool_toggle_and_disable() {
        let group = ActionGroup::new("win");
        let (log, activate) = recorder();
        let handle = group
            .add_action(ActionSpec::new("wrap", ParameterKind::Bool), activate)
            .unwrap();

        group.activate_default("wrap").unwrap();
        group.activate_default("wrap").unwrap();
        assert_eq!(*log.borrow(), vec![ActionValue::Bool(true), ActionValue::Bool(false)]);

        handle.set_enabled(false);
        assert!(matches!(
            group.activate_default("wrap"),
            Err(CommandError::Disabled { .. })
        ));
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_accelerator_table_follows_handle() {
        let group = ActionGroup::new("app");
        let (log, activate) = recorder();
        let save = KeyCombination::ctrl(Key::S);
        let handle = group
            .add_action(
                ActionSpec::new("save", ParameterKind::None).with_accelerator(Some(save)),
                activate,
            )
            .unwrap();

        assert_eq!(group.lookup_accelerator(&save).as_deref(), Some("save"));
        assert!(group.dispatch_accelerator(&save));
        assert!(!group.dispatch_accelerator(&KeyCombination::ctrl(Key::Q)));
        assert_eq!(log.borrow().len(), 1);

        drop(handle);
        assert!(!group.has_action("save"));
        assert!(group.lookup_accelerator(&save).is_none());
    }

    #[test]
    fn test_handler_may_reenter_group() {
        let group = ActionGroup::new("app");
        let reentrant = group.clone();
        let _handle = group
            .add_action(
                ActionSpec::new("toggle-self", ParameterKind::None),
                Rc::new(move |_| {
                    reentrant.set_enabled("toggle-self", false).unwrap();
                }),
            )
            .unwrap();
        group.activate("toggle-self", ActionValue::None).unwrap();
        assert_eq!(group.is_enabled("toggle-self"), Ok(false));
    }
}
