//! In-memory native objects and signals.
//!
//! [`HeadlessSignals`] implements [`SignalSource`] without any toolkit. It is
//! the signal layer of the headless backend and lets tests emit native
//! signals and destroy native objects by hand.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use mgui_core::logging::targets;
use slotmap::SlotMap;

use crate::error::NativeError;
use crate::native::source::{DestroyNotify, HandlerId, NativeCallback, NativeHandle, SignalSource};
use crate::native::value::NativeValue;

type SharedCallback = Rc<dyn Fn(NativeHandle, &[NativeValue]) -> NativeValue>;

struct ObjectEntry {
    type_name: String,
    handlers: Vec<HandlerId>,
}

struct HandlerEntry {
    instance: NativeHandle,
    signal: String,
    callback: SharedCallback,
    destroy: Option<DestroyNotify>,
    block_count: u32,
}

#[derive(Default)]
struct State {
    objects: SlotMap<NativeHandle, ObjectEntry>,
    handlers: SlotMap<HandlerId, HandlerEntry>,
}

/// A toolkit-free [`SignalSource`].
#[derive(Default)]
pub struct HeadlessSignals {
    state: RefCell<State>,
    releases: Cell<usize>,
}

impl HeadlessSignals {
    /// Create an empty signal hub.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Create a native object.
    pub fn create_object(&self, type_name: &str) -> NativeHandle {
        self.state.borrow_mut().objects.insert(ObjectEntry {
            type_name: type_name.to_string(),
            handlers: Vec::new(),
        })
    }

    /// Whether the object exists.
    pub fn contains(&self, instance: NativeHandle) -> bool {
        self.state.borrow().objects.contains_key(instance)
    }

    /// The type name given at creation.
    pub fn type_name(&self, instance: NativeHandle) -> Option<String> {
        self.state
            .borrow()
            .objects
            .get(instance)
            .map(|o| o.type_name.clone())
    }

    /// Destroy a native object, releasing every handler connected to it.
    pub fn destroy_object(&self, instance: NativeHandle) -> bool {
        let notifies: Vec<DestroyNotify> = {
            let mut state = self.state.borrow_mut();
            let Some(object) = state.objects.remove(instance) else {
                return false;
            };
            object
                .handlers
                .into_iter()
                .filter_map(|id| state.handlers.remove(id))
                .filter_map(|h| h.destroy)
                .collect()
        };
        tracing::debug!(
            target: targets::NATIVE,
            ?instance,
            released = notifies.len(),
            "native object destroyed"
        );
        for notify in notifies {
            self.releases.set(self.releases.get() + 1);
            notify();
        }
        true
    }

    /// Emit `signal` on `instance`.
    ///
    /// Handlers run in connection order; blocked handlers are skipped. The
    /// value returned by the last handler that ran is returned.
    pub fn emit(&self, instance: NativeHandle, signal: &str, args: &[NativeValue]) -> NativeValue {
        let callbacks: Vec<SharedCallback> = {
            let state = self.state.borrow();
            let Some(object) = state.objects.get(instance) else {
                return NativeValue::None;
            };
            object
                .handlers
                .iter()
                .filter_map(|id| state.handlers.get(*id))
                .filter(|h| h.signal == signal && h.block_count == 0)
                .map(|h| Rc::clone(&h.callback))
                .collect()
        };
        tracing::trace!(target: targets::NATIVE, signal, handlers = callbacks.len(), "emit");

        let mut result = NativeValue::None;
        for callback in callbacks {
            result = callback(instance, args);
        }
        result
    }

    /// Number of handlers connected to `signal` on `instance`.
    pub fn handler_count(&self, instance: NativeHandle, signal: &str) -> usize {
        let state = self.state.borrow();
        state.objects.get(instance).map_or(0, |object| {
            object
                .handlers
                .iter()
                .filter_map(|id| state.handlers.get(*id))
                .filter(|h| h.signal == signal)
                .count()
        })
    }

    /// Total destroy-notifies run so far.
    pub fn release_count(&self) -> usize {
        self.releases.get()
    }

    fn change_block(&self, instance: NativeHandle, handler: HandlerId, delta: i32) -> bool {
        let mut state = self.state.borrow_mut();
        match state.handlers.get_mut(handler) {
            Some(h) if h.instance == instance => {
                h.block_count = h.block_count.saturating_add_signed(delta);
                true
            }
            _ => false,
        }
    }
}

impl SignalSource for HeadlessSignals {
    fn connect(
        &self,
        instance: NativeHandle,
        signal: &str,
        callback: NativeCallback,
        destroy: DestroyNotify,
    ) -> Result<HandlerId, NativeError> {
        let mut state = self.state.borrow_mut();
        if !state.objects.contains_key(instance) {
            return Err(NativeError::UnknownObject);
        }
        let id = state.handlers.insert(HandlerEntry {
            instance,
            signal: signal.to_string(),
            callback: Rc::from(callback),
            destroy: Some(destroy),
            block_count: 0,
        });
        if let Some(object) = state.objects.get_mut(instance) {
            object.handlers.push(id);
        }
        Ok(id)
    }

    fn disconnect(&self, instance: NativeHandle, handler: HandlerId) -> bool {
        let notify = {
            let mut state = self.state.borrow_mut();
            match state.handlers.get(handler) {
                Some(h) if h.instance == instance => {}
                _ => return false,
            }
            if let Some(object) = state.objects.get_mut(instance) {
                object.handlers.retain(|id| *id != handler);
            }
            state.handlers.remove(handler).and_then(|h| h.destroy)
        };
        if let Some(notify) = notify {
            self.releases.set(self.releases.get() + 1);
            notify();
        }
        true
    }

    fn block(&self, instance: NativeHandle, handler: HandlerId) -> bool {
        self.change_block(instance, handler, 1)
    }

    fn unblock(&self, instance: NativeHandle, handler: HandlerId) -> bool {
        self.change_block(instance, handler, -1)
    }
}

impl fmt::Debug for HeadlessSignals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("HeadlessSignals")
            .field("objects", &state.objects.len())
            .field("handlers", &state.handlers.len())
            .field("releases", &self.releases.get())
            .finish()
    }
}
