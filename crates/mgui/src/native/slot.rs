//! Typed slots over native signals.
//!
//! A [`Slot`] binds a method on a weakly held owner to a native signal. When
//! the signal fires, the native arguments are converted into the method's
//! argument tuple, the method runs, and its result is converted back.
//!
//! Nothing that goes wrong inside the call escapes into the native dispatch
//! loop: argument mismatches, `Err` results and panics are logged, handed to
//! the thread's [`ErrorReporter`](crate::error::ErrorReporter), and a default
//! value is returned to the native side instead.
//!
//! One slot may serve several native objects; [`Slot::sender`] tells the
//! method which one fired.
//!
//! # Teardown
//!
//! Each native subscription is released exactly once. If the slot is
//! dropped first it disconnects everything; if a native object is destroyed
//! first, its destroy-notify removes only that object's connection, so the
//! later drop does nothing for it.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use mgui_core::logging::targets;

use crate::error::{report_error, BoxError, NativeError};
use crate::native::source::{HandlerId, NativeHandle, SharedSignalSource};
use crate::native::value::{FromNativeArgs, HandlerOutcome, NativeValue};

struct Connection {
    id: u64,
    source: SharedSignalSource,
    instance: NativeHandle,
    handler: HandlerId,
    signal: String,
}

struct SlotCore<O, Args, R> {
    owner: Weak<O>,
    method: fn(&O, Args) -> R,
    connections: RefCell<Vec<Connection>>,
    next_id: Cell<u64>,
    sender: Cell<Option<NativeHandle>>,
}

impl<O, Args, R> SlotCore<O, Args, R> {
    fn take_connection(&self, id: u64) -> Option<Connection> {
        let mut connections = self.connections.borrow_mut();
        let index = connections.iter().position(|c| c.id == id)?;
        Some(connections.remove(index))
    }
}

impl<O, Args, R> SlotCore<O, Args, R>
where
    O: 'static,
    Args: FromNativeArgs + 'static,
    R: HandlerOutcome + 'static,
{
    fn dispatch(&self, signal: &str, instance: NativeHandle, args: &[NativeValue]) -> NativeValue {
        let args = match Args::from_native_args(args) {
            Ok(args) => args,
            Err(err) => {
                report_error(signal, &err);
                return NativeValue::None;
            }
        };
        let Some(owner) = self.owner.upgrade() else {
            tracing::trace!(target: targets::NATIVE, signal, "slot owner gone, ignoring");
            return NativeValue::None;
        };

        let previous = self.sender.replace(Some(instance));
        let result = catch_unwind(AssertUnwindSafe(|| (self.method)(&owner, args)));
        self.sender.set(previous);

        match result {
            Ok(outcome) => outcome.into_outcome().unwrap_or_else(|err: BoxError| {
                report_error(signal, err.as_ref());
                NativeValue::None
            }),
            Err(payload) => {
                let err = NativeError::HandlerPanicked {
                    signal: signal.to_string(),
                    message: panic_message(payload.as_ref()),
                };
                report_error(signal, &err);
                NativeValue::None
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

/// A method on `O`, callable from a native signal.
///
/// `Args` is the tuple of converted native arguments (`()` for none) and `R`
/// the method's return type.
pub struct Slot<O: 'static, Args: 'static = (), R: 'static = ()> {
    core: Rc<SlotCore<O, Args, R>>,
}

impl<O, Args, R> Slot<O, Args, R>
where
    O: 'static,
    Args: FromNativeArgs + 'static,
    R: HandlerOutcome + 'static,
{
    /// Create an unconnected slot.
    pub fn new(owner: Weak<O>, method: fn(&O, Args) -> R) -> Self {
        Self {
            core: Rc::new(SlotCore {
                owner,
                method,
                connections: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                sender: Cell::new(None),
            }),
        }
    }

    /// Connect to `signal` on `instance`.
    ///
    /// A slot can be connected to any number of native objects, but only
    /// once to the same signal of the same object.
    #[tracing::instrument(skip(self, source), target = "mgui::native", level = "trace")]
    pub fn connect(
        &self,
        source: &SharedSignalSource,
        instance: NativeHandle,
        signal: &str,
    ) -> Result<(), NativeError> {
        let duplicate = self.core.connections.borrow().iter().any(|c| {
            c.instance == instance && c.signal == signal && Rc::ptr_eq(&c.source, source)
        });
        if duplicate {
            return Err(NativeError::AlreadyConnected);
        }

        let id = self.core.next_id.get();
        self.core.next_id.set(id + 1);

        let callback_core = Rc::downgrade(&self.core);
        let name = signal.to_string();
        let callback = Box::new(move |sender: NativeHandle, args: &[NativeValue]| {
            match callback_core.upgrade() {
                Some(core) => core.dispatch(&name, sender, args),
                None => NativeValue::None,
            }
        });

        let notify_core = Rc::downgrade(&self.core);
        let destroy = Box::new(move || {
            if let Some(core) = notify_core.upgrade()
                && let Some(connection) = core.take_connection(id)
            {
                tracing::trace!(
                    target: targets::NATIVE,
                    signal = %connection.signal,
                    "native side released slot"
                );
            }
        });

        let handler = source.connect(instance, signal, callback, destroy)?;
        self.core.connections.borrow_mut().push(Connection {
            id,
            source: Rc::clone(source),
            instance,
            handler,
            signal: signal.to_string(),
        });
        Ok(())
    }

    /// Disconnect from every native signal. Returns `false` if there was
    /// nothing to disconnect.
    pub fn disconnect(&self) -> bool {
        // Take first: the destroy-notifies run by the sources find nothing.
        let connections = std::mem::take(&mut *self.core.connections.borrow_mut());
        for c in &connections {
            c.source.disconnect(c.instance, c.handler);
            tracing::trace!(target: targets::NATIVE, signal = %c.signal, "slot disconnected");
        }
        !connections.is_empty()
    }

    /// Disconnect from the signals of `instance` only. Returns `false` if
    /// the slot was not connected to it.
    pub fn disconnect_from(&self, instance: NativeHandle) -> bool {
        let taken: Vec<Connection> = {
            let mut connections = self.core.connections.borrow_mut();
            let (taken, kept) = std::mem::take(&mut *connections)
                .into_iter()
                .partition(|c| c.instance == instance);
            *connections = kept;
            taken
        };
        for c in &taken {
            c.source.disconnect(c.instance, c.handler);
        }
        !taken.is_empty()
    }

    /// Whether the slot is connected to at least one live native signal.
    pub fn is_connected(&self) -> bool {
        !self.core.connections.borrow().is_empty()
    }

    /// Number of live native connections.
    pub fn connection_count(&self) -> usize {
        self.core.connections.borrow().len()
    }

    /// Suspend delivery from every connection without disconnecting.
    ///
    /// Blocks nest: each `block` needs its own [`unblock`](Self::unblock).
    pub fn block(&self) -> Result<(), NativeError> {
        self.for_each_connection(|c| c.source.block(c.instance, c.handler))
    }

    /// Resume delivery after [`block`](Self::block).
    pub fn unblock(&self) -> Result<(), NativeError> {
        self.for_each_connection(|c| c.source.unblock(c.instance, c.handler))
    }

    /// The native object whose signal is being delivered, while inside the
    /// slot method.
    pub fn sender(&self) -> Option<NativeHandle> {
        self.core.sender.get()
    }

    fn for_each_connection(&self, mut f: impl FnMut(&Connection) -> bool) -> Result<(), NativeError> {
        let connections = self.core.connections.borrow();
        if connections.is_empty() {
            return Err(NativeError::NotConnected);
        }
        // Visit every connection even if one of them is gone.
        let all_live = connections.iter().fold(true, |ok, c| f(c) && ok);
        if all_live {
            Ok(())
        } else {
            Err(NativeError::UnknownObject)
        }
    }
}

impl<O: 'static, Args: 'static, R: 'static> Drop for Slot<O, Args, R> {
    fn drop(&mut self) {
        let connections = std::mem::take(&mut *self.core.connections.borrow_mut());
        for c in connections {
            c.source.disconnect(c.instance, c.handler);
        }
    }
}

impl<O: 'static, Args: 'static, R: 'static> fmt::Debug for Slot<O, Args, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let connections = self.core.connections.borrow();
        let signals: Vec<&str> = connections.iter().map(|c| c.signal.as_str()).collect();
        f.debug_struct("Slot")
            .field("signals", &signals)
            .field("owner_alive", &(self.core.owner.strong_count() > 0))
            .finish()
    }
}
