//! The type-erased native signal ABI.

use std::rc::Rc;

use slotmap::new_key_type;

use crate::error::NativeError;
use crate::native::value::NativeValue;

new_key_type! {
    /// Identifies a native object (widget, window, menu item, ...).
    pub struct NativeHandle;

    /// Identifies one handler connected to a native signal.
    pub struct HandlerId;
}

/// A native callback: receives the emitting instance and the arguments.
pub type NativeCallback = Box<dyn Fn(NativeHandle, &[NativeValue]) -> NativeValue>;

/// Called exactly once when a connected handler is released, whether by
/// [`SignalSource::disconnect`] or by destruction of the native object.
pub type DestroyNotify = Box<dyn FnOnce()>;

/// The native side of signal delivery.
///
/// This mirrors the C-style ABI of a native toolkit: handlers are plain
/// callbacks with a destroy-notify, identified by a [`HandlerId`], and can be
/// blocked and unblocked. Blocking is counted: a handler blocked twice must
/// be unblocked twice before it fires again.
pub trait SignalSource {
    /// Connect `callback` to `signal` on `instance`.
    fn connect(
        &self,
        instance: NativeHandle,
        signal: &str,
        callback: NativeCallback,
        destroy: DestroyNotify,
    ) -> Result<HandlerId, NativeError>;

    /// Release a handler. Runs its destroy-notify. Returns `false` if the
    /// handler no longer exists.
    fn disconnect(&self, instance: NativeHandle, handler: HandlerId) -> bool;

    /// Increment the handler's block count.
    fn block(&self, instance: NativeHandle, handler: HandlerId) -> bool;

    /// Decrement the handler's block count.
    fn unblock(&self, instance: NativeHandle, handler: HandlerId) -> bool;
}

/// Shared reference to a signal source.
pub type SharedSignalSource = Rc<dyn SignalSource>;
