//! Native widget wrapper.

use std::fmt;
use std::rc::Rc;

use crate::error::NativeError;
use crate::native::slot::Slot;
use crate::native::source::{NativeHandle, SharedSignalSource};
use crate::native::value::{FromNativeArgs, HandlerOutcome};

/// A native object handle together with the signal source that serves it.
///
/// Control implementations own one of these and connect their slots
/// through it.
#[derive(Clone)]
pub struct NativeWidget {
    handle: NativeHandle,
    signals: SharedSignalSource,
}

impl NativeWidget {
    /// Wrap an existing native object.
    pub fn new(handle: NativeHandle, signals: SharedSignalSource) -> Self {
        Self { handle, signals }
    }

    /// The native object.
    pub fn handle(&self) -> NativeHandle {
        self.handle
    }

    /// The signal source serving the object.
    pub fn signals(&self) -> &SharedSignalSource {
        &self.signals
    }

    /// Connect `slot` to one of this widget's signals.
    pub fn connect<O, Args, R>(&self, slot: &Slot<O, Args, R>, signal: &str) -> Result<(), NativeError>
    where
        O: 'static,
        Args: FromNativeArgs + 'static,
        R: HandlerOutcome + 'static,
    {
        slot.connect(&self.signals, self.handle, signal)
    }

    /// Whether `other` wraps the same native object.
    pub fn is_same(&self, other: &NativeWidget) -> bool {
        self.handle == other.handle && Rc::ptr_eq(&self.signals, &other.signals)
    }
}

impl fmt::Debug for NativeWidget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeWidget")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}
