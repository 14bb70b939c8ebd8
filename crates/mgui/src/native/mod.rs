//! The native-callback adapter.
//!
//! Platform toolkits deliver events through a C-style signal ABI. This
//! module puts a typed, panic-safe layer over it:
//!
//! - [`SignalSource`]: the type-erased ABI (connect, disconnect, block)
//! - [`NativeValue`] with [`FromNativeArgs`]/[`IntoNative`]: argument and
//!   return value translation
//! - [`Slot`]: binds a method to a native signal with exactly-once teardown
//! - [`keymap`]: native key values to portable keys
//! - [`NativeWidget`]: native handle plus its signal source
//! - [`HeadlessSignals`]: an in-memory signal source
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use mgui::native::{HeadlessSignals, NativeValue, SharedSignalSource, Slot};
//!
//! struct Counter {
//!     total: Cell<i64>,
//! }
//!
//! impl Counter {
//!     fn add(&self, (n,): (i64,)) -> i64 {
//!         self.total.set(self.total.get() + n);
//!         self.total.get()
//!     }
//! }
//!
//! let signals = HeadlessSignals::new();
//! let source: SharedSignalSource = signals.clone();
//! let button = signals.create_object("button");
//!
//! let counter = Rc::new(Counter { total: Cell::new(0) });
//! let slot = Slot::new(Rc::downgrade(&counter), Counter::add);
//! slot.connect(&source, button, "add").unwrap();
//!
//! let result = signals.emit(button, "add", &[NativeValue::Int(5)]);
//! assert_eq!(result, NativeValue::Int(5));
//! ```

mod headless;
pub mod keymap;
mod slot;
mod source;
mod value;
mod widget;

pub use headless::HeadlessSignals;
pub use slot::Slot;
pub use source::{
    DestroyNotify, HandlerId, NativeCallback, NativeHandle, SharedSignalSource, SignalSource,
};
pub use value::{FromNative, FromNativeArgs, HandlerOutcome, IntoNative, NativeValue};
pub use widget::NativeWidget;
