//! Core systems for mgui.
//!
//! This crate provides the UI-toolkit-agnostic foundation the `mgui` object
//! model is built on:
//!
//! - **Event routing**: point-to-point [`EventOut`]/[`EventIn`] endpoints with
//!   automatic mutual detachment
//! - **Registries**: most-recent-first lists of live windows and documents
//! - **Main loop**: UI-thread work queue with a thread-safe posting handle
//! - **Async handoff**: a FIFO queue drained by a background thread into the
//!   main loop
//! - **Thread checks**: UI-thread markers and affinity assertions
//! - **Primitives**: integer geometry and RGBA colors
//! - **Configuration**: [`AppConfig`], loadable from TOML
//!
//! # Event Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use mgui_core::{EventIn, EventOut};
//!
//! struct Counter {
//!     hits: Cell<u32>,
//! }
//!
//! impl Counter {
//!     fn on_clicked(&self, _: &()) {
//!         self.hits.set(self.hits.get() + 1);
//!     }
//! }
//!
//! let clicked = EventOut::<()>::new();
//! let counter = Rc::new(Counter { hits: Cell::new(0) });
//! let on_clicked = EventIn::bind(&counter, Counter::on_clicked);
//!
//! clicked.add_route(&on_clicked);
//! clicked.emit(());
//! clicked.emit(());
//! assert_eq!(counter.hits.get(), 2);
//! ```
//!
//! # Main Loop Example
//!
//! ```
//! use mgui_core::{AsyncTaskQueue, MainLoop};
//!
//! let main_loop = MainLoop::new();
//! let queue = AsyncTaskQueue::start(main_loop.handle()).unwrap();
//!
//! let quit = main_loop.handle();
//! std::thread::spawn(move || {
//!     // ... background work ...
//!     quit.quit().unwrap();
//! });
//!
//! main_loop.run();
//! drop(queue);
//! ```

mod color;
pub mod config;
mod error;
pub mod event;
mod geometry;
pub mod logging;
mod main_loop;
pub mod registry;
pub mod task;
pub mod thread_check;

pub use color::{Color, ParseColorError};
pub use config::{AppConfig, WindowSize};
pub use error::{CoreError, Result};
pub use event::{add_route, remove_route, EventIn, EventOut};
pub use geometry::{Point, Rect, Region, Size};
pub use main_loop::{LocalTask, MainLoop, MainLoopHandle, Task};
pub use registry::{Registry, RegistryEntry};
pub use task::{AsyncTaskQueue, AsyncTaskSender};
pub use thread_check::{is_ui_thread, ThreadAffinity};
