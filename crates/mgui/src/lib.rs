//! mgui - a portable GUI core.
//!
//! One object model for windows, controls, menus and commands, with every
//! platform-specific part behind a capability trait (`*Impl`) created by a
//! [`Backend`](backend::Backend). The portable layer is built from:
//!
//! - [`command`]: named, acceleratable actions bound to methods, scoped to
//!   the application, a window or a control
//! - [`native`]: typed, panic-safe slots over a type-erased native signal ABI
//! - [`view`]: the view tree with tri-state visible/enabled/active
//!   propagation and margin/bind-flag layout
//! - [`control`], [`window`], [`menu`], [`alert`]: the objects users see
//! - [`application`]: the per-thread context, main loop and cross-thread
//!   `execute`
//! - [`document`]: documents, controllers and save-before-close
//!
//! Event wiring, geometry, registries and the main loop come from
//! [`mgui_core`].
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use mgui::application::Application;
//! use mgui::backend::HeadlessBackend;
//! use mgui::control::Button;
//! use mgui::window::{Window, WindowConfig};
//! use mgui_core::{AppConfig, EventIn, Rect};
//!
//! let backend = HeadlessBackend::new();
//! let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
//! let window = Window::new(&app, WindowConfig::new("Demo").with_visible(true)).unwrap();
//! let button = Button::new(&window, window.root_view(), "OK", Rect::new(10, 10, 80, 24)).unwrap();
//!
//! let clicks = Rc::new(Cell::new(0));
//! let counter = Rc::clone(&clicks);
//! let on_click = EventIn::new(move |_: &()| counter.set(counter.get() + 1));
//! button.clicked().add_route(&on_click);
//!
//! // The toolkit reports a click on the native button.
//! backend.control(button.control().native().handle()).unwrap().click();
//! assert_eq!(clicks.get(), 1);
//! ```

pub mod alert;
pub mod application;
pub mod backend;
pub mod command;
pub mod control;
pub mod document;
pub mod error;
pub mod keys;
pub mod menu;
pub mod native;
mod resource;
pub mod view;
pub mod window;

pub use application::{Application, ApplicationDelegate, ExecuteHandle};
pub use error::{GuiError, Result};
