//! Windows.
//!
//! A [`Window`] owns one platform window ([`WindowImpl`]), the
//! [`ViewTree`](crate::view::ViewTree) it displays and a window-scoped
//! [`ActionGroup`](crate::command::ActionGroup) (`win.*`). Every open
//! window is listed in the application's window list, front window first.
//!
//! # Example
//!
//! ```
//! use mgui::application::Application;
//! use mgui::backend::HeadlessBackend;
//! use mgui::window::{Window, WindowConfig};
//! use mgui_core::AppConfig;
//!
//! let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
//! let window = Window::new(&app, WindowConfig::new("Notes").with_visible(true)).unwrap();
//!
//! window.set_modified(true);
//! assert_eq!(window.displayed_title(), "Notes*");
//! assert!(window.is_front());
//!
//! assert!(window.close());
//! assert!(app.windows().is_empty());
//! ```

mod base;
mod config;
mod platform;

pub use base::Window;
pub use config::WindowConfig;
pub use platform::{WindowDelegate, WindowImpl};
