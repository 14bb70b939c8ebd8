//! Documents, controllers and document windows.
//!
//! A thin model/view layer for multi-document applications:
//!
//! - [`Document`]: the data, listed in the application's document list
//! - [`Controller`]: attaches one view to a document and keeps it open
//! - [`DocWindow`]: a window with a controller and a [`SaverMixin`]
//! - [`FileLoader`] / [`FileSaver`]: I/O ports a document routes into its
//!   own event receivers
//!
//! # Example
//!
//! ```
//! use mgui::application::Application;
//! use mgui::backend::HeadlessBackend;
//! use mgui::document::{DocWindow, Document, FileLoader};
//! use mgui::window::WindowConfig;
//! use mgui_core::AppConfig;
//!
//! let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
//! let document = Document::new(&app);
//! let doc_window = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();
//!
//! let loader = FileLoader::new("/notes/todo.txt");
//! document.load_from(&loader).unwrap();
//! loader.feed(b"- write docs");
//! loader.finish();
//! assert_eq!(doc_window.window().title(), "todo.txt");
//!
//! document.set_contents("- write more docs");
//! assert_eq!(doc_window.window().displayed_title(), "todo.txt*");
//! ```

mod controller;
mod doc_window;
mod model;
mod ports;
mod saver;

pub use controller::Controller;
pub use doc_window::DocWindow;
pub use model::Document;
pub use ports::{FileLoader, FileSaver};
pub use saver::{CloseDecision, SaverMixin};
