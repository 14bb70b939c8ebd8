//! A window showing a document.

use std::fmt;
use std::rc::{Rc, Weak};

use mgui_core::EventIn;
use mgui_core::logging::targets;

use super::{CloseDecision, Controller, Document, SaverMixin};
use crate::application::Application;
use crate::error::Result;
use crate::window::{Window, WindowConfig, WindowDelegate};

/// A [`Window`] bound to a [`Document`] through a [`Controller`].
///
/// The window title follows the document title and carries the modified
/// mark. Closing goes through [`SaverMixin`]; once the window has closed
/// the controller detaches, which closes the document if no other window
/// shows it.
pub struct DocWindow {
    window: Rc<Window>,
    controller: Controller,
    saver: Rc<SaverMixin>,
    modified_in: EventIn<bool>,
    title_in: EventIn<String>,
}

impl DocWindow {
    /// Open a window for `document`. The config's title is replaced by the
    /// document title.
    pub fn new(app: &Rc<Application>, document: &Rc<Document>, config: WindowConfig) -> Result<Rc<Self>> {
        let window = Window::new(app, config)?;
        window.set_title(document.title());
        window.set_modified(document.is_modified());
        window.set_document(Some(document));

        let controller = Controller::new();
        controller.attach(document)?;
        let saver = SaverMixin::new(app, &window, document);

        let doc_window = Rc::new_cyclic(|weak: &Weak<DocWindow>| DocWindow {
            window,
            controller,
            saver,
            modified_in: EventIn::bind_weak(weak.clone(), DocWindow::on_modified),
            title_in: EventIn::bind_weak(weak.clone(), DocWindow::on_title),
        });
        document.modified_changed().add_route(&doc_window.modified_in);
        document.title_changed().add_route(&doc_window.title_in);

        let delegate: Weak<dyn WindowDelegate> = Rc::downgrade(&doc_window) as Weak<dyn WindowDelegate>;
        doc_window.window.set_delegate(Some(delegate));
        tracing::debug!(target: targets::DOCUMENT, title = %document.title(), "document window opened");
        Ok(doc_window)
    }

    pub fn window(&self) -> &Rc<Window> {
        &self.window
    }

    pub fn document(&self) -> Option<Rc<Document>> {
        self.controller.document()
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn saver(&self) -> &Rc<SaverMixin> {
        &self.saver
    }

    /// Run the close protocol. Returns whether the window closed now.
    pub fn close(&self) -> bool {
        self.window.close()
    }

    fn on_modified(&self, modified: &bool) {
        self.window.set_modified(*modified);
    }

    fn on_title(&self, title: &String) {
        self.window.set_title(title.clone());
    }
}

impl WindowDelegate for DocWindow {
    fn should_close(&self, _window: &Window) -> bool {
        self.saver.check_close() == CloseDecision::Close
    }

    fn window_closed(&self, window: &Window) {
        window.set_document(None);
        self.controller.detach();
    }
}

impl fmt::Debug for DocWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DocWindow")
            .field("title", &self.window.title())
            .field("controller", &self.controller)
            .field("saver", &self.saver)
            .finish()
    }
}
