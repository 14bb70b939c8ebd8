//! Controllers attach views of a document to it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use mgui_core::EventOut;
use mgui_core::logging::targets;

use super::Document;
use crate::error::DocumentError;

/// Holds at most one document and keeps it open.
///
/// Dropping the controller detaches it.
pub struct Controller {
    document: RefCell<Option<Rc<Document>>>,
    document_changed: EventOut<()>,
}

impl Controller {
    pub fn new() -> Self {
        Self {
            document: RefCell::new(None),
            document_changed: EventOut::new(),
        }
    }

    pub fn document(&self) -> Option<Rc<Document>> {
        self.document.borrow().clone()
    }

    /// Emitted after the attached document changes.
    pub fn document_changed(&self) -> &EventOut<()> {
        &self.document_changed
    }

    /// Attach `document`, detaching the current one first.
    pub fn attach(&self, document: &Rc<Document>) -> Result<(), DocumentError> {
        if self
            .document
            .borrow()
            .as_ref()
            .is_some_and(|current| Rc::ptr_eq(current, document))
        {
            return Ok(());
        }
        document.attach_controller()?;
        let previous = self.document.replace(Some(Rc::clone(document)));
        if let Some(previous) = previous {
            previous.detach_controller();
        }
        tracing::trace!(target: targets::DOCUMENT, title = %document.title(), "controller attached");
        self.document_changed.emit(());
        Ok(())
    }

    /// Detach the current document. It closes if this was its last
    /// controller.
    pub fn detach(&self) {
        let previous = self.document.borrow_mut().take();
        if let Some(previous) = previous {
            tracing::trace!(target: targets::DOCUMENT, title = %previous.title(), "controller detached");
            previous.detach_controller();
            self.document_changed.emit(());
        }
    }
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        if let Some(document) = self.document.get_mut().take() {
            document.detach_controller();
        }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("document", &self.document.borrow().as_ref().map(|d| d.title()))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use mgui_core::AppConfig;

    use super::*;
    use crate::application::Application;
    use crate::backend::HeadlessBackend;

    #[test]
    fn test_document_lives_while_attached() {
        let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
        let document = Document::new(&app);
        let first = Controller::new();
        let second = Controller::new();
        first.attach(&document).unwrap();
        second.attach(&document).unwrap();
        first.attach(&document).unwrap();
        assert_eq!(document.controller_count(), 2);

        drop(first);
        assert!(!document.is_closed());
        second.detach();
        assert!(document.is_closed());
        assert!(second.document().is_none());
    }

    #[test]
    fn test_reattach_moves_to_new_document() {
        let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
        let old = Document::new(&app);
        let new = Document::new(&app);
        let controller = Controller::new();
        controller.attach(&old).unwrap();
        controller.attach(&new).unwrap();

        assert!(old.is_closed());
        assert_eq!(new.controller_count(), 1);
        assert_eq!(app.documents().len(), 1);
    }
}
