//! The document model.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use mgui_core::logging::targets;
use mgui_core::{EventIn, EventOut, RegistryEntry};

use super::ports::{FileLoader, FileSaver};
use crate::application::Application;
use crate::error::DocumentError;

const UNTITLED: &str = "Untitled";

/// The data behind one or more windows.
///
/// A document lives in the application's document list from creation until
/// it closes. It closes when the last [`Controller`](super::Controller)
/// attached to it detaches.
///
/// Loading and saving go through [`FileLoader`] and [`FileSaver`]: the
/// document routes their ports into its own receivers.
pub struct Document {
    app: Weak<Application>,
    title: RefCell<String>,
    path: RefCell<Option<PathBuf>>,
    contents: RefCell<Vec<u8>>,
    modified: Cell<bool>,
    controllers: Cell<usize>,
    closed: Cell<bool>,
    entry: RefCell<Option<RegistryEntry<Document>>>,
    pending_load: RefCell<Option<PathBuf>>,
    pending_save: RefCell<Option<PathBuf>>,

    modified_changed: EventOut<bool>,
    title_changed: EventOut<String>,
    loaded: EventOut<()>,
    saved: EventOut<()>,
    failed: EventOut<DocumentError>,
    save_requested: EventOut<PathBuf>,
    closed_event: EventOut<()>,

    read_in: EventIn<Vec<u8>>,
    load_completed_in: EventIn<()>,
    load_error_in: EventIn<DocumentError>,
    save_completed_in: EventIn<()>,
    save_error_in: EventIn<DocumentError>,
}

impl Document {
    /// Create an untitled document and add it to the document list.
    pub fn new(app: &Rc<Application>) -> Rc<Self> {
        Self::build(app, UNTITLED.to_string(), None)
    }

    /// Create a document for `path`. The contents stay empty until loaded.
    pub fn for_path(app: &Rc<Application>, path: impl Into<PathBuf>) -> Rc<Self> {
        let path = path.into();
        Self::build(app, title_for(&path), Some(path))
    }

    fn build(app: &Rc<Application>, title: String, path: Option<PathBuf>) -> Rc<Self> {
        let document = Rc::new_cyclic(|weak: &Weak<Document>| Document {
            app: Rc::downgrade(app),
            title: RefCell::new(title),
            path: RefCell::new(path),
            contents: RefCell::new(Vec::new()),
            modified: Cell::new(false),
            controllers: Cell::new(0),
            closed: Cell::new(false),
            entry: RefCell::new(None),
            pending_load: RefCell::new(None),
            pending_save: RefCell::new(None),
            modified_changed: EventOut::new(),
            title_changed: EventOut::new(),
            loaded: EventOut::new(),
            saved: EventOut::new(),
            failed: EventOut::new(),
            save_requested: EventOut::new(),
            closed_event: EventOut::new(),
            read_in: EventIn::bind_weak(weak.clone(), Document::on_read),
            load_completed_in: EventIn::bind_weak(weak.clone(), Document::on_load_completed),
            load_error_in: EventIn::bind_weak(weak.clone(), Document::on_load_error),
            save_completed_in: EventIn::bind_weak(weak.clone(), Document::on_save_completed),
            save_error_in: EventIn::bind_weak(weak.clone(), Document::on_save_error),
        });
        *document.entry.borrow_mut() = Some(app.documents().register(&document));
        tracing::debug!(target: targets::DOCUMENT, title = %document.title.borrow(), "document opened");
        document
    }

    // =========================================================================
    // Properties
    // =========================================================================

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        let title = title.into();
        if *self.title.borrow() == title {
            return;
        }
        *self.title.borrow_mut() = title.clone();
        self.title_changed.emit(title);
    }

    /// The backing file, once loaded from or saved to one.
    pub fn path(&self) -> Option<PathBuf> {
        self.path.borrow().clone()
    }

    pub fn contents(&self) -> Ref<'_, [u8]> {
        Ref::map(self.contents.borrow(), Vec::as_slice)
    }

    /// Replace the contents and mark the document modified.
    pub fn set_contents(&self, contents: impl Into<Vec<u8>>) {
        *self.contents.borrow_mut() = contents.into();
        self.set_modified(true);
    }

    pub fn is_modified(&self) -> bool {
        self.modified.get()
    }

    pub fn set_modified(&self, modified: bool) {
        if self.modified.replace(modified) != modified {
            tracing::trace!(target: targets::DOCUMENT, title = %self.title.borrow(), modified, "modified changed");
            self.modified_changed.emit(modified);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Number of attached controllers.
    pub fn controller_count(&self) -> usize {
        self.controllers.get()
    }

    // =========================================================================
    // Events
    // =========================================================================

    pub fn modified_changed(&self) -> &EventOut<bool> {
        &self.modified_changed
    }

    pub fn title_changed(&self) -> &EventOut<String> {
        &self.title_changed
    }

    /// A load finished.
    pub fn loaded(&self) -> &EventOut<()> {
        &self.loaded
    }

    /// A save finished.
    pub fn saved(&self) -> &EventOut<()> {
        &self.saved
    }

    /// A load or save failed.
    pub fn failed(&self) -> &EventOut<DocumentError> {
        &self.failed
    }

    /// Someone asked for a save; the receiver should run a [`FileSaver`] for
    /// the path and pass it to [`save_to`](Self::save_to).
    pub fn save_requested(&self) -> &EventOut<PathBuf> {
        &self.save_requested
    }

    /// The document has closed.
    pub fn closed(&self) -> &EventOut<()> {
        &self.closed_event
    }

    // =========================================================================
    // Loading and saving
    // =========================================================================

    /// Take the contents from `loader`. The previous contents are replaced
    /// as chunks arrive.
    pub fn load_from(&self, loader: &FileLoader) -> Result<(), DocumentError> {
        self.ensure_open()?;
        self.contents.borrow_mut().clear();
        *self.pending_load.borrow_mut() = Some(loader.path().to_path_buf());
        loader.read().add_route(&self.read_in);
        loader.completed().add_route(&self.load_completed_in);
        loader.error().add_route(&self.load_error_in);
        tracing::debug!(target: targets::DOCUMENT, path = %loader.path().display(), "loading");
        Ok(())
    }

    /// Track `saver`, which writes [`contents`](Self::contents) to its path.
    pub fn save_to(&self, saver: &FileSaver) -> Result<(), DocumentError> {
        self.ensure_open()?;
        *self.pending_save.borrow_mut() = Some(saver.path().to_path_buf());
        saver.completed().add_route(&self.save_completed_in);
        saver.error().add_route(&self.save_error_in);
        tracing::debug!(target: targets::DOCUMENT, path = %saver.path().display(), "saving");
        Ok(())
    }

    /// Ask for a save to the document's file through
    /// [`save_requested`](Self::save_requested).
    ///
    /// Fails with [`DocumentError::NoSaver`] when nothing is routed to
    /// `save_requested`, since the save could never complete.
    pub fn request_save(&self) -> Result<(), DocumentError> {
        self.ensure_open()?;
        let path = self.path().ok_or(DocumentError::NoPath)?;
        if self.save_requested.route_count() == 0 {
            tracing::warn!(target: targets::DOCUMENT, path = %path.display(), "save requested without a saver");
            return Err(DocumentError::NoSaver);
        }
        self.save_requested.emit(path);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), DocumentError> {
        if self.closed.get() {
            Err(DocumentError::Closed)
        } else {
            Ok(())
        }
    }

    fn on_read(&self, chunk: &Vec<u8>) {
        self.contents.borrow_mut().extend_from_slice(chunk);
    }

    fn on_load_completed(&self, _: &()) {
        if let Some(path) = self.pending_load.borrow_mut().take() {
            self.adopt_path(path);
        }
        self.set_modified(false);
        self.loaded.emit(());
    }

    fn on_load_error(&self, error: &DocumentError) {
        self.pending_load.borrow_mut().take();
        if let Some(app) = self.app.upgrade() {
            app.display_error(error);
        }
        self.failed.emit(error.clone());
    }

    fn on_save_completed(&self, _: &()) {
        if let Some(path) = self.pending_save.borrow_mut().take() {
            self.adopt_path(path);
        }
        self.set_modified(false);
        self.saved.emit(());
    }

    fn on_save_error(&self, error: &DocumentError) {
        self.pending_save.borrow_mut().take();
        if let Some(app) = self.app.upgrade() {
            let title = self.title();
            let message = error.to_string();
            if let Err(err) = app.display_alert("save-failed", &[&title, &message]) {
                app.display_error(&err);
            }
        }
        self.failed.emit(error.clone());
    }

    fn adopt_path(&self, path: PathBuf) {
        self.set_title(title_for(&path));
        *self.path.borrow_mut() = Some(path);
    }

    // =========================================================================
    // Controllers
    // =========================================================================

    pub(crate) fn attach_controller(&self) -> Result<(), DocumentError> {
        self.ensure_open()?;
        self.controllers.set(self.controllers.get() + 1);
        Ok(())
    }

    pub(crate) fn detach_controller(&self) {
        let count = self.controllers.get().saturating_sub(1);
        self.controllers.set(count);
        if count == 0 {
            self.close();
        }
    }

    fn close(&self) {
        if self.closed.replace(true) {
            return;
        }
        if let Some(mut entry) = self.entry.borrow_mut().take() {
            entry.unregister();
        }
        tracing::debug!(target: targets::DOCUMENT, title = %self.title.borrow(), "document closed");
        self.closed_event.emit(());
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("title", &self.title.borrow())
            .field("path", &self.path.borrow())
            .field("modified", &self.modified.get())
            .field("controllers", &self.controllers.get())
            .field("closed", &self.closed.get())
            .finish()
    }
}

fn title_for(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| UNTITLED.to_string())
}

#[cfg(test)]
mod tests {
    use mgui_core::AppConfig;

    use super::*;
    use crate::backend::HeadlessBackend;

    fn app() -> Rc<Application> {
        Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap()
    }

    #[test]
    fn test_documents_listed_most_recent_first() {
        let app = app();
        let a = Document::new(&app);
        let b = Document::for_path(&app, "/tmp/b.txt");
        let titles: Vec<String> = app.documents().iter().map(|d| d.title()).collect();
        assert_eq!(titles, ["b.txt", "Untitled"]);
        assert!(Rc::ptr_eq(
            &app.document_for_path(Path::new("/tmp/b.txt")).unwrap(),
            &b
        ));
        drop(a);
        assert_eq!(app.documents().len(), 1);
    }

    #[test]
    fn test_load_replaces_contents_and_clears_modified() {
        let app = app();
        let document = Document::new(&app);
        document.set_contents("draft");
        assert!(document.is_modified());

        let loader = FileLoader::new("/docs/letter.txt");
        document.load_from(&loader).unwrap();
        loader.feed(b"Dear ");
        loader.feed(b"reader");
        loader.finish();

        assert_eq!(&*document.contents(), b"Dear reader");
        assert!(!document.is_modified());
        assert_eq!(document.title(), "letter.txt");
        assert_eq!(document.path().as_deref(), Some(Path::new("/docs/letter.txt")));
    }

    #[test]
    fn test_request_save_needs_a_path_and_a_saver() {
        let app = app();
        let document = Document::new(&app);
        assert_eq!(document.request_save(), Err(DocumentError::NoPath));

        let requested = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&requested);
        let on_request = EventIn::new(move |path: &PathBuf| *sink.borrow_mut() = Some(path.clone()));
        let named = Document::for_path(&app, "/docs/a.txt");
        assert_eq!(named.request_save(), Err(DocumentError::NoSaver));
        named.save_requested().add_route(&on_request);
        named.request_save().unwrap();
        assert_eq!(requested.borrow().as_deref(), Some(Path::new("/docs/a.txt")));
    }

    #[test]
    fn test_modified_changed_fires_on_change_only() {
        let app = app();
        let document = Document::new(&app);
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&changes);
        let on_change = EventIn::new(move |m: &bool| sink.borrow_mut().push(*m));
        document.modified_changed().add_route(&on_change);

        document.set_modified(true);
        document.set_modified(true);
        document.set_modified(false);
        assert_eq!(*changes.borrow(), [true, false]);
    }

    #[test]
    fn test_closes_when_last_controller_detaches() {
        let app = app();
        let document = Document::new(&app);
        document.attach_controller().unwrap();
        document.attach_controller().unwrap();

        document.detach_controller();
        assert!(!document.is_closed());
        document.detach_controller();
        assert!(document.is_closed());
        assert!(app.documents().is_empty());
        assert_eq!(document.attach_controller(), Err(DocumentError::Closed));
    }
}
