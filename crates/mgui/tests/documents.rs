//! Document lifetime with controllers and the save-before-close flow.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use mgui::alert::{AlertKind, AlertResponse};
use mgui::application::Application;
use mgui::backend::HeadlessBackend;
use mgui::document::{CloseDecision, DocWindow, Document, FileSaver};
use mgui::error::DocumentError;
use mgui::window::WindowConfig;
use mgui_core::{AppConfig, EventIn};

fn setup() -> (Rc<HeadlessBackend>, Rc<Application>) {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    (backend, app)
}

/// Answers save requests with a saver the test can finish or fail.
struct SaveDesk {
    savers: RefCell<Vec<FileSaver>>,
    document: Rc<Document>,
    on_request: RefCell<Option<EventIn<PathBuf>>>,
}

impl SaveDesk {
    fn new(document: &Rc<Document>) -> Rc<Self> {
        let desk = Rc::new(SaveDesk {
            savers: RefCell::new(Vec::new()),
            document: Rc::clone(document),
            on_request: RefCell::new(None),
        });
        let on_request = EventIn::bind(&desk, SaveDesk::requested);
        document.save_requested().add_route(&on_request);
        *desk.on_request.borrow_mut() = Some(on_request);
        desk
    }

    fn requested(&self, path: &PathBuf) {
        let saver = FileSaver::new(path.clone());
        self.document.save_to(&saver).unwrap();
        self.savers.borrow_mut().push(saver);
    }

    fn finish(&self) {
        let saver = self.savers.borrow_mut().remove(0);
        saver.record_written(self.document.contents().len() as u64);
        saver.finish();
    }

    fn fail(&self, message: &str) {
        let saver = self.savers.borrow_mut().remove(0);
        saver.fail(DocumentError::Io {
            path: saver.path().display().to_string(),
            message: message.to_string(),
        });
    }
}

#[test]
fn test_document_closes_with_last_window() {
    let (_backend, app) = setup();
    let document = Document::new(&app);
    let first = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();
    let second = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();
    assert_eq!(document.controller_count(), 2);
    assert!(Rc::ptr_eq(
        &app.find_window_for_document(&document).unwrap(),
        second.window()
    ));

    assert!(first.close());
    assert!(!document.is_closed());
    assert_eq!(app.documents().len(), 1);

    assert!(second.close());
    assert!(document.is_closed());
    assert!(app.documents().is_empty());
    assert!(app.find_window_for_document(&document).is_none());
}

#[test]
fn test_window_title_tracks_document() {
    let (backend, app) = setup();
    let document = Document::for_path(&app, "/notes/plan.txt");
    let doc_window = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();
    let native = backend.window(doc_window.window().native().handle()).unwrap();
    assert_eq!(native.title(), "plan.txt");

    document.set_contents("step one");
    assert_eq!(native.title(), "plan.txt*");

    document.set_title("Plan");
    assert_eq!(doc_window.window().displayed_title(), "Plan*");
}

#[test]
fn test_unmodified_document_closes_without_asking() {
    let (backend, app) = setup();
    let document = Document::new(&app);
    let doc_window = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();

    assert_eq!(doc_window.saver().check_close(), CloseDecision::Close);
    assert!(doc_window.close());
    assert!(backend.alerts().shown().is_empty());
}

#[test]
fn test_dont_save_discards_and_closes() {
    let (backend, app) = setup();
    let document = Document::for_path(&app, "/notes/draft.txt");
    let doc_window = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();
    document.set_contents("unsaved");

    backend.alerts().script(AlertResponse::Secondary);
    assert!(!doc_window.close());
    let alert = backend.alerts().last().unwrap();
    assert_eq!(alert.kind, AlertKind::Question);
    assert_eq!(alert.message, "Save changes to \"draft.txt\" before closing?");
    assert!(!doc_window.window().is_closed());

    // The answer is handled on the next loop iteration.
    app.run_pending();
    assert!(doc_window.window().is_closed());
    assert!(document.is_closed());
}

#[test]
fn test_cancel_keeps_window_open() {
    let (backend, app) = setup();
    let document = Document::for_path(&app, "/notes/draft.txt");
    let doc_window = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();
    document.set_contents("unsaved");

    assert!(!doc_window.close());
    assert!(doc_window.saver().is_pending());
    assert_eq!(doc_window.saver().check_close(), CloseDecision::Pending);

    assert!(backend.alerts().respond(AlertResponse::Cancel));
    app.run_pending();
    assert!(!doc_window.saver().is_pending());
    assert!(!doc_window.window().is_closed());
    assert!(document.is_modified());
}

#[test]
fn test_save_then_close() {
    let (backend, app) = setup();
    let document = Document::for_path(&app, "/notes/report.txt");
    let desk = SaveDesk::new(&document);
    let doc_window = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();
    document.set_contents("final text");

    backend.alerts().script(AlertResponse::Primary);
    assert!(!doc_window.close());
    app.run_pending();
    assert_eq!(desk.savers.borrow().len(), 1);
    assert!(!doc_window.window().is_closed());

    desk.finish();
    assert!(!document.is_modified());
    assert!(doc_window.window().is_closed());
    assert!(document.is_closed());
}

#[test]
fn test_failed_save_keeps_window_open() {
    let (backend, app) = setup();
    let document = Document::for_path(&app, "/readonly/report.txt");
    let desk = SaveDesk::new(&document);
    let doc_window = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();
    document.set_contents("final text");

    backend.alerts().script(AlertResponse::Primary);
    doc_window.close();
    app.run_pending();
    desk.fail("permission denied");

    let alert = backend.alerts().last().unwrap();
    assert_eq!(alert.kind, AlertKind::Error);
    assert!(alert.message.contains("permission denied"), "{}", alert.message);
    assert!(!doc_window.window().is_closed());
    assert!(!doc_window.saver().is_pending());
    assert!(document.is_modified());
}

#[test]
fn test_save_without_saver_reports_error_and_can_close_later() {
    let (backend, app) = setup();
    let document = Document::for_path(&app, "/notes/orphan.txt");
    let doc_window = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();
    document.set_contents("unsaved");

    backend.alerts().script(AlertResponse::Primary);
    assert!(!doc_window.close());
    app.run_pending();

    let alert = backend.alerts().last().unwrap();
    assert_eq!(alert.kind, AlertKind::Error);
    assert_eq!(alert.message, DocumentError::NoSaver.to_string());
    assert!(!doc_window.saver().is_pending());
    assert!(!doc_window.window().is_closed());

    // The flow is not stuck: the next close asks again.
    backend.alerts().script(AlertResponse::Secondary);
    assert!(!app.quit());
    app.run_pending();
    assert!(doc_window.window().is_closed());
    assert!(app.quit());
}

#[test]
fn test_save_without_path_reports_error() {
    let (backend, app) = setup();
    let document = Document::new(&app);
    let doc_window = DocWindow::new(&app, &document, WindowConfig::default()).unwrap();
    document.set_contents("fresh");

    backend.alerts().script(AlertResponse::Primary);
    doc_window.close();
    app.run_pending();

    let alert = backend.alerts().last().unwrap();
    assert_eq!(alert.message, DocumentError::NoPath.to_string());
    assert!(!doc_window.window().is_closed());
}
