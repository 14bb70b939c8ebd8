//! Native signal to slot to event to command, teardown and containment.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use mgui::alert::AlertKind;
use mgui::application::Application;
use mgui::backend::{Backend, HeadlessBackend};
use mgui::command::{ActionValue, Command};
use mgui::control::{Button, CheckBox};
use mgui::error::NativeError;
use mgui::native::{HeadlessSignals, NativeHandle, NativeValue, SharedSignalSource, Slot};
use mgui::window::{Window, WindowConfig};
use mgui_core::{AppConfig, EventIn, Rect};

/// Counts saves; its `save` command is triggered by a button.
struct Editor {
    saves: Cell<u32>,
    save: Command<Editor>,
    on_save_clicked: EventIn<()>,
}

impl Editor {
    fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Editor>| Editor {
            saves: Cell::new(0),
            save: Command::new(weak.clone(), "save", Editor::save),
            on_save_clicked: EventIn::bind_weak(weak.clone(), Editor::save_clicked),
        })
    }

    fn save(&self, _: ()) {
        self.saves.set(self.saves.get() + 1);
    }

    fn save_clicked(&self, _: &()) {
        let _ = self.save.execute(());
    }
}

#[test]
fn test_native_click_reaches_command() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    let window = Window::new(&app, WindowConfig::new("editor").with_visible(true)).unwrap();
    let button = Button::new(&window, window.root_view(), "Save", Rect::new(8, 8, 80, 24)).unwrap();

    let editor = Editor::new();
    editor.save.register(window.actions()).unwrap();
    button.clicked().add_route(&editor.on_save_clicked);

    let native = backend.control(button.control().native().handle()).unwrap();
    assert!(native.is_visible());
    assert_eq!(native.frame(), Rect::new(8, 8, 80, 24));

    native.click();
    native.click();
    assert_eq!(editor.saves.get(), 2);

    window.actions().activate("save", ActionValue::None).unwrap();
    assert_eq!(editor.saves.get(), 3);

    drop(editor);
    native.click();
    assert_eq!(button.clicked().route_count(), 0);
}

#[test]
fn test_check_box_toggles_from_native() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    let window = Window::new(&app, WindowConfig::new("prefs").with_visible(true)).unwrap();
    let check = CheckBox::new(&window, window.root_view(), "Wrap", Rect::new(0, 0, 100, 20)).unwrap();

    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let on_toggled = EventIn::new(move |on: &bool| sink.borrow_mut().push(*on));
    check.toggled().add_route(&on_toggled);

    let native = backend.control(check.control().native().handle()).unwrap();
    native.toggle();
    native.toggle();
    assert_eq!(*seen.borrow(), [true, false]);

    check.set_checked(true);
    assert!(native.is_checked());
    assert_eq!(seen.borrow().len(), 2);
}

#[test]
fn test_hiding_window_hides_controls() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    let window = Window::new(&app, WindowConfig::new("panel")).unwrap();
    let button = Button::new(&window, window.root_view(), "Go", Rect::new(0, 0, 40, 20)).unwrap();
    let native = backend.control(button.control().native().handle()).unwrap();
    assert!(!native.is_visible());

    window.show();
    assert!(native.is_visible());
    window.hide();
    assert!(!native.is_visible());

    window.views_mut().hide(button.control().view()).unwrap();
    window.show();
    assert!(!native.is_visible());
}

struct Fragile {
    calls: Cell<u32>,
    slot: Slot<Fragile, (i64,), i64>,
}

impl Fragile {
    fn double(&self, (n,): (i64,)) -> i64 {
        self.calls.set(self.calls.get() + 1);
        if n < 0 {
            panic!("negative input");
        }
        n * 2
    }
}

fn fragile() -> Rc<Fragile> {
    Rc::new_cyclic(|weak: &Weak<Fragile>| Fragile {
        calls: Cell::new(0),
        slot: Slot::new(weak.clone(), Fragile::double),
    })
}

#[test]
fn test_panic_contained_and_reported() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    let signals = backend.headless_signals();
    let object = signals.create_object("spinner");

    let fragile = fragile();
    fragile.slot.connect(&backend.signals(), object, "value").unwrap();

    assert_eq!(signals.emit(object, "value", &[NativeValue::Int(21)]), NativeValue::Int(42));
    assert_eq!(signals.emit(object, "value", &[NativeValue::Int(-1)]), NativeValue::None);
    assert_eq!(fragile.calls.get(), 2);

    let alert = backend.alerts().last().unwrap();
    assert_eq!(alert.kind, AlertKind::Error);
    assert!(alert.message.contains("negative input"), "{}", alert.message);

    // A bad argument is contained the same way.
    assert_eq!(signals.emit(object, "value", &[NativeValue::Str("x".into())]), NativeValue::None);
    assert_eq!(fragile.calls.get(), 2);
    assert_eq!(backend.alerts().shown().len(), 2);
    drop(app);
}

#[test]
fn test_slot_released_exactly_once() {
    let backend = HeadlessBackend::new();
    let signals = Rc::clone(backend.headless_signals());
    let source = backend.signals();

    // Native object destroyed first.
    let object = signals.create_object("spinner");
    let first = fragile();
    first.slot.connect(&source, object, "value").unwrap();
    assert!(signals.destroy_object(object));
    assert_eq!(signals.release_count(), 1);
    assert!(!first.slot.is_connected());
    drop(first);
    assert_eq!(signals.release_count(), 1);

    // Slot dropped first.
    let object = signals.create_object("spinner");
    let second = fragile();
    second.slot.connect(&source, object, "value").unwrap();
    drop(second);
    assert_eq!(signals.release_count(), 2);
    assert_eq!(signals.handler_count(object, "value"), 0);
    assert!(signals.destroy_object(object));
    assert_eq!(signals.release_count(), 2);
}

#[test]
fn test_closed_window_releases_its_slots() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    let signals = Rc::clone(backend.headless_signals());

    let window = Window::new(&app, WindowConfig::new("a")).unwrap();
    let handle = window.native().handle();
    assert_eq!(signals.handler_count(handle, "delete-event"), 1);
    let before = signals.release_count();
    assert!(window.close());
    assert_eq!(signals.release_count() - before, 3);
    drop(window);
    assert_eq!(signals.release_count() - before, 3);
    assert!(!signals.contains(handle));
}

/// Records which native object fired.
struct Tracker {
    seen: RefCell<Vec<NativeHandle>>,
    slot: Slot<Tracker>,
}

impl Tracker {
    fn new() -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Tracker>| Tracker {
            seen: RefCell::new(Vec::new()),
            slot: Slot::new(weak.clone(), Tracker::fired),
        })
    }

    fn fired(&self, _: ()) {
        if let Some(sender) = self.slot.sender() {
            self.seen.borrow_mut().push(sender);
        }
    }
}

#[test]
fn test_one_slot_serves_many_objects() {
    let signals = HeadlessSignals::new();
    let source: SharedSignalSource = signals.clone();
    let a = signals.create_object("button");
    let b = signals.create_object("button");

    let tracker = Tracker::new();
    tracker.slot.connect(&source, a, "clicked").unwrap();
    tracker.slot.connect(&source, b, "clicked").unwrap();
    assert_eq!(
        tracker.slot.connect(&source, a, "clicked"),
        Err(NativeError::AlreadyConnected)
    );
    assert_eq!(tracker.slot.connection_count(), 2);

    signals.emit(a, "clicked", &[]);
    signals.emit(b, "clicked", &[]);
    signals.emit(a, "clicked", &[]);
    assert_eq!(*tracker.seen.borrow(), [a, b, a]);
    assert_eq!(tracker.slot.sender(), None);

    // Destroying one object leaves the other connection alone.
    assert!(signals.destroy_object(a));
    assert_eq!(tracker.slot.connection_count(), 1);
    signals.emit(b, "clicked", &[]);
    assert_eq!(tracker.seen.borrow().len(), 4);

    let before = signals.release_count();
    drop(tracker);
    assert_eq!(signals.release_count() - before, 1);
    assert_eq!(signals.handler_count(b, "clicked"), 0);
}

#[test]
fn test_disconnect_from_one_object() {
    let signals = HeadlessSignals::new();
    let source: SharedSignalSource = signals.clone();
    let a = signals.create_object("button");
    let b = signals.create_object("button");

    let tracker = Tracker::new();
    tracker.slot.connect(&source, a, "clicked").unwrap();
    tracker.slot.connect(&source, b, "clicked").unwrap();

    assert!(tracker.slot.disconnect_from(a));
    assert!(!tracker.slot.disconnect_from(a));
    signals.emit(a, "clicked", &[]);
    signals.emit(b, "clicked", &[]);
    assert_eq!(*tracker.seen.borrow(), [b]);
}

#[test]
fn test_block_nests() {
    let signals = HeadlessSignals::new();
    let source: SharedSignalSource = signals.clone();
    let a = signals.create_object("button");
    let tracker = Tracker::new();
    tracker.slot.connect(&source, a, "clicked").unwrap();

    tracker.slot.block().unwrap();
    tracker.slot.block().unwrap();
    signals.emit(a, "clicked", &[]);
    tracker.slot.unblock().unwrap();
    signals.emit(a, "clicked", &[]);
    assert!(tracker.seen.borrow().is_empty());

    tracker.slot.unblock().unwrap();
    signals.emit(a, "clicked", &[]);
    assert_eq!(*tracker.seen.borrow(), [a]);

    assert!(tracker.slot.disconnect());
    assert_eq!(tracker.slot.block(), Err(NativeError::NotConnected));
    assert_eq!(tracker.slot.unblock(), Err(NativeError::NotConnected));
    assert!(!tracker.slot.disconnect());
}
