//! Window list order, activation and accelerator scoping.

use std::cell::Cell;
use std::rc::{Rc, Weak};

use mgui::application::Application;
use mgui::backend::HeadlessBackend;
use mgui::command::Command;
use mgui::control::Button;
use mgui::keys::{Key, KeyCombination};
use mgui::window::{Window, WindowConfig, WindowDelegate};
use mgui_core::{AppConfig, Rect};

fn titles(app: &Application) -> Vec<String> {
    app.windows().iter().map(|w| w.title()).collect()
}

#[test]
fn test_window_list_order() {
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
    let w1 = Window::new(&app, WindowConfig::new("W1")).unwrap();
    let w2 = Window::new(&app, WindowConfig::new("W2")).unwrap();
    let w3 = Window::new(&app, WindowConfig::new("W3")).unwrap();
    assert_eq!(titles(&app), ["W3", "W2", "W1"]);

    assert!(w2.close());
    assert_eq!(titles(&app), ["W3", "W1"]);

    w1.select();
    assert_eq!(titles(&app), ["W1", "W3"]);
    assert!(w1.is_front());
    assert!(w1.is_active());
    assert!(!w3.is_active());
}

#[test]
fn test_closing_front_activates_next() {
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
    let back = Window::new(&app, WindowConfig::new("back")).unwrap();
    let front = Window::new(&app, WindowConfig::new("front")).unwrap();
    assert!(!back.is_active());

    assert!(front.close());
    assert!(back.is_front());
    assert!(back.is_active());
    assert!(!front.close());
}

#[test]
fn test_native_close_and_focus() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    let first = Window::new(&app, WindowConfig::new("first").with_visible(true)).unwrap();
    let second = Window::new(&app, WindowConfig::new("second").with_visible(true)).unwrap();

    let native_first = backend.window(first.native().handle()).unwrap();
    native_first.focus();
    assert!(first.is_front());
    assert_eq!(native_first.raise_count(), 1);

    native_first.configure(Rect::new(5, 5, 300, 200));
    assert_eq!(first.frame(), Rect::new(5, 5, 300, 200));
    let views = first.views();
    assert_eq!(views.frame(views.root()).unwrap(), Rect::new(0, 0, 300, 200));
    drop(views);

    assert!(!native_first.request_close());
    assert!(first.is_closed());
    assert!(native_first.is_destroyed());
    assert_eq!(titles(&app), ["second"]);
    assert!(second.is_visible());
}

struct Refuse {
    asked: Cell<u32>,
}

impl WindowDelegate for Refuse {
    fn should_close(&self, _window: &Window) -> bool {
        self.asked.set(self.asked.get() + 1);
        false
    }
}

#[test]
fn test_delegate_can_refuse_close() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    let window = Window::new(&app, WindowConfig::new("stubborn")).unwrap();
    let delegate = Rc::new(Refuse { asked: Cell::new(0) });
    let weak: Weak<dyn WindowDelegate> = Rc::downgrade(&delegate) as Weak<dyn WindowDelegate>;
    window.set_delegate(Some(weak));

    let native = backend.window(window.native().handle()).unwrap();
    assert!(native.request_close());
    assert!(!app.close_all());
    assert_eq!(delegate.asked.get(), 2);
    assert_eq!(app.windows().len(), 1);

    drop(delegate);
    assert!(app.close_all());
    assert!(app.windows().is_empty());
}

struct Editor {
    saves: Cell<u32>,
}

impl Editor {
    fn save(&self, _: ()) {
        self.saves.set(self.saves.get() + 1);
    }
}

#[test]
fn test_window_accelerators_follow_front_window() {
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
    let ctrl_s = KeyCombination::ctrl(Key::S);

    let editor = Rc::new(Editor { saves: Cell::new(0) });
    let first = Window::new(&app, WindowConfig::new("editor")).unwrap();
    let save = Command::new(Rc::downgrade(&editor), "save", Editor::save).with_accelerator(ctrl_s);
    save.register(first.actions()).unwrap();

    assert!(app.dispatch_accelerator(&ctrl_s));
    assert_eq!(editor.saves.get(), 1);

    let other = Window::new(&app, WindowConfig::new("other")).unwrap();
    assert!(!app.dispatch_accelerator(&ctrl_s));
    assert_eq!(editor.saves.get(), 1);

    first.select();
    assert!(app.dispatch_accelerator(&ctrl_s));
    assert_eq!(editor.saves.get(), 2);
    drop(other);
}

#[test]
fn test_application_accelerators_fire_globally() {
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
    let _a = Window::new(&app, WindowConfig::new("a")).unwrap();
    let _b = Window::new(&app, WindowConfig::new("b")).unwrap();

    assert!(app.dispatch_accelerator(&KeyCombination::ctrl_shift(Key::W)));
    assert!(app.windows().is_empty());
}

#[test]
fn test_window_close_accelerator_wins_over_application() {
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
    let back = Window::new(&app, WindowConfig::new("back")).unwrap();
    let front = Window::new(&app, WindowConfig::new("front")).unwrap();

    assert!(app.dispatch_accelerator(&KeyCombination::ctrl(Key::W)));
    assert!(front.is_closed());
    assert!(!back.is_closed());
}

#[test]
fn test_control_accelerator_needs_visible_enabled_control() {
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
    let window = Window::new(&app, WindowConfig::new("form").with_visible(true)).unwrap();
    let button = Button::new(&window, window.root_view(), "Go", Rect::new(0, 0, 60, 20)).unwrap();
    let enter = KeyCombination::new(Key::Enter, Default::default());
    button.set_accelerator(enter).unwrap();

    let pressed = Rc::new(Cell::new(0));
    let counter = Rc::clone(&pressed);
    let on_click = mgui_core::EventIn::new(move |_: &()| counter.set(counter.get() + 1));
    button.clicked().add_route(&on_click);

    assert!(window.dispatch_accelerator(&enter));
    assert_eq!(pressed.get(), 1);

    window.views_mut().disable(button.control().view()).unwrap();
    assert!(!window.dispatch_accelerator(&enter));
    assert_eq!(pressed.get(), 1);
}
