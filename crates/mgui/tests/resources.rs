//! Menus built from XML and alerts loaded from XML.

use std::cell::Cell;
use std::rc::Rc;

use mgui::alert::{AlertKind, AlertResponse};
use mgui::application::{Application, ApplicationDelegate};
use mgui::backend::{HeadlessBackend, HeadlessMenuEntry};
use mgui::command::Command;
use mgui::error::{GuiError, ResourceError};
use mgui::keys::{Key, KeyCombination};
use mgui::menu::{MenuEntry, MenuResource};
use mgui::window::{Window, WindowConfig};
use mgui_core::AppConfig;

const MENUS: &str = r#"
<menubar id="main">
  <menu id="file" label="File">
    <item label="New" action="app.new" accel="Ctrl+N"/>
    <item label="Close" action="win.close" accel="Ctrl+W"/>
    <separator/>
    <menu id="recent" label="Open Recent">
      <item label="Clear" action="win.clear-recent"/>
    </menu>
    <item label="Quit" action="app.quit" accel="Ctrl+Q"/>
  </menu>
  <menu id="view" label="View">
    <item label="Wrap" action="win.wrap"/>
  </menu>
</menubar>
"#;

struct Counter {
    count: Cell<u32>,
}

impl ApplicationDelegate for Counter {
    fn new_document(&self, _app: &Rc<Application>) -> mgui::Result<()> {
        self.count.set(self.count.get() + 1);
        Ok(())
    }
}

#[test]
fn test_menu_bar_from_xml() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    let bar = MenuResource::from_xml(&app, MENUS).unwrap();

    assert_eq!(bar.id(), Some("main"));
    assert_eq!(bar.len(), 2);
    let file = bar.find_menu("file").unwrap();
    assert_eq!(file.label(), "File");
    assert_eq!(file.entries().len(), 5);
    assert!(matches!(file.entries()[2], MenuEntry::Separator));
    assert_eq!(bar.find_menu("recent").unwrap().label(), "Open Recent");
    assert!(bar.find_menu("help").is_none());
    assert_eq!(
        bar.find_item("app.quit").unwrap().accelerator,
        Some(KeyCombination::ctrl(Key::Q))
    );

    app.set_menu_bar(bar).unwrap();
    let installed = backend.menu_bar();
    assert_eq!(installed.len(), 2);
    let labels: Vec<String> = installed[0]
        .entries()
        .iter()
        .map(|entry| match entry {
            HeadlessMenuEntry::Item { label, .. } | HeadlessMenuEntry::Submenu { label, .. } => label.clone(),
            HeadlessMenuEntry::Separator => "-".to_string(),
        })
        .collect();
    assert_eq!(labels, ["New", "Close", "-", "Open Recent", "Quit"]);
}

#[test]
fn test_menu_items_activate_scoped_actions() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    let counter = Rc::new(Counter { count: Cell::new(0) });
    app.set_delegate(Some(counter.clone()));
    app.set_menu_bar(MenuResource::from_xml(&app, MENUS).unwrap()).unwrap();
    let file = backend.menu_bar()[0].clone();

    assert!(file.activate("New"));
    assert_eq!(counter.count.get(), 1);

    let window = Window::new(&app, WindowConfig::new("doc")).unwrap();
    assert!(file.activate("Close"));
    assert!(window.is_closed());

    // Without a front window the item fails and the failure is shown.
    assert!(file.activate("Close"));
    let alert = backend.alerts().last().unwrap();
    assert_eq!(alert.kind, AlertKind::Error);
    assert!(alert.message.contains("win.close"), "{}", alert.message);
}

struct Toggle {
    flips: Cell<u32>,
}

impl Toggle {
    fn wrap(&self, _on: bool) {
        self.flips.set(self.flips.get() + 1);
    }
}

#[test]
fn test_menu_toggles_window_state() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    app.set_menu_bar(MenuResource::from_xml(&app, MENUS).unwrap()).unwrap();
    let window = Window::new(&app, WindowConfig::new("doc")).unwrap();

    let toggle = Rc::new(Toggle { flips: Cell::new(0) });
    let wrap = Command::new(Rc::downgrade(&toggle), "wrap", Toggle::wrap);
    wrap.register(window.actions()).unwrap();

    let view = backend.menu_bar()[1].clone();
    view.activate("Wrap");
    view.activate("Wrap");
    assert_eq!(toggle.flips.get(), 2);
    assert_eq!(wrap.state().unwrap(), Some(false));
}

#[test]
fn test_invalid_menu_xml() {
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();

    let stray = MenuResource::from_xml(&app, r#"<menubar><item label="x" action="app.quit"/></menubar>"#);
    assert!(matches!(stray, Err(GuiError::Resource(ResourceError::UnexpectedElement(name))) if name == "item"));

    let unlabeled = MenuResource::from_xml(&app, r#"<menubar><menu id="m"/></menubar>"#);
    assert!(matches!(
        unlabeled,
        Err(GuiError::Resource(ResourceError::MissingAttribute { attribute: "label", .. }))
    ));

    let bad_accel = MenuResource::from_xml(
        &app,
        r#"<menubar><menu label="m"><item label="x" action="app.quit" accel="Ctrl+Nope"/></menu></menubar>"#,
    );
    assert!(matches!(bad_accel, Err(GuiError::Resource(ResourceError::Accelerator(_)))));
}

#[test]
fn test_alerts_from_xml() {
    let backend = HeadlessBackend::new();
    let app = Application::new(AppConfig::new(), backend.clone()).unwrap();
    let loaded = app
        .load_alerts(
            r#"<alerts>
                 <alert id="revert" kind="warning" primary="Revert" cancel="Cancel">Revert "^0" to the saved version?</alert>
               </alerts>"#,
        )
        .unwrap();
    assert_eq!(loaded, 1);

    let answer = Rc::new(Cell::new(None));
    let sink = Rc::clone(&answer);
    backend.alerts().script(AlertResponse::Cancel);
    app.display_alert_with("revert", &["notes.txt"], move |r| sink.set(Some(r)))
        .unwrap();

    let alert = backend.alerts().last().unwrap();
    assert_eq!(alert.kind, AlertKind::Warning);
    assert_eq!(alert.message, "Revert \"notes.txt\" to the saved version?");
    assert_eq!(alert.primary, "Revert");
    assert_eq!(alert.cancel.as_deref(), Some("Cancel"));
    assert_eq!(answer.get(), Some(AlertResponse::Cancel));

    assert!(matches!(
        app.display_alert("missing", &[]),
        Err(GuiError::Resource(ResourceError::UnknownAlert(name))) if name == "missing"
    ));
}
