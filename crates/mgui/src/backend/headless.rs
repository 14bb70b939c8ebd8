//! The headless backend.
//!
//! Every platform object is an in-memory record that tests can inspect and
//! drive. Handles returned by the backend's accessors share state with the
//! objects the portable layer holds, so a test can click a button or close
//! a window exactly the way a toolkit would.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use mgui_core::Rect;
use mgui_core::logging::targets;

use super::Backend;
use crate::alert::{Alert, AlertCallback, AlertPresenter, AlertResponse};
use crate::control::{ControlImpl, ControlKind};
use crate::error::Result;
use crate::keys::Accelerator;
use crate::menu::{MenuBar, MenuImpl, MenuItem};
use crate::native::{HeadlessSignals, NativeHandle, NativeValue, NativeWidget, SharedSignalSource};
use crate::window::{WindowConfig, WindowImpl};

/// A backend without a display.
pub struct HeadlessBackend {
    signals: Rc<HeadlessSignals>,
    windows: RefCell<Vec<HeadlessWindow>>,
    controls: RefCell<Vec<HeadlessControl>>,
    menus: RefCell<Vec<HeadlessMenu>>,
    menu_bar: RefCell<Vec<HeadlessMenu>>,
    alerts: Rc<HeadlessAlerts>,
}

impl HeadlessBackend {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            signals: HeadlessSignals::new(),
            windows: RefCell::new(Vec::new()),
            controls: RefCell::new(Vec::new()),
            menus: RefCell::new(Vec::new()),
            menu_bar: RefCell::new(Vec::new()),
            alerts: Rc::new(HeadlessAlerts::default()),
        })
    }

    /// The in-memory signal hub behind every native object.
    pub fn headless_signals(&self) -> &Rc<HeadlessSignals> {
        &self.signals
    }

    /// Every window created so far, oldest first, including destroyed ones.
    pub fn windows(&self) -> Vec<HeadlessWindow> {
        self.windows.borrow().clone()
    }

    /// The window wrapping native object `handle`.
    pub fn window(&self, handle: NativeHandle) -> Option<HeadlessWindow> {
        self.windows
            .borrow()
            .iter()
            .find(|w| w.native().handle() == handle)
            .cloned()
    }

    /// Every control created so far, oldest first.
    pub fn controls(&self) -> Vec<HeadlessControl> {
        self.controls.borrow().clone()
    }

    /// The control wrapping native object `handle`.
    pub fn control(&self, handle: NativeHandle) -> Option<HeadlessControl> {
        self.controls
            .borrow()
            .iter()
            .find(|c| c.native().handle() == handle)
            .cloned()
    }

    /// The menu wrapping native object `handle`.
    pub fn menu(&self, handle: NativeHandle) -> Option<HeadlessMenu> {
        self.menus
            .borrow()
            .iter()
            .find(|m| m.native().handle() == handle)
            .cloned()
    }

    /// The installed menu bar's menus.
    pub fn menu_bar(&self) -> Vec<HeadlessMenu> {
        self.menu_bar.borrow().clone()
    }

    /// The alert presenter, for scripting and answering alerts.
    pub fn alerts(&self) -> &Rc<HeadlessAlerts> {
        &self.alerts
    }

    fn native(&self, type_name: &str) -> NativeWidget {
        let handle = self.signals.create_object(type_name);
        let source: SharedSignalSource = Rc::clone(&self.signals) as SharedSignalSource;
        NativeWidget::new(handle, source)
    }
}

impl Backend for HeadlessBackend {
    fn name(&self) -> &str {
        "headless"
    }

    fn signals(&self) -> SharedSignalSource {
        Rc::clone(&self.signals) as SharedSignalSource
    }

    fn create_window(&self, config: &WindowConfig) -> Result<Box<dyn WindowImpl>> {
        let window = HeadlessWindow {
            state: Rc::new(WindowState {
                native: self.native("window"),
                signals: Rc::clone(&self.signals),
                title: RefCell::new(config.title().to_string()),
                visible: Cell::new(false),
                frame: Cell::new(config.frame().unwrap_or(Rect::ZERO)),
                resizable: config.is_resizable(),
                modal: config.is_modal(),
                raises: Cell::new(0),
                destroyed: Cell::new(false),
            }),
        };
        tracing::trace!(target: targets::WINDOW, handle = ?window.native().handle(), "headless window created");
        self.windows.borrow_mut().push(window.clone());
        Ok(Box::new(window))
    }

    fn create_control(&self, kind: ControlKind, label: &str) -> Result<Box<dyn ControlImpl>> {
        let type_name = match kind {
            ControlKind::Button => "button",
            ControlKind::CheckBox => "check-box",
            ControlKind::Label => "label",
        };
        let control = HeadlessControl {
            state: Rc::new(ControlState {
                native: self.native(type_name),
                signals: Rc::clone(&self.signals),
                kind,
                label: RefCell::new(label.to_string()),
                visible: Cell::new(false),
                enabled: Cell::new(false),
                checked: Cell::new(false),
                frame: Cell::new(Rect::ZERO),
            }),
        };
        self.controls.borrow_mut().push(control.clone());
        Ok(Box::new(control))
    }

    fn create_menu(&self, label: &str) -> Result<Box<dyn MenuImpl>> {
        let menu = HeadlessMenu {
            state: Rc::new(MenuState {
                native: self.native("menu"),
                signals: Rc::clone(&self.signals),
                label: label.to_string(),
                entries: RefCell::new(Vec::new()),
            }),
        };
        self.menus.borrow_mut().push(menu.clone());
        Ok(Box::new(menu))
    }

    fn install_menu_bar(&self, bar: &MenuBar) -> Result<()> {
        let menus: Vec<HeadlessMenu> = bar
            .menus()
            .iter()
            .filter_map(|menu| self.menu(menu.native().handle()))
            .collect();
        tracing::debug!(target: targets::APPLICATION, menus = menus.len(), "headless menu bar installed");
        *self.menu_bar.borrow_mut() = menus;
        Ok(())
    }

    fn alert_presenter(&self) -> Rc<dyn AlertPresenter> {
        Rc::clone(&self.alerts) as Rc<dyn AlertPresenter>
    }
}

impl fmt::Debug for HeadlessBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessBackend")
            .field("windows", &self.windows.borrow().len())
            .field("controls", &self.controls.borrow().len())
            .field("menus", &self.menus.borrow().len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Windows
// ============================================================================

struct WindowState {
    native: NativeWidget,
    signals: Rc<HeadlessSignals>,
    title: RefCell<String>,
    visible: Cell<bool>,
    frame: Cell<Rect>,
    resizable: bool,
    modal: bool,
    raises: Cell<u32>,
    destroyed: Cell<bool>,
}

/// A headless platform window. Clones share state.
#[derive(Clone)]
pub struct HeadlessWindow {
    state: Rc<WindowState>,
}

impl HeadlessWindow {
    /// The title as last set by the portable layer.
    pub fn title(&self) -> String {
        self.state.title.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible.get()
    }

    pub fn frame(&self) -> Rect {
        self.state.frame.get()
    }

    pub fn is_resizable(&self) -> bool {
        self.state.resizable
    }

    pub fn is_modal(&self) -> bool {
        self.state.modal
    }

    /// How often the window was raised.
    pub fn raise_count(&self) -> u32 {
        self.state.raises.get()
    }

    pub fn is_destroyed(&self) -> bool {
        self.state.destroyed.get()
    }

    /// Simulate the close button. Returns whether the window stayed open.
    pub fn request_close(&self) -> bool {
        let kept = self.emit("delete-event", &[]);
        matches!(kept, NativeValue::Bool(true))
    }

    /// Simulate the window gaining focus.
    pub fn focus(&self) {
        self.emit("focus-in", &[]);
    }

    /// Simulate the user moving or resizing the window.
    pub fn configure(&self, frame: Rect) {
        let args = [
            NativeValue::Int(frame.x.into()),
            NativeValue::Int(frame.y.into()),
            NativeValue::Int(frame.width.into()),
            NativeValue::Int(frame.height.into()),
        ];
        self.state.frame.set(frame);
        self.emit("configure", &args);
    }

    fn emit(&self, signal: &str, args: &[NativeValue]) -> NativeValue {
        self.state
            .signals
            .emit(self.state.native.handle(), signal, args)
    }
}

impl WindowImpl for HeadlessWindow {
    fn native(&self) -> &NativeWidget {
        &self.state.native
    }

    fn set_title(&self, title: &str) {
        *self.state.title.borrow_mut() = title.to_string();
    }

    fn set_visible(&self, visible: bool) {
        self.state.visible.set(visible);
    }

    fn set_frame(&self, frame: Rect) {
        self.state.frame.set(frame);
    }

    fn raise(&self) {
        self.state.raises.set(self.state.raises.get() + 1);
    }

    fn destroy(&self) {
        if !self.state.destroyed.replace(true) {
            self.state.visible.set(false);
            self.state.signals.destroy_object(self.state.native.handle());
        }
    }
}

impl fmt::Debug for HeadlessWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessWindow")
            .field("title", &self.state.title.borrow())
            .field("visible", &self.state.visible.get())
            .field("frame", &self.state.frame.get())
            .field("destroyed", &self.state.destroyed.get())
            .finish()
    }
}

// ============================================================================
// Controls
// ============================================================================

struct ControlState {
    native: NativeWidget,
    signals: Rc<HeadlessSignals>,
    kind: ControlKind,
    label: RefCell<String>,
    visible: Cell<bool>,
    enabled: Cell<bool>,
    checked: Cell<bool>,
    frame: Cell<Rect>,
}

/// A headless platform control. Clones share state.
#[derive(Clone)]
pub struct HeadlessControl {
    state: Rc<ControlState>,
}

impl HeadlessControl {
    pub fn label(&self) -> String {
        self.state.label.borrow().clone()
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible.get()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.enabled.get()
    }

    pub fn is_checked(&self) -> bool {
        self.state.checked.get()
    }

    /// The frame relative to the parent view.
    pub fn frame(&self) -> Rect {
        self.state.frame.get()
    }

    /// Simulate a click: emits `clicked()`.
    pub fn click(&self) {
        self.emit("clicked", &[]);
    }

    /// Simulate the user toggling a check box: emits `toggled(bool)`.
    pub fn toggle(&self) {
        let checked = !self.state.checked.get();
        self.state.checked.set(checked);
        self.emit("toggled", &[NativeValue::Bool(checked)]);
    }

    fn emit(&self, signal: &str, args: &[NativeValue]) -> NativeValue {
        self.state
            .signals
            .emit(self.state.native.handle(), signal, args)
    }
}

impl ControlImpl for HeadlessControl {
    fn native(&self) -> &NativeWidget {
        &self.state.native
    }

    fn kind(&self) -> ControlKind {
        self.state.kind
    }

    fn set_visible(&self, visible: bool) {
        self.state.visible.set(visible);
    }

    fn set_enabled(&self, enabled: bool) {
        self.state.enabled.set(enabled);
    }

    fn set_frame(&self, frame: Rect) {
        self.state.frame.set(frame);
    }

    fn set_label(&self, label: &str) {
        *self.state.label.borrow_mut() = label.to_string();
    }

    fn set_checked(&self, checked: bool) {
        self.state.checked.set(checked);
    }
}

impl fmt::Debug for HeadlessControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessControl")
            .field("kind", &self.state.kind)
            .field("label", &self.state.label.borrow())
            .field("visible", &self.state.visible.get())
            .field("enabled", &self.state.enabled.get())
            .finish()
    }
}

// ============================================================================
// Menus
// ============================================================================

/// An entry of a [`HeadlessMenu`].
#[derive(Debug, Clone)]
pub enum HeadlessMenuEntry {
    Item {
        label: String,
        action: String,
        accelerator: Option<Accelerator>,
        native: NativeWidget,
    },
    Separator,
    Submenu {
        label: String,
        native: NativeWidget,
    },
}

struct MenuState {
    native: NativeWidget,
    signals: Rc<HeadlessSignals>,
    label: String,
    entries: RefCell<Vec<HeadlessMenuEntry>>,
}

/// A headless platform menu. Clones share state.
#[derive(Clone)]
pub struct HeadlessMenu {
    state: Rc<MenuState>,
}

impl HeadlessMenu {
    pub fn label(&self) -> &str {
        &self.state.label
    }

    pub fn entries(&self) -> Vec<HeadlessMenuEntry> {
        self.state.entries.borrow().clone()
    }

    /// Simulate picking the item labelled `label`. Returns whether the
    /// item exists.
    pub fn activate(&self, label: &str) -> bool {
        let native = self.state.entries.borrow().iter().find_map(|entry| match entry {
            HeadlessMenuEntry::Item {
                label: item_label,
                native,
                ..
            } if item_label == label => Some(native.clone()),
            _ => None,
        });
        match native {
            Some(native) => {
                self.state.signals.emit(native.handle(), "activate", &[]);
                true
            }
            None => false,
        }
    }
}

impl MenuImpl for HeadlessMenu {
    fn native(&self) -> &NativeWidget {
        &self.state.native
    }

    fn append_item(&self, item: &MenuItem) -> Result<NativeWidget> {
        let handle = self.state.signals.create_object("menu-item");
        let source: SharedSignalSource = Rc::clone(&self.state.signals) as SharedSignalSource;
        let native = NativeWidget::new(handle, source);
        self.state.entries.borrow_mut().push(HeadlessMenuEntry::Item {
            label: item.label.clone(),
            action: item.action.clone(),
            accelerator: item.accelerator,
            native: native.clone(),
        });
        Ok(native)
    }

    fn append_separator(&self) {
        self.state
            .entries
            .borrow_mut()
            .push(HeadlessMenuEntry::Separator);
    }

    fn append_submenu(&self, label: &str, submenu: &dyn MenuImpl) {
        self.state.entries.borrow_mut().push(HeadlessMenuEntry::Submenu {
            label: label.to_string(),
            native: submenu.native().clone(),
        });
    }
}

impl fmt::Debug for HeadlessMenu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessMenu")
            .field("label", &self.state.label)
            .field("entries", &self.state.entries.borrow().len())
            .finish()
    }
}

// ============================================================================
// Alerts
// ============================================================================

/// Records alerts and answers them from a script or by hand.
///
/// With a scripted response queued, an alert is answered before
/// [`present`](AlertPresenter::present) returns. Otherwise it waits for
/// [`respond`](Self::respond).
#[derive(Default)]
pub struct HeadlessAlerts {
    scripted: RefCell<VecDeque<AlertResponse>>,
    pending: RefCell<VecDeque<AlertCallback>>,
    shown: RefCell<Vec<Alert>>,
}

impl HeadlessAlerts {
    /// Answer the next alert with `response` as soon as it is shown.
    pub fn script(&self, response: AlertResponse) {
        self.scripted.borrow_mut().push_back(response);
    }

    /// Every alert shown so far.
    pub fn shown(&self) -> Vec<Alert> {
        self.shown.borrow().clone()
    }

    pub fn last(&self) -> Option<Alert> {
        self.shown.borrow().last().cloned()
    }

    /// Alerts waiting for an answer.
    pub fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Answer the oldest waiting alert. Returns `false` if none is waiting.
    pub fn respond(&self, response: AlertResponse) -> bool {
        let Some(respond) = self.pending.borrow_mut().pop_front() else {
            return false;
        };
        respond(response);
        true
    }
}

impl AlertPresenter for HeadlessAlerts {
    fn present(&self, alert: Alert, respond: AlertCallback) {
        tracing::debug!(target: targets::APPLICATION, kind = ?alert.kind, message = %alert.message, "headless alert");
        self.shown.borrow_mut().push(alert);
        let scripted = self.scripted.borrow_mut().pop_front();
        match scripted {
            Some(response) => respond(response),
            None => self.pending.borrow_mut().push_back(respond),
        }
    }
}

impl fmt::Debug for HeadlessAlerts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeadlessAlerts")
            .field("shown", &self.shown.borrow().len())
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::alert::AlertKind;

    fn alert(message: &str) -> Alert {
        Alert {
            kind: AlertKind::Info,
            message: message.to_string(),
            primary: "OK".to_string(),
            secondary: None,
            cancel: None,
        }
    }

    #[test]
    fn test_scripted_alert_answers_immediately() {
        let alerts = HeadlessAlerts::default();
        alerts.script(AlertResponse::Secondary);
        let answer = Rc::new(Cell::new(None));
        let sink = Rc::clone(&answer);
        alerts.present(alert("one"), Box::new(move |r| sink.set(Some(r))));
        assert_eq!(answer.get(), Some(AlertResponse::Secondary));
        assert_eq!(alerts.pending_count(), 0);
    }

    #[test]
    fn test_unscripted_alert_waits() {
        let alerts = HeadlessAlerts::default();
        let answer = Rc::new(Cell::new(None));
        let sink = Rc::clone(&answer);
        alerts.present(alert("two"), Box::new(move |r| sink.set(Some(r))));
        assert_eq!(answer.get(), None);
        assert!(alerts.respond(AlertResponse::Cancel));
        assert_eq!(answer.get(), Some(AlertResponse::Cancel));
        assert!(!alerts.respond(AlertResponse::Cancel));
        assert_eq!(alerts.last().map(|a| a.message), Some("two".to_string()));
    }

    #[test]
    fn test_destroyed_window_releases_native_object() {
        let backend = HeadlessBackend::new();
        let imp = backend.create_window(&WindowConfig::new("w")).unwrap();
        let handle = imp.native().handle();
        assert!(backend.headless_signals().contains(handle));
        imp.destroy();
        imp.destroy();
        assert!(!backend.headless_signals().contains(handle));
        assert!(backend.window(handle).unwrap().is_destroyed());
    }

    #[test]
    fn test_menu_items_get_native_objects() {
        let backend = HeadlessBackend::new();
        let imp = backend.create_menu("File").unwrap();
        let native = imp.append_item(&MenuItem::new("Quit", "app.quit")).unwrap();
        imp.append_separator();
        let menu = backend.menu(imp.native().handle()).unwrap();
        assert_eq!(menu.entries().len(), 2);
        assert_eq!(backend.headless_signals().type_name(native.handle()).as_deref(), Some("menu-item"));
        assert!(!menu.activate("Open"));
    }
}
