//! Top-level windows.

use std::cell::{Cell, Ref, RefCell, RefMut};
use std::fmt;
use std::num::TryFromIntError;
use std::rc::{Rc, Weak};

use mgui_core::logging::targets;
use mgui_core::{EventOut, Rect, RegistryEntry, ThreadAffinity};

use super::config::WindowConfig;
use super::platform::{WindowDelegate, WindowImpl};
use crate::application::Application;
use crate::backend::SharedBackend;
use crate::command::{ActionGroup, Command};
use crate::control::Control;
use crate::document::Document;
use crate::error::Result;
use crate::keys::{Key, KeyCombination};
use crate::native::{NativeWidget, Slot};
use crate::view::{ViewId, ViewTree};

/// A top-level window: the root of a view tree.
///
/// Windows are registered in the application's window list, most recently
/// selected first. The front window's commands and accelerators are the
/// ones that respond to key presses, and its root view is the active one.
///
/// The caller owns the window. Dropping it destroys the platform window
/// without running the close protocol; call [`close`](Self::close) for an
/// orderly close.
pub struct Window {
    app: Weak<Application>,
    backend: SharedBackend,
    imp: Box<dyn WindowImpl>,
    views: RefCell<ViewTree>,
    actions: ActionGroup,
    controls: RefCell<Vec<Weak<Control>>>,
    title: RefCell<String>,
    modified: Cell<bool>,
    frame: Cell<Rect>,
    closed: Cell<bool>,
    entry: RefCell<Option<RegistryEntry<Window>>>,
    document: RefCell<Weak<Document>>,
    delegate: RefCell<Option<Weak<dyn WindowDelegate>>>,
    close_command: Command<Window, (), bool>,
    delete_slot: Slot<Window, (), bool>,
    focus_slot: Slot<Window>,
    configure_slot: Slot<Window, (i64, i64, i64, i64), std::result::Result<(), TryFromIntError>>,
    closed_event: EventOut<()>,
    activated: EventOut<bool>,
    affinity: ThreadAffinity,
}

impl Window {
    /// Create a window, register it as the front window and, if the config
    /// asks for it, show it.
    #[tracing::instrument(skip_all, target = "mgui::window", level = "debug")]
    pub fn new(app: &Rc<Application>, config: WindowConfig) -> Result<Rc<Self>> {
        let config = config.resolved(app.config().default_window.into());
        let frame = config.frame().unwrap_or(Rect::ZERO);
        let backend = Rc::clone(app.backend());
        let imp = backend.create_window(&config)?;

        let window = Rc::new_cyclic(|weak: &Weak<Window>| Window {
            app: Rc::downgrade(app),
            backend,
            imp,
            views: RefCell::new(ViewTree::new(Rect::new(0, 0, frame.width, frame.height))),
            actions: ActionGroup::new("win"),
            controls: RefCell::new(Vec::new()),
            title: RefCell::new(config.title().to_string()),
            modified: Cell::new(false),
            frame: Cell::new(frame),
            closed: Cell::new(false),
            entry: RefCell::new(None),
            document: RefCell::new(Weak::new()),
            delegate: RefCell::new(None),
            close_command: Command::new(weak.clone(), "close", Window::close_command)
                .with_accelerator(KeyCombination::ctrl(Key::W)),
            delete_slot: Slot::new(weak.clone(), Window::on_delete),
            focus_slot: Slot::new(weak.clone(), Window::on_focus),
            configure_slot: Slot::new(weak.clone(), Window::on_configure),
            closed_event: EventOut::new(),
            activated: EventOut::new(),
            affinity: ThreadAffinity::current(),
        });

        window.close_command.register(&window.actions)?;
        let native = window.imp.native();
        native.connect(&window.delete_slot, "delete-event")?;
        native.connect(&window.focus_slot, "focus-in")?;
        native.connect(&window.configure_slot, "configure")?;
        window.imp.set_title(config.title());

        let previous = app.front_window();
        *window.entry.borrow_mut() = Some(app.windows().register(&window));
        window.became_front(previous);
        tracing::debug!(target: targets::WINDOW, title = config.title(), %frame, "window created");

        if config.is_visible() {
            window.show();
        }
        Ok(window)
    }

    /// The application, while it exists.
    pub fn application(&self) -> Option<Rc<Application>> {
        self.app.upgrade()
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub fn native(&self) -> &NativeWidget {
        self.imp.native()
    }

    /// The window's commands (`win.*`).
    pub fn actions(&self) -> &ActionGroup {
        &self.actions
    }

    // =========================================================================
    // View tree
    // =========================================================================

    /// The view tree. Do not hold the borrow across calls that may change
    /// the window.
    pub fn views(&self) -> Ref<'_, ViewTree> {
        self.views.borrow()
    }

    pub fn views_mut(&self) -> RefMut<'_, ViewTree> {
        self.affinity.debug_assert_same_thread("Window");
        self.views.borrow_mut()
    }

    pub fn root_view(&self) -> ViewId {
        self.views.borrow().root()
    }

    pub(crate) fn adopt_control(&self, control: &Rc<Control>) {
        let mut controls = self.controls.borrow_mut();
        controls.retain(|c| c.strong_count() > 0);
        controls.push(Rc::downgrade(control));
    }

    // =========================================================================
    // Title
    // =========================================================================

    pub fn title(&self) -> String {
        self.title.borrow().clone()
    }

    pub fn set_title(&self, title: impl Into<String>) {
        *self.title.borrow_mut() = title.into();
        self.imp.set_title(&self.displayed_title());
    }

    pub fn is_modified(&self) -> bool {
        self.modified.get()
    }

    /// Mark the window's content as modified. The mark shows in the title.
    pub fn set_modified(&self, modified: bool) {
        if self.modified.replace(modified) != modified {
            self.imp.set_title(&self.displayed_title());
        }
    }

    /// The title as shown by the platform: the title, followed by `*` when
    /// modified.
    pub fn displayed_title(&self) -> String {
        let title = self.title.borrow();
        if self.modified.get() {
            format!("{title}*")
        } else {
            title.clone()
        }
    }

    // =========================================================================
    // Geometry and visibility
    // =========================================================================

    /// The window's screen frame.
    pub fn frame(&self) -> Rect {
        self.frame.get()
    }

    /// Move or resize the window. The root view follows the new size.
    pub fn set_frame(&self, frame: Rect) -> Result<()> {
        self.imp.set_frame(frame);
        self.frame_changed(frame)
    }

    fn frame_changed(&self, frame: Rect) -> Result<()> {
        self.frame.set(frame);
        let mut views = self.views.borrow_mut();
        let root = views.root();
        views.set_frame(root, Rect::new(0, 0, frame.width, frame.height))?;
        Ok(())
    }

    pub fn show(&self) {
        self.imp.set_visible(true);
        let mut views = self.views.borrow_mut();
        let root = views.root();
        // The root exists for the tree's whole life.
        let _ = views.super_show(root);
    }

    pub fn hide(&self) {
        let mut views = self.views.borrow_mut();
        let root = views.root();
        let _ = views.super_hide(root);
        drop(views);
        self.imp.set_visible(false);
    }

    pub fn is_visible(&self) -> bool {
        let views = self.views.borrow();
        views.is_visible(views.root()).unwrap_or(false)
    }

    // =========================================================================
    // Window list
    // =========================================================================

    /// Make this the front window.
    pub fn select(&self) {
        if self.closed.get() || self.is_front() {
            return;
        }
        let Some(app) = self.application() else {
            return;
        };
        let previous = app.front_window();
        if let Some(entry) = self.entry.borrow().as_ref() {
            app.windows().promote(entry);
        }
        self.imp.raise();
        self.became_front(previous);
        tracing::debug!(target: targets::WINDOW, title = %self.title.borrow(), "window selected");
    }

    /// Whether this is the first window in the window list.
    pub fn is_front(&self) -> bool {
        self.application()
            .and_then(|app| app.front_window())
            .is_some_and(|front| std::ptr::eq(Rc::as_ptr(&front), self))
    }

    fn became_front(&self, previous: Option<Rc<Window>>) {
        if let Some(previous) = previous
            && !std::ptr::eq(Rc::as_ptr(&previous), self)
        {
            previous.set_active(false);
        }
        self.set_active(true);
    }

    fn set_active(&self, active: bool) {
        {
            let mut views = self.views.borrow_mut();
            let root = views.root();
            let _ = if active {
                views.activate(root)
            } else {
                views.deactivate(root)
            };
        }
        self.activated.emit(active);
    }

    /// Whether the window's root view is active.
    pub fn is_active(&self) -> bool {
        let views = self.views.borrow();
        views.is_active(views.root()).unwrap_or(false)
    }

    // =========================================================================
    // Closing
    // =========================================================================

    /// Install the delegate consulted before closing.
    pub fn set_delegate(&self, delegate: Option<Weak<dyn WindowDelegate>>) {
        *self.delegate.borrow_mut() = delegate;
    }

    fn delegate(&self) -> Option<Rc<dyn WindowDelegate>> {
        self.delegate.borrow().as_ref().and_then(Weak::upgrade)
    }

    /// Close the window unless the delegate objects.
    ///
    /// A closed window is hidden, its platform window destroyed, and it
    /// leaves the window list. Returns whether the window closed.
    pub fn close(&self) -> bool {
        if self.closed.get() {
            return false;
        }
        if let Some(delegate) = self.delegate()
            && !delegate.should_close(self)
        {
            tracing::debug!(target: targets::WINDOW, title = %self.title.borrow(), "close refused");
            return false;
        }
        self.close_now();
        true
    }

    fn close_now(&self) {
        self.closed.set(true);
        let was_front = self.is_front();
        self.hide();
        self.set_active(false);
        if let Some(mut entry) = self.entry.borrow_mut().take() {
            entry.unregister();
        }
        self.imp.destroy();
        tracing::debug!(target: targets::WINDOW, title = %self.title.borrow(), "window closed");

        if was_front
            && let Some(front) = self.application().and_then(|app| app.front_window())
        {
            front.set_active(true);
        }
        if let Some(delegate) = self.delegate() {
            delegate.window_closed(self);
        }
        self.closed_event.emit(());
    }

    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    /// Emitted once the window has closed.
    pub fn closed(&self) -> &EventOut<()> {
        &self.closed_event
    }

    /// Emitted with `true` when the window becomes the front window and
    /// `false` when it stops being it.
    pub fn activated(&self) -> &EventOut<bool> {
        &self.activated
    }

    // =========================================================================
    // Documents
    // =========================================================================

    /// The document shown in this window.
    pub fn document(&self) -> Option<Rc<Document>> {
        self.document.borrow().upgrade()
    }

    pub fn set_document(&self, document: Option<&Rc<Document>>) {
        *self.document.borrow_mut() = document.map_or_else(Weak::new, Rc::downgrade);
    }

    /// Whether this window shows `document`.
    pub fn shows_document(&self, document: &Document) -> bool {
        std::ptr::eq(self.document.borrow().as_ptr(), document)
    }

    // =========================================================================
    // Accelerators
    // =========================================================================

    /// Fire the window command bound to `combo`, or else the command of a
    /// visible, enabled control.
    pub fn dispatch_accelerator(&self, combo: &KeyCombination) -> bool {
        if self.actions.dispatch_accelerator(combo) {
            return true;
        }
        let controls: Vec<Rc<Control>> = self
            .controls
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        for control in controls {
            let live = {
                let views = self.views.borrow();
                views.is_visible(control.view()).unwrap_or(false)
                    && views.is_enabled(control.view()).unwrap_or(false)
            };
            if live && control.actions().dispatch_accelerator(combo) {
                return true;
            }
        }
        false
    }

    // =========================================================================
    // Handlers
    // =========================================================================

    fn close_command(&self, _: ()) -> bool {
        self.close()
    }

    /// `true` keeps the native window open.
    fn on_delete(&self, _: ()) -> bool {
        !self.close()
    }

    fn on_focus(&self, _: ()) {
        self.select();
    }

    fn on_configure(
        &self,
        (x, y, width, height): (i64, i64, i64, i64),
    ) -> std::result::Result<(), TryFromIntError> {
        let frame = Rect::new(x.try_into()?, y.try_into()?, width.try_into()?, height.try_into()?);
        if let Err(err) = self.frame_changed(frame) {
            tracing::warn!(target: targets::WINDOW, %err, "native configure ignored");
        }
        Ok(())
    }
}

impl Drop for Window {
    fn drop(&mut self) {
        if !self.closed.get() {
            self.imp.destroy();
        }
    }
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("title", &self.title.borrow())
            .field("modified", &self.modified.get())
            .field("frame", &self.frame.get())
            .field("closed", &self.closed.get())
            .finish_non_exhaustive()
    }
}
