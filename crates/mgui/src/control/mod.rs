//! Controls: views backed by a native widget.
//!
//! A [`Control`] owns its platform [`ControlImpl`] and sits in a window's
//! view tree as the hooks of one view. When the tree shows, hides, enables,
//! disables or moves the view, the control forwards the change to the
//! platform. The tree keeps the control alive for as long as its view
//! exists.
//!
//! Concrete controls ([`Button`], [`CheckBox`]) wrap a `Control`, connect
//! [`Slot`](crate::native::Slot)s to the native signals and re-emit them as
//! [`EventOut`](mgui_core::EventOut)s.

mod button;
mod check_box;

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use mgui_core::Rect;
use mgui_core::logging::targets;

pub use button::Button;
pub use check_box::CheckBox;

use crate::command::ActionGroup;
use crate::error::Result;
use crate::native::NativeWidget;
use crate::view::{ViewHooks, ViewId, ViewTree};
use crate::window::Window;

/// The kinds of control a backend can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    /// Push button. Native signal: `clicked()`.
    Button,
    /// Check box. Native signal: `toggled(bool)`.
    CheckBox,
    /// Static text.
    Label,
}

/// The platform side of a control.
pub trait ControlImpl {
    fn native(&self) -> &NativeWidget;
    fn kind(&self) -> ControlKind;
    fn set_visible(&self, visible: bool);
    fn set_enabled(&self, enabled: bool);
    /// `frame` is relative to the parent view.
    fn set_frame(&self, frame: Rect);
    fn set_label(&self, label: &str);

    /// Set the check mark. Only meaningful for check boxes.
    fn set_checked(&self, _checked: bool) {}
}

/// A platform widget wired into a view tree.
pub struct Control {
    view: ViewId,
    imp: Box<dyn ControlImpl>,
    actions: ActionGroup,
    label: RefCell<String>,
}

impl Control {
    /// Create a platform control and add it under `parent` in `window`.
    pub fn create(
        window: &Window,
        parent: ViewId,
        kind: ControlKind,
        label: &str,
        frame: Rect,
    ) -> Result<Rc<Self>> {
        let imp = window.backend().create_control(kind, label)?;
        let view = window.views_mut().add_child(parent, frame)?;
        let control = Rc::new(Control {
            view,
            imp,
            actions: ActionGroup::new("ctl"),
            label: RefCell::new(label.to_string()),
        });
        {
            let mut views = window.views_mut();
            views.set_hooks(view, Some(Rc::clone(&control) as Rc<dyn ViewHooks>))?;
            control.sync(&views)?;
        }
        window.adopt_control(&control);
        tracing::debug!(target: targets::VIEW, ?kind, ?view, label, "control created");
        Ok(control)
    }

    /// Push the view's current state to the platform.
    fn sync(&self, views: &ViewTree) -> Result<()> {
        self.imp.set_frame(views.frame(self.view)?);
        self.imp.set_visible(views.is_visible(self.view)?);
        self.imp.set_enabled(views.is_enabled(self.view)?);
        Ok(())
    }

    /// The control's view in the window's tree.
    pub fn view(&self) -> ViewId {
        self.view
    }

    pub fn kind(&self) -> ControlKind {
        self.imp.kind()
    }

    pub fn native(&self) -> &NativeWidget {
        self.imp.native()
    }

    pub(crate) fn imp(&self) -> &dyn ControlImpl {
        self.imp.as_ref()
    }

    /// Control-scoped commands. They respond to accelerators while the
    /// control is visible and enabled in the front window.
    pub fn actions(&self) -> &ActionGroup {
        &self.actions
    }

    pub fn label(&self) -> String {
        self.label.borrow().clone()
    }

    pub fn set_label(&self, label: impl Into<String>) {
        let label = label.into();
        self.imp.set_label(&label);
        *self.label.borrow_mut() = label;
    }
}

impl ViewHooks for Control {
    fn show_self(&self, _view: ViewId) {
        self.imp.set_visible(true);
    }

    fn hide_self(&self, _view: ViewId) {
        self.imp.set_visible(false);
    }

    fn enable_self(&self, _view: ViewId) {
        self.imp.set_enabled(true);
    }

    fn disable_self(&self, _view: ViewId) {
        self.imp.set_enabled(false);
    }

    fn frame_moved(&self, _view: ViewId, frame: Rect) {
        self.imp.set_frame(frame);
    }

    fn frame_resized(&self, _view: ViewId, frame: Rect) {
        self.imp.set_frame(frame);
    }
}

impl fmt::Debug for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Control")
            .field("kind", &self.imp.kind())
            .field("view", &self.view)
            .field("label", &self.label.borrow())
            .finish()
    }
}
