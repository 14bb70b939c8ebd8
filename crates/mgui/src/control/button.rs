//! Push button.

use std::cell::OnceCell;
use std::fmt;
use std::rc::{Rc, Weak};

use mgui_core::{EventOut, Rect};

use super::{Control, ControlKind};
use crate::command::Command;
use crate::error::Result;
use crate::keys::Accelerator;
use crate::native::Slot;
use crate::view::ViewId;
use crate::window::Window;

/// A push button. Emits [`clicked`](Self::clicked) when pressed.
pub struct Button {
    control: Rc<Control>,
    clicked: EventOut<()>,
    clicked_slot: Slot<Button>,
    press: OnceCell<Command<Button>>,
    this: Weak<Button>,
}

impl Button {
    pub fn new(window: &Window, parent: ViewId, label: &str, frame: Rect) -> Result<Rc<Self>> {
        let control = Control::create(window, parent, ControlKind::Button, label, frame)?;
        let button = Rc::new_cyclic(|weak: &Weak<Button>| Button {
            control,
            clicked: EventOut::new(),
            clicked_slot: Slot::new(weak.clone(), Button::on_clicked),
            press: OnceCell::new(),
            this: weak.clone(),
        });
        button.control.native().connect(&button.clicked_slot, "clicked")?;
        Ok(button)
    }

    pub fn control(&self) -> &Rc<Control> {
        &self.control
    }

    pub fn clicked(&self) -> &EventOut<()> {
        &self.clicked
    }

    /// Press the button from code.
    pub fn click(&self) {
        self.clicked.emit(());
    }

    /// Press the button with `accelerator` while it is visible and enabled.
    ///
    /// Registers the control-scoped `press` command. Only the first call
    /// has an effect.
    pub fn set_accelerator(&self, accelerator: Accelerator) -> Result<()> {
        if self.press.get().is_some() {
            return Ok(());
        }
        let command = Command::new(self.this.clone(), "press", Button::press_command)
            .with_accelerator(accelerator);
        command.register(self.control.actions())?;
        let _ = self.press.set(command);
        Ok(())
    }

    fn on_clicked(&self, _: ()) {
        self.click();
    }

    fn press_command(&self, _: ()) {
        self.click();
    }
}

impl fmt::Debug for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Button")
            .field("control", &self.control)
            .field("routes", &self.clicked.route_count())
            .finish()
    }
}
