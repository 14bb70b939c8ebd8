//! Check box.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use mgui_core::{EventOut, Rect};

use super::{Control, ControlKind};
use crate::error::Result;
use crate::native::Slot;
use crate::view::ViewId;
use crate::window::Window;

/// A check box. Emits [`toggled`](Self::toggled) with the new state when
/// the user changes it.
pub struct CheckBox {
    control: Rc<Control>,
    checked: Cell<bool>,
    toggled: EventOut<bool>,
    toggled_slot: Slot<CheckBox, (bool,)>,
}

impl CheckBox {
    pub fn new(window: &Window, parent: ViewId, label: &str, frame: Rect) -> Result<Rc<Self>> {
        let control = Control::create(window, parent, ControlKind::CheckBox, label, frame)?;
        let check_box = Rc::new_cyclic(|weak: &Weak<CheckBox>| CheckBox {
            control,
            checked: Cell::new(false),
            toggled: EventOut::new(),
            toggled_slot: Slot::new(weak.clone(), CheckBox::on_toggled),
        });
        check_box
            .control
            .native()
            .connect(&check_box.toggled_slot, "toggled")?;
        Ok(check_box)
    }

    pub fn control(&self) -> &Rc<Control> {
        &self.control
    }

    pub fn toggled(&self) -> &EventOut<bool> {
        &self.toggled
    }

    pub fn is_checked(&self) -> bool {
        self.checked.get()
    }

    /// Set the state from code. Does not emit `toggled`.
    pub fn set_checked(&self, checked: bool) {
        self.checked.set(checked);
        self.control.imp().set_checked(checked);
    }

    fn on_toggled(&self, (checked,): (bool,)) {
        if self.checked.replace(checked) != checked {
            self.toggled.emit(checked);
        }
    }
}

impl fmt::Debug for CheckBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckBox")
            .field("control", &self.control)
            .field("checked", &self.checked.get())
            .finish()
    }
}
