//! Platform backends.
//!
//! A [`Backend`] is the factory for every platform object the portable
//! layer needs. It is chosen once, when the
//! [`Application`](crate::application::Application) is created.
//!
//! The crate ships [`HeadlessBackend`], which keeps every platform object in
//! memory and lets tests drive native signals by hand.

mod headless;

use std::rc::Rc;

pub use headless::{
    HeadlessAlerts, HeadlessBackend, HeadlessControl, HeadlessMenu, HeadlessMenuEntry,
    HeadlessWindow,
};

use crate::alert::AlertPresenter;
use crate::control::{ControlImpl, ControlKind};
use crate::error::Result;
use crate::menu::{MenuBar, MenuImpl};
use crate::native::SharedSignalSource;
use crate::window::{WindowConfig, WindowImpl};

/// Creates platform objects.
pub trait Backend {
    /// Short name for log output.
    fn name(&self) -> &str;

    /// The signal source serving every native object of this backend.
    fn signals(&self) -> SharedSignalSource;

    /// Create a platform window. The config's frame is already resolved.
    fn create_window(&self, config: &WindowConfig) -> Result<Box<dyn WindowImpl>>;

    /// Create a platform control.
    fn create_control(&self, kind: ControlKind, label: &str) -> Result<Box<dyn ControlImpl>>;

    /// Create an empty platform menu.
    fn create_menu(&self, label: &str) -> Result<Box<dyn MenuImpl>>;

    /// Make `bar` the application's menu bar.
    fn install_menu_bar(&self, bar: &MenuBar) -> Result<()>;

    /// The presenter used for alerts and error display.
    fn alert_presenter(&self) -> Rc<dyn AlertPresenter>;
}

/// Shared handle to the application's backend.
pub type SharedBackend = Rc<dyn Backend>;
