//! Contracts between a window and its platform and owner.

use mgui_core::Rect;

use super::Window;
use crate::native::NativeWidget;

/// The platform side of a [`Window`].
///
/// The native object behind [`native`](Self::native) emits:
///
/// | signal         | arguments                           | return |
/// |----------------|-------------------------------------|--------|
/// | `delete-event` | none                                | `true` keeps the window open |
/// | `focus-in`     | none                                | none |
/// | `configure`    | `x`, `y`, `width`, `height` (int)   | none |
pub trait WindowImpl {
    fn native(&self) -> &NativeWidget;
    fn set_title(&self, title: &str);
    fn set_visible(&self, visible: bool);
    fn set_frame(&self, frame: Rect);
    /// Bring the window to the front of the window stack.
    fn raise(&self);
    /// Destroy the native window. Called once, when the window closes.
    fn destroy(&self);
}

/// Optional owner callbacks for a [`Window`].
pub trait WindowDelegate {
    /// Asked before the window closes. Returning `false` keeps it open.
    fn should_close(&self, _window: &Window) -> bool {
        true
    }

    /// The window has closed.
    fn window_closed(&self, _window: &Window) {}
}
