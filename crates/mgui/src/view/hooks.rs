//! Per-view callbacks run by the tree.

use mgui_core::Rect;

use super::ViewId;

/// Callbacks a view owner (normally a control) receives when the tree
/// changes the view's effective state or geometry.
///
/// Hooks run synchronously while the tree is being updated and must not
/// call back into the same tree.
pub trait ViewHooks {
    fn show_self(&self, _view: ViewId) {}
    fn hide_self(&self, _view: ViewId) {}
    fn enable_self(&self, _view: ViewId) {}
    fn disable_self(&self, _view: ViewId) {}
    fn activate_self(&self, _view: ViewId) {}
    fn deactivate_self(&self, _view: ViewId) {}

    /// The frame origin changed. `frame` is the new frame.
    fn frame_moved(&self, _view: ViewId, _frame: Rect) {}

    /// The frame size changed. `frame` is the new frame.
    fn frame_resized(&self, _view: ViewId, _frame: Rect) {}
}
