//! View tree composition.
//!
//! Every window owns a [`ViewTree`]. Views have a frame (relative to the
//! parent), margins, and bounds derived from the two:
//!
//! ```text
//! frame.width  = bounds.width  + margins.left + margins.right
//! frame.height = bounds.height + margins.top  + margins.bottom
//! ```
//!
//! Resizing a view's frame grows its children along every edge they are
//! bound to ([`BindFlags`]). The pass runs once, parent to child.
//!
//! # Tri-state attributes
//!
//! Visibility, enablement and activation are each a [`TriState`]. An
//! explicit `show` on a view whose parent is hidden leaves it `Latent`; it
//! becomes `On` when the parent is shown. Hiding a parent turns `On`
//! children `Latent` rather than `Off`, so showing the parent again restores
//! them; children hidden explicitly stay `Off` and are never restored by an
//! ancestor.
//!
//! ```
//! use mgui::view::{TriState, Attribute, ViewTree};
//! use mgui_core::Rect;
//!
//! let mut tree = ViewTree::new(Rect::new(0, 0, 300, 200));
//! let root = tree.root();
//! let button = tree.add_child(root, Rect::new(10, 10, 80, 24)).unwrap();
//!
//! tree.show(button).unwrap();
//! assert_eq!(tree.state(button, Attribute::Visible), Ok(TriState::Latent));
//!
//! tree.super_show(root).unwrap(); // the window was shown
//! assert_eq!(tree.is_visible(button), Ok(true));
//! ```

mod hooks;
mod tree;
mod tristate;

pub use hooks::ViewHooks;
pub use tree::{BindFlags, Margins, ViewId, ViewResult, ViewTree};
pub use tristate::{Attribute, TriState};
