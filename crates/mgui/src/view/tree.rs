//! Arena-backed view tree.
//!
//! Views live in a [`SlotMap`] owned by the tree and refer to each other by
//! [`ViewId`]. Removing a view removes its whole subtree.
//!
//! An ancestor switching off turns an `On` view `Latent`, not `Off`: only an
//! explicit switch-off on the view itself leaves it `Off`.

use std::fmt;
use std::fmt::Write as _;
use std::ops::BitOr;
use std::rc::Rc;

use mgui_core::logging::targets;
use mgui_core::Rect;
use slotmap::{new_key_type, SlotMap};

use super::hooks::ViewHooks;
use super::tristate::{Attribute, TriState};
use crate::error::ViewError;

new_key_type! {
    /// Identifies a view within its [`ViewTree`].
    pub struct ViewId;
}

/// Result type for view tree operations.
pub type ViewResult<T> = std::result::Result<T, ViewError>;

// ============================================================================
// Margins and bind flags
// ============================================================================

/// Space between a view's frame and its bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Margins {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Margins {
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub const fn uniform(value: i32) -> Self {
        Self::new(value, value, value, value)
    }

    /// `left + right`.
    pub const fn horizontal(&self) -> i32 {
        self.left + self.right
    }

    /// `top + bottom`.
    pub const fn vertical(&self) -> i32 {
        self.top + self.bottom
    }
}

/// Which parent edges a view is bound to.
///
/// A bound edge follows the matching parent edge; an unbound edge stays
/// fixed. Resizing keeps the parent's origin, so a view bound to the right
/// (or bottom) edge grows with the parent and its left (or top) edge stays
/// where it is. Resizing never moves a leading edge, so `LEFT` and `TOP`
/// leave the view as it was.
#[derive(Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct BindFlags(u8);

impl BindFlags {
    pub const NONE: Self = Self(0);
    pub const LEFT: Self = Self(1 << 0);
    pub const TOP: Self = Self(1 << 1);
    pub const RIGHT: Self = Self(1 << 2);
    pub const BOTTOM: Self = Self(1 << 3);
    pub const ALL: Self = Self(0b1111);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for BindFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Debug for BindFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let names = [
            (Self::LEFT, "LEFT"),
            (Self::TOP, "TOP"),
            (Self::RIGHT, "RIGHT"),
            (Self::BOTTOM, "BOTTOM"),
        ];
        let mut first = true;
        for (flag, name) in names {
            if self.contains(flag) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        Ok(())
    }
}

/// New length along one axis after the parent grew by `delta`.
///
/// Resizing keeps the parent's origin, so only its trailing edge (right or
/// bottom) moves. A child bound to that edge follows it and grows; its
/// leading edge stays where it is either way.
fn follow_trailing_edge(len: i32, trailing: bool, delta: i32) -> i32 {
    if trailing { len + delta } else { len }
}

// ============================================================================
// Nodes
// ============================================================================

struct ViewNode {
    name: Option<String>,
    parent: Option<ViewId>,
    children: Vec<ViewId>,
    frame: Rect,
    margins: Margins,
    bind: BindFlags,
    states: [TriState; 3],
    hooks: Option<Rc<dyn ViewHooks>>,
}

impl ViewNode {
    fn new(parent: Option<ViewId>, frame: Rect, hooks: Option<Rc<dyn ViewHooks>>) -> Self {
        Self {
            name: None,
            parent,
            children: Vec::new(),
            frame,
            margins: Margins::ZERO,
            bind: BindFlags::NONE,
            states: Attribute::ALL.map(Attribute::initial_state),
            hooks,
        }
    }

    fn state(&self, attr: Attribute) -> TriState {
        self.states[attr as usize]
    }

    fn set_state(&mut self, attr: Attribute, state: TriState) {
        self.states[attr as usize] = state;
    }

    fn bounds(&self) -> Rect {
        let m = self.margins;
        Rect::new(
            self.frame.x + m.left,
            self.frame.y + m.top,
            self.frame.width - m.horizontal(),
            self.frame.height - m.vertical(),
        )
    }
}

// ============================================================================
// Tree
// ============================================================================

/// A tree of views rooted at a single root view.
///
/// Frames are relative to the parent. Each view carries three
/// [`TriState`] attributes (visible, enabled, active) that propagate from
/// parent to children.
pub struct ViewTree {
    nodes: SlotMap<ViewId, ViewNode>,
    root: ViewId,
}

impl ViewTree {
    /// Create a tree whose root view has `frame`.
    pub fn new(frame: Rect) -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(ViewNode::new(None, frame, None));
        Self { nodes, root }
    }

    /// The root view.
    pub fn root(&self) -> ViewId {
        self.root
    }

    /// Number of views, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: a tree has at least its root.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ViewId) -> bool {
        self.nodes.contains_key(id)
    }

    fn node(&self, id: ViewId) -> ViewResult<&ViewNode> {
        self.nodes.get(id).ok_or(ViewError::InvalidView)
    }

    fn node_mut(&mut self, id: ViewId) -> ViewResult<&mut ViewNode> {
        self.nodes.get_mut(id).ok_or(ViewError::InvalidView)
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Add a view under `parent`.
    pub fn add_child(&mut self, parent: ViewId, frame: Rect) -> ViewResult<ViewId> {
        self.add_child_with(parent, frame, None)
    }

    /// Add a view under `parent` with hooks installed from the start.
    ///
    /// The new view's attributes are reconciled with the parent's: an
    /// attribute that starts on under a parent where it is not becomes
    /// latent, and a latent one under a parent where it is on switches on.
    pub fn add_child_with(
        &mut self,
        parent: ViewId,
        frame: Rect,
        hooks: Option<Rc<dyn ViewHooks>>,
    ) -> ViewResult<ViewId> {
        self.node(parent)?;
        let id = self.nodes.insert(ViewNode::new(Some(parent), frame, hooks));
        self.node_mut(parent)?.children.push(id);
        tracing::trace!(target: targets::VIEW, ?id, ?parent, %frame, "view added");

        for attr in Attribute::ALL {
            let parent_on = self.node(parent)?.state(attr).is_on();
            match (attr.initial_state(), parent_on) {
                (TriState::On, false) => self.super_switch_off(id, attr)?,
                (TriState::Latent, true) => self.super_switch_on(id, attr)?,
                _ => {}
            }
        }
        Ok(id)
    }

    /// Remove a view and its subtree. Returns the removed ids, children
    /// before parents.
    #[tracing::instrument(skip(self), target = "mgui::view", level = "trace")]
    pub fn remove(&mut self, id: ViewId) -> ViewResult<Vec<ViewId>> {
        if id == self.root {
            return Err(ViewError::RootView);
        }
        let removed = self.postorder(id)?;
        if let Some(parent) = self.node(id)?.parent
            && let Some(parent) = self.nodes.get_mut(parent)
        {
            parent.children.retain(|&child| child != id);
        }
        for view in &removed {
            self.nodes.remove(*view);
        }
        tracing::trace!(target: targets::VIEW, count = removed.len(), "subtree removed");
        Ok(removed)
    }

    /// Install or clear the hooks of a view.
    pub fn set_hooks(&mut self, id: ViewId, hooks: Option<Rc<dyn ViewHooks>>) -> ViewResult<()> {
        self.node_mut(id)?.hooks = hooks;
        Ok(())
    }

    pub fn parent(&self, id: ViewId) -> ViewResult<Option<ViewId>> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: ViewId) -> ViewResult<&[ViewId]> {
        Ok(&self.node(id)?.children)
    }

    /// Give a view a string id for [`find_by_id`](Self::find_by_id).
    pub fn set_name(&mut self, id: ViewId, name: impl Into<String>) -> ViewResult<()> {
        self.node_mut(id)?.name = Some(name.into());
        Ok(())
    }

    pub fn name(&self, id: ViewId) -> ViewResult<Option<&str>> {
        Ok(self.node(id)?.name.as_deref())
    }

    /// Find the first view (pre-order from the root) named `name`.
    pub fn find_by_id(&self, name: &str) -> Option<ViewId> {
        self.preorder(self.root)
            .ok()?
            .into_iter()
            .find(|&id| self.nodes[id].name.as_deref() == Some(name))
    }

    /// `id` followed by all its descendants, parents before children.
    pub fn preorder(&self, id: ViewId) -> ViewResult<Vec<ViewId>> {
        let mut result = Vec::new();
        self.preorder_into(id, &mut result)?;
        Ok(result)
    }

    fn preorder_into(&self, id: ViewId, result: &mut Vec<ViewId>) -> ViewResult<()> {
        let node = self.node(id)?;
        result.push(id);
        for &child in &node.children {
            self.preorder_into(child, result)?;
        }
        Ok(())
    }

    fn postorder(&self, id: ViewId) -> ViewResult<Vec<ViewId>> {
        let mut result = Vec::new();
        self.postorder_into(id, &mut result)?;
        Ok(result)
    }

    fn postorder_into(&self, id: ViewId, result: &mut Vec<ViewId>) -> ViewResult<()> {
        let node = self.node(id)?;
        for &child in &node.children {
            self.postorder_into(child, result)?;
        }
        result.push(id);
        Ok(())
    }

    // =========================================================================
    // Tri-state attributes
    // =========================================================================

    /// The raw state of an attribute.
    pub fn state(&self, id: ViewId, attr: Attribute) -> ViewResult<TriState> {
        Ok(self.node(id)?.state(attr))
    }

    pub fn is_visible(&self, id: ViewId) -> ViewResult<bool> {
        Ok(self.state(id, Attribute::Visible)?.is_on())
    }

    pub fn is_enabled(&self, id: ViewId) -> ViewResult<bool> {
        Ok(self.state(id, Attribute::Enabled)?.is_on())
    }

    pub fn is_active(&self, id: ViewId) -> ViewResult<bool> {
        Ok(self.state(id, Attribute::Active)?.is_on())
    }

    /// Explicitly switch an attribute on.
    ///
    /// The view goes on if its parent is on (or it is the root) and latent
    /// otherwise. Going on runs the view's hook, then wakes latent children.
    pub fn switch_on(&mut self, id: ViewId, attr: Attribute) -> ViewResult<()> {
        let node = self.node(id)?;
        if node.state(attr).is_on() {
            return Ok(());
        }
        if self.parent_is_on(node, attr) {
            self.turn_on(id, attr)
        } else {
            tracing::trace!(target: targets::VIEW, ?id, %attr, "latent");
            self.node_mut(id)?.set_state(attr, TriState::Latent);
            Ok(())
        }
    }

    /// Switch on a latent attribute because an ancestor went on.
    ///
    /// Views that are on or explicitly off are left alone.
    pub fn super_switch_on(&mut self, id: ViewId, attr: Attribute) -> ViewResult<()> {
        let node = self.node(id)?;
        if node.state(attr) == TriState::Latent && self.parent_is_on(node, attr) {
            self.turn_on(id, attr)?;
        }
        Ok(())
    }

    /// Explicitly switch an attribute off. The view ends up off whatever its
    /// previous state.
    pub fn switch_off(&mut self, id: ViewId, attr: Attribute) -> ViewResult<()> {
        if self.node(id)?.state(attr).is_on() {
            self.turn_off(id, attr)?;
        }
        self.node_mut(id)?.set_state(attr, TriState::Off);
        Ok(())
    }

    /// Switch off an attribute because an ancestor went off. An on view
    /// becomes latent; off and latent views are unchanged.
    pub fn super_switch_off(&mut self, id: ViewId, attr: Attribute) -> ViewResult<()> {
        if self.node(id)?.state(attr).is_on() {
            self.turn_off(id, attr)?;
            self.node_mut(id)?.set_state(attr, TriState::Latent);
        }
        Ok(())
    }

    fn parent_is_on(&self, node: &ViewNode, attr: Attribute) -> bool {
        node.parent
            .and_then(|p| self.nodes.get(p))
            .is_none_or(|p| p.state(attr).is_on())
    }

    fn turn_on(&mut self, id: ViewId, attr: Attribute) -> ViewResult<()> {
        tracing::trace!(target: targets::VIEW, ?id, %attr, "on");
        self.node_mut(id)?.set_state(attr, TriState::On);
        self.run_hook(id, attr, true);
        for child in self.node(id)?.children.clone() {
            self.super_switch_on(child, attr)?;
        }
        Ok(())
    }

    /// Children first, then the view's own hook. Leaves the state to the
    /// caller.
    fn turn_off(&mut self, id: ViewId, attr: Attribute) -> ViewResult<()> {
        for child in self.node(id)?.children.clone() {
            self.super_switch_off(child, attr)?;
        }
        tracing::trace!(target: targets::VIEW, ?id, %attr, "off");
        self.run_hook(id, attr, false);
        Ok(())
    }

    fn run_hook(&self, id: ViewId, attr: Attribute, on: bool) {
        let Some(hooks) = self.nodes.get(id).and_then(|n| n.hooks.clone()) else {
            return;
        };
        match (attr, on) {
            (Attribute::Visible, true) => hooks.show_self(id),
            (Attribute::Visible, false) => hooks.hide_self(id),
            (Attribute::Enabled, true) => hooks.enable_self(id),
            (Attribute::Enabled, false) => hooks.disable_self(id),
            (Attribute::Active, true) => hooks.activate_self(id),
            (Attribute::Active, false) => hooks.deactivate_self(id),
        }
    }

    pub fn show(&mut self, id: ViewId) -> ViewResult<()> {
        self.switch_on(id, Attribute::Visible)
    }

    pub fn hide(&mut self, id: ViewId) -> ViewResult<()> {
        self.switch_off(id, Attribute::Visible)
    }

    pub fn super_show(&mut self, id: ViewId) -> ViewResult<()> {
        self.super_switch_on(id, Attribute::Visible)
    }

    pub fn super_hide(&mut self, id: ViewId) -> ViewResult<()> {
        self.super_switch_off(id, Attribute::Visible)
    }

    pub fn enable(&mut self, id: ViewId) -> ViewResult<()> {
        self.switch_on(id, Attribute::Enabled)
    }

    pub fn disable(&mut self, id: ViewId) -> ViewResult<()> {
        self.switch_off(id, Attribute::Enabled)
    }

    pub fn super_enable(&mut self, id: ViewId) -> ViewResult<()> {
        self.super_switch_on(id, Attribute::Enabled)
    }

    pub fn super_disable(&mut self, id: ViewId) -> ViewResult<()> {
        self.super_switch_off(id, Attribute::Enabled)
    }

    pub fn activate(&mut self, id: ViewId) -> ViewResult<()> {
        self.switch_on(id, Attribute::Active)
    }

    pub fn deactivate(&mut self, id: ViewId) -> ViewResult<()> {
        self.switch_off(id, Attribute::Active)
    }

    pub fn super_activate(&mut self, id: ViewId) -> ViewResult<()> {
        self.super_switch_on(id, Attribute::Active)
    }

    pub fn super_deactivate(&mut self, id: ViewId) -> ViewResult<()> {
        self.super_switch_off(id, Attribute::Active)
    }

    // =========================================================================
    // Geometry
    // =========================================================================

    /// The frame, relative to the parent.
    pub fn frame(&self, id: ViewId) -> ViewResult<Rect> {
        Ok(self.node(id)?.frame)
    }

    /// The frame minus the margins, in the same coordinates as the frame.
    pub fn bounds(&self, id: ViewId) -> ViewResult<Rect> {
        Ok(self.node(id)?.bounds())
    }

    pub fn margins(&self, id: ViewId) -> ViewResult<Margins> {
        Ok(self.node(id)?.margins)
    }

    pub fn bind_flags(&self, id: ViewId) -> ViewResult<BindFlags> {
        Ok(self.node(id)?.bind)
    }

    pub fn set_bind_flags(&mut self, id: ViewId, flags: BindFlags) -> ViewResult<()> {
        self.node_mut(id)?.bind = flags;
        Ok(())
    }

    /// Change the margins. The frame is kept and the bounds shrink or grow.
    pub fn set_margins(&mut self, id: ViewId, margins: Margins) -> ViewResult<()> {
        self.node_mut(id)?.margins = margins;
        Ok(())
    }

    /// Set the frame and propagate any size change to the children
    /// according to their bind flags.
    #[tracing::instrument(skip(self), target = "mgui::view", level = "trace")]
    pub fn set_frame(&mut self, id: ViewId, frame: Rect) -> ViewResult<()> {
        let node = self.node_mut(id)?;
        let old = node.frame;
        if old == frame {
            return Ok(());
        }
        node.frame = frame;
        let hooks = node.hooks.clone();

        if old.origin() != frame.origin()
            && let Some(hooks) = &hooks
        {
            hooks.frame_moved(id, frame);
        }
        let (dw, dh) = (frame.width - old.width, frame.height - old.height);
        if dw != 0 || dh != 0 {
            if let Some(hooks) = &hooks {
                hooks.frame_resized(id, frame);
            }
            self.propagate_resize(id, dw, dh)?;
        }
        Ok(())
    }

    /// Set the bounds; the frame becomes the bounds plus the margins.
    pub fn set_bounds(&mut self, id: ViewId, bounds: Rect) -> ViewResult<()> {
        let m = self.node(id)?.margins;
        let frame = Rect::new(
            bounds.x - m.left,
            bounds.y - m.top,
            bounds.width + m.horizontal(),
            bounds.height + m.vertical(),
        );
        self.set_frame(id, frame)
    }

    /// Grow the frame by `(dw, dh)`, keeping its origin.
    pub fn resize_frame(&mut self, id: ViewId, dw: i32, dh: i32) -> ViewResult<()> {
        let f = self.frame(id)?;
        self.set_frame(id, Rect::new(f.x, f.y, f.width + dw, f.height + dh))
    }

    /// Move the frame by `(dx, dy)`. Children are parent-relative and do
    /// not move.
    pub fn move_frame(&mut self, id: ViewId, dx: i32, dy: i32) -> ViewResult<()> {
        let f = self.frame(id)?;
        self.set_frame(id, f.offset(dx, dy))
    }

    fn propagate_resize(&mut self, id: ViewId, dw: i32, dh: i32) -> ViewResult<()> {
        for child in self.node(id)?.children.clone() {
            let node = self.node(child)?;
            let (f, bind) = (node.frame, node.bind);
            let width = follow_trailing_edge(f.width, bind.contains(BindFlags::RIGHT), dw);
            let height = follow_trailing_edge(f.height, bind.contains(BindFlags::BOTTOM), dh);
            self.set_frame(child, Rect::new(f.x, f.y, width, height))?;
        }
        Ok(())
    }

    // =========================================================================
    // Debug
    // =========================================================================

    /// Indented dump of the subtree at `id`, one view per line.
    pub fn dump(&self, id: ViewId) -> ViewResult<String> {
        let mut output = String::new();
        self.dump_into(id, 0, &mut output)?;
        Ok(output)
    }

    fn dump_into(&self, id: ViewId, depth: usize, output: &mut String) -> ViewResult<()> {
        let node = self.node(id)?;
        let _ = writeln!(
            output,
            "{:indent$}{} {} visible={} enabled={} active={}",
            "",
            node.name.as_deref().unwrap_or("<view>"),
            node.frame,
            node.state(Attribute::Visible),
            node.state(Attribute::Enabled),
            node.state(Attribute::Active),
            indent = depth * 2
        );
        for &child in &node.children {
            self.dump_into(child, depth + 1, output)?;
        }
        Ok(())
    }
}

impl fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewTree")
            .field("root", &self.root)
            .field("views", &self.nodes.len())
            .finish()
    }
}
