//! Point-to-point event routing for mgui.
//!
//! This module provides the two endpoints of a route:
//!
//! - [`EventOut<Args>`] - the sending side, owned by the object that fires
//! - [`EventIn<Args>`] - the receiving side, wrapping a handler
//!
//! A *route* is a subscription link between one `EventOut` and one `EventIn`.
//! Routes are many-to-many: an `EventOut` may feed any number of `EventIn`s
//! and an `EventIn` may listen to any number of `EventOut`s.
//!
//! # Lifetime
//!
//! Both endpoints only hold weak references to each other and the relation is
//! kept symmetric at all times. Dropping either endpoint removes it from every
//! partner first, so an event can never reach a destroyed receiver.
//!
//! # Dispatch
//!
//! [`EventOut::emit`] calls every subscribed handler synchronously, on the
//! calling thread, in subscription order. The subscriber list is snapshotted
//! before dispatch starts: routes added or removed by a handler only affect
//! later emissions. The one exception is an `EventIn` dropped during dispatch,
//! which is skipped for the remainder of the in-flight emission.
//!
//! Endpoints are `!Send`; they belong to the UI thread that created them.
//!
//! # Example
//!
//! ```
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use mgui_core::event::{add_route, EventIn, EventOut};
//!
//! let value_changed = EventOut::<i32>::new();
//! let last = Rc::new(Cell::new(0));
//!
//! let last_clone = last.clone();
//! let on_value = EventIn::new(move |&v: &i32| last_clone.set(v));
//!
//! add_route(&value_changed, &on_value);
//! value_changed.emit(5);
//! assert_eq!(last.get(), 5);
//!
//! drop(on_value);
//! value_changed.emit(6); // nobody listening anymore
//! assert_eq!(last.get(), 5);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::logging::targets;

/// Receiving node shared between an `EventIn` and the weak back-references
/// held by its `EventOut`s.
struct InNode<Args> {
    handler: Box<dyn Fn(&Args)>,
    outs: RefCell<Vec<Weak<OutNode<Args>>>>,
    /// Cleared when the owning `EventIn` is dropped.
    alive: Cell<bool>,
}

struct OutNode<Args> {
    ins: RefCell<Vec<Weak<InNode<Args>>>>,
    blocked: Cell<bool>,
}

/// The sending endpoint of a route.
///
/// An `EventOut` is usually a public field of the object that fires it, e.g.
/// a document's `modified_changed: EventOut<bool>`.
pub struct EventOut<Args: 'static> {
    node: Rc<OutNode<Args>>,
}

/// The receiving endpoint of a route.
///
/// An `EventIn` always carries a handler. It is either a free closure
/// ([`EventIn::new`]) or a method bound to a weakly held owner
/// ([`EventIn::bind`]); the latter silently does nothing once the owner is
/// gone.
pub struct EventIn<Args: 'static> {
    node: Rc<InNode<Args>>,
}

impl<Args: 'static> EventOut<Args> {
    /// Create an event source with no routes.
    pub fn new() -> Self {
        Self {
            node: Rc::new(OutNode {
                ins: RefCell::new(Vec::new()),
                blocked: Cell::new(false),
            }),
        }
    }

    /// Route this event to `input`.
    ///
    /// Returns `false` if the route already existed; a route is never added
    /// twice.
    pub fn add_route(&self, input: &EventIn<Args>) -> bool {
        if self.is_routed_to(input) {
            return false;
        }
        self.node.ins.borrow_mut().push(Rc::downgrade(&input.node));
        input.node.outs.borrow_mut().push(Rc::downgrade(&self.node));
        tracing::trace!(target: targets::EVENT, routes = self.route_count(), "route added");
        true
    }

    /// Remove the route to `input`.
    ///
    /// Returns `true` if a route existed.
    pub fn remove_route(&self, input: &EventIn<Args>) -> bool {
        let removed = remove_weak(&self.node.ins, &input.node);
        if removed {
            remove_weak(&input.node.outs, &self.node);
            tracing::trace!(target: targets::EVENT, routes = self.route_count(), "route removed");
        }
        removed
    }

    /// Remove every route leaving this event.
    pub fn remove_all_routes(&self) {
        let ins = std::mem::take(&mut *self.node.ins.borrow_mut());
        for input in ins.iter().filter_map(Weak::upgrade) {
            remove_weak(&input.outs, &self.node);
        }
    }

    /// Check whether this event is routed to `input`.
    pub fn is_routed_to(&self, input: &EventIn<Args>) -> bool {
        let target = Rc::downgrade(&input.node);
        self.node.ins.borrow().iter().any(|w| w.ptr_eq(&target))
    }

    /// Number of routes leaving this event.
    pub fn route_count(&self) -> usize {
        self.node.ins.borrow().len()
    }

    /// Suppress (or re-enable) dispatch.
    ///
    /// While blocked, [`emit`](Self::emit) does nothing. Routes are kept.
    pub fn set_blocked(&self, blocked: bool) {
        self.node.blocked.set(blocked);
    }

    /// Whether dispatch is currently suppressed.
    pub fn is_blocked(&self) -> bool {
        self.node.blocked.get()
    }

    /// Call every routed handler with `args`.
    #[tracing::instrument(skip_all, target = "mgui_core::event", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.node.blocked.get() {
            tracing::trace!(target: targets::EVENT, "event blocked, skipping emit");
            return;
        }

        // Snapshot so handlers are free to add and remove routes.
        let receivers: Vec<Rc<InNode<Args>>> = self
            .node
            .ins
            .borrow()
            .iter()
            .filter_map(Weak::upgrade)
            .collect();
        tracing::trace!(target: targets::EVENT, route_count = receivers.len(), "emitting event");

        for input in receivers {
            if input.alive.get() {
                (input.handler)(&args);
            }
        }
    }
}

impl<Args: 'static> Default for EventOut<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Drop for EventOut<Args> {
    fn drop(&mut self) {
        self.remove_all_routes();
    }
}

impl<Args: 'static> fmt::Debug for EventOut<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventOut")
            .field("routes", &self.route_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

impl<Args: 'static> EventIn<Args> {
    /// Create a receiver around a free closure.
    pub fn new<F>(handler: F) -> Self
    where
        F: Fn(&Args) + 'static,
    {
        Self {
            node: Rc::new(InNode {
                handler: Box::new(handler),
                outs: RefCell::new(Vec::new()),
                alive: Cell::new(true),
            }),
        }
    }

    /// Create a receiver that calls `method` on `owner`.
    ///
    /// Only a weak reference to the owner is kept. Once the owner is dropped
    /// the receiver still exists but its handler does nothing.
    pub fn bind<O: 'static>(owner: &Rc<O>, method: fn(&O, &Args)) -> Self {
        let owner = Rc::downgrade(owner);
        Self::new(move |args| {
            if let Some(owner) = owner.upgrade() {
                method(&owner, args);
            }
        })
    }

    /// Create a receiver from a weak owner, for use inside `Rc::new_cyclic`.
    pub fn bind_weak<O: 'static>(owner: Weak<O>, method: fn(&O, &Args)) -> Self {
        Self::new(move |args| {
            if let Some(owner) = owner.upgrade() {
                method(&owner, args);
            }
        })
    }

    /// Remove the route from `output` to this receiver.
    pub fn remove_route(&self, output: &EventOut<Args>) -> bool {
        output.remove_route(self)
    }

    /// Remove every route arriving at this receiver.
    pub fn remove_all_routes(&self) {
        let outs = std::mem::take(&mut *self.node.outs.borrow_mut());
        for output in outs.iter().filter_map(Weak::upgrade) {
            remove_weak(&output.ins, &self.node);
        }
    }

    /// Check whether `output` is routed to this receiver.
    pub fn is_routed_from(&self, output: &EventOut<Args>) -> bool {
        let source = Rc::downgrade(&output.node);
        self.node.outs.borrow().iter().any(|w| w.ptr_eq(&source))
    }

    /// Number of routes arriving at this receiver.
    pub fn route_count(&self) -> usize {
        self.node.outs.borrow().len()
    }

    /// Invoke the handler directly, bypassing any route.
    pub fn call(&self, args: &Args) {
        (self.node.handler)(args);
    }
}

impl<Args: 'static> Drop for EventIn<Args> {
    fn drop(&mut self) {
        self.node.alive.set(false);
        self.remove_all_routes();
    }
}

impl<Args: 'static> fmt::Debug for EventIn<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventIn")
            .field("routes", &self.route_count())
            .finish()
    }
}

/// Establish a route from `output` to `input`.
///
/// Returns `false` if the route already existed.
pub fn add_route<Args: 'static>(output: &EventOut<Args>, input: &EventIn<Args>) -> bool {
    output.add_route(input)
}

/// Tear down the route from `output` to `input`.
///
/// Returns `true` if a route existed.
pub fn remove_route<Args: 'static>(output: &EventOut<Args>, input: &EventIn<Args>) -> bool {
    output.remove_route(input)
}

/// Remove the first weak entry pointing at `target`.
fn remove_weak<T>(list: &RefCell<Vec<Weak<T>>>, target: &Rc<T>) -> bool {
    let target = Rc::downgrade(target);
    let mut list = list.borrow_mut();
    match list.iter().position(|w| w.ptr_eq(&target)) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}
