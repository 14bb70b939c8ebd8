//! Ordered registries for live objects.
//!
//! The application keeps every open window and every open document in a
//! [`Registry`]. Registration hands back a [`RegistryEntry`] that the
//! registered object keeps; dropping the entry unregisters the object from
//! wherever it sits in the list.
//!
//! Registries are most-recent-first: the last registered (or last
//! [promoted](Registry::promote)) object is [`first`](Registry::first).

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::logging::targets;

struct Member<T> {
    id: u64,
    object: Weak<T>,
}

struct RegistryInner<T> {
    name: &'static str,
    members: RefCell<Vec<Member<T>>>,
    next_id: Cell<u64>,
}

impl<T> RegistryInner<T> {
    fn remove(&self, id: u64) -> bool {
        let mut members = self.members.borrow_mut();
        let before = members.len();
        members.retain(|m| m.id != id);
        before != members.len()
    }
}

/// An ordered, most-recent-first list of weakly-held objects.
///
/// Cloning a `Registry` yields another handle to the same list.
pub struct Registry<T> {
    inner: Rc<RegistryInner<T>>,
}

impl<T> Clone for Registry<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<T> Registry<T> {
    /// Create an empty registry. `name` is used in log output only.
    pub fn new(name: &'static str) -> Self {
        Self {
            inner: Rc::new(RegistryInner {
                name,
                members: RefCell::new(Vec::new()),
                next_id: Cell::new(1),
            }),
        }
    }

    /// Register an object at the front of the list.
    ///
    /// The object stays registered until the returned entry is dropped.
    pub fn register(&self, object: &Rc<T>) -> RegistryEntry<T> {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.members.borrow_mut().insert(
            0,
            Member {
                id,
                object: Rc::downgrade(object),
            },
        );
        tracing::debug!(
            target: targets::REGISTRY,
            registry = self.inner.name,
            id,
            len = self.len(),
            "registered"
        );
        RegistryEntry {
            id,
            registry: Rc::downgrade(&self.inner),
        }
    }

    /// Move a registered object to the front of the list.
    ///
    /// Returns `false` if the entry does not belong to this registry or was
    /// already removed.
    pub fn promote(&self, entry: &RegistryEntry<T>) -> bool {
        if !std::ptr::eq(entry.registry.as_ptr(), Rc::as_ptr(&self.inner)) {
            return false;
        }
        let mut members = self.inner.members.borrow_mut();
        match members.iter().position(|m| m.id == entry.id) {
            Some(pos) => {
                let member = members.remove(pos);
                members.insert(0, member);
                true
            }
            None => false,
        }
    }

    /// Number of live registered objects.
    pub fn len(&self) -> usize {
        self.inner
            .members
            .borrow()
            .iter()
            .filter(|m| m.object.strong_count() > 0)
            .count()
    }

    /// Returns `true` if no live object is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The most recently registered or promoted live object.
    pub fn first(&self) -> Option<Rc<T>> {
        self.inner
            .members
            .borrow()
            .iter()
            .find_map(|m| m.object.upgrade())
    }

    /// Snapshot of the live objects, most recent first.
    ///
    /// The snapshot is detached from the registry: objects may register or
    /// unregister while the caller walks it.
    pub fn iter(&self) -> std::vec::IntoIter<Rc<T>> {
        let live: Vec<Rc<T>> = self
            .inner
            .members
            .borrow()
            .iter()
            .filter_map(|m| m.object.upgrade())
            .collect();
        live.into_iter()
    }

    /// Call `f` for every live object, most recent first.
    pub fn for_each(&self, mut f: impl FnMut(&Rc<T>)) {
        for object in self.iter() {
            f(&object);
        }
    }

    /// The first live object (most recent first) matching `pred`.
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<Rc<T>> {
        self.iter().find(|object| pred(object))
    }
}

impl<T> fmt::Debug for Registry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("name", &self.inner.name)
            .field("len", &self.len())
            .finish()
    }
}

/// Membership token returned by [`Registry::register`].
///
/// Dropping it removes the object from the registry.
pub struct RegistryEntry<T> {
    id: u64,
    registry: Weak<RegistryInner<T>>,
}

impl<T> RegistryEntry<T> {
    /// Remove the object now instead of at drop.
    pub fn unregister(&mut self) {
        if let Some(inner) = self.registry.upgrade()
            && inner.remove(self.id)
        {
            tracing::debug!(
                target: targets::REGISTRY,
                registry = inner.name,
                id = self.id,
                "unregistered"
            );
        }
        self.registry = Weak::new();
    }

    /// Returns `true` while the entry still sits in its registry.
    pub fn is_registered(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|inner| inner.members.borrow().iter().any(|m| m.id == self.id))
    }
}

impl<T> Drop for RegistryEntry<T> {
    fn drop(&mut self) {
        self.unregister();
    }
}

impl<T> fmt::Debug for RegistryEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistryEntry")
            .field("id", &self.id)
            .field("registered", &self.is_registered())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named {
        name: &'static str,
    }

    fn names(registry: &Registry<Named>) -> Vec<&'static str> {
        registry.iter().map(|n| n.name).collect()
    }

    #[test]
    fn test_most_recent_first() {
        let registry = Registry::new("test");
        let a = Rc::new(Named { name: "a" });
        let b = Rc::new(Named { name: "b" });
        let c = Rc::new(Named { name: "c" });
        let _ea = registry.register(&a);
        let eb = registry.register(&b);
        let _ec = registry.register(&c);

        assert_eq!(names(&registry), ["c", "b", "a"]);
        assert_eq!(registry.first().map(|n| n.name), Some("c"));

        drop(eb);
        assert_eq!(names(&registry), ["c", "a"]);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_promote_and_find() {
        let registry = Registry::new("test");
        let a = Rc::new(Named { name: "a" });
        let b = Rc::new(Named { name: "b" });
        let ea = registry.register(&a);
        let _eb = registry.register(&b);

        assert!(registry.promote(&ea));
        assert_eq!(names(&registry), ["a", "b"]);
        assert_eq!(registry.find(|n| n.name == "b").map(|n| n.name), Some("b"));
        assert!(registry.find(|n| n.name == "z").is_none());

        let other = Registry::new("other");
        assert!(!other.promote(&ea));
    }

    #[test]
    fn test_dead_objects_are_skipped() {
        let registry = Registry::new("test");
        let a = Rc::new(Named { name: "a" });
        let entry = registry.register(&a);
        drop(a);
        assert!(registry.is_empty());
        assert!(registry.first().is_none());
        assert!(entry.is_registered());
    }

    #[test]
    fn test_unregister_during_iteration() {
        let registry = Registry::new("test");
        let a = Rc::new(Named { name: "a" });
        let b = Rc::new(Named { name: "b" });
        let mut ea = Some(registry.register(&a));
        let _eb = registry.register(&b);

        let mut seen = Vec::new();
        registry.for_each(|n| {
            seen.push(n.name);
            ea.take();
        });
        assert_eq!(seen, ["b", "a"]);
        assert_eq!(names(&registry), ["b"]);
    }

    #[test]
    fn test_entry_outlives_registry() {
        let a = Rc::new(Named { name: "a" });
        let entry = {
            let registry = Registry::new("short");
            registry.register(&a)
        };
        assert!(!entry.is_registered());
        drop(entry);
    }
}
