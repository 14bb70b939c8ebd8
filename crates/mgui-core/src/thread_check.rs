//! Thread affinity checks for UI-thread-only entry points.
//!
//! Portable GUI objects are `Rc` based and therefore cannot leave the thread
//! that created them. The few entry points that *are* reachable from other
//! threads (the main loop handle, the async execute handle) hand work back to
//! the UI thread; everything else asserts that it runs there.
//!
//! A thread becomes a UI thread when an `Application` is created on it. Each
//! thread can host its own application, so the marker is thread-local rather
//! than process-global; this keeps parallel tests independent.
//!
//! ```ignore
//! use mgui_core::debug_assert_ui_thread;
//!
//! fn relayout(&self) {
//!     debug_assert_ui_thread!();
//!     // ...
//! }
//! ```

use std::cell::Cell;
use std::thread::ThreadId;

thread_local! {
    static UI_THREAD: Cell<bool> = const { Cell::new(false) };
}

/// Mark the current thread as a UI thread.
///
/// Called by `Application::new()`.
pub fn mark_ui_thread() {
    UI_THREAD.with(|flag| flag.set(true));
}

/// Clear the UI-thread marker of the current thread.
///
/// Called when the application that marked the thread is dropped.
pub fn unmark_ui_thread() {
    UI_THREAD.with(|flag| flag.set(false));
}

/// Check if the current thread hosts an application.
#[inline]
pub fn is_ui_thread() -> bool {
    UI_THREAD.with(Cell::get)
}

/// Panics if the current thread does not host an application.
#[macro_export]
macro_rules! assert_ui_thread {
    () => {
        $crate::assert_ui_thread!("operation must be performed on the UI thread")
    };
    ($msg:expr) => {
        if !$crate::thread_check::is_ui_thread() {
            $crate::thread_check::panic_not_ui_thread($msg, file!(), line!());
        }
    };
}

/// Debug-only variant of [`assert_ui_thread!`].
#[macro_export]
macro_rules! debug_assert_ui_thread {
    () => {
        #[cfg(debug_assertions)]
        $crate::assert_ui_thread!()
    };
    ($msg:expr) => {
        #[cfg(debug_assertions)]
        $crate::assert_ui_thread!($msg)
    };
}

#[cold]
#[inline(never)]
#[doc(hidden)]
pub fn panic_not_ui_thread(msg: &str, file: &str, line: u32) -> ! {
    let current = std::thread::current();
    panic!(
        "{msg}\n  at {file}:{line}\n  current thread: \"{}\" ({:?}) has no Application; \
         use Application::execute() to hand work to the UI thread",
        current.name().unwrap_or("<unnamed>"),
        current.id(),
    )
}

/// Records the thread an object was created on.
///
/// Used by thread-safe handles that must still be *consumed* on one thread,
/// such as the receiving side of the main loop.
#[derive(Debug, Clone, Copy)]
pub struct ThreadAffinity {
    thread_id: ThreadId,
}

impl Default for ThreadAffinity {
    fn default() -> Self {
        Self::current()
    }
}

impl ThreadAffinity {
    /// Affinity for the current thread.
    #[inline]
    pub fn current() -> Self {
        Self {
            thread_id: std::thread::current().id(),
        }
    }

    /// The thread this affinity is bound to.
    #[inline]
    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    /// Check if the current thread matches this affinity.
    #[inline]
    pub fn is_same_thread(&self) -> bool {
        std::thread::current().id() == self.thread_id
    }

    /// Panics if called from a different thread.
    pub fn assert_same_thread(&self, what: &str) {
        if !self.is_same_thread() {
            self.panic_wrong_thread(what);
        }
    }

    /// Debug-only variant of [`assert_same_thread`](Self::assert_same_thread).
    #[inline]
    pub fn debug_assert_same_thread(&self, what: &str) {
        #[cfg(debug_assertions)]
        self.assert_same_thread(what);
        #[cfg(not(debug_assertions))]
        let _ = what;
    }

    #[cold]
    #[inline(never)]
    fn panic_wrong_thread(&self, what: &str) -> ! {
        let current = std::thread::current();
        panic!(
            "{what} accessed from thread \"{}\" ({:?}) but it belongs to {:?}",
            current.name().unwrap_or("<unnamed>"),
            current.id(),
            self.thread_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_is_per_thread() {
        mark_ui_thread();
        assert!(is_ui_thread());

        let other = std::thread::spawn(is_ui_thread).join().unwrap();
        assert!(!other);

        unmark_ui_thread();
        assert!(!is_ui_thread());
    }

    #[test]
    fn test_affinity_same_thread() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_same_thread());
        affinity.assert_same_thread("test object");

        let moved = affinity;
        let same = std::thread::spawn(move || moved.is_same_thread())
            .join()
            .unwrap();
        assert!(!same);
    }

    #[test]
    fn test_assert_panics_off_ui_thread() {
        let result = std::thread::spawn(|| {
            crate::assert_ui_thread!("needs ui");
        })
        .join();
        assert!(result.is_err());
    }
}
