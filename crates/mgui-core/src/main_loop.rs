//! The UI-thread main loop.
//!
//! [`MainLoop`] lives on the UI thread and runs queued closures when it
//! iterates. Other threads reach it through a [`MainLoopHandle`], which is
//! `Send + Sync + Clone` and only ever *posts* work; the work itself always
//! runs on the thread that owns the loop.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};

use crate::error::{CoreError, Result};
use crate::logging::targets;
use crate::thread_check::ThreadAffinity;

/// A closure that may be posted from any thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// A closure that may only be posted from the UI thread.
pub type LocalTask = Box<dyn FnOnce() + 'static>;

enum LoopMessage {
    Run(Task),
    Quit,
}

/// Thread-safe handle used to post work into a [`MainLoop`].
#[derive(Clone)]
pub struct MainLoopHandle {
    sender: Sender<LoopMessage>,
}

static_assertions::assert_impl_all!(MainLoopHandle: Send, Sync, Clone);

impl MainLoopHandle {
    /// Queue a closure to run on the UI thread.
    ///
    /// Fails with [`CoreError::MainLoopExited`] once the loop has been
    /// dropped.
    pub fn post<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.post_boxed(Box::new(task))
    }

    /// Queue an already boxed closure.
    pub fn post_boxed(&self, task: Task) -> Result<()> {
        self.sender
            .send(LoopMessage::Run(task))
            .map_err(|_| CoreError::MainLoopExited)
    }

    /// Ask [`MainLoop::run`] to return after the work queued so far.
    pub fn quit(&self) -> Result<()> {
        self.sender
            .send(LoopMessage::Quit)
            .map_err(|_| CoreError::MainLoopExited)
    }
}

impl fmt::Debug for MainLoopHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainLoopHandle")
            .field("queued", &self.sender.len())
            .finish()
    }
}

/// The UI-thread side of the loop.
pub struct MainLoop {
    sender: Sender<LoopMessage>,
    receiver: Receiver<LoopMessage>,
    local: RefCell<VecDeque<LocalTask>>,
    quit_requested: Cell<bool>,
    running: Cell<bool>,
    affinity: ThreadAffinity,
}

impl Default for MainLoop {
    fn default() -> Self {
        Self::new()
    }
}

impl MainLoop {
    /// Create a loop owned by the current thread.
    pub fn new() -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        Self {
            sender,
            receiver,
            local: RefCell::new(VecDeque::new()),
            quit_requested: Cell::new(false),
            running: Cell::new(false),
            affinity: ThreadAffinity::current(),
        }
    }

    /// A handle that can post work from any thread.
    pub fn handle(&self) -> MainLoopHandle {
        MainLoopHandle {
            sender: self.sender.clone(),
        }
    }

    /// Queue a closure that is not `Send`. Must be called on the UI thread.
    pub fn post_local<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.affinity.debug_assert_same_thread("MainLoop");
        self.local.borrow_mut().push_back(Box::new(task));
    }

    /// Whether [`run`](Self::run) is currently on the stack.
    pub fn is_running(&self) -> bool {
        self.running.get()
    }

    /// Request that [`run`](Self::run) returns. Callable from the UI thread.
    pub fn quit(&self) {
        self.quit_requested.set(true);
    }

    /// Run every closure queued so far without blocking.
    ///
    /// Cross-thread work is run before local work. Returns the number of
    /// closures run. A pending quit request is recorded, not consumed.
    pub fn run_pending(&self) -> usize {
        self.affinity.assert_same_thread("MainLoop");
        let mut ran = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(LoopMessage::Run(task)) => {
                    task();
                    ran += 1;
                }
                Ok(LoopMessage::Quit) => self.quit_requested.set(true),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        ran += self.run_local();
        if ran > 0 {
            tracing::trace!(target: targets::TASK, ran, "ran pending tasks");
        }
        ran
    }

    /// Block and run closures until [`quit`](Self::quit) or
    /// [`MainLoopHandle::quit`] is called.
    #[tracing::instrument(skip_all, target = "mgui_core::task", level = "debug")]
    pub fn run(&self) {
        self.affinity.assert_same_thread("MainLoop");
        self.running.set(true);
        tracing::debug!(target: targets::TASK, "main loop started");

        while !self.quit_requested.get() {
            self.run_local();
            if self.quit_requested.get() {
                break;
            }
            // Local work can be posted without waking the channel, so the
            // wait is bounded.
            match self.receiver.recv_timeout(Duration::from_millis(10)) {
                Ok(LoopMessage::Run(task)) => task(),
                Ok(LoopMessage::Quit) => self.quit_requested.set(true),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }

        self.quit_requested.set(false);
        self.running.set(false);
        tracing::debug!(target: targets::TASK, "main loop stopped");
    }

    fn run_local(&self) -> usize {
        let mut ran = 0;
        // Pop one at a time so tasks may post more local work.
        loop {
            let next = self.local.borrow_mut().pop_front();
            match next {
                Some(task) => {
                    task();
                    ran += 1;
                }
                None => break,
            }
        }
        ran
    }
}

impl fmt::Debug for MainLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MainLoop")
            .field("queued", &self.receiver.len())
            .field("local", &self.local.borrow().len())
            .field("running", &self.running.get())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_run_pending_runs_in_order() {
        let main_loop = MainLoop::new();
        let handle = main_loop.handle();
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));
        for i in 0..5 {
            let order = order.clone();
            handle.post(move || order.lock().push(i)).unwrap();
        }
        assert_eq!(main_loop.run_pending(), 5);
        assert_eq!(*order.lock(), vec![0, 1, 2, 3, 4]);
        assert_eq!(main_loop.run_pending(), 0);
    }

    #[test]
    fn test_post_from_other_thread_and_quit() {
        let main_loop = MainLoop::new();
        let handle = main_loop.handle();
        let count = Arc::new(AtomicUsize::new(0));

        let worker = {
            let count = count.clone();
            std::thread::spawn(move || {
                for _ in 0..10 {
                    let count = count.clone();
                    handle
                        .post(move || {
                            count.fetch_add(1, Ordering::SeqCst);
                        })
                        .unwrap();
                }
                handle.quit().unwrap();
            })
        };

        main_loop.run();
        worker.join().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 10);
        assert!(!main_loop.is_running());
    }

    #[test]
    fn test_local_tasks_can_quit() {
        let main_loop = Rc::new(MainLoop::new());
        let hits = Rc::new(Cell::new(0));
        {
            let hits = hits.clone();
            let weak = Rc::downgrade(&main_loop);
            main_loop.post_local(move || {
                hits.set(hits.get() + 1);
                if let Some(main_loop) = weak.upgrade() {
                    main_loop.quit();
                }
            });
        }
        main_loop.run();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_post_after_drop_fails() {
        let handle = MainLoop::new().handle();
        assert!(matches!(handle.post(|| {}), Err(CoreError::MainLoopExited)));
    }
}
