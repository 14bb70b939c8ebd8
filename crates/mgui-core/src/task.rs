//! Cross-thread task handoff into the main loop.
//!
//! Any thread can push a closure onto an [`AsyncTaskQueue`]. A dedicated drain
//! thread pops closures in FIFO order and forwards each one into the
//! [`MainLoop`](crate::MainLoop) through a [`MainLoopHandle`], so the closure
//! eventually runs on the UI thread.
//!
//! Shutdown pushes a poison entry (`None`) to the head of the queue. The drain
//! thread stops as soon as it sees it; work still queued behind the poison is
//! discarded. The drain thread is joined when the queue is dropped.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::{Condvar, Mutex};

use crate::error::{CoreError, Result};
use crate::logging::targets;
use crate::main_loop::{MainLoopHandle, Task};

struct QueueState {
    entries: VecDeque<Option<Task>>,
    shut_down: bool,
}

struct Shared {
    state: Mutex<QueueState>,
    ready: Condvar,
}

impl Shared {
    fn push(&self, task: Task) -> Result<()> {
        let mut state = self.state.lock();
        if state.shut_down {
            return Err(CoreError::QueueShutDown);
        }
        state.entries.push_back(Some(task));
        drop(state);
        self.ready.notify_one();
        Ok(())
    }

    fn pop(&self) -> Option<Task> {
        let mut state = self.state.lock();
        loop {
            if let Some(entry) = state.entries.pop_front() {
                return entry;
            }
            self.ready.wait(&mut state);
        }
    }
}

/// Thread-safe sender side of an [`AsyncTaskQueue`].
#[derive(Clone)]
pub struct AsyncTaskSender {
    shared: Arc<Shared>,
}

static_assertions::assert_impl_all!(AsyncTaskSender: Send, Sync, Clone);

impl AsyncTaskSender {
    /// Queue a closure to run on the UI thread.
    ///
    /// Fails with [`CoreError::QueueShutDown`] after shutdown.
    pub fn push<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.push(Box::new(task))
    }
}

impl fmt::Debug for AsyncTaskSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTaskSender").finish_non_exhaustive()
    }
}

/// FIFO queue drained by a background thread into the main loop.
pub struct AsyncTaskQueue {
    shared: Arc<Shared>,
    drain: Option<JoinHandle<()>>,
}

impl AsyncTaskQueue {
    /// Start the drain thread, forwarding into `target`.
    pub fn start(target: MainLoopHandle) -> Result<Self> {
        let shared = Arc::new(Shared {
            state: Mutex::new(QueueState {
                entries: VecDeque::new(),
                shut_down: false,
            }),
            ready: Condvar::new(),
        });

        let drain = {
            let shared = shared.clone();
            std::thread::Builder::new()
                .name("mgui-async".into())
                .spawn(move || drain_loop(&shared, &target))
                .map_err(CoreError::ThreadSpawn)?
        };

        tracing::debug!(target: targets::TASK, "async task queue started");
        Ok(Self {
            shared,
            drain: Some(drain),
        })
    }

    /// A cloneable sender usable from any thread.
    pub fn sender(&self) -> AsyncTaskSender {
        AsyncTaskSender {
            shared: self.shared.clone(),
        }
    }

    /// Queue a closure to run on the UI thread.
    pub fn push<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.shared.push(Box::new(task))
    }

    /// Number of closures waiting for the drain thread.
    pub fn pending(&self) -> usize {
        self.shared
            .state
            .lock()
            .entries
            .iter()
            .filter(|e| e.is_some())
            .count()
    }

    /// Stop the drain thread and wait for it. Idempotent.
    pub fn shutdown(&mut self) {
        {
            let mut state = self.shared.state.lock();
            if !state.shut_down {
                state.shut_down = true;
                state.entries.push_front(None);
            }
        }
        self.shared.ready.notify_all();

        if let Some(drain) = self.drain.take() {
            if drain.join().is_err() {
                tracing::error!(target: targets::TASK, "async drain thread panicked");
            }
            let discarded = {
                let mut state = self.shared.state.lock();
                let n = state.entries.iter().filter(|e| e.is_some()).count();
                state.entries.clear();
                n
            };
            tracing::debug!(target: targets::TASK, discarded, "async task queue stopped");
        }
    }
}

impl Drop for AsyncTaskQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl fmt::Debug for AsyncTaskQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AsyncTaskQueue")
            .field("pending", &self.pending())
            .field("running", &self.drain.is_some())
            .finish()
    }
}

fn drain_loop(shared: &Shared, target: &MainLoopHandle) {
    while let Some(task) = shared.pop() {
        if target.post_boxed(task).is_err() {
            tracing::warn!(
                target: targets::TASK,
                "main loop exited; async drain thread stopping"
            );
            break;
        }
    }
    tracing::trace!(target: targets::TASK, "async drain thread exiting");
}
