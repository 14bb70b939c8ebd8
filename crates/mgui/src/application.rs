//! The application context.
//!
//! There is at most one [`Application`] per UI thread. It owns the main
//! loop, the async execute queue, the window and document lists, the
//! application-scoped commands (`app.quit`, `app.new`, `app.close-all`)
//! and the alert catalog, and it installs the error reporter that turns
//! contained callback failures into error alerts.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use mgui::application::Application;
//! use mgui::backend::HeadlessBackend;
//! use mgui_core::AppConfig;
//!
//! let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
//! let handle = app.execute_handle().unwrap();
//! let hits = Arc::new(AtomicUsize::new(0));
//!
//! let worker_hits = Arc::clone(&hits);
//! std::thread::spawn(move || {
//!     handle.execute(move || { worker_hits.fetch_add(1, Ordering::SeqCst); }).unwrap();
//! }).join().unwrap();
//!
//! // Tasks run on the UI thread when the loop iterates.
//! while hits.load(Ordering::SeqCst) == 0 {
//!     app.run_pending();
//! }
//! ```

use std::cell::{Ref, RefCell};
use std::error::Error as StdError;
use std::fmt;
use std::path::Path;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use mgui_core::logging::targets;
use mgui_core::thread_check::{mark_ui_thread, unmark_ui_thread};
use mgui_core::{
    AppConfig, AsyncTaskQueue, AsyncTaskSender, CoreError, MainLoop, Registry, ThreadAffinity,
    is_ui_thread,
};
use parking_lot::{Condvar, Mutex};
use static_assertions::assert_impl_all;

use crate::alert::{AlertCatalog, AlertKind, AlertResponse, AlertSpec};
use crate::backend::SharedBackend;
use crate::command::{ActionGroup, Command};
use crate::document::Document;
use crate::error::{
    CommandError, ErrorReporter, GuiError, ResourceError, Result, set_error_reporter,
};
use crate::keys::{Key, KeyCombination};
use crate::menu::MenuBar;
use crate::window::Window;

thread_local! {
    static CURRENT: RefCell<Weak<Application>> = const { RefCell::new(Weak::new()) };
}

/// Application-level policy hooks.
pub trait ApplicationDelegate {
    /// Handle `app.new`: typically create a document and a window for it.
    fn new_document(&self, _app: &Rc<Application>) -> Result<()> {
        Ok(())
    }

    /// Asked before quitting. Returning `false` cancels the quit.
    fn should_quit(&self, _app: &Application) -> bool {
        true
    }

    /// Every window has closed and the main loop is about to stop.
    fn will_quit(&self, _app: &Application) {}
}

/// The per-thread application context.
pub struct Application {
    this: Weak<Application>,
    config: AppConfig,
    backend: SharedBackend,
    main_loop: MainLoop,
    tasks: RefCell<Option<AsyncTaskQueue>>,
    windows: Registry<Window>,
    documents: Registry<Document>,
    actions: ActionGroup,
    quit_command: Command<Application, (), bool>,
    new_command: Command<Application, (), Result<()>>,
    close_all_command: Command<Application, (), bool>,
    delegate: RefCell<Option<Rc<dyn ApplicationDelegate>>>,
    alerts: RefCell<AlertCatalog>,
    menu_bar: RefCell<Option<MenuBar>>,
    previous_reporter: RefCell<Option<Rc<dyn ErrorReporter>>>,
    affinity: ThreadAffinity,
}

impl Application {
    /// Create the application for the current thread, which becomes the UI
    /// thread.
    ///
    /// Fails with [`GuiError::AlreadyInitialized`] if this thread already
    /// has a live application.
    #[tracing::instrument(skip_all, target = "mgui::application", level = "debug")]
    pub fn new(config: AppConfig, backend: SharedBackend) -> Result<Rc<Self>> {
        if Self::current().is_some() {
            tracing::error!(target: targets::APPLICATION, "application already initialized on this thread");
            return Err(GuiError::AlreadyInitialized);
        }
        config.validate()?;

        let main_loop = MainLoop::new();
        let tasks = if config.async_queue {
            Some(AsyncTaskQueue::start(main_loop.handle())?)
        } else {
            None
        };
        mark_ui_thread();

        let app = Rc::new_cyclic(|weak: &Weak<Application>| Application {
            this: weak.clone(),
            config,
            backend,
            main_loop,
            tasks: RefCell::new(tasks),
            windows: Registry::new("windows"),
            documents: Registry::new("documents"),
            actions: ActionGroup::new("app"),
            quit_command: Command::new(weak.clone(), "quit", Application::quit_command)
                .with_accelerator(KeyCombination::ctrl(Key::Q)),
            new_command: Command::new(weak.clone(), "new", Application::new_command)
                .with_accelerator(KeyCombination::ctrl(Key::N)),
            close_all_command: Command::new(weak.clone(), "close-all", Application::close_all_command)
                .with_accelerator(KeyCombination::ctrl_shift(Key::W)),
            delegate: RefCell::new(None),
            alerts: RefCell::new(AlertCatalog::default()),
            menu_bar: RefCell::new(None),
            previous_reporter: RefCell::new(None),
            affinity: ThreadAffinity::current(),
        });

        app.quit_command.register(&app.actions)?;
        app.new_command.register(&app.actions)?;
        app.close_all_command.register(&app.actions)?;

        CURRENT.with(|current| *current.borrow_mut() = Rc::downgrade(&app));
        let reporter: Rc<dyn ErrorReporter> = Rc::new(AlertReporter {
            app: Rc::downgrade(&app),
        });
        *app.previous_reporter.borrow_mut() = set_error_reporter(Some(reporter));

        tracing::info!(
            target: targets::APPLICATION,
            app_id = %app.config.app_id,
            backend = app.backend.name(),
            async_queue = app.config.async_queue,
            "application started"
        );
        Ok(app)
    }

    /// The live application of this thread.
    pub fn current() -> Option<Rc<Application>> {
        CURRENT.with(|current| current.borrow().upgrade())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    /// Application commands (`app.*`).
    pub fn actions(&self) -> &ActionGroup {
        &self.actions
    }

    pub fn set_delegate(&self, delegate: Option<Rc<dyn ApplicationDelegate>>) {
        *self.delegate.borrow_mut() = delegate;
    }

    fn delegate(&self) -> Option<Rc<dyn ApplicationDelegate>> {
        self.delegate.borrow().clone()
    }

    // =========================================================================
    // Window and document lists
    // =========================================================================

    /// Open windows, front window first.
    pub fn windows(&self) -> &Registry<Window> {
        &self.windows
    }

    /// Open documents, most recently opened first.
    pub fn documents(&self) -> &Registry<Document> {
        &self.documents
    }

    pub fn front_window(&self) -> Option<Rc<Window>> {
        self.windows.first()
    }

    /// The first window displaying `document`.
    pub fn find_window_for_document(&self, document: &Document) -> Option<Rc<Window>> {
        self.windows.find(|window| window.shows_document(document))
    }

    /// The open document backed by `path`.
    pub fn document_for_path(&self, path: &Path) -> Option<Rc<Document>> {
        self.documents
            .find(|document| document.path().as_deref() == Some(path))
    }

    /// Close every window, front to back. Stops at the first window that
    /// refuses and returns `false`.
    pub fn close_all(&self) -> bool {
        for window in self.windows.iter() {
            if !window.close() {
                tracing::debug!(target: targets::APPLICATION, title = %window.title(), "close-all interrupted");
                return false;
            }
        }
        true
    }

    // =========================================================================
    // Main loop
    // =========================================================================

    /// Run the main loop until [`quit`](Self::quit) succeeds.
    pub fn run(&self) {
        self.affinity.assert_same_thread("Application::run");
        self.main_loop.run();
    }

    /// Run queued work without blocking. Returns the number of tasks run.
    pub fn run_pending(&self) -> usize {
        self.main_loop.run_pending()
    }

    /// Queue a UI-thread closure to run on a later loop iteration.
    pub fn post_local<F>(&self, task: F)
    where
        F: FnOnce() + 'static,
    {
        self.main_loop.post_local(task);
    }

    /// Quit: ask the delegate, close every window, then stop the loop.
    /// Returns `false` if the delegate or a window refused.
    pub fn quit(&self) -> bool {
        let delegate = self.delegate();
        if let Some(delegate) = &delegate
            && !delegate.should_quit(self)
        {
            tracing::debug!(target: targets::APPLICATION, "quit cancelled by delegate");
            return false;
        }
        if !self.close_all() {
            return false;
        }
        if let Some(delegate) = &delegate {
            delegate.will_quit(self);
        }
        tracing::info!(target: targets::APPLICATION, "quitting");
        self.main_loop.quit();
        true
    }

    // =========================================================================
    // Cross-thread execution
    // =========================================================================

    /// Run `task` on the UI thread, in submission order with every other
    /// task submitted through the async queue.
    pub fn execute<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        self.execute_handle()?.execute(task)
    }

    /// A `Send + Sync` handle for submitting UI-thread work from anywhere.
    pub fn execute_handle(&self) -> Result<ExecuteHandle> {
        self.tasks
            .borrow()
            .as_ref()
            .map(|tasks| ExecuteHandle {
                sender: tasks.sender(),
            })
            .ok_or(GuiError::AsyncDisabled)
    }

    // =========================================================================
    // Commands and accelerators
    // =========================================================================

    /// Route a key press: the front window's scope first, then the
    /// application's. Returns whether a command ran.
    pub fn dispatch_accelerator(&self, combo: &KeyCombination) -> bool {
        if let Some(front) = self.front_window()
            && front.dispatch_accelerator(combo)
        {
            return true;
        }
        self.actions.dispatch_accelerator(combo)
    }

    /// Activate a scoped action (`app.<name>` or `win.<name>`) the way a
    /// menu item does.
    pub fn activate_action(&self, scoped: &str) -> std::result::Result<(), CommandError> {
        let unknown = || CommandError::UnknownAction {
            name: scoped.to_string(),
        };
        let (scope, name) = scoped.split_once('.').ok_or_else(unknown)?;
        match scope {
            "app" => self.actions.activate_default(name),
            "win" => self
                .front_window()
                .ok_or_else(unknown)?
                .actions()
                .activate_default(name),
            _ => Err(unknown()),
        }
    }

    fn quit_command(&self, _: ()) -> bool {
        self.quit()
    }

    fn new_command(&self, _: ()) -> Result<()> {
        match (self.this.upgrade(), self.delegate()) {
            (Some(app), Some(delegate)) => delegate.new_document(&app),
            _ => {
                tracing::debug!(target: targets::APPLICATION, "app.new without a delegate");
                Ok(())
            }
        }
    }

    fn close_all_command(&self, _: ()) -> bool {
        self.close_all()
    }

    // =========================================================================
    // Menus
    // =========================================================================

    /// Install `bar` as the application menu bar, replacing any previous one.
    pub fn set_menu_bar(&self, bar: MenuBar) -> Result<()> {
        self.backend.install_menu_bar(&bar)?;
        *self.menu_bar.borrow_mut() = Some(bar);
        Ok(())
    }

    pub fn menu_bar(&self) -> Option<Ref<'_, MenuBar>> {
        Ref::filter_map(self.menu_bar.borrow(), Option::as_ref).ok()
    }

    // =========================================================================
    // Alerts and errors
    // =========================================================================

    pub fn alert_catalog(&self) -> Ref<'_, AlertCatalog> {
        self.alerts.borrow()
    }

    /// Add alert templates from XML. Returns how many were loaded.
    pub fn load_alerts(&self, xml: &str) -> std::result::Result<usize, ResourceError> {
        self.alerts.borrow_mut().load_xml(xml)
    }

    /// Show the alert `resource`, formatted with `args`.
    pub fn display_alert(&self, resource: &str, args: &[&str]) -> Result<()> {
        self.display_alert_with(resource, args, |_| {})
    }

    /// Show the alert `resource` and pass the pressed button to `respond`.
    pub fn display_alert_with<F>(&self, resource: &str, args: &[&str], respond: F) -> Result<()>
    where
        F: FnOnce(AlertResponse) + 'static,
    {
        let alert = self.alerts.borrow().format(resource, args)?;
        tracing::debug!(target: targets::APPLICATION, resource, message = %alert.message, "alert");
        self.backend.alert_presenter().present(alert, Box::new(respond));
        Ok(())
    }

    /// Show an error alert for `error`.
    pub fn display_error(&self, error: &dyn StdError) {
        let message = error.to_string();
        let alert = {
            let alerts = self.alerts.borrow();
            match alerts.get("error") {
                Some(spec) => spec.format(&[&message]),
                None => AlertSpec::new(AlertKind::Error, "^0").format(&[&message]),
            }
        };
        tracing::debug!(target: targets::APPLICATION, %message, "displaying error");
        self.backend.alert_presenter().present(alert, Box::new(|_| {}));
    }
}

impl Drop for Application {
    fn drop(&mut self) {
        if let Some(mut tasks) = self.tasks.get_mut().take() {
            tasks.shutdown();
        }
        set_error_reporter(self.previous_reporter.get_mut().take());
        CURRENT.with(|current| *current.borrow_mut() = Weak::new());
        unmark_ui_thread();
        tracing::info!(target: targets::APPLICATION, app_id = %self.config.app_id, "application stopped");
    }
}

impl fmt::Debug for Application {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Application")
            .field("app_id", &self.config.app_id)
            .field("backend", &self.backend.name())
            .field("windows", &self.windows.len())
            .field("documents", &self.documents.len())
            .finish_non_exhaustive()
    }
}

/// Shows contained failures as error alerts.
struct AlertReporter {
    app: Weak<Application>,
}

impl ErrorReporter for AlertReporter {
    fn report(&self, _context: &str, error: &dyn StdError) {
        if let Some(app) = self.app.upgrade() {
            app.display_error(error);
        }
    }
}

// ============================================================================
// Execute handle
// ============================================================================

/// Submits closures to the UI thread from any thread.
#[derive(Clone)]
pub struct ExecuteHandle {
    sender: AsyncTaskSender,
}

assert_impl_all!(ExecuteHandle: Send, Sync, Clone);

impl ExecuteHandle {
    /// Queue `task` for the UI thread.
    pub fn execute<F>(&self, task: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        Ok(self.sender.push(task)?)
    }

    /// Queue `task` and block until it has run on the UI thread.
    ///
    /// Fails with [`GuiError::WouldBlockUiThread`] on the UI thread, and
    /// with [`CoreError::MainLoopExited`] if the task is dropped without
    /// running (the application shut down first).
    pub fn execute_and_wait<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        if is_ui_thread() {
            return Err(GuiError::WouldBlockUiThread);
        }
        let (completion, waiter) = completion_pair();
        self.sender.push(move || completion.complete(task()))?;
        waiter
            .wait()
            .ok_or(GuiError::Core(CoreError::MainLoopExited))
    }
}

impl fmt::Debug for ExecuteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecuteHandle").finish_non_exhaustive()
    }
}

enum Outcome<T> {
    Pending,
    Done(T),
    Abandoned,
}

struct CompletionState<T> {
    outcome: Mutex<Outcome<T>>,
    condvar: Condvar,
}

/// Sending half: completes the wait, or abandons it when dropped unused.
struct Completion<T> {
    state: Arc<CompletionState<T>>,
}

impl<T> Completion<T> {
    fn complete(self, value: T) {
        *self.state.outcome.lock() = Outcome::Done(value);
        self.state.condvar.notify_all();
    }
}

impl<T> Drop for Completion<T> {
    fn drop(&mut self) {
        let mut outcome = self.state.outcome.lock();
        if matches!(*outcome, Outcome::Pending) {
            *outcome = Outcome::Abandoned;
            self.state.condvar.notify_all();
        }
    }
}

struct CompletionWaiter<T> {
    state: Arc<CompletionState<T>>,
}

impl<T> CompletionWaiter<T> {
    fn wait(self) -> Option<T> {
        let mut outcome = self.state.outcome.lock();
        while matches!(*outcome, Outcome::Pending) {
            self.state.condvar.wait(&mut outcome);
        }
        match std::mem::replace(&mut *outcome, Outcome::Abandoned) {
            Outcome::Done(value) => Some(value),
            Outcome::Pending | Outcome::Abandoned => None,
        }
    }
}

fn completion_pair<T>() -> (Completion<T>, CompletionWaiter<T>) {
    let state = Arc::new(CompletionState {
        outcome: Mutex::new(Outcome::Pending),
        condvar: Condvar::new(),
    });
    (
        Completion {
            state: Arc::clone(&state),
        },
        CompletionWaiter { state },
    )
}
