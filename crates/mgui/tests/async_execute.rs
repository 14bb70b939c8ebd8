//! Cross-thread execution through the application.

use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use mgui::application::Application;
use mgui::backend::HeadlessBackend;
use mgui::error::GuiError;
use mgui_core::{AppConfig, CoreError, is_ui_thread};

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn pump_until(app: &Application, mut done: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !done() {
        assert!(Instant::now() < deadline, "timed out waiting for UI tasks");
        if app.run_pending() == 0 {
            thread::sleep(Duration::from_millis(1));
        }
    }
}

#[test]
fn test_execute_preserves_submission_order() {
    init_logging();
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
    let handle = app.execute_handle().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));

    let worker_seen = Arc::clone(&seen);
    thread::spawn(move || {
        for i in 0..100 {
            let seen = Arc::clone(&worker_seen);
            handle
                .execute(move || {
                    assert!(is_ui_thread());
                    seen.lock().unwrap().push(i);
                })
                .unwrap();
        }
    })
    .join()
    .unwrap();

    pump_until(&app, || seen.lock().unwrap().len() == 100);
    assert_eq!(*seen.lock().unwrap(), (0..100).collect::<Vec<_>>());
}

#[test]
fn test_execute_and_wait_returns_value() {
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
    let handle = app.execute_handle().unwrap();

    let worker = thread::spawn(move || handle.execute_and_wait(is_ui_thread));

    pump_until(&app, || worker.is_finished());
    assert!(worker.join().unwrap().unwrap());
}

#[test]
fn test_wait_abandoned_when_application_drops() {
    init_logging();
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
    let handle = app.execute_handle().unwrap();
    let (started_tx, started_rx) = std::sync::mpsc::channel();

    let worker = thread::spawn(move || {
        started_tx.send(()).unwrap();
        handle.execute_and_wait(|| 1)
    });
    started_rx.recv().unwrap();
    // Give the task time to reach the queue, then shut down without running it.
    thread::sleep(Duration::from_millis(20));
    drop(app);

    assert!(matches!(
        worker.join().unwrap(),
        Err(GuiError::Core(CoreError::MainLoopExited | CoreError::QueueShutDown))
    ));
}

#[test]
fn test_quit_stops_run() {
    let app = Application::new(AppConfig::new(), HeadlessBackend::new()).unwrap();
    let handle = app.execute_handle().unwrap();
    let app_for_task = Rc::downgrade(&app);

    // Tasks from other threads are `Send`; the quit itself is posted locally.
    app.post_local(move || {
        if let Some(app) = app_for_task.upgrade() {
            assert!(app.quit());
        }
    });
    handle.execute(|| {}).unwrap();
    app.run();
    assert!(app.windows().is_empty());
}
