//! Logging facilities for mgui.
//!
//! mgui uses the `tracing` crate for instrumentation. Nothing is printed
//! unless the application installs a subscriber:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("mgui=debug,mgui_core=info")
//!         .init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every subsystem logs under its own target so it can be filtered
//! independently; the names are collected in [`targets`].

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "mgui_core";
    /// Point-to-point event routing.
    pub const EVENT: &str = "mgui_core::event";
    /// Main loop and async task handoff.
    pub const TASK: &str = "mgui_core::task";
    /// Window/document registries.
    pub const REGISTRY: &str = "mgui_core::registry";
    /// Configuration loading.
    pub const CONFIG: &str = "mgui_core::config";

    /// Command and accelerator system.
    pub const COMMAND: &str = "mgui::command";
    /// Native-callback adapter.
    pub const NATIVE: &str = "mgui::native";
    /// View tree state propagation and layout.
    pub const VIEW: &str = "mgui::view";
    /// Windows and the window list.
    pub const WINDOW: &str = "mgui::window";
    /// Application lifecycle and top-level commands.
    pub const APPLICATION: &str = "mgui::application";
    /// Documents, controllers and the saver flow.
    pub const DOCUMENT: &str = "mgui::document";
    /// Menus and resource builders.
    pub const RESOURCE: &str = "mgui::resource";
}

/// Install a formatting subscriber for tests, honouring `RUST_LOG`.
///
/// Calling it more than once is harmless.
#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
