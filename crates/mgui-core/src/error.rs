//! Error types for mgui-core.

use thiserror::Error;

/// The main error type for mgui-core operations.
#[derive(Error, Debug)]
pub enum CoreError {
    /// The main loop has stopped and no longer accepts work.
    #[error("the main loop has already exited")]
    MainLoopExited,

    /// The async task queue has been shut down.
    #[error("the async task queue has been shut down")]
    QueueShutDown,

    /// The async drain thread could not be started.
    #[error("failed to start the async task thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    /// A configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// A configuration value is out of range.
    #[error("invalid configuration value for `{key}`: {reason}")]
    ConfigValue {
        /// The offending key.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// A specialized Result type for mgui-core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
