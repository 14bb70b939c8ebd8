//! Application configuration.
//!
//! An [`AppConfig`] can be built in code with the builder methods or loaded
//! from a TOML document:
//!
//! ```
//! use mgui_core::AppConfig;
//!
//! let config = AppConfig::from_toml_str(r#"
//!     app_id = "org.example.Notes"
//!     app_name = "Notes"
//!
//!     [default_window]
//!     width = 800
//!     height = 600
//! "#).unwrap();
//!
//! assert_eq!(config.app_name, "Notes");
//! assert_eq!(config.default_window.width, 800);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::geometry::Size;
use crate::logging::targets;

/// Default size of newly created windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSize {
    pub width: i32,
    pub height: i32,
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

impl From<WindowSize> for Size {
    fn from(size: WindowSize) -> Self {
        Size::new(size.width, size.height)
    }
}

/// Process-wide application settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Reverse-DNS application identifier.
    pub app_id: String,
    /// Human readable application name, used in alerts and window titles.
    pub app_name: String,
    /// Size given to windows that do not specify one.
    pub default_window: WindowSize,
    /// Start the async execute queue with the application.
    pub async_queue: bool,
    /// Suggested `tracing` filter directive for the host's subscriber.
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: "org.mgui.Application".to_string(),
            app_name: "Application".to_string(),
            default_window: WindowSize::default(),
            async_queue: true,
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the application identifier.
    pub fn app_id(mut self, id: impl Into<String>) -> Self {
        self.app_id = id.into();
        self
    }

    /// Set the application name.
    pub fn app_name(mut self, name: impl Into<String>) -> Self {
        self.app_name = name.into();
        self
    }

    /// Set the default window size.
    pub fn default_window_size(mut self, width: i32, height: i32) -> Self {
        self.default_window = WindowSize { width, height };
        self
    }

    /// Enable or disable the async execute queue.
    pub fn async_queue(mut self, enabled: bool) -> Self {
        self.async_queue = enabled;
        self
    }

    /// Set the suggested log filter.
    pub fn log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Parse and validate a TOML document. Missing keys take defaults.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(source)?;
        config.validate()?;
        tracing::debug!(target: targets::CONFIG, app_id = %config.app_id, "configuration loaded");
        Ok(config)
    }

    /// Check values that deserialization cannot.
    pub fn validate(&self) -> Result<()> {
        if self.app_id.trim().is_empty() {
            return Err(CoreError::ConfigValue {
                key: "app_id",
                reason: "must not be empty".into(),
            });
        }
        if self.default_window.width <= 0 || self.default_window.height <= 0 {
            return Err(CoreError::ConfigValue {
                key: "default_window",
                reason: format!(
                    "size must be positive, got {}x{}",
                    self.default_window.width, self.default_window.height
                ),
            });
        }
        Ok(())
    }
}
