//! Window configuration and builder.

use mgui_core::{Point, Rect, Size};

/// Options for creating a [`Window`](super::Window).
///
/// # Example
///
/// ```
/// use mgui::window::WindowConfig;
/// use mgui_core::Rect;
///
/// let config = WindowConfig::new("Inspector")
///     .with_frame(Rect::new(40, 40, 320, 480))
///     .with_resizable(false)
///     .with_visible(true);
/// assert_eq!(config.title(), "Inspector");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    title: String,
    /// Screen frame. `None` uses the application's default size.
    frame: Option<Rect>,
    resizable: bool,
    /// Modal windows block input to the rest of the application.
    modal: bool,
    /// Show the window as soon as it is created.
    visible: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self::new("")
    }
}

impl WindowConfig {
    /// Create a window configuration with the given title.
    ///
    /// Windows are resizable, not modal and hidden by default.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            frame: None,
            resizable: true,
            modal: false,
            visible: false,
        }
    }

    /// Set the screen frame.
    pub fn with_frame(mut self, frame: Rect) -> Self {
        self.frame = Some(frame);
        self
    }

    /// Set the size, keeping (or defaulting) the position.
    pub fn with_size(mut self, width: i32, height: i32) -> Self {
        let origin = self.frame.map_or(Point::ZERO, |f| f.origin());
        self.frame = Some(Rect::from_origin_size(origin, Size::new(width, height)));
        self
    }

    pub fn with_resizable(mut self, resizable: bool) -> Self {
        self.resizable = resizable;
        self
    }

    pub fn with_modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    /// Show the window on creation instead of waiting for
    /// [`Window::show`](super::Window::show).
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn frame(&self) -> Option<Rect> {
        self.frame
    }

    pub fn is_resizable(&self) -> bool {
        self.resizable
    }

    pub fn is_modal(&self) -> bool {
        self.modal
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// This config with its frame filled in from `default_size` if unset.
    pub(crate) fn resolved(mut self, default_size: Size) -> Self {
        if self.frame.is_none() {
            self.frame = Some(Rect::from_origin_size(Point::ZERO, default_size));
        }
        self
    }
}
