//! Window properties: What the application asks for and what the platform reports.

use crate::geometry::{Point, Rect, Size};
use bitflags::bitflags;
use serde::Deserialize;

bitflags! {
    /// Window style flags.
    ///
    /// These can be combined using bitwise OR.
    ///
    /// # Example
    /// ```
    /// use casement::WindowStyle;
    /// let style = WindowStyle::RESIZABLE | WindowStyle::DECORATED;
    /// assert!(!style.contains(WindowStyle::FULLSCREEN));
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
    #[serde(transparent)]
    pub struct WindowStyle: u32 {
        /// The user may resize the window.
        const RESIZABLE = 0b0000_0001;
        /// Title bar and border are drawn.
        const DECORATED = 0b0000_0010;
        /// The window covers its monitor.
        const FULLSCREEN = 0b0000_0100;
        /// The window stays above non-topmost windows.
        const TOPMOST = 0b0000_1000;
    }
}

impl Default for WindowStyle {
    fn default() -> Self {
        Self::RESIZABLE | Self::DECORATED
    }
}

/// Full description of a window.
///
/// Returned by [`WindowBehavior::configure`](super::WindowBehavior::configure)
/// and carried as a snapshot by `created` and `resized` events.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WindowProperties {
    /// Title bar text.
    pub title: String,
    /// Top-left corner in screen coordinates.
    pub position: Point,
    /// Client-area size.
    pub size: Size,
    /// Smallest size the user may resize to.
    pub min_size: Option<Size>,
    /// Largest size the user may resize to.
    pub max_size: Option<Size>,
    /// Style flags.
    pub style: WindowStyle,
    /// Whether the window is minimized.
    pub minimized: bool,
    /// Synthesize update ticks whenever the actor is idle.
    pub auto_update: bool,
}

impl Default for WindowProperties {
    fn default() -> Self {
        Self {
            title: String::from("casement"),
            position: Point::new(50, 50),
            size: Size::new(640, 480),
            min_size: None,
            max_size: None,
            style: WindowStyle::default(),
            minimized: false,
            auto_update: true,
        }
    }
}

impl WindowProperties {
    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the position.
    #[must_use]
    pub const fn with_position(mut self, x: i32, y: i32) -> Self {
        self.position = Point::new(x, y);
        self
    }

    /// Set the client-area size.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    /// Set the resize bounds.
    #[must_use]
    pub const fn with_bounds(mut self, min: Option<Size>, max: Option<Size>) -> Self {
        self.min_size = min;
        self.max_size = max;
        self
    }

    /// Set the style flags.
    #[must_use]
    pub const fn with_style(mut self, style: WindowStyle) -> Self {
        self.style = style;
        self
    }

    /// Enable or disable idle update ticks.
    #[must_use]
    pub const fn with_auto_update(mut self, auto_update: bool) -> Self {
        self.auto_update = auto_update;
        self
    }

    /// Check if the window covers its monitor.
    pub const fn is_fullscreen(&self) -> bool {
        self.style.contains(WindowStyle::FULLSCREEN)
    }

    /// Window frame in screen coordinates.
    pub const fn frame(&self) -> Rect {
        Rect {
            origin: self.position,
            size: self.size,
        }
    }

    /// Client area in client coordinates.
    pub const fn client_rect(&self) -> Rect {
        Rect {
            origin: Point::ORIGIN,
            size: self.size,
        }
    }

    /// Size clamped into the configured bounds.
    pub fn clamped_size(&self, size: Size) -> Size {
        size.clamp(self.min_size, self.max_size)
    }

    /// Apply a delta, clamping the resulting size into the bounds.
    ///
    /// Returns `true` if position, size or minimized state changed.
    pub fn apply(&mut self, delta: &PropertyDelta) -> bool {
        let before = (self.position, self.size, self.minimized);

        if let Some(title) = &delta.title {
            self.title.clone_from(title);
        }
        if let Some(position) = delta.position {
            self.position = position;
        }
        if let Some(bounds) = delta.min_size {
            self.min_size = bounds;
        }
        if let Some(bounds) = delta.max_size {
            self.max_size = bounds;
        }
        if let Some(size) = delta.size {
            self.size = size;
        }
        if let Some(style) = delta.style {
            self.style = style;
        }
        if let Some(minimized) = delta.minimized {
            self.minimized = minimized;
        }
        self.size = self.clamped_size(self.size);

        before != (self.position, self.size, self.minimized)
    }
}

/// A partial property change; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyDelta {
    /// New title.
    pub title: Option<String>,
    /// New position.
    pub position: Option<Point>,
    /// New client-area size.
    pub size: Option<Size>,
    /// New lower bound (`Some(None)` removes it).
    pub min_size: Option<Option<Size>>,
    /// New upper bound (`Some(None)` removes it).
    pub max_size: Option<Option<Size>>,
    /// New style flags.
    pub style: Option<WindowStyle>,
    /// Minimize or restore.
    pub minimized: Option<bool>,
}

impl PropertyDelta {
    /// Change the title.
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Move the window.
    #[must_use]
    pub const fn position(mut self, x: i32, y: i32) -> Self {
        self.position = Some(Point::new(x, y));
        self
    }

    /// Resize the client area.
    #[must_use]
    pub const fn size(mut self, width: u32, height: u32) -> Self {
        self.size = Some(Size::new(width, height));
        self
    }

    /// Replace the style flags.
    #[must_use]
    pub const fn style(mut self, style: WindowStyle) -> Self {
        self.style = Some(style);
        self
    }

    /// Minimize or restore.
    #[must_use]
    pub const fn minimized(mut self, minimized: bool) -> Self {
        self.minimized = Some(minimized);
        self
    }

    /// Check if the delta changes nothing.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
