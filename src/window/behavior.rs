//! The capability set an application implements per window.

use super::properties::{PropertyDelta, WindowProperties};
use crate::actor::{ActorCore, CustomRequest, KeyCode, RequestKind, WindowHandle};
use crate::error::{AppError, EngineError, NativeError};
use crate::geometry::Point;
use crate::native::{NativeWindowId, NativeWindows};

/// Per-window application behavior.
///
/// Every method runs on the window's own actor thread, one at a time, in
/// lifecycle order: `configure`, `on_create`, `on_show`, then input and
/// update callbacks until a close is confirmed, then `on_destroy`.
///
/// Returning an error from any callback closes the window without calling
/// any further callback, and latches the error for the whole engine run.
#[allow(unused_variables)]
pub trait WindowBehavior: Send + 'static {
    /// Describe the window to create.
    fn configure(&mut self, ctx: &mut WindowContext<'_>) -> Result<WindowProperties, AppError> {
        Ok(WindowProperties::default())
    }

    /// The native window exists.
    fn on_create(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
        Ok(())
    }

    /// The native window became visible.
    fn on_show(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
        Ok(())
    }

    /// Geometry or minimized state changed; see [`WindowContext::properties`].
    fn on_resize(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
        Ok(())
    }

    /// A key went down.
    fn on_key_down(
        &mut self,
        ctx: &mut WindowContext<'_>,
        key: KeyCode,
        repeat: u16,
    ) -> Result<(), AppError> {
        Ok(())
    }

    /// A key went up.
    fn on_key_up(&mut self, ctx: &mut WindowContext<'_>, key: KeyCode) -> Result<(), AppError> {
        Ok(())
    }

    /// The cursor moved; the position is also in [`WindowContext::cursor`].
    fn on_mouse_move(&mut self, ctx: &mut WindowContext<'_>, position: Point) -> Result<(), AppError> {
        Ok(())
    }

    /// The wheel turned.
    fn on_wheel(&mut self, ctx: &mut WindowContext<'_>, delta: i16) -> Result<(), AppError> {
        Ok(())
    }

    /// Update and draw a frame.
    fn on_update(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
        Ok(())
    }

    /// The user asked to close the window. Return `false` to keep it open.
    fn on_close(&mut self, ctx: &mut WindowContext<'_>) -> Result<bool, AppError> {
        Ok(true)
    }

    /// The native window is gone. Last callback for this window.
    fn on_destroy(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
        Ok(())
    }
}

/// Access to a window's engine-side state from inside its callbacks.
pub struct WindowContext<'a> {
    core: &'a mut ActorCore,
}

impl<'a> WindowContext<'a> {
    pub(crate) fn new(core: &'a mut ActorCore) -> Self {
        Self { core }
    }

    /// This window's handle.
    pub fn handle(&self) -> WindowHandle {
        self.core.handle
    }

    /// Last-observed properties.
    pub fn properties(&self) -> &WindowProperties {
        &self.core.properties
    }

    /// Last-observed cursor position in client coordinates.
    pub fn cursor(&self) -> Point {
        self.core.cursor
    }

    /// Timestamp of the event being processed, in nanoseconds since engine start.
    pub fn timestamp(&self) -> u64 {
        self.core.timestamp
    }

    /// Check if the engine is winding down.
    pub fn is_shutting_down(&self) -> bool {
        self.core.hub.is_shutting_down()
    }

    /// Whether idle update ticks are synthesized.
    pub fn auto_update(&self) -> bool {
        self.core.auto_update
    }

    /// Turn idle update ticks on or off.
    pub fn set_auto_update(&mut self, auto_update: bool) {
        self.core.auto_update = auto_update;
    }

    /// Ask the platform to change some properties.
    ///
    /// Has no effect before the native window exists.
    pub fn set_properties(&mut self, delta: PropertyDelta) -> Result<(), EngineError> {
        self.core.submit(RequestKind::SetProperties(Box::new(delta)))
    }

    /// Ask for one update tick.
    ///
    /// Coalesced: while a request is outstanding, further calls do nothing.
    /// Also does nothing while auto-update is on. Called from `configure`,
    /// the request is held until the native window exists.
    pub fn request_update(&mut self) -> Result<(), EngineError> {
        self.core.update_wanted = true;
        self.core.submit_wanted_update()
    }

    /// Close the window once this callback returns, as if `on_close` confirmed.
    pub fn request_close(&mut self) {
        self.core.close_requested = true;
    }

    /// Run `task` on the pump thread with this window's native object.
    pub fn run_on_pump<F>(&mut self, task: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut dyn NativeWindows, NativeWindowId) -> Result<(), NativeError> + Send + 'static,
    {
        self.core
            .submit(RequestKind::Custom(CustomRequest::Call(Box::new(task))))
    }
}
