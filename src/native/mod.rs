//! Native platform interfaces.
//!
//! The platform layer owns the real OS windows and the message pump. It is
//! split along the thread boundary:
//!
//! - [`PumpControl`] may be called from any thread (wake, quit).
//! - [`NativeWindows`] is only touched on the pump thread.
//! - [`NativePlatform`] runs the pump, calling into the
//!   [`NativeLoopBridge`] for every native callback.

pub mod headless;

use crate::actor::{NativeLoopBridge, WindowHandle};
use crate::error::NativeError;
use crate::window::{PropertyDelta, WindowProperties};
use std::sync::Arc;

/// Opaque platform identifier of a native window.
///
/// Only the bridge holds these; actors see [`WindowHandle`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NativeWindowId(pub u64);

/// Thread-safe controls of the native message pump.
pub trait PumpControl: Send + Sync {
    /// Wake the pump so it drains the request queue.
    fn wake(&self) -> Result<(), NativeError>;

    /// Ask the pump to return from [`NativePlatform::run_pump`].
    ///
    /// May be called before the pump starts; the quit must then take effect
    /// as soon as it does.
    fn post_quit(&self) -> Result<(), NativeError>;
}

/// Window operations, valid only on the pump thread.
pub trait NativeWindows {
    /// Create a hidden window for `handle`.
    fn create_window(
        &mut self,
        handle: WindowHandle,
        properties: &WindowProperties,
    ) -> Result<NativeWindowId, NativeError>;

    /// Make a window visible.
    fn show_window(&mut self, id: NativeWindowId) -> Result<(), NativeError>;

    /// Apply a property change.
    fn set_properties(&mut self, id: NativeWindowId, delta: &PropertyDelta) -> Result<(), NativeError>;

    /// Destroy a window. The id is dead afterwards.
    fn destroy_window(&mut self, id: NativeWindowId) -> Result<(), NativeError>;

    /// Schedule a redraw callback ([`NativeLoopBridge::on_redraw`]).
    fn request_redraw(&mut self, id: NativeWindowId) -> Result<(), NativeError>;
}

/// A native platform: its controls, its windows, and its message pump.
pub trait NativePlatform {
    /// Controls usable from actor threads.
    fn control(&self) -> Arc<dyn PumpControl>;

    /// Run the message pump on the calling thread until a quit is posted.
    ///
    /// Every native callback is forwarded to `bridge`; wake messages call
    /// [`NativeLoopBridge::on_wake`] with this platform's windows.
    fn run_pump(&mut self, bridge: &mut NativeLoopBridge) -> Result<(), NativeError>;

    /// Window operations, for teardown after the pump has returned.
    fn windows(&mut self) -> &mut dyn NativeWindows;
}
