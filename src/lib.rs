//! # Casement
//!
//! An actor-per-window bridge between a native event pump and application logic.
//!
//! Every window gets its own logic thread (its actor) with a private inbox.
//! The native message pump stays on one thread and never runs application
//! code: it only translates native callbacks into events and executes the
//! requests actors queue for it.
//!
//! ## Core Concepts
//!
//! - **Window actors**: One thread per window, one event at a time, lifecycle
//!   `Config → Running → Closing → Quit`
//! - **Native loop bridge**: Non-blocking delivery from the pump to inboxes
//! - **Request queue**: Actors ask the pump for native work, woken only when idle
//! - **Error latch**: The first fatal error ends the run and is returned
//!
//! ## Example
//!
//! ```rust
//! use casement::native::headless::HeadlessPlatform;
//! use casement::{AppError, Engine, WindowBehavior, WindowContext};
//!
//! struct OneFrame;
//!
//! impl WindowBehavior for OneFrame {
//!     fn on_update(&mut self, ctx: &mut WindowContext<'_>) -> Result<(), AppError> {
//!         ctx.request_close();
//!         Ok(())
//!     }
//! }
//!
//! let mut platform = HeadlessPlatform::new();
//! Engine::new().run(&mut platform, vec![Box::new(OneFrame)]).unwrap();
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod actor;
pub mod config;
pub mod error;
pub mod ffi;
pub mod geometry;
pub mod native;
pub mod window;

// Re-exports for convenience
pub use actor::{launch, Engine, EngineConfig, Event, EventKind, KeyCode, WindowHandle, WindowState};
pub use config::{load_engine_config, Config};
pub use error::{AppError, ConfigError, EngineError, NativeError, NativeOp};
pub use geometry::{Point, Rect, Size};
pub use native::{NativePlatform, NativeWindowId, NativeWindows, PumpControl};
pub use window::{PropertyDelta, WindowBehavior, WindowContext, WindowProperties, WindowStyle};
