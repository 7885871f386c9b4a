//! Window: Application-facing description and behavior of a window.

mod behavior;
mod properties;

pub use behavior::{WindowBehavior, WindowContext};
pub use properties::{PropertyDelta, WindowProperties, WindowStyle};
