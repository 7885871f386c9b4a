//! Geometry: Screen-space primitives shared by window properties and input events.

mod rect;

pub use rect::{Point, Rect, Size};
