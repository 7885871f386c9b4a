//! Rect: Window geometry primitives in screen coordinates.

use serde::Deserialize;

/// A point in screen coordinates. May be negative on multi-monitor setups.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct Point {
    /// Horizontal position in pixels.
    pub x: i32,
    /// Vertical position in pixels.
    pub y: i32,
}

impl Point {
    /// Create a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const ORIGIN: Self = Self::new(0, 0);
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// A size in pixels.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub struct Size {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Size {
    /// Create a new size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Zero-sized extent.
    pub const ZERO: Self = Self::new(0, 0);

    /// Get the area in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        (self.width as u64) * (self.height as u64)
    }

    /// Check if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Clamp each dimension into the optional `min`/`max` bounds.
    ///
    /// A `max` smaller than `min` on some axis loses to `min`.
    #[must_use]
    pub fn clamp(self, min: Option<Self>, max: Option<Self>) -> Self {
        let mut out = self;
        if let Some(max) = max {
            out.width = out.width.min(max.width);
            out.height = out.height.min(max.height);
        }
        if let Some(min) = min {
            out.width = out.width.max(min.width);
            out.height = out.height.max(min.height);
        }
        out
    }
}

impl std::fmt::Debug for Size {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// A rectangle defined by its top-left corner and size.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    /// Top-left corner.
    pub origin: Point,
    /// Extent.
    pub size: Size,
}

impl Rect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    /// Zero-sized rectangle at the origin.
    pub const ZERO: Self = Self::new(0, 0, 0, 0);

    /// Right edge (exclusive), widened to avoid overflow.
    #[inline]
    pub const fn right(&self) -> i64 {
        self.origin.x as i64 + self.size.width as i64
    }

    /// Bottom edge (exclusive), widened to avoid overflow.
    #[inline]
    pub const fn bottom(&self) -> i64 {
        self.origin.y as i64 + self.size.height as i64
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub const fn contains(&self, point: Point) -> bool {
        let (x, y) = (point.x as i64, point.y as i64);
        x >= self.origin.x as i64 && x < self.right() && y >= self.origin.y as i64 && y < self.bottom()
    }

    /// Check if this rectangle intersects with another.
    #[inline]
    pub const fn intersects(&self, other: &Self) -> bool {
        (self.origin.x as i64) < other.right()
            && self.right() > other.origin.x as i64
            && (self.origin.y as i64) < other.bottom()
            && self.bottom() > other.origin.y as i64
    }
}

impl std::fmt::Debug for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rect({:?} {:?})", self.origin, self.size)
    }
}
