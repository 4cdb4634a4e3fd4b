//! Rectangles and the viewport.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in CSS pixels, shaped like `DOMRect`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub const fn left(&self) -> f64 {
        self.x
    }

    #[inline]
    pub const fn top(&self) -> f64 {
        self.y
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when both dimensions are zero (an element that generates no box).
    pub fn is_empty(&self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }

    /// Inclusive containment of a point.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }

    /// Same size, moved by `(dx, dy)`.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }
}

/// The visible window onto the document.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
    pub scroll_x: f64,
    pub scroll_y: f64,
}

impl Viewport {
    /// A viewport of the given size scrolled to the origin.
    pub const fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
