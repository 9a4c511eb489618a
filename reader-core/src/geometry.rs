//! Axis-aligned geometry over detection polygons.
//!
//! All values are page-space pixels: zoom independent coordinates of the
//! original image.

use serde::{Deserialize, Serialize};

/// A polygon vertex as reported by the detection service.
///
/// The service omits coordinates that are zero, so both fields default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    /// X coordinate (pixels from the left edge of the page).
    #[serde(default)]
    pub x: f32,
    /// Y coordinate (pixels from the top edge of the page).
    #[serde(default)]
    pub y: f32,
}

impl Vertex {
    /// Create a vertex.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle with its derived extents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Smallest y.
    pub top: f32,
    /// Smallest x.
    pub left: f32,
    /// Largest y.
    pub bottom: f32,
    /// Largest x.
    pub right: f32,
    /// `right - left`.
    pub width: f32,
    /// `bottom - top`.
    pub height: f32,
}

impl Rect {
    /// Build a rectangle from its four edges.
    #[must_use]
    pub fn from_edges(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
            width: right - left,
            height: bottom - top,
        }
    }

    /// Build a rectangle from an origin and a size.
    #[must_use]
    pub fn from_xywh(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self::from_edges(y, x, y + height, x + width)
    }

    /// Whether `other` lies entirely inside this rectangle (edges inclusive).
    #[must_use]
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.right <= self.right
            && other.top >= self.top
            && other.bottom <= self.bottom
    }

    /// Whether a point lies inside this rectangle (edges inclusive).
    #[must_use]
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }

    /// Smallest rectangle covering both.
    #[must_use]
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_edges(
            self.top.min(other.top),
            self.left.min(other.left),
            self.bottom.max(other.bottom),
            self.right.max(other.right),
        )
    }

    /// Shift by `(dx, dy)`.
    #[must_use]
    pub fn translate(&self, dx: f32, dy: f32) -> Rect {
        Rect::from_edges(self.top + dy, self.left + dx, self.bottom + dy, self.right + dx)
    }
}

/// Axis-aligned bounds of a polygon.
///
/// Vertex order does not matter. An empty polygon yields the zero rectangle;
/// detection output always carries four vertices.
#[must_use]
pub fn bounds_of(polygon: &[Vertex]) -> Rect {
    let Some(first) = polygon.first() else {
        return Rect::default();
    };

    let (mut top, mut left, mut bottom, mut right) = (first.y, first.x, first.y, first.x);
    for v in &polygon[1..] {
        top = top.min(v.y);
        bottom = bottom.max(v.y);
        left = left.min(v.x);
        right = right.max(v.x);
    }

    Rect::from_edges(top, left, bottom, right)
}

/// `min(max(value, lo), hi)`.
///
/// Unlike [`f32::clamp`] this never panics: when `lo > hi` the upper bound wins.
#[must_use]
pub fn clamp(value: f32, lo: f32, hi: f32) -> f32 {
    value.max(lo).min(hi)
}
