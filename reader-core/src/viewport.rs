//! Pan/zoom transform between screen space and page space.
//!
//! The viewport is owned by an external pan-zoom component; the reader only
//! reads it. Screen coordinates are `page * scale + offset`.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;

/// Snapshot of the live pan/zoom transform and the container it renders into.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current zoom level (1.0 = 100%).
    pub scale: f32,
    /// Screen x of the page origin (pan offset).
    #[serde(default)]
    pub offset_x: f32,
    /// Screen y of the page origin (pan offset).
    #[serde(default)]
    pub offset_y: f32,
    /// Container width in screen pixels.
    pub width: f32,
    /// Container height in screen pixels.
    pub height: f32,
}

impl Viewport {
    /// Unpanned viewport at the given zoom.
    #[must_use]
    pub fn new(width: f32, height: f32, scale: f32) -> Self {
        Self {
            scale,
            offset_x: 0.0,
            offset_y: 0.0,
            width,
            height,
        }
    }

    /// Set the pan offset.
    #[must_use]
    pub fn with_offset(mut self, offset_x: f32, offset_y: f32) -> Self {
        self.offset_x = offset_x;
        self.offset_y = offset_y;
        self
    }

    /// A usable transform has a finite, positive scale.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.scale.is_finite() && self.scale > 0.0
    }

    /// Screen point to page point.
    #[must_use]
    pub fn to_page(&self, x: f32, y: f32) -> (f32, f32) {
        ((x - self.offset_x) / self.scale, (y - self.offset_y) / self.scale)
    }

    /// Screen delta to page delta (pan does not apply).
    #[must_use]
    pub fn delta_to_page(&self, dx: f32, dy: f32) -> (f32, f32) {
        (dx / self.scale, dy / self.scale)
    }

    /// Page rectangle to screen rectangle.
    #[must_use]
    pub fn rect_to_screen(&self, rect: &Rect) -> Rect {
        Rect::from_edges(
            rect.top * self.scale + self.offset_y,
            rect.left * self.scale + self.offset_x,
            rect.bottom * self.scale + self.offset_y,
            rect.right * self.scale + self.offset_x,
        )
    }

    /// Container extent expressed in page space: `(width / scale, height / scale)`.
    #[must_use]
    pub fn page_extent(&self) -> (f32, f32) {
        (self.width / self.scale, self.height / self.scale)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(800.0, 600.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_page_removes_pan_and_zoom() {
        let vp = Viewport::new(800.0, 600.0, 2.0).with_offset(100.0, 50.0);
        let (x, y) = vp.to_page(300.0, 250.0);
        assert!((x - 100.0).abs() < f32::EPSILON);
        assert!((y - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rect_to_screen_inverts_to_page() {
        let vp = Viewport::new(800.0, 600.0, 1.5).with_offset(-20.0, 10.0);
        let rect = Rect::from_edges(10.0, 20.0, 30.0, 60.0);
        let screen = vp.rect_to_screen(&rect);
        let (left, top) = vp.to_page(screen.left, screen.top);
        assert!((left - rect.left).abs() < 1e-4);
        assert!((top - rect.top).abs() < 1e-4);
    }

    #[test]
    fn test_validity() {
        assert!(Viewport::default().is_valid());
        assert!(!Viewport::new(1.0, 1.0, 0.0).is_valid());
        assert!(!Viewport::new(1.0, 1.0, -1.0).is_valid());
        assert!(!Viewport::new(1.0, 1.0, f32::NAN).is_valid());
        assert!(!Viewport::new(1.0, 1.0, f32::INFINITY).is_valid());
    }

    #[test]
    fn test_page_extent_divides_by_scale() {
        let (w, h) = Viewport::new(800.0, 600.0, 2.0).page_extent();
        assert!((w - 400.0).abs() < f32::EPSILON);
        assert!((h - 300.0).abs() < f32::EPSILON);
    }
}
