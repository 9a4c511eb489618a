//! Detected text regions - the tokens laid over a page.

use serde::{Deserialize, Serialize};

use crate::geometry::{bounds_of, Rect, Vertex};

/// One recognized text span with its bounding polygon.
///
/// Immutable once produced; a new detection replaces the whole list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedRegion {
    /// Recognized content.
    pub text: String,
    /// Polygon in page-pixel coordinates, in service order (not necessarily clockwise).
    pub polygon: Vec<Vertex>,
    /// Locale reported by the service, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
}

impl DetectedRegion {
    /// Create a region from text and a polygon.
    #[must_use]
    pub fn new(text: impl Into<String>, polygon: Vec<Vertex>) -> Self {
        Self {
            text: text.into(),
            polygon,
            locale: None,
        }
    }

    /// Create an axis-aligned region, handy when the polygon is a plain box.
    #[must_use]
    pub fn from_rect(text: impl Into<String>, rect: Rect) -> Self {
        Self::new(
            text,
            vec![
                Vertex::new(rect.left, rect.top),
                Vertex::new(rect.right, rect.top),
                Vertex::new(rect.right, rect.bottom),
                Vertex::new(rect.left, rect.bottom),
            ],
        )
    }

    /// Attach a locale.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = Some(locale.into());
        self
    }

    /// Axis-aligned bounds, derived from the polygon on every call.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        bounds_of(&self.polygon)
    }
}
