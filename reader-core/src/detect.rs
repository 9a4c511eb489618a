//! Text detection collaborator interface and its wire format.
//!
//! The detection service answers with a JSON array of annotations:
//!
//! ```text
//! [
//!   { "locale": "en", "description": "<whole page>", "bounding_poly": { "vertices": [...] } },
//!   { "description": "Hello", "bounding_poly": { "vertices": [{"x": 10, "y": 4}, ...] } },
//!   ...
//! ]
//! ```
//!
//! The first entry is the aggregate annotation covering the whole page and is
//! normally dropped before the regions reach a session.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DetectError;
use crate::geometry::Vertex;
use crate::region::DetectedRegion;

/// Asynchronous text-region detection for one page image.
///
/// All-or-nothing: either a full ordered list or an error.
#[async_trait]
pub trait TextDetector: Send + Sync {
    /// Detect text regions in raw page image bytes.
    ///
    /// # Errors
    ///
    /// Returns a [`DetectError`] if the service cannot be reached or answers
    /// with something other than a list of annotations.
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedRegion>, DetectError>;
}

/// A single annotation as serialized by the detection service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextAnnotation {
    /// Locale hint (usually only set on the aggregate entry).
    #[serde(default)]
    pub locale: String,
    /// Recognized text.
    #[serde(default)]
    pub description: String,
    /// Bounding polygon.
    #[serde(default)]
    pub bounding_poly: BoundingPoly,
}

/// Polygon wrapper used by the detection service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingPoly {
    /// Polygon vertices.
    #[serde(default)]
    pub vertices: Vec<Vertex>,
}

impl From<TextAnnotation> for DetectedRegion {
    fn from(annotation: TextAnnotation) -> Self {
        let locale = (!annotation.locale.is_empty()).then_some(annotation.locale);
        Self {
            text: annotation.description,
            polygon: annotation.bounding_poly.vertices,
            locale,
        }
    }
}

/// Convert service annotations into regions, optionally dropping the aggregate entry.
#[must_use]
pub fn regions_from_annotations(
    annotations: Vec<TextAnnotation>,
    skip_aggregate: bool,
) -> Vec<DetectedRegion> {
    let skip = usize::from(skip_aggregate);
    annotations
        .into_iter()
        .skip(skip)
        .map(DetectedRegion::from)
        .collect()
}

/// Parse a detection service response body.
///
/// # Errors
///
/// Returns [`DetectError::Parse`] if the body is not an annotation array.
pub fn parse_detection_json(
    body: &[u8],
    skip_aggregate: bool,
) -> Result<Vec<DetectedRegion>, DetectError> {
    let annotations: Vec<TextAnnotation> = serde_json::from_slice(body)?;
    Ok(regions_from_annotations(annotations, skip_aggregate))
}
