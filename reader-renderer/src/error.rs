//! Renderer error types.

use thiserror::Error;

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Errors that can occur while producing a card image.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The page image could not be read or decoded.
    #[error("Failed to load resource: {0}")]
    Resource(String),

    /// The crop rectangle does not cover any pixel of the page.
    #[error("Crop area is empty ({width}x{height})")]
    EmptyCrop {
        /// Requested width in pixels.
        width: u32,
        /// Requested height in pixels.
        height: u32,
    },

    /// The off-screen raster could not be allocated.
    #[error("Raster allocation failed: {0}")]
    Raster(String),

    /// Encoding the card image failed.
    #[error("Encoding failed: {0}")]
    Encode(String),
}
