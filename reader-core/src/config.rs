//! Reader configuration.
//!
//! Presentation constants of the annotation pipeline. Everything has a
//! default, so a JSON file only needs the fields it changes.

use serde::{Deserialize, Serialize};

use crate::error::{ReaderError, ReaderResult};
use crate::overlay::Orientation;

/// Minimum crop width/height in page pixels.
pub const DEFAULT_MIN_CROP_SIZE: f32 = 10.0;

/// Corner handle hit-zone size in screen pixels.
pub const DEFAULT_HANDLE_SIZE: f32 = 24.0;

/// Fill used to mark selected regions on an exported card.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HighlightStyle {
    /// Fill color as RGB bytes.
    pub color: [u8; 3],
    /// Fill opacity (0.0 to 1.0).
    pub alpha: f32,
}

impl HighlightStyle {
    /// Color and opacity as RGBA bytes.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn rgba(&self) -> [u8; 4] {
        let alpha = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        [self.color[0], self.color[1], self.color[2], alpha]
    }
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            color: [34, 197, 94],
            alpha: 0.2,
        }
    }
}

/// Configuration for a reader session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Smallest width/height a resize may leave, in page pixels.
    pub min_crop_size: f32,
    /// Separator placed between region texts when rebuilding a sentence.
    pub sentence_join: String,
    /// Text-flow direction of the page.
    pub orientation: Orientation,
    /// Side of each square corner-handle hit zone, in screen pixels.
    pub handle_size: f32,
    /// Highlight painted over selected regions on export.
    pub highlight: HighlightStyle,
    /// Drop the first detection entry (the whole-page aggregate).
    pub skip_aggregate_detection: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            min_crop_size: DEFAULT_MIN_CROP_SIZE,
            sentence_join: " ".to_string(),
            orientation: Orientation::Horizontal,
            handle_size: DEFAULT_HANDLE_SIZE,
            highlight: HighlightStyle::default(),
            skip_aggregate_detection: true,
        }
    }
}

impl ReaderConfig {
    /// Parse and validate a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> ReaderResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ReaderError::InvalidConfig`] naming the first bad field.
    pub fn validate(&self) -> ReaderResult<()> {
        if !(self.min_crop_size.is_finite() && self.min_crop_size > 0.0) {
            return Err(ReaderError::InvalidConfig(format!(
                "min_crop_size must be positive, got {}",
                self.min_crop_size
            )));
        }
        if !(self.handle_size.is_finite() && self.handle_size > 0.0) {
            return Err(ReaderError::InvalidConfig(format!(
                "handle_size must be positive, got {}",
                self.handle_size
            )));
        }
        if !(0.0..=1.0).contains(&self.highlight.alpha) {
            return Err(ReaderError::InvalidConfig(format!(
                "highlight.alpha must be within 0..=1, got {}",
                self.highlight.alpha
            )));
        }
        Ok(())
    }
}
