//! Overlay projection: one clickable box per detected region.
//!
//! The overlay has no state of its own. It is rebuilt from the token layer on
//! every render, and clicks are mapped back to region indices.

use serde::{Deserialize, Serialize};

use crate::geometry::Rect;
use crate::selection::TokenLayer;
use crate::viewport::Viewport;

/// Text-flow direction of a page.
///
/// Presentation only: it picks which polygon axis sizes the overlay text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    /// Left-to-right lines (font size follows box height).
    #[default]
    Horizontal,
    /// Top-to-bottom columns (font size follows box width).
    Vertical,
}

/// Visual state of one region in the overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayBox {
    /// Index of the region in the token layer.
    pub index: usize,
    /// Recognized text, laid over the page as a transparent selectable layer.
    pub text: String,
    /// Region bounds in page space.
    pub rect: Rect,
    /// Whether the region is currently selected.
    pub selected: bool,
    /// Font size matching the text-flow axis.
    pub font_size: f32,
    /// Text-flow direction.
    pub orientation: Orientation,
}

impl OverlayBox {
    /// Bounds in screen space under the given viewport.
    #[must_use]
    pub fn screen_rect(&self, viewport: &Viewport) -> Rect {
        viewport.rect_to_screen(&self.rect)
    }
}

/// Project every region of the layer into an overlay box, in detection order.
#[must_use]
pub fn build_overlay(tokens: &TokenLayer, orientation: Orientation) -> Vec<OverlayBox> {
    tokens
        .regions()
        .iter()
        .enumerate()
        .map(|(index, region)| {
            let rect = region.bounds();
            let font_size = match orientation {
                Orientation::Horizontal => rect.height,
                Orientation::Vertical => rect.width,
            };
            OverlayBox {
                index,
                text: region.text.clone(),
                rect,
                selected: tokens.is_selected(index),
                font_size,
                orientation,
            }
        })
        .collect()
}

/// Region under a screen point, if any.
///
/// Later regions are drawn on top, so the last hit wins.
#[must_use]
pub fn region_at(tokens: &TokenLayer, viewport: &Viewport, x: f32, y: f32) -> Option<usize> {
    if !viewport.is_valid() {
        return None;
    }
    let (page_x, page_y) = viewport.to_page(x, y);
    tokens
        .regions()
        .iter()
        .enumerate()
        .rev()
        .find(|(_, region)| region.bounds().contains_point(page_x, page_y))
        .map(|(index, _)| index)
}
