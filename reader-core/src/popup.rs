//! The popup shown next to a token selection.

use serde::{Deserialize, Serialize};

use crate::crop::CropRect;
use crate::geometry::Rect;
use crate::selection::TokenLayer;

/// Gap between the selection and the popup, in page pixels.
pub const POPUP_MARGIN: f32 = 5.0;

/// Popup contents derived from the current selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionPopup {
    /// Selected texts in index order, space-joined, trimmed and lower-cased.
    pub default_token: String,
    /// Left edge of the popup.
    pub left: f32,
    /// Top edge of the popup.
    pub top: f32,
    /// Union of the selected regions, used to seed the crop rectangle.
    pub initial_crop_area: CropRect,
}

/// Build the popup for the current selection, or `None` when nothing is selected.
///
/// `container_width`/`container_height` seed the reductions so a selection
/// always pulls the popup and crop area inwards.
#[must_use]
pub fn selection_popup(
    tokens: &TokenLayer,
    container_width: f32,
    container_height: f32,
) -> Option<SelectionPopup> {
    if !tokens.has_selection() {
        return None;
    }

    let mut texts = Vec::with_capacity(tokens.selection_len());
    let mut top = 0.0_f32;
    let mut left = container_width;
    let mut area = Rect::from_edges(container_height, container_width, 0.0, 0.0);

    for region in tokens.selected_regions() {
        let b = region.bounds();
        texts.push(region.text.as_str());

        top = top.max(b.bottom + b.height);
        left = left.min(b.left);
        area = area.union(&b);
    }

    Some(SelectionPopup {
        default_token: texts.join(" ").trim().to_lowercase(),
        left: left + POPUP_MARGIN,
        top: top + POPUP_MARGIN,
        initial_crop_area: CropRect::from(area),
    })
}
