//! SVG preview of the reader overlay.
//!
//! Draws every overlay box (selected ones filled with the highlight colour)
//! and the crop rectangle in page space, optionally over the page image.
//! Useful for checking detection output and gesture scripts by eye.

use std::fmt::Write;

use reader_core::{CropRect, HighlightStyle, OverlayBox};

/// What to draw in a preview.
#[derive(Debug, Clone, Copy)]
pub struct OverlayPreview<'a> {
    /// Page width in pixels.
    pub width: u32,
    /// Page height in pixels.
    pub height: u32,
    /// Overlay boxes in page space.
    pub boxes: &'a [OverlayBox],
    /// Crop rectangle, when a card flow is open.
    pub crop: Option<CropRect>,
    /// Page image reference (URL or data URI) drawn underneath.
    pub image_href: Option<&'a str>,
    /// Fill for selected boxes.
    pub highlight: HighlightStyle,
}

/// Render the preview as an SVG document.
#[must_use]
pub fn render_overlay_svg(preview: &OverlayPreview<'_>) -> String {
    let (w, h) = (preview.width, preview.height);
    let [r, g, b] = preview.highlight.color;
    let fill = format!("rgb({r},{g},{b})");
    let alpha = preview.highlight.alpha.clamp(0.0, 1.0);

    let mut svg = String::with_capacity(1024 + preview.boxes.len() * 160);
    let _ = write!(
        svg,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{w}\" height=\"{h}\" viewBox=\"0 0 {w} {h}\">"
    );

    if let Some(href) = preview.image_href {
        let _ = write!(
            svg,
            "<image x=\"0\" y=\"0\" width=\"{w}\" height=\"{h}\" href=\"{}\"/>",
            escape_xml(href)
        );
    }

    for overlay in preview.boxes {
        let rect = overlay.rect;
        let style = if overlay.selected {
            format!("fill=\"{fill}\" fill-opacity=\"{alpha}\" stroke=\"{fill}\"")
        } else {
            "fill=\"none\" stroke=\"#888\"".to_string()
        };
        let _ = write!(
            svg,
            "<rect data-index=\"{}\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" {style}><title>{}</title></rect>",
            overlay.index,
            rect.left,
            rect.top,
            rect.width,
            rect.height,
            escape_xml(&overlay.text),
        );
    }

    if let Some(crop) = preview.crop {
        let _ = write!(
            svg,
            "<rect class=\"crop\" x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"none\" stroke=\"#e11d48\" stroke-width=\"2\" stroke-dasharray=\"6 4\"/>",
            crop.left,
            crop.top,
            crop.width(),
            crop.height(),
        );
    }

    svg.push_str("</svg>");
    svg
}

/// Escape special XML characters.
fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}
