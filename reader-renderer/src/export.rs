//! Card export: crop the page, paint the selection, encode, hand over.
//!
//! The card image is rasterized off-screen with tiny-skia. The page
//! sub-region is flattened onto the background colour first, so every pixel
//! of the raster is opaque before highlights are painted.

use base64::Engine;
use image::{DynamicImage, ImageEncoder};
use reader_core::geometry::Rect;
use reader_core::{
    CardExportPayload, CardSink, CropRect, ExportRequest, HighlightStyle, ReaderConfig,
    ReaderSession,
};
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};

/// Encoding of the card image.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardImageFormat {
    /// JPEG image.
    #[default]
    Jpeg,
    /// PNG image.
    Png,
}

/// Configuration for card export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Card image encoding.
    pub format: CardImageFormat,
    /// JPEG quality 1-100.
    pub jpeg_quality: u8,
    /// Colour transparent page pixels are flattened onto, as RGB bytes.
    pub background: [u8; 3],
    /// Fill painted over selected regions.
    pub highlight: HighlightStyle,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            format: CardImageFormat::Jpeg,
            jpeg_quality: 92,
            background: [255, 255, 255],
            highlight: HighlightStyle::default(),
        }
    }
}

impl ExportConfig {
    /// Default export settings using the reader's highlight style.
    #[must_use]
    pub fn from_reader(config: &ReaderConfig) -> Self {
        Self {
            highlight: config.highlight,
            ..Self::default()
        }
    }
}

/// Pixel window of a crop on the page: integer origin and size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelWindow {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl PixelWindow {
    /// Outward-rounded pixel window covering `crop`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn covering(crop: &CropRect) -> Self {
        let left = crop.left.max(0.0).floor();
        let top = crop.top.max(0.0).floor();
        let right = crop.right.max(left).ceil();
        let bottom = crop.bottom.max(top).ceil();
        Self {
            x: left as u32,
            y: top as u32,
            width: (right - left) as u32,
            height: (bottom - top) as u32,
        }
    }
}

/// Renders card images and assembles export payloads.
#[derive(Debug, Clone, Default)]
pub struct CardExporter {
    config: ExportConfig,
}

impl CardExporter {
    /// Create a new exporter with the given configuration.
    #[must_use]
    pub fn new(config: ExportConfig) -> Self {
        Self { config }
    }

    /// Create an exporter with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(ExportConfig::default())
    }

    /// Export configuration.
    #[must_use]
    pub fn config(&self) -> &ExportConfig {
        &self.config
    }

    /// Render the card image: the cropped page with each highlight painted
    /// over it, encoded per the configured format.
    ///
    /// Highlights are page-space rectangles; they are translated into
    /// crop-local coordinates before painting.
    ///
    /// The raster covers the crop rounded outward to whole pixels, so a crop
    /// with fractional edges yields an image up to one pixel wider or taller
    /// than `crop.width() x crop.height()`. Parts of that window outside the
    /// page keep the background colour.
    ///
    /// # Errors
    ///
    /// Returns an error if the crop covers no pixels, the raster cannot be
    /// allocated, or encoding fails.
    pub fn render_card_image(
        &self,
        page: &DynamicImage,
        crop: &CropRect,
        highlights: &[Rect],
    ) -> RenderResult<Vec<u8>> {
        let window = PixelWindow::covering(crop);
        if window.width == 0 || window.height == 0 {
            return Err(RenderError::EmptyCrop {
                width: window.width,
                height: window.height,
            });
        }

        let mut pixmap = tiny_skia::Pixmap::new(window.width, window.height).ok_or_else(|| {
            RenderError::Raster(format!(
                "cannot allocate {}x{} raster",
                window.width, window.height
            ))
        })?;

        self.draw_page(&mut pixmap, page, window);
        self.paint_highlights(&mut pixmap, window, highlights);

        match self.config.format {
            CardImageFormat::Png => pixmap
                .encode_png()
                .map_err(|e| RenderError::Encode(format!("PNG encoding failed: {e}"))),
            CardImageFormat::Jpeg => self.encode_jpeg(&pixmap),
        }
    }

    /// Render the card image for `request` and build its payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the card image cannot be rendered.
    pub fn build_payload(
        &self,
        page: &DynamicImage,
        request: &ExportRequest,
    ) -> RenderResult<CardExportPayload> {
        let bytes = self.render_card_image(page, &request.crop, &request.highlights)?;
        let image = base64::engine::general_purpose::STANDARD.encode(bytes);
        Ok(CardExportPayload::new(image, &request.sentence, &request.draft))
    }

    /// Copy the page window into the raster at the origin, flattened onto
    /// the background. Pixels outside the page keep the background.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn draw_page(&self, pixmap: &mut tiny_skia::Pixmap, page: &DynamicImage, window: PixelWindow) {
        let bg = self.config.background;
        let raster_width = window.width as usize;

        for chunk in pixmap.data_mut().chunks_exact_mut(4) {
            chunk.copy_from_slice(&[bg[0], bg[1], bg[2], 255]);
        }

        let sub = page
            .crop_imm(window.x, window.y, window.width, window.height)
            .to_rgba8();
        let data = pixmap.data_mut();
        for (x, y, pixel) in sub.enumerate_pixels() {
            let alpha = f32::from(pixel[3]) / 255.0;
            let inv = 1.0 - alpha;
            let offset = (y as usize * raster_width + x as usize) * 4;
            let channels = data[offset..offset + 3].iter_mut().zip(&pixel.0).zip(&bg);
            for ((out, &channel), &back) in channels {
                *out = f32::from(channel).mul_add(alpha, f32::from(back) * inv) as u8;
            }
        }
    }

    /// Paint each highlight rectangle in crop-local coordinates.
    #[allow(clippy::cast_precision_loss)]
    fn paint_highlights(
        &self,
        pixmap: &mut tiny_skia::Pixmap,
        window: PixelWindow,
        highlights: &[Rect],
    ) {
        let [r, g, b, a] = self.config.highlight.rgba();
        let mut paint = tiny_skia::Paint::default();
        paint.set_color_rgba8(r, g, b, a);
        paint.anti_alias = false;

        let (origin_x, origin_y) = (window.x as f32, window.y as f32);
        for highlight in highlights {
            let local = highlight.translate(-origin_x, -origin_y);
            let Some(rect) =
                tiny_skia::Rect::from_xywh(local.left, local.top, local.width, local.height)
            else {
                tracing::debug!(?highlight, "Skipping degenerate highlight");
                continue;
            };
            pixmap.fill_rect(rect, &paint, tiny_skia::Transform::identity(), None);
        }
    }

    /// Encode an opaque raster as JPEG.
    fn encode_jpeg(&self, pixmap: &tiny_skia::Pixmap) -> RenderResult<Vec<u8>> {
        let (width, height) = (pixmap.width(), pixmap.height());
        let rgb_data: Vec<u8> = pixmap
            .data()
            .chunks_exact(4)
            .flat_map(|pixel| [pixel[0], pixel[1], pixel[2]])
            .collect();

        let mut buf = std::io::Cursor::new(Vec::new());
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, self.config.jpeg_quality);
        encoder
            .write_image(&rgb_data, width, height, image::ColorType::Rgb8.into())
            .map_err(|e| RenderError::Encode(format!("JPEG encoding failed: {e}")))?;

        Ok(buf.into_inner())
    }
}

/// Finish the session's card flow and hand the card to `sink`.
///
/// A missing page image or a render failure abandons the export: it is
/// logged, the session is left unchanged and `Ok(false)` is returned. On
/// success the session returns to the default view with an empty selection
/// before the card reaches the sink.
///
/// # Errors
///
/// Returns the sink's error if it rejects the card.
pub fn export_card<S: CardSink>(
    session: &mut ReaderSession,
    page: Option<&DynamicImage>,
    exporter: &CardExporter,
    sink: &mut S,
) -> Result<bool, S::Error> {
    let Some(request) = session.prepare_export() else {
        tracing::debug!("No card flow open, nothing to export");
        return Ok(false);
    };
    let Some(page) = page else {
        tracing::warn!(page = request.page, "Page image not loaded, export abandoned");
        return Ok(false);
    };

    let payload = match exporter.build_payload(page, &request) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::warn!(page = request.page, "Card export abandoned: {e}");
            return Ok(false);
        }
    };

    session.complete_export();
    tracing::info!(
        page = request.page,
        token = %payload.token,
        sentence = %request.sentence,
        bytes = payload.image.len(),
        "Card exported"
    );
    sink.create_card(payload)?;
    Ok(true)
}
