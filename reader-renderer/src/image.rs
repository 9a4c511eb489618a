//! Page image loading.
//!
//! Pages arrive as encoded bytes (archive entries, files) or as data URIs.
//! Card payloads always carry bare base64, so data-URI prefixes are stripped.

use base64::Engine;
use image::DynamicImage;

use crate::error::{RenderError, RenderResult};

/// Encoded image formats the reader recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// PNG with alpha support.
    Png,
    /// JPEG (no alpha).
    Jpeg,
    /// WebP (alpha support).
    WebP,
    /// Unknown/other format.
    Unknown,
}

impl ImageFormat {
    /// Detect format from file extension.
    #[must_use]
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "png" => Self::Png,
            "jpg" | "jpeg" => Self::Jpeg,
            "webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from MIME type.
    #[must_use]
    pub fn from_mime(mime: &str) -> Self {
        match mime.to_lowercase().as_str() {
            "image/png" => Self::Png,
            "image/jpeg" | "image/jpg" => Self::Jpeg,
            "image/webp" => Self::WebP,
            _ => Self::Unknown,
        }
    }

    /// Detect format from magic bytes.
    #[must_use]
    pub fn from_magic_bytes(data: &[u8]) -> Self {
        if data.len() < 4 {
            return Self::Unknown;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Self::Png;
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Self::Jpeg;
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Self::WebP;
        }

        Self::Unknown
    }

    /// MIME type, if the format is known.
    #[must_use]
    pub fn mime(self) -> Option<&'static str> {
        match self {
            Self::Png => Some("image/png"),
            Self::Jpeg => Some("image/jpeg"),
            Self::WebP => Some("image/webp"),
            Self::Unknown => None,
        }
    }

    /// Whether a file name looks like a page image.
    #[must_use]
    pub fn is_page_file(name: &str) -> bool {
        name.rsplit_once('.')
            .is_some_and(|(_, ext)| Self::from_extension(ext) != Self::Unknown)
    }
}

/// Decode a page image from encoded bytes.
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the bytes are not a decodable image.
pub fn load_page_image(data: &[u8]) -> RenderResult<DynamicImage> {
    let format = ImageFormat::from_magic_bytes(data);
    let img = image::load_from_memory(data)
        .map_err(|e| RenderError::Resource(format!("Failed to decode {format:?} image: {e}")))?;
    tracing::debug!(
        width = img.width(),
        height = img.height(),
        ?format,
        "Page image decoded"
    );
    Ok(img)
}

/// Decode a page image from a base64 data URI (`data:image/png;base64,...`).
///
/// # Errors
///
/// Returns [`RenderError::Resource`] if the URI is malformed, not base64,
/// names a media type other than PNG, JPEG or WebP, or does not hold a
/// decodable image.
pub fn load_page_image_from_data_uri(uri: &str) -> RenderResult<DynamicImage> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| RenderError::Resource("Not a data URI".to_string()))?;
    let (metadata, encoded) = rest
        .split_once(',')
        .ok_or_else(|| RenderError::Resource("Invalid data URI: missing comma".to_string()))?;
    let Some(mime) = metadata.strip_suffix(";base64") else {
        return Err(RenderError::Resource(
            "Only base64 data URIs are supported".to_string(),
        ));
    };
    if ImageFormat::from_mime(mime) == ImageFormat::Unknown {
        return Err(RenderError::Resource(format!(
            "Unsupported page image type: {mime}"
        )));
    }

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| RenderError::Resource(format!("Failed to decode base64: {e}")))?;
    load_page_image(&bytes)
}

/// Build a base64 data URI for encoded image bytes.
#[must_use]
pub fn to_data_uri(bytes: &[u8], format: ImageFormat) -> String {
    let mime = format.mime().unwrap_or("application/octet-stream");
    let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
    format!("data:{mime};base64,{encoded}")
}

/// Strip a `data:...;base64,` prefix, leaving the bare payload.
///
/// Strings without a data-URI prefix are returned unchanged.
#[must_use]
pub fn strip_data_uri_prefix(uri: &str) -> &str {
    match uri.strip_prefix("data:").and_then(|rest| rest.split_once(',')) {
        Some((_, payload)) => payload,
        None => uri,
    }
}
