//! # Page Reader Renderer
//!
//! Off-screen rendering for the page reader: decodes page images, rasterizes
//! card snapshots and draws overlay previews.
//!
//! ## Card Export Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │        ReaderSession::prepare_export        │
//! ├─────────────┬─────────────┬─────────────────┤
//! │ Crop page   │ Highlight   │ Encode + base64 │
//! │ (image)     │ (tiny-skia) │ (JPEG / PNG)    │
//! └─────────────┴─────────────┴─────────────────┘
//!                       │
//!                       ▼
//!              CardSink::create_card
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod image;
pub mod preview;

pub use error::{RenderError, RenderResult};
pub use export::{export_card, CardExporter, CardImageFormat, ExportConfig};
pub use crate::image::{
    load_page_image, load_page_image_from_data_uri, strip_data_uri_prefix,
    ImageFormat,
};
pub use preview::{render_overlay_svg, OverlayPreview};

/// Renderer version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
