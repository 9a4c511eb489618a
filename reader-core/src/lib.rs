//! # Page Reader Core
//!
//! Interactive text selection and card cropping over scanned pages.
//! Pure state and geometry; no I/O beyond the [`TextDetector`] seam.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 reader-core                 │
//! ├─────────────────────────────────────────────┤
//! │  Detection       │  Selection               │
//! │  - Wire format   │  - Token layer           │
//! │  - Regions       │  - Overlay projection    │
//! │  - Page guard    │  - Popup anchor          │
//! ├─────────────────────────────────────────────┤
//! │  Crop Machine    │  Card Flow               │
//! │  - Move/resize   │  - Sentence rebuild      │
//! │  - Containment   │  - Export payload        │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! Coordinates are page pixels unless a function says otherwise. Screen
//! positions are mapped through a [`Viewport`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod book;
pub mod card;
pub mod config;
pub mod crop;
pub mod detect;
pub mod error;
pub mod event;
pub mod geometry;
pub mod overlay;
pub mod popup;
pub mod region;
pub mod selection;
pub mod sentence;
pub mod session;
pub mod viewport;

pub use book::{Book, Page};
pub use card::{CardDraft, CardExportPayload, CardSink, CollectedCards, ExportRequest};
pub use config::{HighlightStyle, ReaderConfig};
pub use crop::{CropMachine, CropRect, HitZone, ManipulationMode};
pub use detect::{parse_detection_json, TextAnnotation, TextDetector};
pub use error::{DetectError, ReaderError, ReaderResult};
pub use event::{
    InputEvent, InputNormalizer, PointerAction, PointerPhase, PointerSample, TouchEvent,
    TouchPhase, TouchPoint,
};
pub use geometry::{Rect, Vertex};
pub use overlay::{build_overlay, region_at, Orientation, OverlayBox};
pub use popup::{selection_popup, SelectionPopup};
pub use region::DetectedRegion;
pub use selection::TokenLayer;
pub use sentence::reconstruct_sentence;
pub use session::{DetectionTicket, ReaderSession, ViewMode};
pub use viewport::Viewport;

/// Reader core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
