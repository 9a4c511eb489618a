//! # Page Reader CLI
//!
//! Command-line host for the page reader: opens a book of page images, gets
//! text regions from the detection service (or a saved response), selects
//! tokens, replays a gesture script against the crop rectangle and exports
//! the card.
//!
//! ## Usage
//!
//! ```bash
//! page-reader pages/ --detect-url http://localhost:5000 --select 3,4 --output cards.jsonl
//! ```
//!
//! ## Offline, with a saved detection response and a gesture script:
//!
//! ```bash
//! page-reader p001.jpg --regions p001.json --select 0 --gestures drag.json --preview p001.svg
//! ```
//!
//! ## Architecture
//!
//! - `CliArgs` - Command-line arguments parsed with clap
//! - `CliConfig` - Resolved run configuration
//! - `HttpDetector` - Detection service client implementing `TextDetector`
//! - `GestureScript` - Recorded input events replayed into the session
//! - `JsonCardSink` - Card sink writing JSON lines

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]

mod detect;
mod gestures;
mod run;
mod sink;

pub use detect::{DetectClientError, HttpDetector};
pub use gestures::GestureScript;
pub use run::{run, RunSummary};
pub use sink::{CardTarget, JsonCardSink, SinkError};

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use reader_renderer::{CardImageFormat, ExportConfig};
use serde_json::{Map, Value};

/// Card image encoding accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// JPEG image.
    Jpeg,
    /// PNG image.
    Png,
}

impl From<FormatArg> for CardImageFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Jpeg => Self::Jpeg,
            FormatArg::Png => Self::Png,
        }
    }
}

/// Command-line arguments for page-reader.
#[derive(Debug, Clone, Parser)]
#[command(name = "page-reader")]
#[command(about = "Select text on a scanned page, crop it and export a card")]
#[command(version)]
pub struct CliArgs {
    /// Page image files, or one directory of page images
    #[arg(required = true)]
    pub pages: Vec<PathBuf>,

    /// Page to open (0-based, clamped to the book)
    #[arg(long, default_value = "0")]
    pub page: usize,

    /// Reader configuration file (JSON)
    #[arg(long, env = "PAGE_READER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Detection service root URL (e.g., <http://localhost:5000>)
    #[arg(long, env = "PAGE_READER_DETECT_URL", conflicts_with = "regions")]
    pub detect_url: Option<String>,

    /// Saved detection response (JSON) instead of calling the service
    #[arg(long)]
    pub regions: Option<PathBuf>,

    /// Detection request timeout in seconds
    #[arg(long, env = "PAGE_READER_DETECT_TIMEOUT", default_value = "30")]
    pub timeout_secs: u64,

    /// Region indices to select, comma separated
    #[arg(long, value_delimiter = ',')]
    pub select: Vec<usize>,

    /// Card token (defaults to the selected text)
    #[arg(long)]
    pub token: Option<String>,

    /// Source language of the token
    #[arg(long)]
    pub language: Option<String>,

    /// Extra card metadata as KEY=VALUE (VALUE parsed as JSON when possible)
    #[arg(long, value_parser = parse_meta_entry)]
    pub meta: Vec<(String, Value)>,

    /// Gesture script (JSON) replayed against the crop rectangle
    #[arg(long)]
    pub gestures: Option<PathBuf>,

    /// Container width in screen pixels (defaults to the page width)
    #[arg(long)]
    pub width: Option<f32>,

    /// Container height in screen pixels (defaults to the page height)
    #[arg(long)]
    pub height: Option<f32>,

    /// Zoom level of the replayed view
    #[arg(long, default_value = "1.0")]
    pub scale: f32,

    /// Card image encoding
    #[arg(long, value_enum, default_value = "jpeg")]
    pub format: FormatArg,

    /// JPEG quality (1-100)
    #[arg(long, default_value = "92", value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Append the exported card to this file instead of stdout
    #[arg(long, short = 'o', env = "PAGE_READER_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Write an SVG preview of the overlay and crop to this file
    #[arg(long)]
    pub preview: Option<PathBuf>,
}

/// Parse one `KEY=VALUE` metadata entry.
fn parse_meta_entry(entry: &str) -> Result<(String, Value), String> {
    let (key, raw) = entry
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{entry}`"))?;
    if key.is_empty() {
        return Err(format!("empty key in `{entry}`"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

/// Where detection results come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetectionSource {
    /// Call the detection service rooted at this URL.
    Service {
        /// Service root URL.
        url: String,
        /// Request timeout.
        timeout: Duration,
    },
    /// Read a saved detection response.
    File(PathBuf),
}

/// Resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct CliConfig {
    /// Page files or a single page directory.
    pub pages: Vec<PathBuf>,
    /// Page index to open.
    pub page: usize,
    /// Reader configuration file.
    pub reader_config: Option<PathBuf>,
    /// Detection source, if any was given.
    pub detection: Option<DetectionSource>,
    /// Region indices to select.
    pub select: Vec<usize>,
    /// Card token override.
    pub token: Option<String>,
    /// Source language of the token.
    pub language: Option<String>,
    /// Extra card metadata.
    pub meta: Map<String, Value>,
    /// Gesture script file.
    pub gestures: Option<PathBuf>,
    /// Container size override in screen pixels.
    pub container: (Option<f32>, Option<f32>),
    /// Zoom level of the replayed view.
    pub scale: f32,
    /// Card export settings.
    pub export: ExportConfig,
    /// Card output file (stdout when `None`).
    pub output: Option<PathBuf>,
    /// SVG preview file.
    pub preview: Option<PathBuf>,
}

impl From<CliArgs> for CliConfig {
    fn from(args: CliArgs) -> Self {
        let detection = match (args.detect_url, args.regions) {
            (_, Some(path)) => Some(DetectionSource::File(path)),
            (Some(url), None) => Some(DetectionSource::Service {
                url,
                timeout: Duration::from_secs(args.timeout_secs),
            }),
            (None, None) => None,
        };

        Self {
            pages: args.pages,
            page: args.page,
            reader_config: args.config,
            detection,
            select: args.select,
            token: args.token,
            language: args.language,
            meta: args.meta.into_iter().collect(),
            gestures: args.gestures,
            container: (args.width, args.height),
            scale: args.scale,
            export: ExportConfig {
                format: args.format.into(),
                jpeg_quality: args.quality,
                ..ExportConfig::default()
            },
            output: args.output,
            preview: args.preview,
        }
    }
}
