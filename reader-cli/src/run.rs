//! One reader run: open, detect, select, crop, export.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use image::DynamicImage;
use reader_core::{
    parse_detection_json, Book, CardDraft, CropRect, Page, ReaderConfig, ReaderSession, Viewport,
};
use reader_renderer::image::to_data_uri;
use reader_renderer::{
    export_card, load_page_image, render_overlay_svg, CardExporter, ImageFormat, OverlayPreview,
};

use crate::{CliConfig, DetectionSource, GestureScript, HttpDetector, JsonCardSink};

/// Fallback container size when the page image cannot be decoded.
const FALLBACK_CONTAINER: (f32, f32) = (800.0, 600.0);

/// What a run did.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Page index that was opened.
    pub page: usize,
    /// Regions detected on the page.
    pub regions: usize,
    /// Regions selected when the card flow opened.
    pub selected: usize,
    /// Gesture events that changed the crop.
    pub gestures_applied: usize,
    /// Final crop rectangle.
    pub crop: CropRect,
    /// Sentence under the final crop.
    pub sentence: String,
    /// Whether a card reached the sink.
    pub exported: bool,
}

/// Execute one run.
///
/// # Errors
///
/// Returns an error if inputs cannot be read, detection has no source,
/// nothing is selected and no token was given, or the sink rejects the card.
pub async fn run(config: CliConfig) -> Result<RunSummary> {
    let reader_config = load_reader_config(config.reader_config.as_deref())?;
    let book = load_book(&config.pages)?;
    tracing::info!(title = %book.title, pages = book.len(), "Book opened");

    let mut session = ReaderSession::new(book, reader_config);
    let page = session.set_page(config.page);

    detect(&mut session, config.detection.as_ref()).await?;
    let regions = session.tokens().map_or(0, reader_core::TokenLayer::len);

    for &index in &config.select {
        if !session.toggle_token(index) {
            tracing::warn!(index, regions, "Selection index ignored");
        }
    }
    let selected = session.tokens().map_or(0, reader_core::TokenLayer::selection_len);

    let page_image = session
        .current_page()
        .and_then(|p| match load_page_image(&p.bytes) {
            Ok(image) => Some(image),
            Err(e) => {
                tracing::warn!(page = %p.name, "{e}");
                None
            }
        });
    let viewport = viewport_for(&config, page_image.as_ref());
    let (page_width, page_height) = viewport.page_extent();

    open_card_flow(&mut session, &config, &viewport)?;

    let gestures_applied = match &config.gestures {
        Some(path) => {
            let json = std::fs::read_to_string(path)
                .with_context(|| format!("reading gesture script {}", path.display()))?;
            let script = GestureScript::from_json(&json)
                .with_context(|| format!("parsing gesture script {}", path.display()))?;
            script.replay(&mut session, &viewport)
        }
        None => 0,
    };

    let crop = session.crop().map(reader_core::CropMachine::rect).unwrap_or_default();
    let sentence = session.sentence().unwrap_or_default();

    if let Some(path) = &config.preview {
        write_preview(&session, path, (page_width, page_height))?;
    }

    let exporter = CardExporter::new(config.export.clone());
    let mut sink = JsonCardSink::new(config.output.as_deref());
    let exported = export_card(&mut session, page_image.as_ref(), &exporter, &mut sink)?;

    Ok(RunSummary {
        page,
        regions,
        selected,
        gestures_applied,
        crop,
        sentence,
        exported,
    })
}

fn load_reader_config(path: Option<&Path>) -> Result<ReaderConfig> {
    let Some(path) = path else {
        return Ok(ReaderConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading reader config {}", path.display()))?;
    let config = ReaderConfig::from_json(&json)
        .with_context(|| format!("invalid reader config {}", path.display()))?;
    tracing::debug!(path = %path.display(), "Reader config loaded");
    Ok(config)
}

/// Read page files, or every page image of a single directory in name order.
fn load_book(paths: &[PathBuf]) -> Result<Book> {
    if let [dir] = paths {
        if dir.is_dir() {
            let mut pages = Vec::new();
            for entry in std::fs::read_dir(dir)
                .with_context(|| format!("listing page directory {}", dir.display()))?
            {
                let path = entry?.path();
                let name = file_name(&path);
                if path.is_file() && ImageFormat::is_page_file(&name) {
                    pages.push(read_page(&path)?);
                }
            }
            if pages.is_empty() {
                bail!("no page images in {}", dir.display());
            }
            return Ok(Book::from_unordered(file_name(dir), pages));
        }
    }

    let pages = paths.iter().map(|p| read_page(p)).collect::<Result<Vec<_>>>()?;
    let title = paths.first().map(|p| file_name(p)).unwrap_or_default();
    Ok(Book::new(title, pages))
}

fn read_page(path: &Path) -> Result<Page> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading page image {}", path.display()))?;
    Ok(Page::new(file_name(path), bytes))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

async fn detect(session: &mut ReaderSession, source: Option<&DetectionSource>) -> Result<()> {
    match source {
        Some(DetectionSource::Service { url, timeout }) => {
            let detector =
                HttpDetector::new(url, *timeout, session.config().skip_aggregate_detection)?;
            tracing::info!(endpoint = %detector.endpoint(), "Detecting text");
            session.detect_current_page(&detector).await;
        }
        Some(DetectionSource::File(path)) => {
            let body = std::fs::read(path)
                .with_context(|| format!("reading detection response {}", path.display()))?;
            let result = parse_detection_json(&body, session.config().skip_aggregate_detection);
            if let Some(ticket) = session.begin_detection() {
                session.apply_detection(ticket, result);
            }
        }
        None => bail!("no detection source: pass --detect-url or --regions"),
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn viewport_for(config: &CliConfig, image: Option<&DynamicImage>) -> Viewport {
    let (default_width, default_height) = image.map_or(FALLBACK_CONTAINER, |img| {
        (img.width() as f32 * config.scale, img.height() as f32 * config.scale)
    });
    let (width, height) = config.container;
    Viewport::new(
        width.unwrap_or(default_width),
        height.unwrap_or(default_height),
        config.scale,
    )
}

/// Open the card flow from the selection, or over the whole page when only
/// a token was given.
fn open_card_flow(
    session: &mut ReaderSession,
    config: &CliConfig,
    viewport: &Viewport,
) -> Result<()> {
    let (page_width, page_height) = viewport.page_extent();

    let (default_token, initial_crop) = match session.popup(page_width, page_height) {
        Some(popup) => (popup.default_token, popup.initial_crop_area),
        None => (
            String::new(),
            CropRect::new(0.0, 0.0, page_height, page_width),
        ),
    };

    let token = config.token.clone().unwrap_or(default_token);
    if token.is_empty() {
        bail!("nothing selected: pass --select or --token");
    }

    let mut draft = match &config.language {
        Some(language) => CardDraft::new(token).with_language(language.as_str()),
        None => CardDraft::new(token),
    };
    draft.meta.clone_from(&config.meta);
    session.init_card_creation(draft, initial_crop);
    Ok(())
}

fn write_preview(session: &ReaderSession, path: &Path, (width, height): (f32, f32)) -> Result<()> {
    let boxes = session.overlay();
    let href = session
        .current_page()
        .map(|p| to_data_uri(&p.bytes, ImageFormat::from_magic_bytes(&p.bytes)));

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let svg = render_overlay_svg(&OverlayPreview {
        width: width.ceil() as u32,
        height: height.ceil() as u32,
        boxes: &boxes,
        crop: session.crop().map(reader_core::CropMachine::rect),
        image_href: href.as_deref(),
        highlight: session.config().highlight,
    });
    std::fs::write(path, svg).with_context(|| format!("writing preview {}", path.display()))?;
    tracing::info!(path = %path.display(), "Preview written");
    Ok(())
}
