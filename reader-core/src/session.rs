//! Reader session: the single owner of page, token and crop state.
//!
//! All mutation happens here, from one event loop. Detection results are
//! applied atomically through [`ReaderSession::apply_detection`], which also
//! clears the selection, and results for a page that is no longer displayed
//! are dropped.

use serde::{Deserialize, Serialize};

use crate::book::{Book, Page};
use crate::card::{CardDraft, ExportRequest};
use crate::config::ReaderConfig;
use crate::crop::{CropMachine, CropRect};
use crate::detect::TextDetector;
use crate::error::DetectError;
use crate::event::InputEvent;
use crate::overlay::{build_overlay, region_at, OverlayBox};
use crate::popup::{selection_popup, SelectionPopup};
use crate::region::DetectedRegion;
use crate::selection::TokenLayer;
use crate::sentence::reconstruct_sentence;
use crate::viewport::Viewport;

/// Which surface receives input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    /// Browsing: tokens are clickable, the popup follows the selection.
    Default,
    /// A card flow is open and the crop rectangle takes all input.
    Crop,
}

/// Identifies the page a detection request was issued for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DetectionTicket {
    page: usize,
}

impl DetectionTicket {
    /// Page index the request was issued for.
    #[must_use]
    pub fn page(&self) -> usize {
        self.page
    }
}

#[derive(Debug, Clone)]
struct CropFlow {
    machine: CropMachine,
    draft: CardDraft,
}

/// State of one reader view over a book.
#[derive(Debug, Clone)]
pub struct ReaderSession {
    config: ReaderConfig,
    book: Book,
    page: usize,
    tokens: Option<TokenLayer>,
    crop: Option<CropFlow>,
}

impl ReaderSession {
    /// Open a book at its first page.
    #[must_use]
    pub fn new(book: Book, config: ReaderConfig) -> Self {
        Self {
            config,
            book,
            page: 0,
            tokens: None,
            crop: None,
        }
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &ReaderConfig {
        &self.config
    }

    /// The open book.
    #[must_use]
    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Index of the displayed page.
    #[must_use]
    pub fn page_index(&self) -> usize {
        self.page
    }

    /// The displayed page, if the book has any.
    #[must_use]
    pub fn current_page(&self) -> Option<&Page> {
        self.book.page(self.page)
    }

    /// Current view mode.
    #[must_use]
    pub fn view_mode(&self) -> ViewMode {
        if self.crop.is_some() {
            ViewMode::Crop
        } else {
            ViewMode::Default
        }
    }

    // ---------------------------------------------------------------------
    // Navigation
    // ---------------------------------------------------------------------

    /// Show page `index`, clamped to the book.
    ///
    /// Changing page discards the token layer and any open card flow.
    /// Returns the page now displayed.
    pub fn set_page(&mut self, index: usize) -> usize {
        let target = self.book.clamp_index(index);
        if target != self.page {
            tracing::debug!(from = self.page, to = target, "Page changed");
            self.page = target;
            self.tokens = None;
            self.crop = None;
        }
        self.page
    }

    /// Step forward one page.
    pub fn next_page(&mut self) -> usize {
        self.set_page(self.page.saturating_add(1))
    }

    /// Step back one page.
    pub fn prev_page(&mut self) -> usize {
        self.set_page(self.page.saturating_sub(1))
    }

    // ---------------------------------------------------------------------
    // Detection
    // ---------------------------------------------------------------------

    /// Issue a ticket for detecting the displayed page. `None` for an empty book.
    ///
    /// Interactive hosts take a ticket, send the page bytes to the detector
    /// without holding the session, keep routing input and page changes, and
    /// hand the outcome back through [`ReaderSession::apply_detection`].
    #[must_use]
    pub fn begin_detection(&self) -> Option<DetectionTicket> {
        self.current_page().map(|_| DetectionTicket { page: self.page })
    }

    /// Apply a detection outcome.
    ///
    /// Results for a page that is no longer displayed are discarded. A failed
    /// detection installs an empty region list. Returns whether the result was
    /// applied.
    pub fn apply_detection(
        &mut self,
        ticket: DetectionTicket,
        result: Result<Vec<DetectedRegion>, DetectError>,
    ) -> bool {
        if ticket.page != self.page {
            tracing::debug!(
                ticket_page = ticket.page,
                current_page = self.page,
                "Discarding late detection result"
            );
            return false;
        }

        let regions = result.unwrap_or_else(|e| {
            tracing::warn!("Text detection failed for page {}: {e}", ticket.page);
            Vec::new()
        });
        tracing::debug!(page = ticket.page, regions = regions.len(), "Detection applied");

        match self.tokens.as_mut() {
            Some(tokens) => tokens.replace_regions(regions),
            None => self.tokens = Some(TokenLayer::new(regions)),
        }
        true
    }

    /// Detect the displayed page with `detector` and apply the result.
    ///
    /// Holds `&mut self` across the detector call, so nothing else can reach
    /// the session until it returns. Meant for one-shot callers such as the
    /// command-line host; interactive hosts use
    /// [`ReaderSession::begin_detection`] and
    /// [`ReaderSession::apply_detection`] instead.
    ///
    /// Returns whether a result was applied.
    pub async fn detect_current_page(&mut self, detector: &dyn TextDetector) -> bool {
        let Some(ticket) = self.begin_detection() else {
            return false;
        };
        let bytes = self
            .current_page()
            .map(|page| page.bytes.clone())
            .unwrap_or_default();
        let result = detector.detect(&bytes).await;
        self.apply_detection(ticket, result)
    }

    // ---------------------------------------------------------------------
    // Tokens
    // ---------------------------------------------------------------------

    /// Token layer of the displayed page, once detection has run.
    #[must_use]
    pub fn tokens(&self) -> Option<&TokenLayer> {
        self.tokens.as_ref()
    }

    /// Toggle a token. Only the default view accepts token clicks.
    ///
    /// Returns whether the token is selected afterwards.
    pub fn toggle_token(&mut self, index: usize) -> bool {
        if self.view_mode() != ViewMode::Default {
            return false;
        }
        self.tokens
            .as_mut()
            .is_some_and(|tokens| tokens.toggle(index))
    }

    /// Hit-test a screen click against the overlay and toggle the region under it.
    ///
    /// Returns the toggled index.
    pub fn click(&mut self, viewport: &Viewport, x: f32, y: f32) -> Option<usize> {
        if self.view_mode() != ViewMode::Default {
            return None;
        }
        let index = region_at(self.tokens.as_ref()?, viewport, x, y)?;
        self.toggle_token(index);
        Some(index)
    }

    /// Deselect every token.
    pub fn clear_selection(&mut self) {
        if let Some(tokens) = self.tokens.as_mut() {
            tokens.clear();
        }
    }

    /// Overlay boxes for the displayed page (empty before detection).
    #[must_use]
    pub fn overlay(&self) -> Vec<OverlayBox> {
        self.tokens
            .as_ref()
            .map(|tokens| build_overlay(tokens, self.config.orientation))
            .unwrap_or_default()
    }

    /// Popup for the current selection, shown in the default view only.
    #[must_use]
    pub fn popup(&self, container_width: f32, container_height: f32) -> Option<SelectionPopup> {
        if self.view_mode() != ViewMode::Default {
            return None;
        }
        selection_popup(self.tokens.as_ref()?, container_width, container_height)
    }

    // ---------------------------------------------------------------------
    // Card flow
    // ---------------------------------------------------------------------

    /// Open a card flow with a crop seeded from `initial_crop`.
    pub fn init_card_creation(&mut self, draft: CardDraft, initial_crop: CropRect) {
        tracing::debug!(token = %draft.source_text, crop = ?initial_crop, "Card flow started");
        self.crop = Some(CropFlow {
            machine: CropMachine::new(initial_crop, &self.config),
            draft,
        });
    }

    /// Open a card flow from the current selection: the popup's token becomes
    /// the draft text and the selection union seeds the crop.
    ///
    /// Returns `false` when nothing is selected.
    pub fn start_card_from_selection(
        &mut self,
        container_width: f32,
        container_height: f32,
        meta: serde_json::Map<String, serde_json::Value>,
    ) -> bool {
        let Some(popup) = self.popup(container_width, container_height) else {
            return false;
        };
        let draft = CardDraft {
            source_text: popup.default_token,
            source_language: None,
            meta,
        };
        self.init_card_creation(draft, popup.initial_crop_area);
        true
    }

    /// The crop machine of the open card flow.
    #[must_use]
    pub fn crop(&self) -> Option<&CropMachine> {
        self.crop.as_ref().map(|flow| &flow.machine)
    }

    /// The draft of the open card flow.
    #[must_use]
    pub fn draft(&self) -> Option<&CardDraft> {
        self.crop.as_ref().map(|flow| &flow.draft)
    }

    /// Route an input event to the crop rectangle. Ignored outside crop mode.
    pub fn handle_input(&mut self, event: &InputEvent, viewport: &Viewport) -> bool {
        self.crop
            .as_mut()
            .is_some_and(|flow| flow.machine.handle_event(event, viewport))
    }

    /// Close the card flow without exporting. The selection is kept.
    pub fn cancel_crop(&mut self) {
        if self.crop.take().is_some() {
            tracing::debug!("Card flow cancelled");
        }
    }

    /// Sentence under the current crop.
    #[must_use]
    pub fn sentence(&self) -> Option<String> {
        let flow = self.crop.as_ref()?;
        let regions = self.tokens.as_ref().map(TokenLayer::regions).unwrap_or_default();
        Some(reconstruct_sentence(
            &flow.machine.rect(),
            regions,
            &self.config.sentence_join,
        ))
    }

    /// Snapshot everything an export needs, without changing state.
    #[must_use]
    pub fn prepare_export(&self) -> Option<ExportRequest> {
        let flow = self.crop.as_ref()?;
        let highlights = self
            .tokens
            .as_ref()
            .map(|tokens| tokens.selected_regions().map(DetectedRegion::bounds).collect())
            .unwrap_or_default();
        Some(ExportRequest {
            page: self.page,
            crop: flow.machine.rect(),
            highlights,
            sentence: self.sentence().unwrap_or_default(),
            draft: flow.draft.clone(),
        })
    }

    /// Finish an export: close the flow and clear the selection.
    pub fn complete_export(&mut self) {
        self.crop = None;
        self.clear_selection();
    }
}
