//! Card creation flow data and the export payload handed to the collection store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::crop::CropRect;
use crate::geometry::Rect;

/// What the caller supplies when a card flow starts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardDraft {
    /// The token the card is about (becomes the payload `token`).
    pub source_text: String,
    /// Language of the source text, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    /// Extra fields merged into the payload `meta`.
    #[serde(default)]
    pub meta: Map<String, Value>,
}

impl CardDraft {
    /// Draft for a token with no extra metadata.
    #[must_use]
    pub fn new(source_text: impl Into<String>) -> Self {
        Self {
            source_text: source_text.into(),
            ..Self::default()
        }
    }

    /// Set the source language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.source_language = Some(language.into());
        self
    }

    /// Add one metadata field.
    #[must_use]
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta.insert(key.into(), value.into());
        self
    }
}

/// Everything the renderer needs to produce a card, taken from a finished crop flow.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRequest {
    /// Page the crop belongs to.
    pub page: usize,
    /// Final crop rectangle in page space.
    pub crop: CropRect,
    /// Bounds of the selected regions in page space.
    pub highlights: Vec<Rect>,
    /// Sentence rebuilt from the regions inside the crop.
    pub sentence: String,
    /// The caller's draft.
    pub draft: CardDraft,
}

/// The card handed to the collection store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardExportPayload {
    /// The token the card is about.
    pub token: String,
    /// Encoded card image as bare base64 (no data-URI prefix).
    pub image: String,
    /// `sentence` plus the caller's metadata.
    pub meta: Map<String, Value>,
    /// Language of the token, if the draft named one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
}

impl CardExportPayload {
    /// Assemble a payload.
    ///
    /// `sentence` goes in first and caller fields are spread over it, so a
    /// caller-supplied `sentence` wins.
    #[must_use]
    pub fn new(image: String, sentence: &str, draft: &CardDraft) -> Self {
        let mut meta = Map::new();
        meta.insert("sentence".to_string(), Value::String(sentence.to_string()));
        for (key, value) in &draft.meta {
            meta.insert(key.clone(), value.clone());
        }
        Self {
            token: draft.source_text.clone(),
            image,
            meta,
            source_language: draft.source_language.clone(),
        }
    }

    /// The `meta.sentence` field, if it is a string.
    #[must_use]
    pub fn sentence(&self) -> Option<&str> {
        self.meta.get("sentence").and_then(Value::as_str)
    }
}

/// The external collection store receiving finished cards.
pub trait CardSink {
    /// Error reported when the store rejects a card.
    type Error: std::error::Error;

    /// Hand over one card.
    ///
    /// # Errors
    ///
    /// Returns the store's error if it rejects the card.
    fn create_card(&mut self, payload: CardExportPayload) -> Result<(), Self::Error>;
}

/// In-memory sink that keeps every card it receives.
#[derive(Debug, Clone, Default)]
pub struct CollectedCards {
    cards: Vec<CardExportPayload>,
}

impl CollectedCards {
    /// Create an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cards received so far, oldest first.
    #[must_use]
    pub fn cards(&self) -> &[CardExportPayload] {
        &self.cards
    }
}

impl CardSink for CollectedCards {
    type Error = std::convert::Infallible;

    fn create_card(&mut self, payload: CardExportPayload) -> Result<(), Self::Error> {
        self.cards.push(payload);
        Ok(())
    }
}
