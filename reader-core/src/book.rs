//! Ordered page images of one book.

use serde::{Deserialize, Serialize};

/// One encoded page image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// Source name (archive entry or file name).
    pub name: String,
    /// Encoded image bytes, sent as-is to the detection service.
    #[serde(skip)]
    pub bytes: Vec<u8>,
}

impl Page {
    /// Create a page.
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

/// A titled, ordered list of pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Book {
    /// Display title.
    pub title: String,
    /// Pages in reading order.
    pub pages: Vec<Page>,
}

impl Book {
    /// Create a book from pages already in reading order.
    #[must_use]
    pub fn new(title: impl Into<String>, pages: Vec<Page>) -> Self {
        Self {
            title: title.into(),
            pages,
        }
    }

    /// Create a book ordering pages by name, as archive imports do.
    #[must_use]
    pub fn from_unordered(title: impl Into<String>, mut pages: Vec<Page>) -> Self {
        pages.sort_by(|a, b| a.name.cmp(&b.name));
        Self::new(title, pages)
    }

    /// Number of pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether the book has no pages.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Page at `index`.
    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    /// Clamp an index to the valid page range (0 for an empty book).
    #[must_use]
    pub fn clamp_index(&self, index: usize) -> usize {
        index.min(self.pages.len().saturating_sub(1))
    }
}
