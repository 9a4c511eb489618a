//! Card sink writing export payloads as JSON lines.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use reader_core::{CardExportPayload, CardSink};
use thiserror::Error;

/// Errors raised while storing a card.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Writing the card failed.
    #[error("failed to write card: {0}")]
    Io(#[from] std::io::Error),
    /// Serializing the card failed.
    #[error("failed to serialize card: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where cards go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardTarget {
    /// One JSON document per line on stdout.
    Stdout,
    /// One JSON document per line appended to a file.
    File(PathBuf),
}

/// [`CardSink`] writing each payload as one JSON line.
#[derive(Debug, Clone)]
pub struct JsonCardSink {
    target: CardTarget,
    written: usize,
}

impl JsonCardSink {
    /// Sink for `path`, or stdout when `None`.
    #[must_use]
    pub fn new(path: Option<&Path>) -> Self {
        let target = path.map_or(CardTarget::Stdout, |p| CardTarget::File(p.to_path_buf()));
        Self { target, written: 0 }
    }

    /// Where this sink writes.
    #[must_use]
    pub fn target(&self) -> &CardTarget {
        &self.target
    }

    /// Number of cards written so far.
    #[must_use]
    pub fn written(&self) -> usize {
        self.written
    }
}

impl CardSink for JsonCardSink {
    type Error = SinkError;

    fn create_card(&mut self, payload: CardExportPayload) -> Result<(), Self::Error> {
        let mut line = serde_json::to_vec(&payload)?;
        line.push(b'\n');

        match &self.target {
            CardTarget::Stdout => {
                let mut stdout = std::io::stdout().lock();
                stdout.write_all(&line)?;
                stdout.flush()?;
            }
            CardTarget::File(path) => {
                let mut file = OpenOptions::new().create(true).append(true).open(path)?;
                file.write_all(&line)?;
                tracing::debug!(path = %path.display(), "Card appended");
            }
        }

        self.written += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reader_core::CardDraft;

    fn payload(token: &str) -> CardExportPayload {
        CardExportPayload::new("QUJD".to_string(), "a sentence", &CardDraft::new(token))
    }

    #[test]
    fn appends_one_line_per_card() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("cards.jsonl");
        let mut sink = JsonCardSink::new(Some(&path));

        sink.create_card(payload("first")).expect("write");
        sink.create_card(payload("second")).expect("write");
        assert_eq!(sink.written(), 2);

        let contents = std::fs::read_to_string(&path).expect("read");
        let cards: Vec<CardExportPayload> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("json line"))
            .collect();
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].token, "first");
        assert_eq!(cards[1].sentence(), Some("a sentence"));
    }

    #[test]
    fn missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut sink = JsonCardSink::new(Some(&dir.path().join("nope").join("cards.jsonl")));
        let err = sink.create_card(payload("x")).expect_err("must fail");
        assert!(matches!(err, SinkError::Io(_)));
        assert_eq!(sink.written(), 0);
    }

    #[test]
    fn no_path_means_stdout() {
        assert_eq!(JsonCardSink::new(None).target(), &CardTarget::Stdout);
    }
}
