//! Scripted gesture replay.
//!
//! A script is a JSON list of input events, optionally wrapped in an object
//! that also fixes the viewport they were recorded under:
//!
//! ```text
//! { "viewport": { "scale": 2.0, "width": 800, "height": 600 },
//!   "events": [ { "type": "Pointer", "data": { "phase": "down", "x": 120, "y": 120 } }, ... ] }
//! ```

use reader_core::{InputEvent, ReaderSession, Viewport};
use serde::{Deserialize, Serialize};

/// Recorded input events plus the viewport they apply under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GestureScript {
    /// Viewport to replay under; the caller's default when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<Viewport>,
    /// Events in the order they happened.
    pub events: Vec<InputEvent>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Script(GestureScript),
    Events(Vec<InputEvent>),
}

impl GestureScript {
    /// Parse a script, accepting either the object form or a bare event list.
    ///
    /// # Errors
    ///
    /// Returns the JSON error if the text is neither form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(match serde_json::from_str(json)? {
            ScriptFile::Script(script) => script,
            ScriptFile::Events(events) => Self {
                viewport: None,
                events,
            },
        })
    }

    /// Feed every event to the session's crop surface.
    ///
    /// Returns how many events changed the crop state.
    pub fn replay(&self, session: &mut ReaderSession, default_viewport: &Viewport) -> usize {
        let viewport = self.viewport.as_ref().unwrap_or(default_viewport);
        let applied = self
            .events
            .iter()
            .filter(|event| session.handle_input(event, viewport))
            .count();
        tracing::debug!(
            events = self.events.len(),
            applied,
            scale = viewport.scale,
            "Gesture script replayed"
        );
        applied
    }
}
