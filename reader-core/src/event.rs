//! Input events for crop manipulation.
//!
//! Mouse and touch streams are normalized into [`PointerAction`]s carrying a
//! single [`PointerSample`] type, so the crop machine has one update path.

use serde::{Deserialize, Serialize};

/// Phase of a touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TouchPhase {
    /// Touch started (finger down).
    Start,
    /// Touch moved (finger dragging).
    Move,
    /// Touch ended (finger up).
    End,
    /// Touch cancelled (e.g., palm rejection).
    Cancel,
}

/// A single touch point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    /// Touch identifier (for multi-touch).
    pub id: u32,
    /// X position in screen coordinates.
    pub x: f32,
    /// Y position in screen coordinates.
    pub y: f32,
}

/// A touch event with zero or more touch points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TouchEvent {
    /// Phase of this touch event.
    pub phase: TouchPhase,
    /// All current touch points.
    #[serde(default)]
    pub touches: Vec<TouchPoint>,
}

impl TouchEvent {
    /// Create a new touch event.
    #[must_use]
    pub fn new(phase: TouchPhase, touches: Vec<TouchPoint>) -> Self {
        Self { phase, touches }
    }

    /// Single-finger event at a point.
    #[must_use]
    pub fn single(phase: TouchPhase, x: f32, y: f32) -> Self {
        Self::new(phase, vec![TouchPoint { id: 0, x, y }])
    }

    /// Get the primary (first) touch point.
    #[must_use]
    pub fn primary_touch(&self) -> Option<&TouchPoint> {
        self.touches.first()
    }

    /// Check if this is a multi-touch event.
    #[must_use]
    pub fn is_multi_touch(&self) -> bool {
        self.touches.len() > 1
    }
}

/// Phase of a mouse/pen pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    /// Button pressed.
    Down,
    /// Pointer moved.
    Move,
    /// Button released.
    Up,
    /// Pointer left the container.
    Leave,
}

/// All input events the crop surface can receive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum InputEvent {
    /// Pointer (mouse) event.
    Pointer {
        /// Event phase.
        phase: PointerPhase,
        /// X position in screen coordinates.
        x: f32,
        /// Y position in screen coordinates.
        y: f32,
        /// Horizontal movement since the previous pointer event.
        #[serde(default)]
        movement_x: f32,
        /// Vertical movement since the previous pointer event.
        #[serde(default)]
        movement_y: f32,
    },

    /// Raw touch event.
    Touch(TouchEvent),
}

impl InputEvent {
    /// Pointer event without movement data.
    #[must_use]
    pub fn pointer(phase: PointerPhase, x: f32, y: f32) -> Self {
        Self::Pointer {
            phase,
            x,
            y,
            movement_x: 0.0,
            movement_y: 0.0,
        }
    }

    /// Pointer move with an explicit movement delta.
    #[must_use]
    pub fn pointer_move(x: f32, y: f32, movement_x: f32, movement_y: f32) -> Self {
        Self::Pointer {
            phase: PointerPhase::Move,
            x,
            y,
            movement_x,
            movement_y,
        }
    }
}

/// Position and movement of the active pointer, in screen space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    /// Absolute x in screen coordinates.
    pub x: f32,
    /// Absolute y in screen coordinates.
    pub y: f32,
    /// Movement along x since the previous sample.
    pub dx: f32,
    /// Movement along y since the previous sample.
    pub dy: f32,
}

impl PointerSample {
    /// Sample at rest at a position.
    #[must_use]
    pub const fn at(x: f32, y: f32) -> Self {
        Self { x, y, dx: 0.0, dy: 0.0 }
    }
}

/// What an input event means for the crop surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerAction {
    /// Pointer or finger went down.
    Press(PointerSample),
    /// Pointer or finger moved.
    Drag(PointerSample),
    /// Pointer released, left the container, or the touch was cancelled.
    Release,
}

/// Turns raw mouse and touch events into [`PointerAction`]s.
///
/// Mouse events carry their own movement; touch movement is derived from the
/// previous touch position of the current gesture. Starts and moves with more
/// than one finger are left to the host's pinch zoom and produce no action.
#[derive(Debug, Clone, Default)]
pub struct InputNormalizer {
    last_touch: Option<(f32, f32)>,
}

impl InputNormalizer {
    /// Create a normalizer with no gesture in progress.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one event. Returns `None` for events that carry no usable
    /// coordinate (e.g. a touch move without touch points) and for
    /// multi-finger touches.
    pub fn normalize(&mut self, event: &InputEvent) -> Option<PointerAction> {
        match event {
            InputEvent::Pointer {
                phase,
                x,
                y,
                movement_x,
                movement_y,
            } => match phase {
                PointerPhase::Down => Some(PointerAction::Press(PointerSample::at(*x, *y))),
                PointerPhase::Move => Some(PointerAction::Drag(PointerSample {
                    x: *x,
                    y: *y,
                    dx: *movement_x,
                    dy: *movement_y,
                })),
                PointerPhase::Up | PointerPhase::Leave => Some(PointerAction::Release),
            },
            InputEvent::Touch(touch) => self.normalize_touch(touch),
        }
    }

    fn normalize_touch(&mut self, touch: &TouchEvent) -> Option<PointerAction> {
        match touch.phase {
            TouchPhase::Start | TouchPhase::Move if touch.is_multi_touch() => None,
            TouchPhase::Start => {
                let primary = touch.primary_touch()?;
                self.last_touch = Some((primary.x, primary.y));
                Some(PointerAction::Press(PointerSample::at(primary.x, primary.y)))
            }
            TouchPhase::Move => {
                let primary = touch.primary_touch()?;
                let (last_x, last_y) = self.last_touch.unwrap_or((primary.x, primary.y));
                self.last_touch = Some((primary.x, primary.y));
                Some(PointerAction::Drag(PointerSample {
                    x: primary.x,
                    y: primary.y,
                    dx: primary.x - last_x,
                    dy: primary.y - last_y,
                }))
            }
            TouchPhase::End | TouchPhase::Cancel => {
                self.last_touch = None;
                Some(PointerAction::Release)
            }
        }
    }
}
