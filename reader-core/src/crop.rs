//! Crop rectangle direct manipulation.
//!
//! The rectangle lives in page space. Every pointer sample arrives in screen
//! space and is divided by the live zoom before it touches the rectangle, so
//! the crop stays attached to the page content across zoom changes.
//!
//! ```text
//!            press(body)               release / leave / cancel
//!   Idle ───────────────────▶ Move ───────────────────────────▶ Idle
//!     │      press(corner)
//!     └─────────────────────▶ Resize{Nw,Ne,Se,Sw} ─────────────▶ Idle
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ReaderConfig, DEFAULT_HANDLE_SIZE, DEFAULT_MIN_CROP_SIZE};
use crate::event::{InputEvent, InputNormalizer, PointerAction, PointerSample};
use crate::geometry::{clamp, Rect};
use crate::viewport::Viewport;

/// The crop rectangle, in page pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CropRect {
    /// Top edge.
    pub top: f32,
    /// Left edge.
    pub left: f32,
    /// Bottom edge.
    pub bottom: f32,
    /// Right edge.
    pub right: f32,
}

impl CropRect {
    /// Create a crop rectangle from its edges.
    #[must_use]
    pub const fn new(top: f32, left: f32, bottom: f32, right: f32) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
        }
    }

    /// `right - left`.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    /// `bottom - top`.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    /// As a [`Rect`] with derived extents.
    #[must_use]
    pub fn to_rect(&self) -> Rect {
        Rect::from_edges(self.top, self.left, self.bottom, self.right)
    }

    /// Whether the rectangle lies within `[0, max_width] x [0, max_height]`
    /// with both sides at least `min_size`.
    #[must_use]
    pub fn is_within(&self, max_width: f32, max_height: f32, min_size: f32) -> bool {
        self.left >= 0.0
            && self.top >= 0.0
            && self.right <= max_width
            && self.bottom <= max_height
            && self.width() >= min_size
            && self.height() >= min_size
    }

    /// Order the edges and grow right/bottom until both sides reach `min_size`.
    #[must_use]
    pub fn normalized(&self, min_size: f32) -> Self {
        let (left, right) = (self.left.min(self.right), self.left.max(self.right));
        let (top, bottom) = (self.top.min(self.bottom), self.top.max(self.bottom));
        Self {
            top,
            left,
            bottom: bottom.max(top + min_size),
            right: right.max(left + min_size),
        }
    }

    /// Bring the rectangle inside `[0, max_width] x [0, max_height]`.
    ///
    /// Inverted or undersized rectangles are normalized first. The result
    /// slides when it fits and shrinks to the extent when it does not, so it
    /// only falls below `min_size` when the extent itself is smaller. A
    /// rectangle already inside is returned unchanged.
    #[must_use]
    pub fn constrained(&self, max_width: f32, max_height: f32, min_size: f32) -> Self {
        if self.is_within(max_width, max_height, min_size) {
            return *self;
        }
        let r = self.normalized(min_size);
        let width = r.width().min(max_width);
        let height = r.height().min(max_height);
        let left = clamp(r.left, 0.0, max_width - width);
        let top = clamp(r.top, 0.0, max_height - height);
        Self {
            top,
            left,
            bottom: top + height,
            right: left + width,
        }
    }
}

impl From<Rect> for CropRect {
    fn from(rect: Rect) -> Self {
        Self::new(rect.top, rect.left, rect.bottom, rect.right)
    }
}

/// Active manipulation of the crop rectangle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ManipulationMode {
    /// Nothing grabbed.
    #[default]
    Idle,
    /// Body grabbed; the rectangle translates.
    Move,
    /// North-west corner grabbed.
    ResizeNw,
    /// North-east corner grabbed.
    ResizeNe,
    /// South-east corner grabbed.
    ResizeSe,
    /// South-west corner grabbed.
    ResizeSw,
}

/// Part of the crop rectangle under a pointer-down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HitZone {
    /// Inside the rectangle, away from the handles.
    Body,
    /// North-west corner handle.
    NorthWest,
    /// North-east corner handle.
    NorthEast,
    /// South-east corner handle.
    SouthEast,
    /// South-west corner handle.
    SouthWest,
}

impl HitZone {
    /// Manipulation started by pressing this zone.
    #[must_use]
    pub const fn mode(self) -> ManipulationMode {
        match self {
            Self::Body => ManipulationMode::Move,
            Self::NorthWest => ManipulationMode::ResizeNw,
            Self::NorthEast => ManipulationMode::ResizeNe,
            Self::SouthEast => ManipulationMode::ResizeSe,
            Self::SouthWest => ManipulationMode::ResizeSw,
        }
    }
}

/// Crop rectangle plus its manipulation state.
///
/// Total by construction: every event either updates the rectangle within
/// bounds or is ignored.
#[derive(Debug, Clone)]
pub struct CropMachine {
    rect: CropRect,
    mode: ManipulationMode,
    min_size: f32,
    handle_size: f32,
    input: InputNormalizer,
}

impl CropMachine {
    /// Start an idle machine over `initial`, using the limits from `config`.
    #[must_use]
    pub fn new(initial: CropRect, config: &ReaderConfig) -> Self {
        Self::with_limits(initial, config.min_crop_size, config.handle_size)
    }

    /// Start an idle machine with explicit limits.
    #[must_use]
    pub fn with_limits(initial: CropRect, min_size: f32, handle_size: f32) -> Self {
        let min_size = if min_size > 0.0 { min_size } else { DEFAULT_MIN_CROP_SIZE };
        let handle_size = if handle_size > 0.0 { handle_size } else { DEFAULT_HANDLE_SIZE };
        Self {
            rect: initial.normalized(min_size),
            mode: ManipulationMode::Idle,
            min_size,
            handle_size,
            input: InputNormalizer::new(),
        }
    }

    /// Current rectangle.
    #[must_use]
    pub fn rect(&self) -> CropRect {
        self.rect
    }

    /// Current manipulation mode.
    #[must_use]
    pub fn mode(&self) -> ManipulationMode {
        self.mode
    }

    /// Minimum width/height enforced by resizes.
    #[must_use]
    pub fn min_size(&self) -> f32 {
        self.min_size
    }

    /// Which part of the rectangle a screen point hits.
    ///
    /// Corner handles are squares of `handle_size` screen pixels centred on
    /// the corners and take precedence over the body.
    #[must_use]
    pub fn hit_test(&self, viewport: &Viewport, x: f32, y: f32) -> Option<HitZone> {
        if !viewport.is_valid() {
            return None;
        }
        let screen = viewport.rect_to_screen(&self.rect.to_rect());
        let half = self.handle_size / 2.0;
        let near = |cx: f32, cy: f32| (x - cx).abs() <= half && (y - cy).abs() <= half;

        let corners = [
            (screen.left, screen.top, HitZone::NorthWest),
            (screen.right, screen.top, HitZone::NorthEast),
            (screen.left, screen.bottom, HitZone::SouthWest),
            (screen.right, screen.bottom, HitZone::SouthEast),
        ];
        if let Some(&(_, _, zone)) = corners.iter().find(|(cx, cy, _)| near(*cx, *cy)) {
            return Some(zone);
        }

        screen.contains_point(x, y).then_some(HitZone::Body)
    }

    /// Grab a zone. Only honoured while idle; returns whether the mode changed.
    pub fn press(&mut self, zone: HitZone) -> bool {
        if self.mode != ManipulationMode::Idle {
            return false;
        }
        self.mode = zone.mode();
        tracing::debug!(mode = ?self.mode, "Crop manipulation started");
        true
    }

    /// Let go. Returns whether the machine was manipulating.
    pub fn release(&mut self) -> bool {
        let was_active = self.mode != ManipulationMode::Idle;
        if was_active {
            tracing::debug!(mode = ?self.mode, rect = ?self.rect, "Crop manipulation ended");
        }
        self.mode = ManipulationMode::Idle;
        was_active
    }

    /// Apply one pointer sample under the current zoom.
    ///
    /// Returns whether the rectangle changed. Idle machines, unusable
    /// viewports and non-finite samples are ignored.
    pub fn update(&mut self, sample: &PointerSample, viewport: &Viewport) -> bool {
        if self.mode == ManipulationMode::Idle || !viewport.is_valid() {
            return false;
        }
        if ![sample.x, sample.y, sample.dx, sample.dy]
            .iter()
            .all(|v| v.is_finite())
        {
            return false;
        }

        let (max_width, max_height) = viewport.page_extent();
        let (x, y) = viewport.to_page(sample.x, sample.y);
        let min = self.min_size;
        // A zoom change since the last update may have left the rectangle
        // past the extent; the resize clamps below assume it is inside.
        let r = self.rect.constrained(max_width, max_height, min);

        let next = match self.mode {
            ManipulationMode::Idle => return false,
            ManipulationMode::Move => {
                let (dx, dy) = viewport.delta_to_page(sample.dx, sample.dy);
                slide(r, dx, dy, max_width, max_height)
            }
            ManipulationMode::ResizeNw => CropRect {
                left: clamp(x, 0.0, r.right - min),
                top: clamp(y, 0.0, r.bottom - min),
                ..r
            },
            ManipulationMode::ResizeNe => CropRect {
                right: clamp(x, r.left + min, max_width),
                top: clamp(y, 0.0, r.bottom - min),
                ..r
            },
            ManipulationMode::ResizeSe => CropRect {
                right: clamp(x, r.left + min, max_width),
                bottom: clamp(y, r.top + min, max_height),
                ..r
            },
            ManipulationMode::ResizeSw => CropRect {
                left: clamp(x, 0.0, r.right - min),
                bottom: clamp(y, r.top + min, max_height),
                ..r
            },
        }
        .constrained(max_width, max_height, min);

        let changed = next != self.rect;
        self.rect = next;
        changed
    }

    /// Route a raw input event: press hit-tests, drag updates, release goes idle.
    ///
    /// Returns whether the mode or the rectangle changed.
    pub fn handle_event(&mut self, event: &InputEvent, viewport: &Viewport) -> bool {
        match self.input.normalize(event) {
            Some(PointerAction::Press(sample)) => self
                .hit_test(viewport, sample.x, sample.y)
                .is_some_and(|zone| self.press(zone)),
            Some(PointerAction::Drag(sample)) => self.update(&sample, viewport),
            Some(PointerAction::Release) => self.release(),
            None => false,
        }
    }
}

/// Translate keeping width and height, sliding back inside the extent.
fn slide(r: CropRect, dx: f32, dy: f32, max_width: f32, max_height: f32) -> CropRect {
    let width = r.width();
    let height = r.height();

    let mut next = CropRect {
        top: r.top + dy,
        left: r.left + dx,
        bottom: r.bottom + dy,
        right: r.right + dx,
    };

    if next.left < 0.0 {
        next.left = 0.0;
        next.right = width;
    }
    if next.top < 0.0 {
        next.top = 0.0;
        next.bottom = height;
    }
    if next.right > max_width {
        next.right = max_width;
        next.left = max_width - width;
    }
    if next.bottom > max_height {
        next.bottom = max_height;
        next.top = max_height - height;
    }
    next
}
