//! Reader Flow Integration Tests
//!
//! Exercises the public API end to end:
//! - Detection, selection and page changes
//! - Crop manipulation through raw input events
//! - Sentence reconstruction and export requests
//! - Invariants under random input (proptest)

use async_trait::async_trait;
use proptest::prelude::*;
use reader_core::geometry::bounds_of;
use reader_core::sentence::regions_within;
use reader_core::{
    Book, CardDraft, CropMachine, CropRect, DetectError, DetectedRegion, InputEvent,
    ManipulationMode, Page, PointerPhase, ReaderConfig, ReaderSession, Rect, TextDetector,
    TokenLayer, TouchEvent, TouchPhase, Vertex, ViewMode, Viewport,
};

/// Detector answering with one region per page, named after the page bytes.
struct PageEchoDetector;

#[async_trait]
impl TextDetector for PageEchoDetector {
    async fn detect(&self, image: &[u8]) -> Result<Vec<DetectedRegion>, DetectError> {
        let tag = String::from_utf8_lossy(image).into_owned();
        Ok(vec![
            DetectedRegion::from_rect(format!("{tag}-a"), Rect::from_xywh(10.0, 10.0, 30.0, 10.0)),
            DetectedRegion::from_rect(format!("{tag}-b"), Rect::from_xywh(50.0, 10.0, 30.0, 10.0)),
            DetectedRegion::from_rect(format!("{tag}-c"), Rect::from_xywh(90.0, 10.0, 30.0, 10.0)),
        ])
    }
}

/// Detector that always fails.
struct DownDetector;

#[async_trait]
impl TextDetector for DownDetector {
    async fn detect(&self, _image: &[u8]) -> Result<Vec<DetectedRegion>, DetectError> {
        Err(DetectError::Transport("connection refused".to_string()))
    }
}

fn two_page_book() -> Book {
    Book::new(
        "vol1",
        vec![
            Page::new("p1", b"one".to_vec()),
            Page::new("p2", b"two".to_vec()),
        ],
    )
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

// ============================================================================
// Sentence Reconstruction
// ============================================================================

#[test]
fn test_single_region_exactly_bounded() {
    let bounds = Rect::from_xywh(20.0, 30.0, 16.0, 16.0);
    let regions = vec![DetectedRegion::from_rect("好", bounds)];
    let sentence = reader_core::reconstruct_sentence(&CropRect::from(bounds), &regions, "");
    assert_eq!(sentence, "好");
}

#[test]
fn test_empty_crop_still_exports_empty_sentence() {
    let mut session = ReaderSession::new(two_page_book(), ReaderConfig::default());
    let ticket = session.begin_detection().expect("ticket");
    session.apply_detection(
        ticket,
        Ok(vec![DetectedRegion::from_rect(
            "far away",
            Rect::from_xywh(400.0, 400.0, 20.0, 10.0),
        )]),
    );
    session.init_card_creation(CardDraft::new("x"), CropRect::new(0.0, 0.0, 50.0, 50.0));

    let request = session.prepare_export().expect("request");
    assert_eq!(request.sentence, "");
    assert!(request.highlights.is_empty());
}

// ============================================================================
// Crop Manipulation
// ============================================================================

#[test]
fn test_resize_se_divides_screen_delta_by_scale() {
    let initial = CropRect::new(10.0, 10.0, 60.0, 60.0);
    let mut crop = CropMachine::new(initial, &ReaderConfig::default());
    let viewport = Viewport::new(800.0, 800.0, 2.0);

    // SE corner sits at (120, 120) on screen.
    assert!(crop.handle_event(&InputEvent::pointer(PointerPhase::Down, 120.0, 120.0), &viewport));
    assert!(crop.handle_event(&InputEvent::pointer_move(160.0, 140.0, 40.0, 20.0), &viewport));
    crop.handle_event(&InputEvent::pointer(PointerPhase::Up, 160.0, 140.0), &viewport);

    let rect = crop.rect();
    assert!(approx(rect.right, 80.0));
    assert!(approx(rect.bottom, 70.0));
    assert!(approx(rect.left, 10.0));
    assert!(approx(rect.top, 10.0));
}

#[test]
fn test_move_past_left_edge_pins_to_zero() {
    let initial = CropRect::new(40.0, 10.0, 90.0, 110.0);
    let mut crop = CropMachine::new(initial, &ReaderConfig::default());
    let viewport = Viewport::new(800.0, 600.0, 1.0);
    let width_before = crop.rect().width();

    crop.handle_event(&InputEvent::pointer(PointerPhase::Down, 60.0, 60.0), &viewport);
    crop.handle_event(&InputEvent::pointer_move(45.0, 60.0, -15.0, 0.0), &viewport);

    let rect = crop.rect();
    assert!(approx(rect.left, 0.0));
    assert!(approx(rect.width(), width_before));
}

#[test]
fn test_crop_input_routed_through_session() {
    let mut session = ReaderSession::new(two_page_book(), ReaderConfig::default());
    session.init_card_creation(CardDraft::new("x"), CropRect::new(100.0, 100.0, 200.0, 200.0));
    let viewport = Viewport::new(800.0, 600.0, 1.0);

    session.handle_input(&InputEvent::pointer(PointerPhase::Down, 150.0, 150.0), &viewport);
    session.handle_input(&InputEvent::pointer_move(170.0, 160.0, 20.0, 10.0), &viewport);
    session.handle_input(&InputEvent::pointer(PointerPhase::Up, 170.0, 160.0), &viewport);

    assert_eq!(
        session.crop().map(CropMachine::rect),
        Some(CropRect::new(110.0, 120.0, 210.0, 220.0))
    );
}

// ============================================================================
// Detection and Page Changes
// ============================================================================

#[test]
fn test_new_page_detection_clears_selection() {
    let mut session = ReaderSession::new(two_page_book(), ReaderConfig::default());
    let first = session.begin_detection().expect("ticket");
    session.apply_detection(
        first,
        Ok((0..3)
            .map(|i| {
                DetectedRegion::from_rect(format!("w{i}"), Rect::from_xywh(0.0, 0.0, 5.0, 5.0))
            })
            .collect()),
    );
    assert!(session.toggle_token(2));

    session.set_page(1);
    let second = session.begin_detection().expect("ticket");
    session.apply_detection(second, Ok(vec![DetectedRegion::from_rect("x", Rect::default())]));

    let tokens = session.tokens().expect("tokens");
    assert!(!tokens.has_selection());
}

#[tokio::test]
async fn test_detect_current_page_uses_page_bytes() {
    let mut session = ReaderSession::new(two_page_book(), ReaderConfig::default());
    assert!(session.detect_current_page(&PageEchoDetector).await);
    assert_eq!(session.tokens().map(TokenLayer::len), Some(3));
    assert_eq!(session.tokens().expect("tokens").regions()[0].text, "one-a");

    session.next_page();
    assert!(session.detect_current_page(&PageEchoDetector).await);
    assert_eq!(session.tokens().expect("tokens").regions()[0].text, "two-a");
}

#[tokio::test]
async fn test_result_for_previous_page_is_dropped() {
    let mut session = ReaderSession::new(two_page_book(), ReaderConfig::default());
    let ticket = session.begin_detection().expect("ticket");
    let stale = PageEchoDetector.detect(b"one").await;

    session.next_page();
    assert!(!session.apply_detection(ticket, stale));
    assert!(session.tokens().is_none());
}

#[tokio::test]
async fn test_failed_detection_shows_no_tokens() {
    let mut session = ReaderSession::new(two_page_book(), ReaderConfig::default());
    assert!(session.detect_current_page(&DownDetector).await);
    assert!(session.tokens().is_some_and(TokenLayer::is_empty));
}

#[tokio::test]
async fn test_selection_to_export_request() {
    let mut session = ReaderSession::new(two_page_book(), ReaderConfig::default());
    session.detect_current_page(&PageEchoDetector).await;
    session.toggle_token(1);
    session.toggle_token(0);

    let popup = session.popup(800.0, 600.0).expect("popup");
    assert_eq!(popup.default_token, "one-a one-b");
    assert_eq!(popup.initial_crop_area, CropRect::new(10.0, 10.0, 20.0, 80.0));

    let meta = serde_json::Map::from_iter([("deck".to_string(), serde_json::json!("core"))]);
    assert!(session.start_card_from_selection(800.0, 600.0, meta));
    assert_eq!(session.view_mode(), ViewMode::Crop);

    let request = session.prepare_export().expect("request");
    assert_eq!(request.sentence, "one-a one-b");
    assert_eq!(request.highlights.len(), 2);
    assert_eq!(request.draft.source_text, "one-a one-b");
    assert_eq!(request.draft.meta["deck"], "core");
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug, Clone)]
enum Gesture {
    Down(f32, f32),
    Move(f32, f32),
    Up,
    TouchStart(f32, f32),
    TouchMove(f32, f32),
    TouchEnd,
    Zoom(f32),
}

fn gesture() -> impl Strategy<Value = Gesture> {
    prop_oneof![
        (0.0f32..800.0, 0.0f32..600.0).prop_map(|(x, y)| Gesture::Down(x, y)),
        (-200.0f32..1000.0, -200.0f32..800.0).prop_map(|(x, y)| Gesture::Move(x, y)),
        Just(Gesture::Up),
        (0.0f32..800.0, 0.0f32..600.0).prop_map(|(x, y)| Gesture::TouchStart(x, y)),
        (-200.0f32..1000.0, -200.0f32..800.0).prop_map(|(x, y)| Gesture::TouchMove(x, y)),
        Just(Gesture::TouchEnd),
        (0.25f32..4.0).prop_map(Gesture::Zoom),
    ]
}

fn word_box(index: usize, (x, y, w, h): (f32, f32, f32, f32)) -> DetectedRegion {
    DetectedRegion::from_rect(format!("w{index}"), Rect::from_xywh(x, y, w, h))
}

proptest! {
    #[test]
    fn bounds_enclose_every_vertex(
        points in prop::collection::vec((-500.0f32..500.0, -500.0f32..500.0), 1..12),
    ) {
        let polygon: Vec<Vertex> = points.iter().map(|&(x, y)| Vertex::new(x, y)).collect();
        let bounds = bounds_of(&polygon);
        prop_assert!(bounds.top <= bounds.bottom);
        prop_assert!(bounds.left <= bounds.right);
        for v in &polygon {
            prop_assert!(bounds.contains_point(v.x, v.y));
        }
    }

    #[test]
    fn toggle_twice_restores_selection(
        count in 1usize..20,
        picks in prop::collection::vec(0usize..25, 0..10),
        index in 0usize..25,
    ) {
        let regions = (0..count)
            .map(|i| {
                DetectedRegion::from_rect(format!("t{i}"), Rect::from_xywh(0.0, 0.0, 1.0, 1.0))
            })
            .collect();
        let mut tokens = TokenLayer::new(regions);
        for pick in picks {
            tokens.toggle(pick);
        }
        let before: Vec<usize> = tokens.selected_indices().collect();
        tokens.toggle(index);
        tokens.toggle(index);
        let after: Vec<usize> = tokens.selected_indices().collect();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn replacing_regions_clears_selection(picks in prop::collection::vec(0usize..5, 0..5)) {
        let make = || {
            (0..5)
                .map(|i| DetectedRegion::from_rect(format!("r{i}"), Rect::default()))
                .collect()
        };
        let mut tokens = TokenLayer::new(make());
        for pick in picks {
            tokens.toggle(pick);
        }
        tokens.replace_regions(make());
        prop_assert!(!tokens.has_selection());
    }

    #[test]
    fn crop_stays_inside_and_above_min_size(
        scale in 0.25f32..4.0,
        gestures in prop::collection::vec(gesture(), 0..60),
    ) {
        let mut viewport = Viewport::new(800.0, 600.0, scale);
        let initial = CropRect::new(50.0, 50.0, 150.0, 200.0);
        let mut crop = CropMachine::new(initial, &ReaderConfig::default());
        let mut last = (0.0f32, 0.0f32);

        for g in gestures {
            let dragging = crop.mode() != ManipulationMode::Idle;
            let (event, is_drag) = match g {
                Gesture::Down(x, y) => {
                    last = (x, y);
                    (InputEvent::pointer(PointerPhase::Down, x, y), false)
                }
                Gesture::Move(x, y) => {
                    let event = InputEvent::pointer_move(x, y, x - last.0, y - last.1);
                    last = (x, y);
                    (event, true)
                }
                Gesture::Up => (InputEvent::pointer(PointerPhase::Up, last.0, last.1), false),
                Gesture::TouchStart(x, y) => {
                    last = (x, y);
                    (InputEvent::Touch(TouchEvent::single(TouchPhase::Start, x, y)), false)
                }
                Gesture::TouchMove(x, y) => {
                    last = (x, y);
                    (InputEvent::Touch(TouchEvent::single(TouchPhase::Move, x, y)), true)
                }
                Gesture::TouchEnd => {
                    (InputEvent::Touch(TouchEvent::new(TouchPhase::End, vec![])), false)
                }
                Gesture::Zoom(s) => {
                    viewport.scale = s;
                    continue;
                }
            };
            crop.handle_event(&event, &viewport);

            let r = crop.rect();
            prop_assert!(r.width() >= crop.min_size() - 1e-3, "width of {:?}", r);
            prop_assert!(r.height() >= crop.min_size() - 1e-3, "height of {:?}", r);

            // Zoom alone never touches the rectangle; the next drag pulls it back.
            if dragging && is_drag {
                let (max_w, max_h) = viewport.page_extent();
                prop_assert!(r.left >= -1e-3 && r.top >= -1e-3, "{:?}", r);
                prop_assert!(r.right <= max_w + 1e-3 && r.bottom <= max_h + 1e-3, "{:?}", r);
            }
        }
    }

    #[test]
    fn move_preserves_size(dx in -1000.0f32..1000.0, dy in -1000.0f32..1000.0) {
        let viewport = Viewport::new(800.0, 600.0, 1.0);
        let initial = CropRect::new(100.0, 100.0, 180.0, 260.0);
        let mut crop = CropMachine::new(initial, &ReaderConfig::default());
        crop.handle_event(&InputEvent::pointer(PointerPhase::Down, 150.0, 150.0), &viewport);
        crop.handle_event(&InputEvent::pointer_move(150.0 + dx, 150.0 + dy, dx, dy), &viewport);
        let r = crop.rect();
        prop_assert!((r.width() - 160.0).abs() < 1e-2);
        prop_assert!((r.height() - 80.0).abs() < 1e-2);
    }

    #[test]
    fn shrinking_crop_never_adds_regions(
        boxes in prop::collection::vec(
            (0.0f32..400.0, 0.0f32..400.0, 1.0f32..60.0, 1.0f32..30.0),
            0..20,
        ),
        crop in (0.0f32..200.0, 0.0f32..200.0, 20.0f32..300.0, 20.0f32..300.0),
        insets in (0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0, 0.0f32..1.0),
    ) {
        let regions: Vec<DetectedRegion> =
            boxes.iter().enumerate().map(|(i, &b)| word_box(i, b)).collect();
        let (top, left, width, height) = crop;
        let outer = CropRect::new(top, left, top + height, left + width);
        // Each inset takes at most half the side, so the inner edges stay ordered.
        let inner = CropRect::new(
            outer.top + insets.0 * height / 2.0,
            outer.left + insets.1 * width / 2.0,
            outer.bottom - insets.2 * height / 2.0,
            outer.right - insets.3 * width / 2.0,
        );

        let within = |c: &CropRect| -> Vec<&str> {
            regions_within(c, &regions).map(|r| r.text.as_str()).collect()
        };
        let kept = within(&outer);
        for region in within(&inner) {
            prop_assert!(kept.contains(&region));
        }
    }

    #[test]
    fn full_page_crop_keeps_every_word(words in prop::collection::vec("[a-z]{1,8}", 1..10)) {
        let regions: Vec<DetectedRegion> = words
            .iter()
            .enumerate()
            .map(|(i, w)| {
                #[allow(clippy::cast_precision_loss)]
                let x = i as f32 * 20.0;
                DetectedRegion::from_rect(w.clone(), Rect::from_xywh(x, 0.0, 15.0, 10.0))
            })
            .collect();
        let crop = CropRect::new(0.0, 0.0, 20.0, 400.0);
        let sentence = reader_core::reconstruct_sentence(&crop, &regions, " ");
        prop_assert_eq!(sentence, words.join(" "));
    }
}
