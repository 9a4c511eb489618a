//! End-to-end runs of the page reader against files on disk and a mocked
//! detection service.

use std::path::{Path, PathBuf};
use std::time::Duration;

use base64::Engine;
use image::{Rgba, RgbaImage};
use reader_cli::{run, CliConfig, DetectionSource};
use reader_core::{CardExportPayload, CropRect};
use reader_renderer::{CardImageFormat, ExportConfig};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn detection_body() -> serde_json::Value {
    let poly = |l: i32, t: i32, r: i32, b: i32| {
        json!({
            "vertices": [{"x": l, "y": t}, {"x": r, "y": t}, {"x": r, "y": b}, {"x": l, "y": b}]
        })
    };
    json!([
        { "locale": "en", "description": "Hello world!", "bounding_poly": poly(10, 10, 128, 30) },
        { "description": "Hello", "bounding_poly": poly(10, 10, 60, 30) },
        { "description": "world", "bounding_poly": poly(70, 10, 120, 30) },
        { "description": "!", "bounding_poly": poly(122, 10, 128, 30) }
    ])
}

fn write_page(dir: &Path) -> PathBuf {
    let path = dir.join("p001.png");
    RgbaImage::from_pixel(200, 100, Rgba([255, 255, 255, 255]))
        .save(&path)
        .expect("write page");
    path
}

fn base_config(dir: &Path, detection: DetectionSource) -> CliConfig {
    CliConfig {
        pages: vec![write_page(dir)],
        page: 0,
        reader_config: None,
        detection: Some(detection),
        select: vec![0, 1],
        token: None,
        language: None,
        meta: serde_json::Map::new(),
        gestures: None,
        container: (None, None),
        scale: 1.0,
        export: ExportConfig {
            format: CardImageFormat::Png,
            ..ExportConfig::default()
        },
        output: Some(dir.join("cards.jsonl")),
        preview: None,
    }
}

fn read_cards(path: &Path) -> Vec<CardExportPayload> {
    std::fs::read_to_string(path)
        .expect("cards file")
        .lines()
        .map(|line| serde_json::from_str(line).expect("card json"))
        .collect()
}

#[tokio::test]
async fn offline_run_with_gestures_exports_card() {
    let dir = tempfile::tempdir().expect("tempdir");
    let regions = dir.path().join("p001.json");
    std::fs::write(&regions, detection_body().to_string()).expect("write regions");

    // Drag the SE corner from (120, 30) to (140, 40) to take in the "!".
    let gestures = dir.path().join("drag.json");
    std::fs::write(
        &gestures,
        json!([
            { "type": "Pointer", "data": { "phase": "down", "x": 120, "y": 30 } },
            { "type": "Pointer", "data": { "phase": "move", "x": 140, "y": 40, "movement_x": 20, "movement_y": 10 } },
            { "type": "Pointer", "data": { "phase": "up", "x": 140, "y": 40 } }
        ])
        .to_string(),
    )
    .expect("write gestures");

    let mut config = base_config(dir.path(), DetectionSource::File(regions));
    config.gestures = Some(gestures);
    config.preview = Some(dir.path().join("preview.svg"));
    config.meta.insert("deck".to_string(), json!("core"));
    let output = config.output.clone().expect("output");

    let summary = run(config).await.expect("run");
    assert_eq!(summary.regions, 3);
    assert_eq!(summary.selected, 2);
    assert_eq!(summary.gestures_applied, 3);
    assert_eq!(summary.crop, CropRect::new(10.0, 10.0, 40.0, 140.0));
    assert_eq!(summary.sentence, "hello world!");
    assert!(summary.exported);

    let cards = read_cards(&output);
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].token, "hello world");
    assert_eq!(cards[0].sentence(), Some("hello world!"));
    assert_eq!(cards[0].meta["deck"], "core");

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&cards[0].image)
        .expect("base64");
    let card = image::load_from_memory(&bytes).expect("png");
    assert_eq!((card.width(), card.height()), (130, 30));

    let svg = std::fs::read_to_string(dir.path().join("preview.svg")).expect("preview");
    assert!(svg.contains("class=\"crop\""));
    assert!(svg.contains("data:image/png;base64,"));
}

#[tokio::test]
#[cfg_attr(
    target_os = "macos",
    ignore = "wiremock/reqwest system-configuration issue on macOS"
)]
async fn service_run_uses_detection_endpoint() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/detect-texts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detection_body()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = base_config(
        dir.path(),
        DetectionSource::Service {
            url: server.uri(),
            timeout: Duration::from_secs(5),
        },
    );
    config.select = vec![1];
    config.token = Some("World".to_string());
    config.language = Some("en".to_string());
    let output = config.output.clone().expect("output");

    let summary = run(config).await.expect("run");
    assert!(summary.exported);
    assert_eq!(summary.sentence, "world");

    let cards = read_cards(&output);
    assert_eq!(cards[0].token, "World");
    assert_eq!(cards[0].source_language.as_deref(), Some("en"));
}

#[tokio::test]
async fn failed_detection_with_token_crops_whole_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    let regions = dir.path().join("broken.json");
    std::fs::write(&regions, "{not json").expect("write");

    let mut config = base_config(dir.path(), DetectionSource::File(regions));
    config.select = vec![0];
    config.token = Some("page".to_string());

    let summary = run(config).await.expect("run");
    assert_eq!(summary.regions, 0);
    assert_eq!(summary.selected, 0);
    assert_eq!(summary.crop, CropRect::new(0.0, 0.0, 100.0, 200.0));
    assert_eq!(summary.sentence, "");
    assert!(summary.exported);
}

#[tokio::test]
async fn nothing_selected_and_no_token_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let regions = dir.path().join("p001.json");
    std::fs::write(&regions, detection_body().to_string()).expect("write");

    let mut config = base_config(dir.path(), DetectionSource::File(regions));
    config.select.clear();

    let err = run(config).await.expect_err("must fail");
    assert!(err.to_string().contains("nothing selected"));
}

#[tokio::test]
async fn missing_detection_source_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut config = base_config(dir.path(), DetectionSource::File(PathBuf::new()));
    config.detection = None;

    let err = run(config).await.expect_err("must fail");
    assert!(err.to_string().contains("no detection source"));
}

#[tokio::test]
async fn page_directory_is_read_in_name_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let pages = dir.path().join("book");
    std::fs::create_dir(&pages).expect("mkdir");
    for name in ["b.png", "a.png"] {
        RgbaImage::from_pixel(50, 40, Rgba([0, 0, 0, 255]))
            .save(pages.join(name))
            .expect("write page");
    }
    std::fs::write(pages.join("notes.txt"), "skip me").expect("write");
    let regions = dir.path().join("r.json");
    std::fs::write(&regions, "[]").expect("write");

    let mut config = base_config(dir.path(), DetectionSource::File(regions));
    config.pages = vec![pages];
    config.page = 9;
    config.select.clear();
    config.token = Some("x".to_string());

    let summary = run(config).await.expect("run");
    assert_eq!(summary.page, 1);
    assert_eq!(summary.crop, CropRect::new(0.0, 0.0, 40.0, 50.0));
}
