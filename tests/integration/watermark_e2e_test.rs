//! Watermark End-to-End Integration Tests
//!
//! Tests the complete flow with the default codec:
//!   PNG/JPEG on disk → WatermarkPipeline → JPEG artifact on disk
//!
//! Run with:
//!   cargo test --test integration_tests watermark -- --nocapture

use image::{ImageFormat, Rgba, RgbaImage};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use watermark_my_images::config::LoggingConfig;
use watermark_my_images::watermark::*;

const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

fn init_logging() {
    watermark_my_images::logging::init_subscriber(&LoggingConfig::default());
}

/// Temp dir with `fonts/Arial.otf` copied from a system font, if any.
fn workspace_with_font() -> Option<TempDir> {
    let font = FONT_CANDIDATES.iter().map(Path::new).find(|p| p.is_file())?;
    let dir = TempDir::new().expect("Failed to create temp dir");
    let fonts = dir.path().join("fonts");
    std::fs::create_dir(&fonts).expect("Failed to create fonts dir");
    std::fs::copy(font, fonts.join("Arial.otf")).expect("Failed to copy font");
    Some(dir)
}

fn write_image(dir: &Path, name: &str, width: u32, height: u32, format: ImageFormat) -> PathBuf {
    let img = RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255]));
    let path = dir.join(name);
    image::DynamicImage::ImageRgba8(img)
        .to_rgb8()
        .save_with_format(&path, format)
        .expect("Failed to write test image");
    path
}

fn pipeline(dir: &TempDir) -> WatermarkPipeline {
    WatermarkPipeline::new(Arc::new(ImageCodec::default()), dir.path().join("fonts"))
}

#[test]
fn test_watermark_png_produces_jpeg_artifact() {
    init_logging();
    let Some(dir) = workspace_with_font() else {
        eprintln!("Skipping: no system font available");
        return;
    };
    let source = SourceImage::new(write_image(dir.path(), "sample.png", 850, 400, ImageFormat::Png));

    let artifact = pipeline(&dir)
        .with_sink(Arc::new(TracingSink::new(true)))
        .run(&WatermarkConfig::default(), Some(&source))
        .expect("pipeline should succeed");

    let artifact_path = dir.path().join("sample-watermark-my-images.jpg");
    assert_eq!(artifact.absolute_path, artifact_path.to_string_lossy());
    assert_eq!(
        image::ImageFormat::from_path(&artifact_path).unwrap(),
        ImageFormat::Jpeg
    );

    let output = image::open(&artifact_path).expect("artifact decodes").to_rgba8();
    assert_eq!(output.dimensions(), (850, 400));

    // Black label at 60px inside the centered text box
    let (tw, th) = TextMetrics::compute("WATERMARK", 60).unwrap().canvas_size();
    let pos = position::resolve(&Dimensions::new(850, 400), &Dimensions::new(tw, th), None);
    let dark_in_box = (pos.y..pos.y + th)
        .flat_map(|y| (pos.x..pos.x + tw).map(move |x| (x, y)))
        .filter(|&(x, y)| output.get_pixel(x, y)[0] < 100)
        .count();
    assert!(dark_in_box > 100, "expected glyph pixels, found {}", dark_in_box);

    // Corners stay white
    assert!(output.get_pixel(5, 5)[0] > 200);
    assert!(output.get_pixel(844, 394)[0] > 200);

    // Source untouched
    let untouched = image::open(&source.path).unwrap().to_rgba8();
    assert!(untouched.pixels().all(|p| p[0] == 255));
}

#[test]
fn test_watermark_jpeg_source_with_url() {
    let Some(dir) = workspace_with_font() else {
        eprintln!("Skipping: no system font available");
        return;
    };
    let path = write_image(dir.path(), "photo.jpeg", 640, 480, ImageFormat::Jpeg);
    let source = SourceImage::new(path).with_url("https://example.com/uploads/photo.jpeg?ver=2");

    let config = WatermarkConfig {
        label: "Sample".to_string(),
        background_color: "#333".to_string(),
        background_opacity: 50,
        text_color: "#FFFFFF".to_string(),
        ..Default::default()
    };

    let artifact = pipeline(&dir).run(&config, Some(&source)).unwrap();
    assert_eq!(
        artifact.relative_url,
        "https://example.com/uploads/photo-watermark-my-images.jpg"
    );
    assert!(Path::new(&artifact.absolute_path).is_file());
}

#[test]
fn test_reuse_and_metadata_across_runs() {
    let Some(dir) = workspace_with_font() else {
        eprintln!("Skipping: no system font available");
        return;
    };
    let source = SourceImage::new(write_image(dir.path(), "a.png", 425, 300, ImageFormat::Png))
        .with_id(314);

    let store = Arc::new(MetadataStore::open(dir.path().join("meta.json")).unwrap());
    let sink = FanoutSink::new()
        .with(Arc::new(TracingSink::default()))
        .with(Arc::new(MetadataSink::new(Arc::clone(&store))));
    let pipeline = pipeline(&dir).with_sink(Arc::new(sink));
    let config = WatermarkConfig::default();

    let first = ensure_watermark(&pipeline, &config, &source, false).unwrap();
    assert!(matches!(first, WatermarkOutcome::Created(_)));

    let second = ensure_watermark(&pipeline, &config, &source, false).unwrap();
    assert!(second.is_reused());
    assert_eq!(first.artifact(), second.artifact());

    let entry = store.get("314").expect("metadata recorded");
    assert_eq!(entry.abs, first.artifact().absolute_path);
    assert_eq!(entry.rel, "");

    // Persisted as JSON keyed by attachment id
    let on_disk: serde_json::Value =
        serde_json::from_slice(&std::fs::read(dir.path().join("meta.json")).unwrap()).unwrap();
    assert_eq!(on_disk["314"]["abs"], first.artifact().absolute_path.as_str());
}

#[test]
fn test_corrupt_source_leaves_no_artifact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nthis is not really a png").unwrap();
    let source = SourceImage::new(path);

    let err = pipeline(&dir)
        .run(&WatermarkConfig::default(), Some(&source))
        .unwrap_err();

    assert!(matches!(err, WatermarkError::Image(_)));
    assert!(!source.artifact_path().exists());
}

#[test]
fn test_missing_font_reports_text_error() {
    let dir = TempDir::new().unwrap();
    let source = SourceImage::new(write_image(dir.path(), "a.png", 200, 100, ImageFormat::Png));

    let err = pipeline(&dir)
        .run(&WatermarkConfig::default(), Some(&source))
        .unwrap_err();

    assert!(matches!(err, WatermarkError::Text(_)));
    assert!(!source.artifact_path().exists());
}

#[test]
fn test_parallel_sources_with_rayon() {
    use rayon::prelude::*;

    let Some(dir) = workspace_with_font() else {
        eprintln!("Skipping: no system font available");
        return;
    };
    let sources: Vec<SourceImage> = (0..6)
        .map(|i| {
            SourceImage::new(write_image(
                dir.path(),
                &format!("img{}.png", i),
                300 + i * 50,
                200,
                ImageFormat::Png,
            ))
        })
        .collect();

    let pipeline = pipeline(&dir);
    let config = WatermarkConfig::default();
    let results: Vec<_> = sources
        .par_iter()
        .map(|source| pipeline.run(&config, Some(source)))
        .collect();

    assert!(results.iter().all(|r| r.is_ok()));
    for source in &sources {
        assert!(source.artifact_path().is_file());
    }
}
