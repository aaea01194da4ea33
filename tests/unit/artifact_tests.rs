// Artifact naming unit tests

use rstest::rstest;
use std::path::PathBuf;
use tempfile::TempDir;
use watermark_my_images::watermark::*;

#[rstest]
#[case("/a/b/photo.png", "/a/b/photo-watermark-my-images.jpg")]
#[case("/img/sample.png", "/img/sample-watermark-my-images.jpg")]
#[case(
    "https://example.com/wp-content/uploads/2024/06/beach.jpeg",
    "https://example.com/wp-content/uploads/2024/06/beach-watermark-my-images.jpg"
)]
#[case("relative/dir/shot.webp", "relative/dir/shot-watermark-my-images.jpg")]
fn test_derive_replaces_only_the_basename(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(derive(input), expected);
}

#[rstest]
#[case("/srv/uploads/#drafts/photo.png", "/srv/uploads/#drafts/photo-watermark-my-images.jpg")]
#[case("/img/photo #1.png", "/img/photo #1-watermark-my-images.jpg")]
#[case("/img/what?.png", "/img/what?-watermark-my-images.jpg")]
fn test_artifact_path_keeps_hash_and_question_mark(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(SourceImage::new(input).artifact_path(), PathBuf::from(expected));
    assert_eq!(artifact_for(&SourceImage::new(input)).absolute_path, expected);
}

#[test]
fn test_derive_query_policies() {
    let url = "https://x.com/u/p/img.jpeg?v=2";

    assert_eq!(derive(url), "https://x.com/u/p/img-watermark-my-images.jpg");
    assert_eq!(
        derive_with(url, QueryPolicy::Strip),
        "https://x.com/u/p/img-watermark-my-images.jpg"
    );
    assert_eq!(
        derive_with(url, QueryPolicy::Retain),
        "https://x.com/u/p/img-watermark-my-images.jpg?v=2"
    );
}

#[test]
fn test_derive_is_deterministic() {
    let inputs = ["/a/b/photo.png", "https://x.com/u/p/img.jpeg?v=2", "x"];
    for input in inputs {
        let first = derive(input);
        let second = derive(input);
        assert_eq!(first, second, "derive must be pure for {}", input);
    }
}

#[test]
fn test_double_derivation_is_detectable() {
    let derived = derive("/a/b/photo.png");
    assert!(is_derived(&derived));
    assert_ne!(derive(&derived), derived);
    assert!(derive(&derived).ends_with(&format!("{}{}.jpg", ARTIFACT_SUFFIX, ARTIFACT_SUFFIX)));
}

#[test]
fn test_artifact_for_uses_path_and_url_independently() {
    let source = SourceImage::new("/srv/www/uploads/cat.png")
        .with_url("https://cdn.example.com/uploads/cat.png?ver=3")
        .with_id(99);

    let artifact = artifact_for(&source);
    assert_eq!(artifact.absolute_path, "/srv/www/uploads/cat-watermark-my-images.jpg");
    assert_eq!(
        artifact.relative_url,
        "https://cdn.example.com/uploads/cat-watermark-my-images.jpg"
    );
}

#[test]
fn test_artifact_exists_tracks_file_on_disk() {
    let dir = TempDir::new().unwrap();
    let source = dir.path().join("photo.png");
    std::fs::write(&source, b"png").unwrap();

    assert!(!artifact_exists(&source));
    std::fs::write(SourceImage::new(&source).artifact_path(), b"jpeg").unwrap();
    assert!(artifact_exists(&source));
}

#[test]
fn test_artifact_serializes_with_field_names() {
    let artifact = WatermarkArtifact {
        absolute_path: "/a/p-watermark-my-images.jpg".to_string(),
        relative_url: String::new(),
    };
    let json = serde_json::to_value(&artifact).unwrap();
    assert_eq!(json["absolute_path"], "/a/p-watermark-my-images.jpg");
    assert_eq!(json["relative_url"], "");
}
