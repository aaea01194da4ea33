//! Artifact naming and lookup.
//!
//! A watermarked copy lives next to its source as
//! `<stem>-watermark-my-images.jpg`. Filesystem paths go through
//! [`derive_path`], which treats `?` and `#` as ordinary characters. Public
//! URLs go through [`derive`], which drops a trailing query or fragment.
//!
//! ```
//! use watermark_my_images::watermark::artifact::{derive, derive_with, QueryPolicy};
//!
//! assert_eq!(derive("/a/b/photo.png"), "/a/b/photo-watermark-my-images.jpg");
//! assert_eq!(
//!     derive_with("https://x.com/u/p/img.jpeg?v=2", QueryPolicy::Retain),
//!     "https://x.com/u/p/img-watermark-my-images.jpg?v=2"
//! );
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::pipeline::SourceImage;

/// Appended to the source stem to form the artifact name.
pub const ARTIFACT_SUFFIX: &str = "-watermark-my-images";

/// Artifacts are always JPEG.
pub const ARTIFACT_EXTENSION: &str = "jpg";

/// What [`derive_with`] does with a trailing `?query` or `#fragment`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryPolicy {
    /// Drop them (the behavior of [`derive`])
    #[default]
    Strip,
    /// Re-append them after the derived file name
    Retain,
}

/// Location of a written artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkArtifact {
    pub absolute_path: String,
    /// Public URL of the artifact, empty when the source has no URL
    pub relative_url: String,
}

impl WatermarkArtifact {
    /// Describe an artifact written to `destination`.
    pub fn new(destination: &Path, source_url: Option<&str>) -> Self {
        Self {
            absolute_path: destination.to_string_lossy().into_owned(),
            relative_url: source_url.map(derive).unwrap_or_default(),
        }
    }
}

/// Artifact path for a file on disk, in the same directory as `source_path`.
///
/// Only the file name changes. `?` and `#` are kept as part of the name.
pub fn derive_path(source_path: &Path) -> PathBuf {
    let stem = source_path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    source_path.with_file_name(format!("{}{}.{}", stem, ARTIFACT_SUFFIX, ARTIFACT_EXTENSION))
}

/// Derive the artifact name for `path_or_url`, stripping any query or fragment.
pub fn derive(path_or_url: &str) -> String {
    derive_with(path_or_url, QueryPolicy::Strip)
}

/// Derive the artifact name for `path_or_url` under `policy`.
///
/// Only the final segment changes. Deriving an already derived name appends
/// the suffix a second time; see [`is_derived`].
pub fn derive_with(path_or_url: &str, policy: QueryPolicy) -> String {
    let (location, tail) = split_tail(path_or_url);

    let (dir, file_name) = match location.rfind('/') {
        Some(idx) => location.split_at(idx + 1),
        None => ("", location),
    };

    let stem = match file_name.rfind('.') {
        Some(idx) => &file_name[..idx],
        None => file_name,
    };

    let mut derived = format!("{}{}{}.{}", dir, stem, ARTIFACT_SUFFIX, ARTIFACT_EXTENSION);
    if policy == QueryPolicy::Retain {
        derived.push_str(tail);
    }
    derived
}

/// Whether the final segment of `path_or_url` is already an artifact name.
pub fn is_derived(path_or_url: &str) -> bool {
    let (location, _) = split_tail(path_or_url);
    let file_name = location.rsplit('/').next().unwrap_or(location);
    let expected_end = format!("{}.{}", ARTIFACT_SUFFIX, ARTIFACT_EXTENSION);
    file_name.len() > expected_end.len() && file_name.ends_with(&expected_end)
}

/// Descriptor for the artifact of `source`.
pub fn artifact_for(source: &SourceImage) -> WatermarkArtifact {
    WatermarkArtifact {
        absolute_path: derive_path(&source.path).to_string_lossy().into_owned(),
        relative_url: source.url.as_deref().map(derive).unwrap_or_default(),
    }
}

/// Whether the artifact for `source_path` is already on disk.
pub fn artifact_exists(source_path: &Path) -> bool {
    derive_path(source_path).is_file()
}

/// Split off a trailing `?query` or `#fragment`.
///
/// In an absolute URL the first `?` or `#` ends the path. Anywhere else only
/// the final segment is searched, so directories keep those characters.
fn split_tail(input: &str) -> (&str, &str) {
    let is_delimiter = |c: char| c == '?' || c == '#';
    let search_from = match input.find("://") {
        Some(_) => 0,
        None => input.rfind('/').map_or(0, |idx| idx + 1),
    };
    match input[search_from..].find(is_delimiter) {
        Some(idx) => input.split_at(search_from + idx),
        None => (input, ""),
    }
}
