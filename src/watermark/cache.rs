//! Artifact reuse.
//!
//! Existence of the derived artifact on disk marks a source as already
//! watermarked. [`ensure_watermark`] skips the pipeline for such sources.
//! The existence check and the write are not atomic together; two callers
//! racing on the same source may both run the pipeline, and the last rename
//! wins.

use super::artifact::{artifact_for, artifact_exists, WatermarkArtifact};
use super::config::WatermarkConfig;
use super::pipeline::{SourceImage, WatermarkPipeline};
use super::WatermarkError;

/// How [`ensure_watermark`] satisfied a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkOutcome {
    /// The pipeline ran and wrote the artifact
    Created(WatermarkArtifact),
    /// The artifact already existed
    Reused(WatermarkArtifact),
}

impl WatermarkOutcome {
    pub fn artifact(&self) -> &WatermarkArtifact {
        match self {
            Self::Created(artifact) | Self::Reused(artifact) => artifact,
        }
    }

    pub fn is_reused(&self) -> bool {
        matches!(self, Self::Reused(_))
    }

    pub fn into_artifact(self) -> WatermarkArtifact {
        match self {
            Self::Created(artifact) | Self::Reused(artifact) => artifact,
        }
    }
}

/// Return the artifact for `source`, running the pipeline only when needed.
///
/// With `force` set the pipeline always runs. Reuse does not notify the
/// pipeline's sink.
pub fn ensure_watermark(
    pipeline: &WatermarkPipeline,
    config: &WatermarkConfig,
    source: &SourceImage,
    force: bool,
) -> Result<WatermarkOutcome, WatermarkError> {
    if !force && artifact_exists(&source.path) {
        return Ok(WatermarkOutcome::Reused(artifact_for(source)));
    }

    pipeline
        .run(config, Some(source))
        .map(WatermarkOutcome::Created)
}
