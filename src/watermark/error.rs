//! Watermark error types.
//!
//! Every pipeline stage maps its own failure into one of these kinds before
//! it reaches the caller. Each kind carries the cause message plus a fixed
//! context tag naming the activity that failed.

use std::fmt;

use super::pipeline::PipelineStage;

/// Errors surfaced by a watermark pipeline run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatermarkError {
    /// Invalid configuration (size ratio, empty label, font reference, image width)
    Config(String),

    /// Source image missing or not resolved by the caller
    Precondition(String),

    /// Failed to open or decode the source image
    Image(String),

    /// Failed to build the text layer (color, canvas or drawing)
    Text(String),

    /// Failed to paste the text layer onto the image
    Paste(String),

    /// Failed to encode or write the watermark artifact
    Save(String),
}

impl WatermarkError {
    /// Fixed context tag describing where the failure happened.
    pub fn context(&self) -> &'static str {
        match self {
            Self::Config(_) => "Configuration",
            Self::Precondition(_) => "Precondition",
            Self::Image(_) => "Image Object",
            Self::Text(_) => "Text Object",
            Self::Paste(_) => "Paste Activity",
            Self::Save(_) => "Save Activity",
        }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Config(_) => "config",
            Self::Precondition(_) => "precondition",
            Self::Image(_) => "image",
            Self::Text(_) => "text",
            Self::Paste(_) => "paste",
            Self::Save(_) => "save",
        }
    }

    /// The underlying cause message, without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Config(msg)
            | Self::Precondition(msg)
            | Self::Image(msg)
            | Self::Text(msg)
            | Self::Paste(msg)
            | Self::Save(msg) => msg,
        }
    }

    /// Last stage the run completed before failing.
    ///
    /// Configuration and precondition failures happen before any stage ran.
    pub fn failed_after(&self) -> PipelineStage {
        match self {
            Self::Config(_) | Self::Precondition(_) | Self::Image(_) => PipelineStage::Start,
            Self::Text(_) => PipelineStage::ImageLoaded,
            Self::Paste(_) => PipelineStage::Positioned,
            Self::Save(_) => PipelineStage::Composited,
        }
    }
}

impl fmt::Display for WatermarkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "Watermark configuration error: {}", msg),
            Self::Precondition(msg) => write!(f, "Unable to create Image watermark, {}", msg),
            Self::Image(msg) => write!(f, "Unable to create Image object, {}", msg),
            Self::Text(msg) => write!(f, "Unable to create Text object, {}", msg),
            Self::Paste(msg) => write!(f, "Unable to paste Text on Image resource, {}", msg),
            Self::Save(msg) => write!(f, "Unable to save to Watermark image, {}", msg),
        }
    }
}

impl std::error::Error for WatermarkError {}
