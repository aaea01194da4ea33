//! Text watermarking for images.
//!
//! A [`WatermarkPipeline`] stamps a text label onto a copy of a source image
//! and writes the result next to it as `<stem>-watermark-my-images.jpg`.
//!
//! # Stages
//!
//! 1. Decode the source ([`compositor`])
//! 2. Size the label from the image width ([`metrics`], [`glyphs`])
//! 3. Render the label on its background box ([`text_renderer`], [`color`])
//! 4. Center the box, optionally adjusted by a hook ([`position`])
//! 5. Alpha-blend and save as JPEG ([`compositor`], [`artifact`])
//!
//! Image decoding, encoding and glyph rasterization sit behind the
//! [`RasterCodec`] trait, with [`ImageCodec`] as the default.
//!
//! # Configuration Example
//!
//! ```yaml
//! watermark:
//!   label: "© ACME"
//!   size: 60
//!   text_color: "#000"
//!   text_opacity: 100
//!   background_color: "#FFF"
//!   background_opacity: 0
//!   font: Arial
//! ```

pub mod artifact;
pub mod cache;
pub mod color;
pub mod compositor;
pub mod config;
pub mod error;
pub mod glyphs;
pub mod metrics;
pub mod pipeline;
pub mod position;
pub mod raster;
pub mod sink;
pub mod text_renderer;

// Re-export main types for convenience
pub use artifact::{
    artifact_exists, artifact_for, derive, derive_path, derive_with, is_derived, QueryPolicy,
    WatermarkArtifact, ARTIFACT_SUFFIX,
};
pub use cache::{ensure_watermark, WatermarkOutcome};
pub use color::{parse_hex_color, Color, ColorError, ColorSpec};
pub use compositor::{CompositeError, Compositor};
pub use config::WatermarkConfig;
pub use error::WatermarkError;
pub use glyphs::advance_ratio;
pub use metrics::{font_size, TextMetrics};
pub use pipeline::{ConfigOverride, PipelineStage, SourceImage, WatermarkPipeline};
pub use position::{Dimensions, Position, PositionOverride};
pub use raster::{ImageCodec, OutputFormat, RasterCodec, RasterError, DEFAULT_JPEG_QUALITY};
pub use sink::{
    FanoutSink, MetadataEntry, MetadataError, MetadataSink, MetadataStore, TracingSink,
    WatermarkSink,
};
pub use text_renderer::{font_path, RenderError, TextLayer, TextRenderer};
