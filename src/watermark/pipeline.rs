//! End-to-end watermark pipeline.
//!
//! A run moves through fixed stages:
//!
//! ```text
//! Start -> ImageLoaded -> TextRendered -> Positioned -> Composited -> Saved
//! ```
//!
//! The first failing stage ends the run. Its error is wrapped into the
//! matching [`WatermarkError`] kind and nothing is retried. Every run reports
//! its outcome to the configured sink exactly once.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use watermark_my_images::watermark::{ImageCodec, SourceImage, WatermarkConfig, WatermarkPipeline};
//!
//! let pipeline = WatermarkPipeline::new(Arc::new(ImageCodec::default()), "fonts");
//! let source = SourceImage::new("/img/sample.png").with_id(42);
//! let artifact = pipeline.run(&WatermarkConfig::default(), Some(&source))?;
//! assert_eq!(artifact.absolute_path, "/img/sample-watermark-my-images.jpg");
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::artifact::{derive_path, WatermarkArtifact};
use super::compositor::{CompositeError, Compositor};
use super::config::WatermarkConfig;
use super::metrics::{font_size, TextMetrics};
use super::position::{self, Dimensions, PositionOverride};
use super::raster::RasterCodec;
use super::sink::WatermarkSink;
use super::text_renderer::{font_path, TextLayer, TextRenderer};
use super::WatermarkError;

/// Hook replacing the caller's config at the start of each run.
pub type ConfigOverride = Arc<dyn Fn(WatermarkConfig) -> WatermarkConfig + Send + Sync>;

/// Completed stages of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Start,
    ImageLoaded,
    TextRendered,
    Positioned,
    Composited,
    Saved,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::ImageLoaded => "image_loaded",
            Self::TextRendered => "text_rendered",
            Self::Positioned => "positioned",
            Self::Composited => "composited",
            Self::Saved => "saved",
        }
    }
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Image to watermark, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    /// Absolute path of the source file
    pub path: PathBuf,
    /// Public URL of the source, used for the artifact's relative URL
    pub url: Option<String>,
    /// Host attachment id
    pub id: Option<u64>,
}

impl SourceImage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            url: None,
            id: None,
        }
    }

    /// Set the public URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    /// Set the attachment id.
    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Key identifying this source in metadata stores.
    pub fn key(&self) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => self.path.to_string_lossy().into_owned(),
        }
    }

    /// Path of the artifact this source produces.
    pub fn artifact_path(&self) -> PathBuf {
        derive_path(&self.path)
    }
}

/// Text watermark pipeline.
///
/// Cheap to share across threads; each [`run`](Self::run) owns its buffers.
pub struct WatermarkPipeline {
    codec: Arc<dyn RasterCodec>,
    fonts_dir: PathBuf,
    position_override: Option<PositionOverride>,
    config_override: Option<ConfigOverride>,
    sink: Option<Arc<dyn WatermarkSink>>,
}

impl WatermarkPipeline {
    /// Create a pipeline drawing with `codec` and loading fonts from `fonts_dir`.
    pub fn new(codec: Arc<dyn RasterCodec>, fonts_dir: impl Into<PathBuf>) -> Self {
        Self {
            codec,
            fonts_dir: fonts_dir.into(),
            position_override: None,
            config_override: None,
            sink: None,
        }
    }

    /// Adjust the paste position after centering.
    pub fn with_position_override(mut self, hook: PositionOverride) -> Self {
        self.position_override = Some(hook);
        self
    }

    /// Replace the config at the start of each run.
    pub fn with_config_override(mut self, hook: ConfigOverride) -> Self {
        self.config_override = Some(hook);
        self
    }

    /// Report each run's outcome to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn WatermarkSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn fonts_dir(&self) -> &Path {
        &self.fonts_dir
    }

    /// Watermark `source` and write its artifact.
    ///
    /// `None` means the caller could not resolve a source; that is reported
    /// as a precondition failure like a missing file.
    pub fn run(
        &self,
        config: &WatermarkConfig,
        source: Option<&SourceImage>,
    ) -> Result<WatermarkArtifact, WatermarkError> {
        let outcome = self.execute(config, source);

        if let Some(sink) = &self.sink {
            sink.report(source, &outcome);
        }

        outcome
    }

    fn execute(
        &self,
        config: &WatermarkConfig,
        source: Option<&SourceImage>,
    ) -> Result<WatermarkArtifact, WatermarkError> {
        let config = match &self.config_override {
            Some(hook) => hook(config.clone()),
            None => config.clone(),
        };

        let source = source.ok_or_else(|| {
            WatermarkError::Precondition("no source image was provided".to_string())
        })?;
        check_source_exists(source)?;
        config.validate()?;

        let compositor = Compositor::new(self.codec.as_ref());

        // Start -> ImageLoaded
        let mut base = compositor.load(&source.path).map_err(|e| match e {
            CompositeError::Decode(msg) => WatermarkError::Image(msg),
            other => WatermarkError::Image(other.to_string()),
        })?;
        let image_size = base.dimensions();

        // ImageLoaded -> TextRendered
        let text_height = font_size(config.size, image_size.width)?;
        let metrics = TextMetrics::compute(&config.label, text_height)?;
        let layer = self.render_text(&config, &metrics)?;

        // TextRendered -> Positioned
        let position = position::resolve(
            &image_size,
            &Dimensions::new(layer.width(), layer.height()),
            self.position_override.as_ref(),
        );

        // Positioned -> Composited
        compositor
            .paste(&mut base, &layer, position)
            .map_err(|e| WatermarkError::Paste(e.to_string()))?;

        // Composited -> Saved
        let destination = source.artifact_path();
        compositor
            .save(&base, &destination)
            .map_err(|e| WatermarkError::Save(e.to_string()))?;

        Ok(WatermarkArtifact::new(&destination, source.url.as_deref()))
    }

    fn render_text(
        &self,
        config: &WatermarkConfig,
        metrics: &TextMetrics,
    ) -> Result<TextLayer, WatermarkError> {
        TextRenderer::new(self.codec.as_ref())
            .render(
                &config.label,
                metrics,
                &font_path(&self.fonts_dir, &config.font),
                &config.text_color_spec(),
                &config.background_color_spec(),
            )
            .map_err(|e| WatermarkError::Text(e.to_string()))
    }
}

impl fmt::Debug for WatermarkPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatermarkPipeline")
            .field("fonts_dir", &self.fonts_dir)
            .field("position_override", &self.position_override.is_some())
            .field("config_override", &self.config_override.is_some())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

fn check_source_exists(source: &SourceImage) -> Result<(), WatermarkError> {
    if source.path.is_file() {
        return Ok(());
    }

    Err(WatermarkError::Precondition(match source.id {
        Some(id) => format!("file does not exist for Image ID: {}.", id),
        None => format!("file does not exist: {}.", source.path.display()),
    }))
}
