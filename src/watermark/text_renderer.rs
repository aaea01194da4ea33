//! Text layer rendering.
//!
//! Builds the standalone RGBA layer holding the label and its background
//! fill. The layer is sized from [`TextMetrics`], not from the font, so the
//! box matches the geometry used for positioning.

use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use super::color::{ColorError, ColorSpec};
use super::metrics::TextMetrics;
use super::raster::RasterCodec;

/// Font files are looked up as `<fonts_dir>/<font_id>.otf`.
pub const FONT_EXTENSION: &str = "otf";

/// Failures while building a text layer.
///
/// Each sub-kind names the stage it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// A color literal or opacity could not be resolved
    Color { stage: &'static str, message: String },

    /// The canvas could not be created
    Canvas { stage: &'static str, message: String },

    /// The label could not be drawn
    Draw { stage: &'static str, message: String },
}

impl RenderError {
    fn color(stage: &'static str, err: ColorError) -> Self {
        Self::Color {
            stage,
            message: err.to_string(),
        }
    }

    pub fn stage(&self) -> &'static str {
        match self {
            Self::Color { stage, .. } | Self::Canvas { stage, .. } | Self::Draw { stage, .. } => {
                stage
            }
        }
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color { stage, message } => write!(f, "Unable to create {}, {}", stage, message),
            Self::Canvas { stage, message } => write!(f, "Unable to create {}, {}", stage, message),
            Self::Draw { stage, message } => write!(f, "Unable to {}, {}", stage, message),
        }
    }
}

impl std::error::Error for RenderError {}

/// Rendered label on its background, ready to be pasted.
pub struct TextLayer {
    image: RgbaImage,
}

impl TextLayer {
    /// Wrap an already rendered buffer.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

impl fmt::Debug for TextLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextLayer")
            .field("dimensions", &(self.width(), self.height()))
            .finish()
    }
}

/// Resolve the font asset for `font_id`.
pub fn font_path(fonts_dir: &Path, font_id: &str) -> PathBuf {
    fonts_dir.join(format!("{}.{}", font_id, FONT_EXTENSION))
}

/// Renders text layers through a [`RasterCodec`].
pub struct TextRenderer<'a> {
    codec: &'a dyn RasterCodec,
}

impl<'a> TextRenderer<'a> {
    pub fn new(codec: &'a dyn RasterCodec) -> Self {
        Self { codec }
    }

    /// Render `label` into a layer of the size given by `metrics`.
    ///
    /// The label is drawn as given; only measurement treats it as uppercase.
    pub fn render(
        &self,
        label: &str,
        metrics: &TextMetrics,
        font_path: &Path,
        text_color: &ColorSpec,
        background_color: &ColorSpec,
    ) -> Result<TextLayer, RenderError> {
        let background = background_color
            .resolve()
            .map_err(|e| RenderError::color("Background color", e))?;

        let (width, height) = metrics.canvas_size();
        if width < 1 || height < 1 {
            return Err(RenderError::Canvas {
                stage: "Text Box",
                message: format!("dimensions must be at least 1x1, got {}x{}", width, height),
            });
        }
        let mut canvas = RgbaImage::from_pixel(width, height, background.to_rgba8());

        let foreground = text_color
            .resolve()
            .map_err(|e| RenderError::color("Text color", e))?;

        self.codec
            .draw_text(
                &mut canvas,
                label,
                font_path,
                metrics.height_px as f32,
                foreground.to_rgba8(),
            )
            .map_err(|e| RenderError::Draw {
                stage: "draw Text",
                message: e.to_string(),
            })?;

        Ok(TextLayer { image: canvas })
    }
}
