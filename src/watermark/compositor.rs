//! Compositing the text layer onto the base image.
//!
//! The base image is decoded into memory, the layer is alpha-blended onto
//! that copy, and the result is written as a JPEG artifact. The source file
//! is only ever read.

use std::fmt;
use std::path::Path;

use image::{Rgba, RgbaImage};

use super::artifact::WatermarkArtifact;
use super::position::{Dimensions, Position};
use super::raster::{OutputFormat, RasterCodec};
use super::text_renderer::TextLayer;

/// Failures while compositing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompositeError {
    /// The source could not be opened or decoded
    Decode(String),

    /// The layer could not be pasted onto the image
    Paste(String),

    /// The artifact could not be encoded or written
    Save(String),
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(msg) => write!(f, "Unable to open Image Resource, {}", msg),
            Self::Paste(msg) => write!(f, "{}", msg),
            Self::Save(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CompositeError {}

/// Decoded base image owned by a single run.
pub struct BaseImage {
    image: RgbaImage,
}

impl BaseImage {
    pub fn from_rgba(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::new(self.image.width(), self.image.height())
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}

/// Decode, paste and save operations over a [`RasterCodec`].
pub struct Compositor<'a> {
    codec: &'a dyn RasterCodec,
}

impl<'a> Compositor<'a> {
    pub fn new(codec: &'a dyn RasterCodec) -> Self {
        Self { codec }
    }

    /// Decode the source image into memory.
    pub fn load(&self, source_path: &Path) -> Result<BaseImage, CompositeError> {
        self.codec
            .decode(source_path)
            .map(BaseImage::from_rgba)
            .map_err(|e| CompositeError::Decode(e.to_string()))
    }

    /// Paste `layer` onto `base` at `position`.
    ///
    /// Overflow past the right or bottom edge is clipped. A layer with no
    /// visible overlap is rejected.
    pub fn paste(
        &self,
        base: &mut BaseImage,
        layer: &TextLayer,
        position: Position,
    ) -> Result<(), CompositeError> {
        let image = base.dimensions();
        if !is_visible(&position, &image, layer) {
            return Err(CompositeError::Paste(format!(
                "layer of {}x{} at ({}, {}) lies outside the {}x{} image",
                layer.width(),
                layer.height(),
                position.x,
                position.y,
                image.width,
                image.height
            )));
        }

        blend_layer(&mut base.image, layer.image(), position);
        Ok(())
    }

    /// Encode `base` as JPEG and write it to `destination`.
    pub fn save(&self, base: &BaseImage, destination: &Path) -> Result<(), CompositeError> {
        self.codec
            .encode(&base.image, destination, OutputFormat::Jpeg)
            .map_err(|e| CompositeError::Save(e.to_string()))
    }

    /// Decode, paste and save in one call.
    ///
    /// `source_url` is the public URL of the source, if any, and only feeds
    /// the artifact's relative URL.
    pub fn composite(
        &self,
        source_path: &Path,
        source_url: Option<&str>,
        layer: &TextLayer,
        position: Position,
        destination: &Path,
    ) -> Result<WatermarkArtifact, CompositeError> {
        let mut base = self.load(source_path)?;
        self.paste(&mut base, layer, position)?;
        self.save(&base, destination)?;
        Ok(WatermarkArtifact::new(destination, source_url))
    }
}

fn is_visible(position: &Position, image: &Dimensions, layer: &TextLayer) -> bool {
    layer.width() > 0
        && layer.height() > 0
        && position.x < image.width
        && position.y < image.height
}

/// Blend `layer` onto `target` with its top-left corner at `position`.
fn blend_layer(target: &mut RgbaImage, layer: &RgbaImage, position: Position) {
    let x_end = (position.x as u64 + layer.width() as u64).min(target.width() as u64) as u32;
    let y_end = (position.y as u64 + layer.height() as u64).min(target.height() as u64) as u32;

    for ty in position.y..y_end {
        for tx in position.x..x_end {
            let fg = *layer.get_pixel(tx - position.x, ty - position.y);
            let bg = *target.get_pixel(tx, ty);
            target.put_pixel(tx, ty, blend_pixels(bg, fg));
        }
    }
}

/// Porter-Duff "over": `foreground + background * (1 - foreground.alpha)`.
pub(crate) fn blend_pixels(background: Rgba<u8>, foreground: Rgba<u8>) -> Rgba<u8> {
    let fg_alpha = foreground[3] as f32 / 255.0;
    let bg_alpha = background[3] as f32 / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);

    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let blend_channel = |fg: u8, bg: u8| -> u8 {
        let fg_f = fg as f32 / 255.0;
        let bg_f = bg as f32 / 255.0;
        let result = (fg_f * fg_alpha + bg_f * bg_alpha * (1.0 - fg_alpha)) / out_alpha;
        (result * 255.0).round().clamp(0.0, 255.0) as u8
    };

    Rgba([
        blend_channel(foreground[0], background[0]),
        blend_channel(foreground[1], background[1]),
        blend_channel(foreground[2], background[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}
