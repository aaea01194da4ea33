//! Raster codec capability.
//!
//! The pipeline never talks to an image library directly. Decoding,
//! encoding and glyph rasterization go through [`RasterCodec`], so hosts can
//! swap the backend and tests can run without real fonts.
//!
//! [`ImageCodec`] is the default backend, built on the `image` crate for
//! codecs and `ab_glyph` for glyph outlines.

use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use image::io::Reader as ImageReader;
use image::{ColorType, ImageEncoder as _, Rgba, RgbaImage};
use parking_lot::RwLock;
use tempfile::NamedTempFile;
use thiserror::Error;

use super::compositor::blend_pixels;

/// Default JPEG quality for written artifacts.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Errors reported by a [`RasterCodec`].
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {path}: {message}")]
    Decode { path: PathBuf, message: String },

    #[error("failed to encode {format}: {message}")]
    Encode {
        format: &'static str,
        message: String,
    },

    #[error("font asset not found: {0}")]
    FontNotFound(PathBuf),

    #[error("invalid font asset {path}: {message}")]
    InvalidFont { path: PathBuf, message: String },

    #[error("cannot draw empty text")]
    EmptyText,
}

/// Encoded output formats. Artifacts are always JPEG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
        }
    }
}

/// Decode, encode and draw primitives used by the pipeline.
///
/// Implementations must be usable from several threads at once.
pub trait RasterCodec: Send + Sync {
    /// Decode the file at `path` into an RGBA buffer.
    fn decode(&self, path: &Path) -> Result<RgbaImage, RasterError>;

    /// Encode `image` as `format` and write it to `path`.
    fn encode(&self, image: &RgbaImage, path: &Path, format: OutputFormat)
        -> Result<(), RasterError>;

    /// Draw `label` onto `canvas` with its top-left corner at the origin.
    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        label: &str,
        font_path: &Path,
        size_px: f32,
        color: Rgba<u8>,
    ) -> Result<(), RasterError>;
}

/// Default codec backed by the `image` and `ab_glyph` crates.
pub struct ImageCodec {
    jpeg_quality: u8,
    fonts: RwLock<HashMap<PathBuf, Arc<FontVec>>>,
}

impl Default for ImageCodec {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl ImageCodec {
    /// Create a codec writing JPEGs at `jpeg_quality` (clamped to 1-100).
    pub fn new(jpeg_quality: u8) -> Self {
        Self {
            jpeg_quality: jpeg_quality.clamp(1, 100),
            fonts: RwLock::new(HashMap::new()),
        }
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Load a font, reusing previously parsed faces.
    fn load_font(&self, path: &Path) -> Result<Arc<FontVec>, RasterError> {
        if let Some(font) = self.fonts.read().get(path) {
            return Ok(Arc::clone(font));
        }

        let data = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => RasterError::FontNotFound(path.to_path_buf()),
            _ => RasterError::Io {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let font = FontVec::try_from_vec(data).map_err(|e| RasterError::InvalidFont {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let font = Arc::new(font);
        self.fonts
            .write()
            .insert(path.to_path_buf(), Arc::clone(&font));
        Ok(font)
    }

    fn encode_bytes(&self, image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>, RasterError> {
        let mut output = Cursor::new(Vec::new());
        let (width, height) = image.dimensions();

        let result = match format {
            OutputFormat::Jpeg => {
                // JPEG has no alpha channel
                let rgb = rgba_to_rgb(image.as_raw());
                image::codecs::jpeg::JpegEncoder::new_with_quality(&mut output, self.jpeg_quality)
                    .write_image(&rgb, width, height, ColorType::Rgb8)
            }
        };

        result.map_err(|e| RasterError::Encode {
            format: format.as_str(),
            message: e.to_string(),
        })?;

        Ok(output.into_inner())
    }
}

impl RasterCodec for ImageCodec {
    fn decode(&self, path: &Path) -> Result<RgbaImage, RasterError> {
        let io_err = |source| RasterError::Io {
            path: path.to_path_buf(),
            source,
        };

        let image = ImageReader::open(path)
            .map_err(io_err)?
            .with_guessed_format()
            .map_err(io_err)?
            .decode()
            .map_err(|e| RasterError::Decode {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(image.to_rgba8())
    }

    fn encode(
        &self,
        image: &RgbaImage,
        path: &Path,
        format: OutputFormat,
    ) -> Result<(), RasterError> {
        let data = self.encode_bytes(image, format)?;
        write_atomic(path, &data)
    }

    fn draw_text(
        &self,
        canvas: &mut RgbaImage,
        label: &str,
        font_path: &Path,
        size_px: f32,
        color: Rgba<u8>,
    ) -> Result<(), RasterError> {
        if label.is_empty() {
            return Err(RasterError::EmptyText);
        }

        let font = self.load_font(font_path)?;
        let scale = PxScale::from(size_px);
        let scaled_font = font.as_scaled(scale);
        let (canvas_width, canvas_height) = canvas.dimensions();

        let baseline_y = scaled_font.ascent();
        let mut cursor_x = 0.0f32;
        let mut prev_glyph: Option<ab_glyph::GlyphId> = None;

        for c in label.chars() {
            let glyph_id = scaled_font.glyph_id(c);

            if let Some(prev) = prev_glyph {
                cursor_x += scaled_font.kern(prev, glyph_id);
            }

            let glyph =
                glyph_id.with_scale_and_position(scale, ab_glyph::point(cursor_x, baseline_y));

            if let Some(outlined) = font.outline_glyph(glyph) {
                let bounds = outlined.px_bounds();

                outlined.draw(|px, py, coverage| {
                    let x = px as i32 + bounds.min.x as i32;
                    let y = py as i32 + bounds.min.y as i32;

                    if x >= 0 && y >= 0 && x < canvas_width as i32 && y < canvas_height as i32 {
                        let alpha = (coverage.clamp(0.0, 1.0) * color[3] as f32) as u8;
                        let pixel = Rgba([color[0], color[1], color[2], alpha]);
                        let existing = *canvas.get_pixel(x as u32, y as u32);
                        canvas.put_pixel(x as u32, y as u32, blend_pixels(existing, pixel));
                    }
                });
            }

            cursor_x += scaled_font.h_advance(glyph_id);
            prev_glyph = Some(glyph_id);
        }

        Ok(())
    }
}

/// Write `data` to a temporary sibling of `path`, then rename it into place.
///
/// Readers never observe a partially written artifact.
fn write_atomic(path: &Path, data: &[u8]) -> Result<(), RasterError> {
    let io_err = |source| RasterError::Io {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(io_err)?;
    tmp.write_all(data).map_err(io_err)?;
    tmp.persist(path).map_err(|e| io_err(e.error))?;
    Ok(())
}

/// Drop the alpha channel from packed RGBA bytes.
fn rgba_to_rgb(data: &[u8]) -> Vec<u8> {
    data.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}
