//! Text geometry.
//!
//! The font size follows the base image width, and the text box width comes
//! from the glyph advance table plus a fixed inter-glyph gap.

use serde::Serialize;

use super::glyphs::advance_ratio;
use super::WatermarkError;

/// Divisor tying the font size to the image width (100% => width / 8.5).
pub const SIZE_CALIBRATION: f64 = 8.5;

/// Gap between glyphs as a fraction of the font size.
pub const GLYPH_SPACING_RATIO: f64 = 0.1;

/// Pixel geometry of a rendered label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextMetrics {
    pub width_px: f64,
    pub height_px: u32,
}

impl TextMetrics {
    /// Measure `label` at `font_size_px`.
    ///
    /// Characters are measured as uppercase ASCII regardless of the label's
    /// own case.
    pub fn compute(label: &str, font_size_px: u32) -> Result<Self, WatermarkError> {
        if label.is_empty() {
            return Err(WatermarkError::Config(
                "watermark label cannot be empty".to_string(),
            ));
        }

        let size = font_size_px as f64;
        let glyphs: f64 = label
            .chars()
            .map(|c| advance_ratio(c.to_ascii_uppercase()) * size)
            .sum();
        let gaps = (label.chars().count() - 1) as f64 * (size * GLYPH_SPACING_RATIO);

        Ok(Self {
            width_px: glyphs + gaps,
            height_px: font_size_px,
        })
    }

    /// Canvas dimensions in whole pixels (width truncated).
    pub fn canvas_size(&self) -> (u32, u32) {
        (self.width_px.max(0.0) as u32, self.height_px)
    }
}

/// Font size (text height) for a given size percentage and image width.
///
/// Equivalent to `floor(width / ((100 / size_percent) * 8.5))`, evaluated as
/// `width * size_percent / 850` so exact ratios don't round down by one.
pub fn font_size(size_percent: f64, image_width_px: u32) -> Result<u32, WatermarkError> {
    if !size_percent.is_finite() || size_percent <= 0.0 {
        return Err(WatermarkError::Config(format!(
            "text size must be a positive percentage, got {}",
            size_percent
        )));
    }

    if image_width_px == 0 {
        return Err(WatermarkError::Config(
            "cannot size text for an image with zero width".to_string(),
        ));
    }

    let scaled = image_width_px as f64 * size_percent / (100.0 * SIZE_CALIBRATION);
    Ok(scaled.floor() as u32)
}
