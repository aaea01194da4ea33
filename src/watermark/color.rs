//! Color and opacity resolution.
//!
//! Colors are configured as a hex literal plus an opacity percentage and
//! resolved into an RGBA value before any drawing happens.
//!
//! # Example
//!
//! ```
//! use watermark_my_images::watermark::color::{ColorSpec, Color};
//!
//! let color = ColorSpec::new("#FFF", 50).resolve().unwrap();
//! assert_eq!((color.r, color.g, color.b), (255, 255, 255));
//! assert_eq!(color.alpha, 0.5);
//! ```

use image::Rgba;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while resolving a [`ColorSpec`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("invalid color literal '{0}', expected #RGB or #RRGGBB")]
    InvalidHex(String),

    #[error("opacity {0}% is out of range, expected 0-100")]
    OpacityOutOfRange(u8),
}

/// Resolved RGBA color. Alpha is normalized to `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub alpha: f32,
}

impl Color {
    pub fn new(r: u8, g: u8, b: u8, alpha: f32) -> Self {
        Self { r, g, b, alpha }
    }

    /// Convert to an 8-bit RGBA pixel.
    pub fn to_rgba8(self) -> Rgba<u8> {
        let a = (self.alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Rgba([self.r, self.g, self.b, a])
    }
}

/// A hex color literal paired with an opacity percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorSpec {
    pub hex: String,
    pub opacity_percent: u8,
}

impl ColorSpec {
    pub fn new(hex: impl Into<String>, opacity_percent: u8) -> Self {
        Self {
            hex: hex.into(),
            opacity_percent,
        }
    }

    /// Resolve into a normalized RGBA color.
    pub fn resolve(&self) -> Result<Color, ColorError> {
        resolve(&self.hex, self.opacity_percent)
    }
}

/// Resolve a hex literal and opacity percentage into a [`Color`].
///
/// The leading `#` is optional. Opacity above 100 is rejected rather than
/// clamped.
pub fn resolve(hex: &str, opacity_percent: u8) -> Result<Color, ColorError> {
    if opacity_percent > 100 {
        return Err(ColorError::OpacityOutOfRange(opacity_percent));
    }

    let (r, g, b) = parse_hex_color(hex)?;
    Ok(Color::new(r, g, b, opacity_percent as f32 / 100.0))
}

/// Parse `#RGB`, `#RRGGBB`, `RGB` or `RRGGBB` into its components.
pub fn parse_hex_color(literal: &str) -> Result<(u8, u8, u8), ColorError> {
    let invalid = || ColorError::InvalidHex(literal.to_string());
    let hex = literal.trim();
    let hex = hex.strip_prefix('#').unwrap_or(hex);

    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());

    match hex.len() {
        // Each digit is doubled: 0xF -> 0xFF
        3 => Ok((
            channel(&hex[0..1])? * 17,
            channel(&hex[1..2])? * 17,
            channel(&hex[2..3])? * 17,
        )),
        6 => Ok((
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
        )),
        _ => Err(invalid()),
    }
}
