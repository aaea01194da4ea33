//! Watermark configuration.
//!
//! One [`WatermarkConfig`] describes the text stamped onto every image. All
//! fields have defaults, so an empty YAML mapping is a valid config:
//!
//! ```yaml
//! label: WATERMARK
//! size: 60
//! text_color: "#000"
//! text_opacity: 100
//! background_color: "#FFF"
//! background_opacity: 0
//! font: Arial
//! ```

use serde::{Deserialize, Serialize};

use super::color::ColorSpec;
use super::WatermarkError;

// Default values
fn default_label() -> String {
    "WATERMARK".to_string()
}

fn default_size() -> f64 {
    60.0
}

fn default_text_color() -> String {
    "#000".to_string()
}

fn default_text_opacity() -> u8 {
    100
}

fn default_background_color() -> String {
    "#FFF".to_string()
}

fn default_background_opacity() -> u8 {
    0
}

fn default_font() -> String {
    "Arial".to_string()
}

/// Text watermark settings, read-only for the duration of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// Text to stamp
    #[serde(default = "default_label")]
    pub label: String,

    /// Text height as a percentage of the reference scale (image width / 8.5)
    #[serde(default = "default_size")]
    pub size: f64,

    /// Text color as #RGB or #RRGGBB
    #[serde(default = "default_text_color")]
    pub text_color: String,

    /// Text opacity, 0-100
    #[serde(default = "default_text_opacity")]
    pub text_opacity: u8,

    /// Background box color as #RGB or #RRGGBB
    #[serde(default = "default_background_color")]
    pub background_color: String,

    /// Background box opacity, 0-100 (0 = no visible box)
    #[serde(default = "default_background_opacity")]
    pub background_opacity: u8,

    /// Font id, resolved as `<fonts_dir>/<font>.otf`
    #[serde(default = "default_font")]
    pub font: String,
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            label: default_label(),
            size: default_size(),
            text_color: default_text_color(),
            text_opacity: default_text_opacity(),
            background_color: default_background_color(),
            background_opacity: default_background_opacity(),
            font: default_font(),
        }
    }
}

impl WatermarkConfig {
    pub fn text_color_spec(&self) -> ColorSpec {
        ColorSpec::new(self.text_color.clone(), self.text_opacity)
    }

    pub fn background_color_spec(&self) -> ColorSpec {
        ColorSpec::new(self.background_color.clone(), self.background_opacity)
    }

    /// Validate size, label and font reference.
    ///
    /// Colors are not checked here. They are resolved while the text layer
    /// is built and fail as text errors.
    pub fn validate(&self) -> Result<(), WatermarkError> {
        if self.label.is_empty() {
            return Err(WatermarkError::Config(
                "watermark label cannot be empty".to_string(),
            ));
        }

        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(WatermarkError::Config(format!(
                "text size must be a positive percentage, got {}",
                self.size
            )));
        }

        if self.font.is_empty() {
            return Err(WatermarkError::Config("font id cannot be empty".to_string()));
        }

        if self.font.contains(|c: char| c == '/' || c == '\\') || self.font.contains("..") {
            return Err(WatermarkError::Config(format!(
                "font id must be a bare name, got '{}'",
                self.font
            )));
        }

        Ok(())
    }
}
