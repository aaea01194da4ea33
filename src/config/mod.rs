// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::watermark::{ColorSpec, WatermarkConfig, DEFAULT_JPEG_QUALITY};

/// Errors raised while loading or validating [`Settings`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Environment variable '{0}' is referenced but not set")]
    MissingEnvVar(String),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

fn default_fonts_dir() -> PathBuf {
    PathBuf::from("fonts")
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output (default)
    #[default]
    Pretty,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    #[serde(default)]
    pub format: LogFormat,

    /// Default filter directive; RUST_LOG overrides it
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}

/// Top-level settings file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub watermark: WatermarkConfig,

    /// Directory holding `<font>.otf` files (default: fonts)
    #[serde(default = "default_fonts_dir")]
    pub fonts_dir: PathBuf,

    /// JPEG quality for artifacts, 1-100 (default: 75)
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,

    /// Log failed runs at error level
    #[serde(default)]
    pub logs: bool,

    /// JSON file recording created artifacts
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_store: Option<PathBuf>,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            watermark: WatermarkConfig::default(),
            fonts_dir: default_fonts_dir(),
            jpeg_quality: default_jpeg_quality(),
            logs: false,
            metadata_store: None,
            logging: LoggingConfig::default(),
        }
    }
}

impl Settings {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            if std::env::var(var_name).is_err() {
                return Err(ConfigError::MissingEnvVar(var_name.to_string()));
            }
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        // An empty document means all defaults
        if substituted.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_yaml::from_str(&substituted)?)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(ConfigError::Invalid(format!(
                "jpeg_quality must be between 1 and 100, got {}",
                self.jpeg_quality
            )));
        }

        if self.fonts_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("fonts_dir cannot be empty".to_string()));
        }

        if !matches!(
            self.logging.level.to_lowercase().as_str(),
            "trace" | "debug" | "info" | "warn" | "error" | "off"
        ) {
            return Err(ConfigError::Invalid(format!(
                "logging.level must be one of trace, debug, info, warn, error, off, got '{}'",
                self.logging.level
            )));
        }

        self.watermark
            .validate()
            .map_err(|e| ConfigError::Invalid(e.message().to_string()))?;

        // Catch bad colors at load time rather than on every run
        for (field, spec) in [
            ("text", self.watermark.text_color_spec()),
            ("background", self.watermark.background_color_spec()),
        ] {
            check_color(field, &spec)?;
        }

        Ok(())
    }
}

fn check_color(field: &str, spec: &ColorSpec) -> Result<(), ConfigError> {
    spec.resolve()
        .map(|_| ())
        .map_err(|e| ConfigError::Invalid(format!("{} color: {}", field, e)))
}
