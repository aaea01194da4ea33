//! Paste position for the text layer.
//!
//! The layer is centered over the base image. Hosts may adjust the result
//! through a [`PositionOverride`] hook before it is used.
//!
//! # Example
//!
//! ```
//! use watermark_my_images::watermark::position::{resolve, Dimensions, Position};
//!
//! let image = Dimensions::new(800, 600);
//! let text = Dimensions::new(200, 100);
//! assert_eq!(resolve(&image, &text, None), Position::new(300, 250));
//! ```

use std::sync::Arc;

use serde::Serialize;

/// Hook receiving the computed `[x, y]` pair and returning the pair to use.
pub type PositionOverride = Arc<dyn Fn([f64; 2]) -> [f64; 2] + Send + Sync>;

/// Width and height of an image or layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Top-left corner of the pasted layer. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Centered offsets before any override runs.
///
/// When the text is larger than the image on an axis, that axis offset is 0.
pub fn centered(image: &Dimensions, text: &Dimensions) -> [f64; 2] {
    let free_x = image.width.saturating_sub(text.width) as f64;
    let free_y = image.height.saturating_sub(text.height) as f64;
    [free_x / 2.0, free_y / 2.0]
}

/// Resolve the final paste position, applying `hook` once if present.
pub fn resolve(
    image: &Dimensions,
    text: &Dimensions,
    hook: Option<&PositionOverride>,
) -> Position {
    let pair = centered(image, text);
    let [x, y] = match hook {
        Some(hook) => hook(pair),
        None => pair,
    };

    Position::new(to_coordinate(x), to_coordinate(y))
}

/// Truncate toward zero, mapping negative and non-finite values to 0.
fn to_coordinate(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.trunc().min(u32::MAX as f64) as u32
}
