//! Relative glyph advance widths.
//!
//! Text boxes are sized before anything is drawn, so widths come from this
//! fixed table instead of font metrics. Ratios are relative to the font size
//! and were tuned against the bundled uppercase faces.

/// Advance ratio used for anything not in the table.
pub const DEFAULT_ADVANCE_RATIO: f64 = 1.0;

/// Relative advance width of an uppercase ASCII letter.
///
/// Lookup is exact: callers uppercase the label first. Lowercase letters,
/// digits and punctuation fall back to [`DEFAULT_ADVANCE_RATIO`].
pub fn advance_ratio(c: char) -> f64 {
    match c {
        'A' | 'G' => 0.917,
        'B' | 'H' | 'N' | 'S' | 'T' | 'U' | 'Z' => 0.8,
        'C' | 'Y' => 0.9,
        'D' | 'R' | 'X' => 0.833,
        'E' => 0.7,
        'F' | 'L' => 0.667,
        'J' => 0.6,
        'K' => 0.817,
        'O' | 'Q' => 0.967,
        'P' => 0.75,
        'V' => 0.867,
        'W' => 1.283,
        'I' => 0.133,
        _ => DEFAULT_ADVANCE_RATIO,
    }
}
