use std::fmt;

use serde::{Deserialize, Serialize};

/// An RGB color with 0-255 channels.
///
/// Channels are stored as `i32` so per-channel differences never overflow; the engine only
/// ever produces values inside `0..=255`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RgbColor {
    pub r: i32,
    pub g: i32,
    pub b: i32,
}

impl RgbColor {
    /// Pure white, used as a placeholder target before a map round is started.
    pub const WHITE: RgbColor = RgbColor::new(255, 255, 255);

    pub const fn new(r: i32, g: i32, b: i32) -> Self {
        Self { r, g, b }
    }

    /// Channels scaled to 0.0-1.0 for hosts that render the color.
    pub fn to_normalized(&self) -> (f64, f64, f64) {
        (
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
        )
    }
}

/// Formats as a CSS color string, e.g. `rgb(250, 248, 255)`.
impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgb({}, {}, {})", self.r, self.g, self.b)
    }
}

/// A color offered to the player as a choice in classic mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaletteColor {
    pub color: RgbColor,
}

impl PaletteColor {
    pub fn new(color: RgbColor) -> Self {
        Self { color }
    }
}

impl From<RgbColor> for PaletteColor {
    fn from(color: RgbColor) -> Self {
        Self { color }
    }
}
