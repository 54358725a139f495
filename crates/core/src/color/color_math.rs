use rand::seq::SliceRandom;
use rand::Rng;

use crate::{PaletteColor, RgbColor};

/// Lowest channel value of the white band (inclusive).
pub const WHITE_MIN: i32 = 245;
/// Highest channel value of the white band (inclusive).
pub const WHITE_MAX: i32 = 255;
/// Number of distinct colors in the white band: 11 × 11 × 11.
pub const WHITE_COLOR_COUNT: usize = 1331;
/// Palette size offered per classic round.
pub const DEFAULT_PALETTE_SIZE: usize = 25;

/// Random color with every channel drawn independently from the white band.
pub fn generate_random_white_color<R: Rng + ?Sized>(rng: &mut R) -> RgbColor {
    RgbColor::new(
        rng.random_range(WHITE_MIN..=WHITE_MAX),
        rng.random_range(WHITE_MIN..=WHITE_MAX),
        rng.random_range(WHITE_MIN..=WHITE_MAX),
    )
}

/// Every color of the white band, ordered by red, then green, then blue.
pub fn generate_all_white_colors() -> Vec<RgbColor> {
    let mut colors = Vec::with_capacity(WHITE_COLOR_COUNT);
    for r in WHITE_MIN..=WHITE_MAX {
        for g in WHITE_MIN..=WHITE_MAX {
            for b in WHITE_MIN..=WHITE_MAX {
                colors.push(RgbColor::new(r, g, b));
            }
        }
    }
    colors
}

/// Samples `count` distinct white colors. Requests beyond the size of the band return the
/// whole band in random order.
pub fn get_random_palette_colors<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<PaletteColor> {
    let mut colors = generate_all_white_colors();
    colors.shuffle(rng);
    colors.truncate(count);
    colors.into_iter().map(PaletteColor::from).collect()
}

/// Sum of absolute per-channel differences.
pub fn calculate_manhattan_distance(a: &RgbColor, b: &RgbColor) -> i32 {
    (a.r - b.r).abs() + (a.g - b.g).abs() + (a.b - b.b).abs()
}

/// Linear interpolation from `a` (t = 0) to `b` (t = 1). `t` is clamped to 0.0-1.0 and each
/// channel rounds half away from zero.
pub fn interpolate_color(a: &RgbColor, b: &RgbColor, t: f64) -> RgbColor {
    let t = t.clamp(0.0, 1.0);
    let lerp = |from: i32, to: i32| (from as f64 + (to - from) as f64 * t).round() as i32;

    RgbColor::new(lerp(a.r, b.r), lerp(a.g, b.g), lerp(a.b, b.b))
}
