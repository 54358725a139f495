use serde::{Deserialize, Serialize};

use crate::color::color_math::{calculate_manhattan_distance, interpolate_color};
use crate::RgbColor;

/// Grid step of the reference inverse search (51 × 51 points).
pub const DEFAULT_SEARCH_STEP: f64 = 0.02;
/// Finest step accepted by the inverse search; keeps the scan bounded.
pub const MIN_SEARCH_STEP: f64 = 0.001;
/// Default map size in pixels.
pub const DEFAULT_MAP_SIZE: u32 = 50;

/// Position inside a gradient map, both axes normalized to 0.0-1.0.
///
/// Nothing enforces the range; callers converting raw input should use [`MapCoordinate::clamped`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapCoordinate {
    pub x: f64,
    pub y: f64,
}

impl MapCoordinate {
    pub const CENTER: MapCoordinate = MapCoordinate { x: 0.5, y: 0.5 };

    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Builds a coordinate with both axes clamped to 0.0-1.0.
    pub fn clamped(x: f64, y: f64) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
        }
    }
}

/// A marker on the map carrying the color sampled where it was placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub coordinate: MapCoordinate,
    pub color: RgbColor,
}

impl Pin {
    pub fn new(coordinate: MapCoordinate, color: RgbColor) -> Self {
        Self { coordinate, color }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    fn index(&self) -> usize {
        match self {
            Corner::TopLeft => 0,
            Corner::TopRight => 1,
            Corner::BottomLeft => 2,
            Corner::BottomRight => 3,
        }
    }
}

/// Rectangular color field blended bilinearly from four corner colors.
///
/// `width` and `height` only describe rendering granularity; color lookups work on normalized
/// coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientMap {
    pub width: u32,
    pub height: u32,
    /// `[topLeft, topRight, bottomLeft, bottomRight]`
    corner_colors: [RgbColor; 4],
}

impl GradientMap {
    /// Creates a map from corner colors ordered `[topLeft, topRight, bottomLeft, bottomRight]`.
    ///
    /// # Panics
    ///
    /// Panics unless exactly four corner colors are given.
    pub fn new(width: u32, height: u32, corner_colors: Vec<RgbColor>) -> Self {
        let count = corner_colors.len();
        let corner_colors: [RgbColor; 4] = corner_colors.try_into().unwrap_or_else(|_| {
            panic!("GradientMap requires exactly 4 corner colors, got {}", count)
        });

        Self {
            width,
            height,
            corner_colors,
        }
    }

    pub fn corner_colors(&self) -> &[RgbColor; 4] {
        &self.corner_colors
    }

    pub fn corner(&self, corner: Corner) -> RgbColor {
        self.corner_colors[corner.index()]
    }

    /// Bilinear color lookup: blend along the top and bottom edges at `x`, then between the two
    /// edge colors at `y`. Coordinates outside 0.0-1.0 are clamped.
    pub fn get_color_at(&self, coordinate: MapCoordinate) -> RgbColor {
        let x = coordinate.x.clamp(0.0, 1.0);
        let y = coordinate.y.clamp(0.0, 1.0);

        let [top_left, top_right, bottom_left, bottom_right] = &self.corner_colors;

        let top = interpolate_color(top_left, top_right, x);
        let bottom = interpolate_color(bottom_left, bottom_right, x);
        interpolate_color(&top, &bottom, y)
    }

    /// Finds the coordinate whose color is closest to `color` using the reference grid step.
    pub fn find_coordinate_for_color(&self, color: &RgbColor) -> MapCoordinate {
        self.find_coordinate_for_color_with_step(color, DEFAULT_SEARCH_STEP)
    }

    /// Exhaustive grid search over the unit square. Rows are scanned top to bottom and each row
    /// left to right; the first point with the smallest Manhattan distance wins.
    pub fn find_coordinate_for_color_with_step(&self, color: &RgbColor, step: f64) -> MapCoordinate {
        let step = step.clamp(MIN_SEARCH_STEP, 1.0);
        // Last index lands on (or is clamped to) 1.0 so both edges are always sampled
        let steps = ((1.0 / step) - 1e-9).ceil() as usize;
        let axis = |i: usize| (i as f64 * step).min(1.0);

        let mut best = MapCoordinate::CENTER;
        let mut best_distance = i32::MAX;

        'scan: for yi in 0..=steps {
            for xi in 0..=steps {
                let coordinate = MapCoordinate::new(axis(xi), axis(yi));
                let distance = calculate_manhattan_distance(&self.get_color_at(coordinate), color);

                if distance < best_distance {
                    best_distance = distance;
                    best = coordinate;
                    if distance == 0 {
                        break 'scan;
                    }
                }
            }
        }

        log::debug!(
            "Located {} at ({:.2}, {:.2}) with distance {}",
            color,
            best.x,
            best.y,
            best_distance
        );
        best
    }
}

/// The map played in every map-mode round. Corners are fixed white-band colors so the layout is
/// the same from game to game.
pub fn generate_gradient_map(width: u32, height: u32) -> GradientMap {
    GradientMap::new(
        width,
        height,
        vec![
            RgbColor::new(245, 245, 245),
            RgbColor::new(255, 245, 255),
            RgbColor::new(245, 255, 255),
            RgbColor::new(255, 255, 245),
        ],
    )
}

impl Default for GradientMap {
    fn default() -> Self {
        generate_gradient_map(DEFAULT_MAP_SIZE, DEFAULT_MAP_SIZE)
    }
}
