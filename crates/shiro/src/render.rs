use crossterm::style::{Color, Stylize};
use shiro_core::{GameRound, GameState, GradientMap, MapCoordinate, RgbColor};

/// Cells per axis when drawing the gradient map.
const MAP_CELLS: usize = 10;

fn channel(value: i32) -> u8 {
    value.clamp(0, 255) as u8
}

pub fn swatch(color: &RgbColor, width: usize) -> String {
    let block = " ".repeat(width);
    block
        .on(Color::Rgb {
            r: channel(color.r),
            g: channel(color.g),
            b: channel(color.b),
        })
        .to_string()
}

pub fn print_palette(round: &GameRound) {
    for (row, chunk) in round.palette_colors.chunks(5).enumerate() {
        let line: Vec<String> = chunk
            .iter()
            .enumerate()
            .map(|(col, palette)| {
                format!("{:>3} {}", row * 5 + col + 1, swatch(&palette.color, 6))
            })
            .collect();
        println!("{}", line.join("  "));
    }
}

/// Draws the map as a grid of cells sampled at their centers, with the column and row indices
/// used to enter coordinates.
pub fn print_map(map: &GradientMap) {
    let header: String = (0..MAP_CELLS).map(|x| format!("{:<4}", x)).collect();
    println!("    {}", header);
    for y in 0..MAP_CELLS {
        let row: String = (0..MAP_CELLS)
            .map(|x| swatch(&map.get_color_at(cell_center(x, y)), 4))
            .collect();
        println!("{:>2}  {}", y, row);
    }
}

fn cell_center(x: usize, y: usize) -> MapCoordinate {
    MapCoordinate::new(
        (x as f64 + 0.5) / MAP_CELLS as f64,
        (y as f64 + 0.5) / MAP_CELLS as f64,
    )
}

/// Parses `x y` where each value is either a cell index (`3`) or a normalized value (`0.31`).
pub fn parse_coordinate(input: &str) -> Option<MapCoordinate> {
    let mut parts = input.split_whitespace();
    let x = parse_axis(parts.next()?)?;
    let y = parse_axis(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    Some(MapCoordinate::clamped(x, y))
}

fn parse_axis(token: &str) -> Option<f64> {
    if token.contains('.') {
        token.parse().ok()
    } else {
        let cell: usize = token.parse().ok()?;
        Some((cell as f64 + 0.5) / MAP_CELLS as f64)
    }
}

pub fn print_round_result(round: &GameRound) {
    let (Some(selected), Some(distance), Some(score)) =
        (round.selected_color, round.distance, round.score)
    else {
        return;
    };

    println!(
        "Target {} {}   Yours {} {}",
        swatch(&round.target_color, 4),
        round.target_color,
        swatch(&selected, 4),
        selected
    );
    if let Some(target_pin) = round.target_pin {
        println!(
            "Target was at ({:.2}, {:.2})",
            target_pin.coordinate.x, target_pin.coordinate.y
        );
    }
    println!("Distance {}  ->  {} points", distance, score);
}

pub fn print_summary(state: &GameState) {
    println!();
    println!("Final score: {} / {}", state.total_score, state.max_total_score());
    for round in &state.rounds {
        println!(
            "  Round {}: {} points (distance {})",
            round.round_number,
            round.score.unwrap_or(0),
            round.distance.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
        );
    }
}
