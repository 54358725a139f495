use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use shiro_core::{
    ClassicGame, ConfigManager, GameState, GradientMap, MapGameSession, RgbColor, Settings,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::runtime::Handle;

mod render;

/// Find the exact shade of white.
#[derive(Parser, Debug)]
#[command(name = "shiro")]
#[command(about = "Shiro Guessr white-color guessing game")]
struct Args {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for a reproducible game
    #[arg(long)]
    seed: Option<u64>,

    /// Rounds per game, overriding the config file
    #[arg(long)]
    rounds: Option<u32>,

    /// Print the final game state as JSON
    #[arg(long, default_value = "false")]
    json: bool,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand, Debug)]
enum Mode {
    /// Pick the target color out of a palette
    Classic {
        /// Palette size, overriding the config file
        #[arg(long)]
        palette_size: Option<usize>,
    },
    /// Pin the target color on a gradient map before the clock runs out
    Map {
        /// Seconds per round, overriding the config file
        #[arg(long)]
        time_limit: Option<u32>,

        /// Arm the clock but wait for `r` before it starts
        #[arg(long, default_value = "false")]
        paused: bool,
    },
    /// Show where a color sits on the standard gradient map
    Locate { r: i32, g: i32, b: i32 },
}

fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = ConfigManager::new(args.config.clone());
    let mut settings = config
        .load()
        .with_context(|| format!("loading {}", config.config_path().display()))?;

    apply_overrides(&mut settings, &args);
    ConfigManager::validate_settings(&settings).map_err(|errors| anyhow!(errors.join(", ")))?;

    let final_state = match args.mode {
        Mode::Classic { .. } => play_classic(&settings, args.seed)?,
        Mode::Map { paused, .. } => {
            // Timer ticks and player input share one scheduling thread
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(play_map(&settings, args.seed, paused))?
        }
        Mode::Locate { r, g, b } => {
            locate(&settings, RgbColor::new(r, g, b));
            None
        }
    };

    if let Some(state) = final_state {
        log::info!(
            "Game over: {} of {} rounds played, {} / {} points",
            state.rounds.iter().filter(|round| round.is_submitted()).count(),
            state.rounds.len(),
            state.total_score,
            state.max_total_score()
        );
        render::print_summary(&state);
        if args.json {
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }
    Ok(())
}

/// Command-line flags win over the config file.
fn apply_overrides(settings: &mut Settings, args: &Args) {
    if let Some(rounds) = args.rounds {
        log::info!("Overriding rounds per game: {}", rounds);
        settings.total_rounds = rounds;
    }
    match &args.mode {
        Mode::Classic {
            palette_size: Some(size),
        } => {
            log::info!("Overriding palette size: {}", size);
            settings.palette_size = *size;
        }
        Mode::Map {
            time_limit: Some(limit),
            ..
        } => {
            log::info!("Overriding round time limit: {}s", limit);
            settings.time_limit_secs = *limit;
        }
        _ => {}
    }
}

fn play_classic(settings: &Settings, seed: Option<u64>) -> anyhow::Result<Option<GameState>> {
    let mut game = ClassicGame::from_settings(settings, seed);
    game.start_new_game(settings.total_rounds);

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    while game.is_game_active() {
        let Some(round) = game.current_round().cloned() else {
            break;
        };

        println!();
        println!(
            "Round {} - find this white:  {}",
            round.round_number,
            render::swatch(&round.target_color, 12)
        );
        render::print_palette(&round);

        while !game.is_round_submitted() {
            print!("Pick 1-{} (q to quit): ", round.palette_colors.len());
            io::stdout().flush()?;

            let Some(line) = lines.next() else {
                return Ok(game.game_state().cloned());
            };
            let line = line.context("reading stdin")?;
            let input = line.trim();
            if input == "q" {
                return Ok(game.game_state().cloned());
            }

            let choice = input
                .parse::<usize>()
                .ok()
                .and_then(|n| n.checked_sub(1))
                .and_then(|i| round.palette_colors.get(i));
            match choice {
                Some(palette) => {
                    game.select_color(palette.color);
                    game.submit_answer();
                }
                None => println!("Not a palette number"),
            }
        }

        if let Some(played) = game.current_round() {
            render::print_round_result(played);
        }
        game.next_round();
    }

    Ok(game.game_state().cloned())
}

async fn play_map(
    settings: &Settings,
    seed: Option<u64>,
    paused: bool,
) -> anyhow::Result<Option<GameState>> {
    let session = MapGameSession::from_settings(settings, seed, Handle::current());
    session.start_new_game(!paused);
    if paused {
        log::info!("Clock armed at {}s, waiting for resume", settings.time_limit_secs);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut poll = tokio::time::interval(Duration::from_millis(250));

    while session.is_game_active() {
        let (Some(round), Some(map)) = (session.current_round(), session.gradient_map()) else {
            break;
        };

        println!();
        println!(
            "Round {} - find this white:  {}",
            round.round_number,
            render::swatch(&round.target_color, 12)
        );
        render::print_map(&map);
        println!("Enter `x y` (cells 0-9 or 0.0-1.0), `s` submit, `p` pause, `r` resume, `q` quit");
        if paused && !session.is_timer_running() {
            println!("Clock armed at {}s, `r` to start", session.time_remaining());
        }

        let mut last_announced = session.time_remaining();
        while !session.is_round_submitted() {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("reading stdin")? else {
                        return Ok(session.game_state());
                    };
                    if !handle_map_input(&session, &map, line.trim()) {
                        return Ok(session.game_state());
                    }
                }
                _ = poll.tick() => {
                    let remaining = session.time_remaining();
                    let announce = remaining != last_announced && remaining % 10 == 0;
                    if announce && session.is_timer_running() {
                        println!("{}s left", remaining);
                        last_announced = remaining;
                    }
                }
            }
        }

        if let Some(played) = session.current_round() {
            if played.time_remaining == Some(0) {
                println!("Time's up! Pin dropped at the map center.");
            }
            render::print_round_result(&played);
        }
        session.next_round();
    }

    Ok(session.game_state())
}

/// Applies one line of map-mode input. Returns false when the player quits.
fn handle_map_input(session: &MapGameSession, map: &GradientMap, input: &str) -> bool {
    match input {
        "q" => {
            log::info!("Quit during round {:?}", session.current_round().map(|r| r.round_number));
            return false;
        }
        "s" => {
            if session.has_pin_placed() {
                session.submit_guess();
            } else {
                println!("Place a pin first");
            }
        }
        "p" => {
            session.pause_timer();
            println!("Paused at {}s", session.time_remaining());
        }
        "r" => {
            session.resume_timer();
            println!("Running, {}s left", session.time_remaining());
        }
        _ => match render::parse_coordinate(input) {
            Some(coordinate) => {
                session.place_pin(coordinate);
                println!(
                    "Pin at ({:.2}, {:.2})  {}",
                    coordinate.x,
                    coordinate.y,
                    render::swatch(&map.get_color_at(coordinate), 6)
                );
            }
            None => println!("Unrecognized input"),
        },
    }
    true
}

fn locate(settings: &Settings, color: RgbColor) {
    let map = shiro_core::generate_gradient_map(settings.map_width, settings.map_height);
    let coordinate = map.find_coordinate_for_color_with_step(&color, settings.search_step);
    let found = map.get_color_at(coordinate);

    println!(
        "{} {} is closest to ({:.3}, {:.3}) where the map shows {} {} (distance {})",
        render::swatch(&color, 4),
        color,
        coordinate.x,
        coordinate.y,
        render::swatch(&found, 4),
        found,
        shiro_core::calculate_manhattan_distance(&color, &found)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from(["shiro", "--rounds", "3", "map", "--time-limit", "30"]);
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &args);

        assert_eq!(settings.total_rounds, 3);
        assert_eq!(settings.time_limit_secs, 30);
        assert_eq!(settings.palette_size, Settings::default().palette_size);
    }

    #[test]
    fn test_palette_size_only_applies_to_classic() {
        let args = Args::parse_from(["shiro", "classic", "--palette-size", "10"]);
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &args);

        assert_eq!(settings.palette_size, 10);
        assert_eq!(settings.total_rounds, Settings::default().total_rounds);
        assert_eq!(settings.time_limit_secs, Settings::default().time_limit_secs);
    }

    #[test]
    fn test_no_flags_keep_config() {
        let args = Args::parse_from(["shiro", "locate", "250", "250", "250"]);
        let mut settings = Settings::default();
        apply_overrides(&mut settings, &args);
        assert_eq!(settings, Settings::default());
    }
}
