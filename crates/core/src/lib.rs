pub use color::color::{PaletteColor, RgbColor};
pub use color::color_math::{
    calculate_manhattan_distance, generate_all_white_colors, generate_random_white_color,
    get_random_palette_colors, interpolate_color, DEFAULT_PALETTE_SIZE, WHITE_COLOR_COUNT,
    WHITE_MAX, WHITE_MIN,
};
pub use config::{ConfigError, ConfigManager, ConfigSchema, Settings};
pub use game::classic::{ClassicGame, DEFAULT_TOTAL_ROUNDS};
pub use game::game_state::{GameRound, GameState};
pub use game::map_game::{MapGameService, DEFAULT_TIME_LIMIT_SECS};
pub use game::map_session::MapGameSession;
pub use gradient::gradient_map::{
    generate_gradient_map, Corner, GradientMap, MapCoordinate, Pin, DEFAULT_MAP_SIZE,
    DEFAULT_SEARCH_STEP,
};
pub use score::score::{
    calculate_round_score, calculate_total_score, MAX_DISTANCE, MAX_ROUND_SCORE,
};
pub use timer::round_timer::{RoundTimer, TimeoutCallback};

mod color;
mod config;
mod game;
mod gradient;
mod score;
mod timer;
