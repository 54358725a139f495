use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::color::color_math::{
    calculate_manhattan_distance, generate_random_white_color, get_random_palette_colors,
    DEFAULT_PALETTE_SIZE,
};
use crate::score::score::calculate_round_score;
use crate::{GameRound, GameState, RgbColor, Settings};

pub const DEFAULT_TOTAL_ROUNDS: u32 = 5;

/// Classic mode: pick the target color out of a palette.
///
/// Each round moves `Unplayed -> Selected -> Submitted`. The selection is tentative and lives
/// outside the [`GameState`]; only submission produces a new snapshot.
pub struct ClassicGame {
    rng: StdRng,
    total_rounds: u32,
    palette_size: usize,
    game_state: Option<GameState>,
    selected_color: Option<RgbColor>,
}

impl ClassicGame {
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Deterministic games for tests and replays.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_settings(settings: &Settings, seed: Option<u64>) -> Self {
        let mut game = match seed {
            Some(seed) => Self::with_seed(seed),
            None => Self::new(),
        };
        game.total_rounds = settings.total_rounds;
        game.palette_size = settings.palette_size;
        game
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            palette_size: DEFAULT_PALETTE_SIZE,
            game_state: None,
            selected_color: None,
        }
    }

    /// Builds a fresh game. Every round gets its own random target and an independently sampled
    /// palette, so the target is not guaranteed to be one of the choices.
    pub fn start_new_game(&mut self, total_rounds: u32) {
        let total_rounds = total_rounds.max(1);
        let rounds = (1..=total_rounds)
            .map(|round_number| {
                let target_color = generate_random_white_color(&mut self.rng);
                let palette = get_random_palette_colors(&mut self.rng, self.palette_size);
                GameRound::new(round_number, target_color, palette)
            })
            .collect();

        log::info!("Starting classic game with {} rounds", total_rounds);
        self.game_state = Some(GameState::new(rounds, None));
        self.selected_color = None;
    }

    /// Starts over with the configured number of rounds.
    pub fn reset_game(&mut self) {
        self.start_new_game(self.total_rounds);
    }

    /// Records a tentative selection for the current round.
    pub fn select_color(&mut self, color: RgbColor) {
        if !self.is_game_active() || self.is_round_submitted() {
            log::debug!("Ignoring selection of {}: round not accepting input", color);
            return;
        }
        self.selected_color = Some(color);
    }

    /// Scores the selection against the current round's target.
    pub fn submit_answer(&mut self) {
        let (Some(state), Some(selected)) = (&self.game_state, self.selected_color) else {
            log::debug!("Ignoring submit: no game or no selection");
            return;
        };
        let Some(round) = state.current_round() else {
            return;
        };
        if round.is_submitted() {
            return;
        }

        let distance = calculate_manhattan_distance(&round.target_color, &selected);
        let score = calculate_round_score(distance);
        log::info!(
            "Round {}: target {} selected {} distance {} score {}",
            round.round_number,
            round.target_color,
            selected,
            distance,
            score
        );

        let submitted = round.with_result(selected, distance, score, None);
        self.game_state = Some(state.with_current_round(submitted));
    }

    /// Advances to the next round and clears the selection.
    pub fn next_round(&mut self) {
        let Some(state) = &self.game_state else {
            return;
        };
        self.game_state = Some(state.advanced());
        self.selected_color = None;
    }

    pub fn game_state(&self) -> Option<&GameState> {
        self.game_state.as_ref()
    }

    pub fn current_round(&self) -> Option<&GameRound> {
        self.game_state.as_ref()?.current_round()
    }

    pub fn selected_color(&self) -> Option<RgbColor> {
        self.selected_color
    }

    pub fn has_selected_color(&self) -> bool {
        self.selected_color.is_some()
    }

    pub fn is_round_submitted(&self) -> bool {
        self.current_round()
            .map(GameRound::is_submitted)
            .unwrap_or(false)
    }

    pub fn is_game_active(&self) -> bool {
        self.game_state
            .as_ref()
            .map(|state| !state.is_completed)
            .unwrap_or(false)
    }
}

impl Default for ClassicGame {
    fn default() -> Self {
        Self::new()
    }
}
