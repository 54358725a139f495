use serde::{Deserialize, Serialize};

use crate::score::score::{calculate_total_score, MAX_ROUND_SCORE};
use crate::{PaletteColor, Pin, RgbColor};

/// Snapshot of a single round. Rounds are never edited in place; every change produces a new
/// value that replaces the old one inside [`GameState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameRound {
    /// 1-based.
    pub round_number: u32,
    pub target_color: RgbColor,
    /// Set once the guess is submitted.
    pub selected_color: Option<RgbColor>,
    /// Manhattan distance between target and selection.
    pub distance: Option<i32>,
    /// 0-1000.
    pub score: Option<i32>,
    /// Choices offered in classic mode; empty in map mode.
    pub palette_colors: Vec<PaletteColor>,
    /// Player pin (map mode).
    pub pin: Option<Pin>,
    /// True location of the target (map mode), set when the round starts.
    pub target_pin: Option<Pin>,
    /// Seconds left on the round timer at submission (map mode).
    pub time_remaining: Option<u32>,
}

impl GameRound {
    pub fn new(round_number: u32, target_color: RgbColor, palette_colors: Vec<PaletteColor>) -> Self {
        Self {
            round_number,
            target_color,
            selected_color: None,
            distance: None,
            score: None,
            palette_colors,
            pin: None,
            target_pin: None,
            time_remaining: None,
        }
    }

    pub fn is_submitted(&self) -> bool {
        self.selected_color.is_some()
    }

    pub fn with_target_pin(&self, target_pin: Pin) -> Self {
        Self {
            target_color: target_pin.color,
            target_pin: Some(target_pin),
            ..self.clone()
        }
    }

    pub fn with_pin(&self, pin: Pin) -> Self {
        Self {
            pin: Some(pin),
            ..self.clone()
        }
    }

    pub fn with_result(
        &self,
        selected_color: RgbColor,
        distance: i32,
        score: i32,
        time_remaining: Option<u32>,
    ) -> Self {
        Self {
            selected_color: Some(selected_color),
            distance: Some(distance),
            score: Some(score),
            time_remaining,
            ..self.clone()
        }
    }
}

/// Snapshot of a whole game. Every transition returns a new `GameState`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub rounds: Vec<GameRound>,
    /// 0-based; equals `rounds.len()` once the last round has been left.
    pub current_round_index: usize,
    /// Authoritative completion flag.
    pub is_completed: bool,
    pub total_score: i32,
    /// Seconds per round (map mode only).
    pub time_limit: Option<u32>,
}

impl GameState {
    pub fn new(rounds: Vec<GameRound>, time_limit: Option<u32>) -> Self {
        Self {
            rounds,
            current_round_index: 0,
            is_completed: false,
            total_score: 0,
            time_limit,
        }
    }

    pub fn current_round(&self) -> Option<&GameRound> {
        self.rounds.get(self.current_round_index)
    }

    pub fn is_current_round_submitted(&self) -> bool {
        self.current_round()
            .map(GameRound::is_submitted)
            .unwrap_or(false)
    }

    /// Best possible total for this game.
    pub fn max_total_score(&self) -> i32 {
        self.rounds.len() as i32 * MAX_ROUND_SCORE
    }

    /// Returns a new state with the current round swapped for `round` and the total recomputed.
    /// Returns an unchanged copy when there is no current round.
    pub fn with_current_round(&self, round: GameRound) -> Self {
        if self.current_round_index >= self.rounds.len() {
            return self.clone();
        }

        let mut rounds = self.rounds.clone();
        rounds[self.current_round_index] = round;
        let total_score = calculate_total_score(&rounds);

        Self {
            rounds,
            total_score,
            ..self.clone()
        }
    }

    /// Moves to the next round, completing the game after the last one. A completed game is
    /// returned unchanged.
    pub fn advanced(&self) -> Self {
        if self.is_completed {
            log::debug!("Ignoring next round: game already completed");
            return self.clone();
        }

        let next_index = self.current_round_index + 1;
        let is_completed = next_index >= self.rounds.len();
        if is_completed {
            log::info!(
                "Game completed with {} / {} points",
                self.total_score,
                self.max_total_score()
            );
        }

        Self {
            current_round_index: next_index,
            is_completed,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MapCoordinate;

    fn three_round_game() -> GameState {
        let rounds = (1..=3)
            .map(|n| GameRound::new(n, RgbColor::new(250, 250, 250), Vec::new()))
            .collect();
        GameState::new(rounds, None)
    }

    #[test]
    fn test_new_game_state() {
        let state = three_round_game();
        assert_eq!(state.current_round_index, 0);
        assert!(!state.is_completed);
        assert_eq!(state.total_score, 0);
        assert_eq!(state.max_total_score(), 3000);
        assert_eq!(state.current_round().map(|r| r.round_number), Some(1));
    }

    #[test]
    fn test_with_current_round_recomputes_total() {
        let state = three_round_game();
        let played = state.rounds[0].with_result(RgbColor::new(253, 250, 250), 3, 900, None);
        let next = state.with_current_round(played);

        assert_eq!(next.total_score, 900);
        assert!(next.is_current_round_submitted());
        // The previous snapshot is untouched
        assert_eq!(state.total_score, 0);
        assert!(!state.is_current_round_submitted());
    }

    #[test]
    fn test_advance_through_all_rounds() {
        let mut state = three_round_game();
        for expected_index in 1..=3 {
            state = state.advanced();
            assert_eq!(state.current_round_index, expected_index);
        }
        assert!(state.is_completed);
        assert!(state.current_round().is_none());

        let after = state.advanced();
        assert_eq!(after, state);
    }

    #[test]
    fn test_with_current_round_after_completion_is_noop() {
        let state = three_round_game().advanced().advanced().advanced();
        let replacement = GameRound::new(9, RgbColor::WHITE, Vec::new());
        assert_eq!(state.with_current_round(replacement), state);
    }

    #[test]
    fn test_target_pin_sets_target_color() {
        let round = GameRound::new(1, RgbColor::WHITE, Vec::new());
        let pin = Pin::new(MapCoordinate::new(0.2, 0.8), RgbColor::new(247, 253, 251));
        let started = round.with_target_pin(pin);

        assert_eq!(started.target_color, pin.color);
        assert_eq!(started.target_pin, Some(pin));
        assert!(started.pin.is_none());
    }
}
