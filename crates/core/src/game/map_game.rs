use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::color::color_math::calculate_manhattan_distance;
use crate::score::score::calculate_round_score;
use crate::{GameRound, GameState, GradientMap, MapCoordinate, Pin, RgbColor};

pub const DEFAULT_TIME_LIMIT_SECS: u32 = 60;

/// State transitions for map mode.
///
/// A round moves `Started -> PinPlaced (any number of times) -> Submitted`. Every method takes
/// the current snapshot and returns the next one; calls that do not apply return the input
/// unchanged.
pub struct MapGameService {
    rng: StdRng,
}

impl MapGameService {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Builds `total_rounds` unstarted rounds. Targets are placeholders until
    /// [`MapGameService::start_round`] picks them.
    pub fn create_new_game(&self, total_rounds: u32, time_limit: u32) -> GameState {
        let total_rounds = total_rounds.max(1);
        let rounds = (1..=total_rounds)
            .map(|round_number| GameRound::new(round_number, RgbColor::WHITE, Vec::new()))
            .collect();

        log::info!(
            "Created map game with {} rounds, {}s per round",
            total_rounds,
            time_limit
        );
        GameState::new(rounds, Some(time_limit))
    }

    /// Picks a uniformly random target location on `gradient_map` for the current round.
    pub fn start_round(&mut self, game_state: &GameState, gradient_map: &GradientMap) -> GameState {
        let Some(round) = game_state.current_round() else {
            return game_state.clone();
        };
        if round.is_submitted() {
            log::debug!("Round {} already submitted, not restarting", round.round_number);
            return game_state.clone();
        }

        let coordinate = MapCoordinate::new(
            self.rng.random_range(0.0..=1.0),
            self.rng.random_range(0.0..=1.0),
        );
        let target_pin = Pin::new(coordinate, gradient_map.get_color_at(coordinate));
        log::debug!(
            "Round {} target {} at ({:.3}, {:.3})",
            round.round_number,
            target_pin.color,
            coordinate.x,
            coordinate.y
        );

        game_state.with_current_round(round.with_target_pin(target_pin))
    }

    /// Places (or moves) the player's pin, sampling the map color under it.
    pub fn place_pin(
        &self,
        game_state: &GameState,
        coordinate: MapCoordinate,
        gradient_map: &GradientMap,
    ) -> GameState {
        let Some(round) = game_state.current_round() else {
            return game_state.clone();
        };
        if round.is_submitted() {
            return game_state.clone();
        }

        let pin = Pin::new(coordinate, gradient_map.get_color_at(coordinate));
        game_state.with_current_round(round.with_pin(pin))
    }

    /// Scores the placed pin against the target. Without a pin nothing happens.
    pub fn submit_guess(&self, game_state: &GameState, time_remaining: u32) -> GameState {
        let Some(round) = game_state.current_round() else {
            return game_state.clone();
        };
        let Some(pin) = round.pin else {
            log::debug!("Ignoring submit for round {}: no pin placed", round.round_number);
            return game_state.clone();
        };
        if round.is_submitted() {
            return game_state.clone();
        }

        let distance = calculate_manhattan_distance(&round.target_color, &pin.color);
        let score = calculate_round_score(distance);
        log::info!(
            "Round {}: target {} pin {} distance {} score {} ({}s left)",
            round.round_number,
            round.target_color,
            pin.color,
            distance,
            score,
            time_remaining
        );

        let submitted = round.with_result(pin.color, distance, score, Some(time_remaining));
        game_state.with_current_round(submitted)
    }

    /// Timer expiry: drop a pin at the map center and submit with no time left.
    pub fn handle_timeout(&self, game_state: &GameState, gradient_map: &GradientMap) -> GameState {
        log::info!("Round timed out, placing pin at map center");
        let with_pin = self.place_pin(game_state, MapCoordinate::CENTER, gradient_map);
        self.submit_guess(&with_pin, 0)
    }

    pub fn next_round(&self, game_state: &GameState) -> GameState {
        game_state.advanced()
    }
}

impl Default for MapGameService {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started() -> (MapGameService, GameState, GradientMap) {
        let mut service = MapGameService::with_seed(2024);
        let map = GradientMap::default();
        let state = service.create_new_game(5, 60);
        let state = service.start_round(&state, &map);
        (service, state, map)
    }

    #[test]
    fn test_create_new_game() {
        let service = MapGameService::with_seed(1);
        let state = service.create_new_game(5, 60);

        assert_eq!(state.rounds.len(), 5);
        assert_eq!(state.time_limit, Some(60));
        assert_eq!(state.current_round_index, 0);
        assert!(!state.is_completed);
        assert_eq!(state.total_score, 0);
        for round in &state.rounds {
            assert!(round.target_pin.is_none());
            assert!(round.pin.is_none());
            assert!(round.palette_colors.is_empty());
        }
    }

    #[test]
    fn test_start_round_sets_target_pin() {
        let (_, state, map) = started();
        let round = state.current_round().unwrap();
        let target_pin = round.target_pin.expect("target pin set");

        assert!(round.pin.is_none());
        assert!((0.0..=1.0).contains(&target_pin.coordinate.x));
        assert!((0.0..=1.0).contains(&target_pin.coordinate.y));
        assert_eq!(target_pin.color, map.get_color_at(target_pin.coordinate));
        assert_eq!(round.target_color, target_pin.color);
        // Later rounds are started one at a time
        assert!(state.rounds[1].target_pin.is_none());
    }

    #[test]
    fn test_place_pin_can_be_moved() {
        let (service, state, map) = started();
        let first = service.place_pin(&state, MapCoordinate::new(0.1, 0.1), &map);
        let moved = service.place_pin(&first, MapCoordinate::new(0.9, 0.4), &map);

        let pin = moved.current_round().unwrap().pin.unwrap();
        assert_eq!(pin.coordinate, MapCoordinate::new(0.9, 0.4));
        assert_eq!(pin.color, map.get_color_at(pin.coordinate));
        assert!(!moved.is_current_round_submitted());
    }

    #[test]
    fn test_submit_guess() {
        let (service, state, map) = started();
        let state = service.place_pin(&state, MapCoordinate::CENTER, &map);
        let state = service.submit_guess(&state, 42);

        let round = state.current_round().unwrap();
        let pin = round.pin.unwrap();
        let distance = calculate_manhattan_distance(&round.target_color, &pin.color);

        assert_eq!(pin.coordinate, MapCoordinate::CENTER);
        assert_eq!(round.selected_color, Some(pin.color));
        assert_eq!(round.time_remaining, Some(42));
        assert_eq!(round.distance, Some(distance));
        assert_eq!(round.score, Some(calculate_round_score(distance)));
        assert_eq!(state.total_score, round.score.unwrap());
    }

    #[test]
    fn test_submit_without_pin_is_noop() {
        let (service, state, _) = started();
        assert_eq!(service.submit_guess(&state, 30), state);
    }

    #[test]
    fn test_pin_after_submit_is_noop() {
        let (service, state, map) = started();
        let state = service.place_pin(&state, MapCoordinate::new(0.3, 0.3), &map);
        let state = service.submit_guess(&state, 10);

        assert_eq!(service.place_pin(&state, MapCoordinate::new(0.8, 0.8), &map), state);
        assert_eq!(service.submit_guess(&state, 5), state);
        assert_eq!(service.handle_timeout(&state, &map), state);
    }

    #[test]
    fn test_handle_timeout_without_pin() {
        let (service, state, map) = started();
        let state = service.handle_timeout(&state, &map);
        let round = state.current_round().unwrap();

        assert_eq!(round.pin.unwrap().coordinate, MapCoordinate::CENTER);
        assert_eq!(round.time_remaining, Some(0));
        assert_eq!(round.selected_color, Some(map.get_color_at(MapCoordinate::CENTER)));
        assert!(round.score.is_some());
    }

    #[test]
    fn test_handle_timeout_replaces_unsubmitted_pin() {
        let (service, state, map) = started();
        let state = service.place_pin(&state, MapCoordinate::new(0.0, 1.0), &map);
        let state = service.handle_timeout(&state, &map);
        assert_eq!(
            state.current_round().unwrap().pin.unwrap().coordinate,
            MapCoordinate::CENTER
        );
    }

    #[test]
    fn test_play_all_rounds() {
        let (mut service, mut state, map) = started();
        for _ in 0..5 {
            state = service.start_round(&state, &map);
            state = service.place_pin(&state, MapCoordinate::new(0.25, 0.75), &map);
            state = service.submit_guess(&state, 20);
            state = service.next_round(&state);
        }

        assert!(state.is_completed);
        assert_eq!(state.current_round_index, 5);
        let expected: i32 = state.rounds.iter().map(|r| r.score.unwrap()).sum();
        assert_eq!(state.total_score, expected);

        // Nothing applies once the game is over
        assert_eq!(service.start_round(&state, &map), state);
        assert_eq!(service.place_pin(&state, MapCoordinate::CENTER, &map), state);
        assert_eq!(service.next_round(&state), state);
    }

    #[test]
    fn test_start_round_after_submit_keeps_target() {
        let (mut service, state, map) = started();
        let state = service.handle_timeout(&state, &map);
        assert_eq!(service.start_round(&state, &map), state);
    }
}
