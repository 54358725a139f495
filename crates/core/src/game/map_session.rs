use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;

use crate::game::classic::DEFAULT_TOTAL_ROUNDS;
use crate::game::map_game::DEFAULT_TIME_LIMIT_SECS;
use crate::gradient::gradient_map::{generate_gradient_map, DEFAULT_MAP_SIZE};
use crate::{
    GameRound, GameState, GradientMap, MapCoordinate, MapGameService, RoundTimer, Settings,
};

struct SessionState {
    service: MapGameService,
    game_state: Option<GameState>,
    gradient_map: Option<GradientMap>,
    /// Bumped whenever a round begins; a timeout armed for an earlier round is ignored.
    round_generation: u64,
}

impl SessionState {
    fn current_round(&self) -> Option<&GameRound> {
        self.game_state.as_ref()?.current_round()
    }

    fn is_round_submitted(&self) -> bool {
        self.current_round()
            .map(GameRound::is_submitted)
            .unwrap_or(false)
    }

    fn apply_timeout(&mut self, round_generation: u64) {
        if round_generation != self.round_generation || self.is_round_submitted() {
            log::debug!("Ignoring timeout: round already submitted or replaced");
            return;
        }
        let (Some(game_state), Some(gradient_map)) = (&self.game_state, &self.gradient_map)
        else {
            return;
        };
        self.game_state = Some(self.service.handle_timeout(game_state, gradient_map));
    }
}

/// A map-mode game bound to its round timer.
///
/// Holds the current snapshot and the gradient map of the round being played. When the timer
/// runs out before the player submits, the round is played automatically with a pin at the map
/// center.
pub struct MapGameSession {
    shared: Arc<Mutex<SessionState>>,
    timer: RoundTimer,
    total_rounds: u32,
    time_limit: u32,
    map_width: u32,
    map_height: u32,
}

impl MapGameSession {
    pub fn new(service: MapGameService, timer: RoundTimer) -> Self {
        Self {
            shared: Arc::new(Mutex::new(SessionState {
                service,
                game_state: None,
                gradient_map: None,
                round_generation: 0,
            })),
            timer,
            total_rounds: DEFAULT_TOTAL_ROUNDS,
            time_limit: DEFAULT_TIME_LIMIT_SECS,
            map_width: DEFAULT_MAP_SIZE,
            map_height: DEFAULT_MAP_SIZE,
        }
    }

    pub fn from_settings(settings: &Settings, seed: Option<u64>, runtime: Handle) -> Self {
        let service = match seed {
            Some(seed) => MapGameService::with_seed(seed),
            None => MapGameService::new(),
        };
        let mut session = Self::new(service, RoundTimer::new(runtime));
        session.total_rounds = settings.total_rounds;
        session.time_limit = settings.time_limit_secs;
        session.map_width = settings.map_width;
        session.map_height = settings.map_height;
        session
    }

    /// Creates a game and starts its first round. With `start_timer` false the clock is armed
    /// but waits for [`MapGameSession::resume_timer`], e.g. while a tutorial is shown.
    pub fn start_new_game(&self, start_timer: bool) {
        self.timer.stop_timer();

        {
            let mut shared = self.shared.lock();
            let gradient_map = generate_gradient_map(self.map_width, self.map_height);
            let game_state = shared
                .service
                .create_new_game(self.total_rounds, self.time_limit);
            let game_state = shared.service.start_round(&game_state, &gradient_map);

            shared.game_state = Some(game_state);
            shared.gradient_map = Some(gradient_map);
            shared.round_generation += 1;
        }

        if start_timer {
            self.start_round_timer();
        } else {
            self.timer.set_time(self.time_limit, self.timeout_handler());
        }
    }

    pub fn reset_game(&self) {
        self.start_new_game(true);
    }

    /// Places or moves the pin for the current round.
    pub fn place_pin(&self, coordinate: MapCoordinate) {
        let mut shared = self.shared.lock();
        if shared.is_round_submitted() {
            return;
        }
        let (Some(game_state), Some(gradient_map)) = (&shared.game_state, &shared.gradient_map)
        else {
            return;
        };

        let next = shared.service.place_pin(game_state, coordinate, gradient_map);
        shared.game_state = Some(next);
    }

    /// Stops the clock and scores the placed pin with the seconds left.
    pub fn submit_guess(&self) {
        let mut shared = self.shared.lock();
        let has_pin = shared
            .current_round()
            .map(|round| round.pin.is_some())
            .unwrap_or(false);
        if !has_pin || shared.is_round_submitted() {
            return;
        }

        self.timer.stop_timer();
        let time_remaining = self.timer.time_remaining();

        if let Some(game_state) = &shared.game_state {
            let next = shared.service.submit_guess(game_state, time_remaining);
            shared.game_state = Some(next);
        }
    }

    /// Advances to the next round with a fresh map and a full clock, or stops the clock when
    /// the game is over.
    pub fn next_round(&self) {
        let completed = {
            let mut shared = self.shared.lock();
            let Some(game_state) = &shared.game_state else {
                return;
            };

            let advanced = shared.service.next_round(game_state);
            shared.round_generation += 1;
            if advanced.is_completed {
                shared.game_state = Some(advanced);
                true
            } else {
                let gradient_map = generate_gradient_map(self.map_width, self.map_height);
                let started = shared.service.start_round(&advanced, &gradient_map);
                shared.game_state = Some(started);
                shared.gradient_map = Some(gradient_map);
                false
            }
        };

        if completed {
            self.timer.stop_timer();
        } else {
            self.start_round_timer();
        }
    }

    pub fn pause_timer(&self) {
        self.timer.pause_timer();
    }

    pub fn resume_timer(&self) {
        if !self.timer.is_running() && self.timer.time_remaining() > 0 {
            self.timer.resume_timer();
        }
    }

    pub fn game_state(&self) -> Option<GameState> {
        self.shared.lock().game_state.clone()
    }

    pub fn current_round(&self) -> Option<GameRound> {
        self.shared.lock().current_round().cloned()
    }

    pub fn gradient_map(&self) -> Option<GradientMap> {
        self.shared.lock().gradient_map.clone()
    }

    pub fn is_round_submitted(&self) -> bool {
        self.shared.lock().is_round_submitted()
    }

    pub fn is_game_active(&self) -> bool {
        self.shared
            .lock()
            .game_state
            .as_ref()
            .map(|state| !state.is_completed)
            .unwrap_or(false)
    }

    pub fn has_pin_placed(&self) -> bool {
        self.shared
            .lock()
            .current_round()
            .map(|round| round.pin.is_some())
            .unwrap_or(false)
    }

    pub fn time_remaining(&self) -> u32 {
        self.timer.time_remaining()
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }

    fn start_round_timer(&self) {
        self.timer
            .start_timer(self.time_limit, self.timeout_handler());
    }

    fn timeout_handler(&self) -> impl FnOnce() + Send + 'static {
        let round_generation = self.shared.lock().round_generation;
        let shared = Arc::downgrade(&self.shared);
        move || {
            if let Some(shared) = shared.upgrade() {
                shared.lock().apply_timeout(round_generation);
            }
        }
    }
}
