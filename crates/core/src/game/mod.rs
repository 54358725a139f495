pub mod classic;
pub mod game_state;
pub mod map_game;
pub mod map_session;
