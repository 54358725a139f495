pub mod round_timer;
