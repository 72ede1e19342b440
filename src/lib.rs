//! Flappy Band - a Flappy Bird style arcade game with a global leaderboard
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, obstacles, collisions, scoring)
//! - `flow`: Screen state machine (start, character select, play, game over, ranking)
//! - `leaderboard`: Leaderboard contract, in-memory store and request boundary
//! - `player`: Local player identity and name validation
//! - `tuning`: Data-driven game balance
//! - `clock`: Wall-clock to fixed-tick conversion

pub mod character;
pub mod clock;
pub mod flow;
pub mod leaderboard;
pub mod player;
pub mod sim;
pub mod tuning;

pub use character::{Character, Instrument};
pub use clock::FrameClock;
pub use flow::{FlowCommand, Screen, ScreenFlow};
pub use player::{Player, PlayerRecord};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate (ticks per second)
    pub const TICK_RATE: f64 = 60.0;
    /// Duration of one tick in milliseconds
    pub const TICK_MS: f64 = 1000.0 / TICK_RATE;
    /// Maximum ticks run for a single frame callback
    pub const MAX_TICKS_PER_FRAME: u32 = 5;
    /// Longest frame delta accepted before clamping (tab switches, debugger pauses)
    pub const MAX_FRAME_DELTA_MS: f64 = 250.0;

    /// Highest score the leaderboard accepts
    pub const MAX_SUBMITTED_SCORE: u32 = 1000;
    /// Largest leaderboard page that can be requested
    pub const MAX_LEADERBOARD_LIMIT: usize = 50;
    /// Page size used by the ranking screen
    pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;
}

/// Current wall-clock time in milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> f64 {
    js_sys::Date::now()
}

/// Current wall-clock time in milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64() * 1000.0)
        .unwrap_or(0.0)
}
