//! Centralized balance and tuning constants for Dream Story game logic.
//!
//! These values define the deterministic math for the core simulation.
//! Keeping them together ensures that gameplay can only be adjusted via
//! code changes reviewed in version control. `SessionConfig` exposes the
//! subset that embedders may tune at runtime.

// Clock --------------------------------------------------------------------
/// Simulated minutes added by every clock tick.
pub const GAME_MINUTES_PER_TICK: i64 = 15;
pub const MINUTES_PER_DAY: i64 = 24 * 60;
/// Real-time length of one clock tick for the real-time driver.
pub const REALTIME_TICK_MS: u64 = 1_000;
/// The situation scheduler runs once every this many clock ticks.
pub const SCHEDULER_TICK_STRIDE: u32 = 2;
pub const START_YEAR: i32 = 2024;
pub const START_MONTH: u32 = 1;
pub const START_DAY: u32 = 1;
pub const START_HOUR: u32 = 7;

// Situations ---------------------------------------------------------------
/// Probability that an evaluation with eligible candidates offers one.
pub const SITUATION_TRIGGER_CHANCE: f64 = 0.10;
/// Converts situation effect magnitudes into both score points and stat deltas.
pub const SITUATION_EFFECT_MULTIPLIER: i32 = 10;

// Stats --------------------------------------------------------------------
pub const STAT_MIN: i32 = 0;
pub const STAT_MAX: i32 = 100;
pub const STAT_START: i32 = 50;
pub const MOOD_HAPPY_MEAN: i32 = 70;
pub const MOOD_RELAXED_MEAN: i32 = 50;
pub const MOOD_TIRED_MEAN: i32 = 30;
pub const STAT_LEVEL_GOOD: i32 = 70;
pub const STAT_LEVEL_FAIR: i32 = 40;

// Persistence --------------------------------------------------------------
pub const SAVE_SLOT: &str = "dream-story-save";
pub const SAVE_SCHEMA_VERSION: &str = "1.0.0";

// Feedback keys ------------------------------------------------------------
pub(crate) const MSG_PAUSED: &str = "The game is paused. Resume to keep playing.";
pub(crate) const MSG_NO_SITUATION: &str = "There is no situation waiting for an answer.";
pub(crate) const MSG_SITUATION_DONE: &str = "Alex has already dealt with this situation.";
pub(crate) const MSG_NO_CONFIRMATION: &str = "There is no action waiting for confirmation.";
pub(crate) const MSG_SAVED: &str = "Game saved.";
pub(crate) const MSG_SAVE_FAILED: &str = "The game could not be saved.";
