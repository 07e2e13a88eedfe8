//! Simulated calendar: fixed-increment ticks and midnight rollover.
use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta, Weekday};
use serde::{Deserialize, Serialize};

use crate::constants::{GAME_MINUTES_PER_TICK, START_DAY, START_HOUR, START_MONTH, START_YEAR};
use crate::state::SimulationState;

/// What a single clock tick did to the state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ClockTransition {
    /// The state was paused; nothing changed.
    Frozen,
    Advanced,
    /// The calendar date changed; `day` is the new `current_day`.
    Rollover { day: u32 },
}

/// Simulated time of a new game: 2024-01-01 07:00, a Monday.
#[must_use]
pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(START_YEAR, START_MONTH, START_DAY)
        .and_then(|date| date.and_hms_opt(START_HOUR, 0, 0))
        .unwrap_or_default()
}

#[must_use]
pub fn weekday(time: NaiveDateTime) -> Weekday {
    time.weekday()
}

/// Zero-padded 24h `HH:MM` label, the format situation windows use.
#[must_use]
pub fn time_label(time: NaiveDateTime) -> String {
    time.format("%H:%M").to_string()
}

/// Advance by the standard tick increment.
pub fn advance(state: &mut SimulationState) -> ClockTransition {
    advance_minutes(state, GAME_MINUTES_PER_TICK)
}

/// Advance by `minutes` of simulated time. Crossing midnight bumps
/// `current_day` once per date crossed and clears the daily action flags.
pub fn advance_minutes(state: &mut SimulationState, minutes: i64) -> ClockTransition {
    if state.is_paused {
        return ClockTransition::Frozen;
    }
    let Some(next) = TimeDelta::try_minutes(minutes)
        .and_then(|step| state.game_time.checked_add_signed(step))
    else {
        log::warn!("clock step of {minutes} minutes overflows the calendar; tick ignored");
        return ClockTransition::Frozen;
    };

    let before = state.game_time.date();
    state.game_time = next;
    let crossed = (next.date() - before).num_days();
    if crossed <= 0 {
        log::debug!("clock at {}", next.format("%a %H:%M"));
        return ClockTransition::Advanced;
    }

    let crossed = u32::try_from(crossed).unwrap_or(u32::MAX);
    state.current_day = state.current_day.saturating_add(crossed);
    state.daily_actions.reset();
    log::info!(
        "day {} begins ({})",
        state.current_day,
        weekday(state.game_time)
    );
    ClockTransition::Rollover {
        day: state.current_day,
    }
}
