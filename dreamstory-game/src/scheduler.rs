//! Probabilistic offering of eligible situations.
use rand::{Rng, RngCore};
use std::collections::VecDeque;

use crate::clock;
use crate::constants::SITUATION_TRIGGER_CHANCE;
use crate::data::{Situation, SituationBank};
use crate::state::SimulationState;

/// Source of the scheduler's random draws.
pub trait RollSource {
    /// Uniform draw in `[0, 1)`.
    fn roll_unit(&mut self) -> f64;
    /// Uniform index in `0..len`; `len` is never zero.
    fn roll_index(&mut self, len: usize) -> usize;
}

impl<R: RngCore> RollSource for R {
    fn roll_unit(&mut self) -> f64 {
        self.random::<f64>()
    }

    fn roll_index(&mut self, len: usize) -> usize {
        self.random_range(0..len)
    }
}

/// Pre-scripted draws for exact scheduler tests and replays.
///
/// Once exhausted, unit draws return `1.0` (never triggers) and index draws
/// return `0`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRolls {
    units: VecDeque<f64>,
    indices: VecDeque<usize>,
}

impl ScriptedRolls {
    #[must_use]
    pub fn new(units: impl IntoIterator<Item = f64>, indices: impl IntoIterator<Item = usize>) -> Self {
        Self {
            units: units.into_iter().collect(),
            indices: indices.into_iter().collect(),
        }
    }

    /// Every evaluation triggers and picks the first candidate.
    #[must_use]
    pub fn always() -> Self {
        Self::default().repeat_unit(0.0, 4096)
    }

    #[must_use]
    pub fn repeat_unit(mut self, value: f64, times: usize) -> Self {
        self.units.extend(std::iter::repeat_n(value, times));
        self
    }

    pub fn push_unit(&mut self, value: f64) {
        self.units.push_back(value);
    }

    pub fn push_index(&mut self, index: usize) {
        self.indices.push_back(index);
    }

    #[must_use]
    pub fn remaining_units(&self) -> usize {
        self.units.len()
    }
}

impl RollSource for ScriptedRolls {
    fn roll_unit(&mut self) -> f64 {
        self.units.pop_front().unwrap_or(1.0)
    }

    fn roll_index(&mut self, len: usize) -> usize {
        self.indices.pop_front().unwrap_or(0).min(len.saturating_sub(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SituationScheduler {
    pub trigger_chance: f64,
}

impl Default for SituationScheduler {
    fn default() -> Self {
        Self {
            trigger_chance: SITUATION_TRIGGER_CHANCE,
        }
    }
}

impl SituationScheduler {
    #[must_use]
    pub const fn new(trigger_chance: f64) -> Self {
        Self { trigger_chance }
    }

    /// Evaluate the bank at the state's current moment.
    ///
    /// Returns `None` without drawing when paused, when a situation is already
    /// awaiting, or when nothing is eligible. Otherwise draws once against the
    /// trigger chance and, on success, once more to pick a candidate
    /// uniformly. The returned situation is not marked occurred here.
    pub fn maybe_trigger<'a, R>(
        &self,
        state: &SimulationState,
        bank: &'a SituationBank,
        awaiting: bool,
        rolls: &mut R,
    ) -> Option<&'a Situation>
    where
        R: RollSource + ?Sized,
    {
        if state.is_paused || awaiting {
            return None;
        }
        let weekday = clock::weekday(state.game_time);
        let now = clock::time_label(state.game_time);
        let candidates = bank.eligible_at(weekday, &now, &state.occurred_situations);
        if candidates.is_empty() {
            return None;
        }

        let draw = rolls.roll_unit();
        log::debug!(
            "scheduler at {weekday} {now}: {} candidate(s), draw {draw:.3}",
            candidates.len()
        );
        if draw >= self.trigger_chance {
            return None;
        }
        let index = rolls.roll_index(candidates.len());
        candidates.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SituationOptions;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand_chacha::ChaCha20Rng;

    fn situation(id: u32, start: &str, end: &str) -> Situation {
        Situation {
            id,
            title: format!("S{id}"),
            description: String::new(),
            weekdays: vec!["segunda".to_string()],
            start: start.to_string(),
            end: end.to_string(),
            options: SituationOptions::default(),
        }
    }

    fn monday_at(hour: u32, minute: u32) -> SimulationState {
        let mut state = SimulationState::default();
        state.game_time = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|date| date.and_hms_opt(hour, minute, 0))
            .unwrap();
        state
    }

    fn bank() -> SituationBank {
        SituationBank::new(vec![
            situation(1, "07:00", "09:00"),
            situation(2, "08:00", "10:00"),
            situation(3, "20:00", "21:00"),
        ])
    }

    #[test]
    fn draw_below_chance_triggers_chosen_candidate() {
        let bank = bank();
        let state = monday_at(8, 30);
        let mut rolls = ScriptedRolls::new([0.05], [1]);
        let picked = SituationScheduler::default().maybe_trigger(&state, &bank, false, &mut rolls);
        assert_eq!(picked.map(|s| s.id), Some(2));
    }

    #[test]
    fn draw_at_or_above_chance_does_not_trigger() {
        let bank = bank();
        let state = monday_at(8, 30);
        let scheduler = SituationScheduler::default();
        let mut rolls = ScriptedRolls::new([0.10, 0.99], []);
        assert!(scheduler.maybe_trigger(&state, &bank, false, &mut rolls).is_none());
        assert!(scheduler.maybe_trigger(&state, &bank, false, &mut rolls).is_none());
        assert_eq!(rolls.remaining_units(), 0);
    }

    #[test]
    fn no_draw_without_candidates() {
        let bank = bank();
        let state = monday_at(12, 0);
        let mut rolls = ScriptedRolls::new([0.0], []);
        assert!(
            SituationScheduler::default()
                .maybe_trigger(&state, &bank, false, &mut rolls)
                .is_none()
        );
        assert_eq!(rolls.remaining_units(), 1);
    }

    #[test]
    fn suppressed_while_paused_or_awaiting() {
        let bank = bank();
        let scheduler = SituationScheduler::default();
        let mut rolls = ScriptedRolls::always();

        let mut paused = monday_at(8, 0);
        paused.is_paused = true;
        assert!(scheduler.maybe_trigger(&paused, &bank, false, &mut rolls).is_none());

        let running = monday_at(8, 0);
        assert!(scheduler.maybe_trigger(&running, &bank, true, &mut rolls).is_none());
        assert!(scheduler.maybe_trigger(&running, &bank, false, &mut rolls).is_some());
    }

    #[test]
    fn occurred_situations_are_skipped() {
        let bank = bank();
        let mut state = monday_at(8, 30);
        state.occurred_situations.insert(1);
        let mut rolls = ScriptedRolls::always();
        let picked = SituationScheduler::default().maybe_trigger(&state, &bank, false, &mut rolls);
        assert_eq!(picked.map(|s| s.id), Some(2));
    }

    #[test]
    fn seeded_rng_is_reproducible() {
        let bank = bank();
        let state = monday_at(8, 30);
        let scheduler = SituationScheduler::new(0.5);
        let run = |seed: u64| {
            let mut rng = ChaCha20Rng::seed_from_u64(seed);
            (0..32)
                .map(|_| scheduler.maybe_trigger(&state, &bank, false, &mut rng).map(|s| s.id))
                .collect::<Vec<_>>()
        };
        assert_eq!(run(11), run(11));
    }
}
