//! Alex's well-being attributes and the mood derived from them.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::{
    MOOD_HAPPY_MEAN, MOOD_RELAXED_MEAN, MOOD_TIRED_MEAN, STAT_LEVEL_FAIR, STAT_LEVEL_GOOD,
    STAT_MAX, STAT_MIN, STAT_START,
};

/// One of the five clamped attributes of a [`StatVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatKey {
    Health,
    Energy,
    SleepQuality,
    Relationships,
    Productivity,
}

impl StatKey {
    pub const ALL: [Self; 5] = [
        Self::Health,
        Self::Energy,
        Self::SleepQuality,
        Self::Relationships,
        Self::Productivity,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Energy => "energy",
            Self::SleepQuality => "sleepQuality",
            Self::Relationships => "relationships",
            Self::Productivity => "productivity",
        }
    }
}

impl fmt::Display for StatKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    #[default]
    Happy,
    Relaxed,
    Tired,
    Stressed,
}

impl Mood {
    /// Mood band for the four mood-bearing stats. Lower bounds are inclusive.
    #[must_use]
    pub const fn from_mood_stats(
        health: i32,
        energy: i32,
        sleep_quality: i32,
        relationships: i32,
    ) -> Self {
        // mean >= t  <=>  sum >= 4t, which keeps the comparison exact.
        let sum = health + energy + sleep_quality + relationships;
        if sum >= MOOD_HAPPY_MEAN * 4 {
            Self::Happy
        } else if sum >= MOOD_RELAXED_MEAN * 4 {
            Self::Relaxed
        } else if sum >= MOOD_TIRED_MEAN * 4 {
            Self::Tired
        } else {
            Self::Stressed
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Relaxed => "relaxed",
            Self::Tired => "tired",
            Self::Stressed => "stressed",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse band of a single stat, used by presenters to colour gauges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatLevel {
    Good,
    Fair,
    Poor,
}

impl StatLevel {
    #[must_use]
    pub const fn of(value: i32) -> Self {
        if value >= STAT_LEVEL_GOOD {
            Self::Good
        } else if value >= STAT_LEVEL_FAIR {
            Self::Fair
        } else {
            Self::Poor
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatVector {
    pub health: i32,
    pub energy: i32,
    pub sleep_quality: i32,
    pub relationships: i32,
    pub productivity: i32,
    #[serde(default)]
    pub mood: Mood,
}

impl Default for StatVector {
    fn default() -> Self {
        let mut stats = Self {
            health: STAT_START,
            energy: STAT_START,
            sleep_quality: STAT_START,
            relationships: STAT_START,
            productivity: STAT_START,
            mood: Mood::default(),
        };
        stats.refresh_mood();
        stats
    }
}

impl StatVector {
    #[must_use]
    pub const fn get(&self, key: StatKey) -> i32 {
        match key {
            StatKey::Health => self.health,
            StatKey::Energy => self.energy,
            StatKey::SleepQuality => self.sleep_quality,
            StatKey::Relationships => self.relationships,
            StatKey::Productivity => self.productivity,
        }
    }

    const fn slot(&mut self, key: StatKey) -> &mut i32 {
        match key {
            StatKey::Health => &mut self.health,
            StatKey::Energy => &mut self.energy,
            StatKey::SleepQuality => &mut self.sleep_quality,
            StatKey::Relationships => &mut self.relationships,
            StatKey::Productivity => &mut self.productivity,
        }
    }

    /// Add `delta` to one stat and clamp it. Mood is not refreshed; callers
    /// batch deltas and call [`Self::refresh_mood`] once.
    pub fn apply_delta(&mut self, key: StatKey, delta: i32) {
        let slot = self.slot(key);
        *slot = slot.saturating_add(delta).clamp(STAT_MIN, STAT_MAX);
    }

    pub fn clamp(&mut self) {
        for key in StatKey::ALL {
            let slot = self.slot(key);
            *slot = (*slot).clamp(STAT_MIN, STAT_MAX);
        }
    }

    pub fn refresh_mood(&mut self) {
        self.mood = self.derive_mood();
    }

    /// Productivity does not influence mood.
    #[must_use]
    pub const fn derive_mood(&self) -> Mood {
        Mood::from_mood_stats(
            self.health,
            self.energy,
            self.sleep_quality,
            self.relationships,
        )
    }

    #[must_use]
    pub fn in_bounds(&self) -> bool {
        StatKey::ALL
            .iter()
            .all(|key| (STAT_MIN..=STAT_MAX).contains(&self.get(*key)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_mood_stats(value: i32) -> StatVector {
        let mut stats = StatVector {
            health: value,
            energy: value,
            sleep_quality: value,
            relationships: value,
            ..StatVector::default()
        };
        stats.refresh_mood();
        stats
    }

    #[test]
    fn mood_bands_use_inclusive_lower_bounds() {
        assert_eq!(with_mood_stats(80).mood, Mood::Happy);
        assert_eq!(with_mood_stats(70).mood, Mood::Happy);
        assert_eq!(with_mood_stats(69).mood, Mood::Relaxed);
        assert_eq!(with_mood_stats(50).mood, Mood::Relaxed);
        assert_eq!(with_mood_stats(30).mood, Mood::Tired);
        assert_eq!(with_mood_stats(29).mood, Mood::Stressed);
        assert_eq!(with_mood_stats(20).mood, Mood::Stressed);
    }

    #[test]
    fn mood_uses_exact_mean_not_rounded() {
        // Mean 69.75 stays below the happy band.
        let mut stats = StatVector {
            health: 70,
            energy: 70,
            sleep_quality: 70,
            relationships: 69,
            ..StatVector::default()
        };
        stats.refresh_mood();
        assert_eq!(stats.mood, Mood::Relaxed);
    }

    #[test]
    fn productivity_is_ignored_by_mood() {
        let mut stats = with_mood_stats(20);
        stats.productivity = 100;
        stats.refresh_mood();
        assert_eq!(stats.mood, Mood::Stressed);
    }

    #[test]
    fn deltas_clamp_to_bounds() {
        let mut stats = StatVector::default();
        stats.apply_delta(StatKey::Health, 500);
        stats.apply_delta(StatKey::Energy, -500);
        stats.apply_delta(StatKey::Productivity, i32::MAX);
        assert_eq!(stats.health, STAT_MAX);
        assert_eq!(stats.energy, STAT_MIN);
        assert_eq!(stats.productivity, STAT_MAX);
        assert!(stats.in_bounds());
    }

    #[test]
    fn default_vector_is_relaxed() {
        let stats = StatVector::default();
        assert_eq!(stats.mood, Mood::Relaxed);
        assert!(StatKey::ALL.iter().all(|key| stats.get(*key) == STAT_START));
    }

    #[test]
    fn stat_levels_follow_thresholds() {
        assert_eq!(StatLevel::of(70), StatLevel::Good);
        assert_eq!(StatLevel::of(40), StatLevel::Fair);
        assert_eq!(StatLevel::of(39), StatLevel::Poor);
    }
}
