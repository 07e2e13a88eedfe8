//! Runtime-tunable session settings.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    GAME_MINUTES_PER_TICK, MINUTES_PER_DAY, SCHEDULER_TICK_STRIDE, SITUATION_EFFECT_MULTIPLIER,
    SITUATION_TRIGGER_CHANCE,
};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("session config is not valid JSON: {0}")]
    Json(String),
    #[error("minutes per tick must be within 1..=1440, got {0}")]
    MinutesPerTick(i64),
    #[error("scheduler stride must be at least 1")]
    ZeroStride,
    #[error("trigger chance must be within [0, 1], got {0}")]
    TriggerChance(f64),
    #[error("effect multiplier must be positive, got {0}")]
    EffectMultiplier(i32),
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

/// Pacing and balance knobs for a [`crate::GameSession`]. Every field
/// defaults to the shipped balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub minutes_per_tick: i64,
    pub scheduler_stride: u32,
    pub trigger_chance: f64,
    pub effect_multiplier: i32,
    /// Whether the location cursor may move while the game is paused.
    pub navigation_while_paused: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            minutes_per_tick: GAME_MINUTES_PER_TICK,
            scheduler_stride: SCHEDULER_TICK_STRIDE,
            trigger_chance: SITUATION_TRIGGER_CHANCE,
            effect_multiplier: SITUATION_EFFECT_MULTIPLIER,
            navigation_while_paused: true,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON config document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns the first out-of-range field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MINUTES_PER_DAY).contains(&self.minutes_per_tick) {
            return Err(ConfigError::MinutesPerTick(self.minutes_per_tick));
        }
        if self.scheduler_stride == 0 {
            return Err(ConfigError::ZeroStride);
        }
        if !(0.0..=1.0).contains(&self.trigger_chance) {
            return Err(ConfigError::TriggerChance(self.trigger_chance));
        }
        if self.effect_multiplier <= 0 {
            return Err(ConfigError::EffectMultiplier(self.effect_multiplier));
        }
        Ok(())
    }
}
