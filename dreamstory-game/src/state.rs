//! The single mutable aggregate of a Dream Story run.
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::actions::DailyActionFlags;
use crate::clock;
use crate::location::Location;
use crate::stats::StatVector;

/// Everything a save slot persists. Wire names follow the save format the
/// game has always written, so older saves keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationState {
    #[serde(default)]
    pub score: i32,
    #[serde(default = "first_day")]
    pub current_day: u32,
    #[serde(alias = "simulatedTime", with = "timestamp")]
    pub game_time: NaiveDateTime,
    #[serde(default, alias = "paused")]
    pub is_paused: bool,
    #[serde(default, rename = "currentRoom", alias = "currentLocation")]
    pub current_location: Location,
    #[serde(default, rename = "alex", alias = "stats")]
    pub stats: StatVector,
    #[serde(default)]
    pub daily_actions: DailyActionFlags,
    #[serde(
        default,
        rename = "situacoesOcorridas",
        alias = "occurredSituations"
    )]
    pub occurred_situations: BTreeSet<u32>,
    #[serde(default = "enabled")]
    pub music_enabled: bool,
    #[serde(default = "enabled")]
    pub sound_enabled: bool,
    #[serde(
        default,
        rename = "lastActionTime",
        alias = "lastActionAt",
        with = "optional_timestamp"
    )]
    pub last_action_at: Option<NaiveDateTime>,
}

const fn first_day() -> u32 {
    1
}

const fn enabled() -> bool {
    true
}

impl Default for SimulationState {
    fn default() -> Self {
        Self {
            score: 0,
            current_day: first_day(),
            game_time: clock::start_time(),
            is_paused: false,
            current_location: Location::default(),
            stats: StatVector::default(),
            daily_actions: DailyActionFlags::default(),
            occurred_situations: BTreeSet::new(),
            music_enabled: true,
            sound_enabled: true,
            last_action_at: None,
        }
    }
}

impl SimulationState {
    /// Restore value invariants after deserialization: stats clamped, mood
    /// recomputed, score floored, day at least one.
    pub fn sanitize(&mut self) {
        self.stats.clamp();
        self.stats.refresh_mood();
        self.score = self.score.max(0);
        self.current_day = self.current_day.max(first_day());
    }

    /// Start over, keeping only the audio preferences.
    pub fn reset_preserving_prefs(&mut self) {
        *self = Self {
            music_enabled: self.music_enabled,
            sound_enabled: self.sound_enabled,
            ..Self::default()
        };
    }

    /// Floor-clamped score update.
    pub fn add_score(&mut self, points: i32) {
        self.score = self.score.saturating_add(points).max(0);
    }
}

/// Simulated timestamps are written naive (`YYYY-MM-DDTHH:MM:SS`). Reading
/// also accepts RFC 3339, the shape browser saves used.
///
/// An RFC 3339 stamp is taken at its written wall-clock fields and the offset
/// is dropped. Browser saves serialized local game time as UTC (`...Z`), so a
/// save made outside UTC loads shifted by that zone's offset, and weekday and
/// window eligibility shift with it. The original zone is not recoverable
/// from the blob.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn parse(raw: &str) -> Option<NaiveDateTime> {
        raw.parse::<NaiveDateTime>().ok().or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|stamp| stamp.naive_local())
        })
    }

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognised timestamp '{raw}'")))
    }
}

pub(crate) mod optional_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::timestamp;

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDateTime>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(stamp) => serializer.collect_str(&stamp.format(timestamp::FORMAT)),
            None => serializer.serialize_none(),
        }
    }

    /// Unreadable values degrade to `None`; the field is informational.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDateTime>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(timestamp::parse))
    }
}
