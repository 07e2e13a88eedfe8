//! Situation feed: scripted, weekday/time-gated events with a binary choice.
//!
//! The feed is external configuration and keeps its own effect vocabulary
//! (`saude`, `sono`, `energia`, `social`, `produtividade`, or their English
//! names). [`EFFECT_KEY_TABLE`] translates that vocabulary into [`StatKey`]s;
//! action effects never go through it.
use chrono::Weekday;
use regex::Regex;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;

use crate::stats::StatKey;

/// Domain effect key → stat it moves.
pub const EFFECT_KEY_TABLE: [(&str, StatKey); 11] = [
    ("health", StatKey::Health),
    ("saude", StatKey::Health),
    ("saúde", StatKey::Health),
    ("sleep", StatKey::SleepQuality),
    ("sono", StatKey::SleepQuality),
    ("energy", StatKey::Energy),
    ("energia", StatKey::Energy),
    ("social", StatKey::Relationships),
    ("productivity", StatKey::Productivity),
    ("produtividade", StatKey::Productivity),
    ("sleepquality", StatKey::SleepQuality),
];

#[must_use]
pub fn stat_for_effect_key(key: &str) -> Option<StatKey> {
    let key = key.trim().to_lowercase();
    EFFECT_KEY_TABLE
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, stat)| *stat)
}

const WEEKDAY_LABELS: [(&str, Weekday); 17] = [
    ("domingo", Weekday::Sun),
    ("segunda", Weekday::Mon),
    ("terça", Weekday::Tue),
    ("terca", Weekday::Tue),
    ("quarta", Weekday::Wed),
    ("quinta", Weekday::Thu),
    ("sexta", Weekday::Fri),
    ("sábado", Weekday::Sat),
    ("sabado", Weekday::Sat),
    ("sunday", Weekday::Sun),
    ("monday", Weekday::Mon),
    ("tuesday", Weekday::Tue),
    ("wednesday", Weekday::Wed),
    ("thursday", Weekday::Thu),
    ("friday", Weekday::Fri),
    ("saturday", Weekday::Sat),
    ("segunda-feira", Weekday::Mon),
];

/// Parse a feed weekday label (Portuguese or English, case-insensitive).
#[must_use]
pub fn parse_weekday_label(label: &str) -> Option<Weekday> {
    let label = label.trim().to_lowercase();
    WEEKDAY_LABELS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, day)| *day)
}

fn time_label_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(?:[01]\d|2[0-3]):[0-5]\d$").expect("time label pattern is valid")
    })
}

/// Whether `label` is a zero-padded 24h `HH:MM` string.
#[must_use]
pub fn is_time_label(label: &str) -> bool {
    time_label_pattern().is_match(label)
}

/// Which branch of a situation the player picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Choice {
    #[serde(alias = "sim", alias = "yes")]
    Accept,
    #[serde(alias = "nao", alias = "não", alias = "no")]
    Decline,
}

impl Choice {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Decline => "decline",
        }
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One branch of a situation: domain-keyed effects plus feedback text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SituationOutcome {
    #[serde(rename = "efeitos", alias = "effects", default)]
    pub effects: BTreeMap<String, i32>,
    #[serde(rename = "mensagem", alias = "message", default)]
    pub message: String,
}

impl SituationOutcome {
    /// Score points: every effect entry counts, mapped or not.
    #[must_use]
    pub fn points(&self, multiplier: i32) -> i32 {
        self.effects
            .values()
            .fold(0_i32, |acc, value| {
                acc.saturating_add(value.saturating_mul(multiplier))
            })
    }

    /// Stat deltas for the entries the translation table knows about.
    #[must_use]
    pub fn stat_deltas(&self, multiplier: i32) -> Vec<(StatKey, i32)> {
        self.effects
            .iter()
            .filter_map(|(key, value)| {
                stat_for_effect_key(key).map(|stat| (stat, value.saturating_mul(multiplier)))
            })
            .collect()
    }

    /// Effect keys the translation table does not recognise.
    pub fn unknown_keys(&self) -> impl Iterator<Item = &str> {
        self.effects
            .keys()
            .map(String::as_str)
            .filter(|key| stat_for_effect_key(key).is_none())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct SituationOptions {
    #[serde(rename = "sim", alias = "accept", default)]
    pub accept: SituationOutcome,
    #[serde(rename = "nao", alias = "decline", default)]
    pub decline: SituationOutcome,
}

/// A scripted situation as it appears in the feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Situation {
    pub id: u32,
    #[serde(rename = "titulo", alias = "title", default)]
    pub title: String,
    #[serde(rename = "descricao", alias = "description", default)]
    pub description: String,
    #[serde(rename = "dia_semana", alias = "weekdays", default)]
    pub weekdays: Vec<String>,
    #[serde(rename = "horario_inicio", alias = "start", default)]
    pub start: String,
    #[serde(rename = "horario_fim", alias = "end", default)]
    pub end: String,
    #[serde(rename = "opcoes", alias = "options", default)]
    pub options: SituationOptions,
}

impl Situation {
    #[must_use]
    pub const fn outcome(&self, choice: Choice) -> &SituationOutcome {
        match choice {
            Choice::Accept => &self.options.accept,
            Choice::Decline => &self.options.decline,
        }
    }

    /// Compile the weekday set and time window, or report why this entry can never fire.
    ///
    /// # Errors
    ///
    /// Returns the first [`SituationIssue`] found in the entry.
    pub fn eligibility(&self) -> Result<Eligibility, SituationIssue> {
        if self.weekdays.is_empty() {
            return Err(SituationIssue::EmptyWeekdays);
        }
        let mut weekdays = WeekdaySet::new();
        for label in &self.weekdays {
            let day = parse_weekday_label(label)
                .ok_or_else(|| SituationIssue::UnknownWeekday(label.clone()))?;
            if !weekdays.contains(&day) {
                weekdays.push(day);
            }
        }
        for label in [&self.start, &self.end] {
            if !is_time_label(label) {
                return Err(SituationIssue::MalformedTime(label.clone()));
            }
        }
        if self.start > self.end {
            return Err(SituationIssue::InvertedWindow {
                start: self.start.clone(),
                end: self.end.clone(),
            });
        }
        Ok(Eligibility {
            weekdays,
            window: TimeWindow {
                start: self.start.clone(),
                end: self.end.clone(),
            },
        })
    }
}

pub type WeekdaySet = SmallVec<[Weekday; 7]>;

/// Inclusive `HH:MM` window compared as strings; valid because both ends
/// and the probe are zero-padded 24h labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: String,
    pub end: String,
}

impl TimeWindow {
    #[must_use]
    pub fn contains(&self, time_label: &str) -> bool {
        self.start.as_str() <= time_label && time_label <= self.end.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Eligibility {
    pub weekdays: WeekdaySet,
    pub window: TimeWindow,
}

impl Eligibility {
    #[must_use]
    pub fn matches(&self, weekday: Weekday, time_label: &str) -> bool {
        self.weekdays.contains(&weekday) && self.window.contains(time_label)
    }
}

/// Configuration problem that makes a situation permanently ineligible.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SituationIssue {
    #[error("weekday set is empty")]
    EmptyWeekdays,
    #[error("unknown weekday label '{0}'")]
    UnknownWeekday(String),
    #[error("time '{0}' is not a zero-padded HH:MM label")]
    MalformedTime(String),
    #[error("window starts at {start} after it ends at {end}")]
    InvertedWindow { start: String, end: String },
    #[error("duplicate situation id")]
    DuplicateId,
    #[error("entry does not match the situation shape: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum BankError {
    #[error("situation feed is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("situation feed must be an array or an object with a `situations` array")]
    Shape,
}

fn feed_entries(feed: serde_json::Value) -> Result<Vec<serde_json::Value>, BankError> {
    match feed {
        serde_json::Value::Array(entries) => Ok(entries),
        serde_json::Value::Object(mut object) => match object.remove("situations") {
            Some(serde_json::Value::Array(entries)) => Ok(entries),
            _ => Err(BankError::Shape),
        },
        _ => Err(BankError::Shape),
    }
}

/// Decode one feed entry. An entry with a readable id but a bad shape is
/// kept as a placeholder carrying the decode error; without an id it is dropped.
fn decode_entry(
    index: usize,
    entry: serde_json::Value,
) -> Option<(Situation, Option<SituationIssue>)> {
    let id = entry
        .get("id")
        .and_then(serde_json::Value::as_u64)
        .and_then(|id| u32::try_from(id).ok());
    let title = ["titulo", "title"]
        .iter()
        .find_map(|key| entry.get(*key).and_then(serde_json::Value::as_str))
        .unwrap_or_default()
        .to_string();
    match serde_json::from_value::<Situation>(entry) {
        Ok(situation) => Some((situation, None)),
        Err(err) => {
            let Some(id) = id else {
                log::warn!("situation feed entry #{index} skipped, no usable id: {err}");
                return None;
            };
            let placeholder = Situation {
                id,
                title,
                description: String::new(),
                weekdays: Vec::new(),
                start: String::new(),
                end: String::new(),
                options: SituationOptions::default(),
            };
            Some((placeholder, Some(SituationIssue::Malformed(err.to_string()))))
        }
    }
}

#[derive(Debug, Clone)]
struct BankEntry {
    situation: Situation,
    eligibility: Result<Eligibility, SituationIssue>,
}

/// Read-only situation collection with per-entry eligibility compiled once.
#[derive(Debug, Clone, Default)]
pub struct SituationBank {
    entries: Vec<BankEntry>,
}

impl SituationBank {
    /// Create an empty bank (useful for tests)
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a bank, flagging malformed entries as never eligible.
    #[must_use]
    pub fn new(situations: Vec<Situation>) -> Self {
        Self::from_decoded(situations.into_iter().map(|situation| (situation, None)))
    }

    fn from_decoded(
        decoded: impl IntoIterator<Item = (Situation, Option<SituationIssue>)>,
    ) -> Self {
        let mut seen = HashSet::new();
        let entries: Vec<BankEntry> = decoded
            .into_iter()
            .map(|(situation, decode_issue)| {
                let eligibility = if !seen.insert(situation.id) {
                    Err(SituationIssue::DuplicateId)
                } else if let Some(issue) = decode_issue {
                    Err(issue)
                } else {
                    situation.eligibility()
                };
                if let Err(issue) = &eligibility {
                    log::warn!(
                        "situation {} ('{}') will never trigger: {issue}",
                        situation.id,
                        situation.title
                    );
                }
                BankEntry {
                    situation,
                    eligibility,
                }
            })
            .collect();
        log::debug!("situation bank loaded with {} entries", entries.len());
        Self { entries }
    }

    /// Load a bank from a JSON array or a `{"situations": [...]}` object.
    /// Entries are decoded one at a time, so a badly typed entry only makes
    /// itself ineligible.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not JSON or has neither feed shape.
    pub fn from_json(json: &str) -> Result<Self, BankError> {
        let entries = feed_entries(serde_json::from_str(json)?)?;
        Ok(Self::from_decoded(
            entries
                .into_iter()
                .enumerate()
                .filter_map(|(index, entry)| decode_entry(index, entry)),
        ))
    }

    /// Load the situation feed bundled with the crate.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled asset is not valid JSON.
    pub fn load_from_static() -> Result<Self, BankError> {
        Self::from_json(include_str!("../assets/situations.json"))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn situations(&self) -> impl Iterator<Item = &Situation> {
        self.entries.iter().map(|entry| &entry.situation)
    }

    #[must_use]
    pub fn get(&self, id: u32) -> Option<&Situation> {
        self.situations().find(|situation| situation.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: u32) -> bool {
        self.get(id).is_some()
    }

    #[must_use]
    pub fn ids(&self) -> BTreeSet<u32> {
        self.situations().map(|situation| situation.id).collect()
    }

    /// Entries that can never trigger, with the reason.
    #[must_use]
    pub fn issues(&self) -> Vec<(u32, &SituationIssue)> {
        self.entries
            .iter()
            .filter_map(|entry| {
                entry
                    .eligibility
                    .as_ref()
                    .err()
                    .map(|issue| (entry.situation.id, issue))
            })
            .collect()
    }

    /// Situations that are not yet occurred and whose weekday set and window
    /// contain the given moment, in feed order.
    #[must_use]
    pub fn eligible_at(
        &self,
        weekday: Weekday,
        time_label: &str,
        occurred: &BTreeSet<u32>,
    ) -> Vec<&Situation> {
        self.entries
            .iter()
            .filter(|entry| !occurred.contains(&entry.situation.id))
            .filter(|entry| {
                entry
                    .eligibility
                    .as_ref()
                    .is_ok_and(|eligibility| eligibility.matches(weekday, time_label))
            })
            .map(|entry| &entry.situation)
            .collect()
    }
}
