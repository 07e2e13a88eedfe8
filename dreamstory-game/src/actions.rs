//! Fixed catalog of daily self-care actions and the per-day completion flags.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::stats::StatKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActionId {
    Sleep,
    Eat,
    Exercise,
    Relax,
    DrinkWater,
    Shower,
}

impl ActionId {
    pub const ALL: [Self; 6] = [
        Self::Sleep,
        Self::Eat,
        Self::Exercise,
        Self::Relax,
        Self::DrinkWater,
        Self::Shower,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sleep => "sleep",
            Self::Eat => "eat",
            Self::Exercise => "exercise",
            Self::Relax => "relax",
            Self::DrinkWater => "drinkWater",
            Self::Shower => "shower",
        }
    }

    /// Catalog entry for this action.
    #[must_use]
    pub fn action(self) -> &'static Action {
        ActionCatalog::get(self)
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|id| id.as_str().eq_ignore_ascii_case(s))
            .ok_or(())
    }
}

/// Immutable catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Action {
    pub id: ActionId,
    /// Object Alex interacts with.
    pub label: &'static str,
    /// Verb phrase, also used in the "already done" feedback.
    pub description: &'static str,
    pub effects: &'static [(StatKey, i32)],
    pub points: i32,
    pub message: &'static str,
}

impl Action {
    #[must_use]
    pub fn already_done_message(&self) -> String {
        format!(
            "Alex already did \"{}\" today! Try again tomorrow.",
            self.description.to_lowercase()
        )
    }
}

const CATALOG: [Action; 6] = [
    Action {
        id: ActionId::Sleep,
        label: "Bed",
        description: "Sleep",
        effects: &[
            (StatKey::SleepQuality, 25),
            (StatKey::Energy, 20),
            (StatKey::Health, 10),
        ],
        points: 20,
        message: "Well done! Alex slept well and recovered energy. +20 points!",
    },
    Action {
        id: ActionId::Eat,
        label: "Table",
        description: "Eat",
        effects: &[(StatKey::Health, 20), (StatKey::Energy, 15)],
        points: 15,
        message: "Well done! Alex had a healthy meal. +15 points!",
    },
    Action {
        id: ActionId::Exercise,
        label: "Equipment",
        description: "Exercise",
        effects: &[
            (StatKey::Health, 25),
            (StatKey::Energy, -5),
            (StatKey::SleepQuality, 10),
        ],
        points: 18,
        message: "Well done! Alex worked out and improved their health. +18 points!",
    },
    Action {
        id: ActionId::Relax,
        label: "Sofa",
        description: "Relax",
        effects: &[
            (StatKey::Relationships, 15),
            (StatKey::Health, 10),
            (StatKey::Energy, 10),
        ],
        points: 12,
        message: "Well done! Alex relaxed and lowered their stress. +12 points!",
    },
    Action {
        id: ActionId::DrinkWater,
        label: "Water",
        description: "Drink water",
        effects: &[(StatKey::Health, 10), (StatKey::Energy, 5)],
        points: 8,
        message: "Well done! Alex stayed hydrated. +8 points!",
    },
    Action {
        id: ActionId::Shower,
        label: "Shower",
        description: "Take a shower",
        effects: &[(StatKey::Health, 15), (StatKey::Relationships, 10)],
        points: 10,
        message: "Well done! Alex showered and feels refreshed. +10 points!",
    },
];

/// Static lookup over the fixed action table.
pub struct ActionCatalog;

impl ActionCatalog {
    #[must_use]
    pub const fn all() -> &'static [Action] {
        &CATALOG
    }

    #[must_use]
    pub fn get(id: ActionId) -> &'static Action {
        // CATALOG is declared in ActionId::ALL order.
        &CATALOG[id as usize]
    }
}

/// Which daily actions Alex has completed on the current simulated day.
///
/// One named field per [`ActionId`] keeps the key set fixed by construction.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DailyActionFlags {
    #[serde(default)]
    pub sleep: bool,
    #[serde(default)]
    pub eat: bool,
    #[serde(default)]
    pub exercise: bool,
    #[serde(default)]
    pub relax: bool,
    #[serde(default)]
    pub drink_water: bool,
    #[serde(default)]
    pub shower: bool,
}

impl DailyActionFlags {
    #[must_use]
    pub const fn is_done(&self, id: ActionId) -> bool {
        match id {
            ActionId::Sleep => self.sleep,
            ActionId::Eat => self.eat,
            ActionId::Exercise => self.exercise,
            ActionId::Relax => self.relax,
            ActionId::DrinkWater => self.drink_water,
            ActionId::Shower => self.shower,
        }
    }

    pub const fn mark_done(&mut self, id: ActionId) {
        match id {
            ActionId::Sleep => self.sleep = true,
            ActionId::Eat => self.eat = true,
            ActionId::Exercise => self.exercise = true,
            ActionId::Relax => self.relax = true,
            ActionId::DrinkWater => self.drink_water = true,
            ActionId::Shower => self.shower = true,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        ActionId::ALL.iter().filter(|id| self.is_done(**id)).count()
    }

    #[must_use]
    pub fn all_done(&self) -> bool {
        self.completed() == ActionId::ALL.len()
    }

    pub fn pending(&self) -> impl Iterator<Item = ActionId> + '_ {
        ActionId::ALL.into_iter().filter(|id| !self.is_done(*id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_order_matches_ids() {
        for id in ActionId::ALL {
            assert_eq!(ActionCatalog::get(id).id, id);
        }
    }

    #[test]
    fn sleep_entry_matches_table() {
        let sleep = ActionId::Sleep.action();
        assert_eq!(sleep.points, 20);
        assert!(sleep.effects.contains(&(StatKey::SleepQuality, 25)));
        assert!(sleep.effects.contains(&(StatKey::Energy, 20)));
        assert!(sleep.effects.contains(&(StatKey::Health, 10)));
    }

    #[test]
    fn every_action_scores_positive() {
        assert!(ActionCatalog::all().iter().all(|action| action.points > 0));
    }

    #[test]
    fn flags_track_and_reset() {
        let mut flags = DailyActionFlags::default();
        flags.mark_done(ActionId::DrinkWater);
        assert!(flags.is_done(ActionId::DrinkWater));
        assert_eq!(flags.completed(), 1);
        assert_eq!(flags.pending().count(), 5);
        flags.reset();
        assert_eq!(flags, DailyActionFlags::default());
    }

    #[test]
    fn flags_serialize_with_action_keys() {
        let mut flags = DailyActionFlags::default();
        flags.mark_done(ActionId::DrinkWater);
        let json = serde_json::to_value(flags).unwrap();
        assert_eq!(json["drinkWater"], serde_json::Value::Bool(true));
        assert_eq!(json.as_object().unwrap().len(), ActionId::ALL.len());
    }

    #[test]
    fn action_ids_parse_from_wire_names() {
        assert_eq!("drinkWater".parse::<ActionId>(), Ok(ActionId::DrinkWater));
        assert_eq!("SLEEP".parse::<ActionId>(), Ok(ActionId::Sleep));
        assert!("nap".parse::<ActionId>().is_err());
    }
}
