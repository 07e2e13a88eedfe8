//! Rooms of Alex's home and the cyclic navigation cursor over them.
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::actions::ActionId;
use crate::state::SimulationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    #[default]
    Bedroom,
    Living,
    Kitchen,
    Gym,
    Bathroom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Previous,
    Next,
}

impl Location {
    /// Navigation order; the cursor wraps at both ends.
    pub const ORDER: [Self; 5] = [
        Self::Bedroom,
        Self::Living,
        Self::Kitchen,
        Self::Gym,
        Self::Bathroom,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bedroom => "bedroom",
            Self::Living => "living",
            Self::Kitchen => "kitchen",
            Self::Gym => "gym",
            Self::Bathroom => "bathroom",
        }
    }

    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Bedroom => "Bedroom",
            Self::Living => "Living Room",
            Self::Kitchen => "Kitchen",
            Self::Gym => "Gym",
            Self::Bathroom => "Bathroom",
        }
    }

    /// Actions whose props live in this room.
    #[must_use]
    pub const fn actions(self) -> &'static [ActionId] {
        match self {
            Self::Bedroom => &[ActionId::Sleep],
            Self::Living => &[ActionId::Relax],
            Self::Kitchen => &[ActionId::Eat, ActionId::DrinkWater],
            Self::Gym => &[ActionId::Exercise],
            Self::Bathroom => &[ActionId::Shower],
        }
    }

    #[must_use]
    pub fn cycled(self, direction: Direction) -> Self {
        let len = Self::ORDER.len();
        let idx = Self::ORDER
            .iter()
            .position(|loc| *loc == self)
            .unwrap_or(0);
        let next = match direction {
            Direction::Previous => (idx + len - 1) % len,
            Direction::Next => (idx + 1) % len,
        };
        Self::ORDER[next]
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Move the state's location cursor one step, wrapping at both ends.
/// Pause policy is decided by the caller.
pub fn cycle_location(state: &mut SimulationState, direction: Direction) -> Location {
    state.current_location = state.current_location.cycled(direction);
    state.current_location
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycling_wraps_both_ends() {
        assert_eq!(Location::Bedroom.cycled(Direction::Previous), Location::Bathroom);
        assert_eq!(Location::Bathroom.cycled(Direction::Next), Location::Bedroom);
        assert_eq!(Location::Kitchen.cycled(Direction::Next), Location::Gym);
    }

    #[test]
    fn full_lap_returns_home() {
        let mut loc = Location::Living;
        for _ in 0..Location::ORDER.len() {
            loc = loc.cycled(Direction::Next);
        }
        assert_eq!(loc, Location::Living);
    }

    #[test]
    fn cursor_moves_on_the_state() {
        let mut state = SimulationState::default();
        assert_eq!(cycle_location(&mut state, Direction::Previous), Location::Bathroom);
        assert_eq!(state.current_location, Location::Bathroom);
    }

    #[test]
    fn every_action_has_exactly_one_room() {
        for id in ActionId::ALL {
            let rooms = Location::ORDER
                .iter()
                .filter(|loc| loc.actions().contains(&id))
                .count();
            assert_eq!(rooms, 1, "{id} should live in one room");
        }
    }
}
