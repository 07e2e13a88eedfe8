use std::fmt;

use clap::ValueEnum;
use dreamstory_game::{ActionId, Choice, Situation, SimulationState, StatKey, StatVector};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};

/// Policy interface for automated play strategies.
pub trait PlayerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Answer an awaiting situation.
    fn pick_choice(&mut self, state: &SimulationState, situation: &Situation) -> Choice;

    /// Action to try among the ones the current room offers.
    fn pick_action(&mut self, state: &SimulationState, available: &[ActionId])
    -> Option<ActionId>;

    /// Answer the confirmation prompt for a requested action.
    fn confirms(&mut self, _action: ActionId) -> bool {
        true
    }
}

/// Built-in gameplay strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GameplayStrategy {
    /// Takes the higher-scoring branch and works through every daily action.
    Diligent,
    /// Says yes to everything, only relaxes and eats.
    Hedonist,
    /// Props up the weakest stat.
    Balanced,
    /// Declines every situation and never acts.
    Idle,
    /// Seeded coin flips for every decision.
    Random,
}

impl GameplayStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Diligent => "Diligent",
            Self::Hedonist => "Hedonist",
            Self::Balanced => "Balanced",
            Self::Idle => "Idle",
            Self::Random => "Random",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn PlayerPolicy + Send> {
        match self {
            Self::Diligent => Box::new(DiligentPolicy),
            Self::Hedonist => Box::new(HedonistPolicy),
            Self::Balanced => Box::new(BalancedPolicy),
            Self::Idle => Box::new(IdlePolicy),
            Self::Random => Box::new(RandomPolicy::new(seed)),
        }
    }
}

impl fmt::Display for GameplayStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct DiligentPolicy;
struct HedonistPolicy;
struct BalancedPolicy;
struct IdlePolicy;

struct RandomPolicy {
    rng: ChaCha20Rng,
}

impl RandomPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed ^ 0x00D5_EA57),
        }
    }
}

fn first_pending(state: &SimulationState, available: &[ActionId]) -> Option<ActionId> {
    available
        .iter()
        .copied()
        .find(|id| !state.daily_actions.is_done(*id))
}

/// Lowest stat after applying a branch's effects, ranked at unit scale.
fn weakest_after(stats: &StatVector, situation: &Situation, choice: Choice) -> i32 {
    let mut projected = stats.clone();
    for (key, delta) in situation.outcome(choice).stat_deltas(1) {
        projected.apply_delta(key, delta);
    }
    StatKey::ALL
        .iter()
        .map(|key| projected.get(*key))
        .min()
        .unwrap_or_default()
}

fn weakest_stat(stats: &StatVector) -> StatKey {
    StatKey::ALL
        .into_iter()
        .min_by_key(|key| stats.get(*key))
        .unwrap_or(StatKey::Health)
}

impl PlayerPolicy for DiligentPolicy {
    fn name(&self) -> &'static str {
        "Diligent"
    }

    fn pick_choice(&mut self, _state: &SimulationState, situation: &Situation) -> Choice {
        let accept = situation.outcome(Choice::Accept).points(1);
        let decline = situation.outcome(Choice::Decline).points(1);
        if accept >= decline {
            Choice::Accept
        } else {
            Choice::Decline
        }
    }

    fn pick_action(
        &mut self,
        state: &SimulationState,
        available: &[ActionId],
    ) -> Option<ActionId> {
        first_pending(state, available)
    }
}

impl PlayerPolicy for HedonistPolicy {
    fn name(&self) -> &'static str {
        "Hedonist"
    }

    fn pick_choice(&mut self, _state: &SimulationState, _situation: &Situation) -> Choice {
        Choice::Accept
    }

    fn pick_action(
        &mut self,
        state: &SimulationState,
        available: &[ActionId],
    ) -> Option<ActionId> {
        available
            .iter()
            .copied()
            .filter(|id| matches!(id, ActionId::Relax | ActionId::Eat))
            .find(|id| !state.daily_actions.is_done(*id))
    }
}

impl PlayerPolicy for BalancedPolicy {
    fn name(&self) -> &'static str {
        "Balanced"
    }

    fn pick_choice(&mut self, state: &SimulationState, situation: &Situation) -> Choice {
        let accept = weakest_after(&state.stats, situation, Choice::Accept);
        let decline = weakest_after(&state.stats, situation, Choice::Decline);
        match accept.cmp(&decline) {
            std::cmp::Ordering::Greater => Choice::Accept,
            std::cmp::Ordering::Less => Choice::Decline,
            std::cmp::Ordering::Equal => {
                if situation.outcome(Choice::Accept).points(1)
                    >= situation.outcome(Choice::Decline).points(1)
                {
                    Choice::Accept
                } else {
                    Choice::Decline
                }
            }
        }
    }

    fn pick_action(
        &mut self,
        state: &SimulationState,
        available: &[ActionId],
    ) -> Option<ActionId> {
        let weakest = weakest_stat(&state.stats);
        available
            .iter()
            .copied()
            .filter(|id| !state.daily_actions.is_done(*id))
            .find(|id| id.action().effects.iter().any(|(key, _)| *key == weakest))
            .or_else(|| first_pending(state, available))
    }
}

impl PlayerPolicy for IdlePolicy {
    fn name(&self) -> &'static str {
        "Idle"
    }

    fn pick_choice(&mut self, _state: &SimulationState, _situation: &Situation) -> Choice {
        Choice::Decline
    }

    fn pick_action(
        &mut self,
        _state: &SimulationState,
        _available: &[ActionId],
    ) -> Option<ActionId> {
        None
    }
}

impl PlayerPolicy for RandomPolicy {
    fn name(&self) -> &'static str {
        "Random"
    }

    fn pick_choice(&mut self, _state: &SimulationState, _situation: &Situation) -> Choice {
        if self.rng.random_bool(0.5) {
            Choice::Accept
        } else {
            Choice::Decline
        }
    }

    fn pick_action(
        &mut self,
        _state: &SimulationState,
        available: &[ActionId],
    ) -> Option<ActionId> {
        if available.is_empty() || !self.rng.random_bool(0.4) {
            return None;
        }
        // Already-done actions are tried too; the session must refuse them.
        Some(available[self.rng.random_range(0..available.len())])
    }

    fn confirms(&mut self, _action: ActionId) -> bool {
        self.rng.random_bool(0.8)
    }
}
