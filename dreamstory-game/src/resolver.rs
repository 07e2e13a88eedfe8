//! Applies daily actions and situation outcomes to the state.
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actions::ActionId;
use crate::constants::{MSG_NO_CONFIRMATION, MSG_NO_SITUATION, MSG_PAUSED, MSG_SITUATION_DONE};
use crate::data::{Choice, Situation};
use crate::state::SimulationState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackTone {
    Positive,
    Negative,
    Neutral,
}

/// One-shot message for the presenter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub message: String,
    pub tone: FeedbackTone,
    pub score_delta: i32,
}

impl Feedback {
    #[must_use]
    pub fn new(message: impl Into<String>, tone: FeedbackTone) -> Self {
        Self {
            message: message.into(),
            tone,
            score_delta: 0,
        }
    }

    #[must_use]
    pub const fn is_positive(&self) -> bool {
        matches!(self.tone, FeedbackTone::Positive)
    }
}

/// An intent that is not allowed in the current state. Rejections never
/// mutate the state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("the game is paused")]
    Paused,
    #[error("action '{action}' was already done today")]
    AlreadyDoneToday { action: ActionId },
    #[error("no situation is awaiting a choice")]
    NoSituationAwaiting,
    #[error("situation {id} was already resolved")]
    SituationAlreadyResolved { id: u32 },
    #[error("no confirmation is pending")]
    NoPendingConfirmation,
    #[error("saving is not allowed while paused")]
    SavePaused,
}

impl TransitionError {
    /// Feedback a presenter shows for this rejection.
    #[must_use]
    pub fn feedback(&self) -> Feedback {
        match self {
            Self::AlreadyDoneToday { action } => Feedback::new(
                action.action().already_done_message(),
                FeedbackTone::Negative,
            ),
            Self::Paused | Self::SavePaused => Feedback::new(MSG_PAUSED, FeedbackTone::Neutral),
            Self::NoSituationAwaiting => Feedback::new(MSG_NO_SITUATION, FeedbackTone::Neutral),
            Self::SituationAlreadyResolved { .. } => {
                Feedback::new(MSG_SITUATION_DONE, FeedbackTone::Neutral)
            }
            Self::NoPendingConfirmation => {
                Feedback::new(MSG_NO_CONFIRMATION, FeedbackTone::Neutral)
            }
        }
    }
}

/// Perform a daily action once.
///
/// # Errors
///
/// [`TransitionError::Paused`] while paused, [`TransitionError::AlreadyDoneToday`]
/// if the action's flag is already set.
pub fn submit_action(
    state: &mut SimulationState,
    id: ActionId,
) -> Result<Feedback, TransitionError> {
    if state.is_paused {
        return Err(TransitionError::Paused);
    }
    if state.daily_actions.is_done(id) {
        return Err(TransitionError::AlreadyDoneToday { action: id });
    }

    let action = id.action();
    for (stat, delta) in action.effects {
        state.stats.apply_delta(*stat, *delta);
    }
    state.stats.refresh_mood();
    state.add_score(action.points);
    state.daily_actions.mark_done(id);
    state.last_action_at = Some(state.game_time);
    log::info!(
        "day {}: {id} applied for {} points (mood {})",
        state.current_day,
        action.points,
        state.stats.mood
    );

    Ok(Feedback {
        message: action.message.to_string(),
        tone: if action.points > 0 {
            FeedbackTone::Positive
        } else {
            FeedbackTone::Negative
        },
        score_delta: action.points,
    })
}

/// Apply the chosen branch of `situation` and mark it occurred.
///
/// Every effect entry contributes `value × multiplier` points; entries the
/// translation table knows also move their stat by the same amount.
///
/// # Errors
///
/// [`TransitionError::Paused`] while paused,
/// [`TransitionError::SituationAlreadyResolved`] if the id already occurred.
pub fn resolve_situation(
    state: &mut SimulationState,
    situation: &Situation,
    choice: Choice,
    multiplier: i32,
) -> Result<Feedback, TransitionError> {
    if state.is_paused {
        return Err(TransitionError::Paused);
    }
    if state.occurred_situations.contains(&situation.id) {
        return Err(TransitionError::SituationAlreadyResolved { id: situation.id });
    }

    let outcome = situation.outcome(choice);
    for key in outcome.unknown_keys() {
        log::warn!(
            "situation {} ({choice}) has effect key '{key}' with no stat mapping; counted for points only",
            situation.id
        );
    }
    let points = outcome.points(multiplier);
    for (stat, delta) in outcome.stat_deltas(multiplier) {
        state.stats.apply_delta(stat, delta);
    }
    state.stats.refresh_mood();
    state.add_score(points);
    state.occurred_situations.insert(situation.id);
    state.last_action_at = Some(state.game_time);
    log::info!(
        "situation {} resolved with {choice}: {points} points",
        situation.id
    );

    Ok(Feedback {
        message: outcome.message.clone(),
        tone: if points >= 0 {
            FeedbackTone::Positive
        } else {
            FeedbackTone::Negative
        },
        score_delta: points,
    })
}
