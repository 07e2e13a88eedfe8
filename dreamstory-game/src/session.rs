use chrono::{DateTime, Utc, Weekday};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use serde::Serialize;
use std::collections::VecDeque;

use crate::actions::{Action, ActionId};
use crate::clock::{self, ClockTransition};
use crate::config::SessionConfig;
use crate::constants::{MSG_SAVE_FAILED, MSG_SAVED, SAVE_SLOT};
use crate::data::{Choice, Situation, SituationBank};
use crate::location::{self, Direction, Location};
use crate::persistence;
use crate::resolver::{self, Feedback, FeedbackTone, TransitionError};
use crate::scheduler::{RollSource, SituationScheduler};
use crate::state::SimulationState;
use crate::GameStorage;

/// Notification for presenters, drained with [`GameSession::drain_events`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SessionEvent {
    DayStarted { day: u32, weekday: Weekday },
    SituationOffered { id: u32, title: String },
    SituationResolved { id: u32, choice: Choice, points: i32 },
    ActionApplied { action: ActionId, points: i32 },
    Saved,
    Loaded { day: u32 },
    Reset,
    PauseToggled { paused: bool },
}

/// Proof that a periodic callback was scheduled while the session was
/// running. Pause toggles, resets and loads invalidate outstanding tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickTicket {
    epoch: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub clock: ClockTransition,
    /// Id of the situation offered by this tick's scheduler pass.
    pub offered: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Applied(TickReport),
    /// The ticket predates a pause, reset or load.
    Discarded,
}

/// Sole owner of a [`SimulationState`] and the transient UI-facing slots
/// around it: the awaiting situation, confirmation prompts and the one-shot
/// feedback and event queue.
#[derive(Debug, Clone)]
pub struct GameSession<R = ChaCha20Rng> {
    state: SimulationState,
    bank: SituationBank,
    config: SessionConfig,
    scheduler: SituationScheduler,
    rolls: R,
    awaiting: Option<Situation>,
    pending_action: Option<ActionId>,
    pending_save: bool,
    feedback: Option<Feedback>,
    events: VecDeque<SessionEvent>,
    ticks: u64,
    epoch: u64,
}

impl GameSession<ChaCha20Rng> {
    /// Fresh game whose scheduler draws come from a seeded `ChaCha20Rng`.
    #[must_use]
    pub fn new(seed: u64, bank: SituationBank, config: SessionConfig) -> Self {
        Self::with_rolls(bank, config, ChaCha20Rng::seed_from_u64(seed))
    }

    /// Continue a saved state with freshly seeded draws.
    #[must_use]
    pub fn resume(
        seed: u64,
        state: SimulationState,
        bank: SituationBank,
        config: SessionConfig,
    ) -> Self {
        Self::from_state(state, bank, config, ChaCha20Rng::seed_from_u64(seed))
    }
}

impl<R: RollSource> GameSession<R> {
    #[must_use]
    pub fn with_rolls(bank: SituationBank, config: SessionConfig, rolls: R) -> Self {
        Self::from_state(SimulationState::default(), bank, config, rolls)
    }

    /// Resume from an existing state, e.g. one read from a save slot.
    #[must_use]
    pub fn from_state(
        state: SimulationState,
        bank: SituationBank,
        config: SessionConfig,
        rolls: R,
    ) -> Self {
        let scheduler = SituationScheduler::new(config.trigger_chance);
        let mut session = Self {
            state: SimulationState::default(),
            bank,
            config,
            scheduler,
            rolls,
            awaiting: None,
            pending_action: None,
            pending_save: false,
            feedback: None,
            events: VecDeque::new(),
            ticks: 0,
            epoch: 0,
        };
        session.install(state);
        session
    }

    /// Replace the state wholesale and clear every transient slot.
    fn install(&mut self, mut state: SimulationState) {
        state.sanitize();
        let before = state.occurred_situations.len();
        state.occurred_situations.retain(|id| self.bank.contains(*id));
        let dropped = before - state.occurred_situations.len();
        if dropped > 0 {
            log::warn!("dropped {dropped} occurred situation id(s) unknown to the bank");
        }
        self.state = state;
        self.clear_transients();
    }

    fn clear_transients(&mut self) {
        self.awaiting = None;
        self.pending_action = None;
        self.pending_save = false;
        self.feedback = None;
        self.ticks = 0;
        self.epoch = self.epoch.wrapping_add(1);
    }

    fn reject(&mut self, err: TransitionError) -> TransitionError {
        self.feedback = Some(err.feedback());
        err
    }

    // ---- time ---------------------------------------------------------------

    /// Schedule a tick. `None` while paused.
    #[must_use]
    pub const fn ticket(&self) -> Option<TickTicket> {
        if self.state.is_paused {
            None
        } else {
            Some(TickTicket { epoch: self.epoch })
        }
    }

    /// Deliver a scheduled tick, re-checking that it is still current.
    pub fn deliver_tick(&mut self, ticket: TickTicket) -> TickOutcome {
        if ticket.epoch != self.epoch || self.state.is_paused {
            log::debug!("stale tick discarded (epoch {} vs {})", ticket.epoch, self.epoch);
            return TickOutcome::Discarded;
        }
        TickOutcome::Applied(self.tick())
    }

    /// Advance the clock once; every `scheduler_stride` running ticks the
    /// scheduler gets a pass.
    pub fn tick(&mut self) -> TickReport {
        let transition = clock::advance_minutes(&mut self.state, self.config.minutes_per_tick);
        if transition == ClockTransition::Frozen {
            return TickReport {
                clock: transition,
                offered: None,
            };
        }
        if let ClockTransition::Rollover { day } = transition {
            self.events.push_back(SessionEvent::DayStarted {
                day,
                weekday: clock::weekday(self.state.game_time),
            });
        }

        self.ticks += 1;
        let offered = if self.ticks % u64::from(self.config.scheduler_stride.max(1)) == 0 {
            self.evaluate_scheduler()
        } else {
            None
        };
        TickReport {
            clock: transition,
            offered,
        }
    }

    /// Run `count` ticks back to back.
    pub fn advance_ticks(&mut self, count: u32) -> Vec<TickReport> {
        (0..count).map(|_| self.tick()).collect()
    }

    fn evaluate_scheduler(&mut self) -> Option<u32> {
        let offered = self
            .scheduler
            .maybe_trigger(
                &self.state,
                &self.bank,
                self.awaiting.is_some(),
                &mut self.rolls,
            )
            .cloned()?;
        log::info!(
            "situation {} offered at {}",
            offered.id,
            clock::time_label(self.state.game_time)
        );
        let id = offered.id;
        self.events.push_back(SessionEvent::SituationOffered {
            id,
            title: offered.title.clone(),
        });
        self.awaiting = Some(offered);
        Some(id)
    }

    // ---- player intents -------------------------------------------------------

    /// First phase of an action: validate and hold it for confirmation.
    ///
    /// # Errors
    ///
    /// Rejected while paused or when the action was already done today.
    pub fn request_action(&mut self, id: ActionId) -> Result<&'static Action, TransitionError> {
        if self.state.is_paused {
            return Err(self.reject(TransitionError::Paused));
        }
        if self.state.daily_actions.is_done(id) {
            return Err(self.reject(TransitionError::AlreadyDoneToday { action: id }));
        }
        self.pending_action = Some(id);
        Ok(id.action())
    }

    /// Second phase: apply (`accept`) or drop the pending action. Returns
    /// `None` when the player cancelled.
    ///
    /// # Errors
    ///
    /// Rejected with nothing pending, or when the action completed meanwhile.
    /// Accepting while paused is rejected and the prompt stays open.
    pub fn confirm_action(&mut self, accept: bool) -> Result<Option<Feedback>, TransitionError> {
        if self.pending_action.is_none() {
            return Err(self.reject(TransitionError::NoPendingConfirmation));
        }
        if accept && self.state.is_paused {
            return Err(self.reject(TransitionError::Paused));
        }
        let Some(id) = self.pending_action.take() else {
            return Err(self.reject(TransitionError::NoPendingConfirmation));
        };
        if !accept {
            return Ok(None);
        }
        match resolver::submit_action(&mut self.state, id) {
            Ok(feedback) => {
                self.events.push_back(SessionEvent::ActionApplied {
                    action: id,
                    points: feedback.score_delta,
                });
                self.feedback = Some(feedback.clone());
                Ok(Some(feedback))
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    /// Answer the awaiting situation.
    ///
    /// # Errors
    ///
    /// Rejected with no situation awaiting or while paused (the offer stays).
    pub fn resolve_situation(&mut self, choice: Choice) -> Result<Feedback, TransitionError> {
        let Some(situation) = self.awaiting.as_ref() else {
            return Err(self.reject(TransitionError::NoSituationAwaiting));
        };
        let id = situation.id;
        let result = resolver::resolve_situation(
            &mut self.state,
            situation,
            choice,
            self.config.effect_multiplier,
        );
        match result {
            Ok(feedback) => {
                self.awaiting = None;
                self.events.push_back(SessionEvent::SituationResolved {
                    id,
                    choice,
                    points: feedback.score_delta,
                });
                self.feedback = Some(feedback.clone());
                Ok(feedback)
            }
            Err(err) => {
                if matches!(err, TransitionError::SituationAlreadyResolved { .. }) {
                    self.awaiting = None;
                }
                Err(self.reject(err))
            }
        }
    }

    /// # Errors
    ///
    /// Rejected while paused when the config forbids paused navigation.
    pub fn cycle_location(&mut self, direction: Direction) -> Result<Location, TransitionError> {
        if self.state.is_paused && !self.config.navigation_while_paused {
            return Err(self.reject(TransitionError::Paused));
        }
        Ok(location::cycle_location(&mut self.state, direction))
    }

    /// Flip pause. Outstanding tick tickets become stale either way.
    pub fn toggle_pause(&mut self) -> bool {
        self.state.is_paused = !self.state.is_paused;
        self.epoch = self.epoch.wrapping_add(1);
        let paused = self.state.is_paused;
        log::info!("game {}", if paused { "paused" } else { "resumed" });
        self.events.push_back(SessionEvent::PauseToggled { paused });
        paused
    }

    pub fn toggle_music(&mut self) -> bool {
        self.state.music_enabled = !self.state.music_enabled;
        self.state.music_enabled
    }

    pub fn toggle_sound(&mut self) -> bool {
        self.state.sound_enabled = !self.state.sound_enabled;
        self.state.sound_enabled
    }

    /// First phase of saving.
    ///
    /// # Errors
    ///
    /// Saving is not offered while paused.
    pub fn request_save(&mut self) -> Result<(), TransitionError> {
        if self.state.is_paused {
            return Err(self.reject(TransitionError::SavePaused));
        }
        self.pending_save = true;
        Ok(())
    }

    /// Second phase of saving, stamped with the wall clock.
    pub fn confirm_save<S: GameStorage>(&mut self, accept: bool, storage: &S) -> bool {
        self.confirm_save_at(accept, storage, Utc::now())
    }

    /// Write the state to the save slot if a save was requested and accepted.
    /// Failures surface as `false` plus negative feedback. Accepting while
    /// paused keeps the request pending.
    pub fn confirm_save_at<S: GameStorage>(
        &mut self,
        accept: bool,
        storage: &S,
        now: DateTime<Utc>,
    ) -> bool {
        if !self.pending_save {
            return false;
        }
        if accept && self.state.is_paused {
            self.reject(TransitionError::SavePaused);
            return false;
        }
        self.pending_save = false;
        if !accept {
            return false;
        }

        let written = persistence::save(&self.state, now)
            .map_err(|err| err.to_string())
            .and_then(|blob| {
                storage
                    .save_blob(SAVE_SLOT, &blob)
                    .map_err(|err| err.to_string())
            });
        match written {
            Ok(()) => {
                log::info!("game saved on day {}", self.state.current_day);
                self.feedback = Some(Feedback::new(MSG_SAVED, FeedbackTone::Positive));
                self.events.push_back(SessionEvent::Saved);
                true
            }
            Err(err) => {
                log::warn!("save failed: {err}");
                self.feedback = Some(Feedback::new(MSG_SAVE_FAILED, FeedbackTone::Negative));
                false
            }
        }
    }

    /// Replace the state from the save slot. An absent slot or unreadable
    /// content returns `false` and leaves the session untouched.
    pub fn load_from<S: GameStorage>(&mut self, storage: &S) -> bool {
        let blob = match storage.load_blob(SAVE_SLOT) {
            Ok(Some(blob)) => blob,
            Ok(None) => return false,
            Err(err) => {
                log::warn!("save slot could not be read: {err}");
                return false;
            }
        };
        match persistence::load(&blob) {
            Ok(state) => {
                self.install(state);
                log::info!("game loaded at day {}", self.state.current_day);
                self.events.push_back(SessionEvent::Loaded {
                    day: self.state.current_day,
                });
                true
            }
            Err(err) => {
                log::warn!("saved game rejected: {err}");
                false
            }
        }
    }

    /// Start a new game, keeping audio preferences.
    pub fn reset(&mut self) {
        self.state.reset_preserving_prefs();
        self.clear_transients();
        log::info!("game reset");
        self.events.push_back(SessionEvent::Reset);
    }

    // ---- outbound -------------------------------------------------------------

    /// Full snapshot for presenters.
    #[must_use]
    pub const fn snapshot(&self) -> &SimulationState {
        &self.state
    }

    #[must_use]
    pub fn into_state(self) -> SimulationState {
        self.state
    }

    #[must_use]
    pub const fn awaiting_situation(&self) -> Option<&Situation> {
        self.awaiting.as_ref()
    }

    #[must_use]
    pub const fn pending_action(&self) -> Option<ActionId> {
        self.pending_action
    }

    #[must_use]
    pub const fn save_requested(&self) -> bool {
        self.pending_save
    }

    /// One-shot: the feedback is cleared once taken.
    pub fn take_feedback(&mut self) -> Option<Feedback> {
        self.feedback.take()
    }

    pub fn drain_events(&mut self) -> Vec<SessionEvent> {
        self.events.drain(..).collect()
    }

    #[must_use]
    pub const fn bank(&self) -> &SituationBank {
        &self.bank
    }

    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Actions available in the current room.
    #[must_use]
    pub const fn actions_here(&self) -> &'static [ActionId] {
        self.state.current_location.actions()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SituationOptions;
    use crate::persistence::MemoryStorage;
    use crate::scheduler::ScriptedRolls;
    use crate::stats::StatKey;
    use chrono::TimeZone;

    fn bank() -> SituationBank {
        SituationBank::from_json(
            r#"[
                { "id": 1, "titulo": "Coffee", "dia_semana": ["segunda"],
                  "horario_inicio": "07:00", "horario_fim": "23:59",
                  "opcoes": { "sim": { "efeitos": { "energia": 1 }, "mensagem": "buzz" },
                              "nao": { "efeitos": { "sono": -1 }, "mensagem": "meh" } } },
                { "id": 2, "titulo": "Nap", "dia_semana": ["terça"],
                  "horario_inicio": "00:00", "horario_fim": "23:59",
                  "opcoes": { "sim": { "efeitos": { "sono": 2 }, "mensagem": "zzz" },
                              "nao": { "efeitos": {}, "mensagem": "ok" } } }
            ]"#,
        )
        .unwrap()
    }

    fn session() -> GameSession<ScriptedRolls> {
        GameSession::with_rolls(bank(), SessionConfig::default(), ScriptedRolls::always())
    }

    #[test]
    fn scheduler_runs_every_other_tick() {
        let mut session = session();
        let first = session.tick();
        assert_eq!(first.offered, None);
        let second = session.tick();
        assert_eq!(second.offered, Some(1));
        assert_eq!(session.awaiting_situation().map(|s| s.id), Some(1));
        assert!(matches!(
            session.drain_events().as_slice(),
            [SessionEvent::SituationOffered { id: 1, .. }]
        ));
    }

    #[test]
    fn awaiting_offer_blocks_further_offers() {
        let mut session = session();
        session.advance_ticks(2);
        let offers = session
            .advance_ticks(20)
            .iter()
            .filter(|report| report.offered.is_some())
            .count();
        assert_eq!(offers, 0);
    }

    #[test]
    fn action_requires_confirmation() {
        let mut session = session();
        session.request_action(ActionId::Sleep).unwrap();
        assert_eq!(session.snapshot().score, 0);
        assert_eq!(session.pending_action(), Some(ActionId::Sleep));

        let feedback = session.confirm_action(true).unwrap().unwrap();
        assert_eq!(feedback.score_delta, 20);
        assert_eq!(session.snapshot().score, 20);
        assert_eq!(session.take_feedback(), Some(feedback));
        assert_eq!(session.take_feedback(), None);

        let err = session.request_action(ActionId::Sleep).unwrap_err();
        assert_eq!(err, TransitionError::AlreadyDoneToday { action: ActionId::Sleep });
        assert_eq!(session.take_feedback().map(|f| f.tone), Some(FeedbackTone::Negative));
    }

    #[test]
    fn cancelled_confirmation_changes_nothing() {
        let mut session = session();
        session.request_action(ActionId::Eat).unwrap();
        let before = session.snapshot().clone();
        assert_eq!(session.confirm_action(false), Ok(None));
        assert_eq!(session.snapshot(), &before);
        assert_eq!(
            session.confirm_action(true),
            Err(TransitionError::NoPendingConfirmation)
        );
    }

    #[test]
    fn resolving_marks_situation_permanent() {
        let mut session = session();
        session.advance_ticks(2);
        let feedback = session.resolve_situation(Choice::Accept).unwrap();
        assert_eq!(feedback.score_delta, 10);
        assert!(session.awaiting_situation().is_none());
        assert!(session.snapshot().occurred_situations.contains(&1));
        assert_eq!(session.snapshot().stats.get(StatKey::Energy), 60);

        // Monday stays eligible by the clock, but the id never comes back.
        let offers = session
            .advance_ticks(10)
            .iter()
            .filter_map(|report| report.offered)
            .count();
        assert_eq!(offers, 0);
        assert_eq!(
            session.resolve_situation(Choice::Accept),
            Err(TransitionError::NoSituationAwaiting)
        );
    }

    #[test]
    fn paused_session_is_frozen() {
        let mut session = session();
        session.toggle_pause();
        let before = session.snapshot().clone();

        assert_eq!(session.ticket(), None);
        assert_eq!(session.tick().clock, ClockTransition::Frozen);
        assert_eq!(
            session.request_action(ActionId::Relax),
            Err(TransitionError::Paused)
        );
        assert_eq!(session.request_save(), Err(TransitionError::SavePaused));
        assert_eq!(session.snapshot(), &before);
    }

    #[test]
    fn stale_ticket_is_discarded_after_resume() {
        let mut session = session();
        let ticket = session.ticket().unwrap();
        session.toggle_pause();
        session.toggle_pause();
        assert_eq!(session.deliver_tick(ticket), TickOutcome::Discarded);
        assert_eq!(clock::time_label(session.snapshot().game_time), "07:00");

        let fresh = session.ticket().unwrap();
        assert!(matches!(session.deliver_tick(fresh), TickOutcome::Applied(_)));
        assert_eq!(clock::time_label(session.snapshot().game_time), "07:15");
    }

    #[test]
    fn paused_resolution_keeps_offer() {
        let mut session = session();
        session.advance_ticks(2);
        session.toggle_pause();
        assert_eq!(
            session.resolve_situation(Choice::Decline),
            Err(TransitionError::Paused)
        );
        assert!(session.awaiting_situation().is_some());
    }

    #[test]
    fn navigation_policy_follows_config() {
        let mut session = session();
        session.toggle_pause();
        assert_eq!(session.cycle_location(Direction::Next), Ok(Location::Living));

        let config = SessionConfig {
            navigation_while_paused: false,
            ..SessionConfig::default()
        };
        let mut strict = GameSession::with_rolls(bank(), config, ScriptedRolls::default());
        strict.toggle_pause();
        assert_eq!(
            strict.cycle_location(Direction::Next),
            Err(TransitionError::Paused)
        );
        assert_eq!(strict.snapshot().current_location, Location::Bedroom);
    }

    #[test]
    fn save_then_load_restores_state() {
        let storage = MemoryStorage::new();
        let mut session = session();
        session.request_action(ActionId::Shower).unwrap();
        session.confirm_action(true).unwrap();
        session.advance_ticks(3);

        session.request_save().unwrap();
        let now = Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap();
        assert!(session.confirm_save_at(true, &storage, now));
        let saved = session.snapshot().clone();

        session.reset();
        assert_eq!(session.snapshot().score, 0);
        assert!(session.load_from(&storage));
        assert_eq!(session.snapshot(), &saved);
        assert!(session.awaiting_situation().is_none());
    }

    #[test]
    fn save_without_request_or_declined_writes_nothing() {
        let storage = MemoryStorage::new();
        let mut session = session();
        assert!(!session.confirm_save(true, &storage));
        session.request_save().unwrap();
        assert!(!session.confirm_save(false, &storage));
        assert_eq!(storage.raw(SAVE_SLOT), None);
    }

    #[test]
    fn confirming_while_paused_keeps_the_prompt_open() {
        let mut session = session();
        session.request_action(ActionId::Sleep).unwrap();
        session.toggle_pause();
        let before = session.snapshot().clone();

        assert_eq!(session.confirm_action(true), Err(TransitionError::Paused));
        assert_eq!(session.pending_action(), Some(ActionId::Sleep));
        assert_eq!(session.snapshot(), &before);

        session.toggle_pause();
        let feedback = session.confirm_action(true).unwrap().unwrap();
        assert_eq!(feedback.score_delta, 20);
        assert_eq!(session.pending_action(), None);
        assert_eq!(session.snapshot().score, 20);
    }

    #[test]
    fn save_confirmed_while_paused_stays_requested() {
        let storage = MemoryStorage::new();
        let mut session = session();
        session.request_save().unwrap();
        session.toggle_pause();

        assert!(!session.confirm_save(true, &storage));
        assert!(session.save_requested());
        assert_eq!(storage.raw(SAVE_SLOT), None);

        session.toggle_pause();
        assert!(session.confirm_save(true, &storage));
        assert!(!session.save_requested());
        assert!(storage.raw(SAVE_SLOT).is_some());
    }

    #[test]
    fn failed_load_leaves_session_untouched() {
        let storage = MemoryStorage::new();
        let mut session = session();
        session.request_action(ActionId::Eat).unwrap();
        session.confirm_action(true).unwrap();
        let before = session.snapshot().clone();

        assert!(!session.load_from(&storage));
        storage.put(SAVE_SLOT, r#"{ "savedAt": "2024-01-01T00:00:00Z" }"#);
        assert!(!session.load_from(&storage));
        storage.put(SAVE_SLOT, "corrupted");
        assert!(!session.load_from(&storage));
        assert_eq!(session.snapshot(), &before);
    }

    #[test]
    fn load_drops_ids_unknown_to_the_bank() {
        let storage = MemoryStorage::new();
        let mut state = SimulationState::default();
        state.occurred_situations.extend([1, 99]);
        storage.put(
            SAVE_SLOT,
            persistence::save(&state, Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()).unwrap(),
        );
        let mut session = session();
        assert!(session.load_from(&storage));
        assert_eq!(
            session.snapshot().occurred_situations.iter().copied().collect::<Vec<_>>(),
            vec![1]
        );
    }

    #[test]
    fn reset_clears_transients_but_keeps_prefs() {
        let mut session = session();
        session.toggle_music();
        session.advance_ticks(2);
        session.request_action(ActionId::Eat).unwrap();
        session.reset();

        assert!(!session.snapshot().music_enabled);
        assert!(session.awaiting_situation().is_none());
        assert_eq!(session.pending_action(), None);
        assert_eq!(session.snapshot().current_day, 1);
        assert!(session.drain_events().contains(&SessionEvent::Reset));
    }

    #[test]
    fn rollover_keeps_pending_offer() {
        let situation = Situation {
            id: 5,
            title: "Late".into(),
            description: String::new(),
            weekdays: vec!["segunda".into()],
            start: "23:00".into(),
            end: "23:59".into(),
            options: SituationOptions::default(),
        };
        let mut state = SimulationState::default();
        state.game_time = clock::start_time() + chrono::TimeDelta::minutes(16 * 60 + 15);
        let mut session = GameSession::from_state(
            state,
            SituationBank::new(vec![situation]),
            SessionConfig::default(),
            ScriptedRolls::always(),
        );

        session.advance_ticks(2);
        assert_eq!(session.awaiting_situation().map(|s| s.id), Some(5));
        let reports = session.advance_ticks(2);
        assert_eq!(reports[0].clock, ClockTransition::Rollover { day: 2 });
        assert_eq!(session.awaiting_situation().map(|s| s.id), Some(5));
        assert!(session.resolve_situation(Choice::Accept).is_ok());
    }
}
