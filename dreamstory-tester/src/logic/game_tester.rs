use std::collections::BTreeSet;
use std::hash::Hasher;
use std::sync::Arc;

use anyhow::Result;
use dreamstory_game::constants::MINUTES_PER_DAY;
use dreamstory_game::{
    ActionId, Choice, ClockTransition, DataLoader, Direction, GameSession, MemoryStorage,
    SessionConfig, SessionEvent, SimulationState, SituationBank,
};
use serde::Serialize;
use twox_hash::XxHash64;

use crate::logic::policy::{GameplayStrategy, PlayerPolicy};
use crate::storage::BundledLoader;

pub const DEFAULT_SIM_DAYS: u32 = 3;

/// Game ticks between two looks around the current room.
const TICKS_PER_ROOM_VISIT: u32 = 4;

/// Immutable data shared by every simulated run.
#[derive(Debug, Clone)]
pub struct TesterAssets {
    bank: SituationBank,
    config: SessionConfig,
}

impl TesterAssets {
    /// Bundled feed with the shipped balance. A feed that fails to parse
    /// leaves the run with no situations rather than aborting it.
    pub fn load_default() -> Self {
        Self::from_loader(&BundledLoader::new()).unwrap_or_else(|err| {
            eprintln!("⚠️ Failed to load bundled data: {err:#}");
            Self {
                bank: SituationBank::empty(),
                config: SessionConfig::default(),
            }
        })
    }

    /// # Errors
    ///
    /// Returns an error if the loader fails or the config is out of range.
    pub fn from_loader<L: DataLoader>(loader: &L) -> Result<Self> {
        let bank = loader.load_situation_bank()?;
        let config: SessionConfig = loader.load_config(dreamstory_game::SESSION_CONFIG_NAME)?;
        config.validate()?;
        Ok(Self { bank, config })
    }
}

#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub strategy: GameplayStrategy,
    pub days: u32,
    pub setup: Option<fn(&mut SimulationState)>,
    pub configure: Option<fn(&mut SessionConfig)>,
    /// Flip pause every this many ticks.
    pub pause_every: Option<u32>,
    /// Save and reload through the session at every rollover.
    pub save_checkpoints: bool,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(strategy: GameplayStrategy) -> Self {
        Self {
            strategy,
            days: DEFAULT_SIM_DAYS,
            setup: None,
            configure: None,
            pause_every: None,
            save_checkpoints: false,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub const fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: fn(&mut SimulationState)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_config(mut self, configure: fn(&mut SessionConfig)) -> Self {
        self.configure = Some(configure);
        self
    }

    #[must_use]
    pub const fn with_pause_every(mut self, ticks: u32) -> Self {
        self.pause_every = Some(ticks);
        self
    }

    #[must_use]
    pub const fn with_save_checkpoints(mut self) -> Self {
        self.save_checkpoints = true;
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    #[must_use]
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    /// # Errors
    ///
    /// Returns the expectation's failure.
    pub fn check(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self::new(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ResolutionRecord {
    pub day: u32,
    pub id: u32,
    pub choice: Choice,
    pub points: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionRecord {
    pub day: u32,
    pub action: ActionId,
    pub points: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CheckpointRecord {
    pub day: u32,
    pub saved: bool,
    pub restored: bool,
    /// Reloaded state equals the state that was saved.
    pub matched: bool,
}

/// Everything observed during one simulated run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub strategy: GameplayStrategy,
    pub days_requested: u32,
    pub ticks_run: u32,
    pub running_ticks: u32,
    pub frozen_ticks: u32,
    pub minutes_per_tick: i64,
    pub initial_state: SimulationState,
    pub final_state: SimulationState,
    pub events: Vec<SessionEvent>,
    pub offered: Vec<u32>,
    pub resolutions: Vec<ResolutionRecord>,
    pub actions: Vec<ActionRecord>,
    pub rollovers: Vec<u32>,
    pub checkpoints: Vec<CheckpointRecord>,
    pub rejections: usize,
    pub invariant_violations: Vec<String>,
    pub bank_ids: BTreeSet<u32>,
    /// xxHash64 of the final state and the event log.
    pub digest: u64,
}

impl SimulationSummary {
    fn new(seed: u64, plan: &SimulationPlan, session: &GameSession) -> Self {
        Self {
            seed,
            strategy: plan.strategy,
            days_requested: plan.days,
            ticks_run: 0,
            running_ticks: 0,
            frozen_ticks: 0,
            minutes_per_tick: session.config().minutes_per_tick,
            initial_state: session.snapshot().clone(),
            final_state: session.snapshot().clone(),
            events: Vec::new(),
            offered: Vec::new(),
            resolutions: Vec::new(),
            actions: Vec::new(),
            rollovers: Vec::new(),
            checkpoints: Vec::new(),
            rejections: 0,
            invariant_violations: Vec::new(),
            bank_ids: session.bank().ids(),
            digest: 0,
        }
    }

    fn absorb(&mut self, day: u32, events: Vec<SessionEvent>) {
        for event in events {
            match &event {
                SessionEvent::SituationOffered { id, .. } => self.offered.push(*id),
                SessionEvent::SituationResolved { id, choice, points } => {
                    self.resolutions.push(ResolutionRecord {
                        day,
                        id: *id,
                        choice: *choice,
                        points: *points,
                    });
                }
                SessionEvent::ActionApplied { action, points } => {
                    self.actions.push(ActionRecord {
                        day,
                        action: *action,
                        points: *points,
                    });
                }
                _ => {}
            }
            self.events.push(event);
        }
    }

    fn check_invariants(&mut self, tick: u32, state: &SimulationState) {
        let mut problems = Vec::new();
        if !state.stats.in_bounds() {
            problems.push(format!("stats out of bounds {:?}", state.stats));
        }
        if state.score < 0 {
            problems.push(format!("negative score {}", state.score));
        }
        if state.current_day < 1 {
            problems.push("day counter below 1".to_string());
        }
        if state.stats.mood != state.stats.derive_mood() {
            problems.push(format!("stale mood {:?}", state.stats.mood));
        }
        if !state.occurred_situations.is_subset(&self.bank_ids) {
            problems.push("unknown id in occurred situations".to_string());
        }
        self.invariant_violations
            .extend(problems.into_iter().map(|p| format!("tick {tick}: {p}")));
    }

    fn seal(&mut self, final_state: SimulationState) {
        let mut hasher = XxHash64::with_seed(0);
        hasher.write(&serde_json::to_vec(&final_state).unwrap_or_default());
        hasher.write(&serde_json::to_vec(&self.events).unwrap_or_default());
        self.digest = hasher.finish();
        self.final_state = final_state;
    }

    /// Number of actions applied on `day`.
    #[must_use]
    pub fn actions_on(&self, day: u32) -> usize {
        self.actions.iter().filter(|record| record.day == day).count()
    }
}

/// Game ticks in one simulated day under `config`.
#[must_use]
pub fn ticks_per_day(config: &SessionConfig) -> u32 {
    u32::try_from(MINUTES_PER_DAY / config.minutes_per_tick.max(1)).unwrap_or(u32::MAX)
}

#[derive(Debug, Clone)]
pub struct GameTester {
    assets: Arc<TesterAssets>,
    verbose: bool,
}

impl GameTester {
    #[must_use]
    pub const fn new(assets: Arc<TesterAssets>, verbose: bool) -> Self {
        Self { assets, verbose }
    }

    /// Tester over the bundled data.
    #[must_use]
    pub fn try_new(verbose: bool) -> Self {
        Self::new(Arc::new(TesterAssets::load_default()), verbose)
    }

    /// Play `plan` headlessly with every random draw derived from `seed`.
    #[must_use]
    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let mut config = self.assets.config.clone();
        if let Some(configure) = plan.configure {
            configure(&mut config);
        }
        let mut state = SimulationState::default();
        if let Some(setup) = plan.setup {
            setup(&mut state);
        }
        let mut session = GameSession::resume(seed, state, self.assets.bank.clone(), config);
        let mut policy = plan.strategy.create_policy(seed);
        let storage = MemoryStorage::new();
        let mut summary = SimulationSummary::new(seed, plan, &session);
        let total_ticks = plan.days.saturating_mul(ticks_per_day(session.config()));

        for tick in 0..total_ticks {
            if let Some(every) = plan.pause_every
                && every > 0
                && tick > 0
                && tick % every == 0
            {
                session.toggle_pause();
            }

            let report = session.tick();
            summary.ticks_run += 1;
            match report.clock {
                ClockTransition::Frozen => summary.frozen_ticks += 1,
                ClockTransition::Advanced => summary.running_ticks += 1,
                ClockTransition::Rollover { day } => {
                    summary.running_ticks += 1;
                    summary.rollovers.push(day);
                    if plan.save_checkpoints {
                        let day_events = session.drain_events();
                        summary.absorb(day, day_events);
                        let record = Self::checkpoint(&mut session, &storage);
                        summary.checkpoints.push(record);
                    }
                }
            }

            if !session.snapshot().is_paused {
                summary.rejections += Self::play_turn(&mut session, policy.as_mut(), tick);
            }

            let day = session.snapshot().current_day;
            summary.absorb(day, session.drain_events());
            summary.check_invariants(tick, session.snapshot());
        }

        summary.seal(session.into_state());
        if self.verbose {
            println!(
                "    seed {} [{}] day {} score {} offers {} actions {} digest {:016x}",
                summary.seed,
                policy.name(),
                summary.final_state.current_day,
                summary.final_state.score,
                summary.offered.len(),
                summary.actions.len(),
                summary.digest
            );
        }
        summary
    }

    /// Answer any awaiting situation, and every few ticks try an action in
    /// the current room before walking on. Returns the rejected intents.
    fn play_turn(session: &mut GameSession, policy: &mut dyn PlayerPolicy, tick: u32) -> usize {
        let mut rejections = 0;
        let choice = session
            .awaiting_situation()
            .map(|situation| policy.pick_choice(session.snapshot(), situation));
        if let Some(choice) = choice
            && let Err(err) = session.resolve_situation(choice)
        {
            log::debug!("{} could not resolve: {err}", policy.name());
            rejections += 1;
        }

        if tick % TICKS_PER_ROOM_VISIT == 0 {
            let available = session.actions_here();
            if let Some(action) = policy.pick_action(session.snapshot(), available) {
                let accept = policy.confirms(action);
                let confirmed = session
                    .request_action(action)
                    .and_then(|_| session.confirm_action(accept));
                if let Err(err) = confirmed {
                    log::debug!("{} tried {action}: {err}", policy.name());
                    rejections += 1;
                }
            }
            if session.cycle_location(Direction::Next).is_err() {
                rejections += 1;
            }
        }
        rejections
    }

    fn checkpoint(session: &mut GameSession, storage: &MemoryStorage) -> CheckpointRecord {
        let day = session.snapshot().current_day;
        let saved = session.request_save().is_ok() && session.confirm_save(true, storage);
        let before = session.snapshot().clone();
        let restored = saved && session.load_from(storage);
        CheckpointRecord {
            day,
            saved,
            restored,
            matched: restored && *session.snapshot() == before,
        }
    }
}
