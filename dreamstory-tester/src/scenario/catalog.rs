use std::collections::BTreeSet;
use std::fs;

use anyhow::{Context, Result, anyhow};
use dreamstory_game::{
    ActionId, GameEngine, SessionConfig, SessionEvent, SimulationState, clock,
};

use crate::logic::game_tester::SimulationSummary;
use crate::logic::{GameTester, GameplayStrategy, SimulationPlan};
use crate::storage::{BundledLoader, FileStorage};
use crate::util::scratch_dir;

const SMOKE_DAYS: u32 = 2;
const ROLLOVER_DAYS: u32 = 7;
const PERMANENCE_DAYS: u32 = 14;

pub fn smoke_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Balanced)
        .with_days(SMOKE_DAYS)
        .with_expectation(invariants_expectation)
        .with_expectation(smoke_expectation)
}

pub fn day_rollover_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Idle)
        .with_days(ROLLOVER_DAYS)
        .with_expectation(invariants_expectation)
        .with_expectation(day_rollover_expectation)
}

pub fn daily_actions_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Diligent)
        .with_expectation(invariants_expectation)
        .with_expectation(daily_actions_expectation)
}

pub fn situation_permanence_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Balanced)
        .with_days(PERMANENCE_DAYS)
        .with_config(eager_scheduler)
        .with_expectation(invariants_expectation)
        .with_expectation(situation_permanence_expectation)
}

pub fn stat_bounds_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Hedonist)
        .with_days(5)
        .with_setup(extreme_stats)
        .with_config(harsh_effects)
        .with_expectation(invariants_expectation)
        .with_expectation(stat_bounds_expectation)
}

pub fn save_load_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Diligent)
        .with_days(4)
        .with_save_checkpoints()
        .with_expectation(invariants_expectation)
        .with_expectation(checkpoint_expectation)
        .with_expectation(file_slot_expectation)
}

pub fn pause_freeze_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Random)
        .with_days(SMOKE_DAYS)
        .with_pause_every(7)
        .with_expectation(invariants_expectation)
        .with_expectation(pause_freeze_expectation)
}

fn replay_base_plan() -> SimulationPlan {
    SimulationPlan::new(GameplayStrategy::Random).with_config(eager_scheduler)
}

pub fn deterministic_replay_plan() -> SimulationPlan {
    replay_base_plan()
        .with_expectation(invariants_expectation)
        .with_expectation(deterministic_replay_expectation)
}

fn eager_scheduler(config: &mut SessionConfig) {
    config.trigger_chance = 1.0;
    config.scheduler_stride = 1;
}

fn harsh_effects(config: &mut SessionConfig) {
    config.trigger_chance = 0.6;
    config.effect_multiplier = 40;
}

fn extreme_stats(state: &mut SimulationState) {
    state.stats.health = 0;
    state.stats.energy = 100;
    state.stats.sleep_quality = 2;
    state.stats.relationships = 100;
    state.stats.productivity = 0;
    state.stats.refresh_mood();
}

fn invariants_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.invariant_violations.is_empty(),
        "{} invariant violations, first: {}",
        summary.invariant_violations.len(),
        summary.invariant_violations[0]
    );
    anyhow::ensure!(
        summary.final_state.stats.in_bounds(),
        "Final stats out of bounds"
    );
    anyhow::ensure!(summary.final_state.score >= 0, "Score went negative");
    Ok(())
}

fn smoke_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(summary.ticks_run > 0, "Simulation should run at least one tick");
    anyhow::ensure!(
        summary.final_state.current_day == 1 + summary.days_requested,
        "Expected day {} after {} days, got {}",
        1 + summary.days_requested,
        summary.days_requested,
        summary.final_state.current_day
    );
    Ok(())
}

fn day_rollover_expectation(summary: &SimulationSummary) -> Result<()> {
    let expected: Vec<u32> = (2..=summary.days_requested + 1).collect();
    anyhow::ensure!(
        summary.rollovers == expected,
        "Rollovers {:?}, expected {:?}",
        summary.rollovers,
        expected
    );

    let mut weekday = clock::weekday(summary.initial_state.game_time);
    let mut day = summary.initial_state.current_day;
    for event in &summary.events {
        if let SessionEvent::DayStarted {
            day: started,
            weekday: started_on,
        } = event
        {
            day += 1;
            weekday = weekday.succ();
            anyhow::ensure!(*started == day, "Day {started} started, expected {day}");
            anyhow::ensure!(
                *started_on == weekday,
                "Day {started} is a {started_on}, expected {weekday}"
            );
        }
    }

    let label = clock::time_label(summary.final_state.game_time);
    anyhow::ensure!(label == "07:00", "Run should end at 07:00, ended at {label}");
    anyhow::ensure!(
        summary.final_state.daily_actions.completed() == 0,
        "Idle player should have no completed actions"
    );
    Ok(())
}

fn daily_actions_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut seen = BTreeSet::new();
    for record in &summary.actions {
        anyhow::ensure!(
            seen.insert((record.day, record.action)),
            "{} applied twice on day {}",
            record.action,
            record.day
        );
        let points = record.action.action().points;
        anyhow::ensure!(
            record.points == points,
            "{} scored {}, catalog says {points}",
            record.action,
            record.points
        );
    }
    for day in 1..=summary.days_requested {
        anyhow::ensure!(
            summary.actions_on(day) == ActionId::ALL.len(),
            "Day {day} finished {} of {} actions",
            summary.actions_on(day),
            ActionId::ALL.len()
        );
    }
    let final_day = summary.final_state.current_day;
    for record in summary.actions.iter().filter(|r| r.day == final_day) {
        anyhow::ensure!(
            summary.final_state.daily_actions.is_done(record.action),
            "{} missing from today's flags",
            record.action
        );
    }
    Ok(())
}

fn situation_permanence_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut resolved = BTreeSet::new();
    for event in &summary.events {
        match event {
            SessionEvent::SituationOffered { id, .. } => {
                anyhow::ensure!(
                    !resolved.contains(id),
                    "Situation {id} offered again after resolution"
                );
            }
            SessionEvent::SituationResolved { id, .. } => {
                anyhow::ensure!(resolved.insert(*id), "Situation {id} resolved twice");
            }
            _ => {}
        }
    }
    anyhow::ensure!(!resolved.is_empty(), "No situation was ever resolved");
    anyhow::ensure!(
        resolved == summary.final_state.occurred_situations,
        "Occurred set {:?} differs from resolutions {:?}",
        summary.final_state.occurred_situations,
        resolved
    );
    anyhow::ensure!(
        resolved.is_subset(&summary.bank_ids),
        "Resolved ids outside the feed"
    );
    Ok(())
}

fn stat_bounds_expectation(summary: &SimulationSummary) -> Result<()> {
    let stats = &summary.final_state.stats;
    anyhow::ensure!(
        stats.mood == stats.derive_mood(),
        "Mood {} does not match stats",
        stats.mood
    );
    anyhow::ensure!(
        !summary.resolutions.is_empty(),
        "Harsh run should resolve at least one situation"
    );
    Ok(())
}

fn checkpoint_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(
        summary.checkpoints.len() == summary.rollovers.len(),
        "{} checkpoints for {} rollovers",
        summary.checkpoints.len(),
        summary.rollovers.len()
    );
    if let Some(bad) = summary.checkpoints.iter().find(|c| !c.matched) {
        return Err(anyhow!(
            "Checkpoint on day {} failed (saved {}, restored {})",
            bad.day,
            bad.saved,
            bad.restored
        ));
    }
    Ok(())
}

/// The final state survives a trip through a file-backed slot.
fn file_slot_expectation(summary: &SimulationSummary) -> Result<()> {
    let dir = scratch_dir("save-load");
    let outcome = file_roundtrip(&dir, summary);
    let _ = fs::remove_dir_all(&dir);
    outcome
}

fn file_roundtrip(dir: &std::path::Path, summary: &SimulationSummary) -> Result<()> {
    let storage = FileStorage::new(dir).context("opening save directory")?;
    let engine = GameEngine::new(BundledLoader::new(), storage);
    engine.save_game(&summary.final_state)?;
    let session = engine
        .load_game(summary.seed)?
        .ok_or_else(|| anyhow!("Save slot empty after writing"))?;
    anyhow::ensure!(
        session.snapshot() == &summary.final_state,
        "Reloaded state differs from saved state"
    );
    engine.delete_game().context("deleting save slot")?;
    anyhow::ensure!(
        engine.load_game(summary.seed)?.is_none(),
        "Save slot should be gone after delete"
    );
    Ok(())
}

fn pause_freeze_expectation(summary: &SimulationSummary) -> Result<()> {
    anyhow::ensure!(summary.frozen_ticks > 0, "Run never paused");
    let elapsed = (summary.final_state.game_time - summary.initial_state.game_time).num_minutes();
    let expected = i64::from(summary.running_ticks) * summary.minutes_per_tick;
    anyhow::ensure!(
        elapsed == expected,
        "Clock moved {elapsed} minutes over {} running ticks",
        summary.running_ticks
    );
    anyhow::ensure!(
        usize::try_from(summary.final_state.current_day).ok() == Some(summary.rollovers.len() + 1),
        "Day counter does not match rollovers"
    );

    let mut paused = summary.initial_state.is_paused;
    for event in &summary.events {
        match event {
            SessionEvent::PauseToggled { paused: now } => paused = *now,
            SessionEvent::SituationOffered { .. }
            | SessionEvent::SituationResolved { .. }
            | SessionEvent::ActionApplied { .. }
            | SessionEvent::DayStarted { .. }
                if paused =>
            {
                return Err(anyhow!("State changed while paused: {event:?}"));
            }
            _ => {}
        }
    }
    Ok(())
}

fn deterministic_replay_expectation(summary: &SimulationSummary) -> Result<()> {
    let replay = GameTester::try_new(false).run_plan(&replay_base_plan(), summary.seed);
    anyhow::ensure!(
        replay.digest == summary.digest,
        "Replay digest {:016x} differs from {:016x}",
        replay.digest,
        summary.digest
    );
    anyhow::ensure!(
        replay.final_state == summary.final_state,
        "Replay ended in a different state"
    );
    Ok(())
}
