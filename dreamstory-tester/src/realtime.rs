//! Real-time mode: one session paced by the tokio driver, played by a
//! scripted policy, saved to the engine's slot when the run ends.
use std::time::{Duration, Instant};

use anyhow::Result;
use colored::Colorize;
use dreamstory_game::{DataLoader, GameEngine, GameStorage, RealtimeDriver, TickOutcome};

use crate::logic::{GameplayStrategy, ScenarioResult};

#[derive(Debug, Clone, Copy)]
pub struct RealtimeOptions {
    pub seed: u64,
    pub ticks: u64,
    pub period: Duration,
    pub strategy: GameplayStrategy,
    pub verbose: bool,
}

/// Drive a resumed (or fresh) session for `options.ticks` periods. Ctrl-C
/// stops the driver early; the state is saved either way.
///
/// # Errors
///
/// Returns an error if the engine cannot load, create or save the game.
pub async fn run_realtime_session<L, S>(
    engine: &GameEngine<L, S>,
    options: &RealtimeOptions,
) -> Result<ScenarioResult>
where
    L: DataLoader,
    S: GameStorage,
{
    let mut session = match engine.load_game(options.seed)? {
        Some(session) => {
            println!(
                "💾 Resuming saved game on day {}",
                session.snapshot().current_day
            );
            session
        }
        None => engine.create_session(options.seed)?,
    };
    if session.snapshot().is_paused {
        session.toggle_pause();
    }

    let mut policy = options.strategy.create_policy(options.seed);
    let (driver, handle) = RealtimeDriver::with_period(options.period);
    let mut driver = driver.with_tick_limit(options.ticks);
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            handle.shutdown();
        }
    });

    let verbose = options.verbose;
    let mut failures: Vec<String> = Vec::new();
    let started = Instant::now();
    let summary = driver
        .run(&mut session, |session, outcome| {
            if matches!(outcome, TickOutcome::Applied(_)) {
                let choice = session
                    .awaiting_situation()
                    .map(|situation| policy.pick_choice(session.snapshot(), situation));
                if let Some(choice) = choice
                    && let Err(err) = session.resolve_situation(choice)
                {
                    log::debug!("real-time resolve rejected: {err}");
                }
            }
            for event in session.drain_events() {
                if verbose {
                    println!(
                        "  ⏱️ {}",
                        serde_json::to_string(&event).unwrap_or_default()
                    );
                }
            }
            let state = session.snapshot();
            if failures.is_empty() && (!state.stats.in_bounds() || state.score < 0) {
                failures.push(format!(
                    "State invariants broken on day {} at score {}",
                    state.current_day, state.score
                ));
            }
        })
        .await;
    interrupt.abort();
    let elapsed = started.elapsed();

    if summary.delivered + summary.discarded < options.ticks {
        println!(
            "{}",
            format!(
                "⚠️  Stopped early after {} of {} ticks",
                summary.delivered + summary.discarded,
                options.ticks
            )
            .yellow()
        );
    }
    engine.save_game(session.snapshot())?;

    let state = session.snapshot();
    let label = if failures.is_empty() {
        "✅".green()
    } else {
        "❌".red()
    };
    println!(
        "{label} [real-time seed {}] {} ticks delivered, {} discarded, {} frozen | day {} {} score {} mood {}",
        options.seed,
        summary.delivered,
        summary.discarded,
        summary.frozen,
        state.current_day,
        dreamstory_game::clock::time_label(state.game_time),
        state.score,
        state.stats.mood
    );

    Ok(ScenarioResult {
        scenario_name: format!("Real-time Session ({})", options.strategy),
        passed: failures.is_empty(),
        iterations_run: 1,
        successful_iterations: usize::from(failures.is_empty()),
        failures,
        average_duration: elapsed,
        performance_data: vec![elapsed],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{BundledLoader, FileStorage};
    use dreamstory_game::MemoryStorage;

    fn options(ticks: u64) -> RealtimeOptions {
        RealtimeOptions {
            seed: 77,
            ticks,
            period: Duration::from_millis(10),
            strategy: GameplayStrategy::Balanced,
            verbose: false,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_run_saves_its_progress() {
        let engine = GameEngine::new(BundledLoader::new(), MemoryStorage::new());
        let result = run_realtime_session(&engine, &options(8)).await.unwrap();
        assert!(result.passed);

        let saved = engine.load_game(1).unwrap().expect("saved after the run");
        assert_eq!(
            dreamstory_game::clock::time_label(saved.snapshot().game_time),
            "09:00"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn realtime_run_resumes_a_file_slot() {
        let dir = tempfile::tempdir().unwrap();
        let engine = GameEngine::new(BundledLoader::new(), FileStorage::new(dir.path()).unwrap());
        run_realtime_session(&engine, &options(4)).await.unwrap();
        run_realtime_session(&engine, &options(4)).await.unwrap();

        let saved = engine.load_game(1).unwrap().expect("saved after the runs");
        assert_eq!(
            dreamstory_game::clock::time_label(saved.snapshot().game_time),
            "09:00"
        );
    }
}
