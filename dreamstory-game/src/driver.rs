//! Real-time pacing for a [`GameSession`] on tokio intervals.
//!
//! The driver borrows the session for the duration of [`RealtimeDriver::run`];
//! presenters react through the per-tick callback and stop the loop with the
//! [`ShutdownHandle`].
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::constants::REALTIME_TICK_MS;
use crate::scheduler::RollSource;
use crate::session::{GameSession, TickOutcome};

/// Stops a running driver. Dropping the handle stops it as well.
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn shutdown(&self) {
        self.tx.send_replace(true);
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverSummary {
    /// Ticks that reached the clock.
    pub delivered: u64,
    /// Ticks whose ticket went stale before delivery.
    pub discarded: u64,
    /// Interval periods skipped because the session was paused.
    pub frozen: u64,
}

#[derive(Debug)]
pub struct RealtimeDriver {
    period: Duration,
    tick_limit: Option<u64>,
    shutdown: watch::Receiver<bool>,
}

impl RealtimeDriver {
    /// Driver with the standard one-second period plus its shutdown handle.
    #[must_use]
    pub fn new() -> (Self, ShutdownHandle) {
        Self::with_period(Duration::from_millis(REALTIME_TICK_MS))
    }

    #[must_use]
    pub fn with_period(period: Duration) -> (Self, ShutdownHandle) {
        let (tx, shutdown) = watch::channel(false);
        let driver = Self {
            period: period.max(Duration::from_millis(1)),
            tick_limit: None,
            shutdown,
        };
        (driver, ShutdownHandle { tx })
    }

    /// Stop on its own after this many interval periods.
    #[must_use]
    pub const fn with_tick_limit(mut self, limit: u64) -> Self {
        self.tick_limit = Some(limit);
        self
    }

    /// Drive `session` until shutdown or the tick limit. Each period a ticket
    /// is taken up front and delivered when the interval fires, so a pause or
    /// reset in between discards it.
    pub async fn run<R, F>(&mut self, session: &mut GameSession<R>, mut on_tick: F) -> DriverSummary
    where
        R: RollSource,
        F: FnMut(&mut GameSession<R>, TickOutcome),
    {
        let mut interval = time::interval(self.period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick completes immediately.
        interval.tick().await;

        let mut summary = DriverSummary::default();
        let mut periods = 0_u64;
        loop {
            if *self.shutdown.borrow() || self.tick_limit.is_some_and(|limit| periods >= limit) {
                break;
            }
            let ticket = session.ticket();
            tokio::select! {
                changed = self.shutdown.changed() => {
                    if changed.is_err() {
                        log::debug!("driver shutdown handle dropped");
                        break;
                    }
                }
                _ = interval.tick() => {
                    periods += 1;
                    match ticket {
                        Some(ticket) => {
                            let outcome = session.deliver_tick(ticket);
                            match outcome {
                                TickOutcome::Applied(_) => summary.delivered += 1,
                                TickOutcome::Discarded => summary.discarded += 1,
                            }
                            on_tick(session, outcome);
                        }
                        None => summary.frozen += 1,
                    }
                }
            }
        }
        log::info!(
            "real-time driver stopped: {} delivered, {} discarded, {} frozen",
            summary.delivered,
            summary.discarded,
            summary.frozen
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock;
    use crate::config::SessionConfig;
    use crate::data::SituationBank;
    use crate::scheduler::ScriptedRolls;

    fn session() -> GameSession<ScriptedRolls> {
        GameSession::with_rolls(
            SituationBank::empty(),
            SessionConfig::default(),
            ScriptedRolls::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn advances_one_tick_per_period() {
        let mut session = session();
        let (driver, _handle) = RealtimeDriver::new();
        let mut driver = driver.with_tick_limit(8);
        let summary = driver.run(&mut session, |_, _| {}).await;

        assert_eq!(summary.delivered, 8);
        assert_eq!(clock::time_label(session.snapshot().game_time), "09:00");
    }

    #[tokio::test(start_paused = true)]
    async fn pausing_from_callback_freezes_time() {
        let mut session = session();
        let (driver, _handle) = RealtimeDriver::with_period(Duration::from_millis(250));
        let mut driver = driver.with_tick_limit(6);
        let summary = driver
            .run(&mut session, |session, _| {
                if session.snapshot().game_time.format("%H:%M").to_string() == "07:30" {
                    session.toggle_pause();
                }
            })
            .await;

        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.frozen, 4);
        assert!(session.snapshot().is_paused);
        assert_eq!(clock::time_label(session.snapshot().game_time), "07:30");
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_handle_stops_the_loop() {
        let mut session = session();
        let (mut driver, handle) = RealtimeDriver::new();
        let summary = driver
            .run(&mut session, |session, _| {
                if session.snapshot().current_day == 1
                    && clock::time_label(session.snapshot().game_time) == "08:00"
                {
                    handle.shutdown();
                }
            })
            .await;
        assert_eq!(summary.delivered, 4);
    }
}
