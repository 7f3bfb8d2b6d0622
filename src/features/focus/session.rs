//! A running focus session.
//!
//! `FocusSession` owns one spawned task that holds the `SessionTimer`. The
//! task is the only writer: lifecycle phases and ticks are handled one at a
//! time, each to completion, and readers see copies through a watch channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::lifecycle::LifecycleSource;
use super::report::{report_session_end, statistics_date};
use super::timer::{SessionSummary, SessionTimer, TimerSettings, TimerSnapshot, TimerState};
use crate::api::SessionApi;
use crate::config::FocusConfig;
use crate::core::Clock;
use crate::error::VimayaError;

/// Settings for starting a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub timer: TimerSettings,
    pub tick_interval: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            timer: TimerSettings::default(),
            tick_interval: Duration::from_secs(1),
        }
    }
}

impl From<&FocusConfig> for SessionOptions {
    fn from(config: &FocusConfig) -> Self {
        Self {
            timer: config.timer_settings(),
            tick_interval: config.tick_interval(),
        }
    }
}

/// Handle to a running focus session.
///
/// Dropping the handle cancels the session without reporting it.
pub struct FocusSession {
    api: Arc<dyn SessionApi>,
    clock: Arc<dyn Clock>,
    state: watch::Receiver<TimerSnapshot>,
    end_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<SessionTimer>>,
}

impl FocusSession {
    /// Start a session and begin counting immediately.
    ///
    /// The server is told about the start in the background; if that fails
    /// the session keeps counting locally.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start<L>(
        api: Arc<dyn SessionApi>,
        clock: Arc<dyn Clock>,
        lifecycle: L,
        options: SessionOptions,
    ) -> Self
    where
        L: LifecycleSource + 'static,
    {
        let starter = Arc::clone(&api);
        tokio::spawn(async move {
            match starter.start_session().await {
                Ok(id) => tracing::info!(session_id = id, "focus session started"),
                Err(e) => tracing::warn!("Failed to start focus session, counting locally: {e}"),
            }
        });

        let timer = SessionTimer::new(options.timer);
        let (state_tx, state_rx) = watch::channel(timer.snapshot());
        let (end_tx, end_rx) = oneshot::channel();

        let task = tokio::spawn(run_timer(
            timer,
            lifecycle,
            Arc::clone(&clock),
            options.tick_interval,
            end_rx,
            state_tx,
        ));

        Self {
            api,
            clock,
            state: state_rx,
            end_tx: Some(end_tx),
            task: Some(task),
        }
    }

    /// Current elapsed time, points, run state and phase.
    #[must_use]
    pub fn snapshot(&self) -> TimerSnapshot {
        *self.state.borrow()
    }

    /// Receiver notified on every change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TimerSnapshot> {
        self.state.clone()
    }

    #[must_use]
    pub fn elapsed_seconds(&self) -> i64 {
        self.snapshot().elapsed_seconds
    }

    #[must_use]
    pub fn accrued_points(&self) -> i64 {
        self.snapshot().accrued_points
    }

    #[must_use]
    pub fn state(&self) -> TimerState {
        self.snapshot().state
    }

    /// Stop counting and report the session.
    ///
    /// # Errors
    ///
    /// Returns `VimayaError::SaveFailed` if any report failed; the error
    /// carries the totals so reporting can be retried with
    /// `report_session_end`.
    pub async fn end(mut self) -> Result<SessionSummary, VimayaError> {
        if let Some(end_tx) = self.end_tx.take() {
            let _ = end_tx.send(());
        }

        let summary = match self.task.take() {
            Some(task) => match task.await {
                Ok(timer) => timer.summary(),
                Err(e) => {
                    tracing::error!("focus timer task failed: {e}");
                    let last = self.snapshot();
                    SessionSummary {
                        elapsed_seconds: last.elapsed_seconds,
                        accrued_points: last.accrued_points,
                    }
                },
            },
            None => {
                let last = self.snapshot();
                SessionSummary {
                    elapsed_seconds: last.elapsed_seconds,
                    accrued_points: last.accrued_points,
                }
            },
        };

        tracing::info!(
            seconds = summary.elapsed_seconds,
            points = summary.accrued_points,
            "ending focus session"
        );

        let date = statistics_date(self.clock.now());
        report_session_end(self.api.as_ref(), summary, date).await?;
        Ok(summary)
    }
}

impl Drop for FocusSession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run_timer<L: LifecycleSource>(
    mut timer: SessionTimer,
    mut lifecycle: L,
    clock: Arc<dyn Clock>,
    tick_interval: Duration,
    mut end_rx: oneshot::Receiver<()>,
    state_tx: watch::Sender<TimerSnapshot>,
) -> SessionTimer {
    // tokio intervals must be non-zero.
    let tick_interval = tick_interval.max(Duration::from_millis(1));
    let mut ticker = time::interval_at(Instant::now() + tick_interval, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut lifecycle_open = true;

    loop {
        // Order matters: an end request beats a pending phase change, and a
        // phase change is applied before a tick that became due alongside it.
        tokio::select! {
            biased;

            _ = &mut end_rx => break,

            phase = lifecycle.next_phase(), if lifecycle_open => {
                let Some(phase) = phase else {
                    tracing::debug!("lifecycle source closed");
                    lifecycle_open = false;
                    continue;
                };

                let was_running = timer.is_running();
                timer.handle_phase(phase, clock.now());
                tracing::debug!(%phase, state = %timer.state(), "lifecycle phase handled");

                if timer.is_running() && !was_running {
                    // Fresh tick source: the first tick lands a full period
                    // after resuming.
                    ticker.reset();
                }
                state_tx.send_replace(timer.snapshot());
            }

            // The guard is re-evaluated on every iteration.
            _ = ticker.tick(), if timer.is_running() => {
                if timer.tick() {
                    state_tx.send_replace(timer.snapshot());
                }
            }
        }
    }

    timer.end();
    state_tx.send_replace(timer.snapshot());
    timer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockSessionApi;
    use crate::core::{ManualClock, SystemClock};
    use crate::features::focus::{LifecyclePhase, NoLifecycle, Platform};
    use chrono::{TimeZone, Utc};
    use mockall::predicate::eq;
    use tokio::sync::mpsc;

    fn options(platform: Platform) -> SessionOptions {
        SessionOptions {
            timer: TimerSettings {
                platform,
                ..TimerSettings::default()
            },
            tick_interval: Duration::from_secs(1),
        }
    }

    fn api_expecting_start() -> MockSessionApi {
        let mut api = MockSessionApi::new();
        api.expect_start_session().times(1).returning(|| Ok(42));
        api
    }

    fn manual_clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
    }

    async fn settle() {
        time::sleep(Duration::from_millis(10)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_second() {
        let session = FocusSession::start(
            Arc::new(api_expecting_start()),
            Arc::new(SystemClock),
            NoLifecycle,
            options(Platform::Other),
        );

        time::sleep(Duration::from_millis(3500)).await;

        let snapshot = session.snapshot();
        assert_eq!(snapshot.elapsed_seconds, 3);
        assert_eq!(snapshot.accrued_points, 150);
        assert_eq!(snapshot.state, TimerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_failure_keeps_counting() {
        let mut api = MockSessionApi::new();
        api.expect_start_session()
            .times(1)
            .returning(|| Err(VimayaError::Network("offline".to_string())));

        let session = FocusSession::start(
            Arc::new(api),
            Arc::new(SystemClock),
            NoLifecycle,
            options(Platform::Other),
        );

        time::sleep(Duration::from_millis(2500)).await;

        assert_eq!(session.elapsed_seconds(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ios_screen_lock_counts_background_time() {
        let clock = manual_clock();
        let (tx, rx) = mpsc::unbounded_channel();
        let session = FocusSession::start(
            Arc::new(api_expecting_start()),
            Arc::new(clock.clone()),
            rx,
            options(Platform::Ios),
        );

        tx.send(LifecyclePhase::Inactive).unwrap();
        settle().await;
        clock.advance(chrono::Duration::milliseconds(50));
        tx.send(LifecyclePhase::Background).unwrap();
        settle().await;

        assert_eq!(session.state(), TimerState::Running);

        // Ticks keep firing while locked: 1s, 2s, 3s, 4s, 5s.
        time::sleep(Duration::from_millis(5000)).await;
        assert_eq!(session.elapsed_seconds(), 5);

        clock.advance(chrono::Duration::seconds(30));
        tx.send(LifecyclePhase::Active).unwrap();
        settle().await;

        assert_eq!(session.elapsed_seconds(), 35);
        assert_eq!(session.accrued_points(), 35 * 50);
        assert_eq!(session.state(), TimerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ios_genuine_background_pauses_ticks() {
        let clock = manual_clock();
        let (tx, rx) = mpsc::unbounded_channel();
        let session = FocusSession::start(
            Arc::new(api_expecting_start()),
            Arc::new(clock.clone()),
            rx,
            options(Platform::Ios),
        );

        tx.send(LifecyclePhase::Inactive).unwrap();
        settle().await;
        clock.advance(chrono::Duration::milliseconds(800));
        tx.send(LifecyclePhase::Background).unwrap();
        settle().await;

        assert_eq!(session.state(), TimerState::Paused);

        time::sleep(Duration::from_secs(10)).await;
        assert_eq!(session.elapsed_seconds(), 0);

        clock.advance(chrono::Duration::seconds(10));
        tx.send(LifecyclePhase::Active).unwrap();
        settle().await;

        assert_eq!(session.state(), TimerState::Running);
        assert_eq!(session.elapsed_seconds(), 0);

        // The resumed tick source starts a full period after resuming.
        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(session.elapsed_seconds(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_android_pauses_outside_active() {
        let (tx, rx) = mpsc::unbounded_channel();
        let session = FocusSession::start(
            Arc::new(api_expecting_start()),
            Arc::new(manual_clock()),
            rx,
            options(Platform::Android),
        );

        tx.send(LifecyclePhase::Inactive).unwrap();
        settle().await;
        assert_eq!(session.state(), TimerState::Paused);

        tx.send(LifecyclePhase::Background).unwrap();
        settle().await;
        assert_eq!(session.state(), TimerState::Paused);

        time::sleep(Duration::from_secs(4)).await;
        assert_eq!(session.elapsed_seconds(), 0);

        tx.send(LifecyclePhase::Active).unwrap();
        settle().await;
        assert_eq!(session.state(), TimerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_reports_totals() {
        let mut api = api_expecting_start();
        api.expect_end_session()
            .with(eq(3))
            .times(1)
            .returning(|_| Ok(()));
        api.expect_add_xp()
            .with(eq(150))
            .times(1)
            .returning(|_| Ok(()));
        api.expect_update_daily_statistics()
            .withf(|u| u.total_focus_time_seconds == 3)
            .times(1)
            .returning(|_| Ok(()));

        let session = FocusSession::start(
            Arc::new(api),
            Arc::new(SystemClock),
            NoLifecycle,
            options(Platform::Other),
        );
        let state = session.subscribe();

        time::sleep(Duration::from_millis(3500)).await;
        let summary = session.end().await.unwrap();

        assert_eq!(
            summary,
            SessionSummary {
                elapsed_seconds: 3,
                accrued_points: 150
            }
        );
        assert_eq!(state.borrow().state, TimerState::Paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_surfaces_partial_failure() {
        let mut api = api_expecting_start();
        api.expect_end_session().times(1).returning(|_| Ok(()));
        api.expect_add_xp()
            .times(1)
            .returning(|_| Err(VimayaError::Api("500".to_string())));
        api.expect_update_daily_statistics()
            .times(1)
            .returning(|_| Ok(()));

        let session = FocusSession::start(
            Arc::new(api),
            Arc::new(SystemClock),
            NoLifecycle,
            options(Platform::Other),
        );

        time::sleep(Duration::from_millis(2100)).await;
        let err = session.end().await.unwrap_err();

        match err {
            VimayaError::SaveFailed { summary } => assert_eq!(summary.elapsed_seconds, 2),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_tick_interval_still_counts() {
        let config = FocusConfig {
            tick_interval_ms: 0,
            platform: Platform::Other,
            ..FocusConfig::default()
        };
        let session = FocusSession::start(
            Arc::new(api_expecting_start()),
            Arc::new(SystemClock),
            NoLifecycle,
            SessionOptions::from(&config),
        );

        time::sleep(Duration::from_millis(20)).await;

        assert!(session.elapsed_seconds() > 0);
        assert_eq!(session.state(), TimerState::Running);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_ticks() {
        let session = FocusSession::start(
            Arc::new(api_expecting_start()),
            Arc::new(SystemClock),
            NoLifecycle,
            options(Platform::Other),
        );
        let state = session.subscribe();

        time::sleep(Duration::from_millis(1500)).await;
        drop(session);
        time::sleep(Duration::from_secs(5)).await;

        assert_eq!(state.borrow().elapsed_seconds, 1);
    }
}
