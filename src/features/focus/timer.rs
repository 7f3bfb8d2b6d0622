//! Focus session timekeeping.
//!
//! `SessionTimer` is a synchronous state machine: the caller drives it with
//! one-second ticks and lifecycle phase changes stamped with the current
//! time. It owns no scheduler, so every transition can be tested directly.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::lifecycle::{LifecyclePhase, Platform};

/// Whether the one-second tick is counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    /// Ticks add time and points
    Running,
    /// Ticks are ignored
    Paused,
}

impl std::fmt::Display for TimerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => write!(f, "Running"),
            Self::Paused => write!(f, "Paused"),
        }
    }
}

/// Tunables for a `SessionTimer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerSettings {
    /// Points added per counted second
    pub points_per_second: i64,
    /// Longest inactive-to-background gap still classified as a screen lock
    pub screen_lock_threshold: Duration,
    /// Selects the lifecycle algorithm
    pub platform: Platform,
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            points_per_second: 50,
            screen_lock_threshold: Duration::milliseconds(100),
            platform: Platform::current(),
        }
    }
}

/// Read-only view of a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub elapsed_seconds: i64,
    pub accrued_points: i64,
    pub state: TimerState,
    pub phase: LifecyclePhase,
}

/// Totals reported when a session ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub elapsed_seconds: i64,
    pub accrued_points: i64,
}

/// Elapsed time and points for one focus session.
#[derive(Debug, Clone)]
pub struct SessionTimer {
    settings: TimerSettings,
    elapsed_seconds: i64,
    /// Accumulated separately from `elapsed_seconds` because resume
    /// catch-up adds a lump sum.
    accrued_points: i64,
    state: TimerState,
    phase: LifecyclePhase,
    inactive_entered_at: Option<DateTime<Utc>>,
    background_entered_at: Option<DateTime<Utc>>,
    accumulate_on_resume: bool,
    ended: bool,
}

impl SessionTimer {
    /// Create a running timer in the active phase.
    #[must_use]
    pub const fn new(settings: TimerSettings) -> Self {
        Self {
            settings,
            elapsed_seconds: 0,
            accrued_points: 0,
            state: TimerState::Running,
            phase: LifecyclePhase::Active,
            inactive_entered_at: None,
            background_entered_at: None,
            accumulate_on_resume: false,
            ended: false,
        }
    }

    /// Advance by one second.
    ///
    /// Returns true if the tick was counted.
    pub fn tick(&mut self) -> bool {
        if self.ended || self.state != TimerState::Running {
            return false;
        }

        self.elapsed_seconds += 1;
        self.accrued_points += self.settings.points_per_second;
        true
    }

    /// Apply a lifecycle phase reported by the host at `now`.
    pub fn handle_phase(&mut self, phase: LifecyclePhase, now: DateTime<Utc>) {
        if self.ended {
            return;
        }

        if self.settings.platform.is_ios() {
            self.handle_phase_ios(phase, now);
        } else {
            self.handle_phase_default(phase, now);
        }
        self.phase = phase;
    }

    /// Any phase other than active pauses; nothing is caught up on return.
    fn handle_phase_default(&mut self, phase: LifecyclePhase, now: DateTime<Utc>) {
        match phase {
            LifecyclePhase::Active => {
                self.inactive_entered_at = None;
                self.background_entered_at = None;
                self.state = TimerState::Running;
            },
            LifecyclePhase::Inactive => {
                self.inactive_entered_at = Some(now);
                self.background_entered_at = None;
                self.state = TimerState::Paused;
            },
            LifecyclePhase::Background => {
                self.inactive_entered_at = None;
                self.background_entered_at = Some(now);
                self.state = TimerState::Paused;
            },
        }
        self.accumulate_on_resume = false;
    }

    fn handle_phase_ios(&mut self, phase: LifecyclePhase, now: DateTime<Utc>) {
        match phase {
            LifecyclePhase::Inactive => {
                // On the way back from background the background stamp must
                // survive so the resume catch-up still happens.
                if self.phase != LifecyclePhase::Background {
                    self.inactive_entered_at = Some(now);
                    self.background_entered_at = None;
                }
                self.state = TimerState::Running;
            },
            LifecyclePhase::Background => {
                let transition = self.inactive_entered_at.take().map(|at| now - at);
                self.background_entered_at = Some(now);

                match transition {
                    Some(gap) if gap <= self.settings.screen_lock_threshold => {
                        tracing::debug!(
                            gap_ms = gap.num_milliseconds(),
                            "inactive to background looks like a screen lock"
                        );
                        self.accumulate_on_resume = true;
                        self.state = TimerState::Running;
                    },
                    _ => {
                        tracing::debug!(
                            gap_ms = transition.map(|g| g.num_milliseconds()),
                            "app backgrounded, pausing"
                        );
                        self.accumulate_on_resume = false;
                        self.state = TimerState::Paused;
                    },
                }
            },
            LifecyclePhase::Active => {
                if self.accumulate_on_resume {
                    if let Some(at) = self.background_entered_at {
                        let seconds = (now - at).num_seconds().max(0);
                        if seconds > 0 {
                            tracing::debug!(seconds, "adding time spent behind the lock screen");
                            self.elapsed_seconds += seconds;
                            self.accrued_points += seconds * self.settings.points_per_second;
                        }
                    }
                }
                self.accumulate_on_resume = false;
                self.background_entered_at = None;
                self.inactive_entered_at = None;
                self.state = TimerState::Running;
            },
        }
    }

    /// Stop counting for good and return the totals.
    pub fn end(&mut self) -> SessionSummary {
        self.ended = true;
        self.state = TimerState::Paused;
        self.summary()
    }

    /// Current totals.
    #[must_use]
    pub const fn summary(&self) -> SessionSummary {
        SessionSummary {
            elapsed_seconds: self.elapsed_seconds,
            accrued_points: self.accrued_points,
        }
    }

    /// Current read-only view.
    #[must_use]
    pub const fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            elapsed_seconds: self.elapsed_seconds,
            accrued_points: self.accrued_points,
            state: self.state,
            phase: self.phase,
        }
    }

    #[must_use]
    pub const fn elapsed_seconds(&self) -> i64 {
        self.elapsed_seconds
    }

    #[must_use]
    pub const fn accrued_points(&self) -> i64 {
        self.accrued_points
    }

    #[must_use]
    pub const fn state(&self) -> TimerState {
        self.state
    }

    #[must_use]
    pub const fn phase(&self) -> LifecyclePhase {
        self.phase
    }

    /// Check if ticks are currently counted.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.ended && self.state == TimerState::Running
    }

    /// Check if `end` has been called.
    #[must_use]
    pub const fn is_ended(&self) -> bool {
        self.ended
    }

    /// Whether returning to active will add the time spent in background.
    #[must_use]
    pub const fn accumulates_on_resume(&self) -> bool {
        self.accumulate_on_resume
    }

    #[must_use]
    pub const fn inactive_entered_at(&self) -> Option<DateTime<Utc>> {
        self.inactive_entered_at
    }

    #[must_use]
    pub const fn background_entered_at(&self) -> Option<DateTime<Utc>> {
        self.background_entered_at
    }
}

/// How deep into a session the user is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusStage {
    JustStarted,
    GettingFocused,
    DeepFocus,
    FlowState,
}

impl FocusStage {
    /// Stage for a session that has run `elapsed_seconds`.
    #[must_use]
    pub const fn for_elapsed(elapsed_seconds: i64) -> Self {
        if elapsed_seconds < 60 {
            Self::JustStarted
        } else if elapsed_seconds < 300 {
            Self::GettingFocused
        } else if elapsed_seconds < 900 {
            Self::DeepFocus
        } else {
            Self::FlowState
        }
    }

    /// Get display name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::JustStarted => "Just started",
            Self::GettingFocused => "Getting focused",
            Self::DeepFocus => "Deep focus",
            Self::FlowState => "Flow state",
        }
    }
}

impl std::fmt::Display for FocusStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// Progress towards a goal as a fraction (0.0 - 1.0).
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn goal_progress(elapsed_seconds: i64, goal: Duration) -> f64 {
    let goal_seconds = goal.num_seconds();
    if goal_seconds <= 0 {
        return 1.0;
    }
    (elapsed_seconds.max(0) as f64 / goal_seconds as f64).min(1.0)
}

/// Format seconds as MM:SS, or H:MM:SS from one hour on.
#[must_use]
pub fn format_clock(total_seconds: i64) -> String {
    let total_seconds = total_seconds.abs();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes:02}:{seconds:02}")
    }
}

/// Format points compactly, e.g. "950" or "1.2k".
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn format_points(points: i64) -> String {
    if points >= 1000 {
        format!("{:.1}k", points as f64 / 1000.0)
    } else {
        points.to_string()
    }
}

/// Format a duration as a human-readable string.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let total_minutes = d.num_minutes();

    if total_minutes < 1 {
        let seconds = d.num_seconds();
        return format!("{} second{}", seconds, if seconds == 1 { "" } else { "s" });
    }

    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;

    if hours > 0 {
        if minutes > 0 {
            format!(
                "{} hour{}, {} minute{}",
                hours,
                if hours == 1 { "" } else { "s" },
                minutes,
                if minutes == 1 { "" } else { "s" }
            )
        } else {
            format!("{} hour{}", hours, if hours == 1 { "" } else { "s" })
        }
    } else {
        format!("{} minute{}", minutes, if minutes == 1 { "" } else { "s" })
    }
}

/// Render a progress bar.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
pub fn render_progress_bar(progress: f64, width: usize) -> String {
    let filled = ((progress.clamp(0.0, 1.0)) * width as f64) as usize;
    let empty = width.saturating_sub(filled);

    format!("[{}{}]", "█".repeat(filled), "░".repeat(empty))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn ms(n: i64) -> Duration {
        Duration::milliseconds(n)
    }

    fn timer(platform: Platform) -> SessionTimer {
        SessionTimer::new(TimerSettings {
            platform,
            ..TimerSettings::default()
        })
    }

    /// Exactly one stamp while not active, none while active.
    fn assert_stamp_invariant(t: &SessionTimer) {
        let stamps = usize::from(t.inactive_entered_at().is_some())
            + usize::from(t.background_entered_at().is_some());
        if t.phase() == LifecyclePhase::Active {
            assert_eq!(stamps, 0);
        } else {
            assert_eq!(stamps, 1);
        }
    }

    #[test]
    fn test_timer_new() {
        let t = timer(Platform::Ios);
        assert_eq!(t.elapsed_seconds(), 0);
        assert_eq!(t.accrued_points(), 0);
        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.phase(), LifecyclePhase::Active);
    }

    #[test]
    fn test_tick_adds_one_second_and_fifty_points() {
        let mut t = timer(Platform::Other);

        for i in 1..=90 {
            assert!(t.tick());
            assert_eq!(t.elapsed_seconds(), i);
            assert_eq!(t.accrued_points(), i * 50);
        }
    }

    #[test]
    fn test_tick_ignored_while_paused() {
        let mut t = timer(Platform::Android);
        t.handle_phase(LifecyclePhase::Background, t0());

        assert!(!t.tick());
        assert_eq!(t.elapsed_seconds(), 0);
    }

    #[test]
    fn test_custom_points_per_second() {
        let mut t = SessionTimer::new(TimerSettings {
            points_per_second: 3,
            ..TimerSettings::default()
        });
        t.tick();
        t.tick();
        assert_eq!(t.accrued_points(), 6);
    }

    #[test]
    fn test_ios_screen_lock_keeps_running_and_catches_up() {
        let mut t = timer(Platform::Ios);
        for _ in 0..10 {
            t.tick();
        }

        t.handle_phase(LifecyclePhase::Inactive, t0());
        assert!(t.is_running());
        assert_stamp_invariant(&t);

        t.handle_phase(LifecyclePhase::Background, t0() + ms(40));
        assert!(t.is_running());
        assert!(t.accumulates_on_resume());
        assert_stamp_invariant(&t);

        // Ticks are not suppressed while nominally locked.
        t.tick();
        t.tick();

        t.handle_phase(LifecyclePhase::Active, t0() + ms(40) + Duration::seconds(30));

        assert!(t.is_running());
        assert_eq!(t.elapsed_seconds(), 10 + 2 + 30);
        assert_eq!(t.accrued_points(), (10 + 2 + 30) * 50);
        assert!(!t.accumulates_on_resume());
        assert_stamp_invariant(&t);
    }

    #[test]
    fn test_ios_threshold_is_inclusive() {
        let mut t = timer(Platform::Ios);
        t.handle_phase(LifecyclePhase::Inactive, t0());
        t.handle_phase(LifecyclePhase::Background, t0() + ms(100));

        assert!(t.accumulates_on_resume());
        assert!(t.is_running());
    }

    #[test]
    fn test_ios_catch_up_floors_partial_seconds() {
        let mut t = timer(Platform::Ios);
        t.handle_phase(LifecyclePhase::Inactive, t0());
        t.handle_phase(LifecyclePhase::Background, t0());
        t.handle_phase(LifecyclePhase::Active, t0() + ms(4_999));

        assert_eq!(t.elapsed_seconds(), 4);
    }

    #[test]
    fn test_ios_catch_up_ignores_clock_going_backwards() {
        let mut t = timer(Platform::Ios);
        t.handle_phase(LifecyclePhase::Inactive, t0());
        t.handle_phase(LifecyclePhase::Background, t0());
        t.handle_phase(LifecyclePhase::Active, t0() - Duration::seconds(5));

        assert_eq!(t.elapsed_seconds(), 0);
        assert_eq!(t.accrued_points(), 0);
        assert!(t.is_running());
    }

    #[test]
    fn test_ios_genuine_background_pauses_without_catch_up() {
        let mut t = timer(Platform::Ios);
        for _ in 0..5 {
            t.tick();
        }

        t.handle_phase(LifecyclePhase::Inactive, t0());
        t.handle_phase(LifecyclePhase::Background, t0() + ms(650));

        assert_eq!(t.state(), TimerState::Paused);
        assert!(!t.accumulates_on_resume());
        assert_stamp_invariant(&t);

        assert!(!t.tick());
        assert!(!t.tick());

        t.handle_phase(LifecyclePhase::Active, t0() + Duration::minutes(10));

        assert_eq!(t.state(), TimerState::Running);
        assert_eq!(t.elapsed_seconds(), 5);
        assert_eq!(t.accrued_points(), 250);
    }

    #[test]
    fn test_ios_background_without_inactive_is_genuine() {
        let mut t = timer(Platform::Ios);
        t.handle_phase(LifecyclePhase::Background, t0());

        assert_eq!(t.state(), TimerState::Paused);
        assert!(!t.accumulates_on_resume());

        t.handle_phase(LifecyclePhase::Active, t0() + Duration::seconds(20));
        assert_eq!(t.elapsed_seconds(), 0);
    }

    #[test]
    fn test_ios_inactive_on_the_way_back_keeps_catch_up() {
        let mut t = timer(Platform::Ios);
        t.handle_phase(LifecyclePhase::Inactive, t0());
        t.handle_phase(LifecyclePhase::Background, t0() + ms(10));

        t.handle_phase(LifecyclePhase::Inactive, t0() + Duration::seconds(12));
        assert_stamp_invariant(&t);
        assert!(t.accumulates_on_resume());

        t.handle_phase(LifecyclePhase::Active, t0() + ms(10) + Duration::seconds(12));
        assert_eq!(t.elapsed_seconds(), 12);
    }

    #[test]
    fn test_ios_inactive_resumes_paused_timer() {
        let mut t = timer(Platform::Ios);
        t.handle_phase(LifecyclePhase::Background, t0());
        assert_eq!(t.state(), TimerState::Paused);

        t.handle_phase(LifecyclePhase::Inactive, t0() + Duration::seconds(1));
        assert_eq!(t.state(), TimerState::Running);
    }

    #[test]
    fn test_ios_configurable_threshold() {
        let mut t = SessionTimer::new(TimerSettings {
            screen_lock_threshold: ms(500),
            platform: Platform::Ios,
            ..TimerSettings::default()
        });
        t.handle_phase(LifecyclePhase::Inactive, t0());
        t.handle_phase(LifecyclePhase::Background, t0() + ms(300));

        assert!(t.accumulates_on_resume());
    }

    #[test]
    fn test_non_ios_running_iff_last_phase_active() {
        use LifecyclePhase::{Active, Background, Inactive};

        let sequence = [
            Inactive, Active, Background, Background, Inactive, Active, Active, Inactive,
            Background, Active,
        ];

        for platform in [Platform::Android, Platform::Other] {
            let mut t = timer(platform);
            let mut now = t0();
            for phase in sequence {
                now += ms(5);
                t.handle_phase(phase, now);
                assert_eq!(t.is_running(), phase == Active);
                assert!(!t.accumulates_on_resume());
                assert_stamp_invariant(&t);
            }
        }
    }

    #[test]
    fn test_non_ios_quick_lock_does_not_catch_up() {
        let mut t = timer(Platform::Android);
        t.handle_phase(LifecyclePhase::Inactive, t0());
        t.handle_phase(LifecyclePhase::Background, t0() + ms(10));
        t.handle_phase(LifecyclePhase::Active, t0() + Duration::seconds(60));

        assert_eq!(t.elapsed_seconds(), 0);
    }

    #[test]
    fn test_end_stops_counting() {
        let mut t = timer(Platform::Ios);
        for _ in 0..125 {
            t.tick();
        }

        let summary = t.end();

        assert_eq!(
            summary,
            SessionSummary {
                elapsed_seconds: 125,
                accrued_points: 6250
            }
        );
        assert_eq!(t.state(), TimerState::Paused);
        assert!(t.is_ended());

        assert!(!t.tick());
        t.handle_phase(LifecyclePhase::Active, t0());
        assert!(!t.is_running());
        assert_eq!(t.elapsed_seconds(), 125);
    }

    #[test]
    fn test_focus_stage() {
        assert_eq!(FocusStage::for_elapsed(0), FocusStage::JustStarted);
        assert_eq!(FocusStage::for_elapsed(59), FocusStage::JustStarted);
        assert_eq!(FocusStage::for_elapsed(60), FocusStage::GettingFocused);
        assert_eq!(FocusStage::for_elapsed(299), FocusStage::GettingFocused);
        assert_eq!(FocusStage::for_elapsed(300), FocusStage::DeepFocus);
        assert_eq!(FocusStage::for_elapsed(900), FocusStage::FlowState);
        assert_eq!(FocusStage::FlowState.to_string(), "Flow state");
    }

    #[test]
    fn test_goal_progress() {
        let hour = Duration::hours(1);
        assert_eq!(goal_progress(0, hour), 0.0);
        assert!((goal_progress(1800, hour) - 0.5).abs() < f64::EPSILON);
        assert_eq!(goal_progress(7200, hour), 1.0);
        assert_eq!(goal_progress(10, Duration::zero()), 1.0);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(90), "01:30");
        assert_eq!(format_clock(3599), "59:59");
        assert_eq!(format_clock(3661), "1:01:01");
    }

    #[test]
    fn test_format_points() {
        assert_eq!(format_points(950), "950");
        assert_eq!(format_points(1000), "1.0k");
        assert_eq!(format_points(1500), "1.5k");
        assert_eq!(format_points(6200), "6.2k");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::seconds(1)), "1 second");
        assert_eq!(format_duration(Duration::minutes(25)), "25 minutes");
        assert_eq!(format_duration(Duration::minutes(1)), "1 minute");
        assert_eq!(format_duration(Duration::hours(2)), "2 hours");
        assert_eq!(format_duration(Duration::minutes(90)), "1 hour, 30 minutes");
    }

    #[test]
    fn test_render_progress_bar() {
        let bar = render_progress_bar(0.5, 10);
        assert!(bar.contains("█████"));
        assert!(bar.contains("░░░░░"));
        assert_eq!(render_progress_bar(2.0, 4), "[████]");
    }
}
