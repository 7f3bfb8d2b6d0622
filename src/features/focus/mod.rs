//! Focus sessions.
//!
//! - `timer`: elapsed time and points, including the screen-lock heuristic
//! - `lifecycle`: host lifecycle phases and the source they arrive from
//! - `session`: the running session task and its handle
//! - `report`: end-of-session reporting

pub mod lifecycle;
pub mod report;
pub mod session;
pub mod timer;

pub use lifecycle::{LifecyclePhase, LifecycleSource, NoLifecycle, Platform};
pub use report::{report_session_end, statistics_date};
pub use session::{FocusSession, SessionOptions};
pub use timer::{
    format_clock, format_duration, format_points, goal_progress, render_progress_bar, FocusStage,
    SessionSummary, SessionTimer, TimerSettings, TimerSnapshot, TimerState,
};
