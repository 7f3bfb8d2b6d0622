use chrono::{DateTime, Duration, Utc};
use colored::Colorize;

use crate::api::ActiveFriendSession;
use crate::features::focus::{
    format_clock, format_duration, format_points, goal_progress, render_progress_bar, FocusStage,
    SessionSummary, TimerSnapshot, TimerState,
};
use crate::features::presence::PresenceEvent;

/// Format friends in an active session as a table
pub fn format_friends_pretty(sessions: &[ActiveFriendSession], now: DateTime<Utc>) -> String {
    if sessions.is_empty() {
        return "Friends focusing (0)\n  Nobody is focusing right now".to_string();
    }

    let mut output = format!("Friends focusing ({})\n", sessions.len());
    output.push_str(&"─".repeat(40));
    output.push('\n');

    for session in sessions {
        let focused = (now - session.start_time).num_seconds().max(0);
        output.push_str(&format!(
            "{} {}  {}  {}\n",
            "●".green(),
            session.username.bold(),
            format!("Lv {}", session.level).cyan(),
            format_clock(focused).dimmed()
        ));
    }

    output
}

/// Format one join or leave as a single line
pub fn format_event_pretty(event: &PresenceEvent) -> String {
    match event {
        PresenceEvent::Joined(session) => format!(
            "{} {} started focusing {}",
            "+".green().bold(),
            session.username.bold(),
            format!("(Lv {})", session.level).dimmed()
        ),
        PresenceEvent::Left(left) => format!(
            "{} {} finished after {}",
            "-".yellow().bold(),
            left.username.bold(),
            format_duration(Duration::seconds(left.duration_seconds))
        ),
    }
}

/// One-line live view of a running session.
pub fn format_status_line(snapshot: &TimerSnapshot, goal: Duration) -> String {
    let icon = match snapshot.state {
        TimerState::Running => "▶️",
        TimerState::Paused => "⏸️",
    };
    let progress = goal_progress(snapshot.elapsed_seconds, goal);

    format!(
        "{} {}  {} XP  {}  {} {:.0}%",
        icon,
        format_clock(snapshot.elapsed_seconds).bold(),
        format_points(snapshot.accrued_points).cyan(),
        FocusStage::for_elapsed(snapshot.elapsed_seconds),
        render_progress_bar(progress, 20),
        progress * 100.0
    )
}

/// Format the totals of a finished session
pub fn format_summary_pretty(summary: &SessionSummary, goal: Duration, saved: bool) -> String {
    let mut output = Vec::new();

    if saved {
        output.push("✅ Focus session saved!".green().to_string());
    } else {
        output.push("⚠️  Focus session ended but was not fully saved".yellow().to_string());
    }

    output.push(format!(
        "   Duration: {}",
        format_duration(Duration::seconds(summary.elapsed_seconds))
    ));
    output.push(format!("   XP earned: {}", summary.accrued_points));
    output.push(format!(
        "   Stage:    {}",
        FocusStage::for_elapsed(summary.elapsed_seconds)
    ));

    let progress = goal_progress(summary.elapsed_seconds, goal);
    output.push(format!(
        "   Goal:     {} {:.0}% of {}",
        render_progress_bar(progress, 20),
        progress * 100.0,
        format_duration(goal)
    ));

    output.join("\n")
}
