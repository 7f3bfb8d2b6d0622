//! Output formatting for vimaya.
//!
//! This module provides formatters for friend presence and focus sessions in
//! various formats.

mod json;
mod pretty;

use chrono::{DateTime, Duration, Utc};

use crate::api::ActiveFriendSession;
use crate::cli::args::OutputFormat;
use crate::error::VimayaError;
use crate::features::focus::SessionSummary;
use crate::features::presence::PresenceEvent;

pub use json::*;
pub use pretty::*;

/// Format active friend sessions based on output format
///
/// # Errors
///
/// Returns `VimayaError::Parse` if JSON serialization fails.
pub fn format_friends(
    sessions: &[ActiveFriendSession],
    now: DateTime<Utc>,
    format: OutputFormat,
) -> Result<String, VimayaError> {
    match format {
        OutputFormat::Pretty => Ok(format_friends_pretty(sessions, now)),
        OutputFormat::Json => format_friends_json(sessions),
    }
}

/// Format a presence event based on output format
///
/// # Errors
///
/// Returns `VimayaError::Parse` if JSON serialization fails.
pub fn format_event(event: &PresenceEvent, format: OutputFormat) -> Result<String, VimayaError> {
    match format {
        OutputFormat::Pretty => Ok(format_event_pretty(event)),
        OutputFormat::Json => format_event_json(event),
    }
}

/// Format a session summary based on output format
///
/// # Errors
///
/// Returns `VimayaError::Parse` if JSON serialization fails.
pub fn format_summary(
    summary: &SessionSummary,
    goal: Duration,
    saved: bool,
    format: OutputFormat,
) -> Result<String, VimayaError> {
    match format {
        OutputFormat::Pretty => Ok(format_summary_pretty(summary, goal, saved)),
        OutputFormat::Json => format_summary_json(summary, saved),
    }
}
