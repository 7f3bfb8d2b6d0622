//! JSON output formatting for vimaya.

use serde::Serialize;
use serde_json::json;

use crate::api::ActiveFriendSession;
use crate::error::VimayaError;
use crate::features::focus::{FocusStage, SessionSummary};
use crate::features::presence::PresenceEvent;

/// Format friends in an active session as JSON
///
/// # Errors
///
/// Returns `VimayaError::Parse` if JSON serialization fails.
pub fn format_friends_json(sessions: &[ActiveFriendSession]) -> Result<String, VimayaError> {
    let output = json!({
        "count": sessions.len(),
        "items": sessions
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format one join or leave as a single JSON line, for streaming.
///
/// # Errors
///
/// Returns `VimayaError::Parse` if JSON serialization fails.
pub fn format_event_json(event: &PresenceEvent) -> Result<String, VimayaError> {
    Ok(serde_json::to_string(event)?)
}

/// Format the totals of a finished session as JSON
///
/// # Errors
///
/// Returns `VimayaError::Parse` if JSON serialization fails.
pub fn format_summary_json(summary: &SessionSummary, saved: bool) -> Result<String, VimayaError> {
    let output = json!({
        "elapsedSeconds": summary.elapsed_seconds,
        "accruedPoints": summary.accrued_points,
        "stage": FocusStage::for_elapsed(summary.elapsed_seconds),
        "saved": saved
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Generic JSON formatter for any serializable type
///
/// # Errors
///
/// Returns `VimayaError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, VimayaError> {
    Ok(serde_json::to_string_pretty(value)?)
}
