//! End-of-session reporting.
//!
//! The three reports are independent: each one is attempted even if an
//! earlier one failed, and any failure is surfaced as a single error.

use chrono::{DateTime, Local, NaiveDate, Utc};

use super::timer::SessionSummary;
use crate::api::{DailyStatisticsUpdate, SessionApi};
use crate::error::VimayaError;

/// The calendar day a session ending at `now` is credited to, in local time.
#[must_use]
pub fn statistics_date(now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&Local).date_naive()
}

/// Report a finished session: end it, add its points, and add its time to
/// the day's statistics.
///
/// Points are only reported when positive.
///
/// # Errors
///
/// Returns `VimayaError::SaveFailed` carrying the summary if any report
/// failed. Reports that succeeded are not rolled back.
pub async fn report_session_end(
    api: &dyn SessionApi,
    summary: SessionSummary,
    date: NaiveDate,
) -> Result<(), VimayaError> {
    let mut failures = 0_usize;

    if let Err(e) = api.end_session(summary.elapsed_seconds).await {
        tracing::warn!("Failed to end focus session: {e}");
        failures += 1;
    }

    if summary.accrued_points > 0 {
        if let Err(e) = api.add_xp(summary.accrued_points).await {
            tracing::warn!("Failed to add {} XP: {e}", summary.accrued_points);
            failures += 1;
        }
    }

    let update = DailyStatisticsUpdate {
        date,
        total_focus_time_seconds: summary.elapsed_seconds,
    };
    if let Err(e) = api.update_daily_statistics(update).await {
        tracing::warn!("Failed to update daily statistics for {date}: {e}");
        failures += 1;
    }

    if failures > 0 {
        tracing::error!(failures, "session end was only partially saved");
        return Err(VimayaError::SaveFailed { summary });
    }

    tracing::info!(
        seconds = summary.elapsed_seconds,
        points = summary.accrued_points,
        "focus session saved"
    );
    Ok(())
}
