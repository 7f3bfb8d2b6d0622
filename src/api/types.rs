//! Records exchanged with the Vimaya API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A friend who is currently in a focus session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveFriendSession {
    /// Friend's user ID
    pub user_id: String,
    /// Friend's display name
    pub username: String,
    /// When the friend's session started
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub start_time: DateTime<Utc>,
    /// Duration as computed by the server at fetch time
    #[serde(default)]
    pub current_duration_seconds: i64,
    /// Friend's level
    #[serde(default)]
    pub level: i64,
}

/// Server record returned when a session starts or ends.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusSessionRecord {
    pub id: i64,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub current_duration_seconds: i64,
}

/// Focus time to add to a day's statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStatisticsUpdate {
    /// Day the focus time belongs to
    pub date: NaiveDate,
    /// Seconds focused in this session
    pub total_focus_time_seconds: i64,
}

/// Wire body for `POST /api/DailyStatistics/update`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct DailyStatisticsBody<'a> {
    pub id: i64,
    pub user_id: &'a str,
    pub date: String,
    pub total_focus_time: i64,
}

impl From<&DailyStatisticsUpdate> for DailyStatisticsBody<'static> {
    fn from(update: &DailyStatisticsUpdate) -> Self {
        // id and userId are assigned by the server from the bearer token.
        Self {
            id: 0,
            user_id: "",
            date: update.date.format("%Y-%m-%d").to_string(),
            total_focus_time: update.total_focus_time_seconds,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EndSessionBody {
    pub duration_seconds: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AddXpBody {
    pub xp_to_add: i64,
}

/// Parse a timestamp with or without an offset.
///
/// Offset-less timestamps are taken to be UTC. Returns `None` for anything
/// that is neither RFC 3339 nor `%Y-%m-%dT%H:%M:%S%.f`.
#[must_use]
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_timestamp_rfc3339() {
        let ts = parse_timestamp("2024-05-01T10:00:00+02:00").unwrap();
        assert_eq!(ts, Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_timestamp_without_offset() {
        let ts = parse_timestamp("2024-05-01T10:00:00.1234567").unwrap();
        assert_eq!(
            ts.date_naive(),
            NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()
        );
        assert_eq!(ts.timestamp(), Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap().timestamp());
    }

    #[test]
    fn test_parse_timestamp_invalid() {
        assert!(parse_timestamp("yesterday").is_none());
    }

    #[test]
    fn test_deserialize_active_friend_session() {
        let json = r#"[{
            "userId": "u-1",
            "username": "ada",
            "startTime": "2024-05-01T10:00:00Z",
            "currentDurationSeconds": 42,
            "level": 7
        }]"#;

        let sessions: Vec<ActiveFriendSession> = serde_json::from_str(json).unwrap();

        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].user_id, "u-1");
        assert_eq!(sessions[0].username, "ada");
        assert_eq!(sessions[0].current_duration_seconds, 42);
        assert_eq!(sessions[0].level, 7);
    }

    #[test]
    fn test_deserialize_active_friend_session_missing_optional_fields() {
        let json = r#"{"userId": "u-2", "username": "bo", "startTime": "2024-05-01T10:00:00"}"#;

        let session: ActiveFriendSession = serde_json::from_str(json).unwrap();

        assert_eq!(session.current_duration_seconds, 0);
        assert_eq!(session.level, 0);
    }

    #[test]
    fn test_daily_statistics_body() {
        let update = DailyStatisticsUpdate {
            date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            total_focus_time_seconds: 125,
        };

        let body = serde_json::to_value(DailyStatisticsBody::from(&update)).unwrap();

        assert_eq!(body["id"], 0);
        assert_eq!(body["userId"], "");
        assert_eq!(body["date"], "2024-05-01");
        assert_eq!(body["totalFocusTime"], 125);
    }
}
