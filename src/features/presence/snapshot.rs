//! The set of friends currently focusing, and how it changes between polls.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ActiveFriendSession;

/// A friend whose session ended between two polls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendLeft {
    pub user_id: String,
    pub username: String,
    /// Seconds from the session's start to when the end was noticed
    pub duration_seconds: i64,
}

impl FriendLeft {
    fn from_session(session: &ActiveFriendSession, now: DateTime<Utc>) -> Self {
        Self {
            user_id: session.user_id.clone(),
            username: session.username.clone(),
            duration_seconds: (now - session.start_time).num_seconds().max(0),
        }
    }
}

/// A single join or leave, for consumers that want one stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum PresenceEvent {
    Joined(ActiveFriendSession),
    Left(FriendLeft),
}

/// Membership changes produced by one poll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceDiff {
    /// Newly present, in fetch order
    pub joined: Vec<ActiveFriendSession>,
    /// No longer present, in previous snapshot order
    pub left: Vec<FriendLeft>,
}

impl PresenceDiff {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.joined.is_empty() && self.left.is_empty()
    }

    /// Joins first, then leaves.
    #[must_use]
    pub fn into_events(self) -> Vec<PresenceEvent> {
        self.joined
            .into_iter()
            .map(PresenceEvent::Joined)
            .chain(self.left.into_iter().map(PresenceEvent::Left))
            .collect()
    }
}

/// Friends in an active session, keyed by user ID.
///
/// Iteration order is the order of the latest fetch, deduplicated.
#[derive(Debug, Clone, Default)]
pub struct PresenceSnapshot {
    sessions: Vec<ActiveFriendSession>,
}

impl PresenceSnapshot {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            sessions: Vec::new(),
        }
    }

    /// Build a snapshot from a fetch result.
    #[must_use]
    pub fn from_sessions(fetched: Vec<ActiveFriendSession>) -> Self {
        Self {
            sessions: dedupe(fetched),
        }
    }

    /// Replace the contents wholesale, without computing changes.
    pub fn replace(&mut self, fetched: Vec<ActiveFriendSession>) {
        self.sessions = dedupe(fetched);
    }

    /// Replace the contents with a fresh fetch result and report who joined
    /// and who left. `now` is used for the leave durations.
    pub fn apply(&mut self, fetched: Vec<ActiveFriendSession>, now: DateTime<Utc>) -> PresenceDiff {
        let current = dedupe(fetched);

        let previous_ids: HashSet<&str> = self.sessions.iter().map(|s| s.user_id.as_str()).collect();
        let current_ids: HashSet<&str> = current.iter().map(|s| s.user_id.as_str()).collect();

        let joined = current
            .iter()
            .filter(|s| !previous_ids.contains(s.user_id.as_str()))
            .cloned()
            .collect();

        let left = self
            .sessions
            .iter()
            .filter(|s| !current_ids.contains(s.user_id.as_str()))
            .map(|s| FriendLeft::from_session(s, now))
            .collect();

        self.sessions = current;
        PresenceDiff { joined, left }
    }

    pub fn clear(&mut self) {
        self.sessions.clear();
    }

    #[must_use]
    pub fn contains(&self, user_id: &str) -> bool {
        self.sessions.iter().any(|s| s.user_id == user_id)
    }

    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<&ActiveFriendSession> {
        self.sessions.iter().find(|s| s.user_id == user_id)
    }

    #[must_use]
    pub fn sessions(&self) -> &[ActiveFriendSession] {
        &self.sessions
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

/// One entry per user ID: first position, last record.
fn dedupe(fetched: Vec<ActiveFriendSession>) -> Vec<ActiveFriendSession> {
    let mut index: HashMap<String, usize> = HashMap::with_capacity(fetched.len());
    let mut out: Vec<ActiveFriendSession> = Vec::with_capacity(fetched.len());

    for session in fetched {
        if let Some(&i) = index.get(&session.user_id) {
            out[i] = session;
        } else {
            index.insert(session.user_id.clone(), out.len());
            out.push(session);
        }
    }

    out
}
