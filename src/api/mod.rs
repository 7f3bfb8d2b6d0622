//! Remote API collaborators.
//!
//! The focus and presence components only see the traits defined here;
//! `HttpClient` is the production implementation.

mod client;
mod types;

use async_trait::async_trait;

use crate::error::VimayaError;

pub use client::HttpClient;
pub use types::{parse_timestamp, ActiveFriendSession, DailyStatisticsUpdate, FocusSessionRecord};

/// Session bookkeeping calls made by a focus session.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Record a session start. Returns the server-side session ID.
    async fn start_session(&self) -> Result<i64, VimayaError>;

    /// Record the end of the current session.
    async fn end_session(&self, duration_seconds: i64) -> Result<(), VimayaError>;

    /// Add experience points to the current user.
    async fn add_xp(&self, amount: i64) -> Result<(), VimayaError>;

    /// Add focus time to a day's statistics.
    async fn update_daily_statistics(
        &self,
        update: DailyStatisticsUpdate,
    ) -> Result<(), VimayaError>;
}

/// Listing of friends who are currently focusing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PresenceSource: Send + Sync {
    /// Fetch every friend with an active session.
    async fn list_active_friend_sessions(&self) -> Result<Vec<ActiveFriendSession>, VimayaError>;
}
