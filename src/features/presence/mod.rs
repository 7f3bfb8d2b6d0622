//! Friend presence: who is focusing right now.

mod snapshot;
mod tracker;

pub use snapshot::{FriendLeft, PresenceDiff, PresenceEvent, PresenceSnapshot};
pub use tracker::{PresenceTracker, Subscription};
