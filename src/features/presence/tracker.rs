//! Live view of which friends are focusing.
//!
//! The remote listing is polled on an interval and each result is diffed
//! against the previous one to produce join and leave events. Trackers are
//! independent instances; share one by passing an `Arc<PresenceTracker>`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::snapshot::{FriendLeft, PresenceDiff, PresenceSnapshot};
use crate::api::{ActiveFriendSession, PresenceSource};
use crate::core::Clock;
use crate::error::VimayaError;

type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// Callbacks in registration order.
struct Subscribers<T> {
    next_id: u64,
    entries: Vec<(u64, Callback<T>)>,
}

impl<T> Subscribers<T> {
    const fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    fn add(&mut self, callback: Callback<T>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    fn callbacks(&self) -> Vec<Callback<T>> {
        self.entries.iter().map(|(_, cb)| Arc::clone(cb)).collect()
    }
}

struct PollHandle {
    generation: u64,
    task: JoinHandle<()>,
}

struct State {
    snapshot: PresenceSnapshot,
    poll: Option<PollHandle>,
    generation: u64,
    joined: Subscribers<ActiveFriendSession>,
    left: Subscribers<FriendLeft>,
}

impl State {
    fn is_current(&self, generation: u64) -> bool {
        self.poll
            .as_ref()
            .is_some_and(|poll| poll.generation == generation)
    }
}

struct Inner {
    source: Arc<dyn PresenceSource>,
    clock: Arc<dyn Clock>,
    state: Mutex<State>,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch, diff, and notify. Results for a stopped poller are dropped.
    async fn poll_cycle(&self, generation: u64) -> PresenceDiff {
        let fetched = match self.source.list_active_friend_sessions().await {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!("Error polling focus sessions, skipping cycle: {e}");
                return PresenceDiff::default();
            },
        };

        let (diff, on_joined, on_left) = {
            let mut state = self.lock();
            if !state.is_current(generation) {
                tracing::debug!(generation, "discarding poll result from a stopped poller");
                return PresenceDiff::default();
            }
            let diff = state.snapshot.apply(fetched, self.clock.now());
            (diff, state.joined.callbacks(), state.left.callbacks())
        };

        if !diff.is_empty() {
            tracing::debug!(
                joined = diff.joined.len(),
                left = diff.left.len(),
                "friend presence changed"
            );
        }

        // Callbacks run without the lock so they may subscribe, unsubscribe,
        // or stop polling. Nothing is delivered once polling has stopped.
        for session in &diff.joined {
            for callback in &on_joined {
                if !self.is_current(generation) {
                    return diff;
                }
                callback(session);
            }
        }
        for departed in &diff.left {
            for callback in &on_left {
                if !self.is_current(generation) {
                    return diff;
                }
                callback(departed);
            }
        }

        diff
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().is_current(generation)
    }
}

async fn poll_loop(inner: Arc<Inner>, generation: u64, interval: Duration) {
    let mut ticker = time::interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        inner.poll_cycle(generation).await;
    }
}

#[derive(Debug, Clone, Copy)]
enum SubscriptionKind {
    Joined,
    Left,
}

/// A registered callback. Call `unsubscribe` to remove it.
#[must_use = "keep the Subscription to be able to unsubscribe"]
pub struct Subscription {
    inner: Weak<Inner>,
    kind: SubscriptionKind,
    id: u64,
}

impl Subscription {
    /// Remove exactly this callback; the order of the others is unchanged.
    pub fn unsubscribe(self) {
        let Some(inner) = self.inner.upgrade() else {
            return;
        };
        let mut state = inner.lock();
        let removed = match self.kind {
            SubscriptionKind::Joined => state.joined.remove(self.id),
            SubscriptionKind::Left => state.left.remove(self.id),
        };
        tracing::trace!(kind = ?self.kind, id = self.id, removed, "unsubscribed");
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

/// Tracks friends in an active focus session.
///
/// Dropping the tracker stops polling.
pub struct PresenceTracker {
    inner: Arc<Inner>,
}

impl PresenceTracker {
    #[must_use]
    pub fn new(source: Arc<dyn PresenceSource>, clock: Arc<dyn Clock>) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                clock,
                state: Mutex::new(State {
                    snapshot: PresenceSnapshot::new(),
                    poll: None,
                    generation: 0,
                    joined: Subscribers::new(),
                    left: Subscribers::new(),
                }),
            }),
        }
    }

    /// Fetch the current list once and adopt it as the snapshot.
    ///
    /// No events are emitted.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; the snapshot is left untouched.
    pub async fn initialize(&self) -> Result<Vec<ActiveFriendSession>, VimayaError> {
        let sessions = self.inner.source.list_active_friend_sessions().await?;
        self.inner.lock().snapshot.replace(sessions.clone());
        tracing::debug!(count = sessions.len(), "friend presence initialized");
        Ok(sessions)
    }

    /// Poll every `interval`, first poll one interval from now.
    ///
    /// Does nothing if polling is already active. Must be called from within
    /// a tokio runtime.
    pub fn start_polling(&self, interval: Duration) {
        let mut state = self.inner.lock();
        if state.poll.is_some() {
            tracing::debug!("presence polling already active");
            return;
        }

        // tokio intervals must be non-zero.
        let interval = interval.max(Duration::from_millis(1));

        state.generation += 1;
        let generation = state.generation;
        let task = tokio::spawn(poll_loop(Arc::clone(&self.inner), generation, interval));
        state.poll = Some(PollHandle { generation, task });

        tracing::info!(
            interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
            "presence polling started"
        );
    }

    /// Stop polling and forget the snapshot.
    ///
    /// A poll already in flight is discarded.
    pub fn stop_polling(&self) {
        let mut state = self.inner.lock();
        if let Some(poll) = state.poll.take() {
            poll.task.abort();
            tracing::info!("presence polling stopped");
        }
        state.generation += 1;
        state.snapshot.clear();
    }

    /// Run one poll cycle now.
    ///
    /// Returns the changes that were emitted. When polling is not active
    /// nothing is fetched and nothing is emitted.
    pub async fn poll_now(&self) -> PresenceDiff {
        let generation = {
            let state = self.inner.lock();
            match &state.poll {
                Some(poll) => poll.generation,
                None => return PresenceDiff::default(),
            }
        };
        self.inner.poll_cycle(generation).await
    }

    /// Call `callback` for every friend that starts a session.
    pub fn on_friend_joined<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&ActiveFriendSession) + Send + Sync + 'static,
    {
        let id = self.inner.lock().joined.add(Arc::new(callback));
        Subscription {
            inner: Arc::downgrade(&self.inner),
            kind: SubscriptionKind::Joined,
            id,
        }
    }

    /// Call `callback` for every friend whose session ends.
    pub fn on_friend_left<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&FriendLeft) + Send + Sync + 'static,
    {
        let id = self.inner.lock().left.add(Arc::new(callback));
        Subscription {
            inner: Arc::downgrade(&self.inner),
            kind: SubscriptionKind::Left,
            id,
        }
    }

    /// Check if a poll loop is active.
    #[must_use]
    pub fn is_polling(&self) -> bool {
        self.inner.lock().poll.is_some()
    }

    /// Friends in the current snapshot.
    #[must_use]
    pub fn active_friends(&self) -> Vec<ActiveFriendSession> {
        self.inner.lock().snapshot.sessions().to_vec()
    }
}

impl Drop for PresenceTracker {
    fn drop(&mut self) {
        if let Some(poll) = self.inner.lock().poll.take() {
            poll.task.abort();
        }
    }
}

impl std::fmt::Debug for PresenceTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.lock();
        f.debug_struct("PresenceTracker")
            .field("polling", &state.poll.is_some())
            .field("friends", &state.snapshot.len())
            .finish_non_exhaustive()
    }
}
