//! Host application lifecycle.
//!
//! The host pushes phase changes; the focus session consumes them through a
//! `LifecycleSource` so synthetic sequences can be fed in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Lifecycle phase reported by the host process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecyclePhase {
    /// In the foreground and receiving input
    Active,
    /// Transitioning, or covered by a system overlay
    Inactive,
    /// Not visible
    Background,
}

impl LifecyclePhase {
    /// Parse a phase name (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" | "a" => Some(Self::Active),
            "inactive" | "i" => Some(Self::Inactive),
            "background" | "bg" | "b" => Some(Self::Background),
            _ => None,
        }
    }
}

impl std::fmt::Display for LifecyclePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
            Self::Background => write!(f, "background"),
        }
    }
}

/// Host platform.
///
/// iOS reports a transient inactive phase even for a screen lock, so it gets
/// its own lifecycle algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
    Other,
}

impl Platform {
    /// The platform this binary was built for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "ios") {
            Self::Ios
        } else if cfg!(target_os = "android") {
            Self::Android
        } else {
            Self::Other
        }
    }

    /// Whether the screen-lock heuristic applies.
    #[must_use]
    pub const fn is_ios(self) -> bool {
        matches!(self, Self::Ios)
    }
}

/// Stream of lifecycle phase changes, in the order the host reports them.
#[async_trait]
pub trait LifecycleSource: Send {
    /// Wait for the next phase. `None` means the host will send no more.
    ///
    /// Must be cancel safe: it is polled inside `select!`.
    async fn next_phase(&mut self) -> Option<LifecyclePhase>;
}

#[async_trait]
impl LifecycleSource for mpsc::UnboundedReceiver<LifecyclePhase> {
    async fn next_phase(&mut self) -> Option<LifecyclePhase> {
        self.recv().await
    }
}

#[async_trait]
impl LifecycleSource for mpsc::Receiver<LifecyclePhase> {
    async fn next_phase(&mut self) -> Option<LifecyclePhase> {
        self.recv().await
    }
}

/// A source that never reports a change, for hosts without lifecycle events.
#[derive(Debug, Default)]
pub struct NoLifecycle;

#[async_trait]
impl LifecycleSource for NoLifecycle {
    async fn next_phase(&mut self) -> Option<LifecyclePhase> {
        None
    }
}
