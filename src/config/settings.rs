//! Configuration settings for vimaya.
//!
//! Settings are loaded from `~/.vimaya/config.yaml`.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::config::Paths;
use crate::error::VimayaError;
use crate::features::focus::{Platform, TimerSettings};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Remote API settings.
    pub api: ApiConfig,
    /// Focus session settings.
    pub focus: FocusConfig,
    /// Friend presence settings.
    pub presence: PresenceConfig,
}

/// Remote API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API root URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Bearer token for the signed-in user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Focus session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
    /// Experience points earned per counted second.
    #[serde(default = "default_points_per_second")]
    pub points_per_second: u32,
    /// Longest inactive-to-background transition still treated as a screen
    /// lock, in milliseconds.
    #[serde(default = "default_screen_lock_threshold_ms")]
    pub screen_lock_threshold_ms: u64,
    /// Tick period in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Host platform, which selects the lifecycle algorithm.
    #[serde(default = "Platform::current")]
    pub platform: Platform,
    /// Daily goal used for progress display, in minutes.
    #[serde(default = "default_daily_goal_minutes")]
    pub daily_goal_minutes: u32,
}

/// Friend presence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceConfig {
    /// How often the active-session listing is polled, in milliseconds.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

// Default value functions for serde
fn default_base_url() -> String {
    "https://api.vimaya.app".to_string()
}

const fn default_timeout_secs() -> u64 {
    15
}

const fn default_points_per_second() -> u32 {
    50
}

const fn default_screen_lock_threshold_ms() -> u64 {
    100
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_daily_goal_minutes() -> u32 {
    60
}

const fn default_poll_interval_ms() -> u64 {
    5000
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            token: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            points_per_second: default_points_per_second(),
            screen_lock_threshold_ms: default_screen_lock_threshold_ms(),
            tick_interval_ms: default_tick_interval_ms(),
            platform: Platform::current(),
            daily_goal_minutes: default_daily_goal_minutes(),
        }
    }
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl FocusConfig {
    /// Timer settings derived from this section.
    #[must_use]
    pub fn timer_settings(&self) -> TimerSettings {
        TimerSettings {
            points_per_second: i64::from(self.points_per_second),
            screen_lock_threshold: chrono::Duration::milliseconds(
                i64::try_from(self.screen_lock_threshold_ms).unwrap_or(i64::MAX),
            ),
            platform: self.platform,
        }
    }

    /// Tick period as a `Duration`.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl PresenceConfig {
    /// Poll period as a `Duration`.
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, VimayaError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &std::path::Path) -> Result<Self, VimayaError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            VimayaError::Config(format!(
                "Failed to read config file {}: {e}",
                path.display()
            ))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            VimayaError::Config(format!(
                "Failed to parse config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Save configuration to the default path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save(&self) -> Result<(), VimayaError> {
        let paths = Paths::new()?;
        paths.ensure_dirs()?;
        self.save_to_path(&paths.config_file)
    }

    /// Save configuration to a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be written.
    pub fn save_to_path(&self, path: &std::path::Path) -> Result<(), VimayaError> {
        let contents = serde_yaml::to_string(self)
            .map_err(|e| VimayaError::Config(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, contents).map_err(|e| {
            VimayaError::Config(format!(
                "Failed to write config file {}: {e}",
                path.display()
            ))
        })
    }

    /// Apply command-line overrides on top of the file settings.
    pub fn apply_overrides(&mut self, api_url: Option<String>, token: Option<String>) {
        if let Some(url) = api_url {
            self.api.base_url = url;
        }
        if token.is_some() {
            self.api.token = token;
        }
    }
}
