//! Configuration management for vimaya.
//!
//! This module handles loading and saving configuration from `~/.vimaya/`.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{ApiConfig, Config, FocusConfig, PresenceConfig};
