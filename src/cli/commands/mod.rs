//! Command implementations for vimaya.

mod config;
mod focus;
mod friends;

pub use config::config;
pub use focus::focus;
pub use friends::friends;

use crate::config::Config;
use crate::error::VimayaError;

/// Load the config file and apply command-line overrides.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be parsed.
pub fn load_config(api_url: Option<String>, token: Option<String>) -> Result<Config, VimayaError> {
    let mut config = Config::load()?;
    config.apply_overrides(api_url, token);
    Ok(config)
}
