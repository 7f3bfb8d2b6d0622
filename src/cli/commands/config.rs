//! Config command implementation.

use colored::Colorize;
use serde_json::json;

use crate::cli::args::{ConfigCommands, OutputFormat};
use crate::cli::commands::load_config;
use crate::config::{Config, Paths};
use crate::error::VimayaError;
use crate::output::to_json;

const REDACTED: &str = "********";

/// Execute config subcommands.
///
/// # Errors
///
/// Returns an error if the config file cannot be read, parsed, or written.
pub fn config(
    cmd: ConfigCommands,
    api_url: Option<String>,
    token: Option<String>,
    format: OutputFormat,
) -> Result<String, VimayaError> {
    match cmd {
        ConfigCommands::Show => show(&load_config(api_url, token)?, format),
        ConfigCommands::Path => path(&Paths::new()?, format),
        ConfigCommands::Init { force } => init(&Paths::new()?, force, format),
    }
}

fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if config.api.token.is_some() {
        config.api.token = Some(REDACTED.to_string());
    }
    config
}

fn show(config: &Config, format: OutputFormat) -> Result<String, VimayaError> {
    let config = redacted(config);
    match format {
        OutputFormat::Json => to_json(&config),
        OutputFormat::Pretty => serde_yaml::to_string(&config)
            .map(|yaml| yaml.trim_end().to_string())
            .map_err(|e| VimayaError::Config(format!("Failed to serialize config: {e}"))),
    }
}

fn path(paths: &Paths, format: OutputFormat) -> Result<String, VimayaError> {
    match format {
        OutputFormat::Json => to_json(&json!({
            "configFile": paths.config_file,
            "exists": paths.config_file.exists()
        })),
        OutputFormat::Pretty => Ok(paths.config_file.display().to_string()),
    }
}

fn init(paths: &Paths, force: bool, format: OutputFormat) -> Result<String, VimayaError> {
    if paths.config_file.exists() && !force {
        return Err(VimayaError::Config(format!(
            "{} already exists. Use --force to overwrite it.",
            paths.config_file.display()
        )));
    }

    paths.ensure_dirs()?;
    Config::default().save_to_path(&paths.config_file)?;
    tracing::info!(path = %paths.config_file.display(), "wrote default config");

    match format {
        OutputFormat::Json => to_json(&json!({ "configFile": paths.config_file, "created": true })),
        OutputFormat::Pretty => Ok(format!(
            "{} Wrote {}",
            "✓".green(),
            paths.config_file.display()
        )),
    }
}
