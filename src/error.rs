//! Error types for vimaya.

use thiserror::Error;

use crate::features::focus::SessionSummary;

/// Errors surfaced by the vimaya library and CLI.
#[derive(Debug, Error)]
pub enum VimayaError {
    /// Configuration could not be read, parsed, or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The remote API could not be reached.
    #[error("Network error: {0}")]
    Network(String),

    /// The remote API answered with a non-success status.
    #[error("API error: {0}")]
    Api(String),

    /// A response or input could not be parsed.
    #[error("Parse error: {0}")]
    Parse(String),

    /// No bearer token is configured.
    #[error("Not authenticated: set VIMAYA_TOKEN or api.token in the config file")]
    NotAuthenticated,

    /// At least one end-of-session report failed.
    ///
    /// The summary is kept so the caller can retry reporting.
    #[error("Failed to save data. Please try again.")]
    SaveFailed {
        /// Totals of the session that could not be fully reported.
        summary: SessionSummary,
    },

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for VimayaError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}

impl From<reqwest::Error> for VimayaError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.to_string())
        }
    }
}
