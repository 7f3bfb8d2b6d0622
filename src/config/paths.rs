//! Path resolution for vimaya configuration files.
//!
//! All vimaya data lives in `~/.vimaya/`:
//! - `config.yaml` - Main configuration file

use std::path::PathBuf;

use crate::error::VimayaError;

/// Paths to vimaya configuration files.
#[derive(Debug, Clone)]
pub struct Paths {
    /// Root directory: `~/.vimaya/`
    pub root: PathBuf,
    /// Config file: `~/.vimaya/config.yaml`
    pub config_file: PathBuf,
}

impl Paths {
    /// Create paths based on the user's home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory cannot be determined.
    pub fn new() -> Result<Self, VimayaError> {
        let home = std::env::var("HOME").map_err(|_| {
            VimayaError::Config("Could not determine home directory".to_string())
        })?;

        Ok(Self::with_root(PathBuf::from(home).join(".vimaya")))
    }

    /// Create paths with a custom root directory (useful for testing).
    #[must_use]
    pub fn with_root(root: PathBuf) -> Self {
        Self {
            config_file: root.join("config.yaml"),
            root,
        }
    }

    /// Ensure the root directory exists.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation fails.
    pub fn ensure_dirs(&self) -> Result<(), VimayaError> {
        if !self.root.exists() {
            std::fs::create_dir_all(&self.root).map_err(|e| {
                VimayaError::Config(format!(
                    "Failed to create directory {}: {e}",
                    self.root.display()
                ))
            })?;
        }

        Ok(())
    }
}
