//! Path management for callbot configuration and data files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/callbot/           # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/callbot/      # Data directory
//! └── sessions/                # File session store
//! ```

use callbot_core::{CallbotError, Result};
use std::path::PathBuf;

const APP_NAME: &str = "callbot";

pub struct CallbotPaths;

impl CallbotPaths {
    /// Returns the callbot configuration directory (e.g. `~/.config/callbot/`).
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or_else(|| CallbotError::config("Cannot determine config directory"))
    }

    /// Returns the callbot data directory (e.g. `~/.local/share/callbot/`).
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_NAME))
            .ok_or_else(|| CallbotError::config("Cannot determine data directory"))
    }

    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn sessions_dir() -> Result<PathBuf> {
        Ok(Self::data_dir()?.join("sessions"))
    }
}
