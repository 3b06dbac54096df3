// SPDX-License-Identifier: GPL-3.0-only

//! Persisted user preferences
//!
//! Preferences are stored as JSON under the user config directory. A missing
//! or unreadable file falls back to defaults so a corrupt preferences file
//! can never keep the camera from starting.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::constants::defaults;
use crate::errors::AppError;
use crate::session::types::FacingMode;
use crate::store::Mode;

/// User preferences restored on the next launch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Camera facing direction to open with
    pub facing_mode: FacingMode,
    /// Mode to start in
    pub mode: Mode,
    /// Last applied zoom level
    pub zoom: f64,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            facing_mode: FacingMode::default(),
            mode: Mode::default(),
            zoom: defaults::ZOOM,
        }
    }
}

impl Preferences {
    /// Default preferences file path: `<config dir>/arcam/preferences.json`
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("arcam")
            .join("preferences.json")
    }

    /// Load preferences from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load preferences from the given path, falling back to defaults when
    /// the file is missing or unparsable
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(prefs) => {
                    debug!(path = %path.display(), "Loaded preferences");
                    prefs
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring corrupt preferences");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save preferences to the default location
    pub fn save(&self) -> Result<(), AppError> {
        self.save_to(&Self::config_path())
    }

    /// Save preferences to the given path, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<(), AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("failed to serialize preferences: {e}")))?;
        std::fs::write(path, contents)?;
        debug!(path = %path.display(), "Saved preferences");
        Ok(())
    }
}
