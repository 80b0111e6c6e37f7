//! Edit preferences.
//!
//! Loaded in layers: built-in defaults, then the TOML preferences file, then
//! environment variable overrides.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::EditHistory;

/// Errors raised while loading or saving preferences.
#[derive(Debug, Error)]
pub enum PreferencesError {
    #[error("Failed to access preferences file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid preferences file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}

pub type Result<T> = std::result::Result<T, PreferencesError>;

/// Edit-core settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditPreferences {
    /// Maximum number of undo steps kept, 0 for unbounded
    pub history_limit: usize,
    /// Whether frozen entities follow group manipulation
    pub move_frozen: bool,
}

impl Default for EditPreferences {
    fn default() -> Self {
        Self {
            history_limit: EditHistory::DEFAULT_LIMIT,
            move_frozen: false,
        }
    }
}

impl EditPreferences {
    /// Environment variable overriding `history_limit`.
    pub const ENV_HISTORY_LIMIT: &'static str = "VOID_EDIT_HISTORY_LIMIT";
    /// Environment variable overriding `move_frozen`.
    pub const ENV_MOVE_FROZEN: &'static str = "VOID_EDIT_MOVE_FROZEN";

    /// Parse preferences from TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load preferences from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let prefs = Self::from_toml_str(&content)?;
        log::info!("Loaded preferences from {:?}", path);
        Ok(prefs)
    }

    /// Save preferences to a file, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        log::info!("Saved preferences to {:?}", path);
        Ok(())
    }

    /// Get the default preferences path.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("void_edit");
            p.push("preferences.toml");
            p
        })
    }

    /// Defaults, then the file at `path` (or the default location), then
    /// environment overrides. A missing or unreadable file falls back to defaults.
    pub fn resolve(path: Option<&Path>) -> Self {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);
        let mut prefs = match path {
            Some(path) if path.exists() => Self::load(&path).unwrap_or_else(|e| {
                log::warn!("{}, using defaults", e);
                Self::default()
            }),
            _ => Self::default(),
        };
        prefs.apply_overrides(|key| std::env::var(key).ok());
        prefs
    }

    /// Apply overrides from a key lookup (normally the process environment).
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup(Self::ENV_HISTORY_LIMIT) {
            match value.trim().parse() {
                Ok(limit) => {
                    self.history_limit = limit;
                    log::info!("History limit from env: {}", limit);
                }
                Err(_) => log::warn!("Ignoring {}={:?}", Self::ENV_HISTORY_LIMIT, value),
            }
        }

        if let Some(value) = lookup(Self::ENV_MOVE_FROZEN) {
            self.move_frozen = matches!(value.trim(), "1" | "true" | "yes");
        }
    }
}
