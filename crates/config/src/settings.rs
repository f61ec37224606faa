// User settings
// Loaded from ~/.config/qatrack/settings.toml

use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Overrides the settings file location.
pub const SETTINGS_ENV: &str = "QATRACK_SETTINGS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Where `analyze` writes its report, JSON and snapshot files.
    pub output_dir: PathBuf,

    /// Where `progress` looks for snapshot files.
    pub history_dir: PathBuf,

    /// Glob for snapshot files inside `history_dir`.
    pub history_pattern: String,

    /// Default sheet configuration (TOML). None = auto-detect.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sheet_config: Option<PathBuf>,

    // Outputs written by `analyze`
    pub write_text: bool,
    pub write_json: bool,
    pub write_csv: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            history_dir: PathBuf::from("."),
            history_pattern: "qa_results_*.csv".to_string(),
            sheet_config: None,
            write_text: true,
            write_json: true,
            write_csv: true,
        }
    }
}

impl Settings {
    /// Get the settings file path
    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(SETTINGS_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("qatrack")
            .join("settings.toml")
    }

    /// Load settings from disk, falling back to defaults
    pub fn load() -> Self {
        let path = Self::config_path();
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("{e}; using default settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, String> {
        let contents = fs::read_to_string(path)
            .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
        Self::from_toml(&contents).map_err(|e| format!("Error parsing {}: {e}", path.display()))
    }

    pub fn from_toml(input: &str) -> Result<Self, String> {
        toml::from_str(input).map_err(|e| e.to_string())
    }

    pub fn to_toml(&self) -> Result<String, String> {
        toml::to_string_pretty(self).map_err(|e| e.to_string())
    }

    /// Save current settings to disk
    pub fn save(&self) -> Result<(), String> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), String> {
        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        fs::write(path, self.to_toml()?).map_err(|e| e.to_string())
    }
}
