//! Configuration management
//!
//! Handles loading/saving application settings, default values, and the
//! recently-used lists the UI shows in its pickers.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::models::options::OcrOptions;
use crate::core::models::results::{CoreError, CoreResult};

/// How many recently-used entries to keep
const RECENT_LIMIT: usize = 10;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Default OCR options applied to new runs
    pub default_options: OcrOptions,

    /// Recently opened input files, most recent first
    pub recent_files: Vec<PathBuf>,

    /// Recently used output directories, most recent first
    pub recent_output_dirs: Vec<PathBuf>,

    /// UI theme preference (system, light, dark)
    pub theme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_options: OcrOptions::default(),
            recent_files: Vec::new(),
            recent_output_dirs: Vec::new(),
            theme: "system".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file, falling back to defaults when absent
    pub fn load(path: &Path) -> CoreResult<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file as pretty JSON
    pub fn save(&self, path: &Path) -> CoreResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Configuration directory for this application
    pub fn config_dir() -> CoreResult<PathBuf> {
        directories::ProjectDirs::from("", "", "ocrmypdf-gui")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .ok_or(CoreError::ConfigDir)
    }

    /// Default settings file path
    pub fn default_path() -> CoreResult<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Load from the default location or fall back to defaults
    pub fn load_or_default() -> CoreResult<Self> {
        Self::load(&Self::default_path()?)
    }

    /// Record a recently opened input file
    pub fn add_recent_file(&mut self, path: PathBuf) {
        push_recent(&mut self.recent_files, path);
    }

    /// Record a recently used output directory
    pub fn add_recent_output_dir(&mut self, path: PathBuf) {
        push_recent(&mut self.recent_output_dirs, path);
    }
}

/// Move-to-front insert, deduplicated and capped
fn push_recent(list: &mut Vec<PathBuf>, path: PathBuf) {
    list.retain(|p| p != &path);
    list.insert(0, path);
    list.truncate(RECENT_LIMIT);
}
