//! Named option profiles
//!
//! A profile is a (name, options) pair persisted to a JSON file next to the
//! main configuration. Single-user, single-process access is assumed; every
//! mutation persists immediately.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::config::AppConfig;
use crate::core::models::options::OcrOptions;
use crate::core::models::results::{CoreError, CoreResult};

/// File-backed store of named OCR option profiles
///
/// Backed by a `BTreeMap` so `list()` is sorted and stable across reloads.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ProfileStore {
    profiles: BTreeMap<String, OcrOptions>,

    #[serde(skip)]
    path: PathBuf,
}

impl ProfileStore {
    /// Open the store at an explicit path, creating an empty one when absent
    pub fn open(path: PathBuf) -> CoreResult<Self> {
        let mut store = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        store.path = path;
        Ok(store)
    }

    /// Open the store at its default location
    pub fn open_default() -> CoreResult<Self> {
        Self::open(AppConfig::config_dir()?.join("profiles.json"))
    }

    fn persist(&self) -> CoreResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }

    /// Save or overwrite a profile
    pub fn save(&mut self, name: &str, options: OcrOptions) -> CoreResult<()> {
        if name.trim().is_empty() {
            return Err(CoreError::Validation(
                "profile name must not be empty".to_string(),
            ));
        }
        self.profiles.insert(name.to_string(), options);
        self.persist()
    }

    /// Load a profile by name
    pub fn load(&self, name: &str) -> CoreResult<OcrOptions> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| CoreError::ProfileNotFound(name.to_string()))
    }

    /// Profile names in sorted order
    pub fn list(&self) -> Vec<String> {
        self.profiles.keys().cloned().collect()
    }

    /// Delete a profile by name
    pub fn delete(&mut self, name: &str) -> CoreResult<()> {
        if self.profiles.remove(name).is_none() {
            return Err(CoreError::ProfileNotFound(name.to_string()));
        }
        self.persist()
    }

    /// Backing file path
    pub fn path(&self) -> &Path {
        &self.path
    }
}
