//! Remembers the last successfully searched city across restarts.

use anyhow::{Context, Result};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
};

use crate::config::project_dirs;

pub trait PreferenceStore: Send + Sync + Debug {
    /// `Ok(None)` when nothing was ever stored.
    fn load_last_city(&self) -> Result<Option<String>>;

    /// Overwrites whatever was stored before.
    fn save_last_city(&self, city: &str) -> Result<()>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Preferences {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_city: Option<String>,
}

/// TOML file in the platform data directory.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self> {
        Ok(Self::new(project_dirs()?.data_dir().join("preferences.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read preferences: {}", self.path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse preferences: {}", self.path.display()))
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn load_last_city(&self) -> Result<Option<String>> {
        Ok(self.read()?.last_city.filter(|c| !c.trim().is_empty()))
    }

    fn save_last_city(&self, city: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let prefs = Preferences { last_city: Some(city.to_string()) };
        let toml = toml::to_string_pretty(&prefs).context("Failed to serialize preferences")?;

        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write preferences: {}", self.path.display()))?;

        tracing::debug!(city, path = %self.path.display(), "Last city saved");
        Ok(())
    }
}

/// Process-local store; nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryPreferenceStore {
    last_city: Mutex<Option<String>>,
    writes: Mutex<usize>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_last_city(city: impl Into<String>) -> Self {
        Self { last_city: Mutex::new(Some(city.into())), writes: Mutex::new(0) }
    }

    pub fn last_city(&self) -> Option<String> {
        self.last_city.lock().clone()
    }

    /// How many times `save_last_city` has been called.
    pub fn write_count(&self) -> usize {
        *self.writes.lock()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load_last_city(&self) -> Result<Option<String>> {
        Ok(self.last_city())
    }

    fn save_last_city(&self, city: &str) -> Result<()> {
        *self.last_city.lock() = Some(city.to_string());
        *self.writes.lock() += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_means_no_city() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("preferences.toml"));

        assert_eq!(store.load_last_city().unwrap(), None);
    }

    #[test]
    fn file_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("preferences.toml");

        FilePreferenceStore::new(&path).save_last_city("Paris").unwrap();

        let reopened = FilePreferenceStore::new(&path);
        assert_eq!(reopened.load_last_city().unwrap().as_deref(), Some("Paris"));
    }

    #[test]
    fn file_store_last_write_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("preferences.toml"));

        store.save_last_city("Paris").unwrap();
        store.save_last_city("Tokyo").unwrap();

        assert_eq!(store.load_last_city().unwrap().as_deref(), Some("Tokyo"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        fs::write(&path, "last_city = [").unwrap();

        let err = FilePreferenceStore::new(&path).load_last_city().unwrap_err();
        assert!(err.to_string().contains("Failed to parse preferences"));
    }

    #[test]
    fn memory_store_counts_writes() {
        let store = MemoryPreferenceStore::with_last_city("Oslo");
        assert_eq!(store.load_last_city().unwrap().as_deref(), Some("Oslo"));
        assert_eq!(store.write_count(), 0);

        store.save_last_city("Rome").unwrap();

        assert_eq!(store.last_city().as_deref(), Some("Rome"));
        assert_eq!(store.write_count(), 1);
    }
}
