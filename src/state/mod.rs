//! Persisted compass preferences, following XDG Base Directory standards.
//!
//! The compass session reads the "locked" and "south-at-top" preferences when it
//! starts and writes them back on every user toggle. They live in
//! `XDG_STATE_HOME/suncompass/preferences.toml`, kept apart from the
//! configuration file.
//!
//! The store is passed into the session explicitly; nothing here is global.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::common::constants::{APP_DIR_NAME, PREFERENCES_FILE_NAME};
use crate::common::utils::private_path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Display fixed at north-up or south-up instead of following the device.
    pub locked: bool,
    /// Locked display shows south at the top.
    pub south_at_top: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            locked: true,
            south_at_top: false,
        }
    }
}

pub trait PreferenceStore: Send {
    fn load(&self) -> Result<Preferences>;
    fn save(&mut self, preferences: &Preferences) -> Result<()>;
}

/// Get the state directory: `$XDG_STATE_HOME/suncompass`, falling back to
/// `~/.local/state/suncompass`.
pub fn get_state_dir() -> PathBuf {
    let state_home = std::env::var("XDG_STATE_HOME")
        .ok()
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .or_else(dirs::state_dir)
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".local/state")
        });

    state_home.join(APP_DIR_NAME)
}

/// Preferences stored as TOML on disk.
#[derive(Debug, Clone)]
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Store at the default XDG location.
    pub fn default_location() -> Self {
        Self::new(get_state_dir().join(PREFERENCES_FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStore for FilePreferenceStore {
    /// A missing file yields the defaults. An unreadable or malformed file also
    /// yields the defaults, with a warning.
    fn load(&self) -> Result<Preferences> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }

        let parsed = fs::read_to_string(&self.path)
            .map_err(anyhow::Error::from)
            .and_then(|content| toml::from_str::<Preferences>(&content).map_err(Into::into));

        match parsed {
            Ok(preferences) => Ok(preferences),
            Err(e) => {
                log_warning!(
                    "Ignoring unreadable preferences at {}: {}",
                    private_path(&self.path),
                    e
                );
                Ok(Preferences::default())
            }
        }
    }

    fn save(&mut self, preferences: &Preferences) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create state directory {}", parent.display())
            })?;
        }

        let content =
            toml::to_string(preferences).context("Failed to serialize compass preferences")?;
        fs::write(&self.path, content).with_context(|| {
            format!("Failed to write preferences to {}", self.path.display())
        })?;

        log_debug!("Saved preferences to {}", private_path(&self.path));
        Ok(())
    }
}

/// In-memory store. Clones share the same preferences.
#[derive(Debug, Clone, Default)]
pub struct MemoryPreferenceStore {
    inner: Arc<Mutex<Preferences>>,
}

impl MemoryPreferenceStore {
    pub fn new(preferences: Preferences) -> Self {
        Self {
            inner: Arc::new(Mutex::new(preferences)),
        }
    }

    pub fn current(&self) -> Preferences {
        match self.inner.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn load(&self) -> Result<Preferences> {
        Ok(self.current())
    }

    fn save(&mut self, preferences: &Preferences) -> Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| anyhow::anyhow!("Preference store lock poisoned"))?;
        *guard = *preferences;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let preferences = Preferences::default();
        assert!(preferences.locked);
        assert!(!preferences.south_at_top);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let mut store = FilePreferenceStore::new(dir.path().join("nested/preferences.toml"));

        assert_eq!(store.load().unwrap(), Preferences::default());

        let preferences = Preferences {
            locked: false,
            south_at_top: true,
        };
        store.save(&preferences).unwrap();
        assert_eq!(store.load().unwrap(), preferences);
    }

    #[test]
    fn test_file_store_partial_and_malformed() {
        crate::logger::Log::set_enabled(false);
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.toml");
        let store = FilePreferenceStore::new(path.clone());

        fs::write(&path, "south_at_top = true\n").unwrap();
        let loaded = store.load().unwrap();
        assert!(loaded.locked);
        assert!(loaded.south_at_top);

        fs::write(&path, "locked = \"maybe\"").unwrap();
        assert_eq!(store.load().unwrap(), Preferences::default());
    }

    #[test]
    #[serial]
    fn test_state_dir_honors_xdg_state_home() {
        let dir = tempdir().unwrap();
        let original = std::env::var("XDG_STATE_HOME").ok();

        unsafe {
            std::env::set_var("XDG_STATE_HOME", dir.path());
        }
        assert_eq!(get_state_dir(), dir.path().join("suncompass"));

        unsafe {
            match original {
                Some(value) => std::env::set_var("XDG_STATE_HOME", value),
                None => std::env::remove_var("XDG_STATE_HOME"),
            }
        }
    }

    #[test]
    fn test_memory_store_shares_state_between_clones() {
        let store = MemoryPreferenceStore::default();
        let mut writer = store.clone();
        writer
            .save(&Preferences {
                locked: false,
                south_at_top: false,
            })
            .unwrap();
        assert!(!store.current().locked);
    }
}
