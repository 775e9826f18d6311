// src/settings.rs - Key-value store for panel preferences
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

use crate::camera::models::PhotoRequest;

/// Key the panel preferences are stored under.
pub const SETTINGS_KEY: &str = "Settings";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Flat key-value store for UI preference blobs.
pub trait SettingsStore: Send + Sync {
    fn set(&self, key: &str, value: Value) -> Result<(), SettingsError>;
    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError>;
    fn remove(&self, key: &str) -> Result<(), SettingsError>;
    fn clear(&self) -> Result<(), SettingsError>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        self.inner.lock().unwrap().insert(key.to_string(), value);
        Ok(())
    }

    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        Ok(self.inner.lock().unwrap().get(key).cloned())
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        self.inner.lock().unwrap().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), SettingsError> {
        self.inner.lock().unwrap().clear();
        Ok(())
    }
}

/// Store backed by a single JSON object on disk. Every write rewrites the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<Map<String, Value>, SettingsError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) if contents.trim().is_empty() => Ok(Map::new()),
            Ok(contents) => Ok(serde_json::from_str(&contents)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&self, map: &Map<String, Value>) -> Result<(), SettingsError> {
        let contents = serde_json::to_string_pretty(map)?;
        std::fs::write(&self.path, contents)?;
        Ok(())
    }
}

impl SettingsStore for JsonFileStore {
    fn set(&self, key: &str, value: Value) -> Result<(), SettingsError> {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value);
        self.write_all(&map)
    }

    fn get(&self, key: &str) -> Result<Option<Value>, SettingsError> {
        let _guard = self.lock.lock().unwrap();
        Ok(self.read_all()?.remove(key))
    }

    fn remove(&self, key: &str) -> Result<(), SettingsError> {
        let _guard = self.lock.lock().unwrap();
        let mut map = self.read_all()?;
        if map.remove(key).is_some() {
            self.write_all(&map)?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), SettingsError> {
        let _guard = self.lock.lock().unwrap();
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Panel preferences remembered between sessions.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PanelPreferences {
    /// Overrides the configured focus-box size once the user picks one.
    #[serde(default)]
    pub focus_box_size: Option<i32>,
    #[serde(default)]
    pub photo: PhotoRequest,
}

impl PanelPreferences {
    /// Load preferences, falling back to defaults when missing or unreadable.
    pub fn load(store: &dyn SettingsStore) -> Self {
        match store.get(SETTINGS_KEY) {
            Ok(Some(value)) => match serde_json::from_value::<PanelPreferences>(value) {
                Ok(prefs) if prefs.is_valid() => prefs,
                Ok(_) => {
                    tracing::warn!("Stored panel settings are invalid, using defaults");
                    Self::default()
                }
                Err(e) => {
                    tracing::warn!("Ignoring unreadable settings: {}", e);
                    Self::default()
                }
            },
            Ok(None) => Self::default(),
            Err(e) => {
                tracing::warn!("Failed to read settings: {}", e);
                Self::default()
            }
        }
    }

    fn is_valid(&self) -> bool {
        self.photo.validate().is_ok() && self.focus_box_size.is_none_or(|size| size > 0)
    }

    pub fn save(&self, store: &dyn SettingsStore) -> Result<(), SettingsError> {
        store.set(SETTINGS_KEY, serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_memory_store_operations() {
        let store = MemoryStore::new();
        store.set("a", json!(1)).unwrap();
        store.set("b", json!({"x": true})).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!(1)));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        store.clear().unwrap();
        assert_eq!(store.get("b").unwrap(), None);
    }

    #[test]
    fn test_json_file_store_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        {
            let store = JsonFileStore::new(&path);
            store.set("Settings", json!({"focus_box_size": 64})).unwrap();
            store.set("other", json!("value")).unwrap();
        }
        let store = JsonFileStore::new(&path);
        assert_eq!(store.get("Settings").unwrap(), Some(json!({"focus_box_size": 64})));
        store.remove("other").unwrap();
        assert_eq!(store.get("other").unwrap(), None);
        store.clear().unwrap();
        assert!(!path.exists());
        assert_eq!(store.get("Settings").unwrap(), None);
    }

    #[test]
    fn test_preferences_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(PanelPreferences::load(&store), PanelPreferences::default());

        let prefs = PanelPreferences {
            focus_box_size: Some(150),
            photo: PhotoRequest::new(-2, 5, "night", 1600).unwrap(),
        };
        prefs.save(&store).unwrap();
        assert_eq!(PanelPreferences::load(&store), prefs);
    }

    #[test]
    fn test_preferences_fall_back_on_garbage() {
        let store = MemoryStore::new();
        store.set(SETTINGS_KEY, json!("not an object")).unwrap();
        assert_eq!(PanelPreferences::load(&store), PanelPreferences::default());

        store
            .set(SETTINGS_KEY, json!({"photo": {"ev": 0, "aeb": 2, "exposure": "auto", "iso": 0}}))
            .unwrap();
        assert_eq!(PanelPreferences::load(&store), PanelPreferences::default());

        store.set(SETTINGS_KEY, json!({"focus_box_size": -5})).unwrap();
        assert_eq!(PanelPreferences::load(&store), PanelPreferences::default());
    }
}
