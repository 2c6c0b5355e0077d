//! Duration settings persistence
//!
//! The engine only needs a string/integer key-value store. Failures are
//! absorbed here: a failed read behaves like an absent key and the engine
//! falls back to its defaults, a failed write is logged and dropped.

use std::{collections::HashMap, fs, io, path::PathBuf};

use tracing::warn;

/// Key-value persistence for the three phase durations
pub trait SettingsStore: Send {
    /// Look up a stored value; `None` when the key is absent or unreadable
    fn get(&self, key: &str) -> Option<i64>;

    /// Store a value, best-effort
    fn set(&mut self, key: &str, value: i64);
}

/// Settings store backed by a single JSON file of string/integer pairs
pub struct JsonSettingsStore {
    path: PathBuf,
    values: HashMap<String, i64>,
}

impl JsonSettingsStore {
    /// Open the store at `path`, reading any existing values. A missing
    /// file starts empty; an unreadable or malformed one is logged and
    /// treated the same way.
    pub fn open(path: PathBuf) -> Self {
        let values = match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(values) => values,
                Err(e) => {
                    warn!("Ignoring malformed settings file {}: {}", path.display(), e);
                    HashMap::new()
                }
            },
            Err(e) if e.kind() == io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                warn!("Failed to read settings file {}: {}", path.display(), e);
                HashMap::new()
            }
        };

        Self { path, values }
    }

    fn flush(&self) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                warn!(
                    "Failed to create settings directory {}: {}",
                    parent.display(),
                    e
                );
                return;
            }
        }

        match serde_json::to_string_pretty(&self.values) {
            Ok(contents) => {
                if let Err(e) = fs::write(&self.path, contents) {
                    warn!("Failed to write settings file {}: {}", self.path.display(), e);
                }
            }
            Err(e) => warn!("Failed to serialize settings: {}", e),
        }
    }
}

impl SettingsStore for JsonSettingsStore {
    fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
        self.flush();
    }
}

/// Ephemeral store; nothing survives the process
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    values: HashMap<String, i64>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    fn set(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_string(), value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_settings_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("take_five_test_{}_{}", name, std::process::id()))
            .join("settings.json")
    }

    #[test]
    fn json_store_round_trips_across_reopen() {
        let path = temp_settings_path("roundtrip");
        let _ = fs::remove_file(&path);

        let mut store = JsonSettingsStore::open(path.clone());
        assert_eq!(store.get("focusDuration"), None);

        store.set("focusDuration", 2700);
        store.set("shortBreakDuration", 300);

        let reopened = JsonSettingsStore::open(path);
        assert_eq!(reopened.get("focusDuration"), Some(2700));
        assert_eq!(reopened.get("shortBreakDuration"), Some(300));
        assert_eq!(reopened.get("longBreakDuration"), None);
    }

    #[test]
    fn json_store_overwrites_existing_keys() {
        let path = temp_settings_path("overwrite");
        let _ = fs::remove_file(&path);

        let mut store = JsonSettingsStore::open(path.clone());
        store.set("focusDuration", 1500);
        store.set("focusDuration", 3600);

        let reopened = JsonSettingsStore::open(path);
        assert_eq!(reopened.get("focusDuration"), Some(3600));
    }

    #[test]
    fn malformed_settings_file_reads_as_empty() {
        let path = temp_settings_path("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let store = JsonSettingsStore::open(path);
        assert_eq!(store.get("focusDuration"), None);
    }

    #[test]
    fn memory_store_holds_values() {
        let mut store = MemorySettingsStore::new();
        assert_eq!(store.get("focusDuration"), None);

        store.set("focusDuration", 900);
        assert_eq!(store.get("focusDuration"), Some(900));
    }
}
