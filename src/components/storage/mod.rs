pub mod token;

pub use token::{find_token, Credential, TokenQuery};

use crate::error::{other_error, OotoResult};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Key written once at startup so the page can tell the tool is present
pub const INSTALLED_MARKER_KEY: &str = "ooto_script_installed";

/// Client-side key-value storage, enumerable by index
pub trait KeyValueStore {
    /// Number of keys in the store
    fn key_count(&self) -> usize;

    /// Key at position `index`, if any
    fn key_at(&self, index: usize) -> Option<String>;

    /// Value stored under `key`
    fn get_value(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value
    fn set_value(&mut self, key: &str, value: &str) -> OotoResult<()>;
}

/// Ordered in-memory store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryStore {
    entries: Vec<(String, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = MemoryStore::new();
        for (key, value) in iter {
            store.upsert(key.into(), value.into());
        }
        store
    }
}

impl MemoryStore {
    fn upsert(&mut self, key: String, value: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn key_count(&self) -> usize {
        self.entries.len()
    }

    fn key_at(&self, index: usize) -> Option<String> {
        self.entries.get(index).map(|(k, _)| k.clone())
    }

    fn get_value(&self, key: &str) -> Option<String> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    fn set_value(&mut self, key: &str, value: &str) -> OotoResult<()> {
        self.upsert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Snapshot of browser storage exported as a flat JSON object.
///
/// Reads see every value as a string. Writes only touch the written key; every other entry
/// is flushed back exactly as it was loaded, in its original position.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    raw: Map<String, Value>,
    entries: MemoryStore,
}

impl JsonFileStore {
    /// Load a snapshot from `path`
    pub fn open(path: impl AsRef<Path>) -> OotoResult<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path)?;
        let parsed: Value = serde_json::from_str(&content)?;
        let Value::Object(raw) = parsed else {
            return Err(other_error(&format!(
                "Storage snapshot {} is not a JSON object",
                path.display()
            )));
        };

        // Storage only holds strings; anything else was exported pre-parsed
        let entries = raw
            .iter()
            .map(|(key, value)| match value {
                Value::String(s) => (key.clone(), s.clone()),
                other => (key.clone(), other.to_string()),
            })
            .collect::<MemoryStore>();

        debug!(
            "Loaded {} storage entries from {}",
            entries.key_count(),
            path.display()
        );

        Ok(Self { path, raw, entries })
    }

    fn flush(&self) -> OotoResult<()> {
        let content = serde_json::to_string_pretty(&self.raw)?;
        fs::write(&self.path, content)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn key_count(&self) -> usize {
        self.entries.key_count()
    }

    fn key_at(&self, index: usize) -> Option<String> {
        self.entries.key_at(index)
    }

    fn get_value(&self, key: &str) -> Option<String> {
        self.entries.get_value(key)
    }

    fn set_value(&mut self, key: &str, value: &str) -> OotoResult<()> {
        self.entries.set_value(key, value)?;
        self.raw
            .insert(key.to_string(), Value::String(value.to_string()));
        self.flush()
    }
}

/// Record that the tool is installed. Safe to call on every start.
pub fn mark_installed(store: &mut dyn KeyValueStore) -> OotoResult<()> {
    if store.get_value(INSTALLED_MARKER_KEY).as_deref() == Some("true") {
        return Ok(());
    }
    store.set_value(INSTALLED_MARKER_KEY, "true")
}

/// Keys that look like they hold credentials, for diagnostics
pub fn token_like_keys(store: &dyn KeyValueStore) -> Vec<String> {
    (0..store.key_count())
        .filter_map(|i| store.key_at(i))
        .filter(|key| {
            let lower = key.to_lowercase();
            lower.contains("token") || lower.contains("auth")
        })
        .collect()
}
