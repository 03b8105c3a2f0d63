use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::errors::{AdvisorError, AdvisorResult};

/// Documented property keys consumed by the advisor.
pub mod keys {
    /// Gemini API key; required for every API invocation.
    pub const GEMINI_API_KEY: &str = "gemini_api_key";
    /// Destination file for the usage log; logging is skipped when unset.
    pub const USAGE_LOG_PATH: &str = "usage_log_path";
    /// Free-text long-term memory; absent means empty.
    pub const LONG_TERM_MEMORY: &str = "long_term_memory";
}

/// Key-value store persisted by the deployment. Components receive it as
/// an explicit dependency instead of reading ambient global state.
pub trait PropertyStore: Send + Sync {
    /// Returns the stored value, or `None` if the key was never set.
    fn get(&self, key: &str) -> AdvisorResult<Option<String>>;

    /// Stores `value` under `key`, overwriting any previous value.
    fn set(&self, key: &str, value: &str) -> AdvisorResult<()>;
}

/// Convenience accessor for the long-term memory blob: the empty string is
/// the "unset" value.
pub fn long_term_memory(store: &dyn PropertyStore) -> AdvisorResult<String> {
    Ok(store.get(keys::LONG_TERM_MEMORY)?.unwrap_or_default())
}

/// Property store backed by a TOML file of string values. The file is
/// read and rewritten whole on each access; concurrent writers get
/// last-write-wins, which the callers accept.
#[derive(Debug)]
pub struct FilePropertyStore {
    path: PathBuf,
}

impl FilePropertyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn load(&self) -> AdvisorResult<toml::Table> {
        if !self.path.exists() {
            return Ok(toml::Table::new());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            AdvisorError::Store(format!("Failed to read properties file: {}", e))
        })?;
        content.parse::<toml::Table>().map_err(|e| {
            AdvisorError::Store(format!("Failed to parse properties file: {}", e))
        })
    }

    fn save(&self, table: &toml::Table) -> AdvisorResult<()> {
        // Ensure the directory exists
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| {
                    AdvisorError::Store(format!(
                        "Failed to create properties directory: {}",
                        e
                    ))
                })?;
            }
        }
        let content = toml::to_string(table).map_err(|e| {
            AdvisorError::Store(format!("Failed to serialize properties: {}", e))
        })?;
        fs::write(&self.path, content).map_err(|e| {
            AdvisorError::Store(format!("Failed to write properties file: {}", e))
        })
    }
}

impl PropertyStore for FilePropertyStore {
    fn get(&self, key: &str) -> AdvisorResult<Option<String>> {
        let table = self.load()?;
        Ok(table
            .get(key)
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()))
    }

    fn set(&self, key: &str, value: &str) -> AdvisorResult<()> {
        let mut table = self.load()?;
        table.insert(key.to_string(), toml::Value::String(value.to_string()));
        self.save(&table)
    }
}

/// In-process property store for tests and embedders.
#[derive(Debug, Default)]
pub struct MemoryPropertyStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryPropertyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store pre-populated with an API key.
    pub fn with_api_key(key: &str) -> Self {
        let store = Self::new();
        store
            .set(keys::GEMINI_API_KEY, key)
            .expect("in-memory set cannot fail");
        store
    }
}

impl PropertyStore for MemoryPropertyStore {
    fn get(&self, key: &str) -> AdvisorResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| AdvisorError::Store("Property store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> AdvisorResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| AdvisorError::Store("Property store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Default location for the properties file.
pub fn default_properties_path(app_name: &str) -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join(".config")
            .join(app_name)
            .join("properties.toml")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let store = MemoryPropertyStore::new();
        assert_eq!(store.get(keys::GEMINI_API_KEY).unwrap(), None);

        store.set(keys::GEMINI_API_KEY, "secret").unwrap();
        assert_eq!(
            store.get(keys::GEMINI_API_KEY).unwrap(),
            Some("secret".to_string())
        );

        // Overwrite wins
        store.set(keys::GEMINI_API_KEY, "rotated").unwrap();
        assert_eq!(
            store.get(keys::GEMINI_API_KEY).unwrap(),
            Some("rotated".to_string())
        );
    }

    #[test]
    fn test_memory_defaults_to_empty_string() {
        let store = MemoryPropertyStore::new();
        assert_eq!(long_term_memory(&store).unwrap(), "");

        store
            .set(keys::LONG_TERM_MEMORY, "всегда отвечай кратко")
            .unwrap();
        assert_eq!(
            long_term_memory(&store).unwrap(),
            "всегда отвечай кратко"
        );
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePropertyStore::new(dir.path().join("props.toml"));

        assert_eq!(store.get("missing").unwrap(), None);

        store.set(keys::LONG_TERM_MEMORY, "line one\nline two").unwrap();
        store.set(keys::USAGE_LOG_PATH, "/tmp/usage.csv").unwrap();

        // Values survive a fresh handle on the same file
        let reopened = FilePropertyStore::new(dir.path().join("props.toml"));
        assert_eq!(
            reopened.get(keys::LONG_TERM_MEMORY).unwrap(),
            Some("line one\nline two".to_string())
        );
        assert_eq!(
            reopened.get(keys::USAGE_LOG_PATH).unwrap(),
            Some("/tmp/usage.csv".to_string())
        );
    }

    #[test]
    fn test_file_store_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("props.toml");
        let store = FilePropertyStore::new(&nested);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap(), Some("v".to_string()));
        assert!(nested.exists());
    }
}
