//! File-backed configuration store

use crate::error::{Error, Result};
use crate::lock;
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::value::ConfigValue;

/// Mapping persisted by a [`ConfigStore`]; keys serialize in sorted order
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// Default log file name, resolved relative to the config file's directory
pub const DEFAULT_LOG_FILE: &str = "admkit.log";

/// Default component tag for log entries
pub const DEFAULT_COMPONENT: &str = "admkit";

/// Baseline configuration written by `admkit config init`
///
/// Pure builder: no filesystem or environment access.
pub fn default_configuration() -> ConfigMap {
    let mut map = ConfigMap::new();
    map.insert("log_file".to_string(), DEFAULT_LOG_FILE.into());
    map.insert("component".to_string(), DEFAULT_COMPONENT.into());
    map.insert("console_output".to_string(), true.into());
    map.insert("max_retries".to_string(), 3.into());
    map.insert("retry_delay_ms".to_string(), 0.into());
    map
}

/// Key/value configuration persisted in a single YAML file
///
/// Every operation round-trips through the file. Mutations rewrite the whole
/// file via a temporary sibling and a rename, so readers see either the old
/// mapping or the new one.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Create a store backed by `path`; nothing is touched on disk yet
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a store at the default location (~/.admkit/config.yaml)
    pub fn load_default() -> anyhow::Result<Self> {
        let state_dir = crate::utils::get_state_dir()?;
        Ok(Self::new(state_dir.join("config.yaml")))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Initialize the backing file with `defaults` unless it already exists
    ///
    /// An existing file wins: its mapping is returned as-is and `defaults`
    /// are not merged into it.
    pub fn initialize(&self, defaults: ConfigMap) -> Result<ConfigMap> {
        let mutex = lock::path_mutex(&self.path);
        let _guard = lock::acquire(&mutex);

        if self.path.exists() {
            tracing::debug!(path = %self.path.display(), "configuration already initialized");
            return self.read_map();
        }

        self.write_map(&defaults)?;
        tracing::debug!(
            path = %self.path.display(),
            keys = defaults.len(),
            "wrote default configuration"
        );
        Ok(defaults)
    }

    /// Load the full mapping; a missing file yields an empty mapping
    pub fn load(&self) -> Result<ConfigMap> {
        let mutex = lock::path_mutex(&self.path);
        let _guard = lock::acquire(&mutex);
        self.read_map()
    }

    /// Get the value stored under `key`, or `default` when it is absent
    ///
    /// Never fails: an unreadable or corrupt file is reported through
    /// `tracing` and treated like an empty mapping.
    pub fn get(&self, key: &str, default: impl Into<ConfigValue>) -> ConfigValue {
        match self.load() {
            Ok(mut map) => map.remove(key).unwrap_or_else(|| default.into()),
            Err(e) => {
                tracing::warn!(key, error = %e, "falling back to default configuration value");
                default.into()
            }
        }
    }

    /// Insert or replace `key`, rewriting the whole file
    pub fn set(&self, key: &str, value: impl Into<ConfigValue>) -> Result<()> {
        let value = value.into();
        self.update(|map| {
            map.insert(key.to_string(), value);
        })?;
        tracing::debug!(key, path = %self.path.display(), "configuration value set");
        Ok(())
    }

    /// Remove `key`, returning its previous value
    ///
    /// The file is only rewritten when the key was present.
    pub fn remove(&self, key: &str) -> Result<Option<ConfigValue>> {
        let mutex = lock::path_mutex(&self.path);
        let _guard = lock::acquire(&mutex);

        let mut map = self.read_map()?;
        let previous = map.remove(key);
        if previous.is_some() {
            self.write_map(&map)?;
        }
        Ok(previous)
    }

    /// Read-modify-write under the path lock
    fn update<F>(&self, mutate: F) -> Result<()>
    where
        F: FnOnce(&mut ConfigMap),
    {
        let mutex = lock::path_mutex(&self.path);
        let _guard = lock::acquire(&mutex);

        let mut map = self.read_map()?;
        mutate(&mut map);
        self.write_map(&map)
    }

    fn read_map(&self) -> Result<ConfigMap> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ConfigMap::new()),
            Err(e) => return Err(Error::config_io(&self.path, e)),
        };

        if content.trim().is_empty() {
            return Ok(ConfigMap::new());
        }

        serde_yaml_ng::from_str(&content).map_err(|e| Error::config_format(&self.path, e))
    }

    fn write_map(&self, map: &ConfigMap) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| Error::config_io(parent, e))?;
            }
        }

        let yaml = serde_yaml_ng::to_string(map).map_err(|e| Error::config_format(&self.path, e))?;

        let tmp = self.temp_path();
        fs::write(&tmp, yaml).map_err(|e| Error::config_io(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            Error::config_io(&self.path, e)
        })
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "config".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn temp_store() -> (ConfigStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("config.yaml"));
        (store, temp_dir)
    }

    #[test]
    fn test_initialize_writes_defaults_when_absent() {
        let (store, _temp) = temp_store();
        assert!(!store.path().exists());

        let map = store.initialize(default_configuration()).unwrap();

        assert!(store.path().exists());
        assert_eq!(map, default_configuration());
        assert_eq!(store.load().unwrap(), default_configuration());
    }

    #[test]
    fn test_initialize_is_idempotent() {
        let (store, _temp) = temp_store();
        let mut defaults = ConfigMap::new();
        defaults.insert("name".to_string(), "first".into());

        store.initialize(defaults.clone()).unwrap();
        store.set("name", "changed").unwrap();

        let mut other_defaults = ConfigMap::new();
        other_defaults.insert("name".to_string(), "second".into());
        other_defaults.insert("extra".to_string(), 1.into());

        let map = store.initialize(other_defaults).unwrap();
        assert_eq!(map.get("name"), Some(&ConfigValue::from("changed")));
        assert!(!map.contains_key("extra"));
    }

    #[test]
    fn test_set_then_get_round_trip() {
        let (store, _temp) = temp_store();

        let mut nested = ConfigMap::new();
        nested.insert("host".to_string(), "backup01".into());
        nested.insert("port".to_string(), 2222.into());

        let values: Vec<(&str, ConfigValue)> = vec![
            ("flag", true.into()),
            ("count", 12.into()),
            ("ratio", 0.25.into()),
            ("whole_float", 2.0.into()),
            ("name", "nightly".into()),
            ("numeric_string", "42".into()),
            ("bool_string", "true".into()),
            ("list", vec![ConfigValue::from(1), ConfigValue::from("x")].into()),
            ("target", nested.into()),
        ];

        for (key, value) in &values {
            store.set(key, value.clone()).unwrap();
        }
        for (key, value) in &values {
            assert_eq!(&store.get(key, "missing"), value, "key {}", key);
        }
    }

    #[test]
    fn test_get_missing_key_returns_default() {
        let (store, _temp) = temp_store();
        assert_eq!(store.get("absent", 7), ConfigValue::Integer(7));

        store.set("present", "x").unwrap();
        assert_eq!(store.get("absent", "fallback"), ConfigValue::from("fallback"));
    }

    #[test]
    fn test_get_on_corrupt_file_returns_default() {
        let (store, _temp) = temp_store();
        fs::write(store.path(), "- not\n- a\n- mapping\n").unwrap();

        assert_eq!(store.get("key", false), ConfigValue::Bool(false));
        assert!(store.load().unwrap_err().is_config_error());
    }

    #[test]
    fn test_set_on_missing_file_starts_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = ConfigStore::new(temp_dir.path().join("nested/dir/config.yaml"));

        store.set("only", 1).unwrap();

        let map = store.load().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("only"), Some(&ConfigValue::Integer(1)));
    }

    #[test]
    fn test_empty_file_is_empty_mapping() {
        let (store, _temp) = temp_store();
        fs::write(store.path(), "").unwrap();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn test_remove() {
        let (store, _temp) = temp_store();
        store.set("a", 1).unwrap();
        store.set("b", 2).unwrap();

        assert_eq!(store.remove("a").unwrap(), Some(ConfigValue::Integer(1)));
        assert_eq!(store.remove("a").unwrap(), None);
        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn test_set_fails_when_parent_is_a_file() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("blocker");
        fs::write(&blocker, "file, not dir").unwrap();

        let store = ConfigStore::new(blocker.join("config.yaml"));
        let err = store.set("k", "v").unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let (store, temp) = temp_store();
        store.set("k", "v").unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("config.yaml")]);
    }

    #[test]
    fn test_concurrent_sets_do_not_lose_keys() {
        let (store, _temp) = temp_store();
        let store = Arc::new(store);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    for j in 0..5 {
                        store.set(&format!("key_{}_{}", i, j), i * 10 + j).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.load().unwrap().len(), 40);
    }

    #[test]
    fn test_default_configuration_contents() {
        let defaults = default_configuration();
        assert_eq!(
            defaults.get("log_file").and_then(|v| v.as_str()),
            Some(DEFAULT_LOG_FILE)
        );
        assert_eq!(defaults.get("max_retries").and_then(|v| v.as_i64()), Some(3));
        assert_eq!(
            defaults.get("console_output").and_then(|v| v.as_bool()),
            Some(true)
        );
    }
}
