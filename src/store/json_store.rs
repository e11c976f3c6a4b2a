use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use log::{debug, warn};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::store::schema::SettingsFile;

const SETTINGS_FILE: &str = "settings.json";

/// Best-effort key/value persistence. Implementations never fail loudly:
/// unreadable values are absent and failed writes are logged.
pub trait SettingsStore {
    fn load_value(&self, key: &str) -> Option<Value>;

    fn save_value(&mut self, key: &str, value: Value);

    fn remove(&mut self, key: &str);
}

impl dyn SettingsStore + '_ {
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.load_value(key)?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("ignoring unreadable setting {key}: {e}");
                None
            }
        }
    }

    pub fn save<T: Serialize>(&mut self, key: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(v) => self.save_value(key, v),
            Err(e) => warn!("could not serialize setting {key}: {e}"),
        }
    }
}

/// Settings kept in `settings.json` under the data directory. The whole map
/// is rewritten atomically on every save.
pub struct JsonStore {
    base_dir: PathBuf,
    data: SettingsFile,
}

impl JsonStore {
    pub fn new() -> Result<Self> {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("kanadr");
        Self::with_base_dir(base_dir)
    }

    pub fn with_base_dir(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)?;
        let data = Self::read(&base_dir.join(SETTINGS_FILE));
        Ok(Self { base_dir, data })
    }

    fn file_path(&self) -> PathBuf {
        self.base_dir.join(SETTINGS_FILE)
    }

    fn read(path: &Path) -> SettingsFile {
        if !path.exists() {
            return SettingsFile::default();
        }
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!("could not read {}: {e}", path.display());
                return SettingsFile::default();
            }
        };
        match serde_json::from_str::<SettingsFile>(&content) {
            Ok(data) if !data.needs_reset() => data,
            Ok(_) => {
                warn!("{} has an old schema, starting fresh", path.display());
                SettingsFile::default()
            }
            Err(e) => {
                warn!("{} is corrupt, starting fresh: {e}", path.display());
                SettingsFile::default()
            }
        }
    }

    fn write(&self) -> Result<()> {
        let path = self.file_path();
        let tmp_path = path.with_extension("tmp");

        let json = serde_json::to_string_pretty(&self.data)?;
        let mut file = fs::File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;

        fs::rename(&tmp_path, &path)?;
        Ok(())
    }

    fn persist(&mut self) {
        self.data.saved_at = Some(Utc::now());
        if let Err(e) = self.write() {
            warn!("could not save settings: {e}");
        }
    }
}

impl SettingsStore for JsonStore {
    fn load_value(&self, key: &str) -> Option<Value> {
        self.data.values.get(key).cloned()
    }

    fn save_value(&mut self, key: &str, value: Value) {
        debug!("saving setting {key}");
        self.data.values.insert(key.to_string(), value);
        self.persist();
    }

    fn remove(&mut self, key: &str) {
        if self.data.values.remove(key).is_some() {
            self.persist();
        }
    }
}

/// Settings that live only for the current run.
#[derive(Default)]
pub struct MemoryStore {
    values: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingsStore for MemoryStore {
    fn load_value(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn save_value(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_test_store() -> (TempDir, JsonStore) {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        (dir, store)
    }

    #[test]
    fn test_values_survive_reopen() {
        let (dir, mut store) = make_test_store();
        {
            let s: &mut dyn SettingsStore = &mut store;
            s.save("kana_display_mode", &"katakana");
            s.save("phrases_categories", &vec!["greeting", "travel"]);
        }

        let reopened = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        let s: &dyn SettingsStore = &reopened;
        assert_eq!(s.load::<String>("kana_display_mode").as_deref(), Some("katakana"));
        assert_eq!(
            s.load::<Vec<String>>("phrases_categories"),
            Some(vec!["greeting".to_string(), "travel".to_string()])
        );
        assert!(reopened.data.saved_at.is_some());
    }

    #[test]
    fn test_missing_key_is_absent() {
        let (_dir, store) = make_test_store();
        let s: &dyn SettingsStore = &store;
        assert!(s.load::<bool>("words_auto_speak").is_none());
    }

    #[test]
    fn test_wrong_type_is_absent() {
        let mut store = MemoryStore::new();
        let s: &mut dyn SettingsStore = &mut store;
        s.save("kana_auto_speak", &"yes");
        assert!(s.load::<bool>("kana_auto_speak").is_none());
    }

    #[test]
    fn test_corrupt_file_loads_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "{ not json").unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(store.data.values.is_empty());
    }

    #[test]
    fn test_stale_schema_loads_empty() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"{"schema_version": 99, "values": {"kana_auto_speak": true}}"#,
        )
        .unwrap();
        let store = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(store.load_value("kana_auto_speak").is_none());
    }

    #[test]
    fn test_failed_write_is_swallowed() {
        let (dir, mut store) = make_test_store();
        // point the store at a directory that no longer exists
        store.base_dir = dir.path().join("gone");
        store.save_value("kana_auto_speak", Value::Bool(true));
        assert_eq!(store.load_value("kana_auto_speak"), Some(Value::Bool(true)));
        assert!(!dir.path().join("gone").exists());
    }

    #[test]
    fn test_remove_deletes_key() {
        let (dir, mut store) = make_test_store();
        store.save_value("words_practice_mode", Value::String("learning".into()));
        store.remove("words_practice_mode");
        let reopened = JsonStore::with_base_dir(dir.path().to_path_buf()).unwrap();
        assert!(reopened.load_value("words_practice_mode").is_none());
        assert!(!dir.path().join("settings.tmp").exists());
    }
}
