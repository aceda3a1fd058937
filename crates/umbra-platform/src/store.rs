//! Durable key-value store backed by a small JSON file.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use parking_lot::Mutex;
use umbra_core::{KeyValueStore, SchemeError};

/// Every `set` rewrites the whole file (temp file + rename) before
/// returning, so a successful write survives a crash.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    /// `<config dir>/umbra/preferences.json`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("umbra").join("preferences.json"))
    }

    /// Loads `path`. A missing file starts empty; so does an unreadable JSON
    /// body, which is replaced on the next write.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(body) => serde_json::from_str(&body).unwrap_or_else(|err| {
                log::warn!("ignoring corrupt preference file {}: {err}", path.display());
                BTreeMap::new()
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                return Err(err)
                    .with_context(|| format!("reading preference file {}", path.display()));
            }
        };
        log::debug!("opened {} ({} entries)", path.display(), entries.len());
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn open_default() -> anyhow::Result<Self> {
        let path = Self::default_path().context("no configuration directory on this platform")?;
        Self::open(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, entries: &BTreeMap<String, String>) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let body = serde_json::to_string_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).with_context(|| format!("writing {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, SchemeError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SchemeError> {
        let mut entries = self.entries.lock();
        let previous = entries.insert(key.to_string(), value.to_string());
        if let Err(err) = self.persist(&entries) {
            // keep memory and disk in agreement
            match previous {
                Some(prev) => entries.insert(key.to_string(), prev),
                None => entries.remove(key),
            };
            return Err(SchemeError::Storage {
                key: key.to_string(),
                reason: format!("{err:#}"),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("prefs.json")).unwrap();
        assert_eq!(store.get("__userColorScheme"), Ok(None));
    }

    #[test]
    fn test_write_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let store = FileStore::open(&path).unwrap();
        store.set("__userColorScheme", "dark").unwrap();
        assert!(path.exists());

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(
            reopened.get("__userColorScheme"),
            Ok(Some("dark".to_string()))
        );
    }

    #[test]
    fn test_corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "{ not json").unwrap();

        let store = FileStore::open(&path).unwrap();
        assert_eq!(store.get("k"), Ok(None));
        store.set("k", "light").unwrap();
        assert_eq!(
            FileStore::open(&path).unwrap().get("k"),
            Ok(Some("light".to_string()))
        );
    }

    #[test]
    fn test_failed_write_is_reported_and_rolled_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        let store = FileStore::open(&path).unwrap();
        // the temp file slot is taken by a directory, so the write fails
        fs::create_dir(dir.path().join("prefs.json.tmp")).unwrap();

        let err = store.set("k", "dark").unwrap_err();
        assert!(matches!(err, SchemeError::Storage { ref key, .. } if key == "k"));
        assert_eq!(store.get("k"), Ok(None));
        assert!(!path.exists());
    }
}
