use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;
use geocoin_core::KeyValueStore;

/// [`KeyValueStore`] persisted as one JSON object on disk. Changes are written by [`FileStore::flush`].
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)
                .with_context(|| format!("parsing saved game {}", path.display()))?,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                log::debug!("no saved game at {}, starting fresh", path.display());
                BTreeMap::new()
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading saved game {}", path.display()));
            }
        };
        Ok(Self {
            path,
            entries,
            dirty: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn flush(&mut self) -> anyhow::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let content = serde_json::to_string_pretty(&self.entries)?;
        fs::write(&self.path, content)
            .with_context(|| format!("writing saved game {}", self.path.display()))?;
        self.dirty = false;
        log::debug!("saved game to {}", self.path.display());
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_owned(), value);
        self.dirty = true;
    }

    fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.dirty = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("save.json")).unwrap();
        assert_eq!(store.get("playerPos"), None);
    }

    #[test]
    fn flushed_entries_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("playerPos", "{\"lat\":1.0,\"lng\":2.0}".to_owned());
        store.flush().unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("playerPos").as_deref(), Some("{\"lat\":1.0,\"lng\":2.0}"));
    }

    #[test]
    fn unflushed_changes_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("playerCoins", "[]".to_owned());
        drop(store);

        assert!(!path.exists());
    }

    #[test]
    fn removed_keys_stay_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");

        let mut store = FileStore::open(&path).unwrap();
        store.set("a", "1".to_owned());
        store.set("b", "2".to_owned());
        store.flush().unwrap();

        let mut store = FileStore::open(&path).unwrap();
        store.remove("a");
        store.flush().unwrap();

        let reopened = FileStore::open(&path).unwrap();
        assert_eq!(reopened.get("a"), None);
        assert_eq!(reopened.get("b").as_deref(), Some("2"));
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("save.json");
        fs::write(&path, "not json").unwrap();
        assert!(FileStore::open(&path).is_err());
    }
}
