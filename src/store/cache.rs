//! # Snapshot Cache
//!
//! Best-effort JSON mirror of last-known-good reads, kept in a single file
//! under the user data directory. Stores use it to enrich the fallback
//! values they hand to the executor, so going offline shows the most recent
//! data instead of empty screens.
//!
//! Every operation is best-effort: a cache failure is logged and the read
//! path continues as if the entry were absent. The cache never fails a
//! caller.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::warn;

const CACHE_FILE: &str = "snapshot.json";

/// Key/value snapshot store backed by one JSON file
#[derive(Debug, Clone)]
pub struct SnapshotCache {
    path: PathBuf,
}

impl SnapshotCache {
    /// Open the cache at the default location
    /// (`<data dir>/fittrack/snapshot.json`), if a data dir exists
    pub fn open_default() -> Option<Self> {
        let dir = dirs::data_dir()?.join("fittrack");
        Some(Self::at(dir.join(CACHE_FILE)))
    }

    /// Open a cache at an explicit path
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read a cached value, if present and well-formed
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.read_entries()?;
        let value = entries.get(key)?.clone();
        match serde_json::from_value(value) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                warn!(%key, error = %err, "discarding malformed cache entry");
                None
            }
        }
    }

    /// Store a value under a key, replacing any previous entry
    pub fn put<T: Serialize>(&self, key: &str, value: &T) {
        let serialized = match serde_json::to_value(value) {
            Ok(v) => v,
            Err(err) => {
                warn!(%key, error = %err, "failed to serialize cache entry");
                return;
            }
        };
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(key.to_string(), serialized);
        self.write_entries(&entries);
    }

    /// Drop a cached entry
    pub fn remove(&self, key: &str) {
        if let Some(mut entries) = self.read_entries() {
            if entries.remove(key).is_some() {
                self.write_entries(&entries);
            }
        }
    }

    fn read_entries(&self) -> Option<BTreeMap<String, Value>> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(entries) => Some(entries),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "cache file unreadable, ignoring");
                None
            }
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, Value>) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = std::fs::create_dir_all(parent) {
                warn!(path = %parent.display(), error = %err, "cannot create cache directory");
                return;
            }
        }
        let raw = match serde_json::to_string_pretty(entries) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(error = %err, "cannot serialize cache");
                return;
            }
        };
        if let Err(err) = std::fs::write(&self.path, raw) {
            warn!(path = %self.path.display(), error = %err, "cache write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::at(dir.path().join("snapshot.json"));

        cache.put("glasses", &5u32);
        assert_eq!(cache.get::<u32>("glasses"), Some(5));
    }

    #[test]
    fn test_get_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::at(dir.path().join("snapshot.json"));
        assert_eq!(cache.get::<u32>("nothing"), None);
    }

    #[test]
    fn test_put_replaces_previous_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::at(dir.path().join("snapshot.json"));

        cache.put("names", &vec!["oatmeal".to_string()]);
        cache.put("names", &vec!["salad".to_string(), "soup".to_string()]);
        assert_eq!(
            cache.get::<Vec<String>>("names"),
            Some(vec!["salad".to_string(), "soup".to_string()])
        );
    }

    #[test]
    fn test_remove_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::at(dir.path().join("snapshot.json"));

        cache.put("glasses", &3u32);
        cache.remove("glasses");
        assert_eq!(cache.get::<u32>("glasses"), None);
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{ not json }").unwrap();

        let cache = SnapshotCache::at(&path);
        assert_eq!(cache.get::<u32>("glasses"), None);

        // Writes recover the file
        cache.put("glasses", &2u32);
        assert_eq!(cache.get::<u32>("glasses"), Some(2));
    }

    #[test]
    fn test_wrong_type_entry_is_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let cache = SnapshotCache::at(dir.path().join("snapshot.json"));

        cache.put("glasses", &"five");
        assert_eq!(cache.get::<u32>("glasses"), None);
    }
}
