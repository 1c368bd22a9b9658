//! Most-recent-first list of stored logo references.
//!
//! The list is deduplicated and capped: adding a reference moves it to the
//! front, and entries beyond the capacity fall off the end. Storage is
//! always injected, so there is no process-wide default list.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;

/// Default number of entries kept.
pub const DEFAULT_RECENT_CAPACITY: usize = 10;

#[derive(Debug, Error)]
pub enum RecentStoreError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed recent list in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Backend holding the persisted list.
pub trait RecentStorage {
    fn load(&self) -> Result<Vec<String>, RecentStoreError>;
    fn save(&self, references: &[String]) -> Result<(), RecentStoreError>;
}

/// In-memory backend. Clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Arc<Mutex<Vec<String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries<I, T>(entries: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            entries: Arc::new(Mutex::new(entries.into_iter().map(Into::into).collect())),
        }
    }
}

impl RecentStorage for MemoryStorage {
    fn load(&self) -> Result<Vec<String>, RecentStoreError> {
        let entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(entries.clone())
    }

    fn save(&self, references: &[String]) -> Result<(), RecentStoreError> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        *entries = references.to_vec();
        Ok(())
    }
}

/// JSON array of strings in a single file. A missing file is an empty list.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> RecentStoreError {
        RecentStoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl RecentStorage for JsonFileStorage {
    fn load(&self) -> Result<Vec<String>, RecentStoreError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };
        serde_json::from_str(&contents).map_err(|source| RecentStoreError::Json {
            path: self.path.clone(),
            source,
        })
    }

    fn save(&self, references: &[String]) -> Result<(), RecentStoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| self.io_error(e))?;
        }
        let payload = serde_json::to_string_pretty(references).map_err(|source| {
            RecentStoreError::Json {
                path: self.path.clone(),
                source,
            }
        })?;
        fs::write(&self.path, payload).map_err(|e| self.io_error(e))
    }
}

/// The recent-image list over an injected storage backend.
///
/// Reads are served from an in-memory copy loaded at construction; every
/// mutation is written through to the backend.
#[derive(Debug)]
pub struct RecentImages<S> {
    storage: S,
    capacity: usize,
    entries: Vec<String>,
}

impl<S: RecentStorage> RecentImages<S> {
    /// Load the list from `storage`, trimming it to `capacity` if the backend
    /// holds more (for instance after the capacity was lowered).
    pub fn open(storage: S, capacity: usize) -> Result<Self, RecentStoreError> {
        let capacity = capacity.max(1);
        let mut entries = storage.load()?;
        if entries.len() > capacity {
            entries.truncate(capacity);
            storage.save(&entries)?;
        }
        Ok(Self {
            storage,
            capacity,
            entries,
        })
    }

    pub fn count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(String::as_str)
    }

    pub fn all(&self) -> &[String] {
        &self.entries
    }

    /// Move `reference` to the front, dropping the oldest entries beyond the
    /// capacity.
    pub fn add(&mut self, reference: impl Into<String>) -> Result<(), RecentStoreError> {
        let reference = reference.into();
        let mut entries = Vec::with_capacity(self.entries.len() + 1);
        entries.push(reference.clone());
        entries.extend(self.entries.iter().filter(|e| **e != reference).cloned());

        if entries.len() > self.capacity {
            let dropped = entries.split_off(self.capacity);
            log::debug!("recent list trimmed, dropped {:?}", dropped);
        }

        self.storage.save(&entries)?;
        self.entries = entries;
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recents(capacity: usize) -> RecentImages<MemoryStorage> {
        RecentImages::open(MemoryStorage::new(), capacity).unwrap()
    }

    #[test]
    fn test_add_prepends() {
        let mut list = recents(10);
        list.add("a").unwrap();
        list.add("b").unwrap();
        assert_eq!(list.all(), &["b", "a"]);
        assert_eq!(list.count(), 2);
        assert_eq!(list.get(0), Some("b"));
        assert_eq!(list.get(2), None);
    }

    #[test]
    fn test_add_deduplicates() {
        let mut list = recents(10);
        for r in ["a", "b", "c", "a"] {
            list.add(r).unwrap();
        }
        assert_eq!(list.all(), &["a", "c", "b"]);
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut list = recents(DEFAULT_RECENT_CAPACITY);
        for i in 0..12 {
            list.add(format!("logo-{}", i)).unwrap();
        }
        assert_eq!(list.count(), 10);
        assert_eq!(list.get(0), Some("logo-11"));
        assert_eq!(list.get(9), Some("logo-2"));
    }

    #[test]
    fn test_readding_at_capacity_keeps_count() {
        let mut list = recents(3);
        for r in ["a", "b", "c"] {
            list.add(r).unwrap();
        }
        list.add("a").unwrap();
        assert_eq!(list.all(), &["a", "c", "b"]);
    }

    #[test]
    fn test_writes_through_to_storage() {
        let storage = MemoryStorage::new();
        let mut list = RecentImages::open(storage.clone(), 10).unwrap();
        list.add("x").unwrap();
        assert_eq!(storage.load().unwrap(), vec!["x".to_string()]);
    }

    #[test]
    fn test_open_trims_oversized_backend() {
        let storage = MemoryStorage::with_entries(["a", "b", "c", "d"]);
        let list = RecentImages::open(storage.clone(), 2).unwrap();
        assert_eq!(list.all(), &["a", "b"]);
        assert_eq!(storage.load().unwrap().len(), 2);
    }

    #[test]
    fn test_json_file_storage_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("state").join("recents.json"));
        assert!(storage.load().unwrap().is_empty());

        let mut list = RecentImages::open(storage.clone(), 10).unwrap();
        list.add("/logos/one.png").unwrap();
        list.add("/logos/two.png").unwrap();

        let reopened = RecentImages::open(storage, 10).unwrap();
        assert_eq!(reopened.all(), &["/logos/two.png", "/logos/one.png"]);
    }

    #[test]
    fn test_json_file_storage_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recents.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStorage::new(&path).load(),
            Err(RecentStoreError::Json { .. })
        ));
    }
}
