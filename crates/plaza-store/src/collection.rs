use std::fs;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Mutex;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("collection file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("collection encode error: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("collection lock poisoned")]
    Poisoned,
}

/// One persisted collection: a JSON array in a single file, guarded by a
/// mutex so every read-modify-write cycle is serialized per collection.
///
/// Loads and saves always cover the whole array. A save overwrites the file
/// in place with no rename step; the mutex is what keeps concurrent requests
/// from losing each other's updates.
pub struct Collection<T> {
    path: PathBuf,
    lock: Mutex<()>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Serialize + DeserializeOwned> Collection<T> {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(Self {
            path,
            lock: Mutex::new(()),
            _marker: PhantomData,
        })
    }

    /// Read the full collection. A missing file is created holding `[]`; a
    /// file that no longer decodes is reset to `[]` and reported as empty.
    pub fn load(&self) -> Result<Vec<T>, StoreError> {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        self.load_unlocked()
    }

    /// Load, apply one mutation, and write the result back, all under the
    /// collection lock. Returns whatever the closure returns.
    pub fn update<F, R>(&self, f: F) -> Result<R, StoreError>
    where
        F: FnOnce(&mut Vec<T>) -> R,
    {
        let _guard = self.lock.lock().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.load_unlocked()?;
        let out = f(&mut records);
        self.save_unlocked(&records)?;
        Ok(out)
    }

    fn load_unlocked(&self) -> Result<Vec<T>, StoreError> {
        if !self.path.exists() {
            self.save_unlocked(&Vec::new())?;
            return Ok(Vec::new());
        }

        let raw = fs::read_to_string(&self.path)?;
        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(
                    "collection {} undecodable ({}), resetting to empty",
                    self.path.display(),
                    e
                );
                self.save_unlocked(&Vec::new())?;
                Ok(Vec::new())
            }
        }
    }

    fn save_unlocked(&self, records: &Vec<T>) -> Result<(), StoreError> {
        let data = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Entry {
        id: u32,
        text: String,
    }

    fn entry(id: u32) -> Entry {
        Entry {
            id,
            text: format!("entry {id}"),
        }
    }

    #[test]
    fn round_trips_records() {
        let dir = tempfile::tempdir().unwrap();
        let col: Collection<Entry> = Collection::open(dir.path().join("entries.json")).unwrap();

        col.update(|items| {
            items.push(entry(1));
            items.push(entry(2));
        })
        .unwrap();

        assert_eq!(col.load().unwrap(), vec![entry(1), entry(2)]);
    }

    #[test]
    fn missing_file_becomes_empty_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.json");
        let col: Collection<Entry> = Collection::open(&path).unwrap();

        assert!(col.load().unwrap().is_empty());
        // The file now exists and holds a parseable empty array.
        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Entry> = serde_json::from_str(&raw).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn corrupt_file_is_reset_to_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{not json").unwrap();

        let col: Collection<Entry> = Collection::open(&path).unwrap();
        assert!(col.load().unwrap().is_empty());

        let raw = std::fs::read_to_string(&path).unwrap();
        let parsed: Vec<Entry> = serde_json::from_str(&raw).unwrap();
        assert!(parsed.is_empty());
    }

    #[test]
    fn update_returns_closure_result() {
        let dir = tempfile::tempdir().unwrap();
        let col: Collection<Entry> = Collection::open(dir.path().join("e.json")).unwrap();

        let len = col
            .update(|items| {
                items.push(entry(7));
                items.len()
            })
            .unwrap();
        assert_eq!(len, 1);
    }

    #[test]
    fn concurrent_appends_all_survive() {
        let dir = tempfile::tempdir().unwrap();
        let col: Arc<Collection<Entry>> =
            Arc::new(Collection::open(dir.path().join("race.json")).unwrap());

        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let col = col.clone();
                std::thread::spawn(move || {
                    col.update(|items| items.push(entry(i))).unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let mut ids: Vec<u32> = col.load().unwrap().iter().map(|e| e.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..8u32).collect::<Vec<_>>());
    }
}
