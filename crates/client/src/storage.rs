//! Durable key/value storage for the session fields.
//!
//! Only four keys are written (see [`keys`]); values are plain strings so a
//! state file written by one build stays readable by the next.
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};

use thiserror::Error;

pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USER_EMAIL: &str = "userEmail";
    pub const USER_NAME: &str = "userName";
    pub const USER_ID: &str = "userId";

    pub const ALL: [&str; 4] = [TOKEN, USER_EMAIL, USER_NAME, USER_ID];
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shared persistent storage consulted by the HTTP adapter (token) and
/// written by the session store.
pub trait SessionStorage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    /// Removes every key, not only the session ones.
    fn clear(&self) -> Result<(), StorageError>;
}

type Entries = BTreeMap<String, String>;

fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<Entries>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.entries).is_empty()
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }
}

impl SessionStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        lock(&self.entries).clear();
        Ok(())
    }
}

/// JSON file storage. The file is read once on open and rewritten on every
/// mutation.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl FileStorage {
    /// Opens the state file, starting empty when it does not exist yet or
    /// cannot be parsed. The next write replaces an unparsable file.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => Entries::new(),
            Ok(content) => match serde_json::from_str(&content) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        "unreadable session state, starting empty: {err}"
                    );
                    Entries::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Entries::new(),
            Err(err) => return Err(err.into()),
        };
        tracing::debug!(path = %path.display(), keys = entries.len(), "opened session state");
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn update<F>(&self, f: F) -> Result<(), StorageError>
    where
        F: FnOnce(&mut Entries),
    {
        let mut guard = lock(&self.entries);
        let mut next = guard.clone();
        f(&mut next);
        write_json_file(&self.path, &next)?;
        *guard = next;
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.update(|entries| {
            entries.remove(key);
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.update(Entries::clear)
    }
}

fn write_json_file(path: &Path, entries: &Entries) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(entries)?;

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, json)?;
    match fs::rename(&tmp, path) {
        Ok(()) => Ok(()),
        Err(_) => {
            fs::copy(&tmp, path)?;
            let _ = fs::remove_file(&tmp);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("financefit_storage_{}", std::process::id()))
            .join(name)
    }

    #[test]
    fn memory_storage_set_get_clear() {
        let storage = MemoryStorage::new();
        storage.set(keys::TOKEN, "t1").unwrap();
        storage.set(keys::USER_ID, "42").unwrap();
        assert_eq!(storage.get(keys::TOKEN).as_deref(), Some("t1"));
        assert_eq!(storage.len(), 2);

        storage.remove(keys::TOKEN).unwrap();
        assert_eq!(storage.get(keys::TOKEN), None);

        storage.clear().unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn file_storage_survives_reopen() {
        let path = temp_path("reopen.json");
        let _ = fs::remove_file(&path);

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get(keys::USER_NAME), None);
        storage.set(keys::USER_NAME, "Ana").unwrap();
        storage.set(keys::USER_EMAIL, "a@b.com").unwrap();
        drop(storage);

        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(keys::USER_NAME).as_deref(), Some("Ana"));
        assert_eq!(reopened.get(keys::USER_EMAIL).as_deref(), Some("a@b.com"));

        reopened.clear().unwrap();
        let cleared = FileStorage::open(&path).unwrap();
        assert_eq!(cleared.get(keys::USER_NAME), None);
    }

    #[test]
    fn file_storage_starts_empty_on_corrupt_file() {
        let path = temp_path("corrupt.json");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{\"token\":").unwrap();

        let storage = FileStorage::open(&path).unwrap();
        assert_eq!(storage.get(keys::TOKEN), None);

        storage.set(keys::TOKEN, "t2").unwrap();
        let reopened = FileStorage::open(&path).unwrap();
        assert_eq!(reopened.get(keys::TOKEN).as_deref(), Some("t2"));
    }

    #[test]
    fn failed_write_keeps_memory_in_sync_with_disk() {
        let path = temp_path("blocked.json");
        let tmp = path.with_extension("tmp");
        let _ = fs::remove_dir(&tmp);
        let _ = fs::remove_file(&path);

        let storage = FileStorage::open(&path).unwrap();
        storage.set(keys::TOKEN, "t1").unwrap();

        fs::create_dir_all(&tmp).unwrap();
        assert!(matches!(storage.clear(), Err(StorageError::Io(_))));
        assert!(storage.set(keys::USER_ID, "42").is_err());
        assert_eq!(storage.get(keys::TOKEN).as_deref(), Some("t1"));
        assert_eq!(storage.get(keys::USER_ID), None);

        let on_disk = FileStorage::open(&path).unwrap();
        assert_eq!(on_disk.get(keys::TOKEN).as_deref(), Some("t1"));

        fs::remove_dir(&tmp).unwrap();
        storage.clear().unwrap();
        assert_eq!(FileStorage::open(&path).unwrap().get(keys::TOKEN), None);
    }
}
