use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::StoreError;

/// Flat key/value namespace shared by every instance on the machine.
///
/// Each instance writes only its own key. Readers must never observe a
/// partially written value, so writes go through [`write_atomic`](Self::write_atomic).
pub trait SharedStore {
    fn write_atomic(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
    /// Keys starting with `prefix`, in no particular order.
    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;
    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// One file per key in a directory (the system temp dir by default).
/// Writes land in a hidden temp file in the same directory and are renamed
/// over the target, which is atomic on a single filesystem.
#[derive(Debug, Clone)]
pub struct FsStore {
    dir: PathBuf,
}

impl FsStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && !key.contains(['/', '\\'])
            && key != "..";
        if !valid {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(key))
    }
}

impl Default for FsStore {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl SharedStore for FsStore {
    fn write_atomic(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let target = self.path(key)?;
        let mut tmp = tempfile::Builder::new()
            .prefix(".petwander-")
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;
        tmp.persist(&target).map_err(|e| StoreError::Io(e.error))?;
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            // An entry vanishing mid-scan is normal with concurrent writers.
            let Ok(entry) = entry else { continue };
            if let Some(name) = entry.file_name().to_str() {
                if name.starts_with(prefix) {
                    keys.push(name.to_string());
                }
            }
        }
        Ok(keys)
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        match std::fs::read(self.path(key)?) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::Missing(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.path(key)?) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::Missing(key.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// In-process store. Clones share the same map, so several coordinators in
/// one test can see each other's records.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    map: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn map(&self) -> MutexGuard<'_, BTreeMap<String, Vec<u8>>> {
        // A panicked writer cannot leave a half-inserted value behind.
        self.map.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}

impl SharedStore for MemoryStore {
    fn write_atomic(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.map().insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .map()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.map()
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::Missing(key.to_string()))
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.map()
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| StoreError::Missing(key.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fs_store_write_list_read_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());

        store.write_atomic("petwander-a-pos", b"one\n").unwrap();
        store.write_atomic("petwander-a-pos", b"two\n").unwrap();
        store.write_atomic("unrelated", b"x").unwrap();

        assert_eq!(store.list("petwander-").unwrap(), vec!["petwander-a-pos".to_string()]);
        assert_eq!(store.read("petwander-a-pos").unwrap(), b"two\n");

        store.remove("petwander-a-pos").unwrap();
        assert!(matches!(store.read("petwander-a-pos"), Err(StoreError::Missing(_))));
        assert!(matches!(store.remove("petwander-a-pos"), Err(StoreError::Missing(_))));
    }

    #[test]
    fn fs_store_leaves_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        for i in 0..20 {
            store.write_atomic("k", format!("{i}").as_bytes()).unwrap();
        }
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn fs_store_rejects_path_like_keys() {
        let store = FsStore::new(std::env::temp_dir());
        for key in ["", "../etc/passwd", "a/b", ".hidden"] {
            assert!(matches!(store.write_atomic(key, b"x"), Err(StoreError::InvalidKey(_))));
        }
    }

    #[test]
    fn memory_store_clones_share_state() {
        let a = MemoryStore::new();
        let b = a.clone();
        a.write_atomic("p-1", b"hi").unwrap();
        assert_eq!(b.read("p-1").unwrap(), b"hi");
        assert_eq!(b.list("p-").unwrap(), vec!["p-1".to_string()]);
        b.remove("p-1").unwrap();
        assert!(a.is_empty());
    }
}
