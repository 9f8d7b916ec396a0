// polar-roll/src/dataset/store.rs

use super::errors::StoreError;
use log::{debug, trace};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory that holds the dataset tree and the control file.
pub const DEFAULT_DATA_ROOT: &str = "PolarData";

/// Source of dataset bytes addressed by `/`-separated storage keys such as
/// `scantling/GM=1.5m/bin/MAXROLL_H5.5_T7.5.bpolar`.
pub trait DatasetStore {
    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError>;
    fn contains(&self, key: &str) -> bool;
}

fn key_components(key: &str) -> Result<Vec<&str>, StoreError> {
    let components: Vec<&str> = key.split('/').collect();
    let valid = components
        .iter()
        .all(|c| !c.is_empty() && *c != "." && *c != ".." && !c.contains('\\'));
    if valid {
        Ok(components)
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

/// Datasets laid out on disk below a root directory.
#[derive(Clone, Debug)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, key: &str) -> Result<PathBuf, StoreError> {
        Ok(key_components(key)?
            .into_iter()
            .fold(self.root.clone(), |path, component| path.join(component)))
    }
}

impl Default for DirectoryStore {
    fn default() -> Self {
        Self::new(DEFAULT_DATA_ROOT)
    }
}

impl DatasetStore for DirectoryStore {
    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.resolve(key)?;
        trace!("Attempting to read {}", path.display());
        match fs::read(&path) {
            Ok(bytes) => {
                debug!("Read {} bytes from {}", bytes.len(), path.display());
                Ok(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(key.to_string()))
            }
            Err(source) => Err(StoreError::ReadFailure {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn contains(&self, key: &str) -> bool {
        self.resolve(key).map(|path| path.is_file()).unwrap_or(false)
    }
}

/// In-memory store, for bundled datasets and tests.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, bytes: Vec<u8>) -> &mut Self {
        self.entries.insert(key.into(), bytes);
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DatasetStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        key_components(key)?;
        self.entries
            .get(key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &str = "design/GM=1.5m/bin/MAXROLL_H5.5_T7.5.bpolar";

    #[test]
    fn test_directory_store_reads_nested_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = DirectoryStore::new(dir.path());
        let path = store.resolve(KEY).unwrap();
        assert_eq!(
            path,
            dir.path()
                .join("design")
                .join("GM=1.5m")
                .join("bin")
                .join("MAXROLL_H5.5_T7.5.bpolar")
        );
        assert!(!store.contains(KEY));
        assert!(matches!(store.read(KEY), Err(StoreError::NotFound(k)) if k == KEY));

        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, [1u8, 2, 3]).unwrap();
        assert!(store.contains(KEY));
        assert_eq!(store.read(KEY).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_rejects_escaping_keys() {
        let store = DirectoryStore::default();
        assert_eq!(store.root(), Path::new(DEFAULT_DATA_ROOT));
        for key in ["../secret", "/etc/passwd", "a//b", "a/./b", "a\\..\\b", ""] {
            assert!(
                matches!(store.read(key), Err(StoreError::InvalidKey(_))),
                "{:?} should be rejected",
                key
            );
            assert!(!store.contains(key));
        }
    }

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        store.insert(KEY, vec![9]);
        assert_eq!(store.len(), 1);
        assert!(store.contains(KEY));
        assert_eq!(store.read(KEY).unwrap(), vec![9]);
        assert!(matches!(
            store.read("design/GM=2.0m/bin/x.bpolar"),
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(store.read("../x"), Err(StoreError::InvalidKey(_))));
    }
}
