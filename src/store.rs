//! Persistence port for ledger and archive blobs.
//!
//! The engine only ever reads a whole blob at startup and rewrites a whole
//! blob after a mutation. How the bytes are kept is up to the [`BlobStore`].

use crate::error::StoreError;
use log::debug;
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Blob key of the live ledger.
pub const LEDGER_KEY: &str = "accounts";

/// Blob key of the archive log.
pub const ARCHIVE_KEY: &str = "archive";

const BLOB_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Key-value storage of opaque blobs.
pub trait BlobStore {
    /// Returns the blob stored under `key`, or `None` if there is none yet.
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replaces the blob stored under `key`.
    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError>;
}

/// Stores each blob as `<dir>/<key>.json`.
///
/// Writes go to a temporary file that is then renamed over the target, so a
/// crash mid-write leaves the previous blob intact.
#[derive(Debug, Clone)]
pub struct FileBlobStore {
    dir: PathBuf,
}

impl FileBlobStore {
    /// Opens (and creates if needed) a blob directory.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(FileBlobStore { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", key, BLOB_EXTENSION))
    }
}

impl BlobStore for FileBlobStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let path = self.path_for(key);
        match fs::read(&path) {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No blob at {}", path.display());
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        let path = self.path_for(key);
        let tmp = path.with_extension(format!("{}.{}", BLOB_EXTENSION, TMP_SUFFIX));

        let mut file = File::create(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        fs::rename(&tmp, &path)?;

        debug!("Wrote {} bytes to {}", data.len(), path.display());
        Ok(())
    }
}

/// Keeps blobs in memory. Useful for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, Vec<u8>>,
    writes: usize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates a blob, as if written by an earlier session.
    pub fn with_blob(mut self, key: &str, data: impl Into<Vec<u8>>) -> Self {
        self.blobs.insert(key.to_string(), data.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.blobs.get(key).map(Vec::as_slice)
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl BlobStore for MemoryBlobStore {
    fn read(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn write(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError> {
        self.blobs.insert(key.to_string(), data.to_vec());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_missing_blob_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileBlobStore::open(dir.path()).unwrap();
        assert!(store.read(LEDGER_KEY).unwrap().is_none());
    }

    #[test]
    fn test_file_store_replaces_blob_without_leftovers() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileBlobStore::open(dir.path().join("nested")).unwrap();

        store.write(LEDGER_KEY, b"{\"a\":1}").unwrap();
        store.write(LEDGER_KEY, b"{}").unwrap();

        assert_eq!(store.read(LEDGER_KEY).unwrap().unwrap(), b"{}");
        assert!(store.path_for(LEDGER_KEY).ends_with("accounts.json"));

        let names: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["accounts.json".to_string()]);
    }

    #[test]
    fn test_memory_store_counts_writes() {
        let mut store = MemoryBlobStore::new().with_blob(ARCHIVE_KEY, "{}");
        assert_eq!(store.read(ARCHIVE_KEY).unwrap().unwrap(), b"{}");
        assert!(store.read(LEDGER_KEY).unwrap().is_none());

        store.write(LEDGER_KEY, b"{}").unwrap();
        assert_eq!(store.writes(), 1);
        assert_eq!(store.get(LEDGER_KEY), Some(&b"{}"[..]));
    }
}
