//! JSON-file backed store (durable across restarts).

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::Context;
use tempfile::NamedTempFile;

use super::{KeyValueStore, StorageWriteError};

/// Store persisting all keys as one JSON object in a single file.
///
/// Every operation re-reads the file, so several handles on the same path see
/// each other's writes. Writes go to a uniquely named sibling temp file that
/// is renamed into place, so a reader never sees a partial file.
///
/// The write lock belongs to the handle. Two handles on the same path that
/// write at the same moment can each read the old contents, and the later
/// rename drops the other's key. Share one handle per path when writers
/// overlap.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    /// Serializes read-modify-write cycles through this handle.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> anyhow::Result<BTreeMap<String, String>> {
        let data = match std::fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(err) => {
                return Err(err).with_context(|| format!("failed to read store file {:?}", self.path));
            }
        };

        if data.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        serde_json::from_str(&data).with_context(|| format!("store file {:?} is not a JSON object of strings", self.path))
    }

    fn write_all(&self, map: &BTreeMap<String, String>) -> anyhow::Result<()> {
        let dir = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create store directory at {:?}", parent))?;
                parent
            }
            None => Path::new("."),
        };

        let payload = serde_json::to_string_pretty(map).context("failed to serialize store contents")?;
        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("failed to create temp file in {:?}", dir))?;
        tmp.write_all(payload.as_bytes())
            .with_context(|| format!("failed to write {:?}", tmp.path()))?;
        tmp.persist(&self.path)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to move temp file into place at {:?}", self.path))?;
        Ok(())
    }

    fn set_inner(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let mut map = self.read_all()?;
        map.insert(key.to_string(), value.to_string());
        self.write_all(&map)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        match self.read_all() {
            Ok(mut map) => map.remove(key),
            Err(err) => {
                tracing::warn!(key, "failed to read file store: {err:#}");
                None
            }
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageWriteError> {
        self.set_inner(key, value).map_err(|err| {
            tracing::error!(key, "failed to write file store: {err:#}");
            StorageWriteError::Write {
                key: key.to_string(),
                message: format!("{err:#}"),
            }
        })
    }

    fn clear(&self) -> Result<(), StorageWriteError> {
        let _guard = self.write_lock.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageWriteError::Clear(format!(
                "failed to remove {:?}: {err}",
                self.path
            ))),
        }
    }
}
