use std::collections::HashMap;
use std::sync::RwLock;

use super::{KeyValueStore, StorageWriteError};

/// In-memory store. Session-scoped: contents die with the process.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        let map = self.inner.read().ok()?;
        map.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageWriteError> {
        let mut map = self.inner.write().map_err(|_| StorageWriteError::Write {
            key: key.to_string(),
            message: "store lock poisoned".to_string(),
        })?;
        map.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageWriteError> {
        let mut map = self
            .inner
            .write()
            .map_err(|_| StorageWriteError::Clear("store lock poisoned".to_string()))?;
        map.clear();
        Ok(())
    }
}
