//! Key/value storage abstractions for the persisted permission tree.

pub mod file;
pub mod in_memory;
pub mod obfuscated;

pub use file::FileStore;
pub use in_memory::InMemoryStore;
pub use obfuscated::ObfuscatedStore;

use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageWriteError {
    #[error("storage write failed for key '{key}': {message}")]
    Write { key: String, message: String },

    #[error("storage clear failed: {0}")]
    Clear(String),
}

/// Minimal string key/value store.
///
/// `get` treats every read problem as "not found"; writes report failures.
/// Implementations are synchronous and never retry.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageWriteError>;
    /// Remove every key.
    fn clear(&self) -> Result<(), StorageWriteError>;
}

impl<S> KeyValueStore for Arc<S>
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageWriteError> {
        (**self).set(key, value)
    }

    fn clear(&self) -> Result<(), StorageWriteError> {
        (**self).clear()
    }
}

impl<S> KeyValueStore for Box<S>
where
    S: KeyValueStore + ?Sized,
{
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageWriteError> {
        (**self).set(key, value)
    }

    fn clear(&self) -> Result<(), StorageWriteError> {
        (**self).clear()
    }
}
