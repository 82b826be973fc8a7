//! Reversible at-rest transform for stored values.
//!
//! This is base64, not encryption. It keeps the stored tree from being
//! casually readable and provides no confidentiality or integrity.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use super::{KeyValueStore, StorageWriteError};

pub fn obfuscate(text: &str) -> String {
    STANDARD.encode(text)
}

/// Inverse of [`obfuscate`]. `None` when the input is not something
/// [`obfuscate`] could have produced.
pub fn reveal(text: &str) -> Option<String> {
    let bytes = STANDARD.decode(text).ok()?;
    String::from_utf8(bytes).ok()
}

/// Store wrapper applying [`obfuscate`] on write and [`reveal`] on read.
#[derive(Debug, Default)]
pub struct ObfuscatedStore<S> {
    inner: S,
}

impl<S> ObfuscatedStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: KeyValueStore> KeyValueStore for ObfuscatedStore<S> {
    fn get(&self, key: &str) -> Option<String> {
        let stored = self.inner.get(key)?;
        // An empty stored value counts as absent.
        if stored.is_empty() {
            return None;
        }
        let revealed = reveal(&stored);
        if revealed.is_none() {
            tracing::warn!(key, "stored value is not in the obfuscated format; ignoring it");
        }
        revealed
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageWriteError> {
        self.inner.set(key, &obfuscate(value))
    }

    fn clear(&self) -> Result<(), StorageWriteError> {
        self.inner.clear()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;

    #[test]
    fn reveal_inverts_obfuscate() {
        let text = r#"{"a.*":{"denyAccess":false}}"#;
        assert_eq!(reveal(&obfuscate(text)).as_deref(), Some(text));
    }

    #[test]
    fn stored_value_is_not_plain_text() {
        let store = ObfuscatedStore::new(InMemoryStore::new());
        store.set("k", "secret-ish").unwrap();

        assert_ne!(store.inner().get("k").as_deref(), Some("secret-ish"));
        assert_eq!(store.get("k").as_deref(), Some("secret-ish"));
    }

    #[test]
    fn foreign_values_read_as_absent() {
        let store = ObfuscatedStore::new(InMemoryStore::new());
        store.inner().set("k", "not base64 !!").unwrap();
        store.inner().set("empty", "").unwrap();

        assert_eq!(store.get("k"), None);
        assert_eq!(store.get("empty"), None);
    }

    #[test]
    fn clear_passes_through() {
        let store = ObfuscatedStore::new(InMemoryStore::new());
        store.set("k", "v").unwrap();
        store.clear().unwrap();
        assert!(store.inner().is_empty());
    }
}
