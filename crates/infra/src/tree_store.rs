//! Persistence of the resolved permission tree.

use thiserror::Error;

use permtree_auth::PermissionTree;

use crate::store::{KeyValueStore, StorageWriteError};

/// Key the tree is stored under unless configured otherwise.
pub const DEFAULT_TREE_KEY: &str = "permissionsTree";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to serialize permission tree: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Write(#[from] StorageWriteError),
}

/// Saves and rehydrates a [`PermissionTree`] through a [`KeyValueStore`].
///
/// The stored copy is independent of any in-memory tree: loading always
/// produces a fresh value.
#[derive(Debug)]
pub struct PermissionTreeStore<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PermissionTreeStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_TREE_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self { store, key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Load the stored tree. Missing or unreadable data is "no cached tree".
    pub fn load_tree(&self) -> Option<PermissionTree> {
        let raw = self.store.get(&self.key)?;
        match PermissionTree::from_json(&raw) {
            Ok(tree) => Some(tree),
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "stored permission tree is malformed; ignoring it");
                None
            }
        }
    }

    pub fn save_tree(&self, tree: &PermissionTree) -> Result<(), StoreError> {
        let json = tree.to_json()?;
        self.store.set(&self.key, &json)?;
        tracing::debug!(key = %self.key, entries = tree.len(), "saved permission tree");
        Ok(())
    }

    pub fn clear(&self) -> Result<(), StorageWriteError> {
        self.store.clear()
    }
}
