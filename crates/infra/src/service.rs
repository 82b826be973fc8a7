//! Permission service: current tree snapshot plus its persisted copy.
//!
//! The snapshot is an `Arc<PermissionTree>` that is only ever replaced as a
//! whole. Readers clone the `Arc` and resolve against it without holding the
//! lock, so a concurrent replacement is never observed half-done.

use std::sync::{Arc, PoisonError, RwLock};

use permtree_auth::{
    AccessExplanation, PermissionOptions, PermissionTree, TokenInfo, explain, format_token_data, get_actions,
    has_access,
};

use crate::store::{KeyValueStore, StorageWriteError};
use crate::tree_store::{PermissionTreeStore, StoreError};

pub struct PermissionService<S> {
    store: PermissionTreeStore<S>,
    current: RwLock<Option<Arc<PermissionTree>>>,
}

impl<S: KeyValueStore> PermissionService<S> {
    /// Create a service with no snapshot loaded (everything denied).
    pub fn new(store: PermissionTreeStore<S>) -> Self {
        Self {
            store,
            current: RwLock::new(None),
        }
    }

    pub fn tree_store(&self) -> &PermissionTreeStore<S> {
        &self.store
    }

    /// Current snapshot, if any.
    ///
    /// A poisoned lock reads as "no snapshot", which resolves to deny.
    pub fn snapshot(&self) -> Option<Arc<PermissionTree>> {
        self.current.read().ok().and_then(|guard| guard.clone())
    }

    fn install(&self, tree: Option<Arc<PermissionTree>>) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = tree;
    }

    pub fn has_permission(&self, path: &str) -> bool {
        has_access(self.snapshot().as_deref(), path)
    }

    pub fn get_actions(&self, path: &str) -> PermissionOptions {
        get_actions(self.snapshot().as_deref(), path)
    }

    pub fn explain(&self, path: &str) -> AccessExplanation {
        explain(self.snapshot().as_deref(), path)
    }

    /// Rehydrate the persisted tree and install it as the current snapshot.
    ///
    /// When nothing usable is stored the current snapshot is left untouched
    /// and `None` is returned.
    pub fn load_tree(&self) -> Option<Arc<PermissionTree>> {
        let tree = Arc::new(self.store.load_tree()?);
        tracing::debug!(entries = tree.len(), "loaded permission tree from storage");
        self.install(Some(tree.clone()));
        Some(tree)
    }

    /// Install `tree` as the current snapshot, then persist it.
    ///
    /// The new snapshot stays in effect even if persistence fails; the error
    /// is still returned to the caller.
    pub fn save_tree(&self, tree: PermissionTree) -> Result<(), StoreError> {
        let tree = Arc::new(tree);
        self.install(Some(tree.clone()));
        self.store.save_tree(&tree).inspect_err(|err| {
            tracing::error!(error = %err, "failed to persist permission tree; in-memory tree remains active");
        })
    }

    /// Decode `raw`, install and persist its tree.
    ///
    /// `Ok(None)` means the token carried no usable permissions; the current
    /// snapshot is left as it was.
    pub fn apply_token(&self, raw: &str) -> Result<Option<TokenInfo>, StoreError> {
        let Some(info) = format_token_data(raw) else {
            return Ok(None);
        };
        self.save_tree(info.permissions_tree.clone())?;
        Ok(Some(info))
    }

    /// Drop the current snapshot and wipe the backing store.
    pub fn clear(&self) -> Result<(), StorageWriteError> {
        self.install(None);
        self.store.clear()
    }
}

impl<S> core::fmt::Debug for PermissionService<S>
where
    S: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let entries = self
            .current
            .read()
            .ok()
            .and_then(|g| g.as_ref().map(|t| t.len()));
        f.debug_struct("PermissionService")
            .field("store", &self.store)
            .field("snapshot_entries", &entries)
            .finish()
    }
}
