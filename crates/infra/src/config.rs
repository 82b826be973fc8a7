//! Configuration loading.
//!
//! - `PERMTREE_STORAGE_KEY`: key the tree is stored under (default `permissionsTree`)
//! - `PERMTREE_STORE_PATH`: JSON file for durable storage; in-memory when unset
//! - `PERMTREE_OBFUSCATE`: apply the at-rest transform (default `true`)

use std::path::PathBuf;

use crate::service::PermissionService;
use crate::store::{FileStore, InMemoryStore, KeyValueStore, ObfuscatedStore};
use crate::tree_store::{DEFAULT_TREE_KEY, PermissionTreeStore};

pub const ENV_STORAGE_KEY: &str = "PERMTREE_STORAGE_KEY";
pub const ENV_STORE_PATH: &str = "PERMTREE_STORE_PATH";
pub const ENV_OBFUSCATE: &str = "PERMTREE_OBFUSCATE";

/// Type-erased store selected at runtime.
pub type DynStore = Box<dyn KeyValueStore>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    pub storage_key: String,
    pub store_path: Option<PathBuf>,
    pub obfuscate: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_TREE_KEY.to_string(),
            store_path: None,
            obfuscate: true,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let storage_key = lookup(ENV_STORAGE_KEY)
            .filter(|k| !k.trim().is_empty())
            .unwrap_or(defaults.storage_key);

        let store_path = lookup(ENV_STORE_PATH)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let obfuscate = match lookup(ENV_OBFUSCATE) {
            None => defaults.obfuscate,
            Some(raw) => match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    tracing::warn!("{ENV_OBFUSCATE}={other:?} not recognized; using default");
                    defaults.obfuscate
                }
            },
        };

        Self {
            storage_key,
            store_path,
            obfuscate,
        }
    }

    pub fn build_store(&self) -> DynStore {
        let base: DynStore = match &self.store_path {
            Some(path) => Box::new(FileStore::new(path.clone())),
            None => Box::new(InMemoryStore::new()),
        };

        if self.obfuscate {
            Box::new(ObfuscatedStore::new(base))
        } else {
            base
        }
    }
}

impl PermissionService<DynStore> {
    pub fn from_config(config: &ServiceConfig) -> Self {
        tracing::info!(
            storage_key = %config.storage_key,
            durable = config.store_path.is_some(),
            obfuscate = config.obfuscate,
            "initializing permission service"
        );
        Self::new(PermissionTreeStore::with_key(
            config.build_store(),
            config.storage_key.clone(),
        ))
    }
}
