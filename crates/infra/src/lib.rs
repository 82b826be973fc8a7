//! Infrastructure layer: storage backends, tree persistence, config.

pub mod config;
pub mod service;
pub mod store;
pub mod tree_store;

pub use config::{DynStore, ServiceConfig};
pub use service::PermissionService;
pub use store::{FileStore, InMemoryStore, KeyValueStore, ObfuscatedStore, StorageWriteError};
pub use tree_store::{DEFAULT_TREE_KEY, PermissionTreeStore, StoreError};
