//! Permission tree: flat mapping from permission path to options.
//!
//! The hierarchy is implied by the dotted paths; there is no node graph.
//! A tree is built once per token and replaced wholesale, never edited.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use permtree_core::{DomainError, PermissionOptions, decode_flags};

use crate::claims::DecodedToken;

/// Resolved permission tree.
///
/// Serializes as a plain JSON object of `path -> options`, which is the
/// persisted form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionTree(BTreeMap<String, PermissionOptions>);

impl PermissionTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&PermissionOptions> {
        self.0.get(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.0.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PermissionOptions)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Parse the persisted JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Render the persisted JSON form.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl<K: Into<String>> FromIterator<(K, PermissionOptions)> for PermissionTree {
    fn from_iter<I: IntoIterator<Item = (K, PermissionOptions)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("permission entry '{path}' has invalid flags: {source}")]
    InvalidFlags {
        path: String,
        #[source]
        source: DomainError,
    },
}

/// Build a permission tree from a decoded token payload.
///
/// Flags are decoded per entry; a single malformed flag string rejects the
/// whole token. Duplicate paths are last-write-wins.
pub fn build_tree(decoded: &DecodedToken) -> Result<PermissionTree, TreeError> {
    let mut tree = BTreeMap::new();

    for entry in &decoded.permissions {
        let options = decode_flags(&entry.flags).map_err(|source| TreeError::InvalidFlags {
            path: entry.path.clone(),
            source,
        })?;

        if tree.insert(entry.path.clone(), options).is_some() {
            tracing::debug!(path = %entry.path, "duplicate permission path in token; last entry wins");
        }
    }

    Ok(PermissionTree(tree))
}
