//! Permission options: the seven flags attached to every permission path.

use serde::{Deserialize, Serialize};

/// Fine-grained action a permission entry may allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
    Export,
    Print,
}

impl Action {
    /// All actions, in flag order.
    pub const ALL: [Action; 6] = [
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
        Action::Export,
        Action::Print,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::Export => "export",
            Action::Print => "print",
        }
    }
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options attached to a permission path.
///
/// `deny_access` overrides every other field during resolution: the `allow_*`
/// flags of a denied entry may still be stored but are never honored.
///
/// Serialized with the camelCase field names used by the persisted tree
/// format (`denyAccess`, `allowCreate`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionOptions {
    pub deny_access: bool,
    pub allow_create: bool,
    pub allow_read: bool,
    pub allow_update: bool,
    pub allow_delete: bool,
    pub allow_export: bool,
    pub allow_print: bool,
}

impl PermissionOptions {
    /// Fallback value: access denied, no actions.
    pub const DENIED: PermissionOptions = PermissionOptions {
        deny_access: true,
        allow_create: false,
        allow_read: false,
        allow_update: false,
        allow_delete: false,
        allow_export: false,
        allow_print: false,
    };

    /// Access granted, no actions. Starting point for building grants.
    pub const EMPTY_GRANT: PermissionOptions = PermissionOptions {
        deny_access: false,
        ..Self::DENIED
    };

    pub fn is_denied(&self) -> bool {
        self.deny_access
    }

    /// Raw stored flag for `action`, ignoring `deny_access`.
    pub fn flag(&self, action: Action) -> bool {
        match action {
            Action::Create => self.allow_create,
            Action::Read => self.allow_read,
            Action::Update => self.allow_update,
            Action::Delete => self.allow_delete,
            Action::Export => self.allow_export,
            Action::Print => self.allow_print,
        }
    }

    /// Whether `action` is effectively allowed (always false when denied).
    pub fn allows(&self, action: Action) -> bool {
        !self.deny_access && self.flag(action)
    }

    /// Effectively allowed actions, in flag order.
    pub fn allowed_actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| self.allows(*a))
            .collect()
    }

    /// Builder-style helper to set a single action flag.
    pub fn with(mut self, action: Action, allowed: bool) -> Self {
        match action {
            Action::Create => self.allow_create = allowed,
            Action::Read => self.allow_read = allowed,
            Action::Update => self.allow_update = allowed,
            Action::Delete => self.allow_delete = allowed,
            Action::Export => self.allow_export = allowed,
            Action::Print => self.allow_print = allowed,
        }
        self
    }
}

impl Default for PermissionOptions {
    fn default() -> Self {
        Self::DENIED
    }
}
