//! `permtree-auth` — token permissions and hierarchical access resolution.
//!
//! This crate is intentionally decoupled from storage and transport: it reads
//! an already-verified token payload and answers questions about it.

pub mod authorize;
pub mod claims;
pub mod permissions;
pub mod tree;

pub use authorize::{AccessExplanation, DecisionKind, combine, explain, get_actions, has_access};
pub use claims::{
    DecodeError, DecodedToken, PermissionEntry, TokenError, TokenInfo, TokenValidationError, decode_token,
    format_token_data, parse_expiration, try_format_token_data,
};
pub use permissions::PermissionPath;
pub use tree::{PermissionTree, TreeError, build_tree};

pub use permtree_core::{Action, DomainError, PermissionOptions, decode_flags, encode_flags};
