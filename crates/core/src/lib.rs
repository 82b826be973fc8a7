//! `permtree-core` — permission value types and the compact flag codec.
//!
//! This crate contains **pure** primitives (no token parsing, no storage).

pub mod error;
pub mod flags;
pub mod options;

pub use error::{DomainError, DomainResult};
pub use flags::{FLAG_COUNT, decode_flags, encode_flags};
pub use options::{Action, PermissionOptions};
