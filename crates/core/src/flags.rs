//! Compact flag codec.
//!
//! Tokens carry permission options as a 7-character bit string, positionally
//! mapped to `[deny, create, read, update, delete, export, print]`.
//! For example `"0100001"` is "not denied, create and print allowed".

use crate::error::{DomainError, DomainResult};
use crate::options::PermissionOptions;

/// Number of characters in an encoded flag string.
pub const FLAG_COUNT: usize = 7;

/// Decode a 7-character `'0'`/`'1'` string into permission options.
///
/// Anything other than exactly seven `'0'`/`'1'` characters is rejected
/// rather than truncated or padded.
pub fn decode_flags(flags: &str) -> DomainResult<PermissionOptions> {
    let bytes = flags.as_bytes();
    if bytes.len() != FLAG_COUNT {
        return Err(DomainError::validation(format!(
            "flags must be exactly {FLAG_COUNT} '0'/'1' characters, got {flags:?}"
        )));
    }

    let mut bits = [false; FLAG_COUNT];
    for (i, b) in bytes.iter().enumerate() {
        bits[i] = match *b {
            b'1' => true,
            b'0' => false,
            _ => {
                return Err(DomainError::validation(format!(
                    "flag {i} in {flags:?} is not '0' or '1'"
                )));
            }
        };
    }

    let [deny, create, read, update, delete, export, print] = bits;
    Ok(PermissionOptions {
        deny_access: deny,
        allow_create: create,
        allow_read: read,
        allow_update: update,
        allow_delete: delete,
        allow_export: export,
        allow_print: print,
    })
}

/// Encode permission options back into the compact flag form.
pub fn encode_flags(options: &PermissionOptions) -> String {
    [
        options.deny_access,
        options.allow_create,
        options.allow_read,
        options.allow_update,
        options.allow_delete,
        options.allow_export,
        options.allow_print,
    ]
    .iter()
    .map(|bit| if *bit { '1' } else { '0' })
    .collect()
}
