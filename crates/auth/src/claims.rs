//! Token payload model (transport-agnostic).
//!
//! Signature verification happens upstream. This module only reads the
//! payload segment of an already-verified `header.payload.signature` token.

use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::tree::{PermissionTree, TreeError, build_tree};

/// Token segments use base64url without padding, but some issuers pad or use
/// the standard alphabet; accept either.
const PAYLOAD_URL_SAFE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);
const PAYLOAD_STANDARD: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// One raw encoded permission: a dotted path plus its 7-character flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    #[serde(rename = "p")]
    pub path: String,
    #[serde(rename = "o")]
    pub flags: String,
}

impl PermissionEntry {
    pub fn new(path: impl Into<String>, flags: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            flags: flags.into(),
        }
    }
}

/// Decoded token payload. Only lives for the duration of a decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedToken {
    pub permissions: Vec<PermissionEntry>,

    /// Expiration, Unix epoch seconds (UTC).
    pub exp: i64,

    /// Issued-at, Unix epoch seconds (UTC).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("token has no payload segment")]
    MissingPayload,

    #[error("token payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("token payload is not a valid permissions document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("timestamp {0} is out of range")]
    Timestamp(i64),
}

/// Any reason a raw token could not be turned into [`TokenInfo`].
#[derive(Debug, Error)]
pub enum TokenError {
    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Tree(#[from] TreeError),
}

/// Decode the payload segment of a `header.payload.signature` token.
pub fn decode_token(raw: &str) -> Result<DecodedToken, DecodeError> {
    let payload = raw
        .trim()
        .split('.')
        .nth(1)
        .filter(|segment| !segment.is_empty())
        .ok_or(DecodeError::MissingPayload)?;

    let bytes = match PAYLOAD_URL_SAFE.decode(payload) {
        Ok(bytes) => bytes,
        Err(url_err) => PAYLOAD_STANDARD.decode(payload).map_err(|_| url_err)?,
    };

    Ok(serde_json::from_slice(&bytes)?)
}

/// Convert a Unix-seconds claim into an absolute UTC instant.
pub fn parse_expiration(exp: i64) -> Result<DateTime<Utc>, DecodeError> {
    exp.checked_mul(1000)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .ok_or(DecodeError::Timestamp(exp))
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenValidationError {
    #[error("token has expired")]
    Expired,

    #[error("token not yet valid (issued_at is in the future)")]
    NotYetValid,

    #[error("invalid token time window (expiration <= issued_at)")]
    InvalidTimeWindow,
}

/// Formatted token data: the permission tree plus its validity window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub expiration: DateTime<Utc>,
    pub issued_at: Option<DateTime<Utc>>,
    pub permissions_tree: PermissionTree,
}

impl TokenInfo {
    pub fn from_decoded(decoded: &DecodedToken) -> Result<Self, TokenError> {
        let permissions_tree = build_tree(decoded)?;
        let expiration = parse_expiration(decoded.exp)?;
        let issued_at = decoded.iat.map(parse_expiration).transpose()?;

        Ok(Self {
            expiration,
            issued_at,
            permissions_tree,
        })
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expiration
    }

    /// Check the token time window against `now`.
    ///
    /// Building a `TokenInfo` never consults the clock; callers that care about
    /// expiry call this explicitly.
    pub fn validate(&self, now: DateTime<Utc>) -> Result<(), TokenValidationError> {
        if let Some(issued_at) = self.issued_at {
            if self.expiration <= issued_at {
                return Err(TokenValidationError::InvalidTimeWindow);
            }
            if now < issued_at {
                return Err(TokenValidationError::NotYetValid);
            }
        }
        if self.is_expired(now) {
            return Err(TokenValidationError::Expired);
        }
        Ok(())
    }
}

/// Decode a raw token and build its permission tree.
pub fn try_format_token_data(raw: &str) -> Result<TokenInfo, TokenError> {
    let decoded = decode_token(raw)?;
    TokenInfo::from_decoded(&decoded)
}

/// Decode a raw token, returning `None` when no token info is available.
///
/// Failures are logged and swallowed here: this is the boundary where a bad
/// token becomes "no permissions" instead of an error.
pub fn format_token_data(raw: &str) -> Option<TokenInfo> {
    match try_format_token_data(raw) {
        Ok(info) => {
            tracing::debug!(
                entries = info.permissions_tree.len(),
                expiration = %info.expiration,
                "decoded permission token"
            );
            Some(info)
        }
        Err(err) => {
            tracing::warn!(error = %err, "invalid permission token");
            None
        }
    }
}
