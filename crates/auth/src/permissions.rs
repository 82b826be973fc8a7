use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Separator between path segments.
pub const SEPARATOR: char = '.';

/// Literal final segment marking a wildcard entry.
pub const WILDCARD_SEGMENT: &str = "*";

/// Dotted permission path (e.g. "billing.invoices.view").
///
/// Paths are opaque strings with implied hierarchy. A path whose last segment
/// is `"*"` (e.g. "billing.*") is a wildcard entry covering its whole subtree.
/// No validation happens here: an odd query (empty, `"a..b"`) simply matches
/// nothing except an identical tree key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionPath(Cow<'static, str>);

impl PermissionPath {
    pub fn new(path: impl Into<Cow<'static, str>>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    pub fn is_wildcard(&self) -> bool {
        self.0 == WILDCARD_SEGMENT || self.0.ends_with(".*")
    }

    /// Wildcard keys that cover this path, most specific first.
    ///
    /// `"a.b.c"` yields `"a.b.c.*"`, `"a.b.*"`, `"a.*"`.
    pub fn wildcard_prefixes(&self) -> WildcardPrefixes<'_> {
        wildcard_prefixes(self.as_str())
    }
}

impl core::fmt::Display for PermissionPath {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&'static str> for PermissionPath {
    fn from(value: &'static str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PermissionPath {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Iterate the wildcard keys covering `query`, most specific first.
pub fn wildcard_prefixes(query: &str) -> WildcardPrefixes<'_> {
    WildcardPrefixes {
        query,
        end: Some(query.len()),
    }
}

/// Iterator returned by [`wildcard_prefixes`].
#[derive(Debug, Clone)]
pub struct WildcardPrefixes<'a> {
    query: &'a str,
    /// Byte length of the next prefix to yield.
    end: Option<usize>,
}

impl Iterator for WildcardPrefixes<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        let end = self.end?;
        let prefix = &self.query[..end];
        self.end = prefix.rfind(SEPARATOR);
        Some(format!("{prefix}{SEPARATOR}{WILDCARD_SEGMENT}"))
    }
}
