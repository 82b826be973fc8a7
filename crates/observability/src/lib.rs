//! Tracing/logging setup shared by binaries and test harnesses embedding
//! the permission crates.

/// Initialize process-wide tracing.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Like [`init`], but with an explicit default filter used when `RUST_LOG`
/// is unset (e.g. `"permtree_auth=trace"` to see every resolution).
pub fn init_with_default_filter(default_filter: &str) {
    tracing::init_with(default_filter);
}

/// Tracing configuration (filters, layers).
pub mod tracing;
