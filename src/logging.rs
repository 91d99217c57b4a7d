//! Logging setup for binaries built on top of this crate.
//!
//! The library itself only emits [`tracing`] events; it never installs a
//! subscriber. This module is a small convenience for the CLI (and for
//! embedders who want the same defaults) to opt into env-filter-driven
//! output.

use tracing_subscriber::EnvFilter;

/// Installs a `tracing-subscriber` formatter driven by `REVSTATS_LOG`
/// (falling back to `info` when unset or invalid).
///
/// Safe to call more than once; subsequent calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_env("REVSTATS_LOG").unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
