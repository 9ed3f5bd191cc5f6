//! Structured logging setup for the CLI binaries.
//!
//! The storage/buffer/rhf modules log through the plain `log` facade (see
//! `storage::disk::disk_manager`); this installs a `tracing-subscriber`
//! formatter for the `workload` binary's own spans and events. It is not
//! wired into library code - a library should never install a global
//! subscriber on behalf of its caller.

use std::sync::Once;

static INIT: Once = Once::new();

/// Installs a default `tracing-subscriber` formatter. Idempotent.
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    });
}
