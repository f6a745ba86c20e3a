//! # Observability & Tracing
//!
//! Structured logging for the reconciler and everything built on it.
//!
//! Every reconciler entry point opens a span carrying the resource `kind`
//! (and the `handle` for read/update/delete), so a log line from the prober
//! or the paginator is always attributable to the operation that caused it.
//!
//! ## What Gets Traced
//!
//! - **Create flow**: chosen strategy, adopt vs create, the new handle
//! - **Probes**: strategy, key, pages fetched, listing matches
//! - **Failures**: the operation, the error and the raw response body
//! - **Store**: startup, every request, shutdown with the final size
//!
//! ## Usage
//!
//! ```bash
//! RUST_LOG=info ise-provider apply --manifest demo.toml
//! RUST_LOG=debug ise-provider apply --manifest demo.toml   # payloads, redacted
//! RUST_LOG=ise_reconcile::paginate=debug ise-provider apply --manifest demo.toml
//! ```
//!
//! Payloads are only logged at `debug`, and always through
//! [`ResourceSchema::redacted`](crate::schema::ResourceSchema::redacted).

use tracing_subscriber::EnvFilter;

/// Initializes logging from `RUST_LOG`, defaulting to `info`.
pub fn setup_tracing() {
    setup_tracing_with(false);
}

/// Like [`setup_tracing`], but defaults to `debug` when `debug` is set.
///
/// An explicit `RUST_LOG` always wins. Calling this twice is harmless.
pub fn setup_tracing_with(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false) // kind and endpoint fields already say where a line comes from
        .compact()
        .try_init();
}
