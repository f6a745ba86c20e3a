//! # Provider Lifecycle
//!
//! Starts, wires and stops the pieces a provider run needs.
//!
//! ## The ProviderSystem Pattern
//!
//! [`ProviderSystem`] is the conductor: it spawns the [`ErsStore`] actor,
//! hands a [`StoreClient`] to every registered resource kind and wraps the
//! resulting [`Registry`] in a [`Workspace`].
//!
//! ```rust,ignore
//! let system = ProviderSystem::new(&config);
//! let report = system.workspace.apply(&manifest).await?;
//! system.shutdown().await?;
//! ```
//!
//! ## Graceful Shutdown
//!
//! Every reconciler in the registry holds a clone of the store client, so the
//! store only stops once the workspace is dropped too. `shutdown` drops both,
//! then awaits the store task:
//!
//! 1. **Drop the workspace and client** - closes the last senders
//! 2. **Store detects closure** - `receiver.recv()` returns `None`
//! 3. **Await completion** - the store logs its final object count and exits
//!
//! Clones of [`ProviderSystem::client`] taken by the caller keep the store
//! alive; drop them before calling `shutdown`.
//!
//! ## Observability
//!
//! Logging is initialised once per process with
//! [`ise_reconcile::telemetry::setup_tracing_with`]. Every reconciler entry
//! point opens a span carrying the resource type and identity, and the
//! workspace logs one line per address it touches:
//!
//! ```bash
//! RUST_LOG=info ise-provider apply --manifest demos/site.toml
//! RUST_LOG=ise_reconcile=debug ise-provider apply --manifest demos/site.toml
//! ```

pub mod workspace;

pub use workspace::*;

use crate::config::ProviderConfig;
use crate::error::ProviderError;
use crate::resources::Registry;
use ise_reconcile::{ErsStore, StoreClient};
use tokio::task::JoinHandle;
use tracing::{error, info};

const STORE_BUFFER: usize = 64;

/// A running provider: the store actor plus a workspace wired to it.
pub struct ProviderSystem {
    /// Drives manifests against the store.
    pub workspace: Workspace,

    /// Direct access to the store, bypassing the reconcilers.
    pub client: StoreClient,

    handle: JoinHandle<()>,
}

impl ProviderSystem {
    /// Spawns the store for `config` and registers every resource kind.
    pub fn new(config: &ProviderConfig) -> Self {
        info!(
            base_url = %config.base_url,
            username = %config.username,
            ssl_verify = config.ssl_verify,
            use_api_gateway = config.use_api_gateway,
            use_csrf_token = config.use_csrf_token,
            "Starting provider"
        );

        let (store, client) = ErsStore::new(STORE_BUFFER);
        let store = store.with_base_url(config.ers_url());
        let handle = tokio::spawn(store.run());

        let registry = Registry::with_all_kinds(client.clone());

        Self {
            workspace: Workspace::new(registry),
            client,
            handle,
        }
    }

    /// Drops the workspace and client, then waits for the store to stop.
    pub async fn shutdown(self) -> Result<(), ProviderError> {
        info!("Shutting down provider...");

        drop(self.workspace);
        drop(self.client);

        if let Err(e) = self.handle.await {
            error!(error = %e, "Store task failed");
            return Err(ProviderError::Shutdown(e.to_string()));
        }

        info!("Provider shutdown complete.");
        Ok(())
    }
}
