use crate::config::ConfigError;
use crate::manifest::ManifestError;
use ise_reconcile::{ApiError, ReconcileError};

/// Errors surfaced by the provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("unknown resource type `{0}`")]
    UnknownType(String),

    #[error("{address}: type changed from {previous} to {requested}; destroy it first")]
    TypeChanged {
        address: String,
        previous: String,
        requested: String,
    },

    #[error("{address}: {source}")]
    Reconcile {
        address: String,
        #[source]
        source: ReconcileError,
    },

    #[error("{address}: cannot tell whether the object still exists: {source}")]
    RefreshFailed {
        address: String,
        #[source]
        source: ApiError,
    },

    #[error("store task failed: {0}")]
    Shutdown(String),
}

impl ProviderError {
    pub(crate) fn reconcile(address: &str) -> impl FnOnce(ReconcileError) -> Self + '_ {
        move |source| Self::Reconcile {
            address: address.to_string(),
            source,
        }
    }
}
