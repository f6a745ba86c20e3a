//! # ISE Provider
//!
//! Declarative management of Cisco ISE configuration objects on top of
//! [`ise_reconcile`].
//!
//! - **[config]**: connection settings from a TOML file and `ISE_*` variables.
//! - **[manifest]**: the desired state, one `[[resource]]` block per object.
//! - **[resources]**: the supported object types and the [`Registry`](resources::Registry)
//!   that dispatches on type name.
//! - **[lifecycle]**: [`ProviderSystem`](lifecycle::ProviderSystem) and the
//!   [`Workspace`](lifecycle::Workspace) that applies and destroys manifests.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod manifest;
pub mod resources;

pub use error::ProviderError;
