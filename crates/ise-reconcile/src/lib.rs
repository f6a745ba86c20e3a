//! # ISE Reconcile
//!
//! Identity resolution and idempotent upsert for Cisco ISE configuration
//! objects. Given the desired state of one object, this crate decides whether
//! the object already exists on the ISE node, adopts it or creates it, and
//! later keeps local state in step with the remote through read, update and
//! delete.
//!
//! ## Why a generic protocol?
//!
//! Every ISE object type is managed the same way:
//!
//! 1. pick a lookup (by id, by name, by a compound key, or by scanning the
//!    paginated listing) from the identity fields that were supplied;
//! 2. probe the remote with it;
//! 3. adopt what was found, or create it;
//! 4. persist a small composite handle and resolve everything else from it.
//!
//! Only facts differ between object types, so the protocol is written once
//! in [`Reconciler`] and each type is a [`ResourceKind`] marker.
//!
//! ## Architecture Overview
//!
//! 1. **Kind Layer** ([`ResourceKind`], [`schema`]) - per-type facts and field schema
//! 2. **Protocol Layer** ([`selector`], [`probe`], [`paginate`], [`search`], [`Reconciler`])
//! 3. **SDK Layer** ([`ErsApi`]) - the vendor operations the protocol consumes
//!
//! The SDK layer has two implementations here: the [`ErsStore`] actor, an
//! in-memory stand-in for an ISE node reached through a [`StoreClient`], and
//! [`MockApi`] for call-exact tests.
//!
//! ## Example
//!
//! ```rust
//! use ise_reconcile::kind::{Lookup, ResourceKind};
//! use ise_reconcile::schema::{FieldBuilder, FieldType, ResourceSchema};
//! use ise_reconcile::{CreateOutcome, ErsStore, ReadOutcome, Reconciler};
//! use serde_json::json;
//!
//! struct TacacsProfile;
//!
//! impl ResourceKind for TacacsProfile {
//!     const TYPE_NAME: &'static str = "ise_tacacs_profile";
//!     const ENDPOINT: &'static str = "tacacsprofile";
//!
//!     fn strategies() -> Vec<Lookup> {
//!         vec![Lookup::ById, Lookup::ByName]
//!     }
//!
//!     fn schema() -> ResourceSchema {
//!         ResourceSchema::builder()
//!             .field(FieldBuilder::new("id", FieldType::String).computed().build())
//!             .field(FieldBuilder::new("name", FieldType::String).required().build())
//!             .build()
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (store, client) = ErsStore::new(16);
//!     tokio::spawn(store.run());
//!
//!     let profiles = Reconciler::<TacacsProfile, _>::new(client);
//!     let desired = serde_json::from_value(json!({ "name": "profileA" })).unwrap();
//!
//!     let first = profiles.create(&desired).await.unwrap();
//!     assert_eq!(first.outcome, CreateOutcome::Created);
//!
//!     // Running create again adopts instead of duplicating.
//!     let second = profiles.create(&desired).await.unwrap();
//!     assert_eq!(second.outcome, CreateOutcome::Adopted);
//!     assert_eq!(first.handle, second.handle);
//!
//!     let read = profiles.read(&first.handle).await.unwrap();
//!     assert!(matches!(read, ReadOutcome::Present { .. }));
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! Every operation awaits its remote calls one after the other; pages of a
//! listing are fetched in sequence. Nothing coordinates two reconcilers
//! racing on the same name: the probe-then-create window is inherent to the
//! protocol.

pub mod api;
pub mod client;
pub mod error;
pub mod handle;
pub mod kind;
pub mod message;
pub mod mock;
pub mod paginate;
pub mod probe;
pub mod reconciler;
pub mod schema;
pub mod search;
pub mod selector;
pub mod state;
pub mod store;
pub mod telemetry;

// Re-export core types for convenience
pub use api::{CreateResponse, ErsApi, PageQuery, RemoteObject, ResourceSummary, SearchPage};
pub use client::StoreClient;
pub use error::{ApiError, Operation, ReconcileError};
pub use handle::{HandleError, ResourceHandle};
pub use kind::{DeleteSupport, Lookup, ResourceKind};
pub use mock::MockApi;
pub use probe::ProbeResult;
pub use reconciler::{
    AbsenceReason, Applied, CreateOutcome, DeleteOutcome, ReadOutcome, Reconciler, Updated,
};
pub use schema::{FieldBuilder, FieldType, ResourceSchema, SchemaError};
pub use state::{Attributes, DesiredState, IdentityKey};
pub use store::ErsStore;
