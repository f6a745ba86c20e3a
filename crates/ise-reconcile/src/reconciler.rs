//! # Generic Reconciler
//!
//! `Reconciler<K, A>` runs the identity-resolution and idempotent-upsert
//! protocol for one resource kind `K` against one SDK client `A`. It is the
//! only place the protocol is written down; resource kinds contribute facts
//! (endpoint, strategies, handle fields, schema) and nothing else.
//!
//! ## Create
//!
//! ```text
//! Start ──► ProbingExistence ──► Adopted  ──► Done
//!                         └────► Creating ──► Done
//! ```
//!
//! Identity fields are taken from the desired state, the method selector
//! picks a lookup, and the prober runs it. A found object is adopted as is: no
//! create call is issued and the handle is built from the remote's own
//! identity. A failed probe is logged and treated as "not found".
//!
//! ## Read, Update, Delete
//!
//! These all start from a [`ResourceHandle`]. Read re-probes with the handle's
//! fields and reports absence instead of failing. Update resolves the
//! immutable id before mutating. Delete treats "already gone" as success, and
//! kinds with [`DeleteSupport::LocalOnly`] never reach the remote at all.

use crate::api::{CreateResponse, ErsApi, RemoteObject};
use crate::error::{ApiError, Operation, ReconcileError};
use crate::handle::ResourceHandle;
use crate::kind::{DeleteSupport, Lookup, ResourceKind};
use crate::probe::{probe, ProbeResult};
use crate::schema::ResourceSchema;
use crate::selector;
use crate::state::{Attributes, DesiredState, IdentityKey};
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use tracing::{debug, info, instrument, warn};

/// How `create` satisfied the desired state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    /// An object with the same identity already existed and was taken over.
    Adopted,
}

/// Result of a successful create.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    pub handle: ResourceHandle,
    /// Attributes as the remote reports them, flattened through the schema.
    pub attributes: Attributes,
    pub outcome: CreateOutcome,
}

/// Why a read found nothing.
#[derive(Debug, Clone, PartialEq)]
pub enum AbsenceReason {
    NotFound,
    /// The probe failed; the remote may still hold the object.
    ProbeFailed(ApiError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome {
    Present {
        /// Handle refreshed with the remote's current identity values.
        handle: ResourceHandle,
        attributes: Attributes,
    },
    /// The handle should be cleared so the next apply recreates the object.
    Absent(AbsenceReason),
}

/// Result of a successful update.
#[derive(Debug, Clone, PartialEq)]
pub struct Updated {
    pub handle: ResourceHandle,
    pub attributes: Attributes,
    /// Whether a remote update call was issued.
    pub applied: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// Nothing to delete remotely.
    AlreadyGone,
    /// The kind has no remote delete; only the local handle is dropped.
    LocalOnly,
}

/// Protocol driver for resource kind `K`.
pub struct Reconciler<K: ResourceKind, A: ErsApi> {
    api: A,
    schema: ResourceSchema,
    _kind: PhantomData<fn() -> K>,
}

impl<K: ResourceKind, A: ErsApi> Reconciler<K, A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            schema: K::schema(),
            _kind: PhantomData,
        }
    }

    pub fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Creates the object described by `desired`, or adopts an existing one.
    #[instrument(skip_all, fields(kind = K::TYPE_NAME))]
    pub async fn create(&self, desired: &DesiredState) -> Result<Applied, ReconcileError> {
        self.validate(desired)?;
        let key = IdentityKey::extract(desired, K::identity_fields());
        let lookup = self.pick(&key)?;

        match probe(&self.api, K::ENDPOINT, lookup, &key).await {
            ProbeResult::Found(existing) => {
                let handle = self.handle_from_remote(&existing, desired)?;
                info!(id = %existing.id, strategy = lookup.label(), %handle, "Adopted existing object");
                return Ok(Applied {
                    handle,
                    attributes: self.schema.flatten(&existing.to_attributes()),
                    outcome: CreateOutcome::Adopted,
                });
            }
            ProbeResult::NotFound => {
                debug!(strategy = lookup.label(), %key, "No existing object");
            }
            ProbeResult::Failed(e) => {
                warn!(strategy = lookup.label(), %key, error = %e, "Existence probe failed, proceeding to create");
            }
        }

        let payload = self.schema.payload(desired);
        debug!(payload = ?self.schema.redacted(&payload), "Create");
        let response = self
            .api
            .create(K::ENDPOINT, &payload)
            .await
            .map_err(|source| self.transport(Operation::Create, source))?;

        let handle = self.handle_from_create(&response, desired)?;
        info!(%handle, "Created");

        let attributes = match &response.object {
            Some(object) => self.schema.flatten(&object.to_attributes()),
            None => match self.read(&handle).await? {
                ReadOutcome::Present { attributes, .. } => attributes,
                ReadOutcome::Absent(reason) => {
                    warn!(%handle, ?reason, "Created object not readable yet, keeping desired state");
                    let mut attributes = self.schema.flatten(desired);
                    if let Some(id) = handle.id() {
                        attributes.insert("id".to_string(), id.into());
                    }
                    attributes
                }
            },
        };

        Ok(Applied {
            handle,
            attributes,
            outcome: CreateOutcome::Created,
        })
    }

    /// Refreshes local attributes from the remote.
    ///
    /// Never fails on a missing or unreachable object: both are reported as
    /// [`ReadOutcome::Absent`].
    #[instrument(skip_all, fields(kind = K::TYPE_NAME, handle = %handle))]
    pub async fn read(&self, handle: &ResourceHandle) -> Result<ReadOutcome, ReconcileError> {
        let key = handle.identity_key();
        let lookup = self.pick(&key)?;

        match probe(&self.api, K::ENDPOINT, lookup, &key).await {
            ProbeResult::Found(object) => {
                debug!(id = %object.id, strategy = lookup.label(), "Read");
                Ok(ReadOutcome::Present {
                    handle: self.refresh_handle(handle, &object)?,
                    attributes: self.schema.flatten(&object.to_attributes()),
                })
            }
            ProbeResult::NotFound => {
                info!("Remote object gone");
                Ok(ReadOutcome::Absent(AbsenceReason::NotFound))
            }
            ProbeResult::Failed(e) => {
                warn!(error = %e, "Read failed, treating object as absent");
                Ok(ReadOutcome::Absent(AbsenceReason::ProbeFailed(e)))
            }
        }
    }

    /// Pushes `desired` to the object behind `handle`.
    ///
    /// The remote update is only issued when `changed` names a settable
    /// schema field. The mutating call is always addressed by id.
    #[instrument(skip_all, fields(kind = K::TYPE_NAME, handle = %handle))]
    pub async fn update(
        &self,
        handle: &ResourceHandle,
        desired: &DesiredState,
        changed: &BTreeSet<String>,
    ) -> Result<Updated, ReconcileError> {
        self.validate(desired)?;
        let id = self.resolve_id(handle).await?;
        let mut handle = handle.with("id", &id);

        let applied = changed
            .iter()
            .any(|field| self.schema.field(field).is_some_and(|f| f.is_settable()));
        if applied {
            let payload = self.schema.payload(desired);
            debug!(%id, ?changed, payload = ?self.schema.redacted(&payload), "Update");
            let updated = self
                .api
                .update(K::ENDPOINT, &id, &payload)
                .await
                .map_err(|source| self.transport(Operation::Update, source))?;
            handle = self.refresh_handle(&handle, &updated)?;
            info!(%id, "Updated");
        } else {
            debug!(%id, ?changed, "No settable field changed, skipping remote update");
        }

        match self.read(&handle).await? {
            ReadOutcome::Present { handle, attributes } => Ok(Updated {
                handle,
                attributes,
                applied,
            }),
            ReadOutcome::Absent(_) => Err(ReconcileError::NotFound {
                kind: K::TYPE_NAME,
                key: handle.to_string(),
            }),
        }
    }

    /// Deletes the object behind `handle`. Deleting a missing object succeeds.
    ///
    /// A failed existence check also counts as gone, so the caller drops the
    /// handle even though the object may still exist remotely.
    #[instrument(skip_all, fields(kind = K::TYPE_NAME, handle = %handle))]
    pub async fn delete(&self, handle: &ResourceHandle) -> Result<DeleteOutcome, ReconcileError> {
        if K::DELETE == DeleteSupport::LocalOnly {
            info!("Remote delete unsupported, dropping local handle only");
            return Ok(DeleteOutcome::LocalOnly);
        }

        let key = handle.identity_key();
        let lookup = self.pick(&key)?;
        let id = match probe(&self.api, K::ENDPOINT, lookup, &key).await {
            ProbeResult::Found(object) => object.id,
            ProbeResult::NotFound => {
                info!("Already gone");
                return Ok(DeleteOutcome::AlreadyGone);
            }
            ProbeResult::Failed(e) => {
                warn!(error = %e, "Existence check failed, treating object as gone");
                return Ok(DeleteOutcome::AlreadyGone);
            }
        };

        match self.api.delete(K::ENDPOINT, &id).await {
            Ok(()) => {
                info!(%id, "Deleted");
                Ok(DeleteOutcome::Deleted)
            }
            Err(e) if e.is_not_found() => {
                info!(%id, "Vanished before delete");
                Ok(DeleteOutcome::AlreadyGone)
            }
            Err(source) => Err(self.transport(Operation::Delete, source)),
        }
    }

    fn validate(&self, desired: &DesiredState) -> Result<(), ReconcileError> {
        self.schema
            .validate(desired)
            .map_err(|source| ReconcileError::Validation {
                kind: K::TYPE_NAME,
                source,
            })
    }

    fn pick(&self, key: &IdentityKey) -> Result<Lookup, ReconcileError> {
        selector::pick(&K::strategies(), key).ok_or_else(|| ReconcileError::AmbiguousIdentity {
            kind: K::TYPE_NAME,
            supplied: key.field_names(),
        })
    }

    fn transport(&self, op: Operation, source: ApiError) -> ReconcileError {
        warn!(kind = K::TYPE_NAME, %op, error = %source, body = source.body().unwrap_or_default(), "Remote call failed");
        ReconcileError::Transport {
            kind: K::TYPE_NAME,
            op,
            source,
        }
    }

    /// Immutable id of the object behind `handle`.
    async fn resolve_id(&self, handle: &ResourceHandle) -> Result<String, ReconcileError> {
        if let Some(id) = handle.id() {
            return Ok(id.to_string());
        }
        let key = handle.identity_key();
        let lookup = self.pick(&key)?;
        match probe(&self.api, K::ENDPOINT, lookup, &key).await {
            ProbeResult::Found(object) => {
                debug!(id = %object.id, strategy = lookup.label(), "Resolved id");
                Ok(object.id)
            }
            ProbeResult::NotFound => Err(ReconcileError::NotFound {
                kind: K::TYPE_NAME,
                key: key.to_string(),
            }),
            ProbeResult::Failed(source) => Err(self.transport(Operation::Resolve, source)),
        }
    }

    /// Handle of an adopted object: remote values first, desired values as fallback.
    fn handle_from_remote(
        &self,
        object: &RemoteObject,
        desired: &DesiredState,
    ) -> Result<ResourceHandle, ReconcileError> {
        let fallback = IdentityKey::extract(desired, K::handle_fields().iter().copied());
        let fields = K::handle_fields()
            .iter()
            .filter_map(|field| {
                object
                    .key_value(field)
                    .or_else(|| fallback.get(field).map(str::to_string))
                    .map(|value| (field.to_string(), value))
            })
            .collect();
        self.build_handle(fields)
    }

    /// Handle of a created object: response body, then `Location`, then desired values.
    fn handle_from_create(
        &self,
        response: &CreateResponse,
        desired: &DesiredState,
    ) -> Result<ResourceHandle, ReconcileError> {
        let fallback = IdentityKey::extract(desired, K::handle_fields().iter().copied());
        let fields = K::handle_fields()
            .iter()
            .filter_map(|field| {
                let from_response = if *field == "id" {
                    response.created_id()
                } else {
                    response.object.as_ref().and_then(|o| o.key_value(field))
                };
                from_response
                    .or_else(|| fallback.get(field).map(str::to_string))
                    .map(|value| (field.to_string(), value))
            })
            .collect();
        self.build_handle(fields)
    }

    /// Overwrites every field of `handle` the remote object reports.
    fn refresh_handle(
        &self,
        handle: &ResourceHandle,
        object: &RemoteObject,
    ) -> Result<ResourceHandle, ReconcileError> {
        let mut fields = handle.fields().clone();
        for field in K::handle_fields() {
            fields.entry(field.to_string()).or_default();
        }
        for (field, value) in fields.iter_mut() {
            if let Some(remote) = object.key_value(field) {
                *value = remote;
            }
        }
        self.build_handle(fields)
    }

    fn build_handle(&self, fields: BTreeMap<String, String>) -> Result<ResourceHandle, ReconcileError> {
        ResourceHandle::new(fields).map_err(|e| match e {
            crate::handle::HandleError::Empty => ReconcileError::MissingIdentity { kind: K::TYPE_NAME },
            source => ReconcileError::Handle {
                kind: K::TYPE_NAME,
                source,
            },
        })
    }
}
