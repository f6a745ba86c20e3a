//! # Workspace
//!
//! Drives a whole manifest through the reconciler, the way a declarative
//! engine would: every declared resource is created, adopted, refreshed or
//! updated in file order, undeclared ones are removed, and `destroy` tears
//! everything down in reverse.
//!
//! The workspace tracks one entry per address: the resource handle (the only
//! identity that is kept) and the last known attributes. Every refresh takes
//! the remote's attributes as they are; only write-only fields the remote never
//! reports back, like passwords or a certificate body, are carried over from
//! what was last applied.

use crate::error::ProviderError;
use crate::manifest::{Manifest, ResourceBlock};
use crate::resources::{Registry, ResourceOps};
use ise_reconcile::{
    AbsenceReason, Attributes, CreateOutcome, DeleteOutcome, DesiredState, ReadOutcome,
    ResourceHandle, ResourceSchema,
};
use std::collections::{BTreeSet, HashSet};
use tracing::{info, instrument, warn};

/// A resource the workspace manages.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedResource {
    pub address: String,
    pub type_name: String,
    pub handle: ResourceHandle,
    pub attributes: Attributes,
}

/// What happened to one address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Created,
    Adopted,
    /// Tracked object had vanished remotely and was created again.
    Recreated,
    Updated(BTreeSet<String>),
    Unchanged,
    Deleted,
    AlreadyGone,
    /// Kind cannot be deleted remotely; only tracking was dropped.
    Forgotten,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Adopted => f.write_str("adopted existing object"),
            Self::Recreated => f.write_str("recreated"),
            Self::Updated(fields) => {
                let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
                write!(f, "updated ({})", fields.join(", "))
            }
            Self::Unchanged => f.write_str("unchanged"),
            Self::Deleted => f.write_str("deleted"),
            Self::AlreadyGone => f.write_str("already gone"),
            Self::Forgotten => f.write_str("forgotten (no remote delete)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Change {
    pub address: String,
    pub action: Action,
}

/// Outcome of an apply or destroy, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub changes: Vec<Change>,
}

impl Report {
    fn push(&mut self, address: &str, action: Action) {
        info!(address, %action, "Resource reconciled");
        self.changes.push(Change {
            address: address.to_string(),
            action,
        });
    }

    /// True when nothing on the remote was touched.
    pub fn is_noop(&self) -> bool {
        self.changes.iter().all(|c| c.action == Action::Unchanged)
    }

    pub fn action(&self, address: &str) -> Option<&Action> {
        self.changes
            .iter()
            .rev()
            .find(|c| c.address == address)
            .map(|c| &c.action)
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for change in &self.changes {
            writeln!(f, "{}: {}", change.address, change.action)?;
        }
        Ok(())
    }
}

/// Declarative driver over a [`Registry`].
pub struct Workspace {
    registry: Registry,
    resources: Vec<TrackedResource>,
}

impl Workspace {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            resources: Vec::new(),
        }
    }

    /// Tracked resources in apply order.
    pub fn resources(&self) -> &[TrackedResource] {
        &self.resources
    }

    pub fn get(&self, address: &str) -> Option<&TrackedResource> {
        self.resources.iter().find(|r| r.address == address)
    }

    /// Brings the remote in line with `manifest`.
    ///
    /// Stops at the first fatal error; resources handled before it keep
    /// their new tracking state.
    #[instrument(skip_all, fields(resources = manifest.resources.len()))]
    pub async fn apply(&mut self, manifest: &Manifest) -> Result<Report, ProviderError> {
        manifest.validate()?;
        let mut report = Report::default();

        for block in &manifest.resources {
            let ops = self.registry.resolve(&block.type_name)?;
            let desired = block.desired()?;

            match self.position(&block.address) {
                Some(index) => {
                    let previous = &self.resources[index].type_name;
                    if previous != &block.type_name {
                        return Err(ProviderError::TypeChanged {
                            address: block.address.clone(),
                            previous: previous.clone(),
                            requested: block.type_name.clone(),
                        });
                    }
                    self.refresh(index, ops.as_ref(), block, &desired, &mut report)
                        .await?;
                }
                None => {
                    let tracked = self
                        .create(ops.as_ref(), block, &desired, &mut report, false)
                        .await?;
                    self.resources.push(tracked);
                }
            }
        }

        let declared: HashSet<&str> = manifest
            .resources
            .iter()
            .map(|b| b.address.as_str())
            .collect();
        let orphans: Vec<String> = self
            .resources
            .iter()
            .rev()
            .filter(|r| !declared.contains(r.address.as_str()))
            .map(|r| r.address.clone())
            .collect();
        for address in orphans {
            let action = self.remove(&address).await?;
            report.push(&address, action);
        }

        Ok(report)
    }

    /// Deletes every tracked resource, last applied first.
    #[instrument(skip_all, fields(resources = self.resources.len()))]
    pub async fn destroy(&mut self) -> Result<Report, ProviderError> {
        let mut report = Report::default();
        while let Some(address) = self.resources.last().map(|r| r.address.clone()) {
            let action = self.remove(&address).await?;
            report.push(&address, action);
        }
        Ok(report)
    }

    fn position(&self, address: &str) -> Option<usize> {
        self.resources.iter().position(|r| r.address == address)
    }

    async fn create(
        &self,
        ops: &dyn ResourceOps,
        block: &ResourceBlock,
        desired: &DesiredState,
        report: &mut Report,
        recreating: bool,
    ) -> Result<TrackedResource, ProviderError> {
        let applied = ops
            .create(desired)
            .await
            .map_err(ProviderError::reconcile(&block.address))?;
        let mut tracked = TrackedResource {
            address: block.address.clone(),
            type_name: block.type_name.clone(),
            handle: applied.handle,
            attributes: carry_over(ops.schema(), desired, applied.attributes),
        };

        match (applied.outcome, recreating) {
            (CreateOutcome::Created, false) => report.push(&block.address, Action::Created),
            (CreateOutcome::Created, true) => report.push(&block.address, Action::Recreated),
            (CreateOutcome::Adopted, _) => {
                report.push(&block.address, Action::Adopted);
                // A failed update leaves the object untracked; the next apply adopts it again.
                let changed = changed_fields(ops.schema(), desired, &tracked.attributes);
                if !changed.is_empty() {
                    self.push_update(ops, &mut tracked, desired, changed, report)
                        .await?;
                }
            }
        }
        Ok(tracked)
    }

    async fn refresh(
        &mut self,
        index: usize,
        ops: &dyn ResourceOps,
        block: &ResourceBlock,
        desired: &DesiredState,
        report: &mut Report,
    ) -> Result<(), ProviderError> {
        let tracked = &self.resources[index];
        let outcome = ops
            .read(&tracked.handle)
            .await
            .map_err(ProviderError::reconcile(&block.address))?;

        match outcome {
            ReadOutcome::Present { handle, attributes } => {
                let mut refreshed = TrackedResource {
                    handle,
                    attributes: carry_over(ops.schema(), &tracked.attributes, attributes),
                    ..tracked.clone()
                };
                let changed = changed_fields(ops.schema(), desired, &refreshed.attributes);
                if changed.is_empty() {
                    report.push(&block.address, Action::Unchanged);
                } else {
                    self.push_update(ops, &mut refreshed, desired, changed, report)
                        .await?;
                }
                self.resources[index] = refreshed;
            }
            ReadOutcome::Absent(AbsenceReason::NotFound) => {
                warn!(address = %block.address, "Tracked object is gone, recreating");
                let tracked = self.create(ops, block, desired, report, true).await?;
                self.resources[index] = tracked;
            }
            ReadOutcome::Absent(AbsenceReason::ProbeFailed(source)) => {
                return Err(ProviderError::RefreshFailed {
                    address: block.address.clone(),
                    source,
                });
            }
        }
        Ok(())
    }

    async fn push_update(
        &self,
        ops: &dyn ResourceOps,
        tracked: &mut TrackedResource,
        desired: &DesiredState,
        changed: BTreeSet<String>,
        report: &mut Report,
    ) -> Result<(), ProviderError> {
        let updated = ops
            .update(&tracked.handle, desired, &changed)
            .await
            .map_err(ProviderError::reconcile(&tracked.address))?;
        tracked.handle = updated.handle;
        tracked.attributes = carry_over(ops.schema(), desired, updated.attributes);
        let action = if updated.applied {
            Action::Updated(changed)
        } else {
            Action::Unchanged
        };
        report.push(&tracked.address, action);
        Ok(())
    }

    /// Deletes one tracked resource; tracking is dropped only on success.
    async fn remove(&mut self, address: &str) -> Result<Action, ProviderError> {
        let Some(index) = self.position(address) else {
            return Ok(Action::AlreadyGone);
        };
        let tracked = &self.resources[index];
        let ops = self.registry.resolve(&tracked.type_name)?;
        let outcome = ops
            .delete(&tracked.handle)
            .await
            .map_err(ProviderError::reconcile(address))?;
        self.resources.remove(index);

        Ok(match outcome {
            DeleteOutcome::Deleted => Action::Deleted,
            DeleteOutcome::AlreadyGone => Action::AlreadyGone,
            DeleteOutcome::LocalOnly => Action::Forgotten,
        })
    }
}

/// Fresh remote attributes, completed with the write-only values from `prior`.
///
/// Everything the remote can report comes from `fresh` alone, so a field
/// cleared remotely stays cleared and shows up in the next diff.
fn carry_over(schema: &ResourceSchema, prior: &Attributes, fresh: Attributes) -> Attributes {
    let mut merged = fresh;
    for field in schema.fields().iter().filter(|f| f.write_only) {
        match prior.get(field.name) {
            Some(value) => merged.insert(field.name.to_string(), value.clone()),
            None => merged.remove(field.name),
        };
    }
    merged
}

/// Settable fields whose desired value differs from `current`.
///
/// Fields left out of the desired state are not compared.
fn changed_fields(
    schema: &ResourceSchema,
    desired: &DesiredState,
    current: &Attributes,
) -> BTreeSet<String> {
    schema
        .payload(desired)
        .into_iter()
        .filter(|(name, value)| current.get(name) != Some(value))
        .map(|(name, _)| name)
        .collect()
}
