//! # Resource Kinds & Registry
//!
//! One module per ISE object type, each a [`ResourceKind`] marker. The
//! [`Registry`] turns the kinds into a table keyed by type name, so the
//! workspace can dispatch a manifest entry like `type = "ise_sgt"` to the
//! right [`Reconciler`] without knowing any kind statically.
//!
//! | Type | Lookups | Delete |
//! |------|---------|--------|
//! | `ise_internal_user` | id, name | remote |
//! | `ise_network_device` | id, name | remote |
//! | `ise_tacacs_profile` | id, name | remote |
//! | `ise_endpoint_identity_group` | id, name | remote |
//! | `ise_sgt` | id, listing scan on name | remote |
//! | `ise_network_access_dictionary_attribute` | dictionary + name | remote |
//! | `ise_trusted_certificate_import` | id, listing scan on name | local only |

pub mod dictionary_attribute;
pub mod endpoint_identity_group;
pub mod internal_user;
pub mod network_device;
pub mod sgt;
pub mod tacacs_profile;
pub mod trusted_certificate;

pub use dictionary_attribute::NetworkAccessDictionaryAttribute;
pub use endpoint_identity_group::EndpointIdentityGroup;
pub use internal_user::InternalUser;
pub use network_device::NetworkDevice;
pub use sgt::Sgt;
pub use tacacs_profile::TacacsProfile;
pub use trusted_certificate::TrustedCertificateImport;

use crate::error::ProviderError;
use async_trait::async_trait;
use ise_reconcile::{
    Applied, DeleteOutcome, DesiredState, ErsApi, ReadOutcome, ReconcileError, Reconciler,
    ResourceHandle, ResourceKind, ResourceSchema, Updated,
};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Object-safe view of a [`Reconciler`], so kinds can share one table.
#[async_trait]
pub trait ResourceOps: Send + Sync {
    fn type_name(&self) -> &'static str;

    fn schema(&self) -> &ResourceSchema;

    async fn create(&self, desired: &DesiredState) -> Result<Applied, ReconcileError>;

    async fn read(&self, handle: &ResourceHandle) -> Result<ReadOutcome, ReconcileError>;

    async fn update(
        &self,
        handle: &ResourceHandle,
        desired: &DesiredState,
        changed: &BTreeSet<String>,
    ) -> Result<Updated, ReconcileError>;

    async fn delete(&self, handle: &ResourceHandle) -> Result<DeleteOutcome, ReconcileError>;
}

#[async_trait]
impl<K: ResourceKind, A: ErsApi + 'static> ResourceOps for Reconciler<K, A> {
    fn type_name(&self) -> &'static str {
        K::TYPE_NAME
    }

    fn schema(&self) -> &ResourceSchema {
        Reconciler::schema(self)
    }

    async fn create(&self, desired: &DesiredState) -> Result<Applied, ReconcileError> {
        Reconciler::create(self, desired).await
    }

    async fn read(&self, handle: &ResourceHandle) -> Result<ReadOutcome, ReconcileError> {
        Reconciler::read(self, handle).await
    }

    async fn update(
        &self,
        handle: &ResourceHandle,
        desired: &DesiredState,
        changed: &BTreeSet<String>,
    ) -> Result<Updated, ReconcileError> {
        Reconciler::update(self, handle, desired, changed).await
    }

    async fn delete(&self, handle: &ResourceHandle) -> Result<DeleteOutcome, ReconcileError> {
        Reconciler::delete(self, handle).await
    }
}

/// Resource operations keyed by type name.
#[derive(Clone, Default)]
pub struct Registry {
    kinds: BTreeMap<&'static str, Arc<dyn ResourceOps>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every kind this provider ships, all sharing `api`.
    pub fn with_all_kinds<A: ErsApi + Clone + 'static>(api: A) -> Self {
        let mut registry = Self::new();
        registry
            .register::<InternalUser, _>(api.clone())
            .register::<NetworkDevice, _>(api.clone())
            .register::<TacacsProfile, _>(api.clone())
            .register::<EndpointIdentityGroup, _>(api.clone())
            .register::<Sgt, _>(api.clone())
            .register::<NetworkAccessDictionaryAttribute, _>(api.clone())
            .register::<TrustedCertificateImport, _>(api);
        registry
    }

    pub fn register<K: ResourceKind, A: ErsApi + 'static>(&mut self, api: A) -> &mut Self {
        self.kinds
            .insert(K::TYPE_NAME, Arc::new(Reconciler::<K, A>::new(api)));
        self
    }

    /// Operations for `type_name`.
    pub fn resolve(&self, type_name: &str) -> Result<Arc<dyn ResourceOps>, ProviderError> {
        self.kinds
            .get(type_name)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownType(type_name.to_string()))
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ise_reconcile::MockApi;

    #[test]
    fn registers_every_kind_once() {
        let registry = Registry::with_all_kinds(MockApi::new());
        let names: Vec<&str> = registry.type_names().collect();
        assert_eq!(names.len(), 7);
        assert!(names.contains(&"ise_network_access_dictionary_attribute"));
        assert_eq!(
            registry.resolve("ise_sgt").unwrap().type_name(),
            "ise_sgt"
        );
        assert!(matches!(
            registry.resolve("ise_unknown"),
            Err(ProviderError::UnknownType(_))
        ));
    }

    #[test]
    fn every_schema_covers_its_identity_fields() {
        fn check<K: ResourceKind>() {
            let schema = K::schema();
            for field in K::identity_fields() {
                assert!(
                    schema.field(field).is_some(),
                    "{} is missing identity field {field}",
                    K::TYPE_NAME
                );
            }
        }
        check::<InternalUser>();
        check::<NetworkDevice>();
        check::<TacacsProfile>();
        check::<EndpointIdentityGroup>();
        check::<Sgt>();
        check::<NetworkAccessDictionaryAttribute>();
        check::<TrustedCertificateImport>();
    }
}
