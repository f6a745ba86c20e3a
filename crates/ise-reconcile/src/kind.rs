//! # ResourceKind Trait
//!
//! The `ResourceKind` trait is the contract every managed ISE object type
//! implements so that the generic [`Reconciler`](crate::reconciler::Reconciler)
//! can run the identity-resolution and upsert protocol for it.
//!
//! # Architecture Note
//! The protocol (select a lookup strategy, probe for an existing object, adopt
//! it or create it, then reconcile) is identical for every kind. Only a handful
//! of facts differ: the API endpoint, which lookups the API offers, which
//! fields make up the handle, whether the API can delete, and the field
//! schema. A kind is therefore a zero-sized marker type carrying those facts
//! as associated items, and the protocol is written once against the trait.

use crate::schema::ResourceSchema;

/// How an existing remote object can be located.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// Direct `GetByID`. Requires `id`.
    ById,
    /// Direct `GetByName`. Requires `name`.
    ByName,
    /// Direct lookup by a compound natural key, e.g. dictionary + attribute name.
    ByKeys(&'static [&'static str]),
    /// Paginate the full listing and match summaries on `fields`.
    Scan { fields: &'static [&'static str] },
}

impl Lookup {
    /// Fields that must be present for this lookup to be usable.
    pub fn required_fields(&self) -> &'static [&'static str] {
        match self {
            Self::ById => &["id"],
            Self::ByName => &["name"],
            Self::ByKeys(fields) => fields,
            Self::Scan { fields } => fields,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::ById => "by_id",
            Self::ByName => "by_name",
            Self::ByKeys(_) => "by_keys",
            Self::Scan { .. } => "scan",
        }
    }
}

/// Whether the remote API can delete objects of a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteSupport {
    /// Delete is issued against the remote.
    Remote,
    /// The API has no delete; teardown only forgets the local handle.
    LocalOnly,
}

/// Trait that every managed resource type implements.
///
/// # Example
///
/// ```rust
/// use ise_reconcile::kind::{DeleteSupport, Lookup, ResourceKind};
/// use ise_reconcile::schema::{FieldBuilder, FieldType, ResourceSchema};
///
/// struct TacacsProfile;
///
/// impl ResourceKind for TacacsProfile {
///     const TYPE_NAME: &'static str = "ise_tacacs_profile";
///     const ENDPOINT: &'static str = "tacacsprofile";
///
///     fn strategies() -> Vec<Lookup> {
///         vec![Lookup::ById, Lookup::ByName]
///     }
///
///     fn schema() -> ResourceSchema {
///         ResourceSchema::builder()
///             .field(FieldBuilder::new("id", FieldType::String).computed().build())
///             .field(FieldBuilder::new("name", FieldType::String).required().build())
///             .build()
///     }
/// }
///
/// assert_eq!(TacacsProfile::DELETE, DeleteSupport::Remote);
/// assert_eq!(TacacsProfile::handle_fields(), &["id", "name"]);
/// ```
pub trait ResourceKind: Send + Sync + 'static {
    /// Declarative type name, e.g. `ise_internal_user`.
    const TYPE_NAME: &'static str;

    /// API collection the kind lives under, e.g. `internaluser`.
    const ENDPOINT: &'static str;

    const DELETE: DeleteSupport = DeleteSupport::Remote;

    /// Lookup strategies in priority order, most direct first.
    fn strategies() -> Vec<Lookup>;

    /// Fields persisted in the resource handle.
    fn handle_fields() -> &'static [&'static str] {
        &["id", "name"]
    }

    fn schema() -> ResourceSchema;

    /// Every field referenced by any strategy or by the handle.
    fn identity_fields() -> Vec<&'static str> {
        let mut fields: Vec<&'static str> = Vec::new();
        for field in Self::strategies()
            .iter()
            .flat_map(|s| s.required_fields().iter().copied())
            .chain(Self::handle_fields().iter().copied())
        {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }
}
