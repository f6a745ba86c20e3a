use ise_reconcile::kind::{Lookup, ResourceKind};
use ise_reconcile::schema::{FieldBuilder, FieldType, ResourceSchema};

/// A user in the ISE internal identity store.
///
/// Looked up by id, then by name. The password is write-only: ISE masks it
/// on every read.
pub struct InternalUser;

impl ResourceKind for InternalUser {
    const TYPE_NAME: &'static str = "ise_internal_user";
    const ENDPOINT: &'static str = "internaluser";

    fn strategies() -> Vec<Lookup> {
        vec![Lookup::ById, Lookup::ByName]
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::builder()
            .description("Internal identity store user")
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .field(
                FieldBuilder::new("password", FieldType::String)
                    .required()
                    .sensitive()
                    .build(),
            )
            .field(
                FieldBuilder::new("enable_password", FieldType::String)
                    .optional()
                    .sensitive()
                    .build(),
            )
            .field(FieldBuilder::new("description", FieldType::String).optional().build())
            .field(FieldBuilder::new("first_name", FieldType::String).optional().build())
            .field(FieldBuilder::new("last_name", FieldType::String).optional().build())
            .field(FieldBuilder::new("email", FieldType::String).optional().build())
            .field(FieldBuilder::new("enabled", FieldType::Bool).optional_computed().build())
            .field(FieldBuilder::new("change_password", FieldType::Bool).optional().build())
            .field(
                FieldBuilder::new("identity_groups", FieldType::String)
                    .optional()
                    .description("Comma separated identity group ids")
                    .build(),
            )
            .field(
                FieldBuilder::new("password_id_store", FieldType::String)
                    .optional_computed()
                    .one_of(&["Internal Users"])
                    .build(),
            )
            .build()
    }
}
