use ise_reconcile::kind::{Lookup, ResourceKind};
use ise_reconcile::schema::{FieldBuilder, FieldType, ResourceSchema};

/// TACACS+ shell profile.
pub struct TacacsProfile;

impl ResourceKind for TacacsProfile {
    const TYPE_NAME: &'static str = "ise_tacacs_profile";
    const ENDPOINT: &'static str = "tacacsprofile";

    fn strategies() -> Vec<Lookup> {
        vec![Lookup::ById, Lookup::ByName]
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::builder()
            .description("TACACS+ shell profile")
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .field(FieldBuilder::new("description", FieldType::String).optional().build())
            .field(
                FieldBuilder::new("session_attributes", FieldType::List)
                    .optional()
                    .description("Entries as `type:name=value`")
                    .build(),
            )
            .build()
    }
}
