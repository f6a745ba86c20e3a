use ise_reconcile::kind::{Lookup, ResourceKind};
use ise_reconcile::schema::{FieldBuilder, FieldType, ResourceSchema};

/// Endpoint identity group.
pub struct EndpointIdentityGroup;

impl ResourceKind for EndpointIdentityGroup {
    const TYPE_NAME: &'static str = "ise_endpoint_identity_group";
    const ENDPOINT: &'static str = "endpointgroup";

    fn strategies() -> Vec<Lookup> {
        vec![Lookup::ById, Lookup::ByName]
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::builder()
            .description("Endpoint identity group")
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .field(FieldBuilder::new("description", FieldType::String).optional().build())
            .field(FieldBuilder::new("parent_id", FieldType::String).optional().build())
            .field(FieldBuilder::new("system_defined", FieldType::Bool).computed().build())
            .build()
    }
}
