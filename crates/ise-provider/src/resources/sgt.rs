use ise_reconcile::kind::{Lookup, ResourceKind};
use ise_reconcile::schema::{FieldBuilder, FieldType, ResourceSchema};

/// Security group tag.
///
/// The SGT API has no get-by-name, so a tag known only by name is found by
/// scanning the paginated listing.
pub struct Sgt;

impl ResourceKind for Sgt {
    const TYPE_NAME: &'static str = "ise_sgt";
    const ENDPOINT: &'static str = "sgt";

    fn strategies() -> Vec<Lookup> {
        vec![Lookup::ById, Lookup::Scan { fields: &["name"] }]
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::builder()
            .description("Security group tag")
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .field(FieldBuilder::new("description", FieldType::String).optional().build())
            .field(
                FieldBuilder::new("value", FieldType::Int)
                    .required()
                    .description("Tag value, -1 lets ISE pick one")
                    .build(),
            )
            .field(FieldBuilder::new("generation_id", FieldType::String).computed().build())
            .field(FieldBuilder::new("propogate_to_apic", FieldType::Bool).optional().build())
            .build()
    }
}
