use ise_reconcile::kind::{Lookup, ResourceKind};
use ise_reconcile::schema::{FieldBuilder, FieldType, ResourceSchema};

/// A network access device (switch, WLC, VPN head end) talking RADIUS or
/// TACACS+ to ISE.
pub struct NetworkDevice;

impl ResourceKind for NetworkDevice {
    const TYPE_NAME: &'static str = "ise_network_device";
    const ENDPOINT: &'static str = "networkdevice";

    fn strategies() -> Vec<Lookup> {
        vec![Lookup::ById, Lookup::ByName]
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::builder()
            .description("Network access device")
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .field(FieldBuilder::new("description", FieldType::String).optional().build())
            .field(
                FieldBuilder::new("network_device_iplist", FieldType::List)
                    .required()
                    .description("Addresses as `ip/mask` strings")
                    .build(),
            )
            .field(
                FieldBuilder::new("network_device_group_list", FieldType::List)
                    .optional_computed()
                    .build(),
            )
            .field(
                FieldBuilder::new("profile_name", FieldType::String)
                    .optional_computed()
                    .build(),
            )
            .field(FieldBuilder::new("model_name", FieldType::String).optional().build())
            .field(FieldBuilder::new("software_version", FieldType::String).optional().build())
            .field(FieldBuilder::new("coa_port", FieldType::Int).optional_computed().build())
            .field(
                FieldBuilder::new("radius_shared_secret", FieldType::String)
                    .optional()
                    .sensitive()
                    .build(),
            )
            .field(
                FieldBuilder::new("tacacs_shared_secret", FieldType::String)
                    .optional()
                    .sensitive()
                    .build(),
            )
            .field(
                FieldBuilder::new("tacacs_connect_mode", FieldType::String)
                    .optional()
                    .one_of(&["OFF", "ON_LEGACY", "ON_DRAFT_COMPLIANT"])
                    .build(),
            )
            .build()
    }
}
