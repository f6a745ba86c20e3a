use ise_reconcile::kind::{Lookup, ResourceKind};
use ise_reconcile::schema::{FieldBuilder, FieldType, ResourceSchema};

/// Attribute of a network access dictionary.
///
/// Attribute names are only unique inside their dictionary, so the kind is
/// identified by the pair (`dictionary_name`, `name`) and the handle keeps
/// exactly that pair.
pub struct NetworkAccessDictionaryAttribute;

impl ResourceKind for NetworkAccessDictionaryAttribute {
    const TYPE_NAME: &'static str = "ise_network_access_dictionary_attribute";
    const ENDPOINT: &'static str = "dictionaryattribute";

    fn strategies() -> Vec<Lookup> {
        vec![Lookup::ByKeys(&["dictionary_name", "name"])]
    }

    fn handle_fields() -> &'static [&'static str] {
        &["dictionary_name", "name"]
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::builder()
            .description("Network access dictionary attribute")
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("dictionary_name", FieldType::String).required().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .field(FieldBuilder::new("description", FieldType::String).optional().build())
            .field(FieldBuilder::new("internal_name", FieldType::String).optional_computed().build())
            .field(
                FieldBuilder::new("data_type", FieldType::String)
                    .required()
                    .one_of(&[
                        "BOOLEAN", "DATE", "FLOAT", "INT", "IP", "IPV4", "IPV6", "LONG",
                        "OCTET_STRING", "STRING", "UINT32", "UINT64",
                    ])
                    .build(),
            )
            .field(
                FieldBuilder::new("direction_type", FieldType::String)
                    .optional()
                    .one_of(&["IN", "OUT", "NONE", "BOTH"])
                    .build(),
            )
            .field(FieldBuilder::new("allowed_values", FieldType::List).optional().build())
            .build()
    }
}
