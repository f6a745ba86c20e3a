#![allow(dead_code)]

use ise_reconcile::kind::{DeleteSupport, Lookup, ResourceKind};
use ise_reconcile::schema::{FieldBuilder, FieldType, ResourceSchema};
use ise_reconcile::{Attributes, RemoteObject};

/// Looked up by id or by name.
pub struct Profile;

impl ResourceKind for Profile {
    const TYPE_NAME: &'static str = "ise_tacacs_profile";
    const ENDPOINT: &'static str = "tacacsprofile";

    fn strategies() -> Vec<Lookup> {
        vec![Lookup::ById, Lookup::ByName]
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::builder()
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .field(FieldBuilder::new("description", FieldType::String).optional().build())
            .build()
    }
}

/// No get-by-name: found by scanning the listing.
pub struct Sgt;

impl ResourceKind for Sgt {
    const TYPE_NAME: &'static str = "ise_sgt";
    const ENDPOINT: &'static str = "sgt";

    fn strategies() -> Vec<Lookup> {
        vec![Lookup::ById, Lookup::Scan { fields: &["name"] }]
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::builder()
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .field(FieldBuilder::new("description", FieldType::String).optional().build())
            .field(FieldBuilder::new("value", FieldType::Int).required().build())
            .build()
    }
}

/// Compound natural key.
pub struct DictionaryAttribute;

impl ResourceKind for DictionaryAttribute {
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
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("dictionary_name", FieldType::String).required().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .field(
                FieldBuilder::new("data_type", FieldType::String)
                    .optional()
                    .one_of(&["STRING", "INT", "IP"])
                    .build(),
            )
            .build()
    }
}

/// The API cannot delete these.
pub struct Certificate;

impl ResourceKind for Certificate {
    const TYPE_NAME: &'static str = "ise_trusted_certificate_import";
    const ENDPOINT: &'static str = "trustedcertificate";
    const DELETE: DeleteSupport = DeleteSupport::LocalOnly;

    fn strategies() -> Vec<Lookup> {
        vec![Lookup::Scan { fields: &["name"] }]
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::builder()
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .build()
    }
}

pub fn attrs(value: serde_json::Value) -> Attributes {
    serde_json::from_value(value).expect("test attributes must be a JSON object")
}

pub fn remote(id: &str, value: serde_json::Value) -> RemoteObject {
    RemoteObject {
        id: id.to_string(),
        attributes: attrs(value),
    }
}
