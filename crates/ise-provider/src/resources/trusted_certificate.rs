use ise_reconcile::kind::{DeleteSupport, Lookup, ResourceKind};
use ise_reconcile::schema::{FieldBuilder, FieldType, ResourceSchema};

/// Import of a certificate into the trusted store.
///
/// The import API can only add certificates: there is no lookup by name and
/// no delete, so the import is found by scanning the listing and destroying
/// it only forgets the local handle.
pub struct TrustedCertificateImport;

impl ResourceKind for TrustedCertificateImport {
    const TYPE_NAME: &'static str = "ise_trusted_certificate_import";
    const ENDPOINT: &'static str = "trustedcertificate";
    const DELETE: DeleteSupport = DeleteSupport::LocalOnly;

    fn strategies() -> Vec<Lookup> {
        vec![Lookup::ById, Lookup::Scan { fields: &["name"] }]
    }

    fn schema() -> ResourceSchema {
        ResourceSchema::builder()
            .description("Trusted certificate import")
            .field(FieldBuilder::new("id", FieldType::String).computed().build())
            .field(FieldBuilder::new("name", FieldType::String).required().build())
            .field(FieldBuilder::new("description", FieldType::String).optional().build())
            .field(
                FieldBuilder::new("data", FieldType::String)
                    .required()
                    .write_only()
                    .description("PEM encoded certificate")
                    .build(),
            )
            .field(
                FieldBuilder::new("allow_basic_constraint_cf_false", FieldType::Bool)
                    .optional()
                    .build(),
            )
            .field(FieldBuilder::new("trust_for_ise_auth", FieldType::Bool).optional().build())
            .field(FieldBuilder::new("trust_for_client_auth", FieldType::Bool).optional().build())
            .field(
                FieldBuilder::new("trust_for_cisco_services_auth", FieldType::Bool)
                    .optional()
                    .build(),
            )
            .field(
                FieldBuilder::new("validate_certificate_extensions", FieldType::Bool)
                    .optional()
                    .build(),
            )
            .build()
    }
}
