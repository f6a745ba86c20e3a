//! # Field Schemas
//!
//! Every resource kind declares the fields it accepts: name, type, whether the
//! user must, may or cannot set it, whether it is sensitive, and an optional
//! set of allowed values. The schema is used for two things:
//!
//! - validating a desired state before any remote call is made, and
//! - flattening a full remote object into local attributes (only schema
//!   fields are kept, so server-side noise never leaks into local state).

use crate::state::{is_present, Attributes};
use serde_json::Value;

/// Value type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Bool,
    Int,
    List,
}

impl FieldType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Bool => value.is_boolean(),
            Self::Int => value.is_i64() || value.is_u64(),
            Self::List => value.is_array(),
        }
    }
}

/// Who may set a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldMode {
    Required,
    Optional,
    /// Set by the remote only.
    Computed,
    /// The user may set it; otherwise the remote fills it in.
    OptionalComputed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub field_type: FieldType,
    pub mode: FieldMode,
    pub sensitive: bool,
    /// The remote accepts the value but never reports it back.
    pub write_only: bool,
    pub allowed: Vec<&'static str>,
    pub description: &'static str,
}

impl FieldSchema {
    /// True when the user is allowed to supply this field.
    pub fn is_settable(&self) -> bool {
        !matches!(self.mode, FieldMode::Computed)
    }
}

/// Builder for a single [`FieldSchema`].
pub struct FieldBuilder {
    field: FieldSchema,
}

impl FieldBuilder {
    pub fn new(name: &'static str, field_type: FieldType) -> Self {
        Self {
            field: FieldSchema {
                name,
                field_type,
                mode: FieldMode::Optional,
                sensitive: false,
                write_only: false,
                allowed: Vec::new(),
                description: "",
            },
        }
    }

    pub fn required(mut self) -> Self {
        self.field.mode = FieldMode::Required;
        self
    }

    pub fn optional(mut self) -> Self {
        self.field.mode = FieldMode::Optional;
        self
    }

    pub fn computed(mut self) -> Self {
        self.field.mode = FieldMode::Computed;
        self
    }

    pub fn optional_computed(mut self) -> Self {
        self.field.mode = FieldMode::OptionalComputed;
        self
    }

    /// Redacted in logs. Sensitive values come back masked, so they are
    /// also write-only.
    pub fn sensitive(mut self) -> Self {
        self.field.sensitive = true;
        self.field.write_only = true;
        self
    }

    pub fn write_only(mut self) -> Self {
        self.field.write_only = true;
        self
    }

    pub fn one_of(mut self, values: &[&'static str]) -> Self {
        self.field.allowed = values.to_vec();
        self
    }

    pub fn description(mut self, text: &'static str) -> Self {
        self.field.description = text;
        self
    }

    pub fn build(self) -> FieldSchema {
        self.field
    }
}

/// One violation found by [`ResourceSchema::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    MissingRequired(&'static str),
    WrongType {
        field: String,
        expected: FieldType,
    },
    NotAllowed {
        field: String,
        value: String,
        allowed: Vec<&'static str>,
    },
    ComputedSet(String),
    Unknown(String),
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingRequired(field) => write!(f, "`{field}` is required"),
            Self::WrongType { field, expected } => {
                write!(f, "`{field}` must be of type {expected:?}")
            }
            Self::NotAllowed {
                field,
                value,
                allowed,
            } => write!(f, "`{field}` value `{value}` is not one of {allowed:?}"),
            Self::ComputedSet(field) => write!(f, "`{field}` is computed and cannot be set"),
            Self::Unknown(field) => write!(f, "`{field}` is not a known field"),
        }
    }
}

/// Validation failure listing every violation found.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("{}", render(.violations))]
pub struct SchemaError {
    pub violations: Vec<Violation>,
}

fn render(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// The full field set of one resource kind.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceSchema {
    pub description: &'static str,
    fields: Vec<FieldSchema>,
}

impl ResourceSchema {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder {
            schema: Self::default(),
        }
    }

    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Checks a desired state. Absent optional values are not checked.
    pub fn validate(&self, desired: &Attributes) -> Result<(), SchemaError> {
        let mut violations = Vec::new();

        for field in &self.fields {
            let value = desired.get(field.name).filter(|v| is_present(v));
            match (field.mode, value) {
                (FieldMode::Required, None) => {
                    violations.push(Violation::MissingRequired(field.name));
                }
                (_, None) => {}
                (_, Some(value)) => {
                    if !field.field_type.accepts(value) {
                        violations.push(Violation::WrongType {
                            field: field.name.to_string(),
                            expected: field.field_type,
                        });
                        continue;
                    }
                    if let (false, Some(s)) = (field.allowed.is_empty(), value.as_str()) {
                        if !field.allowed.contains(&s) {
                            violations.push(Violation::NotAllowed {
                                field: field.name.to_string(),
                                value: s.to_string(),
                                allowed: field.allowed.clone(),
                            });
                        }
                    }
                }
            }
        }

        for (name, value) in desired {
            match self.field(name) {
                None => violations.push(Violation::Unknown(name.clone())),
                // `id` is computed but may be carried over from an import.
                Some(field) if !field.is_settable() && is_present(value) && name != "id" => {
                    violations.push(Violation::ComputedSet(name.clone()));
                }
                Some(_) => {}
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError { violations })
        }
    }

    /// Keeps the schema's fields from `source`, dropping everything else.
    pub fn flatten(&self, source: &Attributes) -> Attributes {
        self.fields
            .iter()
            .filter_map(|f| source.get(f.name).map(|v| (f.name.to_string(), v.clone())))
            .collect()
    }

    /// Payload fields to send on create/update: settable and present.
    pub fn payload(&self, desired: &Attributes) -> Attributes {
        self.fields
            .iter()
            .filter(|f| f.is_settable())
            .filter_map(|f| {
                desired
                    .get(f.name)
                    .filter(|v| is_present(v))
                    .map(|v| (f.name.to_string(), v.clone()))
            })
            .collect()
    }

    /// Copy of `attrs` with sensitive values masked, for logging.
    pub fn redacted(&self, attrs: &Attributes) -> Attributes {
        attrs
            .iter()
            .map(|(k, v)| match self.field(k) {
                Some(f) if f.sensitive => (k.clone(), Value::String("<redacted>".into())),
                _ => (k.clone(), v.clone()),
            })
            .collect()
    }
}

/// Builder for [`ResourceSchema`].
pub struct SchemaBuilder {
    schema: ResourceSchema,
}

impl SchemaBuilder {
    pub fn description(mut self, text: &'static str) -> Self {
        self.schema.description = text;
        self
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.schema.fields.push(field);
        self
    }

    pub fn build(self) -> ResourceSchema {
        self.schema
    }
}
