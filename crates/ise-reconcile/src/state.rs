//! # Desired State & Identity Keys
//!
//! A resource instance is described by a flat map of field name to JSON value.
//! The same shape is used for user input ([`DesiredState`]) and for the
//! attributes flattened back out of a remote object.

use serde_json::Value;
use std::collections::BTreeMap;

/// Field name to value, ordered by field name.
pub type Attributes = BTreeMap<String, Value>;

/// User-supplied configuration for one resource instance.
///
/// Built fresh on every plan/apply cycle and never persisted.
pub type DesiredState = Attributes;

/// Returns true when `value` counts as supplied.
///
/// `null`, the empty string and the empty list are treated as absent, which is
/// how optional fields arrive when the user leaves them out.
pub fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// Returns the field's value if it is present.
pub fn present<'a>(attrs: &'a Attributes, field: &str) -> Option<&'a Value> {
    attrs.get(field).filter(|v| is_present(v))
}

/// Renders an identity value as the plain string used in lookups and handles.
pub fn key_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Identity fields extracted from a desired state or a handle.
///
/// Only fields that are present are kept, so `contains` doubles as the
/// presence check used by the method selector.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityKey {
    fields: BTreeMap<String, String>,
}

impl IdentityKey {
    /// Keeps the present values of `fields` from `attrs`.
    pub fn extract<'f>(attrs: &Attributes, fields: impl IntoIterator<Item = &'f str>) -> Self {
        let fields = fields
            .into_iter()
            .filter_map(|f| present(attrs, f).map(|v| (f.to_string(), key_string(v))))
            .collect();
        Self { fields }
    }

    pub fn from_map(fields: BTreeMap<String, String>) -> Self {
        let fields = fields.into_iter().filter(|(_, v)| !v.is_empty()).collect();
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    pub fn name(&self) -> Option<&str> {
        self.get("name")
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field_names(&self) -> Vec<String> {
        self.fields.keys().cloned().collect()
    }

    /// Restricts the key to the given fields.
    pub fn subset(&self, fields: &[&str]) -> BTreeMap<String, String> {
        fields
            .iter()
            .filter_map(|f| self.fields.get(*f).map(|v| (f.to_string(), v.clone())))
            .collect()
    }
}

impl std::fmt::Display for IdentityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn empty_values_are_not_present() {
        assert!(!is_present(&Value::Null));
        assert!(!is_present(&json!("")));
        assert!(!is_present(&json!([])));
        assert!(is_present(&json!(false)));
        assert!(is_present(&json!(0)));
        assert!(is_present(&json!("x")));
    }

    #[test]
    fn extract_keeps_only_present_identity_fields() {
        let desired = attrs(json!({
            "id": "",
            "name": "profileA",
            "description": "ignored",
        }));
        let key = IdentityKey::extract(&desired, ["id", "name"]);
        assert!(!key.contains("id"));
        assert_eq!(key.name(), Some("profileA"));
        assert_eq!(key.field_names(), vec!["name".to_string()]);
    }

    #[test]
    fn non_string_identity_values_are_rendered() {
        let desired = attrs(json!({ "value": 42 }));
        let key = IdentityKey::extract(&desired, ["value"]);
        assert_eq!(key.get("value"), Some("42"));
    }
}
