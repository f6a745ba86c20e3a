//! # Resource Handle
//!
//! The handle is the only state persisted between operations on a managed
//! instance. It is a set of resolved identity fields rendered as
//! `key=value` pairs joined by `;`, for example `id=abc123;name=profileA`.
//!
//! `%`, `;` and `=` inside keys or values are percent-escaped (`%25`, `%3B`,
//! `%3D`), so joining and parsing is lossless for any non-empty map.

use crate::state::IdentityKey;
use std::collections::BTreeMap;
use std::str::FromStr;

const PAIR_SEPARATOR: char = ';';
const KEY_VALUE_SEPARATOR: char = '=';

/// Errors produced while parsing or building a handle.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum HandleError {
    #[error("resource handle is empty")]
    Empty,
    #[error("handle segment `{0}` is not a key=value pair")]
    MissingSeparator(String),
    #[error("handle segment `{0}` has an empty key")]
    EmptyKey(String),
    #[error("handle key `{0}` appears more than once")]
    DuplicateKey(String),
    #[error("handle segment `{0}` contains an invalid escape sequence")]
    InvalidEscape(String),
}

/// Composite identity of a managed instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    fields: BTreeMap<String, String>,
}

impl ResourceHandle {
    /// Builds a handle from resolved identity fields.
    ///
    /// Empty values are dropped; a handle with no fields left is an error.
    pub fn new(fields: BTreeMap<String, String>) -> Result<Self, HandleError> {
        let fields: BTreeMap<String, String> =
            fields.into_iter().filter(|(_, v)| !v.is_empty()).collect();
        if fields.is_empty() {
            return Err(HandleError::Empty);
        }
        if let Some(key) = fields.keys().find(|k| k.is_empty()) {
            return Err(HandleError::EmptyKey(key.clone()));
        }
        Ok(Self { fields })
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn id(&self) -> Option<&str> {
        self.get("id")
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    /// Returns a copy with `field` set to `value`.
    pub fn with(&self, field: &str, value: &str) -> Self {
        let mut fields = self.fields.clone();
        if !value.is_empty() {
            fields.insert(field.to_string(), value.to_string());
        }
        Self { fields }
    }

    pub fn identity_key(&self) -> IdentityKey {
        IdentityKey::from_map(self.fields.clone())
    }

    /// Renders the handle in its persisted form.
    pub fn join(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}{KEY_VALUE_SEPARATOR}{}", escape(k), escape(v)))
            .collect::<Vec<_>>()
            .join(&PAIR_SEPARATOR.to_string())
    }

    /// Parses the persisted form produced by [`ResourceHandle::join`].
    pub fn parse(raw: &str) -> Result<Self, HandleError> {
        if raw.is_empty() {
            return Err(HandleError::Empty);
        }
        let mut fields = BTreeMap::new();
        for segment in raw.split(PAIR_SEPARATOR) {
            let (key, value) = segment
                .split_once(KEY_VALUE_SEPARATOR)
                .ok_or_else(|| HandleError::MissingSeparator(segment.to_string()))?;
            let key = unescape(key).ok_or_else(|| HandleError::InvalidEscape(segment.to_string()))?;
            let value =
                unescape(value).ok_or_else(|| HandleError::InvalidEscape(segment.to_string()))?;
            if key.is_empty() {
                return Err(HandleError::EmptyKey(segment.to_string()));
            }
            if fields.insert(key.clone(), value).is_some() {
                return Err(HandleError::DuplicateKey(key));
            }
        }
        Self::new(fields)
    }
}

impl std::fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.join())
    }
}

impl FromStr for ResourceHandle {
    type Err = HandleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            ';' => out.push_str("%3B"),
            '=' => out.push_str("%3D"),
            other => out.push(other),
        }
    }
    out
}

fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        let code: String = chars.by_ref().take(2).collect();
        match code.to_ascii_uppercase().as_str() {
            "25" => out.push('%'),
            "3B" => out.push(';'),
            "3D" => out.push('='),
            _ => return None,
        }
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(pairs: &[(&str, &str)]) -> ResourceHandle {
        let fields = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ResourceHandle::new(fields).unwrap()
    }

    #[test]
    fn joins_in_key_order() {
        let h = handle(&[("name", "profileA"), ("id", "abc123")]);
        assert_eq!(h.join(), "id=abc123;name=profileA");
    }

    #[test]
    fn parses_compound_key() {
        let h = ResourceHandle::parse("dictionary_name=Radius;name=Framed-IP").unwrap();
        assert_eq!(h.get("dictionary_name"), Some("Radius"));
        assert_eq!(h.get("name"), Some("Framed-IP"));
        assert_eq!(h.id(), None);
    }

    #[test]
    fn separators_inside_values_survive() {
        let h = handle(&[("name", "a;b=c%d")]);
        assert_eq!(h.join(), "name=a%3Bb%3Dc%25d");
        assert_eq!(ResourceHandle::parse(&h.join()).unwrap(), h);
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(ResourceHandle::parse(""), Err(HandleError::Empty));
        assert!(matches!(
            ResourceHandle::parse("id"),
            Err(HandleError::MissingSeparator(_))
        ));
        assert!(matches!(
            ResourceHandle::parse("=x"),
            Err(HandleError::EmptyKey(_))
        ));
        assert!(matches!(
            ResourceHandle::parse("id=1;id=2"),
            Err(HandleError::DuplicateKey(_))
        ));
        assert!(matches!(
            ResourceHandle::parse("id=%zz"),
            Err(HandleError::InvalidEscape(_))
        ));
    }

    #[test]
    fn empty_values_are_dropped_on_build() {
        let mut fields = BTreeMap::new();
        fields.insert("id".to_string(), String::new());
        assert_eq!(ResourceHandle::new(fields), Err(HandleError::Empty));
    }
}
