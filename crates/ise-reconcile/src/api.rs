//! # Vendor SDK Contract
//!
//! The reconciler never talks HTTP itself. It consumes the ISE External
//! RESTful Services (ERS) API through the [`ErsApi`] trait, which mirrors the
//! per-resource operations the vendor SDK exposes: `GetByID`, `GetByName`,
//! `List` (paginated), `Create`, `Update` and `Delete`.
//!
//! Listing endpoints return [`ResourceSummary`] projections; every other read
//! returns a full [`RemoteObject`]. The two are separate types so that a
//! listing entry can never be flattened into local state by accident: the
//! searcher must re-fetch the matched entry by id first.

use crate::error::ApiError;
use crate::state::{key_string, Attributes};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Largest page the ERS API will serve.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Full server-side representation of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteObject {
    /// Server-assigned immutable identifier.
    pub id: String,
    pub attributes: Attributes,
}

impl RemoteObject {
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(|v| v.as_str())
    }

    /// Attribute rendered as a key string, with `id` served from the id field.
    pub fn key_value(&self, field: &str) -> Option<String> {
        if field == "id" {
            return Some(self.id.clone());
        }
        self.attributes.get(field).map(key_string)
    }

    /// Attributes including `id`, ready to be flattened through a schema.
    pub fn to_attributes(&self) -> Attributes {
        let mut attrs = self.attributes.clone();
        attrs.insert("id".to_string(), serde_json::Value::String(self.id.clone()));
        attrs
    }
}

/// Listing projection of an object: id, name and whatever the listing carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSummary {
    pub id: String,
    pub name: Option<String>,
    #[serde(default)]
    pub attributes: Attributes,
}

impl ResourceSummary {
    pub fn key_value(&self, field: &str) -> Option<String> {
        match field {
            "id" => Some(self.id.clone()),
            "name" => self.name.clone(),
            other => self.attributes.get(other).map(key_string),
        }
    }
}

/// Hypermedia link attached to a listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub rel: String,
    pub href: String,
}

impl Link {
    pub fn next(href: impl Into<String>) -> Self {
        Self {
            rel: "next".to_string(),
            href: href.into(),
        }
    }
}

/// Query parameters of a listing call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageQuery {
    /// 1-based page number.
    pub page: u32,
    pub size: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            size: MAX_PAGE_SIZE,
        }
    }
}

/// One page of a listing (`SearchResult` in the ERS API).
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SearchPage {
    pub resources: Vec<ResourceSummary>,
    pub total: Option<u64>,
    pub next_page: Option<Link>,
}

/// Result of a create call.
///
/// Some endpoints answer with the created object, others only with a
/// `Location` header pointing at it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CreateResponse {
    pub object: Option<RemoteObject>,
    pub location: Option<String>,
}

impl CreateResponse {
    /// Id of the created object, from the body or else the `Location` header.
    pub fn created_id(&self) -> Option<String> {
        if let Some(object) = &self.object {
            if !object.id.is_empty() {
                return Some(object.id.clone());
            }
        }
        self.location.as_deref().and_then(location_id)
    }
}

/// Extracts the trailing path segment of a `Location` URL.
pub fn location_id(location: &str) -> Option<String> {
    let path = match url::Url::parse(location) {
        Ok(url) => url.path().to_string(),
        Err(_) => location.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

/// The per-resource operations of the vendor SDK.
///
/// Every method addresses a resource collection by its `endpoint`. An object
/// that does not exist is reported as [`ApiError::NotFound`].
#[async_trait]
pub trait ErsApi: Send + Sync {
    async fn get_by_id(&self, endpoint: &str, id: &str) -> Result<RemoteObject, ApiError>;

    async fn get_by_name(&self, endpoint: &str, name: &str) -> Result<RemoteObject, ApiError>;

    /// Lookup by a compound natural key such as dictionary name + attribute name.
    async fn get_by_keys(
        &self,
        endpoint: &str,
        keys: &BTreeMap<String, String>,
    ) -> Result<RemoteObject, ApiError>;

    async fn list(&self, endpoint: &str, query: PageQuery) -> Result<SearchPage, ApiError>;

    async fn create(&self, endpoint: &str, payload: &Attributes)
        -> Result<CreateResponse, ApiError>;

    /// Updates are always addressed by the immutable id.
    async fn update(
        &self,
        endpoint: &str,
        id: &str,
        payload: &Attributes,
    ) -> Result<RemoteObject, ApiError>;

    async fn delete(&self, endpoint: &str, id: &str) -> Result<(), ApiError>;
}

#[async_trait]
impl<T: ErsApi + ?Sized> ErsApi for Arc<T> {
    async fn get_by_id(&self, endpoint: &str, id: &str) -> Result<RemoteObject, ApiError> {
        (**self).get_by_id(endpoint, id).await
    }

    async fn get_by_name(&self, endpoint: &str, name: &str) -> Result<RemoteObject, ApiError> {
        (**self).get_by_name(endpoint, name).await
    }

    async fn get_by_keys(
        &self,
        endpoint: &str,
        keys: &BTreeMap<String, String>,
    ) -> Result<RemoteObject, ApiError> {
        (**self).get_by_keys(endpoint, keys).await
    }

    async fn list(&self, endpoint: &str, query: PageQuery) -> Result<SearchPage, ApiError> {
        (**self).list(endpoint, query).await
    }

    async fn create(
        &self,
        endpoint: &str,
        payload: &Attributes,
    ) -> Result<CreateResponse, ApiError> {
        (**self).create(endpoint, payload).await
    }

    async fn update(
        &self,
        endpoint: &str,
        id: &str,
        payload: &Attributes,
    ) -> Result<RemoteObject, ApiError> {
        (**self).update(endpoint, id, payload).await
    }

    async fn delete(&self, endpoint: &str, id: &str) -> Result<(), ApiError> {
        (**self).delete(endpoint, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_id_takes_last_segment() {
        assert_eq!(
            location_id("https://ise.example.com:9060/ers/config/internaluser/abc-123"),
            Some("abc-123".to_string())
        );
        assert_eq!(
            location_id("/ers/config/sgt/0042/"),
            Some("0042".to_string())
        );
        assert_eq!(location_id(""), None);
    }

    #[test]
    fn created_id_prefers_body() {
        let response = CreateResponse {
            object: Some(RemoteObject {
                id: "from-body".into(),
                attributes: Attributes::new(),
            }),
            location: Some("https://ise/ers/config/sgt/from-header".into()),
        };
        assert_eq!(response.created_id(), Some("from-body".to_string()));

        let header_only = CreateResponse {
            object: None,
            location: Some("https://ise/ers/config/sgt/from-header".into()),
        };
        assert_eq!(header_only.created_id(), Some("from-header".to_string()));
    }
}
