//! # In-Memory ERS Store
//!
//! `ErsStore` is an actor that behaves like the slice of the ISE ERS API the
//! reconciler consumes. It owns every collection and processes requests
//! sequentially in its own task, so no lock guards the state.
//!
//! It models the server behaviors the protocol depends on:
//!
//! * ids are assigned by the server, in sequence;
//! * a create or rename that collides with an existing name is rejected;
//! * create answers with a `Location` header only, never with a body;
//! * listings are paged (`page` is 1-based, `size` at most
//!   [`MAX_PAGE_SIZE`]) and carry an ERS style `nextPage` link;
//! * listing entries are summaries holding only id, name and description.
//!
//! # Usage Pattern
//!
//! ```rust
//! use ise_reconcile::api::ErsApi;
//! use ise_reconcile::store::ErsStore;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (store, client) = ErsStore::new(16);
//!     tokio::spawn(store.run());
//!
//!     let payload = serde_json::from_value(json!({ "name": "Employees", "value": 4 })).unwrap();
//!     let created = client.create("sgt", &payload).await.unwrap();
//!     let id = created.created_id().unwrap();
//!     assert_eq!(client.get_by_id("sgt", &id).await.unwrap().name(), Some("Employees"));
//! }
//! ```

use crate::api::{
    CreateResponse, Link, PageQuery, RemoteObject, ResourceSummary, SearchPage, MAX_PAGE_SIZE,
};
use crate::client::StoreClient;
use crate::error::ApiError;
use crate::message::StoreRequest;
use crate::state::{key_string, Attributes};
use serde_json::json;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Base URL used in `Location` headers and `nextPage` links.
pub const DEFAULT_BASE_URL: &str = "https://localhost:9060/ers/config/";

/// Fields that must be unique together within a collection. Dictionary
/// attributes are unique per dictionary, everything else by name alone.
const NATURAL_KEY: &[&str] = &["dictionary_name", "name"];

/// Attributes a listing entry carries besides id and name.
const SUMMARY_FIELDS: &[&str] = &["description"];

/// The store actor. Create it with [`ErsStore::new`] and spawn [`ErsStore::run`].
pub struct ErsStore {
    receiver: mpsc::Receiver<StoreRequest>,
    base_url: String,
    collections: HashMap<String, Vec<RemoteObject>>,
    next_id: u64,
}

impl ErsStore {
    /// Creates the store and a client connected to it.
    ///
    /// `buffer_size` is the request channel capacity; callers wait when it is full.
    pub fn new(buffer_size: usize) -> (Self, StoreClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let store = Self {
            receiver,
            base_url: DEFAULT_BASE_URL.to_string(),
            collections: HashMap::new(),
            next_id: 1,
        };
        (store, StoreClient::new(sender))
    }

    /// Overrides the base URL of generated links.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Runs the event loop until every client is dropped.
    pub async fn run(mut self) {
        info!(base_url = %self.base_url, "ERS store started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                StoreRequest::GetById {
                    endpoint,
                    id,
                    respond_to,
                } => {
                    let result = self.get_by_id(&endpoint, &id);
                    debug!(endpoint = %endpoint, %id, found = result.is_ok(), "GetById");
                    let _ = respond_to.send(result);
                }
                StoreRequest::GetByName {
                    endpoint,
                    name,
                    respond_to,
                } => {
                    let keys = BTreeMap::from([("name".to_string(), name)]);
                    let result = self.get_by_keys(&endpoint, &keys);
                    debug!(endpoint = %endpoint, ?keys, found = result.is_ok(), "GetByName");
                    let _ = respond_to.send(result);
                }
                StoreRequest::GetByKeys {
                    endpoint,
                    keys,
                    respond_to,
                } => {
                    let result = self.get_by_keys(&endpoint, &keys);
                    debug!(endpoint = %endpoint, ?keys, found = result.is_ok(), "GetByKeys");
                    let _ = respond_to.send(result);
                }
                StoreRequest::List {
                    endpoint,
                    query,
                    respond_to,
                } => {
                    let result = self.list(&endpoint, query);
                    debug!(endpoint = %endpoint, page = query.page, size = query.size, ok = result.is_ok(), "List");
                    let _ = respond_to.send(result);
                }
                StoreRequest::Create {
                    endpoint,
                    payload,
                    respond_to,
                } => {
                    let result = self.create(&endpoint, payload);
                    match &result {
                        Ok(response) => {
                            info!(endpoint = %endpoint, location = ?response.location, size = self.len(&endpoint), "Created")
                        }
                        Err(e) => warn!(endpoint = %endpoint, error = %e, "Create rejected"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Update {
                    endpoint,
                    id,
                    payload,
                    respond_to,
                } => {
                    let result = self.update(&endpoint, &id, payload);
                    match &result {
                        Ok(_) => info!(endpoint = %endpoint, %id, "Updated"),
                        Err(e) => warn!(endpoint = %endpoint, %id, error = %e, "Update rejected"),
                    }
                    let _ = respond_to.send(result);
                }
                StoreRequest::Delete {
                    endpoint,
                    id,
                    respond_to,
                } => {
                    let result = self.delete(&endpoint, &id);
                    match &result {
                        Ok(()) => info!(endpoint = %endpoint, %id, size = self.len(&endpoint), "Deleted"),
                        Err(e) => warn!(endpoint = %endpoint, %id, error = %e, "Delete rejected"),
                    }
                    let _ = respond_to.send(result);
                }
            }
        }

        let size: usize = self.collections.values().map(Vec::len).sum();
        info!(size, "ERS store shutdown");
    }

    fn len(&self, endpoint: &str) -> usize {
        self.collections.get(endpoint).map_or(0, Vec::len)
    }

    fn collection(&self, endpoint: &str) -> &[RemoteObject] {
        self.collections
            .get(endpoint)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn get_by_id(&self, endpoint: &str, id: &str) -> Result<RemoteObject, ApiError> {
        self.collection(endpoint)
            .iter()
            .find(|o| o.id == id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    fn get_by_keys(
        &self,
        endpoint: &str,
        keys: &BTreeMap<String, String>,
    ) -> Result<RemoteObject, ApiError> {
        self.collection(endpoint)
            .iter()
            .find(|o| {
                keys.iter()
                    .all(|(field, value)| o.key_value(field).as_deref() == Some(value.as_str()))
            })
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    fn list(&self, endpoint: &str, query: PageQuery) -> Result<SearchPage, ApiError> {
        if query.page == 0 || query.size == 0 || query.size > MAX_PAGE_SIZE {
            return Err(rejection(
                400,
                "Bad Request",
                &format!("GET-search-{endpoint}"),
                format!(
                    "page must be at least 1 and size between 1 and {MAX_PAGE_SIZE}, got page={} size={}",
                    query.page, query.size
                ),
            ));
        }

        let all = self.collection(endpoint);
        let size = query.size as usize;
        let start = (query.page as usize - 1).saturating_mul(size);
        let resources: Vec<ResourceSummary> = all
            .iter()
            .skip(start)
            .take(size)
            .map(summarize)
            .collect();

        let next_page = (start + resources.len() < all.len()).then(|| {
            Link::next(format!(
                "{}{endpoint}?size={}&page={}",
                self.base_url,
                query.size,
                query.page + 1
            ))
        });

        Ok(SearchPage {
            resources,
            total: Some(all.len() as u64),
            next_page,
        })
    }

    fn create(&mut self, endpoint: &str, mut payload: Attributes) -> Result<CreateResponse, ApiError> {
        payload.remove("id");
        let operation = format!("POST-create-{endpoint}");
        if !payload.contains_key("name") {
            return Err(rejection(400, "Bad Request", &operation, "name is required".into()));
        }
        if let Some(existing) = self.conflicting(endpoint, &payload, None) {
            return Err(rejection(
                409,
                "Conflict",
                &operation,
                format!("Resource already exists with id {}", existing.id),
            ));
        }

        let id = format!("00000000-0000-4000-8000-{:012x}", self.next_id);
        self.next_id += 1;
        let location = format!("{}{endpoint}/{id}", self.base_url);
        self.collections
            .entry(endpoint.to_string())
            .or_default()
            .push(RemoteObject {
                id,
                attributes: payload,
            });

        Ok(CreateResponse {
            object: None,
            location: Some(location),
        })
    }

    fn update(&mut self, endpoint: &str, id: &str, mut payload: Attributes) -> Result<RemoteObject, ApiError> {
        payload.remove("id");
        let operation = format!("PUT-update-{endpoint}");
        let current = self.get_by_id(endpoint, id)?;

        let mut merged = current.attributes;
        merged.extend(payload);
        if let Some(existing) = self.conflicting(endpoint, &merged, Some(id)) {
            return Err(rejection(
                409,
                "Conflict",
                &operation,
                format!("Name already used by id {}", existing.id),
            ));
        }

        let object = self
            .collections
            .get_mut(endpoint)
            .and_then(|objects| objects.iter_mut().find(|o| o.id == id))
            .ok_or(ApiError::NotFound)?;
        object.attributes = merged;
        Ok(object.clone())
    }

    fn delete(&mut self, endpoint: &str, id: &str) -> Result<(), ApiError> {
        let objects = self.collections.get_mut(endpoint).ok_or(ApiError::NotFound)?;
        let position = objects
            .iter()
            .position(|o| o.id == id)
            .ok_or(ApiError::NotFound)?;
        objects.remove(position);
        Ok(())
    }

    fn conflicting(&self, endpoint: &str, attrs: &Attributes, except: Option<&str>) -> Option<&RemoteObject> {
        let wanted = natural_key(attrs);
        self.collection(endpoint)
            .iter()
            .filter(|o| Some(o.id.as_str()) != except)
            .find(|o| natural_key(&o.attributes) == wanted)
    }
}

fn natural_key(attrs: &Attributes) -> Vec<Option<String>> {
    NATURAL_KEY
        .iter()
        .map(|field| attrs.get(*field).map(key_string))
        .collect()
}

fn summarize(object: &RemoteObject) -> ResourceSummary {
    ResourceSummary {
        id: object.id.clone(),
        name: object.name().map(str::to_string),
        attributes: SUMMARY_FIELDS
            .iter()
            .filter_map(|f| object.attributes.get(*f).map(|v| (f.to_string(), v.clone())))
            .collect(),
    }
}

/// Error shaped like an `ERSResponse` rejection.
fn rejection(status: u16, message: &str, operation: &str, title: String) -> ApiError {
    let body = json!({
        "ERSResponse": {
            "operation": operation,
            "messages": [{ "title": title, "type": "ERROR" }],
        }
    });
    ApiError::Status {
        status,
        message: message.to_string(),
        body: Some(body.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ErsApi;

    fn attrs(value: serde_json::Value) -> Attributes {
        serde_json::from_value(value).unwrap()
    }

    fn spawn() -> StoreClient {
        let (store, client) = ErsStore::new(16);
        tokio::spawn(store.run());
        client
    }

    #[tokio::test]
    async fn create_answers_with_location_only() {
        let client = spawn();
        let response = client
            .create("sgt", &attrs(json!({ "name": "Employees", "value": 4 })))
            .await
            .unwrap();

        assert!(response.object.is_none());
        let location = response.location.clone().unwrap();
        assert!(location.starts_with("https://localhost:9060/ers/config/sgt/"));
        let id = response.created_id().unwrap();
        let fetched = client.get_by_id("sgt", &id).await.unwrap();
        assert_eq!(fetched.attributes["value"], json!(4));
    }

    #[tokio::test]
    async fn duplicate_name_is_rejected() {
        let client = spawn();
        let payload = attrs(json!({ "name": "Employees" }));
        client.create("sgt", &payload).await.unwrap();

        let err = client.create("sgt", &payload).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 409, .. }));
        assert!(err.body().unwrap().contains("already exists"));

        // Names are scoped per collection.
        client.create("tacacsprofile", &payload).await.unwrap();
    }

    #[tokio::test]
    async fn dictionary_attributes_are_unique_per_dictionary() {
        let client = spawn();
        let endpoint = "dictionaryattribute";
        client
            .create(endpoint, &attrs(json!({ "dictionary_name": "Radius", "name": "Class" })))
            .await
            .unwrap();
        client
            .create(endpoint, &attrs(json!({ "dictionary_name": "Cisco", "name": "Class" })))
            .await
            .unwrap();

        let keys = BTreeMap::from([
            ("dictionary_name".to_string(), "Cisco".to_string()),
            ("name".to_string(), "Class".to_string()),
        ]);
        let found = client.get_by_keys(endpoint, &keys).await.unwrap();
        assert_eq!(found.attributes["dictionary_name"], json!("Cisco"));
    }

    #[tokio::test]
    async fn listing_pages_carry_summaries_and_next_links() {
        let client = spawn();
        for name in ["a", "b", "c"] {
            client
                .create("sgt", &attrs(json!({ "name": name, "description": "d", "value": 1 })))
                .await
                .unwrap();
        }

        let first = client.list("sgt", PageQuery { page: 1, size: 2 }).await.unwrap();
        assert_eq!(first.resources.len(), 2);
        assert_eq!(first.total, Some(3));
        assert!(!first.resources[0].attributes.contains_key("value"));
        let next = first.next_page.unwrap();
        assert_eq!(next.rel, "next");
        assert!(next.href.ends_with("sgt?size=2&page=2"));

        let last = client.list("sgt", PageQuery { page: 2, size: 2 }).await.unwrap();
        assert_eq!(last.resources.len(), 1);
        assert!(last.next_page.is_none());

        let err = client.list("sgt", PageQuery { page: 1, size: 500 }).await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn update_merges_and_delete_removes() {
        let client = spawn();
        let id = client
            .create("sgt", &attrs(json!({ "name": "a", "value": 1 })))
            .await
            .unwrap()
            .created_id()
            .unwrap();

        let updated = client
            .update("sgt", &id, &attrs(json!({ "value": 2 })))
            .await
            .unwrap();
        assert_eq!(updated.name(), Some("a"));
        assert_eq!(updated.attributes["value"], json!(2));

        client.delete("sgt", &id).await.unwrap();
        assert_eq!(client.delete("sgt", &id).await, Err(ApiError::NotFound));
    }

    #[tokio::test]
    async fn closed_store_reports_closed() {
        let (store, client) = ErsStore::new(1);
        drop(store);
        assert_eq!(client.get_by_id("sgt", "1").await, Err(ApiError::Closed));
    }
}
