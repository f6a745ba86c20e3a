//! # Store Client
//!
//! The channel-backed [`ErsApi`] implementation talking to an
//! [`ErsStore`](crate::store::ErsStore).

use crate::api::{CreateResponse, ErsApi, PageQuery, RemoteObject, SearchPage};
use crate::error::ApiError;
use crate::message::{Response, StoreRequest};
use crate::state::Attributes;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tokio::sync::{mpsc, oneshot};

/// A cloneable handle to a running store.
///
/// Holds only a sender, so cloning is cheap. Once the store has shut down
/// every call fails with [`ApiError::Closed`].
#[derive(Clone)]
pub struct StoreClient {
    sender: mpsc::Sender<StoreRequest>,
}

impl StoreClient {
    pub fn new(sender: mpsc::Sender<StoreRequest>) -> Self {
        Self { sender }
    }

    async fn call<T>(
        &self,
        build: impl FnOnce(Response<T>) -> StoreRequest,
    ) -> Result<T, ApiError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| ApiError::Closed)?;
        response.await.map_err(|_| ApiError::Closed)?
    }
}

#[async_trait]
impl ErsApi for StoreClient {
    async fn get_by_id(&self, endpoint: &str, id: &str) -> Result<RemoteObject, ApiError> {
        self.call(|respond_to| StoreRequest::GetById {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
            respond_to,
        })
        .await
    }

    async fn get_by_name(&self, endpoint: &str, name: &str) -> Result<RemoteObject, ApiError> {
        self.call(|respond_to| StoreRequest::GetByName {
            endpoint: endpoint.to_string(),
            name: name.to_string(),
            respond_to,
        })
        .await
    }

    async fn get_by_keys(
        &self,
        endpoint: &str,
        keys: &BTreeMap<String, String>,
    ) -> Result<RemoteObject, ApiError> {
        self.call(|respond_to| StoreRequest::GetByKeys {
            endpoint: endpoint.to_string(),
            keys: keys.clone(),
            respond_to,
        })
        .await
    }

    async fn list(&self, endpoint: &str, query: PageQuery) -> Result<SearchPage, ApiError> {
        self.call(|respond_to| StoreRequest::List {
            endpoint: endpoint.to_string(),
            query,
            respond_to,
        })
        .await
    }

    async fn create(
        &self,
        endpoint: &str,
        payload: &Attributes,
    ) -> Result<CreateResponse, ApiError> {
        self.call(|respond_to| StoreRequest::Create {
            endpoint: endpoint.to_string(),
            payload: payload.clone(),
            respond_to,
        })
        .await
    }

    async fn update(
        &self,
        endpoint: &str,
        id: &str,
        payload: &Attributes,
    ) -> Result<RemoteObject, ApiError> {
        self.call(|respond_to| StoreRequest::Update {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
            payload: payload.clone(),
            respond_to,
        })
        .await
    }

    async fn delete(&self, endpoint: &str, id: &str) -> Result<(), ApiError> {
        self.call(|respond_to| StoreRequest::Delete {
            endpoint: endpoint.to_string(),
            id: id.to_string(),
            respond_to,
        })
        .await
    }
}
