//! # Store Messages
//!
//! Requests sent from a [`StoreClient`](crate::client::StoreClient) to the
//! [`ErsStore`](crate::store::ErsStore) actor. There is one variant per
//! [`ErsApi`](crate::api::ErsApi) operation, each carrying a oneshot sender
//! the actor answers on.

use crate::api::{CreateResponse, PageQuery, RemoteObject, SearchPage};
use crate::error::ApiError;
use crate::state::Attributes;
use std::collections::BTreeMap;
use tokio::sync::oneshot;

/// One-shot response channel used by the store.
pub type Response<T> = oneshot::Sender<Result<T, ApiError>>;

#[derive(Debug)]
pub enum StoreRequest {
    GetById {
        endpoint: String,
        id: String,
        respond_to: Response<RemoteObject>,
    },
    GetByName {
        endpoint: String,
        name: String,
        respond_to: Response<RemoteObject>,
    },
    GetByKeys {
        endpoint: String,
        keys: BTreeMap<String, String>,
        respond_to: Response<RemoteObject>,
    },
    List {
        endpoint: String,
        query: PageQuery,
        respond_to: Response<SearchPage>,
    },
    Create {
        endpoint: String,
        payload: Attributes,
        respond_to: Response<CreateResponse>,
    },
    Update {
        endpoint: String,
        id: String,
        payload: Attributes,
        respond_to: Response<RemoteObject>,
    },
    Delete {
        endpoint: String,
        id: String,
        respond_to: Response<()>,
    },
}
