//! # Existence Prober
//!
//! Runs one lookup strategy against the remote and reports what it found.
//! The outcome keeps "not there" apart from "could not tell"; each call site
//! decides how to treat a failed probe.

use crate::api::{ErsApi, PageQuery, RemoteObject};
use crate::error::ApiError;
use crate::kind::Lookup;
use crate::paginate::fetch_all;
use crate::search::search;
use crate::state::IdentityKey;
use tracing::debug;

/// What a probe found.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeResult {
    Found(RemoteObject),
    NotFound,
    Failed(ApiError),
}

impl ProbeResult {
    fn from_get(result: Result<RemoteObject, ApiError>) -> Self {
        match result {
            Ok(object) => Self::Found(object),
            Err(e) if e.is_not_found() => Self::NotFound,
            Err(e) => Self::Failed(e),
        }
    }
}

/// Runs `lookup` for `key` against `endpoint`.
///
/// The caller must have checked that `key` satisfies the lookup (see
/// [`crate::selector::pick`]); a missing field is reported as not found.
pub async fn probe(api: &dyn ErsApi, endpoint: &str, lookup: Lookup, key: &IdentityKey) -> ProbeResult {
    debug!(endpoint, strategy = lookup.label(), %key, "Probing");
    match lookup {
        Lookup::ById => match key.id() {
            Some(id) => ProbeResult::from_get(api.get_by_id(endpoint, id).await),
            None => ProbeResult::NotFound,
        },
        Lookup::ByName => match key.name() {
            Some(name) => ProbeResult::from_get(api.get_by_name(endpoint, name).await),
            None => ProbeResult::NotFound,
        },
        Lookup::ByKeys(fields) => {
            let keys = key.subset(fields);
            if keys.len() != fields.len() {
                return ProbeResult::NotFound;
            }
            ProbeResult::from_get(api.get_by_keys(endpoint, &keys).await)
        }
        Lookup::Scan { fields } => {
            let listing = fetch_all(api, endpoint, PageQuery::default()).await;
            match search(api, endpoint, &listing, key, fields).await {
                Ok(Some(object)) => ProbeResult::Found(object),
                Ok(None) => ProbeResult::NotFound,
                Err(e) => ProbeResult::Failed(e),
            }
        }
    }
}
