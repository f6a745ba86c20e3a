//! # Linear Searcher
//!
//! Scans an accumulated listing for the entry matching an identity key and
//! re-fetches it by id. A listing entry is a projection, so the summary is
//! never handed back: callers only ever see the full object.

use crate::api::{ErsApi, RemoteObject, ResourceSummary};
use crate::error::ApiError;
use crate::state::IdentityKey;
use tracing::debug;

/// Finds the summary matching `key` in `collection`.
///
/// An id match takes priority over a match on the other `fields`; among
/// several entries matching on the other fields, the first one wins.
pub fn find<'c>(
    collection: &'c [ResourceSummary],
    key: &IdentityKey,
    fields: &[&str],
) -> Option<&'c ResourceSummary> {
    if let Some(id) = key.id() {
        if let Some(hit) = collection.iter().find(|s| s.id == id) {
            return Some(hit);
        }
    }

    let wanted: Vec<(&str, &str)> = fields
        .iter()
        .filter(|f| **f != "id")
        .filter_map(|f| key.get(f).map(|v| (*f, v)))
        .collect();
    if wanted.is_empty() {
        return None;
    }
    collection.iter().find(|summary| {
        wanted
            .iter()
            .all(|(field, value)| summary.key_value(field).as_deref() == Some(*value))
    })
}

/// Finds the entry matching `key` and fetches the full object by its id.
///
/// `Ok(None)` means no entry matched, or the matched entry vanished before the
/// re-fetch.
pub async fn search(
    api: &dyn ErsApi,
    endpoint: &str,
    collection: &[ResourceSummary],
    key: &IdentityKey,
    fields: &[&str],
) -> Result<Option<RemoteObject>, ApiError> {
    let Some(hit) = find(collection, key, fields) else {
        debug!(endpoint, %key, scanned = collection.len(), "No listing entry matched");
        return Ok(None);
    };

    debug!(endpoint, id = %hit.id, "Listing entry matched, fetching full object");
    match api.get_by_id(endpoint, &hit.id).await {
        Ok(object) => Ok(Some(object)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}
