//! # Paginator
//!
//! Follows the `nextPage` links of a listing endpoint. The query for each
//! following page is parsed out of the link the server returned, never
//! computed by incrementing a counter.
//!
//! Iteration stops when a page is empty, when the page carries no `next`
//! relation, or when a call fails. A failure mid-way is not fatal: the pages
//! collected so far are kept, because listings are only used to probe for
//! existence where partial visibility is acceptable.

use crate::api::{ErsApi, Link, PageQuery, ResourceSummary};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Pull-based walk over the pages of one listing.
///
/// The paginator owns no hidden server state: it is driven entirely by the
/// initial query and the links it receives, so a new paginator with the same
/// query restarts the walk.
pub struct Paginator<'a> {
    api: &'a dyn ErsApi,
    endpoint: &'a str,
    next: Option<PageQuery>,
    seen: HashSet<PageQuery>,
}

impl<'a> Paginator<'a> {
    pub fn new(api: &'a dyn ErsApi, endpoint: &'a str, initial: PageQuery) -> Self {
        Self {
            api,
            endpoint,
            next: Some(initial),
            seen: HashSet::new(),
        }
    }

    /// Fetches the next page, or `None` once the listing is exhausted.
    pub async fn next_page(&mut self) -> Option<Vec<ResourceSummary>> {
        let query = self.next.take()?;
        if !self.seen.insert(query) {
            warn!(endpoint = self.endpoint, page = query.page, "Listing links back to a fetched page, stopping");
            return None;
        }

        let page = match self.api.list(self.endpoint, query).await {
            Ok(page) => page,
            Err(e) => {
                warn!(endpoint = self.endpoint, page = query.page, error = %e, "Listing failed, keeping partial results");
                return None;
            }
        };
        debug!(endpoint = self.endpoint, page = query.page, count = page.resources.len(), "Fetched page");

        if page.resources.is_empty() {
            return None;
        }
        self.next = page.next_page.as_ref().and_then(next_query);
        Some(page.resources)
    }

    /// Accumulates every remaining page, preserving server order.
    pub async fn collect(mut self) -> Vec<ResourceSummary> {
        let mut all = Vec::new();
        while let Some(mut page) = self.next_page().await {
            all.append(&mut page);
        }
        all
    }
}

/// Fetches the whole listing of `endpoint` starting from `initial`.
pub async fn fetch_all(api: &dyn ErsApi, endpoint: &str, initial: PageQuery) -> Vec<ResourceSummary> {
    Paginator::new(api, endpoint, initial).collect().await
}

/// Query for the page a `next` link points at.
///
/// Links with another relation, or whose `page`/`size` parameters cannot be
/// read, end the walk.
pub fn next_query(link: &Link) -> Option<PageQuery> {
    if link.rel != "next" {
        return None;
    }
    let url = url::Url::parse(&link.href)
        .or_else(|_| url::Url::parse("http://localhost/").and_then(|base| base.join(&link.href)))
        .ok()?;

    let mut page = None;
    let mut size = None;
    for (key, value) in url.query_pairs() {
        match key.as_ref() {
            "page" => page = value.parse::<u32>().ok(),
            "size" => size = value.parse::<u32>().ok(),
            _ => {}
        }
    }
    Some(PageQuery {
        page: page.filter(|p| *p > 0)?,
        size: size.filter(|s| *s > 0)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_absolute_and_relative_links() {
        let absolute = Link::next("https://ise.example.com:9060/ers/config/sgt?size=2&page=3");
        assert_eq!(next_query(&absolute), Some(PageQuery { page: 3, size: 2 }));

        let relative = Link::next("/ers/config/sgt?page=2&size=50");
        assert_eq!(next_query(&relative), Some(PageQuery { page: 2, size: 50 }));
    }

    #[test]
    fn other_relations_and_bad_links_stop() {
        let prev = Link {
            rel: "previous".into(),
            href: "https://ise/ers/config/sgt?size=2&page=1".into(),
        };
        assert_eq!(next_query(&prev), None);
        assert_eq!(next_query(&Link::next("https://ise/ers/config/sgt?page=2")), None);
        assert_eq!(next_query(&Link::next("https://ise/ers/config/sgt?page=x&size=2")), None);
        assert_eq!(next_query(&Link::next("https://ise/ers/config/sgt?page=0&size=2")), None);
    }
}
