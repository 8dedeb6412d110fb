//! Paginated lists and list options.

use apify_http_client::{Response, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;

use crate::wait::ActorJobStatus;

/// One page of a collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedList<T> {
    /// Total number of entries in the collection.
    pub total: u64,
    /// Number of entries on this page.
    pub count: u64,
    /// Position of the first entry of this page.
    pub offset: u64,
    /// Maximum page size requested.
    pub limit: u64,
    /// Whether the entries are sorted newest first.
    #[serde(default)]
    pub desc: bool,
    /// Entries of the page.
    pub items: Vec<T>,
}

impl<T> PaginatedList<T> {
    /// Build a page from the `x-apify-pagination-*` headers of an item listing.
    ///
    /// Missing or malformed headers fall back to what the page itself shows:
    /// `count` to the number of items, `offset` to 0, `limit` to `count` and
    /// `total` to `offset + count`.
    pub(crate) fn from_headers(response: &Response, items: Vec<T>) -> Self {
        let number = |name: &str| -> Option<u64> {
            response
                .header(&format!("x-apify-pagination-{name}"))
                .and_then(|value| value.trim().parse().ok())
        };
        let desc = response
            .header("x-apify-pagination-desc")
            .is_some_and(|value| matches!(value.trim(), "true" | "1"));

        let count = number("count").unwrap_or(items.len() as u64);
        let offset = number("offset").unwrap_or(0);
        Self {
            total: number("total").unwrap_or(offset + count),
            count,
            offset,
            limit: number("limit").unwrap_or(count),
            desc,
            items,
        }
    }
}

/// Options of collection listings.
///
/// Filters a collection does not support are ignored by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListOptions {
    /// Number of entries to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Maximum number of entries to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Sort newest first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<bool>,
    /// Only actors owned by the user (actor collection).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub my: Option<bool>,
    /// Include unnamed storages (storage collections).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unnamed: Option<bool>,
    /// Only jobs in this status (run collections).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ActorJobStatus>,
}

impl ListOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Skip entries.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Limit the number of entries.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Sort newest first.
    pub fn desc(mut self, desc: bool) -> Self {
        self.desc = Some(desc);
        self
    }

    /// Only actors owned by the user.
    pub fn my(mut self, my: bool) -> Self {
        self.my = Some(my);
        self
    }

    /// Include unnamed storages.
    pub fn unnamed(mut self, unnamed: bool) -> Self {
        self.unnamed = Some(unnamed);
        self
    }

    /// Only jobs in the given status.
    pub fn status(mut self, status: ActorJobStatus) -> Self {
        self.status = Some(status);
        self
    }
}

/// Fetch consecutive pages until `limit` entries are collected or the
/// collection is exhausted.
///
/// Every request asks for exactly the entries still missing; the server may
/// return fewer when it caps the page size.
pub(crate) async fn collect_pages<T, F, Fut>(
    offset: u64,
    limit: Option<u64>,
    mut fetch_page: F,
) -> Result<PaginatedList<T>>
where
    F: FnMut(u64, Option<u64>) -> Fut,
    Fut: Future<Output = Result<PaginatedList<T>>>,
{
    let mut items = Vec::new();
    let mut next_offset = offset;
    let mut total = 0;
    let mut desc = false;

    loop {
        let remaining = limit.map(|limit| limit.saturating_sub(items.len() as u64));
        if remaining == Some(0) {
            break;
        }

        let page = fetch_page(next_offset, remaining).await?;
        total = page.total;
        desc = page.desc;
        let fetched = page.items.len() as u64;
        items.extend(page.items);
        next_offset += fetched;

        if fetched == 0 || next_offset >= total {
            break;
        }
    }

    let count = items.len() as u64;
    Ok(PaginatedList {
        total,
        count,
        offset,
        limit: limit.unwrap_or(count),
        desc,
        items,
    })
}
