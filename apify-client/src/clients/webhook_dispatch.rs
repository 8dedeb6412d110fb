//! Webhook dispatch clients.

use apify_http_client::{QueryParams, Result};
use serde_json::Value;

use crate::pagination::{ListOptions, PaginatedList};
use crate::resource::ResourceContext;

/// Client of a single webhook dispatch.
#[derive(Debug, Clone)]
pub struct WebhookDispatchClient {
    context: ResourceContext,
}

impl WebhookDispatchClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the dispatch.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the dispatch; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Value>> {
        self.context.get_resource("get", &QueryParams::new()).await
    }
}

/// Client of a webhook dispatch collection.
#[derive(Debug, Clone)]
pub struct WebhookDispatchCollectionClient {
    context: ResourceContext,
}

impl WebhookDispatchCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List one page of dispatches.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_resource("list", options).await
    }

    /// List dispatches across pages up to `options.limit`.
    pub async fn list_all(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_all_resource("listAll", options).await
    }
}
