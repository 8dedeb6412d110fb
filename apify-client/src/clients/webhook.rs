//! Webhook clients.

use apify_http_client::{Method, QueryParams, Result};
use serde_json::Value;

use super::WebhookDispatchCollectionClient;
use crate::dates::parse_date_fields;
use crate::pagination::{ListOptions, PaginatedList};
use crate::resource::{ResourceContext, pluck_data, require_object};

/// Client of a single webhook.
#[derive(Debug, Clone)]
pub struct WebhookClient {
    context: ResourceContext,
}

impl WebhookClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the webhook.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the webhook; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Value>> {
        self.context.get_resource("get", &QueryParams::new()).await
    }

    /// Update fields of the webhook.
    pub async fn update(&self, fields: &Value) -> Result<Value> {
        require_object(fields, "webhook fields")?;
        self.context.update_resource("update", fields).await
    }

    /// Delete the webhook.
    pub async fn delete(&self) -> Result<()> {
        self.context.delete_resource("delete").await
    }

    /// Fire a test dispatch of the webhook.
    pub async fn test(&self) -> Result<Value> {
        let response = self
            .context
            .request(Method::POST, self.context.url_with("test"), "test")?
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }

    /// Dispatches of the webhook.
    pub fn dispatches(&self) -> WebhookDispatchCollectionClient {
        WebhookDispatchCollectionClient::new(self.context.sub_resource(
            "WebhookDispatchCollectionClient",
            "dispatches",
            None,
        ))
    }
}

/// Client of a webhook collection.
#[derive(Debug, Clone)]
pub struct WebhookCollectionClient {
    context: ResourceContext,
}

impl WebhookCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List one page of webhooks.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_resource("list", options).await
    }

    /// List webhooks across pages up to `options.limit`.
    pub async fn list_all(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_all_resource("listAll", options).await
    }

    /// Create a webhook.
    pub async fn create(&self, webhook: &Value) -> Result<Value> {
        require_object(webhook, "webhook")?;
        self.context
            .create_resource("create", webhook, &QueryParams::new())
            .await
    }
}
