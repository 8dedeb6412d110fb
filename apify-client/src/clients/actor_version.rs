//! Actor version clients.

use apify_http_client::{Method, QueryParams, Result};
use serde_json::Value;

use crate::dates::parse_date_fields;
use crate::resource::{ResourceContext, pluck_data, require_object};

/// Client of a single actor version.
#[derive(Debug, Clone)]
pub struct ActorVersionClient {
    context: ResourceContext,
}

impl ActorVersionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the version.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the version; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Value>> {
        self.context.get_resource("get", &QueryParams::new()).await
    }

    /// Update fields of the version.
    pub async fn update(&self, fields: &Value) -> Result<Value> {
        require_object(fields, "version fields")?;
        self.context.update_resource("update", fields).await
    }

    /// Delete the version.
    pub async fn delete(&self) -> Result<()> {
        self.context.delete_resource("delete").await
    }
}

/// Client of the versions of an actor.
#[derive(Debug, Clone)]
pub struct ActorVersionCollectionClient {
    context: ResourceContext,
}

impl ActorVersionCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List all versions. The endpoint is not paginated.
    pub async fn list(&self) -> Result<Value> {
        let response = self
            .context
            .request(Method::GET, self.context.url(), "list")?
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }

    /// Create a version.
    pub async fn create(&self, version: &Value) -> Result<Value> {
        require_object(version, "version")?;
        self.context
            .create_resource("create", version, &QueryParams::new())
            .await
    }
}
