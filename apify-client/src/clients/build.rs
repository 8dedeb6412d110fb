//! Actor build clients.

use apify_http_client::{Method, QueryParams, Result};
use serde_json::Value;

use super::LogClient;
use crate::dates::parse_date_fields;
use crate::pagination::{ListOptions, PaginatedList};
use crate::resource::{ResourceContext, pluck_data};
use crate::wait::wait_for_finish;

/// Client of a single build.
#[derive(Debug, Clone)]
pub struct BuildClient {
    context: ResourceContext,
}

impl BuildClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the build.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the build; `None` if it does not exist.
    ///
    /// `wait_for_finish` lets the server hold the answer up to that many
    /// seconds until the build finishes.
    pub async fn get(&self, wait_for_finish: Option<u64>) -> Result<Option<Value>> {
        let mut params = QueryParams::new();
        params.insert_opt("waitForFinish", wait_for_finish);
        self.context.get_resource("get", &params).await
    }

    /// Abort the build.
    pub async fn abort(&self) -> Result<Value> {
        let response = self
            .context
            .request(Method::POST, self.context.url_with("abort"), "abort")?
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }

    /// Delete the build.
    pub async fn delete(&self) -> Result<()> {
        self.context.delete_resource("delete").await
    }

    /// Wait for the build to finish, at most `wait_secs`.
    pub async fn wait_for_finish(&self, wait_secs: Option<u64>) -> Result<Value> {
        wait_for_finish(&self.context, wait_secs).await
    }

    /// Log of the build.
    pub fn log(&self) -> LogClient {
        LogClient::new(self.context.sub_resource("LogClient", "log", None))
    }
}

/// Client of a build collection.
#[derive(Debug, Clone)]
pub struct BuildCollectionClient {
    context: ResourceContext,
}

impl BuildCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List one page of builds.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_resource("list", options).await
    }

    /// List builds across pages up to `options.limit`.
    pub async fn list_all(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_all_resource("listAll", options).await
    }
}
