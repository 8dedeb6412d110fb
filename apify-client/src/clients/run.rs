//! Actor run clients.

use apify_http_client::{HttpClientError, Method, QueryParams, Result};
use serde::Serialize;
use serde_json::Value;

use super::actor::with_input;
use super::{DatasetClient, KeyValueStoreClient, LogClient, RequestQueueClient};
use crate::dates::parse_date_fields;
use crate::pagination::{ListOptions, PaginatedList};
use crate::resource::{ResourceContext, pluck_data, require_object};
use crate::wait::wait_for_finish;

/// Options of transforming a run into another actor.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetamorphOptions {
    /// Build of the target actor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    /// Content type of the input. JSON when unset.
    #[serde(skip)]
    pub content_type: Option<String>,
}

/// Options of resurrecting a finished run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResurrectOptions {
    /// Build to resurrect with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    /// Memory in megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    /// Run timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

/// Client of a single run.
#[derive(Debug, Clone)]
pub struct RunClient {
    context: ResourceContext,
}

impl RunClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the run.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the run; `None` if it does not exist.
    ///
    /// `wait_for_finish` lets the server hold the answer up to that many
    /// seconds until the run finishes.
    pub async fn get(&self, wait_for_finish: Option<u64>) -> Result<Option<Value>> {
        let mut params = QueryParams::new();
        params.insert_opt("waitForFinish", wait_for_finish);
        self.context.get_resource("get", &params).await
    }

    /// Update fields of the run, e.g. its status message.
    pub async fn update(&self, fields: &Value) -> Result<Value> {
        require_object(fields, "run fields")?;
        self.context.update_resource("update", fields).await
    }

    /// Delete the run.
    pub async fn delete(&self) -> Result<()> {
        self.context.delete_resource("delete").await
    }

    /// Abort the run. A graceful abort lets the run persist its state first.
    pub async fn abort(&self, gracefully: Option<bool>) -> Result<Value> {
        let mut params = QueryParams::new();
        params.insert_opt("gracefully", gracefully);
        self.post_action("abort", "abort", &params).await
    }

    /// Transform the run into a run of another actor.
    pub async fn metamorph(
        &self,
        target_actor_id: &str,
        input: Option<&Value>,
        options: &MetamorphOptions,
    ) -> Result<Value> {
        if target_actor_id.is_empty() {
            return Err(HttpClientError::Validation(
                "target actor id must not be empty".to_string(),
            ));
        }
        let params = QueryParams::from_serialize(options)?.with("targetActorId", target_actor_id);
        let request = self
            .context
            .request(Method::POST, self.context.url_with("metamorph"), "metamorph")?
            .params(&params);
        let response = with_input(request, input, options.content_type.as_deref())?
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }

    /// Restart the run's container.
    pub async fn reboot(&self) -> Result<Value> {
        self.post_action("reboot", "reboot", &QueryParams::new()).await
    }

    /// Resume a finished run.
    pub async fn resurrect(&self, options: &ResurrectOptions) -> Result<Value> {
        let params = QueryParams::from_serialize(options)?;
        self.post_action("resurrect", "resurrect", &params).await
    }

    /// Wait for the run to finish, at most `wait_secs`.
    ///
    /// The run is returned as last seen, which may still be running when the
    /// budget ran out.
    pub async fn wait_for_finish(&self, wait_secs: Option<u64>) -> Result<Value> {
        wait_for_finish(&self.context, wait_secs).await
    }

    /// Default dataset of the run.
    pub fn dataset(&self) -> DatasetClient {
        DatasetClient::new(self.context.sub_resource("DatasetClient", "dataset", None))
    }

    /// Default key-value store of the run.
    pub fn key_value_store(&self) -> KeyValueStoreClient {
        KeyValueStoreClient::new(self.context.sub_resource(
            "KeyValueStoreClient",
            "key-value-store",
            None,
        ))
    }

    /// Default request queue of the run.
    pub fn request_queue(&self) -> RequestQueueClient {
        RequestQueueClient::new(self.context.sub_resource(
            "RequestQueueClient",
            "request-queue",
            None,
        ))
    }

    /// Log of the run.
    pub fn log(&self) -> LogClient {
        LogClient::new(self.context.sub_resource("LogClient", "log", None))
    }

    async fn post_action(
        &self,
        action: &str,
        method_name: &str,
        params: &QueryParams,
    ) -> Result<Value> {
        let response = self
            .context
            .request(Method::POST, self.context.url_with(action), method_name)?
            .params(params)
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }
}

/// Client of a run collection.
#[derive(Debug, Clone)]
pub struct RunCollectionClient {
    context: ResourceContext,
}

impl RunCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List one page of runs, optionally filtered by `options.status`.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_resource("list", options).await
    }

    /// List runs across pages up to `options.limit`.
    pub async fn list_all(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_all_resource("listAll", options).await
    }
}
