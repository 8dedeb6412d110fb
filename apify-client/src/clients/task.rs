//! Actor task clients.

use apify_http_client::{HttpClientError, Method, QueryParams, Result};
use serde_json::Value;
use tracing::debug;

use super::actor::{RunStartOptions, run_id, with_input};
use super::{RunClient, RunCollectionClient, WebhookCollectionClient};
use crate::dates::parse_date_fields;
use crate::pagination::{ListOptions, PaginatedList};
use crate::resource::{ResourceContext, pluck_data, require_object};
use crate::wait::ActorJobStatus;

/// Client of a single task.
#[derive(Debug, Clone)]
pub struct TaskClient {
    context: ResourceContext,
}

impl TaskClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the task.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the task; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Value>> {
        self.context.get_resource("get", &QueryParams::new()).await
    }

    /// Update fields of the task.
    pub async fn update(&self, fields: &Value) -> Result<Value> {
        require_object(fields, "task fields")?;
        self.context.update_resource("update", fields).await
    }

    /// Delete the task.
    pub async fn delete(&self) -> Result<()> {
        self.context.delete_resource("delete").await
    }

    /// Start a run of the task. `input` overrides fields of the stored input.
    pub async fn start(&self, input: Option<&Value>, options: &RunStartOptions) -> Result<Value> {
        if let Some(input) = input {
            require_object(input, "task input")?;
        }
        let params = options.to_params()?;
        let request = self
            .context
            .request(Method::POST, self.context.url_with("runs"), "start")?
            .params(&params);
        let response = with_input(request, input, None)?.send().await?;
        pluck_data(response).map(parse_date_fields)
    }

    /// Start a run of the task and wait for it to finish.
    pub async fn call(
        &self,
        input: Option<&Value>,
        options: &RunStartOptions,
        wait_secs: Option<u64>,
    ) -> Result<Value> {
        let run = self.start(input, options).await?;
        let id = run_id(&run)?;
        debug!(run_id = %id, "Task run started, waiting for it to finish");
        RunClient::new(self.context.root_resource("RunClient", "actor-runs", Some(&id)))
            .wait_for_finish(wait_secs)
            .await
    }

    /// Stored input of the task; `None` if the task does not exist.
    ///
    /// The input is returned as stored, without an envelope.
    pub async fn get_input(&self) -> Result<Option<Value>> {
        match self
            .context
            .request(Method::GET, self.context.url_with("input"), "getInput")?
            .send()
            .await
        {
            Ok(response) => response.into_body().into_json().map(Some).ok_or_else(|| {
                HttpClientError::UnexpectedResponse("task input is not JSON".to_string())
            }),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Replace the stored input of the task.
    pub async fn update_input(&self, input: &Value) -> Result<Value> {
        require_object(input, "task input")?;
        let response = self
            .context
            .request(Method::PUT, self.context.url_with("input"), "updateInput")?
            .json(input)?
            .send()
            .await?;
        response.into_body().into_json().ok_or_else(|| {
            HttpClientError::UnexpectedResponse("task input is not JSON".to_string())
        })
    }

    /// Client of the last run, optionally only among runs in `status`.
    pub fn last_run(&self, status: Option<ActorJobStatus>) -> RunClient {
        let mut params = QueryParams::new();
        params.insert_opt("status", status.map(|status| status.as_str()));
        RunClient::new(
            self.context
                .sub_resource("RunClient", "runs", Some("last"))
                .with_params(&params),
        )
    }

    /// Runs of the task.
    pub fn runs(&self) -> RunCollectionClient {
        RunCollectionClient::new(self.context.sub_resource("RunCollectionClient", "runs", None))
    }

    /// Webhooks of the task.
    pub fn webhooks(&self) -> WebhookCollectionClient {
        WebhookCollectionClient::new(self.context.sub_resource(
            "WebhookCollectionClient",
            "webhooks",
            None,
        ))
    }
}

/// Client of the task collection.
#[derive(Debug, Clone)]
pub struct TaskCollectionClient {
    context: ResourceContext,
}

impl TaskCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List one page of tasks.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_resource("list", options).await
    }

    /// List tasks across pages up to `options.limit`.
    pub async fn list_all(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_all_resource("listAll", options).await
    }

    /// Create a task.
    pub async fn create(&self, task: &Value) -> Result<Value> {
        require_object(task, "task")?;
        self.context
            .create_resource("create", task, &QueryParams::new())
            .await
    }
}
