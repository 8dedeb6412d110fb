//! Actor clients.

use apify_http_client::{HttpClientError, Method, QueryParams, RequestBuilder, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::{
    ActorVersionClient, ActorVersionCollectionClient, BuildCollectionClient, RunClient,
    RunCollectionClient, WebhookCollectionClient,
};
use crate::dates::parse_date_fields;
use crate::pagination::{ListOptions, PaginatedList};
use crate::resource::{ResourceContext, pluck_data, require_object};
use crate::wait::ActorJobStatus;

/// Options of starting an actor or task run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStartOptions {
    /// Build tag or number to run.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build: Option<String>,
    /// Memory in megabytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
    /// Run timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Seconds the server may hold the answer waiting for the run to finish.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_finish: Option<u64>,
    /// Maximum dataset items charged for pay-per-result actors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    /// Content type of the input. JSON when unset.
    #[serde(skip)]
    pub content_type: Option<String>,
    /// Ad-hoc webhooks of the run.
    #[serde(skip)]
    pub webhooks: Option<Vec<Value>>,
}

impl RunStartOptions {
    /// Query parameters of the start call.
    ///
    /// Ad-hoc webhooks travel as base64 of their JSON array.
    pub(crate) fn to_params(&self) -> Result<QueryParams> {
        let mut params = QueryParams::from_serialize(self)?;
        if let Some(webhooks) = &self.webhooks {
            if webhooks.iter().any(|webhook| !webhook.is_object()) {
                return Err(HttpClientError::Validation(
                    "webhooks must be JSON objects".to_string(),
                ));
            }
            let json =
                serde_json::to_string(webhooks).map_err(|e| HttpClientError::Json(e.to_string()))?;
            params.insert("webhooks", STANDARD.encode(json));
        }
        Ok(params)
    }
}

/// Attach a run input to a start request.
///
/// String input with an explicit content type goes out as text, anything
/// else as JSON.
pub(crate) fn with_input<'a>(
    request: RequestBuilder<'a>,
    input: Option<&Value>,
    content_type: Option<&str>,
) -> Result<RequestBuilder<'a>> {
    let Some(input) = input else {
        return Ok(request);
    };
    let request = match (input, content_type) {
        (Value::String(text), Some(_)) => request.body(text.clone()),
        _ => request.json(input)?,
    };
    Ok(match content_type {
        Some(content_type) => request.content_type(content_type),
        None => request,
    })
}

/// Options of building an actor.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorBuildOptions {
    /// Install beta versions of the Apify packages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub beta_packages: Option<bool>,
    /// Tag given to the build.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    /// Reuse cached layers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_cache: Option<bool>,
    /// Seconds the server may hold the answer waiting for the build to finish.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wait_for_finish: Option<u64>,
}

/// Client of a single actor.
#[derive(Debug, Clone)]
pub struct ActorClient {
    context: ResourceContext,
}

impl ActorClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the actor.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the actor; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Value>> {
        self.context.get_resource("get", &QueryParams::new()).await
    }

    /// Update fields of the actor.
    pub async fn update(&self, fields: &Value) -> Result<Value> {
        require_object(fields, "actor fields")?;
        self.context.update_resource("update", fields).await
    }

    /// Delete the actor.
    pub async fn delete(&self) -> Result<()> {
        self.context.delete_resource("delete").await
    }

    /// Start a run and return it without waiting for it to finish.
    pub async fn start(&self, input: Option<&Value>, options: &RunStartOptions) -> Result<Value> {
        let params = options.to_params()?;
        let request = self
            .context
            .request(Method::POST, self.context.url_with("runs"), "start")?
            .params(&params);
        let response = with_input(request, input, options.content_type.as_deref())?
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }

    /// Start a run and wait for it to finish.
    ///
    /// Without `wait_secs` the wait is practically unbounded. The run is
    /// returned as last seen, which may still be running.
    pub async fn call(
        &self,
        input: Option<&Value>,
        options: &RunStartOptions,
        wait_secs: Option<u64>,
    ) -> Result<Value> {
        let run = self.start(input, options).await?;
        let id = run_id(&run)?;
        debug!(run_id = %id, "Actor run started, waiting for it to finish");
        RunClient::new(self.context.root_resource("RunClient", "actor-runs", Some(&id)))
            .wait_for_finish(wait_secs)
            .await
    }

    /// Build a version of the actor.
    pub async fn build(&self, version_number: &str, options: &ActorBuildOptions) -> Result<Value> {
        if version_number.is_empty() {
            return Err(HttpClientError::Validation(
                "version number must not be empty".to_string(),
            ));
        }
        let params = QueryParams::from_serialize(options)?.with("version", version_number);
        let response = self
            .context
            .request(Method::POST, self.context.url_with("builds"), "build")?
            .params(&params)
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
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

    /// Builds of the actor.
    pub fn builds(&self) -> BuildCollectionClient {
        BuildCollectionClient::new(
            self.context
                .sub_resource("BuildCollectionClient", "builds", None),
        )
    }

    /// Runs of the actor.
    pub fn runs(&self) -> RunCollectionClient {
        RunCollectionClient::new(self.context.sub_resource("RunCollectionClient", "runs", None))
    }

    /// One version of the actor, e.g. `0.1`.
    pub fn version(&self, version_number: &str) -> ActorVersionClient {
        ActorVersionClient::new(self.context.sub_resource(
            "ActorVersionClient",
            "versions",
            Some(version_number),
        ))
    }

    /// Versions of the actor.
    pub fn versions(&self) -> ActorVersionCollectionClient {
        ActorVersionCollectionClient::new(self.context.sub_resource(
            "ActorVersionCollectionClient",
            "versions",
            None,
        ))
    }

    /// Webhooks of the actor.
    pub fn webhooks(&self) -> WebhookCollectionClient {
        WebhookCollectionClient::new(self.context.sub_resource(
            "WebhookCollectionClient",
            "webhooks",
            None,
        ))
    }
}

/// ID of a freshly started run.
pub(crate) fn run_id(run: &Value) -> Result<String> {
    run.get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| {
            HttpClientError::UnexpectedResponse("started run carries no `id`".to_string())
        })
}

/// Client of the actor collection.
#[derive(Debug, Clone)]
pub struct ActorCollectionClient {
    context: ResourceContext,
}

impl ActorCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List one page of actors. `my` restricts to actors owned by the user.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_resource("list", options).await
    }

    /// List actors across pages up to `options.limit`.
    pub async fn list_all(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_all_resource("listAll", options).await
    }

    /// Create an actor.
    pub async fn create(&self, actor: &Value) -> Result<Value> {
        require_object(actor, "actor")?;
        self.context
            .create_resource("create", actor, &QueryParams::new())
            .await
    }
}
