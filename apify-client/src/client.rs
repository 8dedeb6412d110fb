//! Root client.

use apify_http_client::{HttpClient, Result, Statistics};
use std::sync::Arc;
use tracing::debug;

use crate::clients::*;
use crate::config::ApifyClientConfig;
use crate::resource::{ResourceContext, Shared};

/// Entry point of the API.
///
/// Cloning is cheap; clones share the transport and the statistics.
///
/// ```rust,no_run
/// use apify_client::ApifyClient;
///
/// # async fn example() -> apify_client::Result<()> {
/// let client = ApifyClient::new("my-token")?;
/// let run = client
///     .actor("apify/hello-world")
///     .call(None, &Default::default(), Some(60))
///     .await?;
/// println!("run finished with status {}", run["status"]);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ApifyClient {
    http: HttpClient,
    shared: Arc<Shared>,
}

impl std::fmt::Debug for ApifyClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApifyClient")
            .field("base_url", &self.shared.base_url)
            .finish()
    }
}

impl ApifyClient {
    /// Create a client for the production API authenticated with `token`.
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_config(ApifyClientConfig::builder().token(token).build())
    }

    /// Create a client from a configuration.
    pub fn with_config(config: ApifyClientConfig) -> Result<Self> {
        let base_url = config.api_url();
        let mut http_config = config.http.clone();
        http_config.user_agent = config.user_agent();
        debug!(base_url = %base_url, "Creating API client");

        Ok(Self {
            http: HttpClient::new(http_config)?,
            shared: Arc::new(Shared {
                base_url,
                max_wait_for_finish_secs: config.max_wait_for_finish_secs,
            }),
        })
    }

    /// API root including the version segment.
    pub fn base_url(&self) -> &str {
        &self.shared.base_url
    }

    /// Call statistics of this client and its clones.
    pub fn stats(&self) -> &Arc<Statistics> {
        self.http.stats()
    }

    fn context(&self, client_name: &'static str, path: &str, id: Option<&str>) -> ResourceContext {
        ResourceContext::top_level(
            self.http.clone(),
            self.shared.clone(),
            client_name,
            path,
            id,
        )
    }

    /// Actor collection.
    pub fn actors(&self) -> ActorCollectionClient {
        ActorCollectionClient::new(self.context("ActorCollectionClient", "acts", None))
    }

    /// Single actor by ID or `username/name`.
    pub fn actor(&self, id: &str) -> ActorClient {
        ActorClient::new(self.context("ActorClient", "acts", Some(id)))
    }

    /// Build collection of the user.
    pub fn builds(&self) -> BuildCollectionClient {
        BuildCollectionClient::new(self.context("BuildCollectionClient", "actor-builds", None))
    }

    /// Single build.
    pub fn build(&self, id: &str) -> BuildClient {
        BuildClient::new(self.context("BuildClient", "actor-builds", Some(id)))
    }

    /// Run collection of the user.
    pub fn runs(&self) -> RunCollectionClient {
        RunCollectionClient::new(self.context("RunCollectionClient", "actor-runs", None))
    }

    /// Single run.
    pub fn run(&self, id: &str) -> RunClient {
        RunClient::new(self.context("RunClient", "actor-runs", Some(id)))
    }

    /// Dataset collection.
    pub fn datasets(&self) -> DatasetCollectionClient {
        DatasetCollectionClient::new(self.context("DatasetCollectionClient", "datasets", None))
    }

    /// Single dataset by ID or `username/name`.
    pub fn dataset(&self, id: &str) -> DatasetClient {
        DatasetClient::new(self.context("DatasetClient", "datasets", Some(id)))
    }

    /// Key-value store collection.
    pub fn key_value_stores(&self) -> KeyValueStoreCollectionClient {
        KeyValueStoreCollectionClient::new(self.context(
            "KeyValueStoreCollectionClient",
            "key-value-stores",
            None,
        ))
    }

    /// Single key-value store by ID or `username/name`.
    pub fn key_value_store(&self, id: &str) -> KeyValueStoreClient {
        KeyValueStoreClient::new(self.context("KeyValueStoreClient", "key-value-stores", Some(id)))
    }

    /// Request queue collection.
    pub fn request_queues(&self) -> RequestQueueCollectionClient {
        RequestQueueCollectionClient::new(self.context(
            "RequestQueueCollectionClient",
            "request-queues",
            None,
        ))
    }

    /// Single request queue by ID or `username/name`.
    pub fn request_queue(&self, id: &str) -> RequestQueueClient {
        RequestQueueClient::new(self.context("RequestQueueClient", "request-queues", Some(id)))
    }

    /// Task collection.
    pub fn tasks(&self) -> TaskCollectionClient {
        TaskCollectionClient::new(self.context("TaskCollectionClient", "actor-tasks", None))
    }

    /// Single task by ID or `username/name`.
    pub fn task(&self, id: &str) -> TaskClient {
        TaskClient::new(self.context("TaskClient", "actor-tasks", Some(id)))
    }

    /// Schedule collection.
    pub fn schedules(&self) -> ScheduleCollectionClient {
        ScheduleCollectionClient::new(self.context("ScheduleCollectionClient", "schedules", None))
    }

    /// Single schedule.
    pub fn schedule(&self, id: &str) -> ScheduleClient {
        ScheduleClient::new(self.context("ScheduleClient", "schedules", Some(id)))
    }

    /// Webhook collection.
    pub fn webhooks(&self) -> WebhookCollectionClient {
        WebhookCollectionClient::new(self.context("WebhookCollectionClient", "webhooks", None))
    }

    /// Single webhook.
    pub fn webhook(&self, id: &str) -> WebhookClient {
        WebhookClient::new(self.context("WebhookClient", "webhooks", Some(id)))
    }

    /// Webhook dispatch collection.
    pub fn webhook_dispatches(&self) -> WebhookDispatchCollectionClient {
        WebhookDispatchCollectionClient::new(self.context(
            "WebhookDispatchCollectionClient",
            "webhook-dispatches",
            None,
        ))
    }

    /// Single webhook dispatch.
    pub fn webhook_dispatch(&self, id: &str) -> WebhookDispatchClient {
        WebhookDispatchClient::new(self.context(
            "WebhookDispatchClient",
            "webhook-dispatches",
            Some(id),
        ))
    }

    /// A user account; `None` addresses the token owner.
    pub fn user(&self, id: Option<&str>) -> UserClient {
        UserClient::new(self.context("UserClient", "users", Some(id.unwrap_or(ME_USER_ID))))
    }

    /// Log of a run or build.
    pub fn log(&self, build_or_run_id: &str) -> LogClient {
        LogClient::new(self.context("LogClient", "logs", Some(build_or_run_id)))
    }
}
