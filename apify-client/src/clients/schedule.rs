//! Schedule clients.

use apify_http_client::{Method, QueryParams, Result};
use serde_json::Value;

use crate::dates::parse_date_fields;
use crate::pagination::{ListOptions, PaginatedList};
use crate::resource::{ResourceContext, pluck_data, require_object};

/// Client of a single schedule.
#[derive(Debug, Clone)]
pub struct ScheduleClient {
    context: ResourceContext,
}

impl ScheduleClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the schedule.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the schedule; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Value>> {
        self.context.get_resource("get", &QueryParams::new()).await
    }

    /// Update fields of the schedule.
    pub async fn update(&self, fields: &Value) -> Result<Value> {
        require_object(fields, "schedule fields")?;
        self.context.update_resource("update", fields).await
    }

    /// Delete the schedule.
    pub async fn delete(&self) -> Result<()> {
        self.context.delete_resource("delete").await
    }

    /// Invocation log of the schedule; `None` if it does not exist.
    pub async fn get_log(&self) -> Result<Option<Value>> {
        match self
            .context
            .request(Method::GET, self.context.url_with("log"), "getLog")?
            .send()
            .await
        {
            Ok(response) => pluck_data(response).map(|data| Some(parse_date_fields(data))),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }
}

/// Client of the schedule collection.
#[derive(Debug, Clone)]
pub struct ScheduleCollectionClient {
    context: ResourceContext,
}

impl ScheduleCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List one page of schedules.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_resource("list", options).await
    }

    /// List schedules across pages up to `options.limit`.
    pub async fn list_all(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_all_resource("listAll", options).await
    }

    /// Create a schedule.
    pub async fn create(&self, schedule: &Value) -> Result<Value> {
        require_object(schedule, "schedule")?;
        self.context
            .create_resource("create", schedule, &QueryParams::new())
            .await
    }
}
