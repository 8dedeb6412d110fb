//! Request queue clients.

use apify_http_client::{HttpClientError, Method, QueryParams, Result};
use serde_json::Value;

use crate::dates::parse_date_fields;
use crate::pagination::{ListOptions, PaginatedList};
use crate::resource::{ResourceContext, pluck_data, require_object};

/// Client of a single request queue.
///
/// A client key identifies the consumer of the queue; the API uses it to
/// tell whether a queue had more than one client.
#[derive(Debug, Clone)]
pub struct RequestQueueClient {
    context: ResourceContext,
    client_key: Option<String>,
}

impl RequestQueueClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self {
            context,
            client_key: None,
        }
    }

    /// Copy of the client sending `client_key` with queue operations.
    pub fn with_client_key(mut self, client_key: impl Into<String>) -> Self {
        self.client_key = Some(client_key.into());
        self
    }

    /// URL of the queue.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the queue; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Value>> {
        self.context.get_resource("get", &QueryParams::new()).await
    }

    /// Update fields of the queue.
    pub async fn update(&self, fields: &Value) -> Result<Value> {
        require_object(fields, "queue fields")?;
        self.context.update_resource("update", fields).await
    }

    /// Delete the queue.
    pub async fn delete(&self) -> Result<()> {
        self.context.delete_resource("delete").await
    }

    /// Requests at the head of the queue.
    pub async fn list_head(&self, limit: Option<u64>) -> Result<Value> {
        let mut params = self.key_params();
        params.insert_opt("limit", limit);
        self.send(Method::GET, "head", "listHead", &params, None).await
    }

    /// Add a request. `forefront` puts it at the head of the queue.
    ///
    /// The request must not carry an `id`; the API assigns one.
    pub async fn add_request(&self, request: &Value, forefront: bool) -> Result<Value> {
        require_object(request, "request")?;
        if request.get("id").is_some() {
            return Err(HttpClientError::Validation(
                "a new request must not have an `id`".to_string(),
            ));
        }
        let params = self.key_params().with("forefront", forefront);
        self.send(Method::POST, "requests", "addRequest", &params, Some(request))
            .await
    }

    /// Add many requests in one call.
    pub async fn batch_add_requests(&self, requests: &[Value], forefront: bool) -> Result<Value> {
        if requests.is_empty() {
            return Err(HttpClientError::Validation(
                "requests must not be empty".to_string(),
            ));
        }
        for request in requests {
            require_object(request, "request")?;
        }
        let params = self.key_params().with("forefront", forefront);
        let body = Value::Array(requests.to_vec());
        self.send(
            Method::POST,
            "requests/batch",
            "batchAddRequests",
            &params,
            Some(&body),
        )
        .await
    }

    /// Read a request; `None` if it does not exist.
    pub async fn get_request(&self, id: &str) -> Result<Option<Value>> {
        let url = self.request_url(id)?;
        match self
            .context
            .request(Method::GET, url, "getRequest")?
            .send()
            .await
        {
            Ok(response) => pluck_data(response).map(|data| Some(parse_date_fields(data))),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Replace a stored request, identified by its `id` field.
    pub async fn update_request(&self, request: &Value, forefront: bool) -> Result<Value> {
        require_object(request, "request")?;
        let id = request
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| {
                HttpClientError::Validation("an updated request must have an `id`".to_string())
            })?;
        let params = self.key_params().with("forefront", forefront);
        let response = self
            .context
            .request(Method::PUT, self.request_url(id)?, "updateRequest")?
            .params(&params)
            .json(request)?
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }

    /// Delete a request.
    pub async fn delete_request(&self, id: &str) -> Result<()> {
        let url = self.request_url(id)?;
        self.context
            .request(Method::DELETE, url, "deleteRequest")?
            .params(&self.key_params())
            .send()
            .await?;
        Ok(())
    }

    fn key_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.insert_opt("clientKey", self.client_key.as_deref());
        params
    }

    fn request_url(&self, id: &str) -> Result<String> {
        if id.is_empty() {
            return Err(HttpClientError::Validation(
                "request id must not be empty".to_string(),
            ));
        }
        Ok(self.context.url_with(&format!("requests/{id}")))
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        method_name: &str,
        params: &QueryParams,
        body: Option<&Value>,
    ) -> Result<Value> {
        let mut request = self
            .context
            .request(method, self.context.url_with(path), method_name)?
            .params(params);
        if let Some(body) = body {
            request = request.json(body)?;
        }
        let response = request.send().await?;
        pluck_data(response).map(parse_date_fields)
    }
}

/// Client of the request queue collection.
#[derive(Debug, Clone)]
pub struct RequestQueueCollectionClient {
    context: ResourceContext,
}

impl RequestQueueCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List one page of queues.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_resource("list", options).await
    }

    /// List queues across pages up to `options.limit`.
    pub async fn list_all(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_all_resource("listAll", options).await
    }

    /// Return the queue called `name`, creating it if needed.
    pub async fn get_or_create(&self, name: Option<&str>) -> Result<Value> {
        self.context.get_or_create_resource("getOrCreate", name).await
    }
}
