//! Generic resource client.
//!
//! Every concrete client wraps a [`ResourceContext`]: an immutable node of
//! the resource tree that knows its URL, its inherited query parameters and
//! the shared transport. Concrete clients delegate the generic operations
//! (get, update, delete, list, create, get-or-create) to it and derive their
//! children from it.

use apify_http_client::{
    HttpClient, HttpClientError, Method, QueryParams, RequestBuilder, Response, Result,
};
use serde_json::Value;
use std::sync::Arc;

use crate::dates::parse_date_fields;
use crate::pagination::{ListOptions, PaginatedList, collect_pages};

/// State shared by every node derived from one root client.
#[derive(Debug)]
pub(crate) struct Shared {
    /// API root including the version segment, e.g. `https://api.apify.com/v2`.
    pub base_url: String,
    /// Wait budget of `wait_for_finish` when the caller gives none.
    pub max_wait_for_finish_secs: u64,
}

/// One node of the resource tree.
#[derive(Clone)]
pub struct ResourceContext {
    http: HttpClient,
    shared: Arc<Shared>,
    client_name: &'static str,
    base_url: String,
    resource_path: String,
    id: Option<String>,
    params: QueryParams,
    /// Client whose ID was empty, on this node or any ancestor.
    empty_id_owner: Option<&'static str>,
}

impl std::fmt::Debug for ResourceContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceContext")
            .field("client_name", &self.client_name)
            .field("url", &self.url())
            .field("params", &self.params)
            .finish()
    }
}

impl ResourceContext {
    /// Create a node directly below the API root.
    pub(crate) fn top_level(
        http: HttpClient,
        shared: Arc<Shared>,
        client_name: &'static str,
        resource_path: &str,
        id: Option<&str>,
    ) -> Self {
        let base_url = shared.base_url.clone();
        Self {
            http,
            shared,
            client_name,
            base_url,
            resource_path: resource_path.to_string(),
            id: id.map(to_safe_id),
            params: QueryParams::new(),
            empty_id_owner: id.filter(|id| id.is_empty()).map(|_| client_name),
        }
    }

    /// Derive a child whose base URL is this node's URL.
    ///
    /// The child inherits the parameter bag and any empty-ID failure.
    pub(crate) fn sub_resource(
        &self,
        client_name: &'static str,
        resource_path: &str,
        id: Option<&str>,
    ) -> Self {
        Self {
            http: self.http.clone(),
            shared: self.shared.clone(),
            client_name,
            base_url: self.url(),
            resource_path: resource_path.to_string(),
            id: id.map(to_safe_id),
            params: self.params.clone(),
            empty_id_owner: self
                .empty_id_owner
                .or_else(|| id.filter(|id| id.is_empty()).map(|_| client_name)),
        }
    }

    /// Derive a node below the API root sharing this node's transport.
    pub(crate) fn root_resource(
        &self,
        client_name: &'static str,
        resource_path: &str,
        id: Option<&str>,
    ) -> Self {
        Self::top_level(
            self.http.clone(),
            self.shared.clone(),
            client_name,
            resource_path,
            id,
        )
    }

    /// Copy of this node with extra inherited parameters.
    pub(crate) fn with_params(mut self, params: &QueryParams) -> Self {
        self.params = self.params.merge(params);
        self
    }

    /// Full URL of the node.
    pub fn url(&self) -> String {
        match &self.id {
            Some(id) => format!("{}/{}/{}", self.base_url, self.resource_path, id),
            None => format!("{}/{}", self.base_url, self.resource_path),
        }
    }

    /// URL of a path below the node.
    pub fn url_with(&self, suffix: &str) -> String {
        format!("{}/{}", self.url(), suffix)
    }

    /// Safe ID of the node, if it addresses a single resource.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Inherited parameters merged with call parameters; call values win.
    pub fn params(&self, extra: &QueryParams) -> QueryParams {
        self.params.clone().merge(extra)
    }

    pub(crate) fn max_wait_for_finish_secs(&self) -> u64 {
        self.shared.max_wait_for_finish_secs
    }

    /// Start a request against `url`, labelled with the calling method.
    ///
    /// Fails before anything is sent if the node or one of its ancestors was
    /// built with an empty ID.
    pub(crate) fn request(
        &self,
        method: Method,
        url: impl Into<String>,
        method_name: &str,
    ) -> Result<RequestBuilder<'_>> {
        if let Some(owner) = self.empty_id_owner {
            return Err(HttpClientError::Validation(format!(
                "{owner}: resource id must not be empty"
            )));
        }
        Ok(self
            .http
            .request(method, url)
            .params(&self.params)
            .client_method(format!("{}.{}", self.client_name, method_name)))
    }

    /// GET the node. A missing record yields `None`.
    pub(crate) async fn get_resource(
        &self,
        method_name: &str,
        params: &QueryParams,
    ) -> Result<Option<Value>> {
        let response = self
            .request(Method::GET, self.url(), method_name)?
            .params(params)
            .send()
            .await;
        match response {
            Ok(response) => pluck_data(response).map(|data| Some(parse_date_fields(data))),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// PUT new fields; the server answers with the merged resource.
    pub(crate) async fn update_resource(&self, method_name: &str, fields: &Value) -> Result<Value> {
        let response = self
            .request(Method::PUT, self.url(), method_name)?
            .json(fields)?
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }

    /// DELETE the node. Deleting a missing record succeeds.
    pub(crate) async fn delete_resource(&self, method_name: &str) -> Result<()> {
        match self
            .request(Method::DELETE, self.url(), method_name)?
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(error) if error.is_not_found() => Ok(()),
            Err(error) => Err(error),
        }
    }

    /// GET one page of a collection.
    pub(crate) async fn list_resource(
        &self,
        method_name: &str,
        options: &ListOptions,
    ) -> Result<PaginatedList<Value>> {
        let params = QueryParams::from_serialize(options)?;
        let response = self
            .request(Method::GET, self.url(), method_name)?
            .params(&params)
            .send()
            .await?;
        let data = parse_date_fields(pluck_data(response)?);
        serde_json::from_value(data).map_err(|e| {
            HttpClientError::UnexpectedResponse(format!("malformed paginated list: {e}"))
        })
    }

    /// Follow collection pages until the limit or the end of the collection.
    pub(crate) async fn list_all_resource(
        &self,
        method_name: &str,
        options: &ListOptions,
    ) -> Result<PaginatedList<Value>> {
        collect_pages(options.offset.unwrap_or(0), options.limit, |offset, limit| {
            let mut page = options.clone();
            page.offset = Some(offset);
            page.limit = limit;
            async move { self.list_resource(method_name, &page).await }
        })
        .await
    }

    /// POST a new resource to a collection.
    pub(crate) async fn create_resource(
        &self,
        method_name: &str,
        resource: &Value,
        params: &QueryParams,
    ) -> Result<Value> {
        let response = self
            .request(Method::POST, self.url(), method_name)?
            .params(params)
            .json(resource)?
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }

    /// POST to a collection by name; an existing resource of that name is
    /// returned instead of a new one. Without a name an unnamed resource is
    /// created.
    pub(crate) async fn get_or_create_resource(
        &self,
        method_name: &str,
        name: Option<&str>,
    ) -> Result<Value> {
        if name.is_some_and(|name| name.trim().is_empty()) {
            return Err(HttpClientError::Validation(format!(
                "{}.{method_name}: name must not be empty",
                self.client_name
            )));
        }
        let mut params = QueryParams::new();
        params.insert_opt("name", name);
        let response = self
            .request(Method::POST, self.url(), method_name)?
            .params(&params)
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }
}

/// Take the payload out of a `{ "data": ... }` envelope.
pub fn pluck_data(response: Response) -> Result<Value> {
    let path = response.url().path().to_string();
    match response.into_body().into_json() {
        Some(Value::Object(mut envelope)) if envelope.contains_key("data") => {
            Ok(envelope.remove("data").unwrap_or(Value::Null))
        }
        _ => Err(HttpClientError::UnexpectedResponse(format!(
            "expected response object with a `data` property from {path}"
        ))),
    }
}

/// Make an ID embeddable in one path segment: `alice/my-actor` becomes
/// `alice~my-actor`.
pub fn to_safe_id(id: &str) -> String {
    id.replacen('/', "~", 1)
}

/// Reject values that must be JSON objects.
pub(crate) fn require_object(value: &Value, what: &str) -> Result<()> {
    if value.is_object() {
        Ok(())
    } else {
        Err(HttpClientError::Validation(format!(
            "{what} must be a JSON object"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use apify_http_client::{HttpClientConfig, ResponseBody};

    fn root() -> ResourceContext {
        let http = HttpClient::new(HttpClientConfig::default()).unwrap();
        let shared = Arc::new(Shared {
            base_url: "https://api.example.com/v2".to_string(),
            max_wait_for_finish_secs: 999_999,
        });
        ResourceContext::top_level(http, shared, "ActorClient", "acts", Some("alice/my-actor"))
    }

    #[test]
    fn test_safe_id_replaces_first_slash_only() {
        assert_eq!(to_safe_id("alice/my-actor"), "alice~my-actor");
        assert_eq!(to_safe_id("a/b/c"), "a~b/c");
        assert_eq!(to_safe_id("plainId"), "plainId");
    }

    #[test]
    fn test_urls_derive_from_parent() {
        let actor = root();
        assert_eq!(actor.url(), "https://api.example.com/v2/acts/alice~my-actor");
        assert_eq!(actor.id(), Some("alice~my-actor"));

        let runs = actor.sub_resource("RunCollectionClient", "runs", None);
        assert_eq!(runs.url(), "https://api.example.com/v2/acts/alice~my-actor/runs");

        let last = actor.sub_resource("RunClient", "runs", Some("last"));
        assert_eq!(
            last.url_with("abort"),
            "https://api.example.com/v2/acts/alice~my-actor/runs/last/abort"
        );

        let run = actor.root_resource("RunClient", "actor-runs", Some("xyz"));
        assert_eq!(run.url(), "https://api.example.com/v2/actor-runs/xyz");
    }

    #[test]
    fn test_params_are_inherited_and_overridden() {
        let inherited = QueryParams::new().with("status", "SUCCEEDED");
        let last = root()
            .sub_resource("RunClient", "runs", Some("last"))
            .with_params(&inherited);
        let dataset = last.sub_resource("DatasetClient", "dataset", None);

        let merged = dataset.params(&QueryParams::new().with("limit", 5u64));
        assert_eq!(merged.get("status").unwrap().to_query_string(), "SUCCEEDED");
        assert_eq!(merged.get("limit").unwrap().to_query_string(), "5");

        let overridden = dataset.params(&QueryParams::new().with("status", "FAILED"));
        assert_eq!(overridden.get("status").unwrap().to_query_string(), "FAILED");
    }

    #[test]
    fn test_empty_id_is_rejected_before_sending() {
        let node = root().root_resource("DatasetClient", "datasets", Some(""));
        let err = node.request(Method::GET, node.url(), "get").err().unwrap();
        assert!(matches!(err, HttpClientError::Validation(_)));
        assert_eq!(node.http.stats().calls(), 0);
    }

    #[test]
    fn test_empty_id_is_inherited_by_children() {
        let actor = root().root_resource("ActorClient", "acts", Some(""));
        let runs = actor.sub_resource("RunCollectionClient", "runs", None);
        let last = actor
            .sub_resource("RunClient", "runs", Some("last"))
            .with_params(&QueryParams::new().with("status", "SUCCEEDED"));
        let dataset = last.sub_resource("DatasetClient", "dataset", None);

        for node in [&runs, &last, &dataset] {
            let Err(HttpClientError::Validation(message)) =
                node.request(Method::GET, node.url(), "get")
            else {
                panic!("expected a validation error for {}", node.url());
            };
            assert!(message.starts_with("ActorClient:"), "{message}");
        }

        let run = actor.root_resource("RunClient", "actor-runs", Some("r1"));
        assert!(run.request(Method::GET, run.url(), "get").is_ok());
    }

    #[test]
    fn test_pluck_data() {
        let url = apify_http_client::Url::parse("https://api.example.com/v2/acts/x").unwrap();
        let response = Response::new(
            apify_http_client::StatusCode::OK,
            Default::default(),
            ResponseBody::Json(serde_json::json!({ "data": { "id": "x" } })),
            url.clone(),
        );
        assert_eq!(pluck_data(response).unwrap()["id"], "x");

        let response = Response::new(
            apify_http_client::StatusCode::OK,
            Default::default(),
            ResponseBody::Json(serde_json::json!({ "id": "x" })),
            url,
        );
        assert!(matches!(
            pluck_data(response),
            Err(HttpClientError::UnexpectedResponse(_))
        ));
    }

    #[test]
    fn test_require_object() {
        assert!(require_object(&serde_json::json!({ "a": 1 }), "input").is_ok());
        assert!(require_object(&serde_json::json!([1]), "input").is_err());
    }
}
