//! Dataset clients.

use apify_http_client::{Bytes, HttpClientError, Method, QueryParams, Result};
use serde::{Serialize, Serializer};
use serde_json::Value;

use crate::pagination::{ListOptions, PaginatedList, collect_pages};
use crate::resource::{ResourceContext, require_object};

/// Options of reading dataset items.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetItemsOptions {
    /// Number of items to skip.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u64>,
    /// Maximum number of items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// Newest items first.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desc: Option<bool>,
    /// Skip empty items and hidden fields.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clean: Option<bool>,
    /// Only these fields.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_list")]
    pub fields: Vec<String>,
    /// Drop these fields.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_list")]
    pub omit: Vec<String>,
    /// Expand an array field into separate items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unwind: Option<String>,
    /// Skip empty items.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_empty: Option<bool>,
    /// Skip fields starting with `#`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skip_hidden: Option<bool>,
    /// Flatten these nested fields.
    #[serde(skip_serializing_if = "Vec::is_empty", serialize_with = "comma_list")]
    pub flatten: Vec<String>,
    /// Named view of the dataset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
}

fn comma_list<S: Serializer>(
    values: &[String],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&values.join(","))
}

/// Export formats of [`DatasetClient::download_items`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadFormat {
    Json,
    Jsonl,
    Xml,
    Html,
    Csv,
    Xlsx,
    Rss,
}

impl DownloadFormat {
    /// Value of the `format` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Jsonl => "jsonl",
            Self::Xml => "xml",
            Self::Html => "html",
            Self::Csv => "csv",
            Self::Xlsx => "xlsx",
            Self::Rss => "rss",
        }
    }
}

/// Client of a single dataset.
#[derive(Debug, Clone)]
pub struct DatasetClient {
    context: ResourceContext,
}

impl DatasetClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the dataset.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the dataset; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Value>> {
        self.context.get_resource("get", &QueryParams::new()).await
    }

    /// Update fields of the dataset, e.g. its name.
    pub async fn update(&self, fields: &Value) -> Result<Value> {
        require_object(fields, "dataset fields")?;
        self.context.update_resource("update", fields).await
    }

    /// Delete the dataset.
    pub async fn delete(&self) -> Result<()> {
        self.context.delete_resource("delete").await
    }

    /// Read one page of items.
    ///
    /// Pagination comes from the `x-apify-pagination-*` response headers.
    pub async fn list_items(&self, options: &DatasetItemsOptions) -> Result<PaginatedList<Value>> {
        let params = QueryParams::from_serialize(options)?;
        let response = self
            .context
            .request(Method::GET, self.context.url_with("items"), "listItems")?
            .params(&params)
            .send()
            .await?;
        let items: Vec<Value> = response.json()?;
        Ok(PaginatedList::from_headers(&response, items))
    }

    /// Read items across pages up to `options.limit`.
    pub async fn list_all_items(
        &self,
        options: &DatasetItemsOptions,
    ) -> Result<PaginatedList<Value>> {
        collect_pages(options.offset.unwrap_or(0), options.limit, |offset, limit| {
            let mut page = options.clone();
            page.offset = Some(offset);
            page.limit = limit;
            async move { self.list_items(&page).await }
        })
        .await
    }

    /// Export items in the given format as raw bytes.
    pub async fn download_items(
        &self,
        format: DownloadFormat,
        options: &DatasetItemsOptions,
    ) -> Result<Bytes> {
        let params = QueryParams::from_serialize(options)?.with("format", format.as_str());
        let response = self
            .context
            .request(Method::GET, self.context.url_with("items"), "downloadItems")?
            .params(&params)
            .force_binary()
            .send()
            .await?;
        Ok(response.into_body().into_bytes())
    }

    /// Append items: a single object or a non-empty array of objects.
    ///
    /// Large payloads are gzipped. Timed out pushes are not retried, the
    /// items may already be stored.
    pub async fn push_items(&self, items: &Value) -> Result<()> {
        validate_items(items)?;
        self.context
            .request(Method::POST, self.context.url_with("items"), "pushItems")?
            .json(items)?
            .do_not_retry_timeouts()
            .send()
            .await?;
        Ok(())
    }
}

fn validate_items(items: &Value) -> Result<()> {
    match items {
        Value::Object(_) => Ok(()),
        Value::Array(array) if array.is_empty() => Err(HttpClientError::Validation(
            "items must not be empty".to_string(),
        )),
        Value::Array(array) if array.iter().all(Value::is_object) => Ok(()),
        Value::Array(_) => Err(HttpClientError::Validation(
            "every item must be a JSON object".to_string(),
        )),
        _ => Err(HttpClientError::Validation(
            "items must be a JSON object or an array of objects".to_string(),
        )),
    }
}

/// Client of the dataset collection.
#[derive(Debug, Clone)]
pub struct DatasetCollectionClient {
    context: ResourceContext,
}

impl DatasetCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List one page of datasets.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_resource("list", options).await
    }

    /// List datasets across pages up to `options.limit`.
    pub async fn list_all(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_all_resource("listAll", options).await
    }

    /// Return the dataset called `name`, creating it if needed. Without a
    /// name a new unnamed dataset is created.
    pub async fn get_or_create(&self, name: Option<&str>) -> Result<Value> {
        self.context.get_or_create_resource("getOrCreate", name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_items_options_serialize() {
        let options = DatasetItemsOptions {
            limit: Some(10),
            clean: Some(true),
            fields: vec!["url".to_string(), "title".to_string()],
            ..Default::default()
        };
        let params = QueryParams::from_serialize(&options).unwrap();
        assert_eq!(params.get("fields").unwrap().to_query_string(), "url,title");
        assert_eq!(params.get("clean").unwrap().to_query_string(), "1");
        assert!(params.get("omit").is_none());
        assert!(params.get("skipEmpty").is_none());
    }

    #[test]
    fn test_validate_items() {
        assert!(validate_items(&json!({ "a": 1 })).is_ok());
        assert!(validate_items(&json!([{ "a": 1 }, { "b": 2 }])).is_ok());
        assert!(validate_items(&json!([])).is_err());
        assert!(validate_items(&json!([1, 2])).is_err());
        assert!(validate_items(&json!("text")).is_err());
    }
}
