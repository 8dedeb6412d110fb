//! Key-value store clients.

use apify_http_client::{HttpClientError, Method, QueryParams, RequestBody, ResponseBody, Result};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;

use crate::dates::parse_date_fields;
use crate::pagination::{ListOptions, PaginatedList};
use crate::resource::{ResourceContext, pluck_data, require_object};

/// Options of listing store keys.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListKeysOptions {
    /// Maximum number of keys.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
    /// List keys after this one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_start_key: Option<String>,
}

/// A stored record.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValueStoreRecord {
    /// Key of the record.
    pub key: String,
    /// Decoded value, or raw bytes when requested as a buffer.
    pub value: ResponseBody,
    /// Content type the record was stored with.
    pub content_type: Option<String>,
}

/// Options of writing a record.
#[derive(Debug, Clone, Default)]
pub struct SetRecordOptions {
    /// Content type overriding the one implied by the value.
    pub content_type: Option<String>,
    /// Timeout of a single attempt.
    pub timeout: Option<Duration>,
    /// Do not retry attempts that time out.
    pub do_not_retry_timeouts: bool,
}

/// Client of a single key-value store.
#[derive(Debug, Clone)]
pub struct KeyValueStoreClient {
    context: ResourceContext,
}

impl KeyValueStoreClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the store.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the store; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<Value>> {
        self.context.get_resource("get", &QueryParams::new()).await
    }

    /// Update fields of the store.
    pub async fn update(&self, fields: &Value) -> Result<Value> {
        require_object(fields, "store fields")?;
        self.context.update_resource("update", fields).await
    }

    /// Delete the store.
    pub async fn delete(&self) -> Result<()> {
        self.context.delete_resource("delete").await
    }

    /// List keys of the store.
    pub async fn list_keys(&self, options: &ListKeysOptions) -> Result<Value> {
        let params = QueryParams::from_serialize(options)?;
        let response = self
            .context
            .request(Method::GET, self.context.url_with("keys"), "listKeys")?
            .params(&params)
            .send()
            .await?;
        pluck_data(response).map(parse_date_fields)
    }

    /// Read a record; `None` if it does not exist.
    ///
    /// With `buffer` the value is returned as raw bytes whatever its
    /// content type.
    pub async fn get_record(
        &self,
        key: &str,
        buffer: bool,
    ) -> Result<Option<KeyValueStoreRecord>> {
        let mut request = self
            .context
            .request(Method::GET, self.record_url(key)?, "getRecord")?;
        if buffer {
            request = request.force_binary();
        }

        match request.send().await {
            Ok(response) => {
                let content_type = response.content_type().map(str::to_string);
                Ok(Some(KeyValueStoreRecord {
                    key: key.to_string(),
                    value: response.into_body(),
                    content_type,
                }))
            }
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Check if a record exists without downloading it.
    pub async fn record_exists(&self, key: &str) -> Result<bool> {
        match self
            .context
            .request(Method::HEAD, self.record_url(key)?, "recordExists")?
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(error) if error.is_not_found() => Ok(false),
            Err(error) => Err(error),
        }
    }

    /// Write a record.
    ///
    /// Without an explicit content type it follows the value: JSON, text or
    /// binary. Streamed values are sent once and never retried.
    pub async fn set_record(
        &self,
        key: &str,
        value: impl Into<RequestBody>,
        options: &SetRecordOptions,
    ) -> Result<()> {
        let mut request = self
            .context
            .request(Method::PUT, self.record_url(key)?, "setRecord")?
            .body(value);
        if let Some(content_type) = &options.content_type {
            request = request.content_type(content_type);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }
        if options.do_not_retry_timeouts {
            request = request.do_not_retry_timeouts();
        }
        request.send().await?;
        Ok(())
    }

    /// Delete a record. Deleting a missing record succeeds.
    pub async fn delete_record(&self, key: &str) -> Result<()> {
        match self
            .context
            .request(Method::DELETE, self.record_url(key)?, "deleteRecord")?
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(error) if error.is_not_found() => Ok(()),
            Err(error) => Err(error),
        }
    }

    fn record_url(&self, key: &str) -> Result<String> {
        if key.is_empty() {
            return Err(HttpClientError::Validation(
                "record key must not be empty".to_string(),
            ));
        }
        Ok(self.context.url_with(&format!("records/{key}")))
    }
}

/// Client of the key-value store collection.
#[derive(Debug, Clone)]
pub struct KeyValueStoreCollectionClient {
    context: ResourceContext,
}

impl KeyValueStoreCollectionClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the collection.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// List one page of stores.
    pub async fn list(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_resource("list", options).await
    }

    /// List stores across pages up to `options.limit`.
    pub async fn list_all(&self, options: &ListOptions) -> Result<PaginatedList<Value>> {
        self.context.list_all_resource("listAll", options).await
    }

    /// Return the store called `name`, creating it if needed.
    pub async fn get_or_create(&self, name: Option<&str>) -> Result<Value> {
        self.context.get_or_create_resource("getOrCreate", name).await
    }
}
