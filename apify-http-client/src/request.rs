//! Request descriptor, query parameters and request builder.

use bytes::Bytes;
use http::Method;
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Duration;

use crate::codec::RequestBody;
use crate::{HttpClient, HttpClientError, Response, Result};

/// Scalar value of a query parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    /// String value.
    String(String),
    /// Integer value.
    Int(i64),
    /// Floating point value.
    Float(f64),
    /// Boolean value, sent as `1` or `0`.
    Bool(bool),
}

impl QueryValue {
    /// Render the value as it goes on the wire.
    pub fn to_query_string(&self) -> String {
        match self {
            Self::String(s) => s.clone(),
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => if *b { "1" } else { "0" }.to_string(),
        }
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<&String> for QueryValue {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

macro_rules! query_value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for QueryValue {
                fn from(value: $ty) -> Self {
                    Self::Int(value as i64)
                }
            }
        )*
    };
}

query_value_from_int!(i32, i64, u32, u64, usize);

/// Ordered bag of query parameters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParams(BTreeMap<String, QueryValue>);

impl QueryParams {
    /// Create an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serialize a flat struct or map into parameters.
    ///
    /// `null` fields are skipped; nested objects and arrays are rejected.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        let value =
            serde_json::to_value(value).map_err(|e| HttpClientError::Json(e.to_string()))?;
        let serde_json::Value::Object(map) = value else {
            return Err(HttpClientError::Validation(
                "query parameters must serialize to an object".to_string(),
            ));
        };

        let mut params = Self::new();
        for (key, value) in map {
            let value = match value {
                serde_json::Value::Null => continue,
                serde_json::Value::Bool(b) => QueryValue::Bool(b),
                serde_json::Value::Number(n) => match n.as_i64() {
                    Some(i) => QueryValue::Int(i),
                    None => QueryValue::Float(n.as_f64().unwrap_or_default()),
                },
                serde_json::Value::String(s) => QueryValue::String(s),
                other => {
                    return Err(HttpClientError::Validation(format!(
                        "query parameter `{key}` must be a scalar, got {other}"
                    )));
                }
            };
            params.0.insert(key, value);
        }
        Ok(params)
    }

    /// Set a parameter.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        self.0.insert(key.into(), value.into());
    }

    /// Set a parameter if a value is present.
    pub fn insert_opt<V: Into<QueryValue>>(&mut self, key: impl Into<String>, value: Option<V>) {
        if let Some(value) = value {
            self.insert(key, value);
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Overlay another bag; its values win.
    pub fn merge(mut self, other: &QueryParams) -> Self {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), value.clone());
        }
        self
    }

    /// Get a parameter.
    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.0.get(key)
    }

    /// Check if no parameters are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &QueryValue)> {
        self.0.iter()
    }
}

/// Description of a single API call.
///
/// Built fresh for every call by [`RequestBuilder`]; the transport derives
/// one HTTP request per attempt from it.
#[derive(Debug)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Target URL without query.
    pub url: String,
    /// Query parameters.
    pub params: QueryParams,
    /// Extra headers.
    pub headers: Vec<(String, String)>,
    /// Optional body.
    pub body: Option<RequestBody>,
    /// Content type overriding the body's default.
    pub content_type: Option<String>,
    /// Return the payload raw instead of decoding it.
    pub force_binary: bool,
    /// Do not retry attempts that timed out.
    pub do_not_retry_timeouts: bool,
    /// Timeout of a single attempt, overriding the client's.
    pub timeout: Option<Duration>,
    /// Resource client method label for error reports.
    pub client_method: Option<String>,
}

impl HttpRequest {
    /// Create a bare request descriptor.
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            params: QueryParams::new(),
            headers: Vec::new(),
            body: None,
            content_type: None,
            force_binary: false,
            do_not_retry_timeouts: false,
            timeout: None,
            client_method: None,
        }
    }

    /// Compose the full URL with query parameters.
    pub fn full_url(&self) -> Result<url::Url> {
        let mut url = url::Url::parse(&self.url)?;
        if !self.params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in self.params.iter() {
                pairs.append_pair(key, &value.to_query_string());
            }
        }
        Ok(url)
    }
}

/// HTTP request builder.
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    request: HttpRequest,
}

impl<'a> RequestBuilder<'a> {
    /// Create a new request builder.
    pub(crate) fn new(client: &'a HttpClient, method: Method, url: String) -> Self {
        Self {
            client,
            request: HttpRequest::new(method, url),
        }
    }

    /// Add a header to the request.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.request.headers.push((name.into(), value.into()));
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.request.params.insert(key, value);
        self
    }

    /// Add multiple query parameters.
    pub fn params(mut self, params: &QueryParams) -> Self {
        self.request.params = std::mem::take(&mut self.request.params).merge(params);
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.request.body = Some(body.into());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, json: &T) -> Result<Self> {
        self.request.body = Some(RequestBody::json(json)?);
        Ok(self)
    }

    /// Set the request body as raw bytes.
    pub fn bytes(mut self, bytes: impl Into<Bytes>) -> Self {
        self.request.body = Some(RequestBody::Bytes(bytes.into()));
        self
    }

    /// Set a streamed request body.
    ///
    /// Streamed calls are sent once: no redirects, no retries.
    pub fn stream<S>(mut self, stream: S) -> Self
    where
        S: futures::TryStream + Send + 'static,
        S::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
        Bytes: From<S::Ok>,
    {
        self.request.body = Some(RequestBody::Stream(reqwest::Body::wrap_stream(stream)));
        self
    }

    /// Override the content type of the body.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.request.content_type = Some(content_type.into());
        self
    }

    /// Return the response payload raw.
    pub fn force_binary(mut self) -> Self {
        self.request.force_binary = true;
        self
    }

    /// Do not retry attempts that time out.
    pub fn do_not_retry_timeouts(mut self) -> Self {
        self.request.do_not_retry_timeouts = true;
        self
    }

    /// Set a custom timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.request.timeout = Some(timeout);
        self
    }

    /// Label the call with the resource client method issuing it.
    pub fn client_method(mut self, label: impl Into<String>) -> Self {
        self.request.client_method = Some(label.into());
        self
    }

    /// Finish building without sending.
    pub fn build(self) -> HttpRequest {
        self.request
    }

    /// Send the request.
    pub async fn send(self) -> Result<Response> {
        self.client.call(self.request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    #[serde(rename_all = "camelCase")]
    struct Options {
        offset: Option<u64>,
        limit: Option<u64>,
        desc: Option<bool>,
        skip_empty: bool,
        fields: Option<String>,
    }

    #[test]
    fn test_booleans_are_sent_as_digits() {
        assert_eq!(QueryValue::Bool(true).to_query_string(), "1");
        assert_eq!(QueryValue::Bool(false).to_query_string(), "0");
        assert_eq!(QueryValue::Int(-3).to_query_string(), "-3");
    }

    #[test]
    fn test_from_serialize_skips_nulls() {
        let params = QueryParams::from_serialize(&Options {
            offset: Some(10),
            limit: None,
            desc: Some(true),
            skip_empty: false,
            fields: Some("a,b".to_string()),
        })
        .unwrap();

        assert_eq!(params.get("offset"), Some(&QueryValue::Int(10)));
        assert_eq!(params.get("desc"), Some(&QueryValue::Bool(true)));
        assert_eq!(params.get("skipEmpty"), Some(&QueryValue::Bool(false)));
        assert_eq!(params.get("fields"), Some(&QueryValue::String("a,b".into())));
        assert!(params.get("limit").is_none());
    }

    #[test]
    fn test_from_serialize_rejects_nested() {
        let err = QueryParams::from_serialize(&serde_json::json!({ "a": [1, 2] })).unwrap_err();
        assert!(matches!(err, HttpClientError::Validation(_)));
    }

    #[test]
    fn test_merge_overrides() {
        let base = QueryParams::new().with("token", "a").with("status", "RUNNING");
        let merged = base.merge(&QueryParams::new().with("status", "SUCCEEDED"));
        assert_eq!(merged.get("token"), Some(&QueryValue::from("a")));
        assert_eq!(merged.get("status"), Some(&QueryValue::from("SUCCEEDED")));
    }

    #[test]
    fn test_full_url() {
        let mut request = HttpRequest::new(Method::GET, "https://api.apify.com/v2/datasets/x/items");
        request.params.insert("clean", true);
        request.params.insert("limit", 5u64);
        assert_eq!(
            request.full_url().unwrap().as_str(),
            "https://api.apify.com/v2/datasets/x/items?clean=1&limit=5"
        );

        let request = HttpRequest::new(Method::GET, "not a url");
        assert!(matches!(
            request.full_url(),
            Err(HttpClientError::InvalidUrl(_))
        ));
    }
}
