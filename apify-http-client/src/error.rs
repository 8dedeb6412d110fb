//! HTTP client error types.

use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use std::fmt;
use std::io::Read;
use std::time::Duration;
use thiserror::Error;

/// Result type for HTTP client operations.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// Error type the API declares for a missing record.
pub const RECORD_NOT_FOUND_TYPE: &str = "record-not-found";

/// Older endpoints report a missing record (or a bad token) with this type.
pub const RECORD_OR_TOKEN_NOT_FOUND_TYPE: &str = "record-or-token-not-found";

/// Label used when a request carries no client method.
pub const UNKNOWN_CLIENT_METHOD: &str = "unknown";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The API answered with a non-2xx status.
    #[error(transparent)]
    Api(Box<ApiError>),

    /// A response claimed to be JSON but could not be parsed.
    ///
    /// Usually a body truncated mid-stream, so the transport retries it.
    #[error("Invalid response body ({content_type}): {message}")]
    InvalidResponseBody {
        /// Content type declared by the response.
        content_type: String,
        /// Parser error.
        message: String,
    },

    /// Request timed out.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Request building error.
    #[error("Failed to build request: {0}")]
    RequestBuild(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),

    /// Interceptor error.
    #[error("Interceptor error: {0}")]
    Interceptor(String),

    /// Call arguments rejected before any request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A successful response did not have the shape the API promises.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<ApiError> for HttpClientError {
    fn from(error: ApiError) -> Self {
        Self::Api(Box::new(error))
    }
}

impl From<url::ParseError> for HttpClientError {
    fn from(error: url::ParseError) -> Self {
        Self::InvalidUrl(error.to_string())
    }
}

impl HttpClientError {
    /// Check if this error is worth another attempt.
    ///
    /// Rate limits, server errors, truncated bodies and in-flight network
    /// failures are retryable. Timeouts are too, unless the caller opted out
    /// for the call, which the transport checks separately.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Api(e) => e.is_rate_limit() || e.status_code >= 500,
            Self::InvalidResponseBody { .. } => true,
            Self::Timeout(_) => true,
            Self::Http(e) => {
                !e.is_builder()
                    && (e.is_connect() || e.is_request() || e.is_body() || e.is_decode())
            }
            _ => false,
        }
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_)) || matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Get the HTTP status code if the server answered.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(e) => Some(e.status_code),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Get the API error if this is one.
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }

    /// Check if this error means the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        self.api_error().is_some_and(ApiError::is_not_found)
    }
}

/// A non-2xx answer from the API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    /// Message declared by the API, or a dump of the body.
    pub message: String,
    /// Error type declared by the API (`error.type`).
    pub error_type: Option<String>,
    /// HTTP status code.
    pub status_code: u16,
    /// 1-based attempt that produced the error.
    pub attempt: u32,
    /// HTTP method of the request.
    pub http_method: String,
    /// Request path and query, without scheme and host.
    pub path: String,
    /// Resource client method that issued the call, e.g. `DatasetClient.get`.
    pub client_method: String,
}

impl ApiError {
    /// Build an error from a raw response.
    pub fn from_response(
        status: StatusCode,
        headers: &HeaderMap,
        body: &Bytes,
        method: &Method,
        url: &url::Url,
        attempt: u32,
        client_method: Option<&str>,
    ) -> Self {
        let parsed = parse_error_body(headers, body);
        let declared = parsed
            .as_ref()
            .and_then(|value| value.get("error"))
            .filter(|error| error.is_object());

        let message = declared
            .and_then(|error| error.get("message"))
            .and_then(|message| message.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| unexpected_error_message(parsed.as_ref(), body));
        let error_type = declared
            .and_then(|error| error.get("type"))
            .and_then(|error_type| error_type.as_str())
            .map(str::to_string);

        let path = match url.query() {
            Some(query) => format!("{}?{}", url.path(), query),
            None => url.path().to_string(),
        };

        Self {
            message,
            error_type,
            status_code: status.as_u16(),
            attempt,
            http_method: method.as_str().to_string(),
            path,
            client_method: client_method.unwrap_or(UNKNOWN_CLIENT_METHOD).to_string(),
        }
    }

    /// Check if the server rate limited the request.
    pub fn is_rate_limit(&self) -> bool {
        self.status_code == StatusCode::TOO_MANY_REQUESTS.as_u16()
    }

    /// Check if the addressed record does not exist.
    ///
    /// HEAD answers carry no body, so any 404 to a HEAD request counts.
    pub fn is_not_found(&self) -> bool {
        if self.status_code != StatusCode::NOT_FOUND.as_u16() {
            return false;
        }
        matches!(
            self.error_type.as_deref(),
            Some(RECORD_NOT_FOUND_TYPE) | Some(RECORD_OR_TOKEN_NOT_FOUND_TYPE)
        ) || self.http_method == Method::HEAD.as_str()
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !f.alternate() {
            return write!(f, "{}", self.message);
        }

        writeln!(f, "ApifyApiError: {}", self.message)?;
        writeln!(f, "  clientMethod: {}", self.client_method)?;
        writeln!(f, "  statusCode: {}", self.status_code)?;
        writeln!(
            f,
            "  type: {}",
            self.error_type.as_deref().unwrap_or("undefined")
        )?;
        writeln!(f, "  attempt: {}", self.attempt)?;
        writeln!(f, "  httpMethod: {}", self.http_method.to_lowercase())?;
        write!(f, "  path: {}", self.path)
    }
}

impl std::error::Error for ApiError {}

/// Best-effort JSON view of an error body, gunzipping it first if needed.
fn parse_error_body(headers: &HeaderMap, body: &Bytes) -> Option<serde_json::Value> {
    if let Ok(value) = serde_json::from_slice(body) {
        return Some(value);
    }

    let declared_json = headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.contains("json"));
    let gzipped = body.starts_with(&[0x1f, 0x8b]);
    if !declared_json && !gzipped {
        return None;
    }

    let mut decoded = Vec::new();
    flate2::read::GzDecoder::new(body.as_ref())
        .read_to_end(&mut decoded)
        .ok()?;
    serde_json::from_slice(&decoded).ok()
}

fn unexpected_error_message(parsed: Option<&serde_json::Value>, body: &Bytes) -> String {
    let dump = match parsed {
        Some(value) => {
            serde_json::to_string(value).unwrap_or_else(|_| String::from_utf8_lossy(body).into())
        }
        None => String::from_utf8_lossy(body).into_owned(),
    };
    format!("Unexpected error: {dump}")
}
