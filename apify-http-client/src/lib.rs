//! # Apify HTTP Client
//!
//! The transport layer of the Apify API client: it sends requests, decodes
//! responses, classifies failures and retries the transient ones.
//!
//! ## Features
//!
//! - **Retry with Backoff**: rate limits (429), server errors (5xx), truncated
//!   bodies and network failures are retried with exponential backoff
//! - **Typed API Errors**: non-2xx answers become [`ApiError`] with status,
//!   declared type, method, path and attempt
//! - **Gzip Requests**: buffered bodies of at least 1 KiB are compressed
//! - **Content-Type Decoding**: JSON, text and binary payloads
//! - **Statistics**: call, request and rate-limit counters
//! - **Interceptors**: bearer authentication, logging, custom hooks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apify_http_client::{HttpClient, HttpClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(HttpClientConfig::builder().token("my-token").build())?;
//!
//!     let response = client
//!         .get("https://api.apify.com/v2/users/me")
//!         .client_method("UserClient.get")
//!         .send()
//!         .await?;
//!
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! ## Retry Policy
//!
//! ```rust,no_run
//! use apify_http_client::{HttpClient, HttpClientConfig, RetryConfig};
//! use std::time::Duration;
//!
//! # fn main() -> apify_http_client::Result<()> {
//! let config = HttpClientConfig::builder()
//!     .timeout(Duration::from_secs(30))
//!     .retry(RetryConfig::exponential(4, Duration::from_millis(250)))
//!     .build();
//!
//! let client = HttpClient::new(config)?;
//! # Ok(())
//! # }
//! ```

mod client;
mod codec;
mod config;
mod error;
mod interceptor;
mod request;
mod response;
mod retry;
mod statistics;

pub use client::HttpClient;
pub use codec::{EncodedBody, MIN_GZIP_BYTES, RequestBody, ResponseBody, decode_body, encode_body};
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{
    ApiError, HttpClientError, RECORD_NOT_FOUND_TYPE, RECORD_OR_TOKEN_NOT_FOUND_TYPE, Result,
    UNKNOWN_CLIENT_METHOD,
};
pub use interceptor::{AuthInterceptor, LoggingInterceptor, RequestInterceptor};
pub use request::{HttpRequest, QueryParams, QueryValue, RequestBuilder};
pub use response::Response;
pub use retry::{BackoffStrategy, RetryConfig};
pub use statistics::{Statistics, StatisticsSnapshot};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use apify_http_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::codec::{RequestBody, ResponseBody};
    pub use crate::config::{HttpClientConfig, HttpClientConfigBuilder};
    pub use crate::error::{ApiError, HttpClientError, Result};
    pub use crate::interceptor::{AuthInterceptor, LoggingInterceptor, RequestInterceptor};
    pub use crate::request::{QueryParams, RequestBuilder};
    pub use crate::response::Response;
    pub use crate::retry::{BackoffStrategy, RetryConfig};
    pub use crate::statistics::{Statistics, StatisticsSnapshot};
    pub use http::{Method, StatusCode, header};
}
