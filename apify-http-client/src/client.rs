//! HTTP client implementation.

use http::{HeaderName, HeaderValue, Method};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, warn};

use crate::codec::{EncodedBody, decode_body, encode_body};
use crate::interceptor::{AuthInterceptor, RequestInterceptor};
use crate::request::HttpRequest;
use crate::{
    ApiError, HttpClientConfig, HttpClientError, RequestBuilder, Response, Result, Statistics,
};

/// HTTP client with retry, gzip request encoding and call statistics.
///
/// Cloning is cheap; clones share connections, configuration and counters.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    no_redirect: reqwest::Client,
    config: Arc<HttpClientConfig>,
    interceptors: Arc<Vec<Arc<dyn RequestInterceptor>>>,
    stats: Arc<Statistics>,
    stream_retry_warned: Arc<AtomicBool>,
}

/// Per-call settings that stay fixed across attempts.
struct CallContext {
    method: Method,
    url: url::Url,
    headers: Vec<(String, String)>,
    content_type: Option<String>,
    force_binary: bool,
    timeout: Duration,
    client_method: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration.
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        Self::with_statistics(config, Arc::new(Statistics::new()))
    }

    /// Create a client that records into existing counters.
    pub fn with_statistics(config: HttpClientConfig, stats: Arc<Statistics>) -> Result<Self> {
        let builder = || {
            reqwest::Client::builder()
                .connect_timeout(config.connect_timeout)
                .user_agent(&config.user_agent)
                .gzip(true)
                .brotli(true)
        };

        let inner = builder()
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?;
        let no_redirect = builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?;

        let mut interceptors: Vec<Arc<dyn RequestInterceptor>> = Vec::new();
        if let Some(token) = &config.token {
            interceptors.push(Arc::new(AuthInterceptor::bearer(token)?));
        }
        interceptors.extend(config.interceptors.iter().cloned());

        Ok(Self {
            inner,
            no_redirect,
            config: Arc::new(config),
            interceptors: Arc::new(interceptors),
            stats,
            stream_retry_warned: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Get the call statistics.
    pub fn stats(&self) -> &Arc<Statistics> {
        &self.stats
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::GET, url.into())
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::POST, url.into())
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::PUT, url.into())
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::DELETE, url.into())
    }

    /// Create a HEAD request builder.
    pub fn head(&self, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, Method::HEAD, url.into())
    }

    /// Create a request builder with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, url.into())
    }

    /// Execute a call, retrying rate limits, server errors and network
    /// failures with backoff.
    ///
    /// Only the final outcome reaches the caller.
    pub async fn call(&self, request: HttpRequest) -> Result<Response> {
        self.stats.record_call();

        let url = request.full_url()?;
        let HttpRequest {
            method,
            headers,
            body,
            content_type,
            force_binary,
            do_not_retry_timeouts,
            timeout,
            client_method,
            ..
        } = request;

        let content_type = match (&content_type, &body) {
            (Some(content_type), _) => Some(content_type.clone()),
            (None, Some(body)) => Some(body.default_content_type().to_string()),
            (None, None) => None,
        };
        let mut body = body.map(encode_body).transpose()?;
        let is_stream = body.as_ref().is_some_and(EncodedBody::is_stream);

        let context = CallContext {
            method,
            url,
            headers,
            content_type,
            force_binary,
            timeout: timeout.unwrap_or(self.config.timeout),
            client_method,
        };

        let retry = &self.config.retry;
        let mut attempt = 0;
        loop {
            attempt += 1;
            self.stats.record_request();

            let error = match self.execute_once(&context, body.as_mut(), attempt).await {
                Ok(response) => return Ok(response),
                Err(error) => error,
            };

            let retryable = error.is_retryable() && !(do_not_retry_timeouts && error.is_timeout());
            if !retryable {
                return Err(error);
            }

            if is_stream {
                if !self.stream_retry_warned.swap(true, Ordering::Relaxed) {
                    warn!(
                        url = %context.url.path(),
                        "Request body is a stream, the request cannot be retried safely"
                    );
                }
                return Err(error);
            }

            if attempt > retry.max_retries {
                return Err(error);
            }

            if attempt == retry.warning_attempt() {
                warn!(
                    attempt,
                    error = %format!("{error:#}"),
                    "API request failed {} times. Max attempts: {}. Cause: {}",
                    attempt,
                    retry.max_attempts(),
                    error
                );
            }

            let delay = retry.delay_for_retry(attempt);
            debug!(
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
        }
    }

    /// Execute a single attempt without retry.
    async fn execute_once(
        &self,
        context: &CallContext,
        body: Option<&mut EncodedBody>,
        attempt: u32,
    ) -> Result<Response> {
        let mut request = reqwest::Request::new(context.method.clone(), context.url.clone());
        *request.timeout_mut() = Some(context.timeout);

        let headers = request.headers_mut();
        for (name, value) in self.config.default_headers.iter().chain(&context.headers) {
            headers.insert(
                HeaderName::try_from(name.as_str())
                    .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?,
                HeaderValue::try_from(value.as_str())
                    .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?,
            );
        }

        let mut is_stream = false;
        if let Some(body) = body {
            is_stream = body.is_stream();
            if body.is_gzipped() {
                headers.insert(http::header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
            }
            if let Some(content_type) = &context.content_type {
                headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::try_from(content_type.as_str())
                        .map_err(|e| HttpClientError::RequestBuild(e.to_string()))?,
                );
            }
            let payload = body.for_attempt().ok_or_else(|| {
                HttpClientError::RequestBuild("stream body was already consumed".to_string())
            })?;
            *request.body_mut() = Some(payload);
        }

        for interceptor in self.interceptors.iter() {
            request = interceptor.intercept(request).await?;
        }

        debug!(
            method = %context.method,
            path = %context.url.path(),
            attempt,
            "Sending API request"
        );

        let transport = if is_stream {
            &self.no_redirect
        } else {
            &self.inner
        };
        let response = transport
            .execute(request)
            .await
            .map_err(|e| map_transport_error(e, context.timeout))?;

        let status = response.status();
        let headers = response.headers().clone();
        let url = response.url().clone();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| map_transport_error(e, context.timeout))?;

        if status.as_u16() < 300 {
            let content_type = headers
                .get(http::header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok());
            let body = if context.force_binary {
                crate::ResponseBody::Binary(bytes)
            } else {
                decode_body(bytes, content_type)?
            };
            return Ok(Response::new(status, headers, body, url));
        }

        let error = ApiError::from_response(
            status,
            &headers,
            &bytes,
            &context.method,
            &context.url,
            attempt,
            context.client_method.as_deref(),
        );
        if error.is_rate_limit() {
            self.stats.add_rate_limit_error(attempt)?;
        }
        Err(error.into())
    }
}

fn map_transport_error(error: reqwest::Error, timeout: Duration) -> HttpClientError {
    if error.is_timeout() {
        HttpClientError::Timeout(timeout)
    } else {
        HttpClientError::Http(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        assert_eq!(client.config().retry.max_retries, 8);
        assert_eq!(client.stats().calls(), 0);
    }

    #[test]
    fn test_clones_share_statistics() {
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let clone = client.clone();
        clone.stats().record_call();
        assert_eq!(client.stats().calls(), 1);
    }

    #[test]
    fn test_invalid_token_fails_construction() {
        let config = HttpClientConfig::builder().token("line\nbreak").build();
        assert!(HttpClient::new(config).is_err());
    }

    #[tokio::test]
    async fn test_invalid_url_is_not_sent() {
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        let err = client.get("relative/path").send().await.unwrap_err();
        assert!(matches!(err, HttpClientError::InvalidUrl(_)));
        assert_eq!(client.stats().calls(), 1);
        assert_eq!(client.stats().requests(), 0);
    }
}
