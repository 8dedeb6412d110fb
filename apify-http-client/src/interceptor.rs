//! Request interceptors.
//!
//! Interceptors run on every attempt after the body has been serialized and
//! gzip-encoded, in the order they were registered.

use crate::{HttpClientError, Result};
use async_trait::async_trait;
use http::HeaderValue;
use reqwest::Request;

/// Request interceptor.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Intercept and optionally modify the request.
    async fn intercept(&self, request: Request) -> Result<Request>;
}

/// Logging interceptor that logs outgoing requests.
#[derive(Debug, Default)]
pub struct LoggingInterceptor {
    log_headers: bool,
}

impl LoggingInterceptor {
    /// Create a new logging interceptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable logging of headers.
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }
}

#[async_trait]
impl RequestInterceptor for LoggingInterceptor {
    async fn intercept(&self, request: Request) -> Result<Request> {
        tracing::debug!(
            method = %request.method(),
            path = %request.url().path(),
            "Sending HTTP request"
        );

        if self.log_headers {
            for (name, value) in request.headers() {
                if name == http::header::AUTHORIZATION {
                    tracing::trace!(header = %name, value = "<redacted>", "Request header");
                } else {
                    tracing::trace!(header = %name, value = ?value, "Request header");
                }
            }
        }

        Ok(request)
    }
}

/// Authentication interceptor that adds a bearer token.
pub struct AuthInterceptor {
    header: HeaderValue,
}

impl AuthInterceptor {
    /// Create a bearer token interceptor.
    pub fn bearer(token: impl AsRef<str>) -> Result<Self> {
        let mut header = HeaderValue::try_from(format!("Bearer {}", token.as_ref()))
            .map_err(|e| HttpClientError::RequestBuild(format!("invalid token: {e}")))?;
        header.set_sensitive(true);
        Ok(Self { header })
    }
}

impl std::fmt::Debug for AuthInterceptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthInterceptor").finish_non_exhaustive()
    }
}

#[async_trait]
impl RequestInterceptor for AuthInterceptor {
    async fn intercept(&self, mut request: Request) -> Result<Request> {
        request
            .headers_mut()
            .insert(http::header::AUTHORIZATION, self.header.clone());
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> Request {
        Request::new(
            http::Method::GET,
            url::Url::parse("https://api.apify.com/v2/users/me").unwrap(),
        )
    }

    #[tokio::test]
    async fn test_bearer_header() {
        let interceptor = AuthInterceptor::bearer("my-token").unwrap();
        let request = interceptor.intercept(request()).await.unwrap();
        assert_eq!(
            request.headers().get(http::header::AUTHORIZATION).unwrap(),
            "Bearer my-token"
        );
    }

    #[test]
    fn test_invalid_token_is_rejected() {
        assert!(AuthInterceptor::bearer("bad\ntoken").is_err());
    }

    #[tokio::test]
    async fn test_logging_passes_request_through() {
        let interceptor = LoggingInterceptor::new().with_headers();
        let request = interceptor.intercept(request()).await.unwrap();
        assert_eq!(request.url().path(), "/v2/users/me");
    }
}
