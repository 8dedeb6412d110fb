//! HTTP client configuration.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::interceptor::RequestInterceptor;
use crate::retry::RetryConfig;

/// HTTP client configuration.
#[derive(Clone)]
pub struct HttpClientConfig {
    /// Timeout of a single attempt.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Retry configuration.
    pub retry: RetryConfig,
    /// Bearer token sent with every request.
    pub token: Option<String>,
    /// Default headers for all requests.
    pub default_headers: Vec<(String, String)>,
    /// User agent string.
    pub user_agent: String,
    /// Caller interceptors, run after the built-in ones.
    pub interceptors: Vec<Arc<dyn RequestInterceptor>>,
    /// Maximum redirects to follow for buffered bodies.
    pub max_redirects: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(360),
            connect_timeout: Duration::from_secs(30),
            retry: RetryConfig::default(),
            token: None,
            default_headers: vec![("Accept".to_string(), "application/json, */*".to_string())],
            user_agent: format!("apify-http-client/{}", env!("CARGO_PKG_VERSION")),
            interceptors: Vec::new(),
            max_redirects: 10,
        }
    }
}

impl fmt::Debug for HttpClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpClientConfig")
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("retry", &self.retry)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("default_headers", &self.default_headers)
            .field("user_agent", &self.user_agent)
            .field("interceptors", &self.interceptors.len())
            .field("max_redirects", &self.max_redirects)
            .finish()
    }
}

impl HttpClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client configuration.
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the timeout of a single attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.config.retry = config;
        self
    }

    /// Set the maximum number of retries, keeping the backoff.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry.max_retries = max_retries;
        self
    }

    /// Set exponential backoff starting at the given delay.
    pub fn min_delay_between_retries(mut self, delay: Duration) -> Self {
        self.config.retry = RetryConfig::exponential(self.config.retry.max_retries, delay);
        self
    }

    /// Set the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.token = Some(token.into());
        self
    }

    /// Add a default header for all requests.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Register a request interceptor.
    pub fn interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.config.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Set the maximum number of redirects to follow.
    pub fn max_redirects(mut self, max: usize) -> Self {
        self.config.max_redirects = max;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interceptor::LoggingInterceptor;

    #[test]
    fn test_defaults() {
        let config = HttpClientConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(360));
        assert_eq!(config.retry.max_retries, 8);
        assert!(config.token.is_none());
    }

    #[test]
    fn test_builder() {
        let config = HttpClientConfig::builder()
            .max_retries(2)
            .min_delay_between_retries(Duration::from_millis(10))
            .token("secret")
            .interceptor(LoggingInterceptor::new())
            .build();

        assert_eq!(config.retry.max_retries, 2);
        assert_eq!(config.retry.delay_for_retry(1), Duration::from_millis(10));
        assert_eq!(config.interceptors.len(), 1);
        assert!(!format!("{config:?}").contains("secret"));
    }
}
