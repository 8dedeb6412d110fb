//! Client configuration.

use apify_http_client::{HttpClientConfig, RequestInterceptor, RetryConfig};
use std::time::Duration;

/// Production API origin.
pub const DEFAULT_BASE_URL: &str = "https://api.apify.com";

/// API version root appended to the base URL.
pub const API_VERSION_PATH: &str = "/v2";

/// Wait budget used when `wait_for_finish` gets none. The API rejects an
/// unbounded wait.
pub const DEFAULT_MAX_WAIT_FOR_FINISH_SECS: u64 = 999_999;

/// Configuration of [`ApifyClient`](crate::ApifyClient).
#[derive(Debug, Clone)]
pub struct ApifyClientConfig {
    /// API origin, without the version root.
    pub base_url: String,
    /// Wait budget of `wait_for_finish` calls without an explicit one.
    pub max_wait_for_finish_secs: u64,
    /// Appended to the user agent.
    pub user_agent_suffix: Option<String>,
    /// Transport settings.
    pub http: HttpClientConfig,
}

impl Default for ApifyClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_wait_for_finish_secs: DEFAULT_MAX_WAIT_FOR_FINISH_SECS,
            user_agent_suffix: None,
            http: HttpClientConfig::default(),
        }
    }
}

impl ApifyClientConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ApifyClientConfigBuilder {
        ApifyClientConfigBuilder::default()
    }

    /// API root including the version segment.
    pub fn api_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), API_VERSION_PATH)
    }

    /// User agent sent with every request.
    pub fn user_agent(&self) -> String {
        let base = format!(
            "ApifyClient/{} ({}; Rust)",
            env!("CARGO_PKG_VERSION"),
            std::env::consts::OS
        );
        match &self.user_agent_suffix {
            Some(suffix) => format!("{base}; {suffix}"),
            None => base,
        }
    }
}

/// Builder for [`ApifyClientConfig`].
#[derive(Debug, Default)]
pub struct ApifyClientConfigBuilder {
    config: ApifyClientConfig,
}

impl ApifyClientConfigBuilder {
    /// Set the API origin.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the bearer token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.config.http.token = Some(token.into());
        self
    }

    /// Set the maximum number of retries.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.http.retry.max_retries = max_retries;
        self
    }

    /// Set the delay before the first retry.
    pub fn min_delay_between_retries(mut self, delay: Duration) -> Self {
        self.config.http.retry = RetryConfig::exponential(self.config.http.retry.max_retries, delay);
        self
    }

    /// Set the complete retry policy.
    pub fn retry(mut self, retry: RetryConfig) -> Self {
        self.config.http.retry = retry;
        self
    }

    /// Set the timeout of a single attempt.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.http.timeout = timeout;
        self
    }

    /// Set the wait budget of `wait_for_finish` calls without one.
    pub fn max_wait_for_finish_secs(mut self, secs: u64) -> Self {
        self.config.max_wait_for_finish_secs = secs;
        self
    }

    /// Append a suffix to the user agent.
    pub fn user_agent_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.config.user_agent_suffix = Some(suffix.into());
        self
    }

    /// Add a request interceptor, run after the built-in ones.
    pub fn interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.config.http.interceptors.push(std::sync::Arc::new(interceptor));
        self
    }

    /// Replace the transport settings wholesale.
    pub fn http(mut self, http: HttpClientConfig) -> Self {
        self.config.http = http;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ApifyClientConfig {
        self.config
    }
}
