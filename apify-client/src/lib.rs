//! # Apify Client
//!
//! Typed access to the Apify API: actors, runs, builds, datasets, key-value
//! stores, request queues, tasks, schedules, webhooks, users and logs.
//!
//! Clients form a tree rooted at [`ApifyClient`]. Each node knows its URL and
//! the query parameters inherited from its parents; deriving a child never
//! touches the parent.
//!
//! ## Features
//!
//! - **Resource Tree**: `client.actor("alice/my-actor").runs()` and friends
//! - **Missing Records**: `get` returns `None` instead of failing
//! - **Idempotent Deletes**: deleting a missing resource succeeds
//! - **Wait For Finish**: bounded long-polling of runs and builds
//! - **Pagination**: single pages and `list_all` traversal
//! - **Retries**: inherited from [`apify_http_client`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use apify_client::{ApifyClient, ListOptions};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApifyClient::new("my-token")?;
//!
//!     let dataset = client.datasets().get_or_create(Some("my-results")).await?;
//!     let id = dataset["id"].as_str().unwrap_or_default();
//!     client
//!         .dataset(id)
//!         .push_items(&json!([{ "url": "https://example.com" }]))
//!         .await?;
//!
//!     let runs = client.runs().list(&ListOptions::new().limit(10).desc(true)).await?;
//!     println!("{} runs in total", runs.total);
//!     Ok(())
//! }
//! ```
//!
//! ## Configuration
//!
//! ```rust,no_run
//! use apify_client::{ApifyClient, ApifyClientConfig};
//! use std::time::Duration;
//!
//! # fn main() -> apify_client::Result<()> {
//! let config = ApifyClientConfig::builder()
//!     .token("my-token")
//!     .max_retries(4)
//!     .min_delay_between_retries(Duration::from_millis(250))
//!     .timeout(Duration::from_secs(60))
//!     .user_agent_suffix("my-app/1.0")
//!     .build();
//!
//! let client = ApifyClient::with_config(config)?;
//! # Ok(())
//! # }
//! ```

mod client;
mod clients;
mod config;
mod dates;
mod pagination;
mod resource;
mod wait;

pub use client::ApifyClient;
pub use clients::*;
pub use config::{
    API_VERSION_PATH, ApifyClientConfig, ApifyClientConfigBuilder, DEFAULT_BASE_URL,
    DEFAULT_MAX_WAIT_FOR_FINISH_SECS,
};
pub use dates::{DATE_FIELD_SUFFIX, MAX_DATE_FIELD_DEPTH, date_field, parse_date_fields};
pub use pagination::{ListOptions, PaginatedList};
pub use resource::{ResourceContext, pluck_data, to_safe_id};
pub use wait::{ActorJobStatus, JOB_NOT_FOUND_RETRY_DELAY};

pub use apify_http_client::{
    ApiError, HttpClientConfig, HttpClientError, RequestBody, RequestInterceptor, ResponseBody,
    Result, RetryConfig, Statistics, StatisticsSnapshot,
};

/// Prelude for common imports.
///
/// ```
/// use apify_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::ApifyClient;
    pub use crate::clients::*;
    pub use crate::config::ApifyClientConfig;
    pub use crate::pagination::{ListOptions, PaginatedList};
    pub use crate::wait::ActorJobStatus;
    pub use apify_http_client::{HttpClientError, Result};
}
