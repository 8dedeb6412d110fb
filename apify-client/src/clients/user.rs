//! User client.

use apify_http_client::{QueryParams, Result};
use serde_json::Value;

use crate::resource::ResourceContext;

/// ID addressing the user owning the token.
pub const ME_USER_ID: &str = "me";

/// Client of a user account.
#[derive(Debug, Clone)]
pub struct UserClient {
    context: ResourceContext,
}

impl UserClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the user.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Fetch the user; `None` if it does not exist.
    ///
    /// Private fields are only returned for the token owner.
    pub async fn get(&self) -> Result<Option<Value>> {
        self.context.get_resource("get", &QueryParams::new()).await
    }
}
