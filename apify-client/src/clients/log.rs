//! Log client.

use apify_http_client::{Method, ResponseBody, Result};

use crate::resource::ResourceContext;

/// Client of the log of a run or build.
#[derive(Debug, Clone)]
pub struct LogClient {
    context: ResourceContext,
}

impl LogClient {
    pub(crate) fn new(context: ResourceContext) -> Self {
        Self { context }
    }

    /// URL of the log.
    pub fn url(&self) -> String {
        self.context.url()
    }

    /// Read the whole log; `None` if it does not exist.
    pub async fn get(&self) -> Result<Option<String>> {
        match self
            .context
            .request(Method::GET, self.context.url(), "get")?
            .send()
            .await
        {
            Ok(response) => Ok(Some(match response.into_body() {
                ResponseBody::Text(text) => text,
                ResponseBody::Empty => String::new(),
                other => String::from_utf8_lossy(&other.into_bytes()).into_owned(),
            })),
            Err(error) if error.is_not_found() => Ok(None),
            Err(error) => Err(error),
        }
    }
}
