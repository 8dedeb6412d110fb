//! HTTP response envelope.

use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;

use crate::codec::ResponseBody;
use crate::{HttpClientError, Result};

/// Successful response with a decoded body.
#[derive(Debug, Clone)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: ResponseBody,
    url: url::Url,
}

impl Response {
    /// Assemble a response from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: ResponseBody, url: url::Url) -> Self {
        Self {
            status,
            headers,
            body,
            url,
        }
    }

    /// Get the status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a specific header value. Names are case-insensitive.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the response URL.
    pub fn url(&self) -> &url::Url {
        &self.url
    }

    /// Get the decoded body.
    pub fn body(&self) -> &ResponseBody {
        &self.body
    }

    /// Consume the response and return the decoded body.
    pub fn into_body(self) -> ResponseBody {
        self.body
    }

    /// Deserialize a JSON body.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        let value = self.body.as_json().ok_or_else(|| {
            HttpClientError::UnexpectedResponse(format!(
                "expected a JSON body, got content type {:?}",
                self.content_type()
            ))
        })?;
        T::deserialize(value).map_err(|e| HttpClientError::Json(e.to_string()))
    }

    /// Get the content type if available.
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(body: ResponseBody) -> Response {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", "application/json".parse().unwrap());
        Response::new(
            StatusCode::OK,
            headers,
            body,
            url::Url::parse("https://api.apify.com/v2/acts").unwrap(),
        )
    }

    #[test]
    fn test_headers_are_case_insensitive() {
        let response = response(ResponseBody::Empty);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("CONTENT-TYPE"), Some("application/json"));
    }

    #[test]
    fn test_json() {
        let response = response(ResponseBody::Json(serde_json::json!({"count": 3})));
        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["count"], 3);

        let response = self::response(ResponseBody::Text("x".into()));
        assert!(matches!(
            response.json::<serde_json::Value>(),
            Err(HttpClientError::UnexpectedResponse(_))
        ));
    }
}
