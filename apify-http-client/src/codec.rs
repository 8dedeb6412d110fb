//! Request body encoding and response body decoding.

use bytes::Bytes;
use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::io::Write;

use crate::{HttpClientError, Result};

/// Buffered bodies of at least this many bytes are gzip-compressed.
pub const MIN_GZIP_BYTES: usize = 1024;

const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// Body of an outgoing request.
pub enum RequestBody {
    /// JSON value, serialized before sending.
    Json(serde_json::Value),
    /// Plain text.
    Text(String),
    /// Raw bytes.
    Bytes(Bytes),
    /// Streamed body. Never buffered, compressed or replayed.
    Stream(reqwest::Body),
}

impl RequestBody {
    /// Serialize any value into a JSON body.
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| HttpClientError::Json(e.to_string()))
    }

    /// Check if this is a streamed body.
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }

    /// Content type implied by the body kind.
    pub fn default_content_type(&self) -> &'static str {
        match self {
            Self::Json(_) => JSON_CONTENT_TYPE,
            Self::Text(_) => TEXT_CONTENT_TYPE,
            Self::Bytes(_) | Self::Stream(_) => BINARY_CONTENT_TYPE,
        }
    }
}

impl std::fmt::Debug for RequestBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Self::Text(text) => f.debug_tuple("Text").field(&text.len()).finish(),
            Self::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Self::Stream(_) => f.write_str("Stream"),
        }
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

/// A request body ready to be attached to attempts.
pub enum EncodedBody {
    /// Bytes that can be attached to every attempt.
    Buffered {
        /// Payload, possibly gzip-compressed.
        bytes: Bytes,
        /// Whether `content-encoding: gzip` must be sent.
        gzipped: bool,
    },
    /// Stream that can be attached to a single attempt only.
    Stream(Option<reqwest::Body>),
}

impl EncodedBody {
    /// Take the body for the next attempt.
    ///
    /// Returns `None` once a stream has been consumed.
    pub fn for_attempt(&mut self) -> Option<reqwest::Body> {
        match self {
            Self::Buffered { bytes, .. } => Some(reqwest::Body::from(bytes.clone())),
            Self::Stream(body) => body.take(),
        }
    }

    /// Check if `content-encoding: gzip` must be sent.
    pub fn is_gzipped(&self) -> bool {
        matches!(self, Self::Buffered { gzipped: true, .. })
    }

    /// Check if this is a streamed body.
    pub fn is_stream(&self) -> bool {
        matches!(self, Self::Stream(_))
    }
}

/// Encode a request body, gzipping buffered payloads of at least
/// [`MIN_GZIP_BYTES`].
pub fn encode_body(body: RequestBody) -> Result<EncodedBody> {
    let bytes = match body {
        RequestBody::Stream(stream) => return Ok(EncodedBody::Stream(Some(stream))),
        RequestBody::Json(value) => {
            serde_json::to_vec(&value).map_err(|e| HttpClientError::Json(e.to_string()))?
        }
        RequestBody::Text(text) => text.into_bytes(),
        RequestBody::Bytes(bytes) => bytes.to_vec(),
    };

    if bytes.len() < MIN_GZIP_BYTES {
        return Ok(EncodedBody::Buffered {
            bytes: Bytes::from(bytes),
            gzipped: false,
        });
    }

    Ok(EncodedBody::Buffered {
        bytes: Bytes::from(gzip(&bytes)?),
        gzipped: true,
    })
}

fn gzip(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    Ok(encoder.finish()?)
}

/// Decoded body of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// No payload.
    Empty,
    /// Parsed JSON.
    Json(serde_json::Value),
    /// Text decoded with the declared charset.
    Text(String),
    /// Raw payload.
    Binary(Bytes),
}

impl ResponseBody {
    /// Get the JSON value if the body was JSON.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Get the text if the body was text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Consume the body and return its JSON value.
    pub fn into_json(self) -> Option<serde_json::Value> {
        match self {
            Self::Json(value) => Some(value),
            _ => None,
        }
    }

    /// Consume the body and return it as bytes, re-serializing JSON.
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::Empty => Bytes::new(),
            Self::Json(value) => Bytes::from(value.to_string()),
            Self::Text(text) => Bytes::from(text),
            Self::Binary(bytes) => bytes,
        }
    }
}

/// Decode a response body according to its content type.
///
/// JSON is parsed, XML and `text/*` are decoded with the declared charset
/// (UTF-8 when none is given), everything else is returned raw. An unknown
/// charset also yields the raw payload.
pub fn decode_body(bytes: Bytes, content_type: Option<&str>) -> Result<ResponseBody> {
    if bytes.is_empty() {
        return Ok(ResponseBody::Empty);
    }
    let Some(mime) = content_type.and_then(|value| value.parse::<mime::Mime>().ok()) else {
        return Ok(ResponseBody::Binary(bytes));
    };

    if mime.type_() == mime::APPLICATION && mime.subtype() == mime::JSON {
        return serde_json::from_slice(&bytes)
            .map(ResponseBody::Json)
            .map_err(|e| HttpClientError::InvalidResponseBody {
                content_type: mime.essence_str().to_string(),
                message: e.to_string(),
            });
    }

    let is_text = mime.type_() == mime::TEXT
        || mime.subtype() == mime::XML
        || mime.suffix() == Some(mime::XML);
    if !is_text {
        return Ok(ResponseBody::Binary(bytes));
    }

    let charset = mime
        .get_param(mime::CHARSET)
        .map(|charset| charset.as_str().to_ascii_lowercase());
    Ok(match decode_text(&bytes, charset.as_deref()) {
        Some(text) => ResponseBody::Text(text),
        None => ResponseBody::Binary(bytes),
    })
}

fn decode_text(bytes: &[u8], charset: Option<&str>) -> Option<String> {
    match charset {
        None | Some("") | Some("utf-8") | Some("utf8") => String::from_utf8(bytes.to_vec()).ok(),
        Some("us-ascii") | Some("ascii") => {
            bytes.is_ascii().then(|| String::from_utf8_lossy(bytes).into_owned())
        }
        Some("iso-8859-1") | Some("latin1") | Some("latin-1") => {
            Some(bytes.iter().map(|&b| b as char).collect())
        }
        Some(_) => None,
    }
}
