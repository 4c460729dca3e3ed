//! Transport boundary
//!
//! The pipeline never talks to the network directly. It hands a
//! [`RequestDescriptor`] to a [`Transport`] and gets back either a
//! [`TransportResponse`] or a [`TransportError`]. [`ReqwestTransport`] is the
//! default implementation; tests and embedders can plug in their own.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::http::builder::RequestDescriptor;
use crate::Result;

/// Response body as produced by a transport
#[derive(Debug, Clone, PartialEq)]
pub enum TransportBody {
    /// Raw bytes straight off the wire
    Bytes(Vec<u8>),
    /// A body the transport already decoded into JSON
    Decoded(Value),
}

impl TransportBody {
    /// True when the body carries no content at all
    pub fn is_empty(&self) -> bool {
        match self {
            TransportBody::Bytes(bytes) => bytes.is_empty(),
            TransportBody::Decoded(value) => value.is_null(),
        }
    }
}

/// HTTP result returned by a transport
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: TransportBody,
}

impl TransportResponse {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Failure below the HTTP layer
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("transport failure: {0}")]
    Other(String),
}

/// Performs exactly one HTTP round trip
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send the request and return the raw result
    async fn send(&self, request: &RequestDescriptor) -> std::result::Result<TransportResponse, TransportError>;
}

/// reqwest-backed transport
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a fresh reqwest client
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| crate::Error::Transport {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client })
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestDescriptor) -> std::result::Result<TransportResponse, TransportError> {
        // Retries are out of scope for this layer; the flag is informational
        debug!(retry = request.retry, "dispatching request");

        let mut builder = self
            .client
            .request(request.method.as_reqwest(), request.url.as_str())
            .timeout(request.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await.map_err(map_reqwest_error)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;

        Ok(TransportResponse {
            status,
            headers,
            body: TransportBody::Bytes(bytes.to_vec()),
        })
    }
}

fn map_reqwest_error(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout
    } else {
        TransportError::Other(error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_body_emptiness() {
        assert!(TransportBody::Bytes(Vec::new()).is_empty());
        assert!(TransportBody::Decoded(Value::Null).is_empty());
        assert!(!TransportBody::Decoded(json!({})).is_empty());
        assert!(!TransportBody::Bytes(b" ".to_vec()).is_empty());
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let response = TransportResponse {
            status: 200,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: TransportBody::Bytes(Vec::new()),
        };
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert_eq!(response.header("x-missing"), None);
    }

    #[test]
    fn test_transport_creation() {
        assert!(ReqwestTransport::new().is_ok());
    }
}
