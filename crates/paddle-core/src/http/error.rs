//! API error classification
//!
//! Maps non-2xx responses and transport failures into the closed
//! [`ErrorKind`] taxonomy. Paddle endpoints are not consistent about the
//! shape of their error bodies, so classification runs in a fixed order:
//! an `error` object wins over a bare `errors` list, which wins over the
//! status-code fallback. Inside an `error` object, `meta.type` overrides
//! the lookup on `code`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

use crate::http::transport::TransportBody;

/// Result carried by every public operation once a request was dispatched
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Fallback message when an error object carries neither `detail` nor `message`
const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred";

/// Keys of an error object that are interpreted rather than passed through as meta
const KNOWN_ERROR_KEYS: [&str; 5] = ["code", "detail", "message", "errors", "meta"];

/// Closed set of error categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ApiError,
    AuthenticationError,
    AuthorizationError,
    ValidationError,
    RateLimitError,
    ServerError,
    NetworkError,
    TimeoutError,
    NotFoundError,
    UnknownError,
}

impl ErrorKind {
    /// Stable snake_case name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::ApiError => "api_error",
            ErrorKind::AuthenticationError => "authentication_error",
            ErrorKind::AuthorizationError => "authorization_error",
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::RateLimitError => "rate_limit_error",
            ErrorKind::ServerError => "server_error",
            ErrorKind::NetworkError => "network_error",
            ErrorKind::TimeoutError => "timeout_error",
            ErrorKind::NotFoundError => "not_found_error",
            ErrorKind::UnknownError => "unknown_error",
        }
    }

    /// Whether a caller may reasonably try the same request again.
    ///
    /// This is a hint only; nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::ServerError
                | ErrorKind::NetworkError
                | ErrorKind::TimeoutError
                | ErrorKind::RateLimitError
        )
    }

    /// Map an error object's `code` to a kind
    fn from_error_code(code: Option<&str>) -> Self {
        match code {
            Some("authentication_failed") | Some("unauthorized") => ErrorKind::AuthenticationError,
            Some("forbidden") => ErrorKind::AuthorizationError,
            Some("rate_limit_exceeded") => ErrorKind::RateLimitError,
            Some("entity_not_found") => ErrorKind::NotFoundError,
            Some("validation_failed") => ErrorKind::ValidationError,
            _ => ErrorKind::ApiError,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Recoverable error returned after a request was dispatched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    /// Error category for programmatic branching
    pub kind: ErrorKind,
    /// API or synthetic error code
    pub code: Option<String>,
    /// Human-readable, log-safe message
    pub message: String,
    /// Structured details (field errors, timeout, ...)
    pub details: Option<Value>,
    /// Vendor metadata attached to the error
    pub meta: Option<Map<String, Value>>,
}

impl ApiError {
    /// Create an error with only kind and message set
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            code: None,
            message: message.into(),
            details: None,
            meta: None,
        }
    }

    /// Set the error code
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Set structured details
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }

    /// Classify a non-2xx HTTP result
    pub fn from_status(status: u16, body: &TransportBody) -> Self {
        match status {
            400..=499 => Self::from_client_error(status, body),
            500..=599 => ApiError::new(
                ErrorKind::ServerError,
                format!("Server error {}: {}", status, body_text(body)),
            )
            .with_code(format!("server_error_{}", status)),
            _ => ApiError::new(
                ErrorKind::UnknownError,
                format!("Unexpected HTTP status {}: {}", status, body_text(body)),
            )
            .with_code(format!("http_{}", status)),
        }
    }

    /// Wrap a non-HTTP transport failure
    pub fn network_error(reason: impl Into<String>) -> Self {
        ApiError::new(ErrorKind::NetworkError, reason).with_code("network_error")
    }

    /// Timeout carrying the configured duration for observability
    pub fn timeout_error(timeout: Duration) -> Self {
        let timeout_ms = timeout.as_millis() as u64;
        ApiError::new(
            ErrorKind::TimeoutError,
            format!("Request timed out after {}ms", timeout_ms),
        )
        .with_code("timeout")
        .with_details(serde_json::json!({ "timeout_ms": timeout_ms }))
    }

    /// Check whether the error is of the given kind
    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    fn from_client_error(status: u16, body: &TransportBody) -> Self {
        if let Some(Value::Object(map)) = decode_body(body) {
            if let Some(error) = map.get("error") {
                return Self::from_error_object(error, map.get("meta"));
            }

            if let Some(Value::Array(entries)) = map.get("errors") {
                if !entries.is_empty() {
                    return Self::from_field_errors(entries);
                }
            }
        }

        let (kind, code) = match status {
            401 => (ErrorKind::AuthenticationError, "unauthorized".to_string()),
            403 => (ErrorKind::AuthorizationError, "forbidden".to_string()),
            429 => (ErrorKind::RateLimitError, "rate_limit_exceeded".to_string()),
            // Bare 404s stay generic; only an explicit entity_not_found maps to NotFoundError
            _ => (ErrorKind::ApiError, format!("client_error_{}", status)),
        };

        ApiError::new(kind, format!("Client error {}: {}", status, body_text(body))).with_code(code)
    }

    fn from_error_object(error: &Value, top_level_meta: Option<&Value>) -> Self {
        let object = match error {
            Value::Object(object) => object,
            Value::String(message) => return ApiError::new(ErrorKind::ApiError, message.clone()),
            _ => return ApiError::new(ErrorKind::ApiError, UNKNOWN_ERROR_MESSAGE),
        };

        let code = object.get("code").and_then(Value::as_str);

        let explicit_meta = match object.get("meta").or(top_level_meta) {
            Some(Value::Object(meta)) => Some(meta),
            _ => None,
        };

        // Only an explicit meta object can carry the type; extension keys never do
        let meta_type = explicit_meta
            .and_then(|meta| meta.get("type"))
            .and_then(Value::as_str);

        let kind = if meta_type == Some("validation_error") {
            ErrorKind::ValidationError
        } else {
            ErrorKind::from_error_code(code)
        };

        let meta = match explicit_meta {
            Some(meta) => Some(meta.clone()),
            None => {
                let extensions: Map<String, Value> = object
                    .iter()
                    .filter(|(key, _)| !KNOWN_ERROR_KEYS.contains(&key.as_str()))
                    .map(|(key, value)| (key.clone(), value.clone()))
                    .collect();
                (!extensions.is_empty()).then_some(extensions)
            }
        };

        let message = object
            .get("detail")
            .and_then(Value::as_str)
            .or_else(|| object.get("message").and_then(Value::as_str))
            .unwrap_or(UNKNOWN_ERROR_MESSAGE)
            .to_string();

        ApiError {
            kind,
            code: code.map(str::to_string),
            message,
            details: object.get("errors").cloned(),
            meta,
        }
    }

    fn from_field_errors(entries: &[Value]) -> Self {
        let message = entries
            .iter()
            .map(|entry| {
                let detail = entry
                    .get("detail")
                    .and_then(Value::as_str)
                    .or_else(|| entry.get("message").and_then(Value::as_str))
                    .unwrap_or("Invalid value");
                match entry.get("field").and_then(Value::as_str) {
                    Some(field) => format!("{}: {}", field, detail),
                    None => detail.to_string(),
                }
            })
            .collect::<Vec<_>>()
            .join("; ");

        ApiError::new(ErrorKind::ValidationError, message)
            .with_code("validation_failed")
            .with_details(Value::Array(entries.to_vec()))
    }
}

/// Decode the body into JSON when possible
fn decode_body(body: &TransportBody) -> Option<Value> {
    match body {
        TransportBody::Decoded(value) => Some(value.clone()),
        TransportBody::Bytes(bytes) => serde_json::from_slice(bytes).ok(),
    }
}

/// Render the body for inclusion in an error message
fn body_text(body: &TransportBody) -> String {
    match body {
        TransportBody::Decoded(value) => value.to_string(),
        TransportBody::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
    }
}
