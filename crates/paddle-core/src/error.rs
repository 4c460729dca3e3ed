//! Fatal error types for the Paddle core library
//!
//! Errors in this module describe misconfiguration or programmer error:
//! a missing API key, an unsafe request path, a header that would inject
//! extra lines. They abort a call before any network attempt and are kept
//! separate from [`ApiError`](crate::ApiError), which describes what the
//! API (or the network) said about a request that was actually sent.

use thiserror::Error;

/// Main fatal error type for Paddle operations
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or unusable configuration value
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        /// Hint telling the operator how to fix the problem
        remediation: Option<String>,
    },

    /// A configuration value matched a security rule
    #[error("Security validation failed for {field} ({rule}): {message}")]
    Security {
        field: &'static str,
        rule: &'static str,
        message: String,
    },

    /// Request path rejected before dispatch
    #[error("Unsafe request path '{path}': {message}")]
    UnsafePath { path: String, message: String },

    /// Caller-supplied header rejected before dispatch
    #[error("Unsafe header '{name}': {message}")]
    UnsafeHeader { name: String, message: String },

    /// Base URL could not be parsed or joined
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        url: String,
        message: String,
        #[source]
        source: Option<url::ParseError>,
    },

    /// Request body could not be encoded
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// The HTTP transport could not be constructed
    #[error("HTTP transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Convenience type alias for Results using the fatal Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error without a remediation hint
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            remediation: None,
        }
    }

    /// Remediation hint, if the error carries one
    pub fn remediation(&self) -> Option<&str> {
        match self {
            Error::Configuration { remediation, .. } => remediation.as_deref(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnsafePath {
            path: "/a/../b".to_string(),
            message: "path traversal".to_string(),
        };
        assert_eq!(err.to_string(), "Unsafe request path '/a/../b': path traversal");
    }

    #[test]
    fn test_remediation() {
        let err = Error::Configuration {
            message: "API key missing".to_string(),
            remediation: Some("Set PADDLE_API_KEY".to_string()),
        };
        assert_eq!(err.remediation(), Some("Set PADDLE_API_KEY"));
        assert!(Error::configuration("x").remediation().is_none());
    }

    #[test]
    fn test_security_display_names_rule() {
        let err = Error::Security {
            field: "api_key",
            rule: "key.prefix",
            message: "missing prefix".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("api_key"));
        assert!(text.contains("key.prefix"));
    }
}
