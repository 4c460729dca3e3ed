//! Error types and handling for the CLI

use paddle_core::{ApiError, ErrorKind};
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Fatal error from paddle-core, raised before any request is sent
    #[error("{0}")]
    Core(#[from] paddle_core::Error),

    /// The API call was made and failed
    #[error("{0}")]
    Api(ApiError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// Configuration file error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed command-line input
    #[error("Invalid arguments: {0}")]
    InvalidArgs(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid arguments error
    pub fn invalid_args(message: impl Into<String>) -> Self {
        Self::InvalidArgs(message.into())
    }

    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::FileNotFound { .. } => 3,
            Self::Config(_) => 5,
            Self::InvalidArgs(_) => 6,
            Self::Json(_) => 12,
            Self::Yaml(_) => 13,
            Self::Api(error) => api_exit_code(error.kind),
            Self::Other { .. } => 99,
        }
    }

    /// Check if this error should display usage help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Self::InvalidArgs(_))
    }
}

/// Exit codes for failed API calls, one per error kind
fn api_exit_code(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::ApiError => 20,
        ErrorKind::AuthenticationError => 21,
        ErrorKind::AuthorizationError => 22,
        ErrorKind::ValidationError => 23,
        ErrorKind::RateLimitError => 24,
        ErrorKind::ServerError => 25,
        ErrorKind::NetworkError => 26,
        ErrorKind::TimeoutError => 27,
        ErrorKind::NotFoundError => 28,
        ErrorKind::UnknownError => 29,
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    let mut message = error.to_string();

    if let Error::Core(core_error) = error {
        if let Some(remediation) = core_error.remediation() {
            message = format!("{}\n  hint: {}", message, remediation);
        }
    }

    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), message)
    } else {
        format!("Error: {}", message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes_by_kind() {
        let not_found = Error::Api(ApiError::new(ErrorKind::NotFoundError, "gone"));
        let timeout = Error::Api(ApiError::timeout_error(std::time::Duration::from_secs(1)));
        assert_eq!(not_found.exit_code(), 28);
        assert_eq!(timeout.exit_code(), 27);
        assert_ne!(not_found.exit_code(), timeout.exit_code());
    }

    #[test]
    fn test_core_errors_show_remediation() {
        let error = Error::Core(paddle_core::Error::Configuration {
            message: "API key is required".to_string(),
            remediation: Some("Set PADDLE_API_KEY".to_string()),
        });
        let formatted = format_error(&error, false);
        assert!(formatted.starts_with("Error: "));
        assert!(formatted.contains("hint: Set PADDLE_API_KEY"));
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_invalid_args_show_help() {
        assert!(Error::invalid_args("bad query").should_show_help());
        assert!(!Error::config("bad file").should_show_help());
    }
}
