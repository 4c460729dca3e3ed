//! Security validation for configuration and request inputs
//!
//! The request pipeline only depends on the [`SecurityValidator`] trait.
//! [`DenylistValidator`] implements it with the rule tables from [`rules`].

pub mod rules;

use tracing::warn;

use crate::config::Configuration;
use crate::Result;
use rules::{
    api_key_rules, base_url_rules, first_match, path_rules, API_KEY_ENVIRONMENT_MARKERS,
    API_KEY_MAX_LENGTH, API_KEY_MIN_LENGTH, API_KEY_PREFIX,
};

/// Checks run before any request leaves the process
pub trait SecurityValidator: Send + Sync {
    fn validate_api_key(&self, api_key: &str) -> Result<()>;

    fn validate_base_url(&self, base_url: &str) -> Result<()>;

    fn validate_path(&self, path: &str) -> Result<()>;

    fn validate_header(&self, name: &str, value: &str) -> Result<()>;

    /// Validate a whole configuration. Never mutates it.
    fn validate_config(&self, config: &Configuration) -> Result<()> {
        self.validate_api_key(config.api_key())?;
        self.validate_base_url(config.base_url())?;
        Ok(())
    }
}

/// Default validator backed by the versioned denylist tables
#[derive(Debug, Clone, Copy, Default)]
pub struct DenylistValidator;

impl SecurityValidator for DenylistValidator {
    fn validate_api_key(&self, api_key: &str) -> Result<()> {
        if !api_key.starts_with(API_KEY_PREFIX) {
            return Err(security_error(
                "api_key",
                "key.prefix",
                format!("API key must start with '{}'", API_KEY_PREFIX),
            ));
        }

        let length = api_key.chars().count();
        if !(API_KEY_MIN_LENGTH..=API_KEY_MAX_LENGTH).contains(&length) {
            return Err(security_error(
                "api_key",
                "key.length",
                format!(
                    "API key length {} is outside {}..={}",
                    length, API_KEY_MIN_LENGTH, API_KEY_MAX_LENGTH
                ),
            ));
        }

        if let Some(rule) = first_match(api_key_rules(), api_key) {
            // Never echo the key itself
            return Err(security_error(
                "api_key",
                rule.id,
                format!("API key contains {}", rule.rationale),
            ));
        }

        if !API_KEY_ENVIRONMENT_MARKERS
            .iter()
            .any(|marker| api_key.contains(marker))
        {
            return Err(security_error(
                "api_key",
                "key.environment_marker",
                format!(
                    "API key has no environment marker (expected one of: {})",
                    API_KEY_ENVIRONMENT_MARKERS.join(", ")
                ),
            ));
        }

        Ok(())
    }

    fn validate_base_url(&self, base_url: &str) -> Result<()> {
        if let Some(rule) = first_match(base_url_rules(), base_url) {
            return Err(security_error(
                "base_url",
                rule.id,
                format!("Base URL contains {}", rule.rationale),
            ));
        }

        let parsed = url::Url::parse(base_url).map_err(|e| crate::Error::InvalidUrl {
            url: base_url.to_string(),
            message: e.to_string(),
            source: Some(e),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(security_error(
                "base_url",
                "url.http_scheme",
                format!("Base URL scheme '{}' is not http or https", parsed.scheme()),
            ));
        }

        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(security_error(
                "base_url",
                "url.host",
                "Base URL has no host".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_path(&self, path: &str) -> Result<()> {
        if path.contains("..") {
            return Err(unsafe_path(path, "path contains '..'"));
        }

        if let Some(rule) = first_match(path_rules(), path) {
            return Err(unsafe_path(path, rule.rationale));
        }

        Ok(())
    }

    fn validate_header(&self, name: &str, value: &str) -> Result<()> {
        if name.is_empty() || !name.bytes().all(is_token_byte) {
            return Err(crate::Error::UnsafeHeader {
                name: name.to_string(),
                message: "header name is not a valid token".to_string(),
            });
        }

        if value.chars().any(|c| c.is_control() && c != '\t') {
            return Err(crate::Error::UnsafeHeader {
                name: name.to_string(),
                message: "header value contains control characters".to_string(),
            });
        }

        Ok(())
    }
}

/// Validate a configuration with the default denylist validator
pub fn validate(config: &Configuration) -> Result<()> {
    DenylistValidator.validate_config(config)
}

fn security_error(field: &'static str, rule: &'static str, message: String) -> crate::Error {
    warn!(field, rule, "security validation failed");
    crate::Error::Security { field, rule, message }
}

fn unsafe_path(path: &str, message: &str) -> crate::Error {
    warn!(path, "rejected request path");
    crate::Error::UnsafePath {
        path: path.to_string(),
        message: message.to_string(),
    }
}

/// RFC 7230 token characters
fn is_token_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&byte)
}
