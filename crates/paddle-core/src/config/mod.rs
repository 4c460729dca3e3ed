//! Client configuration
//!
//! A [`Configuration`] is an immutable value resolved fresh for every call
//! (or handed in by the caller). [`ConfigResolver`] stacks
//! [`ConfigSource`]s so explicit application settings win over environment
//! variables, which win over the built-in defaults.

mod resolver;
mod source;

pub use resolver::ConfigResolver;
pub use source::{AppConfig, ConfigKey, ConfigSource, DotenvSource, EnvSource, MapSource};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use crate::Result;

/// Default request timeout in milliseconds
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Default value of the retry hint
pub const DEFAULT_RETRY: bool = false;

/// Base URL of the sandbox environment
pub const SANDBOX_BASE_URL: &str = "https://sandbox-api.paddle.com";

/// Base URL of the live environment
pub const LIVE_BASE_URL: &str = "https://api.paddle.com";

/// Paddle environment a key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Sandbox,
    Live,
}

impl Environment {
    /// Infer the environment from markers embedded in an API key.
    ///
    /// Keys without a marker fall back to sandbox.
    pub fn infer_from_key(api_key: &str) -> Self {
        if api_key.contains("live_") {
            Environment::Live
        } else {
            Environment::Sandbox
        }
    }

    /// Fixed API endpoint for the environment
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_BASE_URL,
            Environment::Live => LIVE_BASE_URL,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Live => "live",
        }
    }
}

impl FromStr for Environment {
    type Err = crate::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "sandbox" => Ok(Environment::Sandbox),
            "live" | "production" => Ok(Environment::Live),
            other => Err(crate::Error::Configuration {
                message: format!("Unknown environment '{}'", other),
                remediation: Some(format!(
                    "Set {} to one of: sandbox, live, production",
                    ConfigKey::Environment.env_var()
                )),
            }),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved, immutable client configuration
#[derive(Clone, PartialEq, Eq)]
pub struct Configuration {
    api_key: String,
    environment: Environment,
    base_url: String,
    timeout_ms: u64,
    retry: bool,
}

impl Configuration {
    /// Start building a configuration explicitly
    pub fn builder() -> ConfigurationBuilder {
        ConfigurationBuilder::default()
    }

    /// Configuration for an API key with every other value defaulted
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::builder().api_key(api_key).build()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn timeout_ms(&self) -> u64 {
        self.timeout_ms
    }

    pub fn retry(&self) -> bool {
        self.retry
    }

    /// API key safe for logs: prefix plus the last four characters
    pub fn redacted_api_key(&self) -> String {
        redact(&self.api_key)
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("api_key", &self.redacted_api_key())
            .field("environment", &self.environment)
            .field("base_url", &self.base_url)
            .field("timeout_ms", &self.timeout_ms)
            .field("retry", &self.retry)
            .finish()
    }
}

fn redact(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() <= 12 {
        return "****".to_string();
    }
    let head: String = chars[..9].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}****{}", head, tail)
}

/// Builder for explicit configurations
#[derive(Debug, Clone, Default)]
pub struct ConfigurationBuilder {
    api_key: Option<String>,
    environment: Option<Environment>,
    base_url: Option<String>,
    timeout_ms: Option<u64>,
    retry: Option<bool>,
}

impl ConfigurationBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = Some(environment);
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Timeout in milliseconds; zero falls back to the default
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn retry(mut self, retry: bool) -> Self {
        self.retry = Some(retry);
        self
    }

    /// Fill in defaults. Only a missing API key is an error here; the
    /// security checks run separately before every request.
    pub fn build(self) -> Result<Configuration> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| crate::Error::Configuration {
                message: "Paddle API key is not configured".to_string(),
                remediation: Some(format!(
                    "Set the {} environment variable or pass an api_key in the application configuration",
                    ConfigKey::ApiKey.env_var()
                )),
            })?;

        let environment = self
            .environment
            .unwrap_or_else(|| Environment::infer_from_key(&api_key));

        let base_url = self
            .base_url
            .unwrap_or_else(|| environment.default_base_url().to_string());

        Ok(Configuration {
            api_key,
            environment,
            base_url,
            timeout_ms: self.timeout_ms.filter(|ms| *ms > 0).unwrap_or(DEFAULT_TIMEOUT_MS),
            retry: self.retry.unwrap_or(DEFAULT_RETRY),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SANDBOX_KEY: &str = "pdl_sdbx_apikey_01hv8wptq8987qeep44cyrewp9_bSoKu3ntHK2tvBT9X4T0rD_AA3";
    const LIVE_KEY: &str = "pdl_live_apikey_01hv8wptq8987qeep44cyrewp9_bSoKu3ntHK2tvBT9X4T0rD_AA3";

    #[test]
    fn test_environment_inference() {
        assert_eq!(Environment::infer_from_key(LIVE_KEY), Environment::Live);
        assert_eq!(Environment::infer_from_key(SANDBOX_KEY), Environment::Sandbox);
        assert_eq!(Environment::infer_from_key("pdl_unmarked_key"), Environment::Sandbox);
    }

    #[test]
    fn test_environment_parsing() {
        assert_eq!("live".parse::<Environment>().unwrap(), Environment::Live);
        assert_eq!("Production".parse::<Environment>().unwrap(), Environment::Live);
        assert_eq!(" sandbox ".parse::<Environment>().unwrap(), Environment::Sandbox);

        let err = "staging".parse::<Environment>().unwrap_err();
        assert!(err.to_string().contains("staging"));
        assert!(err.remediation().is_some());
    }

    #[test]
    fn test_builder_defaults() {
        let config = Configuration::new(LIVE_KEY).unwrap();
        assert_eq!(config.environment(), Environment::Live);
        assert_eq!(config.base_url(), LIVE_BASE_URL);
        assert_eq!(config.timeout_ms(), DEFAULT_TIMEOUT_MS);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(!config.retry());
    }

    #[test]
    fn test_explicit_environment_wins() {
        let config = Configuration::builder()
            .api_key(LIVE_KEY)
            .environment(Environment::Sandbox)
            .build()
            .unwrap();
        assert_eq!(config.environment(), Environment::Sandbox);
        assert_eq!(config.base_url(), SANDBOX_BASE_URL);
    }

    #[test]
    fn test_zero_timeout_falls_back() {
        let config = Configuration::builder().api_key(SANDBOX_KEY).timeout_ms(0).build().unwrap();
        assert_eq!(config.timeout_ms(), DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_missing_api_key() {
        let err = Configuration::builder().api_key("   ").build().unwrap_err();
        assert!(matches!(err, crate::Error::Configuration { .. }));
        assert!(err.remediation().unwrap().contains("PADDLE_API_KEY"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = Configuration::new(SANDBOX_KEY).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains(SANDBOX_KEY));
        assert!(debug.contains("pdl_sdbx_****"));
        assert!(config.redacted_api_key().ends_with("_AA3"));
        assert_eq!(redact("pdl_short"), "****");
    }
}
