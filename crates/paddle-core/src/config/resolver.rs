//! Layered configuration resolution

use tracing::{debug, warn};

use super::source::{AppConfig, ConfigKey, ConfigSource, EnvSource};
use super::{Configuration, Environment, DEFAULT_RETRY, DEFAULT_TIMEOUT_MS};
use crate::Result;

/// Resolves a [`Configuration`] from an ordered stack of sources.
///
/// Sources are consulted in insertion order; the first one that defines a
/// key wins. Keys that no source defines fall back to fixed defaults.
pub struct ConfigResolver {
    sources: Vec<Box<dyn ConfigSource>>,
}

impl ConfigResolver {
    /// Resolver with no sources
    pub fn new() -> Self {
        Self { sources: Vec::new() }
    }

    /// Resolver reading only `PADDLE_*` environment variables
    pub fn from_env() -> Self {
        Self::new().with_source(EnvSource)
    }

    /// Application configuration layered over environment variables
    pub fn layered(app: AppConfig) -> Self {
        Self::new().with_source(app).with_source(EnvSource)
    }

    /// Append a lower-priority source
    pub fn with_source(mut self, source: impl ConfigSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// First value defined for `key`, with the name of the source that had it
    pub fn lookup(&self, key: ConfigKey) -> Option<(String, &str)> {
        self.sources
            .iter()
            .find_map(|source| source.get(key).map(|value| (value, source.name())))
    }

    /// Resolve a fresh configuration
    pub fn resolve(&self) -> Result<Configuration> {
        let mut builder = Configuration::builder();

        if let Some((api_key, source)) = self.lookup(ConfigKey::ApiKey) {
            debug!(source, "api key resolved");
            builder = builder.api_key(api_key);
        }

        if let Some((environment, source)) = self.lookup(ConfigKey::Environment) {
            debug!(source, environment = %environment, "environment resolved");
            builder = builder.environment(environment.parse::<Environment>()?);
        }

        if let Some((base_url, source)) = self.lookup(ConfigKey::BaseUrl) {
            debug!(source, base_url = %base_url, "base url override");
            builder = builder.base_url(base_url);
        }

        builder = builder
            .timeout_ms(
                self.lookup(ConfigKey::Timeout)
                    .map(|(raw, _)| parse_timeout(&raw))
                    .unwrap_or(DEFAULT_TIMEOUT_MS),
            )
            .retry(
                self.lookup(ConfigKey::Retry)
                    .map(|(raw, _)| parse_bool(&raw))
                    .unwrap_or(DEFAULT_RETRY),
            );

        builder.build()
    }
}

impl Default for ConfigResolver {
    fn default() -> Self {
        Self::from_env()
    }
}

impl std::fmt::Debug for ConfigResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigResolver")
            .field("sources", &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>())
            .finish()
    }
}

/// Parse a millisecond timeout, falling back to the default on bad input
fn parse_timeout(raw: &str) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => ms,
        _ => {
            warn!(value = raw, "invalid timeout, using default of {}ms", DEFAULT_TIMEOUT_MS);
            DEFAULT_TIMEOUT_MS
        }
    }
}

/// Tri-state boolean parse; unrecognized values fall back to the default
fn parse_bool(raw: &str) -> bool {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => true,
        "false" | "0" | "no" | "off" => false,
        _ => {
            warn!(value = raw, "unrecognized retry flag, using default");
            DEFAULT_RETRY
        }
    }
}
