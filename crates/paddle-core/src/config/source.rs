//! Configuration sources
//!
//! Each source answers "do you have a value for this key?". Process
//! environment variables are just one source; nothing in the pipeline reads
//! `std::env` except [`EnvSource`].

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::Result;

/// Configuration keys understood by the resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    ApiKey,
    Environment,
    BaseUrl,
    Timeout,
    Retry,
}

impl ConfigKey {
    /// All keys in resolution order
    pub const ALL: [ConfigKey; 5] = [
        ConfigKey::ApiKey,
        ConfigKey::Environment,
        ConfigKey::BaseUrl,
        ConfigKey::Timeout,
        ConfigKey::Retry,
    ];

    /// Environment variable backing this key
    pub fn env_var(&self) -> &'static str {
        match self {
            ConfigKey::ApiKey => "PADDLE_API_KEY",
            ConfigKey::Environment => "PADDLE_ENVIRONMENT",
            ConfigKey::BaseUrl => "PADDLE_BASE_URL",
            ConfigKey::Timeout => "PADDLE_TIMEOUT",
            ConfigKey::Retry => "PADDLE_RETRY",
        }
    }
}

/// A layer of configuration values
pub trait ConfigSource: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Raw value for a key, if this source defines it
    fn get(&self, key: ConfigKey) -> Option<String>;
}

/// Explicit application-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api_key: Option<String>,
    /// "sandbox", "live" or "production"
    pub environment: Option<String>,
    pub base_url: Option<String>,
    /// Timeout in milliseconds
    pub timeout: Option<u64>,
    pub retry: Option<bool>,
}

impl AppConfig {
    /// Merge another config on top of this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        if other.api_key.is_some() {
            self.api_key = other.api_key;
        }
        if other.environment.is_some() {
            self.environment = other.environment;
        }
        if other.base_url.is_some() {
            self.base_url = other.base_url;
        }
        if other.timeout.is_some() {
            self.timeout = other.timeout;
        }
        if other.retry.is_some() {
            self.retry = other.retry;
        }
    }
}

impl ConfigSource for AppConfig {
    fn name(&self) -> &str {
        "application"
    }

    fn get(&self, key: ConfigKey) -> Option<String> {
        match key {
            ConfigKey::ApiKey => self.api_key.clone(),
            ConfigKey::Environment => self.environment.clone(),
            ConfigKey::BaseUrl => self.base_url.clone(),
            ConfigKey::Timeout => self.timeout.map(|ms| ms.to_string()),
            ConfigKey::Retry => self.retry.map(|retry| retry.to_string()),
        }
    }
}

/// Process environment variables (`PADDLE_*`)
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn name(&self) -> &str {
        "environment"
    }

    fn get(&self, key: ConfigKey) -> Option<String> {
        std::env::var(key.env_var()).ok().filter(|value| !value.is_empty())
    }
}

/// Fixed map of environment-style variables, handy for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    name: String,
    vars: HashMap<String, String>,
}

impl MapSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            vars: HashMap::new(),
        }
    }

    /// Set a value by its environment variable name
    pub fn with_var(mut self, var: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(var.into(), value.into());
        self
    }

    /// Set a value by key
    pub fn with(self, key: ConfigKey, value: impl Into<String>) -> Self {
        self.with_var(key.env_var(), value)
    }
}

impl ConfigSource for MapSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: ConfigKey) -> Option<String> {
        self.vars.get(key.env_var()).filter(|value| !value.is_empty()).cloned()
    }
}

/// Values read from a `.env` file without touching the process environment
#[derive(Debug, Clone)]
pub struct DotenvSource {
    inner: MapSource,
}

impl DotenvSource {
    /// Parse a dotenv file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let iter = dotenv::from_path_iter(path).map_err(|e| crate::Error::Configuration {
            message: format!("Failed to read {}: {}", path.display(), e),
            remediation: None,
        })?;

        let mut inner = MapSource::new(format!("dotenv:{}", path.display()));
        for item in iter {
            let (name, value) = item.map_err(|e| crate::Error::Configuration {
                message: format!("Invalid line in {}: {}", path.display(), e),
                remediation: None,
            })?;
            inner = inner.with_var(name, value);
        }

        Ok(Self { inner })
    }
}

impl ConfigSource for DotenvSource {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn get(&self, key: ConfigKey) -> Option<String> {
        self.inner.get(key)
    }
}
