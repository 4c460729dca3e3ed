//! Configuration loading for the CLI
//!
//! Sources, highest priority first:
//! - Command-line flags
//! - Configuration file (YAML/JSON)
//! - `PADDLE_*` environment variables
//! - A `.env` file in the working directory

use crate::cli::ConnectionArgs;
use crate::error::{Error, Result};
use paddle_core::config::{ConfigKey, DotenvSource, EnvSource, MapSource};
use paddle_core::{AppConfig, ConfigResolver, ConfigSource};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Everything needed to build a resolver for one invocation
#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Values from command-line flags
    pub flags: AppConfig,
    /// Values from the configuration file, if one was found
    pub file: Option<(PathBuf, AppConfig)>,
    /// `.env` file to fall back to
    pub dotenv: Option<PathBuf>,
}

impl Settings {
    /// Load settings from flags and an explicit or default config file
    pub fn load(config_file: Option<&Path>, connection: &ConnectionArgs) -> Result<Self> {
        let file = match config_file {
            Some(path) => Some((path.to_path_buf(), load_file(path)?)),
            None => find_default_file(),
        };

        let dotenv = Some(PathBuf::from(".env")).filter(|path| path.is_file());

        Ok(Self {
            flags: flags_config(connection),
            file,
            dotenv,
        })
    }

    /// Build a resolver layering every source in priority order
    pub fn resolver(&self) -> ConfigResolver {
        let mut resolver = ConfigResolver::new().with_source(named_source("flags", &self.flags));

        if let Some((path, config)) = &self.file {
            resolver = resolver.with_source(named_source(&format!("file:{}", path.display()), config));
        }

        resolver = resolver.with_source(EnvSource);

        if let Some(path) = &self.dotenv {
            match DotenvSource::from_path(path) {
                Ok(source) => resolver = resolver.with_source(source),
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring unreadable .env file"),
            }
        }

        resolver
    }
}

/// Load an application config from a YAML or JSON file
pub fn load_file(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path)?;

    let config = match path.extension().and_then(|s| s.to_str()) {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
        Some("json") => serde_json::from_str(&content)?,
        _ => {
            return Err(Error::config(format!(
                "Unsupported config file extension for {} (expected .yaml, .yml or .json)",
                path.display()
            )))
        }
    };

    debug!(path = %path.display(), "loaded configuration file");
    Ok(config)
}

/// Default configuration file paths, checked in order
pub fn default_config_paths() -> Vec<PathBuf> {
    let mut paths = vec![
        PathBuf::from("paddle.yaml"),
        PathBuf::from("paddle.yml"),
        PathBuf::from("paddle.json"),
    ];

    if let Some(config_dir) = dirs::config_dir() {
        let paddle_dir = config_dir.join("paddle");
        paths.push(paddle_dir.join("config.yaml"));
        paths.push(paddle_dir.join("config.json"));
    }

    paths
}

fn find_default_file() -> Option<(PathBuf, AppConfig)> {
    for path in default_config_paths() {
        if !path.exists() {
            continue;
        }

        match load_file(&path) {
            Ok(config) => return Some((path, config)),
            Err(e) => warn!(path = %path.display(), error = %e, "failed to load config file"),
        }
    }

    None
}

fn flags_config(connection: &ConnectionArgs) -> AppConfig {
    AppConfig {
        api_key: connection.api_key.clone(),
        environment: connection.environment.clone(),
        base_url: connection.base_url.clone(),
        timeout: connection.timeout,
        retry: None,
    }
}

/// Wrap an [`AppConfig`] in a source that reports `name` in logs
fn named_source(name: &str, config: &AppConfig) -> MapSource {
    ConfigKey::ALL
        .iter()
        .fold(MapSource::new(name), |source, &key| match config.get(key) {
            Some(value) => source.with(key, value),
            None => source,
        })
}
