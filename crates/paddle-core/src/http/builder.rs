//! HTTP request builder for Paddle API requests
//!
//! Turns a method, a resource path, optional query parameters, body and
//! header overrides into a [`RequestDescriptor`] ready for a transport.

use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

use crate::config::Configuration;
use crate::http::headers;
use crate::http::query::{self, QueryParams};
use crate::security::SecurityValidator;
use crate::Result;

/// HTTP methods used by the Paddle API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    /// Whether requests with this method may carry a body
    pub fn allows_body(&self) -> bool {
        matches!(self, Method::Post | Method::Patch | Method::Put)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    pub(crate) fn as_reqwest(&self) -> reqwest::Method {
        match self {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl FromStr for Method {
    type Err = crate::Error;

    fn from_str(method_str: &str) -> Result<Self> {
        match method_str.to_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PATCH" => Ok(Method::Patch),
            "PUT" => Ok(Method::Put),
            "DELETE" => Ok(Method::Delete),
            _ => Err(crate::Error::configuration(format!(
                "Unsupported HTTP method: {}",
                method_str
            ))),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fully resolved request, built once per call
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: Url,
    /// Ordered headers, duplicates already resolved
    pub headers: Vec<(String, String)>,
    /// Encoded JSON body
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
    /// Retry hint for the transport
    pub retry: bool,
}

impl RequestDescriptor {
    /// Case-insensitive header lookup
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Per-call request inputs besides method, path and body
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    pub query: Option<QueryParams>,
    pub headers: Vec<(String, String)>,
    /// Overrides the configured timeout
    pub timeout: Option<Duration>,
}

/// Builder for constructing request descriptors from a configuration
pub struct RequestBuilder<'a> {
    config: &'a Configuration,
    validator: &'a dyn SecurityValidator,
}

impl<'a> RequestBuilder<'a> {
    pub fn new(config: &'a Configuration, validator: &'a dyn SecurityValidator) -> Self {
        Self { config, validator }
    }

    /// Build a request descriptor
    pub fn build(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        parts: &RequestParts,
    ) -> Result<RequestDescriptor> {
        let path = self.normalize_path(path)?;
        let url = self.build_url(&path, parts.query.as_ref())?;

        let headers = headers::merge(
            headers::default_headers(self.config),
            &parts.headers,
            self.validator,
        )?;

        let body = match body {
            Some(body) if method.allows_body() && has_content(body) => Some(serde_json::to_vec(body)?),
            _ => None,
        };

        Ok(RequestDescriptor {
            method,
            url,
            headers,
            body,
            timeout: parts.timeout.unwrap_or_else(|| self.config.timeout()),
            retry: self.config.retry(),
        })
    }

    /// Validate the path and add a missing leading slash
    fn normalize_path(&self, path: &str) -> Result<String> {
        self.validator.validate_path(path)?;

        if path.starts_with('/') {
            Ok(path.to_string())
        } else {
            Ok(format!("/{}", path))
        }
    }

    /// Build the full URL from base URL, path and query
    fn build_url(&self, path: &str, query: Option<&QueryParams>) -> Result<Url> {
        let mut raw = format!("{}{}", self.config.base_url().trim_end_matches('/'), path);

        if let Some(encoded) = query.and_then(query::encode) {
            raw.push('?');
            raw.push_str(&encoded);
        }

        Url::parse(&raw).map_err(|e| crate::Error::InvalidUrl {
            url: raw.clone(),
            message: format!("Failed to build request URL: {}", e),
            source: Some(e),
        })
    }
}

/// Null and empty-object bodies are not sent
fn has_content(body: &Value) -> bool {
    match body {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}
