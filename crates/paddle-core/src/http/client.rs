//! Client orchestrating the request pipeline
//!
//! Resolves configuration, validates it, builds the request, hands it to
//! the transport and classifies whatever comes back.

use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::config::{ConfigResolver, ConfigSource, Configuration};
use crate::http::builder::{Method, RequestBuilder, RequestDescriptor, RequestParts};
use crate::http::error::{ApiError, ApiResult};
use crate::http::query::QueryParams;
use crate::http::transport::{ReqwestTransport, Transport, TransportError};
use crate::response::{self, ResponseBody};
use crate::security::{DenylistValidator, SecurityValidator};
use crate::Result;

/// Per-call options
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Option<QueryParams>,
    /// Extra headers; protected names are ignored
    pub headers: Vec<(String, String)>,
    /// Overrides the configured timeout for this call
    pub timeout: Option<Duration>,
    /// Skips resolution and uses this configuration as-is
    pub config: Option<Configuration>,
}

impl RequestOptions {
    pub fn with_query(mut self, query: QueryParams) -> Self {
        self.query = Some(query);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_config(mut self, config: Configuration) -> Self {
        self.config = Some(config);
        self
    }
}

/// Paddle API client
///
/// Holds no per-call state. Configuration is resolved on every call unless
/// a fixed one was supplied, so a client is cheap to share across tasks.
#[derive(Clone)]
pub struct Client {
    transport: Arc<dyn Transport>,
    resolver: Arc<ConfigResolver>,
    config: Option<Configuration>,
    validator: Arc<dyn SecurityValidator>,
}

impl Client {
    pub fn builder() -> ClientBuilder {
        ClientBuilder::default()
    }

    /// Client reading `PADDLE_*` environment variables on each call
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    /// Client bound to a fixed configuration
    pub fn new(config: Configuration) -> Result<Self> {
        Self::builder().config(config).build()
    }

    /// Issue one API call.
    ///
    /// The outer `Result` fails before anything is sent (bad configuration,
    /// unsafe path or header). The inner one carries the API outcome.
    #[instrument(skip(self, method, path, body, options), fields(method = %method, path = %path))]
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        options: RequestOptions,
    ) -> Result<ApiResult<ResponseBody>> {
        let config = match options.config {
            Some(config) => config,
            None => self.configuration()?,
        };
        self.validator.validate_config(&config)?;

        let parts = RequestParts {
            query: options.query,
            headers: options.headers,
            timeout: options.timeout,
        };
        let request = RequestBuilder::new(&config, self.validator.as_ref()).build(
            method,
            path,
            body.as_ref(),
            &parts,
        )?;

        debug!(
            url = %request.url,
            environment = %config.environment(),
            timeout_ms = request.timeout.as_millis() as u64,
            has_body = request.body.is_some(),
            "built request"
        );

        Ok(self.dispatch(&request).await)
    }

    pub async fn get(&self, path: &str, query: Option<QueryParams>) -> Result<ApiResult<ResponseBody>> {
        let options = RequestOptions {
            query,
            ..Default::default()
        };
        self.request(Method::Get, path, None, options).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<ApiResult<ResponseBody>> {
        self.request(Method::Post, path, Some(body), RequestOptions::default()).await
    }

    pub async fn patch(&self, path: &str, body: Value) -> Result<ApiResult<ResponseBody>> {
        self.request(Method::Patch, path, Some(body), RequestOptions::default()).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<ApiResult<ResponseBody>> {
        self.request(Method::Put, path, Some(body), RequestOptions::default()).await
    }

    pub async fn delete(&self, path: &str) -> Result<ApiResult<ResponseBody>> {
        self.request(Method::Delete, path, None, RequestOptions::default()).await
    }

    /// Configuration the next call would use
    pub fn configuration(&self) -> Result<Configuration> {
        match &self.config {
            Some(config) => Ok(config.clone()),
            None => self.resolver.resolve(),
        }
    }

    async fn dispatch(&self, request: &RequestDescriptor) -> ApiResult<ResponseBody> {
        match self.transport.send(request).await {
            Ok(response) if (200..300).contains(&response.status) => {
                info!(status = response.status, "request completed");
                response::interpret(response)
            }
            Ok(response) => {
                let error = ApiError::from_status(response.status, &response.body);
                warn!(
                    status = response.status,
                    kind = %error.kind,
                    code = error.code.as_deref().unwrap_or(""),
                    "request failed"
                );
                Err(error)
            }
            Err(TransportError::Timeout) => {
                warn!(timeout_ms = request.timeout.as_millis() as u64, "request timed out");
                Err(ApiError::timeout_error(request.timeout))
            }
            Err(TransportError::Other(reason)) => {
                warn!(%reason, "transport failure");
                Err(ApiError::network_error(reason))
            }
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("resolver", &self.resolver)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Client`]
#[derive(Default)]
pub struct ClientBuilder {
    transport: Option<Arc<dyn Transport>>,
    resolver: Option<ConfigResolver>,
    config: Option<Configuration>,
    validator: Option<Arc<dyn SecurityValidator>>,
}

impl ClientBuilder {
    /// Use a custom transport instead of reqwest
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Add a configuration source. Sources are consulted in the order added.
    /// Without any, the environment is used.
    pub fn source(mut self, source: impl ConfigSource + 'static) -> Self {
        let resolver = self.resolver.take().unwrap_or_else(ConfigResolver::new);
        self.resolver = Some(resolver.with_source(source));
        self
    }

    /// Replace the resolver entirely
    pub fn resolver(mut self, resolver: ConfigResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Bind a fixed configuration; sources are then ignored
    pub fn config(mut self, config: Configuration) -> Self {
        self.config = Some(config);
        self
    }

    pub fn validator(mut self, validator: impl SecurityValidator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn build(self) -> Result<Client> {
        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new()?),
        };

        Ok(Client {
            transport,
            resolver: Arc::new(self.resolver.unwrap_or_else(ConfigResolver::from_env)),
            config: self.config,
            validator: self.validator.unwrap_or_else(|| Arc::new(DenylistValidator)),
        })
    }
}
