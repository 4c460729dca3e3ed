//! Paddle Core - request/response pipeline for the Paddle Billing API
//!
//! Every call flows through the same stages: resolve and validate a
//! [`Configuration`], build a request, send it through a [`Transport`],
//! then either interpret the success body or classify the failure.
//!
//! # Main Components
//!
//! - **Configuration**: layered sources resolved into an immutable [`Configuration`]
//! - **Security**: denylist validation of keys, base URLs, paths and headers
//! - **HTTP**: request building, query encoding, the transport boundary and [`Client`]
//! - **Response**: envelope unwrapping into a [`ResponseBody`]
//!
//! Failures come in two tiers. [`Error`] is fatal and returned before
//! anything is sent. [`ApiError`] describes what went wrong with a call
//! that was attempted.
//!
//! # Example
//!
//! ```no_run
//! use paddle_core::{Client, Result};
//!
//! async fn example() -> Result<()> {
//!     let client = Client::from_env()?;
//!     match client.get("/products/pro_01h", None).await? {
//!         Ok(body) => println!("{:?}", body.as_map()),
//!         Err(error) => eprintln!("{} ({})", error.message, error.kind),
//!     }
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod response;
pub mod security;

pub use config::{AppConfig, ConfigResolver, ConfigSource, Configuration, Environment};
pub use error::{Error, Result};
pub use http::{
    ApiError, ApiResult, Client, ClientBuilder, ErrorKind, Method, QueryParams, RequestOptions,
    Transport, TransportBody, TransportError, TransportResponse,
};
pub use response::ResponseBody;
pub use security::{DenylistValidator, SecurityValidator};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
