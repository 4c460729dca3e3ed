//! HTTP layer for Paddle API communication
//!
//! - Request building with query encoding and header merging
//! - A transport boundary with a reqwest implementation
//! - Classification of failed responses into [`ApiError`]
//! - The [`Client`] tying the pipeline together

pub mod builder;
pub mod client;
pub mod error;
pub mod headers;
pub mod query;
pub mod transport;

pub use builder::{Method, RequestBuilder, RequestDescriptor, RequestParts};
pub use client::{Client, ClientBuilder, RequestOptions};
pub use error::{ApiError, ApiResult, ErrorKind};
pub use query::QueryParams;
pub use transport::{ReqwestTransport, Transport, TransportBody, TransportError, TransportResponse};
