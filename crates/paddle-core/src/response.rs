//! Response interpretation
//!
//! Successful responses come back in several shapes: an enveloped JSON
//! object, a bare JSON list, nothing at all, or a binary export such as a
//! PDF invoice. [`ResponseBody`] makes the shape explicit so callers match
//! on it instead of guessing.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::warn;

use crate::http::error::{ApiError, ApiResult, ErrorKind};
use crate::http::transport::{TransportBody, TransportResponse};

/// Reserved key wrapping the payload of a success body
pub const ENVELOPE_KEY: &str = "data";

/// Decoded success value
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// JSON object
    Map(Map<String, Value>),
    /// JSON array
    List(Vec<Value>),
    /// Empty body or JSON null
    Nil,
    /// Body that is not JSON, returned untouched
    Bytes(Vec<u8>),
    /// JSON string, number or boolean
    Scalar(Value),
}

impl ResponseBody {
    /// Wrap a decoded JSON value
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => ResponseBody::Map(map),
            Value::Array(list) => ResponseBody::List(list),
            Value::Null => ResponseBody::Nil,
            scalar => ResponseBody::Scalar(scalar),
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, ResponseBody::Nil)
    }

    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            ResponseBody::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            ResponseBody::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ResponseBody::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Convert back into JSON; `None` for raw bytes
    pub fn into_value(self) -> Option<Value> {
        match self {
            ResponseBody::Map(map) => Some(Value::Object(map)),
            ResponseBody::List(list) => Some(Value::Array(list)),
            ResponseBody::Nil => Some(Value::Null),
            ResponseBody::Scalar(value) => Some(value),
            ResponseBody::Bytes(_) => None,
        }
    }

    /// Deserialize into a typed record
    pub fn deserialize<T: DeserializeOwned>(self) -> ApiResult<T> {
        let value = self.into_value().ok_or_else(|| {
            ApiError::new(ErrorKind::ApiError, "Cannot deserialize a binary response body")
                .with_code("decode_error")
        })?;

        serde_json::from_value(value).map_err(|e| {
            ApiError::new(ErrorKind::ApiError, format!("Failed to deserialize response: {}", e))
                .with_code("decode_error")
        })
    }
}

/// Interpret a 2xx transport response
pub fn interpret(response: TransportResponse) -> ApiResult<ResponseBody> {
    let declares_json = response
        .header("content-type")
        .map(is_json_content_type)
        .unwrap_or(false);

    interpret_body(response.body, declares_json)
}

/// Interpret a success body given whether its content-type declared JSON
pub fn interpret_body(body: TransportBody, declares_json: bool) -> ApiResult<ResponseBody> {
    match body {
        TransportBody::Decoded(value) => Ok(unwrap_envelope(value)),
        TransportBody::Bytes(bytes) => {
            if bytes.is_empty() || (declares_json && bytes.iter().all(u8::is_ascii_whitespace)) {
                return Ok(ResponseBody::Nil);
            }

            if !declares_json && !looks_like_json(&bytes) {
                return Ok(ResponseBody::Bytes(bytes));
            }

            match serde_json::from_slice::<Value>(&bytes) {
                Ok(value) => Ok(unwrap_envelope(value)),
                Err(e) if declares_json => Err(ApiError::network_error(format!(
                    "Failed to decode JSON response: {}",
                    e
                ))
                .with_code("invalid_json")),
                Err(_) => {
                    warn!(len = bytes.len(), "body looked like JSON but did not parse, returning raw bytes");
                    Ok(ResponseBody::Bytes(bytes))
                }
            }
        }
    }
}

/// `application/json` or any `+json` structured syntax suffix
pub fn is_json_content_type(content_type: &str) -> bool {
    let media_type = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    media_type == "application/json" || media_type.ends_with("+json")
}

fn looks_like_json(bytes: &[u8]) -> bool {
    let trimmed = bytes.trim_ascii();
    matches!(
        (trimmed.first(), trimmed.last()),
        (Some(b'{'), Some(b'}')) | (Some(b'['), Some(b']'))
    )
}

fn unwrap_envelope(value: Value) -> ResponseBody {
    match value {
        Value::Object(mut map) if map.contains_key(ENVELOPE_KEY) => {
            ResponseBody::from_value(map.remove(ENVELOPE_KEY).unwrap_or(Value::Null))
        }
        other => ResponseBody::from_value(other),
    }
}
