//! Header construction and merging

use crate::config::Configuration;
use crate::security::SecurityValidator;
use crate::Result;

/// Media type used for request and response bodies
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// API version requested on every call
pub const PADDLE_VERSION: &str = "1";

/// Name of the API versioning header
pub const VERSION_HEADER: &str = "Paddle-Version";

/// Headers a caller can never override
pub const PROTECTED_HEADERS: [&str; 5] = [
    "authorization",
    "host",
    "content-type",
    "accept",
    "paddle-version",
];

/// Client identifier sent as User-Agent
pub fn user_agent() -> String {
    format!("paddle-rs/{}", crate::VERSION)
}

/// True if `name` is in the protected set (case-insensitive)
pub fn is_protected(name: &str) -> bool {
    PROTECTED_HEADERS
        .iter()
        .any(|protected| protected.eq_ignore_ascii_case(name))
}

/// Headers every request carries
pub fn default_headers(config: &Configuration) -> Vec<(String, String)> {
    vec![
        ("Authorization".to_string(), format!("Bearer {}", config.api_key())),
        ("Content-Type".to_string(), JSON_CONTENT_TYPE.to_string()),
        ("Accept".to_string(), JSON_CONTENT_TYPE.to_string()),
        ("User-Agent".to_string(), user_agent()),
        (VERSION_HEADER.to_string(), PADDLE_VERSION.to_string()),
    ]
}

/// Merge caller headers into `base`.
///
/// Protected names are dropped. Any other name replaces an existing entry
/// with the same name in place (case-insensitive), or is appended. Later
/// caller entries win over earlier ones.
pub fn merge(
    mut base: Vec<(String, String)>,
    overrides: &[(String, String)],
    validator: &dyn SecurityValidator,
) -> Result<Vec<(String, String)>> {
    for (name, value) in overrides {
        if is_protected(name) {
            tracing::debug!(header = %name, "dropping protected header override");
            continue;
        }

        validator.validate_header(name, value)?;

        match base
            .iter_mut()
            .find(|(existing, _)| existing.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value.clone(),
            None => base.push((name.clone(), value.clone())),
        }
    }

    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::DenylistValidator;

    const KEY: &str = "pdl_sdbx_apikey_01hv8wptq8987qeep44cyrewp9_abc";

    fn config() -> Configuration {
        Configuration::new(KEY).unwrap()
    }

    fn header<'a>(headers: &'a [(String, String)], name: &str) -> Vec<&'a str> {
        headers
            .iter()
            .filter(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
            .collect()
    }

    fn owned(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_default_headers() {
        let headers = default_headers(&config());
        assert_eq!(header(&headers, "authorization"), vec![format!("Bearer {}", KEY).as_str()]);
        assert_eq!(header(&headers, "content-type"), vec!["application/json"]);
        assert_eq!(header(&headers, "accept"), vec!["application/json"]);
        assert_eq!(header(&headers, "paddle-version"), vec!["1"]);
        assert!(header(&headers, "user-agent")[0].starts_with("paddle-rs/"));
    }

    #[test]
    fn test_protected_headers_cannot_be_overridden() {
        let overrides = owned(&[
            ("AUTHORIZATION", "Bearer evil"),
            ("Host", "evil.example.com"),
            ("content-type", "text/plain"),
            ("Accept", "text/html"),
            ("paddle-version", "99"),
        ]);
        let merged = merge(default_headers(&config()), &overrides, &DenylistValidator).unwrap();

        assert_eq!(merged, default_headers(&config()));
        assert!(header(&merged, "host").is_empty());
    }

    #[test]
    fn test_caller_headers_last_write_wins() {
        let overrides = owned(&[
            ("X-Request-Id", "first"),
            ("user-agent", "my-app/2.0"),
            ("x-request-id", "second"),
        ]);
        let merged = merge(default_headers(&config()), &overrides, &DenylistValidator).unwrap();

        assert_eq!(header(&merged, "x-request-id"), vec!["second"]);
        assert_eq!(header(&merged, "user-agent"), vec!["my-app/2.0"]);
        // Order is preserved: replaced in place, new names appended
        assert_eq!(merged[3].0, "User-Agent");
        assert_eq!(merged.last().unwrap().0, "X-Request-Id");
    }

    #[test]
    fn test_header_injection_is_fatal() {
        let overrides = owned(&[("X-Trace", "a\r\nAuthorization: Bearer evil")]);
        let err = merge(default_headers(&config()), &overrides, &DenylistValidator).unwrap_err();
        assert!(matches!(err, crate::Error::UnsafeHeader { .. }));
    }
}
