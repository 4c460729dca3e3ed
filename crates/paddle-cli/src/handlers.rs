//! Command handlers for the Paddle CLI

use crate::cli::{CommonRequestArgs, ConfigAction, ConfigArgs, DeleteArgs, GetArgs, RequestArgs};
use crate::config::Settings;
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use paddle_core::config::ConfigKey;
use paddle_core::security::{self, rules::RULESET_VERSION};
use paddle_core::{Client, Method, QueryParams, RequestOptions, ResponseBody};
use serde_json::{json, Map, Value};
use std::path::Path;
use tracing::{info, instrument};

/// Handle `paddle request METHOD PATH`
pub async fn handle_request(args: RequestArgs, settings: &Settings, output: &mut OutputWriter) -> Result<()> {
    let method: Method = args.method.parse()?;
    let body = parse_body(args.data.as_deref())?;
    let client = client_for(settings)?;
    execute(&client, method, &args.path, body, &args.request, output).await
}

/// Handle `paddle get PATH`
pub async fn handle_get(args: GetArgs, settings: &Settings, output: &mut OutputWriter) -> Result<()> {
    let client = client_for(settings)?;
    execute(&client, Method::Get, &args.path, None, &args.request, output).await
}

/// Handle `paddle delete PATH`
pub async fn handle_delete(args: DeleteArgs, settings: &Settings, output: &mut OutputWriter) -> Result<()> {
    let client = client_for(settings)?;
    execute(&client, Method::Delete, &args.path, None, &args.request, output).await
}

/// Handle `paddle config ...`
pub fn handle_config(args: ConfigArgs, settings: &Settings, output: &mut OutputWriter) -> Result<()> {
    let resolver = settings.resolver();
    let config = resolver.resolve()?;

    match args.action {
        ConfigAction::Show => {
            let sources: Map<String, Value> = ConfigKey::ALL
                .iter()
                .filter_map(|key| {
                    resolver
                        .lookup(*key)
                        .map(|(_, source)| (key.env_var().to_string(), Value::String(source.to_string())))
                })
                .collect();

            output.write_value(&json!({
                "api_key": config.redacted_api_key(),
                "environment": config.environment(),
                "base_url": config.base_url(),
                "timeout_ms": config.timeout_ms(),
                "retry": config.retry(),
                "sources": sources,
            }))
        }
        ConfigAction::Validate => {
            security::validate(&config)?;
            output.success(&format!(
                "Configuration is valid ({} environment, ruleset {})",
                config.environment(),
                RULESET_VERSION
            ))
        }
    }
}

fn client_for(settings: &Settings) -> Result<Client> {
    Ok(Client::builder().resolver(settings.resolver()).build()?)
}

#[instrument(skip(client, method, body, common, output), fields(method = %method))]
async fn execute(
    client: &Client,
    method: Method,
    path: &str,
    body: Option<Value>,
    common: &CommonRequestArgs,
    output: &mut OutputWriter,
) -> Result<()> {
    let options = RequestOptions {
        query: parse_query(&common.query)?,
        headers: parse_headers(&common.headers)?,
        ..Default::default()
    };

    match client.request(method, path, body, options).await? {
        Ok(body) => write_body(body, common.save_to.as_deref(), output),
        Err(error) => {
            info!(kind = %error.kind, "request returned an API error");
            output.write_api_error(&error)?;
            Err(Error::Api(error))
        }
    }
}

fn write_body(body: ResponseBody, save_to: Option<&Path>, output: &mut OutputWriter) -> Result<()> {
    match (body, save_to) {
        (ResponseBody::Bytes(bytes), Some(path)) => output.save_bytes(path, &bytes),
        (ResponseBody::Bytes(bytes), None) => output.write_bytes(&bytes),
        (ResponseBody::Nil, None) => output.info("No content"),
        (body, save_to) => {
            let value = body.into_value().unwrap_or(Value::Null);
            match save_to {
                Some(path) => output.save_value(path, &value),
                None => output.write_value(&value),
            }
        }
    }
}

/// Parse `-Q key=value` pairs.
///
/// A value containing commas becomes a list and `key[child]=value` becomes
/// a nested map, matching how the API expects filters.
pub fn parse_query(pairs: &[String]) -> Result<Option<QueryParams>> {
    if pairs.is_empty() {
        return Ok(None);
    }

    let mut params = QueryParams::new();

    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .filter(|(key, _)| !key.is_empty())
            .ok_or_else(|| Error::invalid_args(format!("query parameter '{}' must be KEY=VALUE", pair)))?;

        let value = query_value(raw);

        match nested_key(key) {
            Some((parent, child)) => {
                let entry = params
                    .entry(parent.to_string())
                    .or_insert_with(|| Value::Object(Map::new()));
                match entry {
                    Value::Object(children) => {
                        children.insert(child.to_string(), value);
                    }
                    _ => {
                        return Err(Error::invalid_args(format!(
                            "query parameter '{}' is used both as a value and as a map",
                            parent
                        )))
                    }
                }
            }
            None => {
                params.insert(key.to_string(), value);
            }
        }
    }

    Ok(Some(params))
}

/// Parse `-H 'Name: value'` headers
pub fn parse_headers(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|header| {
            header
                .split_once(':')
                .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
                .filter(|(name, _)| !name.is_empty())
                .ok_or_else(|| Error::invalid_args(format!("header '{}' must be 'Name: value'", header)))
        })
        .collect()
}

/// Parse a `-d` body: inline JSON, or `@path` to a JSON or YAML file
pub fn parse_body(data: Option<&str>) -> Result<Option<Value>> {
    let Some(data) = data else {
        return Ok(None);
    };

    match data.strip_prefix('@') {
        Some(path) => {
            let path = Path::new(path);
            if !path.exists() {
                return Err(Error::FileNotFound {
                    path: path.to_path_buf(),
                });
            }
            let content = std::fs::read_to_string(path)?;
            let value = match path.extension().and_then(|s| s.to_str()) {
                Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
                _ => serde_json::from_str(&content)?,
            };
            Ok(Some(value))
        }
        None => Ok(Some(serde_json::from_str(data)?)),
    }
}

fn query_value(raw: &str) -> Value {
    if raw.contains(',') {
        Value::Array(raw.split(',').map(|item| Value::String(item.to_string())).collect())
    } else {
        Value::String(raw.to_string())
    }
}

fn nested_key(key: &str) -> Option<(&str, &str)> {
    let (parent, rest) = key.split_once('[')?;
    let child = rest.strip_suffix(']')?;

    if parent.is_empty() || child.is_empty() || child.contains(['[', ']']) {
        None
    } else {
        Some((parent, child))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::output::tests::{writer, SharedBuffer};
    use async_trait::async_trait;
    use paddle_core::http::RequestDescriptor;
    use paddle_core::{Configuration, ErrorKind, Transport, TransportBody, TransportError, TransportResponse};
    use std::sync::{Arc, Mutex};

    const KEY: &str = "pdl_sdbx_apikey_01hv8wptq8987qeep44cyrewp9_abc";

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_query() {
        let params = parse_query(&strings(&[
            "status=active,archived",
            "per_page=10",
            "billed_at[from]=2024-01-01",
            "billed_at[to]=2024-02-01",
        ]))
        .unwrap()
        .unwrap();

        assert_eq!(params["status"], json!(["active", "archived"]));
        assert_eq!(params["per_page"], json!("10"));
        assert_eq!(params["billed_at"], json!({"from": "2024-01-01", "to": "2024-02-01"}));
    }

    #[test]
    fn test_parse_query_edge_cases() {
        assert_eq!(parse_query(&[]).unwrap(), None);
        assert!(parse_query(&strings(&["novalue"])).is_err());
        assert!(parse_query(&strings(&["=x"])).is_err());
        assert!(parse_query(&strings(&["a=1", "a[b]=2"])).is_err());

        // Malformed brackets stay a plain key
        let params = parse_query(&strings(&["a[=1"])).unwrap().unwrap();
        assert_eq!(params["a["], json!("1"));

        // Value may itself contain '='
        let params = parse_query(&strings(&["after=abc=="])).unwrap().unwrap();
        assert_eq!(params["after"], json!("abc=="));
    }

    #[test]
    fn test_parse_headers() {
        let headers = parse_headers(&strings(&["X-Request-Id: abc", "X-Empty:"])).unwrap();
        assert_eq!(
            headers,
            vec![
                ("X-Request-Id".to_string(), "abc".to_string()),
                ("X-Empty".to_string(), String::new()),
            ]
        );
        assert!(parse_headers(&strings(&["no colon"])).is_err());
        assert!(parse_headers(&strings(&[": value"])).is_err());
    }

    #[test]
    fn test_parse_body() {
        assert_eq!(parse_body(None).unwrap(), None);
        assert_eq!(parse_body(Some(r#"{"a": 1}"#)).unwrap(), Some(json!({"a": 1})));
        assert!(parse_body(Some("{not json")).is_err());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("body.yaml");
        std::fs::write(&path, "name: Pro\n").unwrap();
        let body = parse_body(Some(&format!("@{}", path.display()))).unwrap();
        assert_eq!(body, Some(json!({"name": "Pro"})));

        assert!(matches!(
            parse_body(Some("@/nonexistent/body.json")),
            Err(Error::FileNotFound { .. })
        ));
    }

    struct StubTransport {
        response: TransportResponse,
        seen: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Transport for StubTransport {
        async fn send(&self, request: &RequestDescriptor) -> std::result::Result<TransportResponse, TransportError> {
            self.seen.lock().unwrap().push(request.url.to_string());
            Ok(self.response.clone())
        }
    }

    fn stub_client(status: u16, content_type: &str, body: &[u8]) -> (Client, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let transport = StubTransport {
            response: TransportResponse {
                status,
                headers: vec![("content-type".to_string(), content_type.to_string())],
                body: TransportBody::Bytes(body.to_vec()),
            },
            seen: seen.clone(),
        };
        let client = Client::builder()
            .transport(transport)
            .config(Configuration::new(KEY).unwrap())
            .build()
            .unwrap();
        (client, seen)
    }

    #[tokio::test]
    async fn test_execute_prints_unwrapped_body() {
        let (client, seen) = stub_client(200, "application/json", br#"{"data": {"id": "pro_1"}}"#);
        let (mut output, out, _): (OutputWriter, SharedBuffer, SharedBuffer) = writer(OutputFormat::Json, false);
        let common = CommonRequestArgs {
            query: strings(&["status=active,archived"]),
            ..Default::default()
        };

        execute(&client, Method::Get, "/products", None, &common, &mut output)
            .await
            .unwrap();

        assert_eq!(out.contents().trim(), r#"{"id":"pro_1"}"#);
        assert_eq!(
            seen.lock().unwrap()[0],
            "https://sandbox-api.paddle.com/products?status=active,archived"
        );
    }

    #[tokio::test]
    async fn test_execute_reports_api_error() {
        let (client, _) = stub_client(
            404,
            "application/json",
            br#"{"error": {"code": "entity_not_found", "detail": "not found"}}"#,
        );
        let (mut output, out, _) = writer(OutputFormat::Json, false);

        let err = execute(&client, Method::Get, "/products/pro_x", None, &CommonRequestArgs::default(), &mut output)
            .await
            .unwrap_err();

        assert!(matches!(&err, Error::Api(api) if api.kind == ErrorKind::NotFoundError));
        let written: Value = serde_json::from_str(&out.contents()).unwrap();
        assert_eq!(written["kind"], "not_found_error");
    }

    #[tokio::test]
    async fn test_execute_saves_binary_body() {
        let (client, _) = stub_client(200, "application/pdf", b"%PDF-1.7");
        let (mut output, out, _) = writer(OutputFormat::Json, false);
        let dir = tempfile::tempdir().unwrap();
        let common = CommonRequestArgs {
            save_to: Some(dir.path().join("invoice.pdf")),
            ..Default::default()
        };

        execute(&client, Method::Get, "/transactions/txn_1/invoice", None, &common, &mut output)
            .await
            .unwrap();

        assert_eq!(std::fs::read(dir.path().join("invoice.pdf")).unwrap(), b"%PDF-1.7");
        assert!(out.contents().is_empty());
    }

    #[tokio::test]
    async fn test_unsafe_path_is_fatal() {
        let (client, seen) = stub_client(200, "application/json", b"{}");
        let (mut output, _, _) = writer(OutputFormat::Json, false);

        let err = execute(&client, Method::Get, "/../admin", None, &CommonRequestArgs::default(), &mut output)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Core(paddle_core::Error::UnsafePath { .. })));
        assert!(seen.lock().unwrap().is_empty());
    }
}
