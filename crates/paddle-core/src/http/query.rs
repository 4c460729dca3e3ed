//! Query-string normalization and encoding
//!
//! Paddle filters use two conventions that generic encoders get wrong:
//! list values are sent comma-separated (`status=active,paused`) and one
//! level of nesting uses bracket keys (`billed_at[from]=...`). Commas that
//! separate list items must stay literal, while every item is still
//! percent-encoded on its own.

use serde_json::{Map, Value};

/// Query parameter mapping accepted by the request builder
pub type QueryParams = Map<String, Value>;

/// A normalized value, remembering whether it came from a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    List(Vec<String>),
}

impl QueryValue {
    fn encode(&self) -> String {
        match self {
            QueryValue::Single(value) => urlencoding::encode(value).into_owned(),
            QueryValue::List(items) => items
                .iter()
                .map(|item| urlencoding::encode(item).into_owned())
                .collect::<Vec<_>>()
                .join(","),
        }
    }

    /// Value as it appears once decoded (list items comma-joined)
    pub fn as_joined(&self) -> String {
        match self {
            QueryValue::Single(value) => value.clone(),
            QueryValue::List(items) => items.join(","),
        }
    }
}

/// A normalized key: plain or `parent[child]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryKey {
    Plain(String),
    Nested { parent: String, child: String },
}

impl QueryKey {
    fn encode(&self) -> String {
        match self {
            QueryKey::Plain(key) => urlencoding::encode(key).into_owned(),
            QueryKey::Nested { parent, child } => format!(
                "{}[{}]",
                urlencoding::encode(parent),
                urlencoding::encode(child)
            ),
        }
    }
}

impl std::fmt::Display for QueryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryKey::Plain(key) => f.write_str(key),
            QueryKey::Nested { parent, child } => write!(f, "{}[{}]", parent, child),
        }
    }
}

/// Flatten a parameter mapping into key/value pairs.
///
/// Only one level of nesting is expanded. A map nested deeper than that
/// is rendered as compact JSON text rather than recursed into.
pub fn normalize(params: &QueryParams) -> Vec<(QueryKey, QueryValue)> {
    let mut pairs = Vec::with_capacity(params.len());

    for (key, value) in params {
        match value {
            Value::Object(children) if !children.is_empty() => {
                for (child, child_value) in children {
                    pairs.push((
                        QueryKey::Nested {
                            parent: key.clone(),
                            child: child.clone(),
                        },
                        leaf_value(child_value),
                    ));
                }
            }
            other => pairs.push((QueryKey::Plain(key.clone()), leaf_value(other))),
        }
    }

    pairs
}

/// Encode parameters into a query string (without the leading `?`).
///
/// Returns `None` for an empty parameter set.
pub fn encode(params: &QueryParams) -> Option<String> {
    if params.is_empty() {
        return None;
    }

    let encoded = normalize(params)
        .iter()
        .map(|(key, value)| format!("{}={}", key.encode(), value.encode()))
        .collect::<Vec<_>>()
        .join("&");

    Some(encoded)
}

fn leaf_value(value: &Value) -> QueryValue {
    match value {
        Value::Array(items) => QueryValue::List(items.iter().map(stringify).collect()),
        other => QueryValue::Single(stringify(other)),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // Deeper structures are not expanded
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(value: Value) -> QueryParams {
        match value {
            Value::Object(map) => map,
            _ => panic!("params must be an object"),
        }
    }

    fn parts(query: &str) -> Vec<String> {
        let mut parts: Vec<String> = query.split('&').map(str::to_string).collect();
        parts.sort();
        parts
    }

    #[test]
    fn test_list_values_keep_literal_commas() {
        assert_eq!(encode(&params(json!({"a": [1, 2, 3]}))).unwrap(), "a=1,2,3");
    }

    #[test]
    fn test_list_segments_are_escaped_individually() {
        let query = encode(&params(json!({"status": ["active", "past due", "a,b"]}))).unwrap();
        assert_eq!(query, "status=active,past%20due,a%2Cb");
    }

    #[test]
    fn test_bracket_notation() {
        let query = encode(&params(json!({
            "billed_at": {"from": "2024-01-01", "to": "2024-02-01"}
        })))
        .unwrap();
        assert_eq!(
            parts(&query),
            vec!["billed_at[from]=2024-01-01", "billed_at[to]=2024-02-01"]
        );
    }

    #[test]
    fn test_nested_lists_are_comma_joined() {
        let query = encode(&params(json!({"filter": {"ids": ["pro_1", "pro_2"]}}))).unwrap();
        assert_eq!(query, "filter[ids]=pro_1,pro_2");
    }

    #[test]
    fn test_deeper_nesting_is_stringified() {
        let pairs = normalize(&params(json!({"a": {"b": {"c": 1}}})));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].0.to_string(), "a[b]");
        assert_eq!(pairs[0].1, QueryValue::Single(r#"{"c":1}"#.to_string()));

        let query = encode(&params(json!({"a": {"b": {"c": 1}}}))).unwrap();
        assert_eq!(query, "a[b]=%7B%22c%22%3A1%7D");
    }

    #[test]
    fn test_empty_nested_map_is_stringified() {
        assert_eq!(encode(&params(json!({"a": {}}))).unwrap(), "a=%7B%7D");
    }

    #[test]
    fn test_scalars() {
        let query = encode(&params(json!({
            "per_page": 50,
            "include_deleted": false,
            "name": "Pro plan",
            "after": null
        })))
        .unwrap();
        assert_eq!(
            parts(&query),
            vec!["after=", "include_deleted=false", "name=Pro%20plan", "per_page=50"]
        );
    }

    #[test]
    fn test_reserved_characters_in_keys_and_values() {
        let query = encode(&params(json!({"q&x": "a=b&c"}))).unwrap();
        assert_eq!(query, "q%26x=a%3Db%26c");
    }

    #[test]
    fn test_empty_params_omit_query() {
        assert_eq!(encode(&QueryParams::new()), None);
    }

    #[test]
    fn test_joined_value() {
        assert_eq!(QueryValue::List(vec!["a".into(), "b".into()]).as_joined(), "a,b");
    }
}
