//! Benchmarks for query encoding and request building

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use paddle_core::http::{query, Method, RequestBuilder, RequestParts};
use paddle_core::{Configuration, DenylistValidator, QueryParams};
use serde_json::{json, Value};

fn params(value: Value) -> QueryParams {
    match value {
        Value::Object(map) => map,
        _ => QueryParams::new(),
    }
}

fn bench_query_encoding(c: &mut Criterion) {
    let mut group = c.benchmark_group("query_encoding");

    let cases = [
        ("scalar", params(json!({"per_page": 50, "after": "pri_01h"}))),
        (
            "list",
            params(json!({"status": ["active", "past_due", "paused", "canceled"]})),
        ),
        (
            "nested",
            params(json!({
                "billed_at": {"from": "2024-01-01T00:00:00Z", "to": "2024-02-01T00:00:00Z"},
                "customer_id": ["ctm_01", "ctm_02"],
                "order_by": "created_at[DESC]"
            })),
        ),
    ];

    for (name, params) in &cases {
        group.bench_with_input(BenchmarkId::from_parameter(name), params, |b, params| {
            b.iter(|| query::encode(black_box(params)))
        });
    }

    group.finish();
}

fn bench_request_build(c: &mut Criterion) {
    let config = Configuration::new("pdl_sdbx_apikey_01hv8wptq8987qeep44cyrewp9_bSoKu3ntHK2tvBT9X4T0rD")
        .expect("valid configuration");
    let builder = RequestBuilder::new(&config, &DenylistValidator);
    let parts = RequestParts {
        query: Some(params(json!({"status": ["active", "archived"], "per_page": 10}))),
        ..Default::default()
    };
    let body = json!({"name": "Pro", "tax_category": "standard"});

    c.bench_function("request_build", |b| {
        b.iter(|| builder.build(Method::Post, black_box("/products"), Some(&body), &parts))
    });
}

criterion_group!(benches, bench_query_encoding, bench_request_build);
criterion_main!(benches);
