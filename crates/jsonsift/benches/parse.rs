//! Benchmark – `jsonsift::parse` against `serde_json`, and query evaluation.
#![allow(missing_docs)]

use std::{fmt::Write, time::Duration};

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

/// A deterministic catalogue of `items` objects.
fn make_catalogue(items: usize) -> String {
    let mut s = String::from(r#"{"items":["#);
    for i in 0..items {
        if i > 0 {
            s.push(',');
        }
        let _ = write!(
            s,
            r#"{{"id":{i},"name":"item \"{i}\"","price":{}.{:02},"tags":["a","b"],"stock":{}}}"#,
            i % 97,
            i % 100,
            if i % 3 == 0 { "null" } else { "true" },
        );
    }
    s.push_str("]}");
    s
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for &items in &[10usize, 1_000, 10_000] {
        let payload = make_catalogue(items);
        group.bench_with_input(BenchmarkId::new("jsonsift", items), &payload, |b, p| {
            b.iter(|| jsonsift::parse(black_box(p.as_bytes())).unwrap().root().size());
        });
        group.bench_with_input(BenchmarkId::new("jsonsift_decode", items), &payload, |b, p| {
            b.iter(|| {
                let doc = jsonsift::parse(black_box(p.as_bytes())).unwrap();
                doc.root().value().map(|v| v.is_object()).unwrap()
            });
        });
        group.bench_with_input(BenchmarkId::new("serde_json", items), &payload, |b, p| {
            b.iter(|| serde_json::from_slice::<serde_json::Value>(black_box(p.as_bytes())).unwrap());
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let payload = make_catalogue(1_000);
    let doc = jsonsift::parse(payload.as_bytes()).unwrap();
    let mut group = c.benchmark_group("query");
    for expr in [
        "$.items[500].name",
        "$..price",
        "$.items[?(@.price > 50 && @.stock)].id",
        "avg($.items[*].price)",
    ] {
        let query = jsonsift::compile(expr).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(expr), &query, |b, q| {
            b.iter(|| q.evaluate(black_box(doc.root())).unwrap().len());
        });
    }
    group.finish();
}

fn criterion() -> Criterion {
    let c = Criterion::default();
    if cfg!(feature = "bench-fast") {
        c.warm_up_time(Duration::from_millis(10))
            .measurement_time(Duration::from_millis(100))
            .sample_size(10)
    } else {
        c.warm_up_time(Duration::from_secs(3))
            .measurement_time(Duration::from_secs(5))
    }
}

criterion_group! { name = benches; config = criterion(); targets = bench_parse, bench_query }
criterion_main!(benches);
