//! Throughput benchmarks for chunked feeding.
//!
//! Measures:
//! - the lexer alone (events counted, no tree)
//! - the full parser at several chunk sizes
//! - serde_json's stream deserializer on the same input, as a baseline
//!
//! Run with: cargo bench --bench feed

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use jsonsp_core::{Event, EventSource, Lexer, Parser, ParserOptions};

/// Newline-delimited JSON-RPC style records.
fn generate_records(count: usize) -> String {
    let mut out = String::new();
    for i in 0..count {
        out.push_str(&format!(
            r#"{{"jsonrpc": "2.0", "id": {}, "method": "notify/item", "params": {{"name": "item-{}", "tags": ["a", "b\n", "é"], "score": {}.5, "ok": true, "parent": null}}}}"#,
            i, i, i
        ));
        out.push('\n');
    }
    out
}

/// One deeply nested array, stressing the context stack.
fn generate_nested(depth: usize) -> String {
    let mut out = String::new();
    for i in 0..depth {
        out.push_str(&format!(r#"{{"level": {}, "child": ["#, i));
    }
    for _ in 0..depth {
        out.push_str("]}");
    }
    out
}

fn feed_parser(input: &[u8], chunk_size: usize) -> u64 {
    let mut parser = Parser::new(ParserOptions::default().max_depth(None));
    parser.on_value(|v| {
        black_box(v);
    });
    for chunk in input.chunks(chunk_size) {
        parser.feed(chunk);
    }
    parser.finish();
    parser.values_emitted()
}

fn bench_lexer(c: &mut Criterion) {
    let input = generate_records(1000);
    let mut group = c.benchmark_group("lexer");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("records", |b| {
        b.iter(|| {
            let mut lexer = Lexer::default();
            let mut count = 0usize;
            lexer.feed_raw(black_box(input.as_bytes()), &mut |event: Event<'_>| {
                black_box(&event);
                count += 1;
            });
            lexer.finish(&mut |_: Event<'_>| count += 1);
            count
        })
    });

    group.finish();
}

fn bench_chunk_sizes(c: &mut Criterion) {
    let input = generate_records(1000);
    let mut group = c.benchmark_group("feed");
    group.throughput(Throughput::Bytes(input.len() as u64));

    for chunk_size in [1usize, 16, 256, 4096, input.len()] {
        group.bench_with_input(BenchmarkId::new("records", chunk_size), &chunk_size, |b, &size| {
            b.iter(|| feed_parser(black_box(input.as_bytes()), size))
        });
    }

    let nested = generate_nested(2000);
    group.throughput(Throughput::Bytes(nested.len() as u64));
    group.bench_function("nested_2000", |b| {
        b.iter(|| feed_parser(black_box(nested.as_bytes()), 4096))
    });

    group.finish();
}

fn bench_serde_json_baseline(c: &mut Criterion) {
    let input = generate_records(1000);
    let mut group = c.benchmark_group("baseline");
    group.throughput(Throughput::Bytes(input.len() as u64));

    group.bench_function("serde_json_stream", |b| {
        b.iter(|| {
            serde_json::Deserializer::from_slice(black_box(input.as_bytes()))
                .into_iter::<serde_json::Value>()
                .filter_map(Result::ok)
                .count()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_lexer, bench_chunk_sizes, bench_serde_json_baseline);
criterion_main!(benches);
