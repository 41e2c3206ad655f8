//! Criterion benchmarks for rust_structured_logger

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use rust_structured_logger::condition::{count_based, rate_limit, sample_every_n};
use rust_structured_logger::prelude::*;
use std::sync::Arc;

/// Accepts and drops everything so only logger overhead is measured.
struct NullWriter;

impl LogWriter for NullWriter {
    fn write(&self, buf: &[u8]) -> rust_structured_logger::Result<usize> {
        Ok(buf.len())
    }

    fn close(&self) -> rust_structured_logger::Result<()> {
        Ok(())
    }
}

fn null_logger(level: LogLevel) -> Logger {
    Logger::new(level, Some(Arc::new(NullWriter)), Vec::new())
}

// ============================================================================
// Logger Creation Benchmarks
// ============================================================================

fn bench_logger_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("logger_creation");
    group.throughput(Throughput::Elements(1));

    group.bench_function("new", |b| {
        b.iter(|| black_box(null_logger(LogLevel::Info)));
    });

    let parent = null_logger(LogLevel::Info).with_field("service", "api");
    group.bench_function("with_field", |b| {
        b.iter(|| black_box(parent.with_field("request_id", black_box("abc-123"))));
    });

    group.finish();
}

// ============================================================================
// Emission Benchmarks
// ============================================================================

fn bench_emission(c: &mut Criterion) {
    let mut group = c.benchmark_group("emission");
    group.throughput(Throughput::Elements(1));

    let logger = null_logger(LogLevel::Info);
    group.bench_function("disabled_debug", |b| {
        b.iter(|| logger.debug(black_box("Debug message")));
    });

    group.bench_function("disabled_debug_fmt", |b| {
        b.iter(|| logger.debug_fmt(format_args!("value {}", black_box(42))));
    });

    group.bench_function("info_plain", |b| {
        b.iter(|| logger.info(black_box("Info message")));
    });

    let decorated = logger
        .with_temporary_prefix(vec![with_tag("api"), with_timestamp()])
        .with_field("user", "john")
        .with_field("latency_ms", 42);
    group.bench_function("info_prefixes_and_fields", |b| {
        b.iter(|| decorated.info(black_box("Info message")));
    });

    group.finish();
}

// ============================================================================
// Formatter Benchmarks
// ============================================================================

fn bench_formatters(c: &mut Criterion) {
    let mut group = c.benchmark_group("formatters");

    let fields = Fields::new()
        .with("user", "john doe")
        .with("request_id", "abc-123")
        .with("latency_ms", 42)
        .with("ok", true);

    group.bench_function("key_value", |b| {
        let formatter = KeyValueFormatter::new();
        b.iter(|| black_box(formatter.format(&fields)));
    });

    group.bench_function("logfmt", |b| {
        b.iter(|| black_box(LogfmtFormatter.format(&fields)));
    });

    group.bench_function("json", |b| {
        b.iter(|| black_box(JsonFormatter.format(&fields)));
    });

    group.finish();
}

// ============================================================================
// Dispatch Benchmarks
// ============================================================================

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");

    for concurrency in [false, true] {
        let mut builder = Logger::builder().concurrency(concurrency);
        for _ in 0..4 {
            builder = builder.writer(NullWriter);
        }
        let logger = builder.build();

        let name = if concurrency { "four_writers_concurrent" } else { "four_writers_serial" };
        group.bench_function(name, |b| {
            b.iter(|| logger.info(black_box("fan-out")));
        });
    }

    group.finish();
}

// ============================================================================
// Condition Benchmarks
// ============================================================================

fn bench_conditions(c: &mut Criterion) {
    let mut group = c.benchmark_group("conditions");

    let limited = rate_limit(1_000_000);
    group.bench_function("rate_limit", |b| b.iter(|| black_box(limited.check())));

    let counted = count_based(i64::MAX);
    group.bench_function("count_based", |b| b.iter(|| black_box(counted.check())));

    let sampled = null_logger(LogLevel::Info).when(sample_every_n(100));
    group.bench_function("sampled_logger", |b| {
        b.iter(|| sampled.info(black_box("sampled")));
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_logger_creation,
    bench_emission,
    bench_formatters,
    bench_dispatch,
    bench_conditions
);
criterion_main!(benches);
