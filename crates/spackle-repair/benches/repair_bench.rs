//! Repair throughput benchmarks.
//!
//! Measures the full pipeline (clean → tokenize → build → emit) on a clean
//! document, a typically-broken document, and a pathological one, so lexer
//! or builder regressions show up as throughput drops.

use core::hint::black_box;

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use spackle_repair::{RepairOptions, fix};

fn clean_doc(records: usize) -> String {
    let mut out = String::from("[");
    for i in 0..records {
        if i > 0 {
            out.push(',');
        }
        out.push_str(&format!(
            "{{\"id\": {i}, \"name\": \"record {i}\", \"active\": true, \"score\": {i}.25}}"
        ));
    }
    out.push(']');
    out
}

fn broken_doc(records: usize) -> String {
    let mut out = String::from("[");
    for i in 0..records {
        if i > 0 {
            out.push(',');
        }
        // unquoted keys, single quotes, trailing commas, sloppy numbers
        out.push_str(&format!(
            "{{id: {i}, 'name': 'record {i}', active: TRUE, score: +{i}.25,}}"
        ));
    }
    out.push(']');
    out
}

fn repair_bench(c: &mut Criterion) {
    let mut group = c.benchmark_group("fix");
    let options = RepairOptions::default();

    let clean = clean_doc(200);
    group.throughput(Throughput::Bytes(clean.len() as u64));
    group.bench_function("clean_200_records", |b| {
        b.iter(|| fix(black_box(clean.as_bytes()), &options));
    });

    let broken = broken_doc(200);
    group.throughput(Throughput::Bytes(broken.len() as u64));
    group.bench_function("broken_200_records", |b| {
        b.iter(|| fix(black_box(broken.as_bytes()), &options));
    });

    let deep = format!("{}1{}", "[".repeat(1000), "]".repeat(1000));
    group.throughput(Throughput::Bytes(deep.len() as u64));
    group.bench_function("deep_1000_levels", |b| {
        b.iter(|| fix(black_box(deep.as_bytes()), &options));
    });

    group.finish();
}

criterion_group!(benches, repair_bench);
criterion_main!(benches);
