//! Benchmarks for reading, writing and editing documents.

use std::fs;
use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use blazon::parser::{parse, serialize};
use blazon::{CoatOfArms, LayerId};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).unwrap()
}

/// A document with `count` layers spread over a few containers.
fn large_document(count: usize) -> CoatOfArms {
    let mut coa: CoatOfArms = load_fixture("dynasty.txt").parse().unwrap();
    let emblems = load_fixture("emblems.txt");
    while coa.layer_count() < count {
        coa.parse(&emblems, None).unwrap();
    }
    coa
}

// -- Reading benchmarks --

fn bench_reading(c: &mut Criterion) {
    let mut group = c.benchmark_group("reading");

    let source = load_fixture("dynasty.txt");
    let large = large_document(200).to_string();

    group.bench_function("parse_tree", |b| b.iter(|| parse(black_box(&source)).unwrap()));

    group.bench_function("parse_document", |b| {
        b.iter(|| black_box(&source).parse::<CoatOfArms>().unwrap())
    });

    group.bench_function("parse_document_large", |b| {
        b.iter(|| black_box(&large).parse::<CoatOfArms>().unwrap())
    });

    group.finish();
}

// -- Writing benchmarks --

fn bench_writing(c: &mut Criterion) {
    let mut group = c.benchmark_group("writing");

    let coa = large_document(200);
    let tree = coa.to_tree();

    group.bench_function("serialize_tree", |b| b.iter(|| serialize(black_box(&tree))));

    group.bench_function("write_document_large", |b| {
        b.iter(|| black_box(&coa).to_string())
    });

    group.finish();
}

// -- Editing benchmarks --

fn bench_editing(c: &mut Criterion) {
    let mut group = c.benchmark_group("editing");

    let coa = large_document(200);
    let ids: Vec<LayerId> = coa.layers().iter().map(|l| l.id().clone()).collect();

    group.bench_function("move_layer_large", |b| {
        b.iter_batched(
            || coa.clone(),
            |mut doc| doc.move_layer(&ids[0], ids.len()).unwrap(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("contiguity_pass_large", |b| {
        b.iter_batched(
            || coa.clone(),
            |mut doc| doc.validate_container_contiguity(),
            criterion::BatchSize::SmallInput,
        )
    });

    group.bench_function("snapshot_large", |b| b.iter(|| black_box(&coa).snapshot()));

    group.finish();
}

criterion_group!(benches, bench_reading, bench_writing, bench_editing);
criterion_main!(benches);
