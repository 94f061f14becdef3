use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skimibowi::prelude::*;
use std::path::PathBuf;

fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn load(name: &str) -> RawConfig {
    let json = std::fs::read_to_string(fixture_path(name)).expect("fixture should be readable");
    RawConfig::from_json(&json).expect("fixture should parse")
}

fn bench_generate_minimal(c: &mut Criterion) {
    let raw = load("minimal_esp12e.json");
    c.bench_function("generate_minimal", |b| {
        b.iter(|| SkimibowiCore::generate(black_box(&raw), GenerationOptions::default()));
    });
}

fn bench_generate_maximal(c: &mut Criterion) {
    let raw = load("maximal_esp12e.json");
    c.bench_function("generate_maximal", |b| {
        b.iter(|| SkimibowiCore::generate(black_box(&raw), GenerationOptions::default()));
    });
}

fn bench_compose_only(c: &mut Criterion) {
    let config = skimibowi::prepare(&load("maximal_atmega.json")).expect("fixture should validate");
    let composer = Composer::new();
    c.bench_function("compose_maximal_atmega", |b| {
        b.iter(|| composer.compose(black_box(&config)));
    });
}

criterion_group!(benches, bench_generate_minimal, bench_generate_maximal, bench_compose_only);
criterion_main!(benches);
