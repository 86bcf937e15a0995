//! Benchmarks for registry merges and bundle loads.

use std::fs;
use std::path::PathBuf;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use angora::{load_bundle, parse_bundles, Bundle, Colour, Environment, PaletteRegistry};

fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

fn load_fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).unwrap()
}

fn tokens(n: usize) -> Vec<(String, Colour)> {
    (0..n)
        .map(|i| (format!("token-{i}"), Colour::rgb((i % 256) as u8, 0x40, 0x80)))
        .collect()
}

// -- Registry benchmarks --

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("merge");

    for size in [16, 256, 4096] {
        let update = tokens(size);

        group.bench_with_input(BenchmarkId::new("fresh", size), &update, |b, update| {
            b.iter(|| {
                let env = Environment::new();
                let registry = PaletteRegistry::ensure_exists(&env).unwrap();
                registry.merge(black_box(update.clone()))
            })
        });

        // Same tokens again: nothing changes, generation stays put.
        let env = Environment::new();
        let registry = PaletteRegistry::ensure_exists(&env).unwrap();
        registry.merge(update.clone());
        group.bench_with_input(BenchmarkId::new("unchanged", size), &update, |b, update| {
            b.iter(|| registry.merge(black_box(update.clone())))
        });
    }

    group.finish();
}

// -- Loader benchmarks --

fn bench_load(c: &mut Criterion) {
    let mut group = c.benchmark_group("load");

    let source = load_fixture("base.bundle.yaml");
    let themes = load_fixture("themes.bundle.yaml");

    group.bench_function("parse_bundles", |b| {
        b.iter(|| parse_bundles(black_box(&themes)).unwrap())
    });

    let base = parse_bundles(&source).unwrap();
    let derived = parse_bundles(&themes).unwrap();

    group.bench_function("load_with_expressions", |b| {
        b.iter(|| {
            let env = Environment::new();
            for bundle in base.iter().chain(&derived) {
                load_bundle(&env, black_box(bundle)).unwrap();
            }
        })
    });

    let large = tokens(1024)
        .into_iter()
        .fold(Bundle::new("large"), |bundle, (name, colour)| {
            bundle.with_color(name, colour.to_string())
        });
    group.bench_function("load_large_bundle", |b| {
        b.iter(|| {
            let env = Environment::new();
            load_bundle(&env, black_box(&large)).unwrap()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_merge, bench_load);
criterion_main!(benches);
