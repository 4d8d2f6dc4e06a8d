use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pathgate_core::{canonicalize, matches, CanonicalPath, PathHash, PathMode};

fn bench_canonicalize(c: &mut Criterion) {
    let long = format!("/{}/file.bin", vec!["segment_01"; 32].join("/"));

    c.bench_function("canonicalize short file path", |b| {
        b.iter(|| canonicalize(black_box("/agent1/files/manifest.json"), PathMode::FilePath))
    });
    c.bench_function("canonicalize long file path", |b| {
        b.iter(|| canonicalize(black_box(&long), PathMode::FilePath))
    });
    c.bench_function("reject double slash", |b| {
        b.iter(|| canonicalize(black_box("/agent1//files/manifest.json"), PathMode::FilePath))
    });
}

fn bench_matches(c: &mut Criterion) {
    c.bench_function("match subtree", |b| {
        b.iter(|| matches(black_box("/shared/data/sub/file1"), black_box("/shared/data")))
    });
    c.bench_function("reject sibling prefix", |b| {
        b.iter(|| matches(black_box("/agent10/x"), black_box("/agent1")))
    });
}

fn bench_path_hash(c: &mut Criterion) {
    let path = CanonicalPath::parse("/agent1/files/manifest.json").unwrap();
    c.bench_function("keccak path hash", |b| b.iter(|| PathHash::of(black_box(&path))));
}

criterion_group!(benches, bench_canonicalize, bench_matches, bench_path_hash);
criterion_main!(benches);
