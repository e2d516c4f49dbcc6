//! Benchmarks for pose payload normalization

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use pulse_core::Actor;
use pulse_motion::normalize_pose;
use pulse_test::{bobbing_pose, synthetic_library};

fn bench_normalize_pose(c: &mut Criterion) {
    let mut group = c.benchmark_group("normalize_pose");
    for frames in [1usize, 12, 120] {
        let pose = bobbing_pose(3, frames);
        group.bench_with_input(BenchmarkId::from_parameter(frames), &pose, |b, pose| {
            b.iter(|| black_box(normalize_pose(black_box(pose))))
        });
    }
    group.finish();
}

fn bench_normalize_twice(c: &mut Criterion) {
    let once = normalize_pose(&bobbing_pose(0, 12));

    c.bench_function("normalize_already_grounded", |b| {
        b.iter(|| black_box(normalize_pose(black_box(&once))))
    });
}

fn bench_library_cached_get(c: &mut Criterion) {
    let library = synthetic_library(7);
    let _ = library.warm();

    c.bench_function("library_cached_get", |b| {
        let mut i = 0usize;
        b.iter(|| {
            i = (i + 1) % 7;
            black_box(library.get(Actor::Left, i).ok())
        })
    });
}

criterion_group!(
    benches,
    bench_normalize_pose,
    bench_normalize_twice,
    bench_library_cached_get,
);

criterion_main!(benches);
