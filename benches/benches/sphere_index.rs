// Copyright 2026 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compares octree ray queries against a linear scan over the same spheres.

use canopy_index::{Ray, Sphere, SphereIndex};
use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use glam::Vec3;

/// Deterministic scene: spheres scattered in a 200-unit cube in front of
/// the origin, via a small LCG so runs are comparable.
fn scatter(count: u32) -> Vec<(u32, Sphere)> {
    let mut state = 0x2545_f491_4f6c_dd1d_u64;
    let mut unit = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((state >> 33) as f32) / ((u32::MAX >> 1) as f32)
    };
    (0..count)
        .map(|key| {
            let center = Vec3::new(
                unit() * 200.0 - 100.0,
                unit() * 200.0 - 100.0,
                -(unit() * 200.0) - 5.0,
            );
            (key, Sphere::new(center, 0.5 + unit() * 2.0))
        })
        .collect()
}

fn build_index(spheres: &[(u32, Sphere)]) -> SphereIndex<u32> {
    let mut index = SphereIndex::new();
    for (key, _) in spheres {
        index.mark_put(*key);
    }
    index.commit(|key| spheres.get(key as usize).map(|(_, s)| *s));
    index
}

fn bench_query_ray(c: &mut Criterion) {
    let ray = Ray::new(Vec3::ZERO, Vec3::new(0.1, -0.05, -1.0));
    let mut group = c.benchmark_group("query_ray");

    for count in [100_u32, 1_000, 10_000] {
        let spheres = scatter(count);
        let index = build_index(&spheres);

        group.bench_with_input(BenchmarkId::new("octree", count), &index, |b, index| {
            b.iter(|| {
                let mut visited = 0_u32;
                index.query_ray(black_box(&ray), |_, _| visited += 1);
                black_box(visited)
            });
        });

        group.bench_with_input(BenchmarkId::new("linear", count), &spheres, |b, spheres| {
            b.iter(|| {
                let mut visited = 0_u32;
                for (_, sphere) in spheres {
                    if sphere.intersects_ray(black_box(&ray)) {
                        visited += 1;
                    }
                }
                black_box(visited)
            });
        });
    }
    group.finish();
}

fn bench_commit(c: &mut Criterion) {
    let spheres = scatter(10_000);
    c.bench_function("commit_10k", |b| {
        b.iter(|| {
            let index = build_index(black_box(&spheres));
            black_box(index.len())
        });
    });
}

criterion_group!(benches, bench_query_ray, bench_commit);
criterion_main!(benches);
