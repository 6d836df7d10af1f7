//! Triangulation and grid interpolation throughput.
//!
//! Measures:
//!
//! 1. Triangulation of uniformly random clouds at several sizes
//! 2. Filling a 256 × 256 grid in round and linear mode from a fixed cloud
//!
//! Clouds are generated from fixed seeds so runs are comparable.

#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use planar_delaunay::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::hint::black_box;

/// Cloud sizes for the construction benchmark
const COUNTS: &[usize] = &[100, 1_000, 10_000];

/// Grid side for the interpolation benchmark
const GRID_SIDE: usize = 256;

fn random_cloud(count: usize, seed: u64) -> Vec<PointXYZ> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|_| {
            let (x, y) = (rng.random_range(0.0..100.0), rng.random_range(0.0..100.0));
            PointXYZ::new(x, y, (x / 10.0).sin() * (y / 7.0).cos())
        })
        .collect()
}

fn bench_triangulation_creation(c: &mut Criterion) {
    let mut group = c.benchmark_group("triangulation_creation");
    for &count in COUNTS {
        let points = random_cloud(count, 0x5EED_u64.wrapping_add(count as u64));
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
            b.iter(|| {
                let triangulation = Triangulation::new(black_box(points))
                    .unwrap_or_else(|err| panic!("triangulation of {count} points failed: {err}"));
                black_box(triangulation.number_of_triangles())
            });
        });
    }
    group.finish();
}

fn bench_grid_interpolation(c: &mut Criterion) {
    let points = random_cloud(2_000, 0xC0FFEE);
    let triangulation =
        Triangulation::new(&points).unwrap_or_else(|err| panic!("triangulation failed: {err}"));
    let grid = GridSpecBuilder::default()
        .xres(GRID_SIDE)
        .yres(GRID_SIDE)
        .xreal(100.0)
        .yreal(100.0)
        .build()
        .unwrap_or_else(|err| panic!("invalid grid: {err}"));

    let mut group = c.benchmark_group("grid_interpolation");
    group.throughput(Throughput::Elements((GRID_SIDE * GRID_SIDE) as u64));
    for mode in [InterpolationType::Round, InterpolationType::Linear] {
        group.bench_function(BenchmarkId::from_parameter(format!("{mode:?}")), |b| {
            b.iter(|| {
                let data = triangulation
                    .interpolate(black_box(mode), black_box(&grid))
                    .unwrap_or_else(|err| panic!("{mode:?} interpolation failed: {err}"));
                black_box(data.len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_triangulation_creation, bench_grid_interpolation);
criterion_main!(benches);
