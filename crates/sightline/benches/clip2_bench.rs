//! Criterion benchmarks for the integer region algebra.
//! Focus sizes: number of overlapping squares n in {4, 16, 64}.

use criterion::{criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion};
use nalgebra::Point2;
use rand::{rngs::StdRng, Rng, SeedableRng};
use sightline::api::Region2;

fn random_squares(n: usize, seed: u64) -> Vec<Region2> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| {
            let x: f64 = rng.gen_range(-0.8..0.6);
            let y: f64 = rng.gen_range(-0.8..0.6);
            let s: f64 = rng.gen_range(0.05..0.4);
            Region2::rect(Point2::new(x, y), Point2::new(x + s, y + s))
        })
        .collect()
}

fn bench_regions(c: &mut Criterion) {
    let mut group = c.benchmark_group("clip2");
    for &n in &[4usize, 16, 64] {
        group.bench_with_input(BenchmarkId::new("union_all", n), &n, |b, &n| {
            b.iter_batched(
                || random_squares(n, 41),
                |rs| {
                    let _u = Region2::union_all(&rs);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("target_minus_union", n), &n, |b, &n| {
            let target = Region2::rect(Point2::new(-0.5, -0.5), Point2::new(0.5, 0.5));
            b.iter_batched(
                || Region2::union_all(&random_squares(n, 42)),
                |blocked| {
                    let _v = target.difference(&blocked).area();
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_with_input(BenchmarkId::new("overlap_of_pairs", n), &n, |b, &n| {
            b.iter_batched(
                || random_squares(n, 43),
                |rs| {
                    let _o = Region2::overlap_of_pairs(&rs);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_regions);
criterion_main!(benches);
