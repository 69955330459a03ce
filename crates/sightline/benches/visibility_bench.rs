//! Criterion benchmarks for full viewer → target evaluations.
//! Random scenes with w walls, w in {8, 32, 128}; one bench per algorithm.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use sightline::api::{
    calculate, draw_scene, viewpoints_for, Algorithm, CalculatorConfig, Query, RandomSceneCfg,
    ReplayToken, Scene,
};

const VIEWER: u64 = 1;
const TARGET: u64 = 2;

fn scene(walls: usize) -> Scene {
    let cfg = RandomSceneCfg {
        walls,
        ..RandomSceneCfg::default()
    };
    draw_scene(cfg, ReplayToken::new(2024, walls as u64))
}

fn bench_visibility(c: &mut Criterion) {
    let mut group = c.benchmark_group("visibility");
    for &w in &[8usize, 32, 128] {
        let s = scene(w);
        let (Some(viewer), Some(target)) = (s.token(VIEWER), s.token(TARGET)) else {
            continue;
        };
        for algorithm in [Algorithm::Geometric, Algorithm::Points, Algorithm::PerPixel] {
            let config = CalculatorConfig {
                algorithm,
                ..CalculatorConfig::default()
            };
            let eye = viewpoints_for(viewer, &config.viewpoints, config.prone_height_multiplier)[0];
            let query = Query::new(Some(viewer), target, eye);
            group.bench_with_input(
                BenchmarkId::new(format!("{algorithm:?}"), w),
                &query,
                |b, q| {
                    b.iter(|| calculate(&s, q, &config).percent_visible());
                },
            );
        }
    }
    group.finish();
}

criterion_group!(benches, bench_visibility);
criterion_main!(benches);
