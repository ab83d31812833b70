// benches/sweep_bench.rs

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::SeedableRng;
use xy_lattice_sim::prelude::*;

fn benchmark_sweep(c: &mut Criterion) {
    let mut group = c.benchmark_group("metropolis_sweep");
    for size in LatticeSize::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(size.side()), &size, |b, &size| {
            let mut rng = StdRng::seed_from_u64(0);
            let mut lattice = LatticeState::random(size, &mut rng);
            let kernel = MetropolisEngine::new(1.0);
            b.iter(|| black_box(kernel.sweep(&mut lattice, &mut rng)));
        });
    }
    group.finish();
}

fn benchmark_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    for size in LatticeSize::ALL {
        group.bench_with_input(BenchmarkId::from_parameter(size.side()), &size, |b, &size| {
            let mut rng = StdRng::seed_from_u64(0);
            let lattice = LatticeState::random(size, &mut rng);
            let mut renderer = Renderer::new(size, EngineConfig::VIEWPORT);
            let mut surface = MemorySurface::new(DEFAULT_VIEWPORT, DEFAULT_VIEWPORT);
            b.iter(|| renderer.render(black_box(&lattice), &mut surface));
        });
    }
    group.finish();
}

fn benchmark_magnetization(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let lattice = LatticeState::random(LatticeSize::N256, &mut rng);
    c.bench_function("magnetization_256", |b| {
        b.iter(|| black_box(magnetization(&lattice)));
    });
}

criterion_group!(benches, benchmark_sweep, benchmark_render, benchmark_magnetization);
criterion_main!(benches);
