use criterion::{black_box, criterion_group, criterion_main, Criterion};

use qmc::engine::QmcEngine;
use qmc::halton::Halton;
use qmc::rng::Seed;
use qmc::sobol::Sobol;

const DIMS: &[usize] = &[2, 8, 32];
const BATCH: usize = 1024;

fn sobol_construct(c: &mut Criterion) {
    for &d in DIMS {
        c.bench_function(&format!("Sobol::new (d={d})"), |b| {
            b.iter(|| Sobol::new(black_box(d), false, &Seed::None).unwrap())
        });
    }
}

fn sobol_random(c: &mut Criterion) {
    for &d in DIMS {
        c.bench_function(&format!("Sobol::random (d={d}, n={BATCH})"), |b| {
            let mut engine = Sobol::new(d, false, &Seed::None).unwrap();
            b.iter(|| black_box(engine.random(BATCH).unwrap()))
        });
    }
}

fn sobol_scrambled_random(c: &mut Criterion) {
    for &d in DIMS {
        c.bench_function(&format!("Sobol::random scrambled (d={d}, n={BATCH})"), |b| {
            let mut engine = Sobol::new(d, true, &Seed::Int(7)).unwrap();
            b.iter(|| black_box(engine.random(BATCH).unwrap()))
        });
    }
}

fn halton_random(c: &mut Criterion) {
    for &d in DIMS {
        c.bench_function(&format!("Halton::random (d={d}, n={BATCH})"), |b| {
            let mut engine = Halton::new(d, false, Seed::None).unwrap();
            b.iter(|| black_box(engine.random(BATCH).unwrap()))
        });
    }
}

criterion_group!(
    benches,
    sobol_construct,
    sobol_random,
    sobol_scrambled_random,
    halton_random
);
criterion_main!(benches);
