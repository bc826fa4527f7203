//! Criterion benchmarks for wavegrid-core primitives
//!
//! Run with: cargo bench -p wavegrid-core
#![allow(missing_docs)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use wavegrid_core::{LinearSmoothedParam, LookupTable, PhaseAccumulator, SineTable, trilinear};

const SAMPLE_RATE: f64 = 48000.0;
const BLOCK_SIZES: &[usize] = &[64, 128, 256, 512, 1024];

fn bench_phase(c: &mut Criterion) {
    let mut group = c.benchmark_group("PhaseAccumulator");

    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("advance", block_size),
            &block_size,
            |b, &size| {
                let mut phase = PhaseAccumulator::new();
                b.iter(|| {
                    let mut sum = 0.0;
                    for _ in 0..size {
                        sum += phase.advance(black_box(440.0), SAMPLE_RATE);
                    }
                    black_box(sum)
                })
            },
        );
    }

    group.finish();
}

fn bench_sine_table(c: &mut Criterion) {
    let mut group = c.benchmark_group("SineTable");
    let sine = SineTable::new();

    for &block_size in BLOCK_SIZES {
        group.bench_with_input(
            BenchmarkId::new("lookup", block_size),
            &block_size,
            |b, &size| {
                b.iter(|| {
                    let mut sum = 0.0;
                    for n in 0..size {
                        sum += sine.lookup(black_box(n as f64 * 0.0575));
                    }
                    black_box(sum)
                })
            },
        );
    }

    group.finish();
}

fn bench_trilinear(c: &mut Criterion) {
    let mut group = c.benchmark_group("Trilinear");

    let shapes: [(&str, [usize; 3]); 3] = [
        ("64x8x8", [64, 8, 8]),
        ("256x16x16", [256, 16, 16]),
        ("2048x32x32", [2048, 32, 32]),
    ];

    for (name, shape) in shapes {
        let table = LookupTable::from_fn(shape, |i0, i1, i2| {
            ((i0 + 3 * i1 + 7 * i2) % 101) as f32 / 50.0 - 1.0
        })
        .expect("valid shape");
        let max0 = table.axis_max(0);

        group.bench_with_input(BenchmarkId::new(name, 128), &table, |b, table| {
            b.iter(|| {
                let mut sum = 0.0f32;
                for n in 0..128 {
                    let c0 = n as f64 / 128.0 * max0;
                    sum += trilinear(table, black_box(c0), 2.5, 3.25);
                }
                black_box(sum)
            })
        });
    }

    group.finish();
}

fn bench_linear_smoothed(c: &mut Criterion) {
    c.bench_function("LinearSmoothedParam/ramp_1024", |b| {
        let mut param = LinearSmoothedParam::with_config(0.0, SAMPLE_RATE, 100.0);
        let mut flip = false;
        b.iter(|| {
            flip = !flip;
            param.set_target(if flip { 1.0 } else { 0.0 });
            let mut sum = 0.0;
            for _ in 0..1024 {
                sum += param.advance();
            }
            black_box(sum)
        })
    });
}

criterion_group!(
    benches,
    bench_phase,
    bench_sine_table,
    bench_trilinear,
    bench_linear_smoothed
);
criterion_main!(benches);
