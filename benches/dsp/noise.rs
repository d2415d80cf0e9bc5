//! Benchmarks for the voice noise source.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use frugi_dsp::dsp::noise::Noise;

use crate::BLOCK_SIZES;

fn noise(kind: f32) -> Noise {
    let mut noise = Noise::new();
    noise.update_params(1.0, kind);
    noise.note_on();
    noise
}

pub fn bench_noise(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/noise");

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // One LCG step per sample
        let mut white = noise(0.0);
        group.bench_with_input(BenchmarkId::new("white", size), &size, |b, _| {
            b.iter(|| white.render(black_box(&mut buffer)))
        });

        // LCG plus four held stages
        let mut pink = noise(1.0);
        group.bench_with_input(BenchmarkId::new("pink", size), &size, |b, _| {
            b.iter(|| pink.render(black_box(&mut buffer)))
        });
    }

    group.finish();
}
