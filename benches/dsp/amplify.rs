//! Benchmarks for gain and mix primitives.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use frugi_dsp::dsp::{
    amplify::{self, Amplifier},
    modulation::{ModSource, Modulators},
};

use crate::BLOCK_SIZES;

pub fn bench_amplify(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/amplify");

    let mut mods = Modulators::default();
    mods.set(ModSource::AmpEnvelope, 0.8);
    mods.set(ModSource::LfoTriangle, 0.3);

    let mut amp = Amplifier::new();
    amp.update_params(1.0, 1.0 / 6.0, 0.5);

    for &size in BLOCK_SIZES {
        // Pre-allocate buffers
        let signal: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut output = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("amplifier", size), &size, |b, _| {
            b.iter(|| {
                output.copy_from_slice(&signal);
                amp.render(black_box(&mut output), black_box(&mods));
            })
        });

        group.bench_with_input(BenchmarkId::new("mix_into", size), &size, |b, _| {
            b.iter(|| {
                amplify::mix_into(black_box(&mut output), black_box(&signal), 0.35);
            })
        });
    }

    group.finish();
}
