//! Benchmarks for the ladder filter.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use frugi_dsp::dsp::{
    filter::{FilterParams, LadderFilter, SaturationMode},
    modulation::Modulators,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn ladder(mode: f32, saturation: f32) -> LadderFilter {
    let mut filter = LadderFilter::new(SAMPLE_RATE);
    filter.update_params(&FilterParams {
        mode,
        cutoff: 0.5,
        resonance: 0.6,
        saturation,
        mod_depth: 0.0,
        mod_source: 0.0,
        note_tracking: 0.0,
    });
    filter
}

pub fn bench_filter(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/filter");
    let mods = Modulators::default();

    for &size in BLOCK_SIZES {
        // Generate a test signal (sawtooth-like ramp)
        let input: Vec<f32> = (0..size)
            .map(|i| (i as f32 / size as f32) * 2.0 - 1.0)
            .collect();
        let mut buffer = input.clone();

        // 4-pole lowpass, linear
        let mut filter = ladder(0.6, 0.0);
        group.bench_with_input(BenchmarkId::new("lpf4", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&mods));
            })
        });

        // 2-pole bandpass, linear
        let mut filter = ladder(0.2, 0.0);
        group.bench_with_input(BenchmarkId::new("bpf2", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                filter.render(black_box(&mut buffer), black_box(&mods));
            })
        });

        // Driven, one benchmark per saturation curve
        for (name, mode) in [
            ("lpf4_rational", SaturationMode::Rational),
            ("lpf4_pade_tanh", SaturationMode::PadeTanh),
            ("lpf4_feedback", SaturationMode::Feedback),
        ] {
            let mut filter = ladder(0.6, 0.5);
            filter.set_saturation_mode(mode);
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    buffer.copy_from_slice(&input);
                    filter.render(black_box(&mut buffer), black_box(&mods));
                })
            });
        }
    }

    group.finish();
}
