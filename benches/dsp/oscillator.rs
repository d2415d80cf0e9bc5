//! Benchmarks for band-limited oscillators.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use frugi_dsp::dsp::{
    modulation::{ModSource, Modulators},
    oscillator::{OscOutput, Oscillator, OscillatorParams},
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn osc(wave: f32, mod_depth: f32) -> Oscillator {
    let mut osc = Oscillator::new(SAMPLE_RATE, OscOutput::Replace);
    osc.update_params(&OscillatorParams {
        wave,
        octave: 0.5,
        semi: 0.5,
        cents: 0.5,
        level: 1.0,
        mod_source: 0.2,
        mod_depth,
        pulse_width: 0.3,
    });
    osc.note_on(440.0);
    osc
}

pub fn bench_oscillator(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/oscillator");
    let mut mods = Modulators::default();
    for source in ModSource::ALL {
        mods.set(source, 0.5);
    }

    for &size in BLOCK_SIZES {
        let mut buffer = vec![0.0f32; size];

        // Triangle - no discontinuity, no BLEP
        let mut tri = osc(0.0, 0.0);
        group.bench_with_input(BenchmarkId::new("triangle", size), &size, |b, _| {
            b.iter(|| tri.render(black_box(&mut buffer), black_box(&mods)))
        });

        // Sawtooth - one BLEP per wrap
        let mut saw = osc(0.5, 0.0);
        group.bench_with_input(BenchmarkId::new("sawtooth", size), &size, |b, _| {
            b.iter(|| saw.render(black_box(&mut buffer), black_box(&mods)))
        });

        // Pulse - two offset saws, two BLEPs
        let mut pulse = osc(1.0, 0.0);
        group.bench_with_input(BenchmarkId::new("pulse", size), &size, |b, _| {
            b.iter(|| pulse.render(black_box(&mut buffer), black_box(&mods)))
        });

        // Sawtooth with pitch modulation - adds the exp2 per block
        let mut vibrato = osc(0.5, 0.4);
        group.bench_with_input(BenchmarkId::new("sawtooth_modulated", size), &size, |b, _| {
            b.iter(|| vibrato.render(black_box(&mut buffer), black_box(&mods)))
        });
    }

    group.finish();
}
