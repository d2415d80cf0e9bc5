//! Benchmarks for the block-rate envelope generator.
//!
//! One render call advances the envelope by a whole block, so these measure
//! the per-block control cost rather than a per-sample loop.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use frugi_dsp::dsp::envelope::{Envelope, EnvelopeParams};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

fn params(attack: f32, release: f32) -> EnvelopeParams {
    EnvelopeParams {
        attack,
        decay: 0.3,
        sustain: 0.7,
        release,
        mode: 0.0,
        note_tracking: 0.0,
        velocity_tracking: 1.0,
    }
}

pub fn bench_envelope(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/envelope");

    for &size in BLOCK_SIZES {
        // Attack phase (long attack so it never completes)
        let mut env = Envelope::new(SAMPLE_RATE, size);
        env.update_params(&params(1.0, 0.5));
        env.note_on(60, 100);
        group.bench_with_input(BenchmarkId::new("attack", size), &size, |b, _| {
            b.iter(|| black_box(env.render()))
        });

        // Retrigger - recomputes velocity-scaled coefficients
        let mut env = Envelope::new(SAMPLE_RATE, size);
        env.update_params(&params(0.2, 0.5));
        group.bench_with_input(BenchmarkId::new("note_on", size), &size, |b, _| {
            b.iter(|| env.note_on(black_box(60), black_box(100)))
        });

        // Parameter change - full coefficient recalculation
        let mut env = Envelope::new(SAMPLE_RATE, size);
        let p = params(0.2, 0.5);
        group.bench_with_input(BenchmarkId::new("update_params", size), &size, |b, _| {
            b.iter(|| env.update_params(black_box(&p)))
        });
    }

    group.finish();
}
