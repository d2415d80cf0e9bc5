//! Benchmarks for the block-rate LFO.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use frugi_dsp::dsp::{lfo::Lfo, modulation::Modulators};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_lfo(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/lfo");

    for &size in BLOCK_SIZES {
        let mut mods = Modulators::default();

        // Fast rate so sample & hold redraws often
        let mut lfo = Lfo::new(SAMPLE_RATE);
        lfo.update_params(1.0, 1.0);
        group.bench_with_input(BenchmarkId::new("all_waves", size), &size, |b, &size| {
            b.iter(|| lfo.render(black_box(size), black_box(&mut mods)))
        });
    }

    group.finish();
}
