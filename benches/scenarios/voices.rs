//! Benchmarks for complete voices and the polyphonic mix.
//!
//! Voices run the factory patch: two detuned saws through a driven 2-pole
//! ladder, envelopes and LFO all live.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use frugi_dsp::{
    engine::Instrument,
    params::{load_factory_patch, ParamStore},
    synth::{PolySynth, Voice},
    MAX_VOICES,
};

use crate::{BLOCK_SIZES, SAMPLE_RATE};

pub fn bench_voices(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/voices");

    for &size in BLOCK_SIZES {
        // === SINGLE VOICE ===
        // Baseline for what one sounding voice costs per block
        let mut store = ParamStore::default();
        load_factory_patch(&mut store, 0);
        let mut voice = Voice::new(0, SAMPLE_RATE, size);
        voice.update_params(store.values());
        voice.note_on(45, 100);

        group.bench_with_input(BenchmarkId::new("voice", size), &size, |b, _| {
            b.iter(|| black_box(voice.render()))
        });

        // === FULL POLYPHONY ===
        // Every voice sounding, mixed and attenuated
        let mut store = ParamStore::default();
        let mut synth = PolySynth::new(MAX_VOICES);
        synth.prepare_for_play(SAMPLE_RATE, size, &mut store);
        for i in 0..MAX_VOICES as u8 {
            synth.note_on(48 + i * 3, 100);
        }
        let mut left = vec![0.0f32; size];
        let mut right = vec![0.0f32; size];

        group.bench_with_input(BenchmarkId::new("poly_full", size), &size, |b, _| {
            b.iter(|| synth.process_block(black_box(&mut left), black_box(&mut right)))
        });

        // === PARAMETER RESYNC ===
        // A CC sweep dirties the store every block
        group.bench_with_input(BenchmarkId::new("poly_resync", size), &size, |b, _| {
            b.iter(|| synth.parameters_changed(black_box(&store)))
        });
    }

    group.finish();
}
