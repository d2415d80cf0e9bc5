//! Benchmarks for a complete scheduler iteration.
//!
//! Covers everything between two buffer-ready notifications: draining MIDI,
//! parameter refresh, the polyphonic render and the word conversion into the
//! double buffer.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use frugi_dsp::{
    engine::{hardware::NullHardware, BufferHalf, EngineConfig, Scheduler},
    synth::PolySynth,
    MAX_VOICES,
};

use crate::BLOCK_SIZES;

pub fn bench_engine(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenarios/engine");

    for &size in BLOCK_SIZES {
        let config = EngineConfig::default()
            .with_block_size(size)
            .with_midi_ring_capacity(256);
        let Ok((mut scheduler, mut ports)) = Scheduler::new(config, PolySynth::new(MAX_VOICES))
        else {
            continue;
        };
        if scheduler.start(&mut NullHardware::default()).is_err() {
            continue;
        }

        for note in [48, 55, 60, 64, 67, 71] {
            ports.midi_in.send(&[0x90, note, 100]);
        }

        // Idle MIDI, six voices sounding
        let mut half = BufferHalf::Ping;
        group.bench_with_input(BenchmarkId::new("block", size), &size, |b, _| {
            b.iter(|| {
                scheduler.process_block(black_box(half));
                half = half.other();
            })
        });

        // A cutoff sweep on every block forces a full parameter resync
        let mut value = 0u8;
        group.bench_with_input(BenchmarkId::new("block_with_cc", size), &size, |b, _| {
            b.iter(|| {
                ports.midi_in.send(&[0xB0, 74, value]);
                value = (value + 1) % 128;
                scheduler.process_block(black_box(half));
                half = half.other();
            })
        });
    }

    group.finish();
}
