use std::f32::consts::PI;

use crate::{
    io::midi::{MidiChannel, MidiMessage},
    params::ParamStore,
};

/// The sound source the scheduler drives.
///
/// Only [`Instrument::process_block`] is mandatory; an instrument that
/// ignores MIDI and parameters still makes a valid engine.
pub trait Instrument {
    /// Called once after the audio hardware has started. Returns the MIDI
    /// channel the scheduler should listen on.
    fn prepare_for_play(
        &mut self,
        _sample_rate: f32,
        _block_size: usize,
        _store: &mut ParamStore,
    ) -> MidiChannel {
        MidiChannel::Omni
    }

    /// The store has been written since the last block.
    fn parameters_changed(&mut self, _store: &ParamStore) {}

    /// Render one block. Both slices are `block_size` long.
    fn process_block(&mut self, left: &mut [f32], right: &mut [f32]);

    fn handle_midi(&mut self, _msg: &MidiMessage, _store: &mut ParamStore) {}
}

impl<I: Instrument + ?Sized> Instrument for Box<I> {
    fn prepare_for_play(
        &mut self,
        sample_rate: f32,
        block_size: usize,
        store: &mut ParamStore,
    ) -> MidiChannel {
        (**self).prepare_for_play(sample_rate, block_size, store)
    }

    fn parameters_changed(&mut self, store: &ParamStore) {
        (**self).parameters_changed(store)
    }

    fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        (**self).process_block(left, right)
    }

    fn handle_midi(&mut self, msg: &MidiMessage, store: &mut ParamStore) {
        (**self).handle_midi(msg, store)
    }
}

/*
Test Tone
=========

A 440 Hz sine from a two-stage parabolic approximation, cheap enough to run
without a maths library:

    angle = π - 2π·phase                  (π down to -π over one cycle)
    y     = B·angle + C·angle·|angle|     (parabola through the sine peaks)
    out   = P·(y·|y| - y) + y             (second pass tightens the fit)

    B = 4/π,  C = -4/π²,  P = 0.225

Worst-case error against sin() is about 0.001.
*/

const TONE_HZ: f32 = 440.0;
const B: f32 = 1.273_239_5;
const C: f32 = -0.405_284_73;
const P: f32 = 0.225;

/// Continuous 440 Hz tone on both channels.
#[derive(Debug, Clone)]
pub struct TestTone {
    phase: f32,
    increment: f32,
}

impl TestTone {
    pub fn new() -> Self {
        Self {
            phase: 0.0,
            increment: TONE_HZ / 48_000.0,
        }
    }
}

impl Default for TestTone {
    fn default() -> Self {
        Self::new()
    }
}

impl Instrument for TestTone {
    fn prepare_for_play(
        &mut self,
        sample_rate: f32,
        _block_size: usize,
        _store: &mut ParamStore,
    ) -> MidiChannel {
        self.increment = TONE_HZ / sample_rate;
        MidiChannel::Omni
    }

    fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) {
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            if self.phase > 1.0 {
                self.phase -= 1.0;
            }

            let angle = PI - self.phase * 2.0 * PI;
            let y = B * angle + C * angle * angle.abs();
            let sample = P * (y * y.abs() - y) + y;

            *l = sample;
            *r = sample;
            self.phase += self.increment;
        }
    }
}
