//! Block-rate low-frequency oscillator feeding five modulation slots.

/*
Low Frequency Oscillator
========================

An LFO is an oscillator too slow to hear (here 0 to 20 Hz) whose output moves
other parameters: vibrato on pitch, wah on cutoff, tremolo on amplitude.

This one computes ALL of its waveforms every block from a single shared
phase and writes each into its own modulation slot, so different consumers
can pick different shapes from the same LFO.

    phase  0 ──────────────────────────→ 1

    triangle     4|φ - ½| - 1       1 ╲    ╱
                                   -1  ╲╱

    saw          2φ - 1            -1 ╱    1
    reverse saw  1 - 2φ             1 ╲   -1
    square       φ > ½ ? -1 : 1     1 ▔▔▁▁ -1
    sample&hold  random, held between cycle wraps


Block Rate
----------

The phase advances by `rate / sample_rate × block_size` per render call and
the outputs are constant over the block. At 20 Hz and 375 blocks per second
that is about 19 steps per cycle; coarse, but a modulation source is smoothed
by whatever it modulates.


Sample & Hold
-------------

A new random value is drawn each time the phase wraps (current phase smaller
than the previous one). The generator is xorshift32: three shifts and XORs,
no tables, no allocation, deterministic for a given seed.


Trigger Modes
-------------

  Note   phase restarts on every note-on, so each note gets the same sweep
  Free   phase runs continuously, notes land wherever the cycle is
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::modulation::{ModSource, Modulators},
    params::scale::{to_int, to_linear},
};

pub const RATE_MIN_HZ: f32 = 0.0;
pub const RATE_MAX_HZ: f32 = 20.0;

/// Default xorshift32 seed.
pub const DEFAULT_SEED: u32 = 2_463_534_242;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LfoTrigger {
    #[default]
    Note,
    Free,
}

impl LfoTrigger {
    pub fn from_param(norm: f32) -> Self {
        if to_int(norm, 0, 1) >= 1 {
            LfoTrigger::Free
        } else {
            LfoTrigger::Note
        }
    }
}

pub struct Lfo {
    sample_rate: f32,
    rate_hz: f32,
    trigger: LfoTrigger,
    increment: f32,
    phase: f32,
    prev_phase: f32,
    held: f32,
    rng: u32,
}

impl Lfo {
    pub fn new(sample_rate: f32) -> Self {
        Self::with_seed(sample_rate, DEFAULT_SEED)
    }

    /// Build with a specific S&H seed. A zero seed would lock xorshift at
    /// zero, so it is replaced by the default.
    pub fn with_seed(sample_rate: f32, seed: u32) -> Self {
        Self {
            sample_rate,
            rate_hz: 0.0,
            trigger: LfoTrigger::Note,
            increment: 0.0,
            phase: 0.0,
            prev_phase: 0.0,
            held: 0.0,
            rng: if seed == 0 { DEFAULT_SEED } else { seed },
        }
    }

    pub fn update_params(&mut self, rate: f32, trigger_mode: f32) {
        self.rate_hz = to_linear(rate, RATE_MIN_HZ, RATE_MAX_HZ);
        self.trigger = LfoTrigger::from_param(trigger_mode);
        self.increment = self.rate_hz / self.sample_rate;
    }

    pub fn note_on(&mut self) {
        if self.trigger == LfoTrigger::Note {
            self.reset();
        }
    }

    pub fn reset(&mut self) {
        self.phase = 0.0;
    }

    /// Write this block's five outputs into `mods` and advance the phase.
    pub fn render(&mut self, block_size: usize, mods: &mut Modulators) {
        let phase = self.phase;
        let next_phase = (phase + self.increment * block_size as f32) % 1.0;

        mods.set(ModSource::LfoTriangle, 4.0 * (phase - 0.5).abs() - 1.0);
        mods.set(ModSource::LfoSaw, 2.0 * phase - 1.0);
        mods.set(ModSource::LfoReverseSaw, 1.0 - 2.0 * phase);
        mods.set(ModSource::LfoSquare, if phase > 0.5 { -1.0 } else { 1.0 });

        if phase < self.prev_phase {
            self.held = self.next_random();
        }
        mods.set(ModSource::LfoSampleHold, self.held);

        self.prev_phase = phase;
        self.phase = next_phase;
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn trigger(&self) -> LfoTrigger {
        self.trigger
    }

    /// Uniform value in [-1, 1].
    fn next_random(&mut self) -> f32 {
        self.rng = xorshift32(self.rng);
        self.rng as f32 / u32::MAX as f32 * 2.0 - 1.0
    }
}

#[inline]
pub fn xorshift32(mut state: u32) -> u32 {
    state ^= state << 13;
    state ^= state >> 17;
    state ^= state << 5;
    state
}
