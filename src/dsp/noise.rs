//! White and pink noise mixed into the voice's oscillator block.

/*
Noise Source
============

A third sound source next to the two oscillators. It sums into the same block
the oscillators wrote, so the filter and amplifier shape it exactly like
them.

  white   Every sample is independent: equal energy per hertz, a bright hiss.
          Drawn from a 32-bit linear congruential generator

              state = state × 1664525 + 1013904223

          and read as a signed integer scaled to [-0.5, 0.5).

  pink    Energy falls with frequency, a softer rumble. Approximated with
          four held stages: each sample, the low four bits of the generator
          pick which stages take the fresh white value and which keep their
          old one. Stages that hold longer contribute lower frequencies.

              pink = ½·white + ⅛·(s0 + s1 + s2 + s3)

Both shapes peak at ±0.5 before the level is applied. The level is scaled by
0.3 so a full-level noise sits under, not over, the oscillators.

The source is gated: it only renders between note-on and note-off, and
otherwise leaves the block untouched.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::scale::to_int;

const LCG_MUL: u32 = 1_664_525;
const LCG_ADD: u32 = 1_013_904_223;
const PINK_STAGES: usize = 4;
const OUTPUT_SCALE: f32 = 0.3;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoiseType {
    #[default]
    White,
    Pink,
}

impl NoiseType {
    pub fn from_param(norm: f32) -> Self {
        if to_int(norm, 0, 1) >= 1 {
            NoiseType::Pink
        } else {
            NoiseType::White
        }
    }
}

pub struct Noise {
    level: f32,
    kind: NoiseType,
    gate: bool,
    state: u32,
    pink: [f32; PINK_STAGES],
}

impl Noise {
    pub fn new() -> Self {
        Self::with_seed(1)
    }

    pub fn with_seed(seed: u32) -> Self {
        Self {
            level: 0.0,
            kind: NoiseType::White,
            gate: false,
            state: seed,
            pink: [0.0; PINK_STAGES],
        }
    }

    pub fn update_params(&mut self, level: f32, kind: f32) {
        self.level = level.clamp(0.0, 1.0);
        self.kind = NoiseType::from_param(kind);
    }

    pub fn note_on(&mut self) {
        self.gate = true;
    }

    pub fn note_off(&mut self) {
        self.gate = false;
    }

    /// Close the gate and clear the pink stages. The generator keeps running
    /// so consecutive notes don't repeat the same hiss.
    pub fn reset(&mut self) {
        self.gate = false;
        self.pink = [0.0; PINK_STAGES];
    }

    /// Sum one block of noise into `out`.
    pub fn render(&mut self, out: &mut [f32]) {
        if !self.gate || self.level == 0.0 {
            return;
        }

        let gain = self.level * OUTPUT_SCALE;
        match self.kind {
            NoiseType::White => {
                for slot in out.iter_mut() {
                    *slot += self.white() * gain;
                }
            }
            NoiseType::Pink => {
                for slot in out.iter_mut() {
                    *slot += self.pink() * gain;
                }
            }
        }
    }

    pub fn kind(&self) -> NoiseType {
        self.kind
    }

    pub fn is_gated(&self) -> bool {
        self.gate
    }

    #[inline]
    fn white(&mut self) -> f32 {
        self.state = self.state.wrapping_mul(LCG_MUL).wrapping_add(LCG_ADD);
        self.state as i32 as f32 * (1.0 / 4_294_967_296.0)
    }

    #[inline]
    fn pink(&mut self) -> f32 {
        let white = self.white();
        let hold = self.state;

        let mut out = white * 0.5;
        for (i, stage) in self.pink.iter_mut().enumerate() {
            if hold & (1 << i) == 0 {
                *stage = white;
            }
            out += *stage * 0.125;
        }
        out
    }
}

impl Default for Noise {
    fn default() -> Self {
        Self::new()
    }
}
