//! Per-voice modulation sources, written once per block and read by any module.

/*
Modulation Routing
==================

Each voice owns a small fixed table of modulation values. Producers write
their slot once per block; consumers pick a slot by index and scale it by a
depth parameter.

    producer          slot              typical range
    ────────────────  ────────────────  ─────────────
    amp envelope      AmpEnvelope       0 .. 1
    LFO               LfoTriangle       -1 .. 1
                      LfoSaw            -1 .. 1
                      LfoReverseSaw     -1 .. 1
                      LfoSquare         -1 .. 1
                      LfoSampleHold     -1 .. 1
    mod envelope      ModEnvelope       depends on envelope mode

Consumers in this synth:

    oscillator pitch  semitones += depth × mods[src]
    filter cutoff     cutoff    *= 4 ^ (depth × mods[src])
    amplifier gain    gain      *= 1 + depth × mods[src]

The table is passed explicitly into every render call. Slots hold the value
from the most recent block a producer rendered, so a consumer that runs
before its producer in the chain sees last block's value.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::params::scale::to_int;

pub const MOD_SOURCE_COUNT: usize = 7;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModSource {
    AmpEnvelope,
    LfoTriangle,
    LfoSaw,
    LfoReverseSaw,
    LfoSquare,
    LfoSampleHold,
    ModEnvelope,
}

impl ModSource {
    pub const ALL: [ModSource; MOD_SOURCE_COUNT] = [
        ModSource::AmpEnvelope,
        ModSource::LfoTriangle,
        ModSource::LfoSaw,
        ModSource::LfoReverseSaw,
        ModSource::LfoSquare,
        ModSource::LfoSampleHold,
        ModSource::ModEnvelope,
    ];

    /// Decode a normalized parameter over the whole source range.
    pub fn from_param(norm: f32) -> Self {
        Self::from_index(to_int(norm, 0, MOD_SOURCE_COUNT as i32 - 1))
    }

    /// Decode a normalized parameter, skipping the amp envelope slot.
    ///
    /// Pitch and cutoff modulation start at the LFO triangle; the amp
    /// envelope is only a useful source for the amplifier.
    pub fn from_param_skip_amp(norm: f32) -> Self {
        Self::from_index(to_int(
            norm,
            ModSource::LfoTriangle as i32,
            MOD_SOURCE_COUNT as i32 - 1,
        ))
    }

    fn from_index(index: i32) -> Self {
        let clamped = index.clamp(0, MOD_SOURCE_COUNT as i32 - 1) as usize;
        Self::ALL[clamped]
    }
}

/// One voice's modulation slots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Modulators([f32; MOD_SOURCE_COUNT]);

impl Modulators {
    #[inline]
    pub fn get(&self, source: ModSource) -> f32 {
        self.0[source as usize]
    }

    #[inline]
    pub fn set(&mut self, source: ModSource, value: f32) {
        self.0[source as usize] = value;
    }

    pub fn clear(&mut self) {
        self.0 = [0.0; MOD_SOURCE_COUNT];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoding_skips_amp_envelope_for_pitch_and_cutoff() {
        assert_eq!(ModSource::from_param_skip_amp(0.0), ModSource::LfoTriangle);
        assert_eq!(ModSource::from_param_skip_amp(1.0), ModSource::ModEnvelope);
        assert_eq!(ModSource::from_param(0.0), ModSource::AmpEnvelope);
        assert_eq!(ModSource::from_param(1.0), ModSource::ModEnvelope);
    }

    #[test]
    fn slots_are_independent() {
        let mut mods = Modulators::default();
        mods.set(ModSource::LfoSaw, -0.5);
        mods.set(ModSource::AmpEnvelope, 0.8);
        assert_eq!(mods.get(ModSource::LfoSaw), -0.5);
        assert_eq!(mods.get(ModSource::AmpEnvelope), 0.8);
        assert_eq!(mods.get(ModSource::LfoSquare), 0.0);

        mods.clear();
        assert_eq!(mods.get(ModSource::AmpEnvelope), 0.0);
    }
}
