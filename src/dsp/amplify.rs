//! Voice amplifier and block gain helpers.

/*
Voice Amplifier
===============

The last stage of every voice. It scales the whole block by one number:

    gain = env × volume × (1 + depth × mods[source])

where `env` is the amp envelope's output for this block. The envelope is the
gate: when it is zero the voice is silent no matter what else is going on.

Vocabulary
----------

  volume    The patch's master level for the voice (0.0 to 1.0).

  tremolo   Amplitude modulation by an LFO. With depth 0.5 and a triangle
            LFO the gain swings between 0.5× and 1.5× the envelope level.

  block-rate gain
            The gain is constant across the block. At 128 samples this can
            produce tiny steps ("zipper noise") on fast sweeps; the envelope
            curves are smooth enough at 375 updates/s that it is inaudible in
            practice.


Polyphonic Headroom
-------------------

N voices summed at full level can reach N× full scale. Scaling the mix by
1/√N keeps uncorrelated voices at roughly the loudness of one, while
accepting that perfectly correlated peaks can still exceed unity (the output
sanity check catches those).

    voices   1/√N
    ──────   ─────
      1      1.000
      4      0.500
      8      0.354
*/

use crate::{
    dsp::modulation::{ModSource, Modulators},
    params::scale::to_int,
};

pub struct Amplifier {
    volume: f32,
    mod_source: ModSource,
    mod_depth: f32,
}

impl Amplifier {
    pub fn new() -> Self {
        Self {
            volume: 1.0,
            mod_source: ModSource::AmpEnvelope,
            mod_depth: 0.0,
        }
    }

    pub fn update_params(&mut self, volume: f32, mod_source: f32, mod_depth: f32) {
        self.volume = volume;
        self.mod_source = ModSource::ALL[to_int(mod_source, 0, 6).clamp(0, 6) as usize];
        self.mod_depth = mod_depth;
    }

    /// Gain this block would apply.
    #[inline]
    pub fn gain(&self, mods: &Modulators) -> f32 {
        mods.get(ModSource::AmpEnvelope)
            * self.volume
            * (1.0 + self.mod_depth * mods.get(self.mod_source))
    }

    pub fn render(&self, buffer: &mut [f32], mods: &Modulators) {
        apply_gain(buffer, self.gain(mods));
    }
}

impl Default for Amplifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Multiply a signal by a constant gain factor (in-place).
#[inline]
pub fn apply_gain(signal: &mut [f32], gain: f32) {
    for sample in signal.iter_mut() {
        *sample *= gain;
    }
}

/// Add `source × gain` into `dest`.
#[inline]
pub fn mix_into(dest: &mut [f32], source: &[f32], gain: f32) {
    debug_assert_eq!(dest.len(), source.len());

    for (d, &s) in dest.iter_mut().zip(source.iter()) {
        *d += s * gain;
    }
}

/// Mix scaling for `voices` summed voices.
#[inline]
pub fn poly_attenuation(voices: usize) -> f32 {
    1.0 / (voices.max(1) as f32).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_gain() {
        let mut signal = [1.0, 0.5, -0.5, -1.0];
        apply_gain(&mut signal, 0.5);
        assert_eq!(signal, [0.5, 0.25, -0.25, -0.5]);
    }

    #[test]
    fn test_mix_into() {
        let mut dest = [1.0, 1.0, 1.0];
        mix_into(&mut dest, &[0.5, -0.5, 0.0], 2.0);
        assert_eq!(dest, [2.0, 0.0, 1.0]);
    }

    #[test]
    fn closed_envelope_silences_voice() {
        let amp = Amplifier::new();
        let mut mods = Modulators::default();
        mods.set(ModSource::AmpEnvelope, 0.0);

        let mut block = [0.3, -0.7, 0.5];
        amp.render(&mut block, &mods);
        assert_eq!(block, [0.0, 0.0, 0.0]);
    }

    #[test]
    fn tremolo_scales_around_envelope_level() {
        let mut amp = Amplifier::new();
        // source index 1 = LFO triangle, depth 0.5
        amp.update_params(1.0, 1.0 / 6.0, 0.5);

        let mut mods = Modulators::default();
        mods.set(ModSource::AmpEnvelope, 0.8);
        mods.set(ModSource::LfoTriangle, 1.0);
        assert!((amp.gain(&mods) - 1.2).abs() < 1e-6);

        mods.set(ModSource::LfoTriangle, -1.0);
        assert!((amp.gain(&mods) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn attenuation_follows_inverse_square_root() {
        assert_eq!(poly_attenuation(1), 1.0);
        assert_eq!(poly_attenuation(4), 0.5);
        assert!((poly_attenuation(8) - 0.353_553_4).abs() < 1e-6);
        assert_eq!(poly_attenuation(0), 1.0);
    }
}
