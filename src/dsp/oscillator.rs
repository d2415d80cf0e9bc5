#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::modulation::{ModSource, Modulators},
    params::scale::{to_int, to_linear},
};

/*
Band-Limited Oscillator
=======================

Two of these run in every voice. Each produces one of three waveforms at a
pitch set by the note, offset by octave/semitone/cent controls and modulated
by one selectable source.

Vocabulary
----------

  phase       Position inside one cycle, 0.0 ≤ phase < 1.0.

  increment   Phase advance per sample: frequency / sample_rate.

  aliasing    A naive sawtooth has an instantaneous jump. That jump contains
              energy at every harmonic, and harmonics above Nyquist fold back
              as inharmonic junk.

  polyBLEP    "Polynomial band-limited step". Within one sample either side of
              the jump we subtract a small quadratic that rounds the corner
              off. Cheap and removes most audible aliasing.


Pitch
-----

    semitones = octave × 12 + semi + cents / 100 + depth × mods[source]
    increment = pitch_hz × 2^(semitones / 12) / sample_rate

The increment is recomputed once per block, so modulation is block-rate. It
is capped just under half a cycle per sample (Nyquist): the top note with
every offset maxed out would otherwise ask for more than a full cycle per
sample, and the BLEP correction only holds within one sample of the jump.


Waveforms
---------

  Saw        2 × phase - 1, with polyBLEP at the wrap.

                 ╱│  ╱│  ╱│
                ╱ │ ╱ │ ╱ │
               ╱  │╱  │╱  │

  Pulse      Difference of two BLEP saws offset by the pulse width, then the
             DC shift removed and the amplitude normalized:

                 ┌──┐  ┌──┐  ┌──┐
                 │  │  │  │  │  │
               ──┘  └──┘  └──┘  └──

               pulse = saw(φ) - saw(φ + pw) - (1 - 2·pw)
               gain  = 1 / max(pw, 1 - pw)

  Triangle   2 × |2 × phase - 1| - 1. Restarts at phase 0.5, the bottom of
             the ramp, so every note starts from the same point.

                 ╱╲    ╱╲
                ╱  ╲  ╱  ╲
                    ╲╱    ╲╱

Every waveform goes through a gentle cubic soft-saturation, x × (1 - 0.3x²),
which rounds the peaks slightly. Per-waveform gain scalers then even out the
perceived loudness between shapes.
*/

pub const OCTAVE_RANGE: (i32, i32) = (-2, 2);
pub const SEMI_RANGE: (i32, i32) = (-12, 12);
pub const CENTS_RANGE: (i32, i32) = (-50, 50);
pub const MOD_DEPTH_MAX: f32 = 5.0;

const SAW_GAIN: f32 = 2.5;
const TRIANGLE_GAIN: f32 = 1.0;
const PULSE_GAIN: f32 = 0.5;
const PULSE_WIDTH_MIN: f32 = 0.02;
const PULSE_WIDTH_MAX: f32 = 0.98;

/// Ceiling on the per-sample phase advance, just under Nyquist.
pub const MAX_INCREMENT: f32 = 0.49;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Waveform {
    Triangle,
    #[default]
    Saw,
    Pulse,
}

impl Waveform {
    pub fn from_param(norm: f32) -> Self {
        match to_int(norm, 0, 2) {
            i32::MIN..=0 => Waveform::Triangle,
            1 => Waveform::Saw,
            _ => Waveform::Pulse,
        }
    }
}

/// Whether a render overwrites the destination or sums into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscOutput {
    Replace,
    Mix,
}

#[derive(Debug, Clone, Copy)]
pub struct OscillatorParams {
    pub wave: f32,
    pub octave: f32,
    pub semi: f32,
    pub cents: f32,
    pub level: f32,
    pub mod_source: f32,
    pub mod_depth: f32,
    pub pulse_width: f32,
}

pub struct Oscillator {
    wave: Waveform,
    octave: i32,
    semi: i32,
    cents: i32,
    level: f32,
    mod_source: ModSource,
    mod_depth: f32,
    pulse_width: f32,

    output: OscOutput,
    sample_rate: f32,
    pitch: f32, // Hz, 0 = silent
    phase: f32,
    increment: f32,
}

impl Oscillator {
    pub fn new(sample_rate: f32, output: OscOutput) -> Self {
        Self {
            wave: Waveform::Saw,
            octave: 0,
            semi: 0,
            cents: 0,
            level: 0.5,
            mod_source: ModSource::LfoTriangle,
            mod_depth: 0.0,
            pulse_width: 0.5,

            output,
            sample_rate,
            pitch: 0.0,
            phase: 0.0,
            increment: 0.0,
        }
    }

    pub fn update_params(&mut self, params: &OscillatorParams) {
        self.wave = Waveform::from_param(params.wave);
        self.octave = to_int(params.octave, OCTAVE_RANGE.0, OCTAVE_RANGE.1);
        self.semi = to_int(params.semi, SEMI_RANGE.0, SEMI_RANGE.1);
        self.cents = to_int(params.cents, CENTS_RANGE.0, CENTS_RANGE.1);
        self.mod_depth = to_linear(params.mod_depth, 0.0, MOD_DEPTH_MAX);
        self.mod_source = ModSource::from_param_skip_amp(params.mod_source);
        self.pulse_width = params.pulse_width.clamp(PULSE_WIDTH_MIN, PULSE_WIDTH_MAX);
        // Two oscillators share the voice's headroom
        self.level = params.level * 0.5;
    }

    /// Start a note at `pitch_hz`, restarting the cycle.
    pub fn note_on(&mut self, pitch_hz: f32) {
        self.reset();
        self.pitch = pitch_hz;
    }

    /// Silence the oscillator; renders become no-ops.
    pub fn note_off(&mut self) {
        self.pitch = 0.0;
    }

    pub fn reset(&mut self) {
        self.phase = match self.wave {
            Waveform::Triangle => 0.5,
            _ => 0.0,
        };
    }

    /// Render one block into `out`, replacing or summing per the output mode.
    pub fn render(&mut self, out: &mut [f32], mods: &Modulators) {
        if self.pitch == 0.0 {
            return;
        }

        let semitones = self.mod_depth * mods.get(self.mod_source)
            + (self.octave * 12 + self.semi) as f32
            + self.cents as f32 * 0.01;
        self.increment =
            (self.pitch * (semitones / 12.0).exp2() / self.sample_rate).min(MAX_INCREMENT);

        match self.wave {
            Waveform::Saw => self.render_saw(out),
            Waveform::Triangle => self.render_triangle(out),
            Waveform::Pulse => self.render_pulse(out),
        }
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn increment(&self) -> f32 {
        self.increment
    }

    pub fn waveform(&self) -> Waveform {
        self.wave
    }

    fn render_saw(&mut self, out: &mut [f32]) {
        let inc = self.increment;
        let gain = self.level * SAW_GAIN;
        let mut phase = self.phase;

        for slot in out.iter_mut() {
            let sample = soft_saturate(blep_saw(phase, inc)) * gain;
            write(slot, sample, self.output);
            phase = wrap(phase + inc);
        }

        self.phase = phase;
    }

    fn render_triangle(&mut self, out: &mut [f32]) {
        let inc = self.increment;
        let gain = self.level * TRIANGLE_GAIN;
        let mut phase = self.phase;

        for slot in out.iter_mut() {
            let tri = 2.0 * (2.0 * phase - 1.0).abs() - 1.0;
            write(slot, soft_saturate(tri) * gain, self.output);
            phase = wrap(phase + inc);
        }

        self.phase = phase;
    }

    fn render_pulse(&mut self, out: &mut [f32]) {
        let inc = self.increment;
        let pw = self.pulse_width;
        let correction = if pw < 0.5 { 1.0 / (1.0 - pw) } else { 1.0 / pw };
        let dc_offset = 1.0 - 2.0 * pw;
        let gain = self.level * correction * PULSE_GAIN;
        let mut phase = self.phase;

        for slot in out.iter_mut() {
            let lead = blep_saw(phase, inc);
            let lag = blep_saw(wrap(phase + pw), inc);
            write(slot, soft_saturate(lead - lag - dc_offset) * gain, self.output);
            phase = wrap(phase + inc);
        }

        self.phase = phase;
    }
}

/// Bipolar sawtooth at `phase` with polyBLEP correction around the wrap.
#[inline]
pub fn blep_saw(phase: f32, inc: f32) -> f32 {
    let mut saw = 2.0 * phase - 1.0;

    if phase > 1.0 - inc {
        // Approaching the wrap from the left
        let t = (phase - 1.0) / inc;
        saw -= t * t + 2.0 * t + 1.0;
    } else if phase < inc {
        // Just past the wrap
        let t = phase / inc;
        saw -= 2.0 * t - t * t - 1.0;
    }

    saw
}

#[inline]
pub fn soft_saturate(x: f32) -> f32 {
    x * (1.0 - 0.3 * x * x)
}

/// Fold any phase back into [0, 1).
#[inline]
fn wrap(phase: f32) -> f32 {
    let wrapped = phase - phase.floor();
    // floor of a tiny negative rounds the result up to exactly 1.0
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

#[inline]
fn write(slot: &mut f32, sample: f32, output: OscOutput) {
    match output {
        OscOutput::Replace => *slot = sample,
        OscOutput::Mix => *slot += sample,
    }
}
