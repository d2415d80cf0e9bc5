#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{
    dsp::modulation::{ModSource, Modulators},
    params::scale::{to_bool, to_exp, to_int, to_linear},
};

/*
Ladder Filter
=============

Four one-pole low-pass sections in series, with the summed section states fed
back to the input for resonance. This is the classic "Moog ladder" topology,
here in zero-delay-feedback form so the feedback loop has no unit delay and
stays in tune at high cutoff.

| mode | taps (U, lp1, lp2, lp3, lp4) | slope         |
| ---- | ---------------------------- | ------------- |
| Lpf2 | 0, 0, 1, 0, 0                | 12 dB/oct     |
| Bpf2 | 0, 2, -2, 0, 0               | 6 dB/oct each |
| Hpf2 | 1, -2, 1, 0, 0               | 12 dB/oct     |
| Lpf4 | 0, 0, 0, 0, 1                | 24 dB/oct     |
| Bpf4 | 0, 0, 4, -8, 4               | 12 dB/oct each|
| Hpf4 | 1, -4, 6, -4, 1              | 24 dB/oct     |

Every response is a linear combination of the cascade input U and the four
section outputs, so switching mode never touches the filter state.


Per Block
---------

    cutoff = base × 4^(depth × mods[source])      clamped to [80, 18000] Hz
    g      = tan(π × cutoff / sample_rate)        bilinear pre-warp
    G      = g / (1 + g)                          every section's alpha
    β      = G³, G², G, 1   each / (1 + g)        state weights for feedback
    γ      = G⁴
    α0     = 1 / (1 + k × γ)                      k = resonance 0..4


Per Sample
----------

    σ  = Σ βᵢ × zᵢ
    U  = x - k × σ × α0
    U  = saturate(U)                              only when drive > 0

    for each section:                             ┌──────────────┐
        v  = (in - z) × G                    in ──┤ v = (in-z)·G │── lp
        lp = v + z                                │ lp = v + z   │
        z  = v + lp                               │ z = v + lp   │
        in = lp                                   └──────────────┘


Saturation
----------

Driving U through a soft clipper tames the resonance peak and adds warmth.

  Rational   U ← dU / (|2dU| + 1.5)
  PadeTanh   x = clamp(dU, ±3);  U ← x(27 + x²) / (27 + 9x²)
  Feedback   clip only the feedback term, leave the dry input clean:
             f = k·σ·α0;  U ← x - (df / (1 + |½df|)) / d
             small feedback passes unchanged, larger drive clips it sooner
*/

pub const CUTOFF_MIN_HZ: f32 = 80.0;
pub const CUTOFF_MAX_HZ: f32 = 18_000.0;
pub const RESONANCE_MAX: f32 = 4.0;
pub const SATURATION_MAX: f32 = 5.0;
/// Base of the exponential cutoff modulation: depth 1 at full source sweeps
/// two octaves either way.
const MOD_BASE: f32 = 4.0;
const KEY_TRACK_CENTRE: f32 = 60.0;

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterMode {
    #[default]
    Lpf2,
    Bpf2,
    Hpf2,
    Lpf4,
    Bpf4,
    Hpf4,
}

impl FilterMode {
    const ALL: [FilterMode; 6] = [
        FilterMode::Lpf2,
        FilterMode::Bpf2,
        FilterMode::Hpf2,
        FilterMode::Lpf4,
        FilterMode::Bpf4,
        FilterMode::Hpf4,
    ];

    pub fn from_param(norm: f32) -> Self {
        Self::ALL[to_int(norm, 0, 5).clamp(0, 5) as usize]
    }

    /// Mix weights for (U, lp1, lp2, lp3, lp4).
    #[inline]
    fn taps(self) -> [f32; 5] {
        match self {
            FilterMode::Lpf2 => [0.0, 0.0, 1.0, 0.0, 0.0],
            FilterMode::Bpf2 => [0.0, 2.0, -2.0, 0.0, 0.0],
            FilterMode::Hpf2 => [1.0, -2.0, 1.0, 0.0, 0.0],
            FilterMode::Lpf4 => [0.0, 0.0, 0.0, 0.0, 1.0],
            FilterMode::Bpf4 => [0.0, 0.0, 4.0, -8.0, 4.0],
            FilterMode::Hpf4 => [1.0, -4.0, 6.0, -4.0, 1.0],
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaturationMode {
    #[default]
    Rational,
    PadeTanh,
    Feedback,
}

#[derive(Debug, Clone, Copy)]
pub struct FilterParams {
    pub mode: f32,
    pub cutoff: f32,
    pub resonance: f32,
    pub saturation: f32,
    pub mod_depth: f32,
    pub mod_source: f32,
    pub note_tracking: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Section {
    beta: f32,
    z: f32,
}

pub struct LadderFilter {
    mode: FilterMode,
    saturation_mode: SaturationMode,
    base_cutoff: f32,
    resonance: f32,
    drive: f32,
    mod_depth: f32,
    mod_source: ModSource,
    note_tracking: bool,
    key_scale: f32,

    sample_rate: f32,
    cutoff: f32,
    alpha: f32,
    alpha0: f32,
    sections: [Section; 4],
}

impl LadderFilter {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            mode: FilterMode::Lpf2,
            saturation_mode: SaturationMode::Rational,
            base_cutoff: CUTOFF_MAX_HZ,
            resonance: 0.0,
            drive: 0.0,
            mod_depth: 0.0,
            mod_source: ModSource::LfoTriangle,
            note_tracking: false,
            key_scale: 1.0,

            sample_rate,
            cutoff: CUTOFF_MAX_HZ,
            alpha: 1.0,
            alpha0: 1.0,
            sections: [Section::default(); 4],
        }
    }

    pub fn update_params(&mut self, params: &FilterParams) {
        self.mode = FilterMode::from_param(params.mode);
        self.base_cutoff = to_exp(params.cutoff, CUTOFF_MIN_HZ, CUTOFF_MAX_HZ);
        self.resonance = to_linear(params.resonance, 0.0, RESONANCE_MAX);
        self.drive = to_linear(params.saturation, 0.0, SATURATION_MAX);
        self.mod_depth = params.mod_depth;
        self.mod_source = ModSource::from_param_skip_amp(params.mod_source);
        self.note_tracking = to_bool(params.note_tracking);
    }

    pub fn set_saturation_mode(&mut self, mode: SaturationMode) {
        self.saturation_mode = mode;
    }

    /// Capture the note for key tracking. Cutoff follows the keyboard one
    /// octave per octave around middle C when tracking is on.
    pub fn note_on(&mut self, note: u8) {
        self.key_scale = if self.note_tracking {
            ((note as f32 - KEY_TRACK_CENTRE) / 12.0).exp2()
        } else {
            1.0
        };
    }

    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.z = 0.0;
        }
    }

    /// Recompute block coefficients from the base cutoff and modulation.
    pub fn update_coefficients(&mut self, mods: &Modulators) {
        let sweep = mods.get(self.mod_source) * self.mod_depth;
        self.cutoff = (self.base_cutoff * self.key_scale * MOD_BASE.powf(sweep))
            .clamp(CUTOFF_MIN_HZ, CUTOFF_MAX_HZ);

        let g = (std::f32::consts::PI * self.cutoff / self.sample_rate).tan();
        let one_plus_g = 1.0 + g;
        let big_g = g / one_plus_g;

        self.alpha = big_g;
        self.sections[0].beta = big_g * big_g * big_g / one_plus_g;
        self.sections[1].beta = big_g * big_g / one_plus_g;
        self.sections[2].beta = big_g / one_plus_g;
        self.sections[3].beta = 1.0 / one_plus_g;

        let gamma = big_g * big_g * big_g * big_g;
        self.alpha0 = 1.0 / (1.0 + self.resonance * gamma);
    }

    /// Filter one block in place.
    pub fn render(&mut self, buffer: &mut [f32], mods: &Modulators) {
        self.update_coefficients(mods);

        let taps = self.mode.taps();
        let alpha = self.alpha;
        let alpha0 = self.alpha0;
        let k = self.resonance;
        let drive = self.drive;
        let saturation = self.saturation_mode;
        let betas = self.sections.map(|s| s.beta);
        let mut z = self.sections.map(|s| s.z);

        for sample in buffer.iter_mut() {
            let sigma = betas[0] * z[0] + betas[1] * z[1] + betas[2] * z[2] + betas[3] * z[3];
            let x = *sample;
            let feedback = k * sigma * alpha0;

            let u = if drive > 0.0 {
                match saturation {
                    SaturationMode::Rational => {
                        let d = (x - feedback) * drive;
                        d / ((2.0 * d).abs() + 1.5)
                    }
                    SaturationMode::PadeTanh => {
                        let d = ((x - feedback) * drive).clamp(-3.0, 3.0);
                        let d2 = d * d;
                        d * (27.0 + d2) / (27.0 + 9.0 * d2)
                    }
                    SaturationMode::Feedback => {
                        let d = feedback * drive;
                        x - d / (1.0 + (0.5 * d).abs()) / drive
                    }
                }
            } else {
                x - feedback
            };

            let mut input = u;
            let mut lp = [0.0f32; 4];
            for (i, state) in z.iter_mut().enumerate() {
                let v = (input - *state) * alpha;
                lp[i] = v + *state;
                *state = v + lp[i];
                input = lp[i];
            }

            *sample = taps[0] * u
                + taps[1] * lp[0]
                + taps[2] * lp[1]
                + taps[3] * lp[2]
                + taps[4] * lp[3];
        }

        for (section, state) in self.sections.iter_mut().zip(z) {
            section.z = state;
        }
    }

    pub fn cutoff(&self) -> f32 {
        self.cutoff
    }

    pub fn alpha0(&self) -> f32 {
        self.alpha0
    }

    pub fn mode(&self) -> FilterMode {
        self.mode
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f32 = 48_000.0;

    fn params(mode: FilterMode, cutoff: f32, resonance: f32) -> FilterParams {
        FilterParams {
            mode: mode as u8 as f32 / 5.0,
            cutoff,
            resonance,
            saturation: 0.0,
            mod_depth: 0.0,
            mod_source: 0.0,
            note_tracking: 0.0,
        }
    }

    fn filter(p: FilterParams) -> LadderFilter {
        let mut filter = LadderFilter::new(SAMPLE_RATE);
        filter.update_params(&p);
        filter
    }

    fn sine(freq: f32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|n| (std::f32::consts::TAU * freq * n as f32 / SAMPLE_RATE).sin())
            .collect()
    }

    fn rms(buffer: &[f32]) -> f32 {
        (buffer.iter().map(|s| s * s).sum::<f32>() / buffer.len() as f32).sqrt()
    }

    fn settled_rms(filter: &mut LadderFilter, freq: f32) -> f32 {
        let mods = Modulators::default();
        let mut signal = sine(freq, 4_800);
        for block in signal.chunks_mut(128) {
            filter.render(block, &mods);
        }
        rms(&signal[2_400..])
    }

    #[test]
    fn mode_decoding_covers_all_taps() {
        for (i, mode) in FilterMode::ALL.iter().enumerate() {
            assert_eq!(FilterMode::from_param(i as f32 / 5.0), *mode);
        }
    }

    #[test]
    fn lowpass_passes_dc() {
        let mut f = filter(params(FilterMode::Lpf4, 0.5, 0.0));
        let mods = Modulators::default();
        let mut signal = vec![1.0f32; 4_096];
        for block in signal.chunks_mut(128) {
            f.render(block, &mods);
        }
        let last = *signal.last().unwrap();
        assert!((last - 1.0).abs() < 1e-3, "DC gain should be unity, got {last}");
    }

    #[test]
    fn lowpass_attenuates_above_cutoff() {
        // cutoff param 0 → 80 Hz
        let mut f = filter(params(FilterMode::Lpf4, 0.0, 0.0));
        let out = settled_rms(&mut f, 5_000.0);
        assert!(out < 0.01, "5 kHz through an 80 Hz 4-pole should vanish, got {out}");
    }

    #[test]
    fn highpass_attenuates_below_cutoff() {
        // cutoff param 1 → 18 kHz
        let mut f = filter(params(FilterMode::Hpf4, 1.0, 0.0));
        let out = settled_rms(&mut f, 100.0);
        assert!(out < 0.01, "100 Hz through an 18 kHz highpass should vanish, got {out}");
    }

    #[test]
    fn cutoff_is_clamped_under_heavy_modulation() {
        let mut p = params(FilterMode::Lpf2, 0.0, 0.5);
        p.mod_depth = 1.0;
        let mut f = filter(p);

        let mut mods = Modulators::default();
        mods.set(ModSource::LfoTriangle, -1.0);
        f.update_coefficients(&mods);
        assert_eq!(f.cutoff(), CUTOFF_MIN_HZ);

        let mut p = params(FilterMode::Lpf2, 1.0, 0.5);
        p.mod_depth = 1.0;
        f.update_params(&p);
        mods.set(ModSource::LfoTriangle, 1.0);
        f.update_coefficients(&mods);
        assert_eq!(f.cutoff(), CUTOFF_MAX_HZ);
    }

    #[test]
    fn alpha0_never_exceeds_unity() {
        let mods = Modulators::default();
        let mut f = filter(params(FilterMode::Lpf4, 0.3, 1.0));
        f.update_coefficients(&mods);
        let before = f.alpha0();

        f.update_params(&params(FilterMode::Lpf4, 0.6, 1.0));
        f.update_coefficients(&mods);
        let after = f.alpha0();

        assert!(before <= 1.0 && after <= 1.0, "alpha0 {before} / {after}");
        assert!(after <= before, "higher cutoff should deepen feedback scaling");
    }

    #[test]
    fn saturation_bounds_hot_input() {
        for mode in [SaturationMode::Rational, SaturationMode::PadeTanh] {
            let mut p = params(FilterMode::Lpf4, 1.0, 0.0);
            p.saturation = 1.0;
            let mut f = filter(p);
            f.set_saturation_mode(mode);

            let mods = Modulators::default();
            let mut signal: Vec<f32> = sine(200.0, 2_048).iter().map(|s| s * 20.0).collect();
            for block in signal.chunks_mut(128) {
                f.render(block, &mods);
            }
            let peak = signal.iter().fold(0.0f32, |m, s| m.max(s.abs()));
            assert!(peak < 5.0, "{mode:?} let {peak} through");
        }
    }

    fn feedback_mode_output(saturation: f32) -> Vec<f32> {
        let mut p = params(FilterMode::Lpf4, 0.6, 0.9);
        p.saturation = saturation;
        let mut f = filter(p);
        f.set_saturation_mode(SaturationMode::Feedback);

        let mods = Modulators::default();
        let mut signal: Vec<f32> = sine(220.0, 2_048).iter().map(|s| s * 4.0).collect();
        for block in signal.chunks_mut(128) {
            f.render(block, &mods);
        }
        signal
    }

    #[test]
    fn feedback_saturation_follows_drive() {
        let max_diff = |a: &[f32], b: &[f32]| {
            a.iter().zip(b).fold(0.0f32, |m, (x, y)| m.max((x - y).abs()))
        };
        let clean = feedback_mode_output(0.0);
        let faint = feedback_mode_output(1e-5);
        let mild = feedback_mode_output(0.2);
        let hard = feedback_mode_output(1.0);

        assert!(max_diff(&clean, &faint) < 1e-2, "tiny drive should be near linear");
        assert!(max_diff(&clean, &mild) > 1e-3);
        assert!(max_diff(&mild, &hard) > 1e-3, "drive amount must matter");
    }

    #[test]
    fn key_tracking_raises_cutoff_for_high_notes() {
        let mut p = params(FilterMode::Lpf2, 0.5, 0.0);
        p.note_tracking = 1.0;
        let mut f = filter(p);
        let mods = Modulators::default();

        f.note_on(60);
        f.update_coefficients(&mods);
        let centre = f.cutoff();

        f.note_on(72);
        f.update_coefficients(&mods);
        assert!((f.cutoff() - centre * 2.0).abs() < 1.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut f = filter(params(FilterMode::Lpf4, 0.5, 0.5));
        let mods = Modulators::default();
        let mut signal = vec![1.0f32; 128];
        f.render(&mut signal, &mods);

        f.reset();
        let mut silence = vec![0.0f32; 128];
        f.render(&mut silence, &mods);
        assert!(silence.iter().all(|&s| s == 0.0));
    }
}
