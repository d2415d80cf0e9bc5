use crate::params::scale::{to_bool, to_int, to_power};

/*
ADSR Envelope Implementation
============================

This module implements a block-rate exponential ADSR envelope generator. It
drives the amplifier of every voice and, as a second instance, a general
purpose modulation source.

Vocabulary
----------

  level       The envelope's internal value (0.0 to 1.0). The output handed to
              consumers is `level` pushed through the selected mode transform.

  stage       Which phase of the envelope we're in: Off, Attack, Decay,
              Sustain, Release, or Shutdown.

  block rate  The state machine advances ONCE per render call, not once per
              sample. At 48 kHz with 128-sample blocks that is 375 updates per
              second, plenty for amplitude contours and far cheaper.

  TCO         "Target coefficient overshoot". An exponential curve only
              approaches its target asymptotically; aiming slightly PAST the
              target makes it cross in finite time. Small TCO = curvier.

  RTZ         Return to zero. A forced linear fade used when a voice is
              stolen: the level reaches zero within a single block.


The Shape: Exponential Segments
-------------------------------

  Level
    1.0 ┐    ╭╮
        │   ╭╯╰╮
    S   │  ╭╯   ╰────────────╮
        │ ╭╯                 ╰╮
    0.0 └─╯────────────────────╰──→ Blocks
         Attack Decay Sustain Release

Each segment follows the one-pole recurrence

    level = level × coeff + overshoot

with, for a segment lasting `blocks` render calls,

    coeff     = exp(-ln((1 + tco) / tco) / blocks)

    attack    overshoot = (1 + tco)       × (1 - coeff)    tco = e^-1.5
    decay     overshoot = (sustain - tco) × (1 - coeff)    tco = e^-4.95
    release   overshoot = -tco            × (1 - coeff)    tco = e^-4.95

and `blocks = time_ms × scaler × sample_rate / (1000 × block_size)`.

Attack uses a large TCO so it looks nearly linear (like an analog attack);
decay and release use a tiny TCO so they look properly exponential.


Tracking
--------

  velocity tracking   attack scaler = 1 - velocity / 127
                      harder hits → faster attack
  note tracking       decay scaler  = 1 - note / 127
                      higher notes → faster decay (piano-like)


The State Machine
-----------------

    ┌──────────────────────────────────────────────────────────────┐
    │                                                              │
    │   ┌─────┐  note_on  ┌────────┐ level≥1  ┌───────┐ level≤S    │
    │   │ Off │ ────────→ │ Attack │ ───────→ │ Decay │ ───────┐   │
    │   └─────┘           └────────┘          └───────┘        │   │
    │     ↑ ↑                  │ note_off         │ note_off   ↓   │
    │     │ │                  ↓                  ↓        ┌─────┐ │
    │     │ │  level≤0    ┌─────────┐ ←────────────────────│ Sus │ │
    │     │ └──────────── │ Release │          note_off    └─────┘ │
    │     │               └─────────┘                              │
    │     │  level≤0      ┌──────────┐                             │
    │     └────────────── │ Shutdown │ ←── rtz() from any stage    │
    │                     └──────────┘                             │
    └──────────────────────────────────────────────────────────────┘


Output Modes
------------

    Normal           level
    Biased           level - sustain       (centred on the sustain level)
    Inverted         1 - level
    BiasedInverted   (1 - level) - sustain
*/

pub const ATTACK_MS_MIN: f32 = 1.0;
pub const ATTACK_MS_MAX: f32 = 10_000.0;
pub const DECAY_MS_MIN: f32 = 2.0;
pub const DECAY_MS_MAX: f32 = 15_000.0;
pub const RELEASE_MS_MIN: f32 = 2.0;
pub const RELEASE_MS_MAX: f32 = 30_000.0;
const TIME_CURVE_EXP: f32 = 1.5;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeState {
    Off,
    Attack,
    Decay,
    Sustain,
    Release,
    Shutdown, // Forced fade after rtz()
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnvelopeMode {
    #[default]
    Normal,
    Biased,
    Inverted,
    BiasedInverted,
}

impl EnvelopeMode {
    const ALL: [EnvelopeMode; 4] = [
        EnvelopeMode::Normal,
        EnvelopeMode::Biased,
        EnvelopeMode::Inverted,
        EnvelopeMode::BiasedInverted,
    ];

    pub fn from_param(norm: f32) -> Self {
        Self::ALL[to_int(norm, 0, 3).clamp(0, 3) as usize]
    }

    #[inline]
    fn transform(self, level: f32, sustain: f32) -> f32 {
        match self {
            EnvelopeMode::Normal => level,
            EnvelopeMode::Biased => level - sustain,
            EnvelopeMode::Inverted => 1.0 - level,
            EnvelopeMode::BiasedInverted => (1.0 - level) - sustain,
        }
    }
}

/// Normalized envelope settings as they come out of the parameter store.
#[derive(Debug, Clone, Copy)]
pub struct EnvelopeParams {
    pub attack: f32,
    pub decay: f32,
    pub sustain: f32,
    pub release: f32,
    pub mode: f32,
    pub note_tracking: f32,
    pub velocity_tracking: f32,
}

#[derive(Debug, Clone, Copy, Default)]
struct Segment {
    coeff: f32,
    overshoot: f32,
}

pub struct Envelope {
    // Settings in engineering units
    attack_ms: f32,
    decay_ms: f32,
    sustain: f32,
    release_ms: f32,
    mode: EnvelopeMode,
    note_tracking: bool,
    velocity_tracking: bool,

    attack_tco: f32,
    decay_tco: f32,
    release_tco: f32,

    // Scalers captured at note-on
    attack_scaler: f32,
    decay_scaler: f32,

    attack: Segment,
    decay: Segment,
    release: Segment,
    shutdown_step: f32,

    sample_rate: f32,
    block_size: usize,

    state: EnvelopeState,
    level: f32,
    output: f32,
}

impl Envelope {
    pub fn new(sample_rate: f32, block_size: usize) -> Self {
        let decay_tco = (-4.95f32).exp();
        let mut env = Self {
            attack_ms: ATTACK_MS_MIN,
            decay_ms: DECAY_MS_MIN,
            sustain: 1.0,
            release_ms: RELEASE_MS_MIN,
            mode: EnvelopeMode::Normal,
            note_tracking: false,
            velocity_tracking: false,

            attack_tco: (-1.5f32).exp(),
            decay_tco,
            release_tco: decay_tco,

            attack_scaler: 1.0,
            decay_scaler: 1.0,

            attack: Segment::default(),
            decay: Segment::default(),
            release: Segment::default(),
            shutdown_step: 0.0,

            sample_rate,
            block_size,

            state: EnvelopeState::Off,
            level: 0.0,
            output: 0.0,
        };
        env.recalc_coefficients();
        env
    }

    /// Map normalized settings onto times and recompute the segment curves.
    pub fn update_params(&mut self, params: &EnvelopeParams) {
        self.attack_ms = to_power(params.attack, ATTACK_MS_MIN, ATTACK_MS_MAX, TIME_CURVE_EXP);
        self.decay_ms = to_power(params.decay, DECAY_MS_MIN, DECAY_MS_MAX, TIME_CURVE_EXP);
        self.sustain = params.sustain;
        self.release_ms =
            to_power(params.release, RELEASE_MS_MIN, RELEASE_MS_MAX, TIME_CURVE_EXP);
        self.mode = EnvelopeMode::from_param(params.mode);
        self.note_tracking = to_bool(params.note_tracking);
        self.velocity_tracking = to_bool(params.velocity_tracking);

        self.recalc_coefficients();
    }

    /// Gate high: capture tracking scalers and start the attack from the
    /// current level.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        self.attack_scaler = if self.velocity_tracking {
            1.0 - velocity.min(127) as f32 / 127.0
        } else {
            1.0
        };
        self.decay_scaler = if self.note_tracking {
            1.0 - note.min(127) as f32 / 127.0
        } else {
            1.0
        };

        self.recalc_coefficients();
        self.state = EnvelopeState::Attack;
    }

    /// Gate low: release from wherever we are.
    pub fn note_off(&mut self) {
        self.state = if self.level > 0.0 {
            EnvelopeState::Release
        } else {
            EnvelopeState::Off
        };
    }

    /// Force a linear fade that reaches zero within one block.
    pub fn rtz(&mut self) {
        if self.level > 0.0 {
            let block_seconds = self.block_size as f32 / self.sample_rate;
            self.shutdown_step = -(self.level / block_seconds.max(1.0));
            self.state = EnvelopeState::Shutdown;
        } else {
            // Nothing to fade; a stolen voice must still reach Off.
            self.level = 0.0;
            self.state = EnvelopeState::Off;
        }
    }

    /// Advance the state machine by one block and return the transformed
    /// output.
    pub fn render(&mut self) -> f32 {
        match self.state {
            EnvelopeState::Off => {
                self.level = 0.0;
            }

            EnvelopeState::Attack => {
                self.level = self.level * self.attack.coeff + self.attack.overshoot;
                if self.level >= 1.0 || self.attack_ms <= 0.0 {
                    self.level = 1.0;
                    self.state = EnvelopeState::Decay;
                }
            }

            EnvelopeState::Decay => {
                self.level = self.level * self.decay.coeff + self.decay.overshoot;
                if self.level <= self.sustain || self.decay_ms <= 0.0 {
                    self.level = self.sustain;
                    self.state = EnvelopeState::Sustain;
                }
            }

            EnvelopeState::Sustain => {
                self.level = self.sustain;
            }

            EnvelopeState::Release => {
                self.level = self.level * self.release.coeff + self.release.overshoot;
                if self.level <= 0.0 || self.release_ms <= 0.0 {
                    self.level = 0.0;
                    self.state = EnvelopeState::Off;
                }
            }

            EnvelopeState::Shutdown => {
                self.level += self.shutdown_step;
                if self.level <= 0.0 {
                    self.level = 0.0;
                    self.state = EnvelopeState::Off;
                }
            }
        }

        self.output = self.mode.transform(self.level, self.sustain);
        self.output
    }

    pub fn reset(&mut self) {
        self.state = EnvelopeState::Off;
        self.level = 0.0;
        self.output = 0.0;
    }

    pub fn is_off(&self) -> bool {
        self.state == EnvelopeState::Off
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Most recent transformed output.
    pub fn output(&self) -> f32 {
        self.output
    }

    pub fn state(&self) -> EnvelopeState {
        self.state
    }

    pub fn mode(&self) -> EnvelopeMode {
        self.mode
    }

    fn recalc_coefficients(&mut self) {
        let blocks_per_ms = self.sample_rate / (1000.0 * self.block_size as f32);

        let attack_blocks = self.attack_ms * self.attack_scaler * blocks_per_ms;
        let decay_blocks = self.decay_ms * self.decay_scaler * blocks_per_ms;
        let release_blocks = self.release_ms * blocks_per_ms;

        let attack_coeff = segment_coeff(self.attack_tco, attack_blocks);
        self.attack = Segment {
            coeff: attack_coeff,
            overshoot: (1.0 + self.attack_tco) * (1.0 - attack_coeff),
        };

        let decay_coeff = segment_coeff(self.decay_tco, decay_blocks);
        self.decay = Segment {
            coeff: decay_coeff,
            overshoot: (self.sustain - self.decay_tco) * (1.0 - decay_coeff),
        };

        let release_coeff = segment_coeff(self.release_tco, release_blocks);
        self.release = Segment {
            coeff: release_coeff,
            overshoot: -self.release_tco * (1.0 - release_coeff),
        };
    }
}

/// Per-block multiplier for a segment lasting `blocks` render calls.
///
/// Zero-length segments (full velocity with tracking on) give a coefficient
/// of zero, which jumps straight to the overshoot target.
#[inline]
fn segment_coeff(tco: f32, blocks: f32) -> f32 {
    if blocks <= 0.0 {
        return 0.0;
    }
    (-((1.0 + tco) / tco).ln() / blocks).exp()
}
