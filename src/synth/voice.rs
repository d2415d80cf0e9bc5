//! One voice: two oscillators, a noise source, a ladder filter, two
//! envelopes, an LFO and an amplifier, rendered as a mono block.

/*
Voice Lifecycle
===============

    ┌──────┐ note_on   ┌──────────┐ note_off  ┌───────────┐
    │ Idle │ ────────→ │ Sounding │ ────────→ │ Releasing │
    └──────┘           └──────────┘           └───────────┘
       ↑                  │    ↑                    │
       │                  │    │ pending note       │ amp env reaches Off
       │        note_on   │    │ takes over         │
       │       (stolen)   ↓    │                    │
       │              ┌──────────┐                  │
       │              │ Stealing │                  │
       │              └──────────┘                  │
       │                  │ pending note released   │
       └──────────────────┴─────────────────────────┘

A steal never cuts the old note off mid-waveform. The new note is parked as
"pending" and the amp envelope is sent to zero over one block (RTZ); when the
envelope reports Off the pending note is promoted and every module is
note-on'd with it.


Render Chain
------------

    LFO ──→ mods
                 ┌──────┐   ┌──────┐   ┌────────┐   ┌─────┐
    osc1  (set) ─┤ +    ├──→│filter├──→│  amp   ├──→│ out │
    osc2  (add) ─┤      │   └──────┘   └────────┘   └─────┘
    noise (add) ─┤      │       ↑           ↑
                 └──────┘    mod env     amp env

The envelopes advance once per block and publish their outputs into the
modulation table before the filter and amplifier read it.
*/

use crate::{
    dsp::{
        amplify::Amplifier,
        envelope::{Envelope, EnvelopeParams, EnvelopeState},
        filter::{FilterParams, LadderFilter, SaturationMode},
        lfo::{Lfo, DEFAULT_SEED},
        modulation::{ModSource, Modulators},
        noise::Noise,
        oscillator::{OscOutput, Oscillator, OscillatorParams},
    },
    io::{converter::velocity_factor, midi::note_to_freq},
    params::Param,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceState {
    Idle,      // Available for allocation
    Sounding,  // Gate held, envelope in attack/decay/sustain
    Releasing, // Key released, envelope in release phase
    Stealing,  // Fading out to make room for a pending note
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct Note {
    note: u8,
    velocity: u8,
    pitch: f32,
    velocity_factor: f32,
}

impl Note {
    fn new(note: u8, velocity: u8) -> Self {
        Self {
            note,
            velocity,
            pitch: note_to_freq(note),
            velocity_factor: velocity_factor(velocity),
        }
    }
}

pub struct Voice {
    id: usize,
    age: u32,
    note_on: bool,
    pending: Option<Note>,
    current: Note,
    block_size: usize,

    samples: Vec<f32>,
    mods: Modulators,

    osc1: Oscillator,
    osc2: Oscillator,
    noise: Noise,
    filter: LadderFilter,
    amp_env: Envelope,
    mod_env: Envelope,
    lfo: Lfo,
    amp: Amplifier,
}

impl Voice {
    pub fn new(id: usize, sample_rate: f32, block_size: usize) -> Self {
        // Decorrelate sample & hold between voices
        let seed = DEFAULT_SEED ^ (id as u32).wrapping_mul(0x9E37_79B9);

        Self {
            id,
            age: 0,
            note_on: false,
            pending: None,
            current: Note::default(),
            block_size,

            samples: vec![0.0; block_size],
            mods: Modulators::default(),

            osc1: Oscillator::new(sample_rate, OscOutput::Replace),
            osc2: Oscillator::new(sample_rate, OscOutput::Mix),
            noise: Noise::with_seed(seed),
            filter: LadderFilter::new(sample_rate),
            amp_env: Envelope::new(sample_rate, block_size),
            mod_env: Envelope::new(sample_rate, block_size),
            lfo: Lfo::with_seed(sample_rate, seed),
            amp: Amplifier::new(),
        }
    }

    /// Start `note`, or park it behind a fast fade if a different note is
    /// still sounding.
    pub fn note_on(&mut self, note: u8, velocity: u8) {
        if let Some(pending) = self.pending {
            if pending.note == note {
                return;
            }
        }

        if !self.note_on {
            self.note_on = true;
            self.age = 0;
            self.start(Note::new(note, velocity));
        } else if self.pending.is_none() && self.current.note == note {
            // Same key again: restart the envelopes in place
            self.start(Note::new(note, velocity));
        } else {
            self.pending = Some(Note::new(note, velocity));
            self.amp_env.rtz();
        }
    }

    /// Release whatever this voice is playing for its key.
    ///
    /// A voice that is stealing drops its pending note instead; the fade then
    /// finishes and the voice goes idle.
    pub fn note_off(&mut self) {
        if !self.note_on {
            return;
        }

        if self.pending.take().is_some() {
            return;
        }

        self.amp_env.note_off();
        self.mod_env.note_off();
    }

    /// Render one block into the voice buffer. Returns false when the voice is
    /// idle and produced nothing.
    pub fn render(&mut self) -> bool {
        if !self.note_on {
            return false;
        }

        if self.amp_env.is_off() {
            match self.pending.take() {
                Some(next) => {
                    self.age = 0;
                    self.start(next);
                }
                None => {
                    self.free();
                    return false;
                }
            }
        }

        let block = &mut self.samples[..self.block_size];

        self.lfo.render(self.block_size, &mut self.mods);
        self.osc1.render(block, &self.mods);
        self.osc2.render(block, &self.mods);
        self.noise.render(block);

        let amp_level = self.amp_env.render() * self.current.velocity_factor;
        self.mods.set(ModSource::AmpEnvelope, amp_level);
        let mod_level = self.mod_env.render();
        self.mods.set(ModSource::ModEnvelope, mod_level);

        self.filter.render(block, &self.mods);
        self.amp.render(block, &self.mods);

        true
    }

    /// Pull this voice's settings out of a parameter snapshot.
    pub fn update_params(&mut self, params: &[f32]) {
        let p = |param: Param| params.get(param.index()).copied().unwrap_or(0.0);

        self.osc1.update_params(&OscillatorParams {
            wave: p(Param::Osc1Wave),
            octave: p(Param::Osc1Octave),
            semi: p(Param::Osc1Semi),
            cents: p(Param::Osc1Cents),
            level: p(Param::Osc1Level),
            mod_source: p(Param::Osc1ModSource),
            mod_depth: p(Param::Osc1ModDepth),
            pulse_width: p(Param::Osc1PulseWidth),
        });
        self.osc2.update_params(&OscillatorParams {
            wave: p(Param::Osc2Wave),
            octave: p(Param::Osc2Octave),
            semi: p(Param::Osc2Semi),
            cents: p(Param::Osc2Cents),
            level: p(Param::Osc2Level),
            mod_source: p(Param::Osc2ModSource),
            mod_depth: p(Param::Osc2ModDepth),
            pulse_width: p(Param::Osc2PulseWidth),
        });
        self.noise
            .update_params(p(Param::NoiseLevel), p(Param::NoiseType));
        self.filter.update_params(&FilterParams {
            mode: p(Param::FilterType),
            cutoff: p(Param::FilterCutoff),
            resonance: p(Param::FilterResonance),
            saturation: p(Param::FilterSaturation),
            mod_depth: p(Param::FilterModDepth),
            mod_source: p(Param::FilterModSource),
            note_tracking: p(Param::FilterNoteTrack),
        });
        self.amp.update_params(
            p(Param::AmpVolume),
            p(Param::AmpModSource),
            p(Param::AmpModDepth),
        );
        self.amp_env.update_params(&EnvelopeParams {
            attack: p(Param::AmpEnvAttack),
            decay: p(Param::AmpEnvDecay),
            sustain: p(Param::AmpEnvSustain),
            release: p(Param::AmpEnvRelease),
            mode: 0.0, // the amp envelope is always Normal
            note_tracking: p(Param::AmpEnvNoteTrack),
            velocity_tracking: p(Param::AmpEnvVelSens),
        });
        self.mod_env.update_params(&EnvelopeParams {
            attack: p(Param::ModEnvAttack),
            decay: p(Param::ModEnvDecay),
            sustain: p(Param::ModEnvSustain),
            release: p(Param::ModEnvRelease),
            mode: p(Param::ModEnvMode),
            note_tracking: p(Param::ModEnvNoteTrack),
            velocity_tracking: p(Param::ModEnvVelSens),
        });
        self.lfo
            .update_params(p(Param::LfoRate), p(Param::LfoTriggerMode));
    }

    pub fn set_saturation_mode(&mut self, mode: SaturationMode) {
        self.filter.set_saturation_mode(mode);
    }

    /// Age by one allocation.
    pub fn bump_age(&mut self) {
        self.age = self.age.saturating_add(1);
    }

    /// Return every module to its initial state and mark the voice idle.
    pub fn free(&mut self) {
        self.note_on = false;
        self.pending = None;
        self.osc1.note_off();
        self.osc2.note_off();
        self.osc1.reset();
        self.osc2.reset();
        self.noise.reset();
        self.filter.reset();
        self.amp_env.reset();
        self.mod_env.reset();
        self.lfo.reset();
        self.mods.clear();
        self.samples.fill(0.0);
    }

    pub fn state(&self) -> VoiceState {
        if !self.note_on {
            VoiceState::Idle
        } else if self.pending.is_some() {
            VoiceState::Stealing
        } else if matches!(
            self.amp_env.state(),
            EnvelopeState::Release | EnvelopeState::Shutdown | EnvelopeState::Off
        ) {
            VoiceState::Releasing
        } else {
            VoiceState::Sounding
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.note_on
    }

    /// True while a different note is waiting for this voice's fade to end.
    pub fn is_stealing(&self) -> bool {
        self.pending.is_some()
    }

    /// Whether a note-on/off for `note` belongs to this voice: the pending
    /// note while stealing, the current note otherwise.
    pub fn owns(&self, note: u8) -> bool {
        if !self.note_on {
            return false;
        }
        match self.pending {
            Some(pending) => pending.note == note,
            None => self.current.note == note,
        }
    }

    /// Whether a key release should land here. Voices already releasing have
    /// nothing left to release.
    pub fn accepts_release(&self, note: u8) -> bool {
        self.owns(note) && matches!(self.state(), VoiceState::Sounding | VoiceState::Stealing)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn age(&self) -> u32 {
        self.age
    }

    pub fn note(&self) -> u8 {
        self.current.note
    }

    pub fn pending_note(&self) -> Option<u8> {
        self.pending.map(|n| n.note)
    }

    pub fn velocity(&self) -> u8 {
        self.current.velocity
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples[..self.block_size]
    }

    pub fn envelope_level(&self) -> f32 {
        self.amp_env.level()
    }

    fn start(&mut self, note: Note) {
        self.current = note;
        self.osc1.note_on(note.pitch);
        self.osc2.note_on(note.pitch);
        self.noise.note_on();
        self.filter.note_on(note.note);
        self.amp_env.note_on(note.note, note.velocity);
        self.mod_env.note_on(note.note, note.velocity);
        self.lfo.note_on();
    }
}
