//! Factory patch bank and the controller-to-parameter map.

/*
Patches are stored as MIDI values (0..127), exactly what a controller would
send, and applied through `ParamStore::set_from_midi`. Loading a patch is two
passes:

    1. base patch   every parameter gets a sane default
    2. differential the selected bank entry overrides a handful of them

Enum parameters are encoded with `enum_to_midi(ordinal, max_ordinal)` so that
`scale::to_int` decodes them back to the same ordinal.
*/

use log::{info, warn};

use crate::{
    dsp::{
        envelope::EnvelopeMode,
        filter::FilterMode,
        lfo::LfoTrigger,
        modulation::{ModSource, MOD_SOURCE_COUNT},
        noise::NoiseType,
        oscillator::Waveform,
    },
    params::{scale::enum_to_midi, Param, ParamStore, PARAM_COUNT},
};

pub const FACTORY_PATCH_COUNT: usize = 8;

pub const CC_VOLUME: u8 = 7;
pub const CC_RESONANCE: u8 = 71;
pub const CC_CUTOFF: u8 = 74;
pub const CC_ALL_SOUND_OFF: u8 = 120;
pub const CC_ALL_NOTES_OFF: u8 = 123;

const OFF: u8 = 0;
const ON: u8 = 127;

const SAW: u8 = enum_to_midi(Waveform::Saw as u8, Waveform::Pulse as u8);
const LFO_TRIANGLE: u8 = enum_to_midi(ModSource::LfoTriangle as u8, MOD_SOURCE_COUNT as u8 - 1);
const LPF2: u8 = enum_to_midi(FilterMode::Lpf2 as u8, FilterMode::Hpf4 as u8);
const ENV_NORMAL: u8 = enum_to_midi(EnvelopeMode::Normal as u8, EnvelopeMode::BiasedInverted as u8);
const WHITE_NOISE: u8 = enum_to_midi(NoiseType::White as u8, NoiseType::Pink as u8);
const LFO_NOTE: u8 = enum_to_midi(LfoTrigger::Note as u8, LfoTrigger::Free as u8);

/// Default value for every parameter, indexed by id.
static BASE_PATCH: [(Param, u8); PARAM_COUNT] = [
    (Param::Osc1Wave, SAW),
    (Param::Osc1Octave, 64),
    (Param::Osc1Semi, 64),
    (Param::Osc1Cents, 64),
    (Param::Osc1Level, 64),
    (Param::Osc1ModSource, LFO_TRIANGLE),
    (Param::Osc1ModDepth, 0),
    (Param::Osc1PulseWidth, 64),
    (Param::Osc2Wave, SAW),
    (Param::Osc2Octave, 64),
    (Param::Osc2Semi, 64),
    (Param::Osc2Cents, 64),
    (Param::Osc2Level, 64),
    (Param::Osc2ModSource, LFO_TRIANGLE),
    (Param::Osc2ModDepth, 0),
    (Param::Osc2PulseWidth, 64),
    (Param::NoiseLevel, 0),
    (Param::NoiseType, WHITE_NOISE),
    (Param::FilterCutoff, 64),
    (Param::FilterResonance, 64),
    (Param::FilterType, LPF2),
    (Param::FilterModSource, LFO_TRIANGLE),
    (Param::FilterModDepth, 0),
    (Param::FilterSaturation, 0),
    (Param::FilterNoteTrack, OFF),
    (Param::AmpVolume, 127),
    (Param::AmpModSource, 0),
    (Param::AmpModDepth, 0),
    (Param::AmpEnvAttack, 0),
    (Param::AmpEnvDecay, 0),
    (Param::AmpEnvSustain, 127),
    (Param::AmpEnvRelease, 0),
    (Param::AmpEnvVelSens, OFF),
    (Param::AmpEnvNoteTrack, OFF),
    (Param::ModEnvAttack, 0),
    (Param::ModEnvDecay, 0),
    (Param::ModEnvSustain, 127),
    (Param::ModEnvRelease, 0),
    (Param::ModEnvVelSens, OFF),
    (Param::ModEnvNoteTrack, OFF),
    (Param::ModEnvMode, ENV_NORMAL),
    (Param::LfoRate, 0),
    (Param::LfoTriggerMode, LFO_NOTE),
];

/// Detuned saws through a mildly driven 2-pole, velocity on the amp.
const DETUNED_PLUCK: &[(Param, u8)] = &[
    (Param::Osc2Cents, 30),
    // short attack and decay, mid sustain, shortish release
    (Param::AmpEnvAttack, 5),
    (Param::AmpEnvDecay, 10),
    (Param::AmpEnvSustain, 64),
    (Param::AmpEnvRelease, 16),
    (Param::FilterType, LPF2),
    (Param::FilterResonance, 10),
    (Param::FilterSaturation, 64),
    (Param::AmpEnvVelSens, ON),
    (Param::AmpEnvNoteTrack, OFF),
];

static PATCH_BANK: [&[(Param, u8)]; FACTORY_PATCH_COUNT] =
    [DETUNED_PLUCK, &[], &[], &[], &[], &[], &[], &[]];

/// Controller assignments shared by every factory patch.
static CC_ASSIGNMENTS: &[(u8, Param)] = &[
    (20, Param::Osc1Wave),
    (21, Param::Osc1Octave),
    (22, Param::Osc1Semi),
    (23, Param::Osc1Cents),
    (24, Param::Osc1Level),
    (25, Param::Osc1ModSource),
    (26, Param::Osc1ModDepth),
    (30, Param::Osc2Wave),
    (31, Param::Osc2Octave),
    (32, Param::Osc2Semi),
    (33, Param::Osc2Cents),
    (34, Param::Osc2Level),
    (35, Param::Osc2ModSource),
    (36, Param::Osc2ModDepth),
    (40, Param::NoiseLevel),
    (41, Param::NoiseType),
    (42, Param::FilterType),
    (44, Param::FilterModSource),
    (46, Param::FilterModDepth),
    (47, Param::FilterSaturation),
    (CC_CUTOFF, Param::FilterCutoff),
    (CC_RESONANCE, Param::FilterResonance),
    (CC_VOLUME, Param::AmpVolume),
    (53, Param::AmpModSource),
    (54, Param::AmpModDepth),
    (55, Param::AmpEnvAttack),
    (56, Param::AmpEnvDecay),
    (57, Param::AmpEnvSustain),
    (58, Param::AmpEnvRelease),
    (60, Param::LfoRate),
    (61, Param::LfoTriggerMode),
    (84, Param::AmpEnvVelSens),
    (85, Param::AmpEnvNoteTrack),
];

/// Lookup table from controller number to parameter.
#[derive(Debug, Clone)]
pub struct CcMap([Option<Param>; 128]);

impl CcMap {
    pub fn empty() -> Self {
        Self([None; 128])
    }

    pub fn factory() -> Self {
        let mut map = Self::empty();
        for &(cc, param) in CC_ASSIGNMENTS {
            map.assign(cc, param);
        }
        map
    }

    pub fn assign(&mut self, cc: u8, param: Param) {
        if let Some(slot) = self.0.get_mut(cc as usize) {
            *slot = Some(param);
        }
    }

    #[inline]
    pub fn lookup(&self, cc: u8) -> Option<Param> {
        self.0.get(cc as usize).copied().flatten()
    }
}

impl Default for CcMap {
    fn default() -> Self {
        Self::factory()
    }
}

/// Write the base patch plus bank entry `patch_number` into `store` and
/// return the controller map that goes with it.
///
/// Out-of-range patch numbers load the base patch alone.
pub fn load_factory_patch(store: &mut ParamStore, patch_number: usize) -> CcMap {
    for &(param, value) in BASE_PATCH.iter() {
        store.set_from_midi(param, value);
    }

    match PATCH_BANK.get(patch_number) {
        Some(patch) => {
            for &(param, value) in patch.iter() {
                store.set_from_midi(param, value);
            }
            info!("loaded factory patch {patch_number}");
        }
        None => warn!("factory patch {patch_number} does not exist, using base patch"),
    }

    CcMap::factory()
}
