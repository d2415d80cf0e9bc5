//! Synth parameters: ids, storage, scaling and factory patches.

pub mod patch;
pub mod scale;
pub mod store;

pub use patch::{load_factory_patch, CcMap, FACTORY_PATCH_COUNT};
pub use store::{ParamStore, ParamStoreConfig};

/// Dense ids of every parameter the polyphonic synth reads.
///
/// The discriminant doubles as the slot index inside [`ParamStore`].
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Param {
    Osc1Wave,
    Osc1Octave,
    Osc1Semi,
    Osc1Cents,
    Osc1Level,
    Osc1ModSource,
    Osc1ModDepth,
    Osc1PulseWidth,

    Osc2Wave,
    Osc2Octave,
    Osc2Semi,
    Osc2Cents,
    Osc2Level,
    Osc2ModSource,
    Osc2ModDepth,
    Osc2PulseWidth,

    NoiseLevel,
    NoiseType,

    FilterCutoff,
    FilterResonance,
    FilterType,
    FilterModSource,
    FilterModDepth,
    FilterSaturation,
    FilterNoteTrack,

    AmpVolume,
    AmpModSource,
    AmpModDepth,

    AmpEnvAttack,
    AmpEnvDecay,
    AmpEnvSustain,
    AmpEnvRelease,
    AmpEnvVelSens,
    AmpEnvNoteTrack,

    ModEnvAttack,
    ModEnvDecay,
    ModEnvSustain,
    ModEnvRelease,
    ModEnvVelSens,
    ModEnvNoteTrack,
    ModEnvMode,

    LfoRate,
    LfoTriggerMode,
}

pub const PARAM_COUNT: usize = Param::ALL.len();

impl Param {
    pub const ALL: [Param; 43] = [
        Param::Osc1Wave,
        Param::Osc1Octave,
        Param::Osc1Semi,
        Param::Osc1Cents,
        Param::Osc1Level,
        Param::Osc1ModSource,
        Param::Osc1ModDepth,
        Param::Osc1PulseWidth,
        Param::Osc2Wave,
        Param::Osc2Octave,
        Param::Osc2Semi,
        Param::Osc2Cents,
        Param::Osc2Level,
        Param::Osc2ModSource,
        Param::Osc2ModDepth,
        Param::Osc2PulseWidth,
        Param::NoiseLevel,
        Param::NoiseType,
        Param::FilterCutoff,
        Param::FilterResonance,
        Param::FilterType,
        Param::FilterModSource,
        Param::FilterModDepth,
        Param::FilterSaturation,
        Param::FilterNoteTrack,
        Param::AmpVolume,
        Param::AmpModSource,
        Param::AmpModDepth,
        Param::AmpEnvAttack,
        Param::AmpEnvDecay,
        Param::AmpEnvSustain,
        Param::AmpEnvRelease,
        Param::AmpEnvVelSens,
        Param::AmpEnvNoteTrack,
        Param::ModEnvAttack,
        Param::ModEnvDecay,
        Param::ModEnvSustain,
        Param::ModEnvRelease,
        Param::ModEnvVelSens,
        Param::ModEnvNoteTrack,
        Param::ModEnvMode,
        Param::LfoRate,
        Param::LfoTriggerMode,
    ];

    #[inline]
    pub const fn id(self) -> u16 {
        self as u16
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl From<Param> for u16 {
    fn from(param: Param) -> u16 {
        param.id()
    }
}
