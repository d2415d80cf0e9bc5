//! Per-voice DSP modules.
//!
//! Everything here is allocation-free after construction and operates on
//! blocks, making it safe to embed directly inside voice structs. Control
//! state (envelope level, LFO outputs) advances once per block; audio state
//! (oscillator phase, filter integrators) advances per sample.

/// Block gain stage and mix helpers.
pub mod amplify;
/// Block-rate exponential ADSR envelope generator.
pub mod envelope;
/// Zero-delay-feedback 4-pole ladder filter with selectable taps.
pub mod filter;
/// Block-rate LFO writing five waveforms plus sample & hold.
pub mod lfo;
/// Per-voice modulation source table.
pub mod modulation;
/// Gated white and pink noise source.
pub mod noise;
/// Band-limited triangle, saw and pulse oscillators.
pub mod oscillator;

pub use envelope::EnvelopeState;
pub use modulation::{ModSource, Modulators};
