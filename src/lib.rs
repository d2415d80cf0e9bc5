pub mod dsp; // Oscillators, envelopes, filters, LFOs
pub mod engine; // Scheduler loop, hardware seam, config
pub mod io; // MIDI parsing, byte ring, output conversion
pub mod params; // Parameter store, scaling, factory patches
pub mod synth; // Voices and polyphonic allocation

pub const MAX_BLOCK_SIZE: usize = 2048;

/// Hard ceiling on simultaneously sounding voices.
pub const MAX_VOICES: usize = 8;
