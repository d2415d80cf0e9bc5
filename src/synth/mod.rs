// Purpose: Voice management, polyphony, MIDI handling
// This layer sits above the dsp modules and manages multiple voices

pub mod message;
pub mod poly;
pub mod voice;

pub use message::SynthMessage;
pub use poly::PolySynth;
pub use voice::{Voice, VoiceState};
