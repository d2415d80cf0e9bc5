// Purpose - external interfaces, format conversions

pub mod converter;
pub mod midi;
pub mod ring;

pub use midi::{MidiChannel, MidiMessage, MidiParser};
pub use ring::{midi_ring, MidiReader, MidiWriter};
