//! Format conversions at the edges of the engine: MIDI messages into synth
//! events on the way in, float samples into 16-bit DMA words on the way out.

use crate::{
    io::midi::{MidiMessage, CONTROL_CHANGE, NOTE_OFF, NOTE_ON},
    params::patch::{CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF},
    synth::message::SynthMessage,
};

/// Decode a completed MIDI message. Anything the synth does not act on
/// yields `None`.
pub fn midi_to_synth(msg: &MidiMessage) -> Option<SynthMessage> {
    if msg.len() < 3 {
        return None;
    }

    match msg.kind() {
        // Running-status senders use velocity 0 as note-off
        NOTE_ON if msg.data2() == 0 => Some(SynthMessage::NoteOff {
            note: msg.data1(),
            velocity: 0,
        }),
        NOTE_ON => Some(SynthMessage::NoteOn {
            note: msg.data1(),
            velocity: msg.data2(),
        }),
        NOTE_OFF => Some(SynthMessage::NoteOff {
            note: msg.data1(),
            velocity: msg.data2(),
        }),
        CONTROL_CHANGE => match msg.data1() {
            CC_ALL_NOTES_OFF | CC_ALL_SOUND_OFF => Some(SynthMessage::AllNotesOff),
            controller => Some(SynthMessage::ControlChange {
                controller,
                value: msg.data2(),
            }),
        },
        _ => None,
    }
}

/// Voice loudness scaling for a note-on velocity: 0.1 at the softest, 1.0 at
/// the hardest.
#[inline]
pub fn velocity_factor(velocity: u8) -> f32 {
    velocity.min(127) as f32 / 127.0 * 0.9 + 0.1
}

/// Full-scale signed 32-bit sample for a float in [-1, 1].
#[inline]
pub fn float_to_i32(sample: f32) -> i32 {
    // `as` saturates out-of-range values
    (sample * i32::MAX as f32) as i32
}

/// Split a 32-bit sample into the (high, low) 16-bit words the I2S
/// peripheral shifts out.
#[inline]
pub fn split_words(sample: i32) -> (i16, i16) {
    ((sample >> 16) as i16, sample as i16)
}

/// Reassemble a sample from its (high, low) words.
#[inline]
pub fn join_words(high: i16, low: i16) -> i32 {
    ((high as i32) << 16) | (low as u16 as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_velocity_note_on_is_note_off() {
        let msg = MidiMessage::new(&[0x93, 60, 0]);
        assert_eq!(
            midi_to_synth(&msg),
            Some(SynthMessage::NoteOff { note: 60, velocity: 0 })
        );
    }

    #[test]
    fn note_messages_ignore_channel_nibble() {
        let on = MidiMessage::new(&[0x9A, 64, 90]);
        assert_eq!(
            midi_to_synth(&on),
            Some(SynthMessage::NoteOn { note: 64, velocity: 90 })
        );
        let off = MidiMessage::new(&[0x8A, 64, 30]);
        assert_eq!(
            midi_to_synth(&off),
            Some(SynthMessage::NoteOff { note: 64, velocity: 30 })
        );
    }

    #[test]
    fn channel_mode_controllers_release_everything() {
        for cc in [CC_ALL_NOTES_OFF, CC_ALL_SOUND_OFF] {
            let msg = MidiMessage::new(&[0xB0, cc, 0]);
            assert_eq!(midi_to_synth(&msg), Some(SynthMessage::AllNotesOff));
        }
    }

    #[test]
    fn unsupported_messages_are_ignored() {
        assert_eq!(midi_to_synth(&MidiMessage::new(&[0xF8])), None);
        assert_eq!(midi_to_synth(&MidiMessage::new(&[0xC0, 5])), None);
        assert_eq!(midi_to_synth(&MidiMessage::new(&[0xE0, 0, 64])), None);
    }

    #[test]
    fn velocity_factor_spans_tenth_to_unity() {
        assert!((velocity_factor(0) - 0.1).abs() < 1e-6);
        assert!((velocity_factor(127) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn sample_words_round_trip() {
        for sample in [0.0f32, 0.5, -0.5, 0.999, -1.0] {
            let value = float_to_i32(sample);
            let (hi, lo) = split_words(value);
            assert_eq!(join_words(hi, lo), value, "sample {sample}");
        }
        assert_eq!(float_to_i32(2.0), i32::MAX);
        assert_eq!(float_to_i32(-2.0), i32::MIN);
    }
}
