//! Computer keyboard to MIDI bytes
//!
//! Terminals only report key presses, so keys latch: the first press sends a
//! note-on, the next press of the same key sends the note-off.

use std::collections::BTreeSet;

use frugi_dsp::{
    io::midi::{CONTROL_CHANGE, NOTE_OFF, NOTE_ON},
    params::patch::CC_ALL_NOTES_OFF,
};

/// Two rows laid out like a piano: the home row plays white keys, the row
/// above plays black keys.
pub const KEY_MAP: [(char, u8); 15] = [
    ('a', 0),
    ('w', 1),
    ('s', 2),
    ('e', 3),
    ('d', 4),
    ('f', 5),
    ('t', 6),
    ('g', 7),
    ('y', 8),
    ('h', 9),
    ('u', 10),
    ('j', 11),
    ('k', 12),
    ('o', 13),
    ('l', 14),
];

const MIN_OCTAVE: i8 = 1;
const MAX_OCTAVE: i8 = 7;

pub struct Keyboard {
    octave: i8,
    velocity: u8,
    held: BTreeSet<u8>,
}

impl Keyboard {
    pub fn new() -> Self {
        Self {
            octave: 4,
            velocity: 100,
            held: BTreeSet::new(),
        }
    }

    /// Toggle the note under `key`. Returns the message to send, or `None`
    /// if the key is not mapped.
    pub fn press(&mut self, key: char) -> Option<[u8; 3]> {
        let semitone = KEY_MAP
            .iter()
            .find(|(k, _)| *k == key.to_ascii_lowercase())
            .map(|&(_, s)| s)?;

        let note = (self.octave as i16 + 1) * 12 + semitone as i16;
        let note = u8::try_from(note).ok().filter(|&n| n <= 127)?;

        if self.held.remove(&note) {
            Some([NOTE_OFF, note, 0])
        } else {
            self.held.insert(note);
            Some([NOTE_ON, note, self.velocity])
        }
    }

    /// Forget every latched note and return the all-notes-off message.
    pub fn release_all(&mut self) -> [u8; 3] {
        self.held.clear();
        [CONTROL_CHANGE, CC_ALL_NOTES_OFF, 0]
    }

    pub fn octave_down(&mut self) {
        self.octave = (self.octave - 1).max(MIN_OCTAVE);
    }

    pub fn octave_up(&mut self) {
        self.octave = (self.octave + 1).min(MAX_OCTAVE);
    }

    pub fn octave(&self) -> i8 {
        self.octave
    }

    pub fn held(&self) -> impl Iterator<Item = u8> + '_ {
        self.held.iter().copied()
    }
}

/// Note name with octave, middle C is C4.
pub fn note_name(note: u8) -> String {
    const NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];
    format!("{}{}", NAMES[note as usize % 12], note as i16 / 12 - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_latch() {
        let mut kb = Keyboard::new();
        assert_eq!(kb.press('a'), Some([NOTE_ON, 60, 100]));
        assert_eq!(kb.held().collect::<Vec<_>>(), vec![60]);
        assert_eq!(kb.press('A'), Some([NOTE_OFF, 60, 0]));
        assert_eq!(kb.held().count(), 0);
    }

    #[test]
    fn unmapped_key_sends_nothing() {
        assert_eq!(Keyboard::new().press('z'), None);
    }

    #[test]
    fn octave_shift_moves_notes() {
        let mut kb = Keyboard::new();
        kb.octave_up();
        assert_eq!(kb.press('a'), Some([NOTE_ON, 72, 100]));
        for _ in 0..10 {
            kb.octave_down();
        }
        assert_eq!(kb.octave(), MIN_OCTAVE);
    }

    #[test]
    fn names() {
        assert_eq!(note_name(60), "C4");
        assert_eq!(note_name(69), "A4");
        assert_eq!(note_name(61), "C#4");
    }
}
