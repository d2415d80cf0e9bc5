//! Incremental MIDI byte parser with running status and real-time interleaving.

/*
MIDI Byte Stream Parsing
========================

MIDI arrives one byte at a time over a 31250 baud serial line. The parser
turns that stream into complete messages without ever blocking or
allocating.

Vocabulary
----------

  status byte     Top bit set (0x80..=0xFF). Starts a message and names its
                  type; for channel messages the low nibble is the channel.

  data byte       Top bit clear (0x00..=0x7F). Arguments of a message.

  running status  A sender may omit the status byte when it repeats. After
                  `90 3C 64`, the bytes `3E 64` are a second note-on.

  real-time       0xF8..=0xFF (top five bits 11111). Clock, start, stop...
                  They may appear BETWEEN the bytes of any other message and
                  must not disturb it.

  sysex           0xF0 ... 0xF7. Arbitrary-length manufacturer data. Ignored
                  here: every byte up to the terminator is dropped.


Message Lengths
---------------

    status   meaning               data bytes   emitted as
    ──────   ───────────────────   ──────────   ──────────
    8n       note off              2            3 bytes
    9n       note on               2            3 bytes
    An       poly pressure         2            3 bytes
    Bn       control change        2            3 bytes
    Cn       program change        1            2 bytes
    Dn       channel pressure      1            2 bytes
    En       pitch bend            2            3 bytes
    F1       time code quarter     1            2 bytes, status invalidated
    F2       song position         2            3 bytes, status invalidated
    F3       song select           1            2 bytes, status invalidated
    F4..F7   tune request class    0            1 byte
    F8..FF   real-time             0            1 byte, out of band


State Machine
-------------

    byte ──→ real-time? ──yes──→ emit [byte] (state untouched)
               │no
               ↓
             in sysex? ──yes──→ F7 ends it, everything else dropped
               │no
               ↓
             status? ──yes──→ running = byte
               │no             F0 → sysex, F4..F7 → emit [byte]
               ↓
             wrong channel? ──yes──→ drop
               │no
               ↓
             second data byte? ──yes──→ emit [running, d1, d2]
               │no
               ↓
             dispatch on running status (table above)

The emitted message lives inside the parser and is borrowed by the caller
until the next `parse` call.
*/

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub const NOTE_OFF: u8 = 0x80;
pub const NOTE_ON: u8 = 0x90;
pub const POLY_PRESSURE: u8 = 0xA0;
pub const CONTROL_CHANGE: u8 = 0xB0;
pub const PROGRAM_CHANGE: u8 = 0xC0;
pub const CHANNEL_PRESSURE: u8 = 0xD0;
pub const PITCH_BEND: u8 = 0xE0;
pub const SYSEX_START: u8 = 0xF0;
pub const TIME_CODE: u8 = 0xF1;
pub const SONG_POSITION: u8 = 0xF2;
pub const SONG_SELECT: u8 = 0xF3;
pub const SYSEX_END: u8 = 0xF7;
pub const TIMING_CLOCK: u8 = 0xF8;
pub const ACTIVE_SENSING: u8 = 0xFE;

const STATUS_INVALID: u8 = 0x00;

#[inline]
pub fn is_status(byte: u8) -> bool {
    byte & 0x80 != 0
}

#[inline]
pub fn is_real_time(byte: u8) -> bool {
    byte >> 3 == 0x1F
}

/// F4..=F7: status-only system common messages.
#[inline]
fn is_single_byte(byte: u8) -> bool {
    byte >> 2 == 0x3D
}

/// Equal-tempered frequency of a MIDI note, A4 = 440 Hz.
pub fn note_to_freq(note: u8) -> f32 {
    440.0 * ((note as f32 - 69.0) / 12.0).exp2()
}

/// Which channel the parser listens to.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MidiChannel {
    #[default]
    Omni,
    /// 1-based channel number, 1..=16.
    Channel(u8),
}

impl MidiChannel {
    /// Whether a channel-voice status byte passes this filter.
    #[inline]
    pub fn accepts(self, status: u8) -> bool {
        match self {
            MidiChannel::Omni => true,
            MidiChannel::Channel(ch) => status & 0x0F == ch.wrapping_sub(1) & 0x0F,
        }
    }
}

/// One complete message, 1 to 3 bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MidiMessage {
    data: [u8; 3],
    len: usize,
}

impl MidiMessage {
    pub fn new(bytes: &[u8]) -> Self {
        let mut msg = Self::default();
        let len = bytes.len().min(3);
        msg.data[..len].copy_from_slice(&bytes[..len]);
        msg.len = len;
        msg
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn status(&self) -> u8 {
        self.data[0]
    }

    /// Status with the channel nibble removed for channel messages.
    pub fn kind(&self) -> u8 {
        if self.data[0] < SYSEX_START {
            self.data[0] & 0xF0
        } else {
            self.data[0]
        }
    }

    pub fn data1(&self) -> u8 {
        self.data[1]
    }

    pub fn data2(&self) -> u8 {
        self.data[2]
    }
}

/// Byte-at-a-time parser for one MIDI input port.
pub struct MidiParser {
    channel: MidiChannel,
    running_status: u8,
    third_byte_expected: bool,
    sysex_active: bool,
    message: MidiMessage,
    real_time: MidiMessage,
}

impl MidiParser {
    pub fn new(channel: MidiChannel) -> Self {
        Self {
            channel,
            running_status: STATUS_INVALID,
            third_byte_expected: false,
            sysex_active: false,
            message: MidiMessage::default(),
            real_time: MidiMessage::default(),
        }
    }

    pub fn set_channel(&mut self, channel: MidiChannel) {
        self.channel = channel;
    }

    pub fn channel(&self) -> MidiChannel {
        self.channel
    }

    pub fn reset(&mut self) {
        self.running_status = STATUS_INVALID;
        self.third_byte_expected = false;
        self.sysex_active = false;
    }

    /// Feed one byte. Returns the message it completed, if any.
    pub fn parse(&mut self, byte: u8) -> Option<&MidiMessage> {
        if is_real_time(byte) {
            self.real_time = MidiMessage::new(&[byte]);
            return Some(&self.real_time);
        }

        if self.sysex_active {
            if byte == SYSEX_END {
                self.sysex_active = false;
            }
            return None;
        }

        if is_status(byte) {
            return self.on_status(byte);
        }

        self.on_data(byte)
    }

    fn on_status(&mut self, byte: u8) -> Option<&MidiMessage> {
        self.running_status = byte;
        self.third_byte_expected = false;

        if byte == SYSEX_START {
            self.sysex_active = true;
            return None;
        }

        if is_single_byte(byte) {
            self.message = MidiMessage::new(&[byte]);
            return Some(&self.message);
        }

        None
    }

    fn on_data(&mut self, byte: u8) -> Option<&MidiMessage> {
        let status = self.running_status;

        // Channel filtering applies to channel-voice messages only
        if status >= NOTE_OFF && status < SYSEX_START && !self.channel.accepts(status) {
            return None;
        }

        if self.third_byte_expected {
            self.third_byte_expected = false;
            self.message.data[2] = byte;
            self.message.len = 3;
            return Some(&self.message);
        }

        let kind = if status < SYSEX_START { status & 0xF0 } else { status };
        match kind {
            NOTE_OFF | NOTE_ON | POLY_PRESSURE | CONTROL_CHANGE | PITCH_BEND => {
                self.start_message(status, byte);
                self.third_byte_expected = true;
                None
            }
            PROGRAM_CHANGE | CHANNEL_PRESSURE => {
                self.start_message(status, byte);
                Some(&self.message)
            }
            SONG_POSITION => {
                // Two data bytes, but no running status afterwards
                self.start_message(status, byte);
                self.third_byte_expected = true;
                self.running_status = STATUS_INVALID;
                None
            }
            TIME_CODE | SONG_SELECT => {
                self.start_message(status, byte);
                self.running_status = STATUS_INVALID;
                Some(&self.message)
            }
            _ => {
                self.running_status = STATUS_INVALID;
                None
            }
        }
    }

    fn start_message(&mut self, status: u8, data1: u8) {
        self.message = MidiMessage::new(&[status, data1]);
    }
}

impl Default for MidiParser {
    fn default() -> Self {
        Self::new(MidiChannel::Omni)
    }
}
