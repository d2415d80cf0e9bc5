//! Byte-stream behaviour of the MIDI input path: ring, parser and dispatch.

use frugi_dsp::io::{
    converter::midi_to_synth,
    midi::{MidiChannel, MidiParser, TIMING_CLOCK},
    midi_ring,
};
use frugi_dsp::synth::SynthMessage;

fn feed(parser: &mut MidiParser, bytes: &[u8]) -> Vec<Vec<u8>> {
    bytes
        .iter()
        .filter_map(|&b| parser.parse(b).map(|m| m.bytes().to_vec()))
        .collect()
}

#[test]
fn running_status_stream_yields_one_message_per_pair() {
    let mut parser = MidiParser::default();
    let stream = [0x90, 60, 100, 62, 90, 64, 80, 0xB0, 74, 10, 74, 20];

    assert_eq!(
        feed(&mut parser, &stream),
        vec![
            vec![0x90, 60, 100],
            vec![0x90, 62, 90],
            vec![0x90, 64, 80],
            vec![0xB0, 74, 10],
            vec![0xB0, 74, 20],
        ]
    );
}

#[test]
fn clock_between_data_bytes_is_transparent() {
    let mut parser = MidiParser::default();
    let stream = [0x92, 60, TIMING_CLOCK, 100, TIMING_CLOCK];

    assert_eq!(
        feed(&mut parser, &stream),
        vec![vec![TIMING_CLOCK], vec![0x92, 60, 100], vec![TIMING_CLOCK]]
    );
}

#[test]
fn sysex_dump_is_swallowed() {
    let mut parser = MidiParser::default();
    let mut stream = vec![0xF0, 0x7E, 0x00, 0x06, 0x01, 0x90, 0x40];
    stream.push(0xF7);
    assert!(feed(&mut parser, &stream).is_empty());

    // Ready for a fresh message afterwards
    assert_eq!(feed(&mut parser, &[0x80, 60, 0]), vec![vec![0x80, 60, 0]]);
}

#[test]
fn other_channels_are_ignored_when_filtered() {
    let mut parser = MidiParser::new(MidiChannel::Channel(10));
    let stream = [0x99, 36, 127, 0x90, 60, 100, 0x99, 38, 90];

    assert_eq!(
        feed(&mut parser, &stream),
        vec![vec![0x99, 36, 127], vec![0x99, 38, 90]]
    );
}

#[test]
fn ring_then_parser_then_dispatch() {
    let (mut tx, mut rx) = midi_ring(16);
    for byte in [0x90, 60, 100, 60, 0, 0xB0, 123, 0] {
        assert!(tx.write(byte));
    }

    let mut parser = MidiParser::default();
    let events: Vec<SynthMessage> = rx
        .drain()
        .filter_map(|b| parser.parse(b).and_then(midi_to_synth))
        .collect();

    assert_eq!(
        events,
        vec![
            SynthMessage::NoteOn { note: 60, velocity: 100 },
            SynthMessage::NoteOff { note: 60, velocity: 0 },
            SynthMessage::AllNotesOff,
        ]
    );
}

#[test]
fn overrun_drops_newest_bytes() {
    let (mut tx, mut rx) = midi_ring(3);
    for byte in [0x90, 60, 100, 0x80] {
        tx.write(byte);
    }

    let mut parser = MidiParser::default();
    let parsed: Vec<_> = rx.drain().filter_map(|b| parser.parse(b).copied()).collect();
    assert_eq!(parsed.len(), 1);
    assert_eq!(parsed[0].bytes(), &[0x90, 60, 100]);
}
