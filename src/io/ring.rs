//! Wait-free single-producer/single-consumer byte queue for incoming MIDI.
//!
//! The producer side lives with whatever receives bytes (a UART interrupt on
//! hardware, an input thread on a host). The consumer side is drained by the
//! scheduler at the top of every block. A push into a full queue drops the
//! byte; overrun is lossy and never reported.

use rtrb::{Consumer, Producer, RingBuffer};

/// Create a queue that holds exactly `capacity` bytes.
pub fn midi_ring(capacity: usize) -> (MidiWriter, MidiReader) {
    let (tx, rx) = RingBuffer::new(capacity);
    (MidiWriter { tx }, MidiReader { rx })
}

pub struct MidiWriter {
    tx: Producer<u8>,
}

impl MidiWriter {
    /// Queue one byte. Returns false if the queue was full and the byte was
    /// dropped.
    #[inline]
    pub fn write(&mut self, byte: u8) -> bool {
        self.tx.push(byte).is_ok()
    }

    pub fn free_slots(&self) -> usize {
        self.tx.slots()
    }

    /// True once the reading side has been dropped.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_abandoned()
    }
}

pub struct MidiReader {
    rx: Consumer<u8>,
}

impl MidiReader {
    #[inline]
    pub fn read(&mut self) -> Option<u8> {
        self.rx.pop().ok()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rx.slots()
    }

    /// Iterate until the queue is empty. Bytes pushed while draining are
    /// picked up too.
    pub fn drain(&mut self) -> impl Iterator<Item = u8> + '_ {
        std::iter::from_fn(move || self.read())
    }
}
