//! The boundary between the engine and whatever moves samples out and bytes
//! in.

/*
Double Buffer
=============

The transfer engine streams the whole buffer in a loop. Each time it
finishes one half it raises "buffer ready" for that half, and the
scheduler refills it while the other half is being played.

    word:  0                      4·B                     8·B
           ├───────── Ping ─────────┼───────── Pong ─────────┤
           │ frame 0 │ frame 1 │ …  │ frame 0 │ frame 1 │ …  │

    frame: ┌──────┬──────┬──────┬──────┐
           │ R hi │ R lo │ L hi │ L lo │   four 16-bit words = one
           └──────┴──────┴──────┴──────┘   32-bit stereo frame

B is the block size in frames. Right comes first, and each 32-bit sample is
sent high word first.


Notifications
-------------

    transfer-complete ──→ buffer_ready(half) ──→ [ slot ] ──→ scheduler wakes
                                                 bounded(1)

The slot holds at most one wake-up. A second notification before the
scheduler runs finds the slot full and collapses into the first; the latest
half index always wins.
*/

use std::sync::{
    atomic::{AtomicI16, AtomicU8, Ordering},
    Arc,
};

use crossbeam_channel::{Receiver, Sender, TrySendError};

use crate::{
    engine::{config::SampleRate, error::EngineError},
    io::{
        converter::{join_words, split_words},
        midi::ACTIVE_SENSING,
        ring::MidiWriter,
    },
};

const WORDS_PER_FRAME: usize = 4;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BufferHalf {
    Ping = 0,
    Pong = 1,
}

impl BufferHalf {
    pub fn from_index(index: u8) -> Self {
        if index == 0 {
            BufferHalf::Ping
        } else {
            BufferHalf::Pong
        }
    }

    pub fn other(self) -> Self {
        match self {
            BufferHalf::Ping => BufferHalf::Pong,
            BufferHalf::Pong => BufferHalf::Ping,
        }
    }
}

/// Interleaved 16-bit output words shared with the transfer engine.
///
/// Words are atomics so both sides can hold the buffer through an `Arc`; the
/// halves never overlap in time, so relaxed accesses are enough once the
/// buffer-ready notification has been received.
pub struct DmaBuffer {
    words: Box<[AtomicI16]>,
    block_size: usize,
}

impl DmaBuffer {
    pub fn new(block_size: usize) -> Self {
        let words = (0..block_size * 2 * WORDS_PER_FRAME)
            .map(|_| AtomicI16::new(0))
            .collect();
        Self { words, block_size }
    }

    /// Total words across both halves.
    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Frames per half.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn write_frame(&self, half: BufferHalf, frame: usize, left: i32, right: i32) {
        let base = self.frame_offset(half, frame);
        let (r_hi, r_lo) = split_words(right);
        let (l_hi, l_lo) = split_words(left);

        self.words[base].store(r_hi, Ordering::Relaxed);
        self.words[base + 1].store(r_lo, Ordering::Relaxed);
        self.words[base + 2].store(l_hi, Ordering::Relaxed);
        self.words[base + 3].store(l_lo, Ordering::Relaxed);
    }

    /// Read back one frame as (left, right).
    pub fn read_frame(&self, half: BufferHalf, frame: usize) -> (i32, i32) {
        let base = self.frame_offset(half, frame);
        let word = |i: usize| self.words[base + i].load(Ordering::Relaxed);

        let right = join_words(word(0), word(1));
        let left = join_words(word(2), word(3));
        (left, right)
    }

    pub fn word(&self, index: usize) -> i16 {
        self.words[index].load(Ordering::Relaxed)
    }

    pub fn clear(&self) {
        for word in self.words.iter() {
            word.store(0, Ordering::Relaxed);
        }
    }

    fn frame_offset(&self, half: BufferHalf, frame: usize) -> usize {
        debug_assert!(frame < self.block_size, "frame {frame} outside half");
        (half as usize * self.block_size + frame) * WORDS_PER_FRAME
    }
}

/// Transfer-complete side of the notification slot.
#[derive(Clone)]
pub struct BufferReady {
    active: Arc<AtomicU8>,
    tx: Sender<()>,
}

impl BufferReady {
    /// Signal that `half` has been played out and may be refilled. Never
    /// blocks.
    pub fn buffer_ready(&self, half: BufferHalf) {
        self.active.store(half as u8, Ordering::Release);
        match self.tx.try_send(()) {
            Ok(()) | Err(TrySendError::Full(())) => {}
            Err(TrySendError::Disconnected(())) => {} // scheduler is gone
        }
    }
}

/// Scheduler side of the notification slot.
pub(crate) struct ReadyWaiter {
    active: Arc<AtomicU8>,
    rx: Receiver<()>,
}

impl ReadyWaiter {
    pub(crate) fn wait(&self) -> Result<BufferHalf, EngineError> {
        self.rx.recv().map_err(|_| EngineError::Disconnected)?;
        Ok(self.half())
    }

    pub(crate) fn try_wait(&self) -> Option<BufferHalf> {
        self.rx.try_recv().ok().map(|()| self.half())
    }

    fn half(&self) -> BufferHalf {
        BufferHalf::from_index(self.active.load(Ordering::Acquire))
    }
}

pub(crate) fn ready_slot() -> (BufferReady, ReadyWaiter) {
    let active = Arc::new(AtomicU8::new(BufferHalf::Pong as u8));
    let (tx, rx) = crossbeam_channel::bounded(1);
    (
        BufferReady {
            active: active.clone(),
            tx,
        },
        ReadyWaiter { active, rx },
    )
}

/// Byte-received side of the MIDI ring.
pub struct MidiIn {
    writer: MidiWriter,
}

impl MidiIn {
    pub(crate) fn new(writer: MidiWriter) -> Self {
        Self { writer }
    }

    /// Queue one received byte. Active sensing is dropped here so it never
    /// occupies ring space. Returns false if the byte was discarded.
    pub fn byte_received(&mut self, byte: u8) -> bool {
        if byte == ACTIVE_SENSING {
            return false;
        }
        self.writer.write(byte)
    }

    /// Queue a whole message, byte by byte.
    pub fn send(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.byte_received(byte);
        }
    }
}

/// Everything the hardware side needs to drive a scheduler.
pub struct HardwarePorts {
    pub buffer_ready: BufferReady,
    pub midi_in: MidiIn,
    pub buffer: Arc<DmaBuffer>,
}

/// Starts the audio transfer. Called once; from then on the implementation
/// owns buffer timing and calls [`BufferReady::buffer_ready`] for each half.
pub trait AudioHardware {
    fn start_audio(
        &mut self,
        buffer: Arc<DmaBuffer>,
        sample_rate: SampleRate,
        use_master_clock: bool,
    ) -> Result<(), EngineError>;
}

/// Hardware that accepts the buffer and does nothing with it. Tests drive
/// the notification slot by hand.
#[derive(Debug, Default)]
pub struct NullHardware {
    pub started: bool,
    pub sample_rate: Option<SampleRate>,
    pub buffer_len: usize,
}

impl AudioHardware for NullHardware {
    fn start_audio(
        &mut self,
        buffer: Arc<DmaBuffer>,
        sample_rate: SampleRate,
        _use_master_clock: bool,
    ) -> Result<(), EngineError> {
        self.started = true;
        self.sample_rate = Some(sample_rate);
        self.buffer_len = buffer.len();
        Ok(())
    }
}
