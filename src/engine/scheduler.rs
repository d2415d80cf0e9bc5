/*
Audio Block Scheduler
=====================

One iteration per buffer-ready notification:

    wait ──→ drain MIDI ──→ refresh params ──→ render ──→ check ──→ write half
     ↑        (parse +       (only when         (left,     (debug)   (i32 words)
     │         dispatch)      store dirty)       right)                   │
     └────────────────────────────────────────────────────────────────────┘

MIDI is applied at block granularity: every byte that arrived since the last
block is parsed and handed to the instrument before any audio is rendered.
The wait is the only place the loop suspends. A render that takes longer
than one block period is not detected; it is heard as a glitch.
*/

use std::sync::Arc;

use log::{error, info};

use crate::{
    engine::{
        config::EngineConfig,
        error::EngineError,
        hardware::{
            ready_slot, AudioHardware, BufferHalf, DmaBuffer, HardwarePorts, MidiIn, ReadyWaiter,
        },
        instrument::Instrument,
    },
    io::{converter::float_to_i32, midi::MidiParser, ring::midi_ring, MidiReader},
    params::ParamStore,
};

pub struct Scheduler<I: Instrument> {
    config: EngineConfig,
    instrument: I,
    store: ParamStore,
    parser: MidiParser,
    midi_rx: MidiReader,
    ready: ReadyWaiter,
    buffer: Arc<DmaBuffer>,
    left: Vec<f32>,
    right: Vec<f32>,
    blocks_rendered: u64,
}

impl<I: Instrument> Scheduler<I> {
    /// Build a scheduler around `instrument` and the ports the hardware side
    /// drives it through. All buffers are allocated here.
    pub fn new(config: EngineConfig, instrument: I) -> Result<(Self, HardwarePorts), EngineError> {
        config.validate()?;

        let (midi_tx, midi_rx) = midi_ring(config.midi_ring_capacity);
        let (buffer_ready, ready) = ready_slot();
        let buffer = Arc::new(DmaBuffer::new(config.block_size));

        let ports = HardwarePorts {
            buffer_ready,
            midi_in: MidiIn::new(midi_tx),
            buffer: buffer.clone(),
        };

        let scheduler = Self {
            left: vec![0.0; config.block_size],
            right: vec![0.0; config.block_size],
            config,
            instrument,
            store: ParamStore::default(),
            parser: MidiParser::default(),
            midi_rx,
            ready,
            buffer,
            blocks_rendered: 0,
        };

        Ok((scheduler, ports))
    }

    /// Start the transfer, then prepare the instrument and adopt the MIDI
    /// channel it asks for.
    pub fn start(&mut self, hardware: &mut impl AudioHardware) -> Result<(), EngineError> {
        let EngineConfig {
            sample_rate,
            block_size,
            use_master_clock,
            ..
        } = self.config;

        hardware
            .start_audio(self.buffer.clone(), sample_rate, use_master_clock)
            .inspect_err(|e| error!("audio start failed: {e}"))?;

        let channel = self
            .instrument
            .prepare_for_play(sample_rate.hz() as f32, block_size, &mut self.store);
        self.parser.set_channel(channel);

        info!(
            "engine started: {} Hz, {} frames/block, {} words, channel {:?}",
            sample_rate.hz(),
            block_size,
            self.buffer.len(),
            channel
        );
        Ok(())
    }

    /// Render blocks for as long as the hardware keeps signalling. Returns
    /// only once the notifier has been dropped.
    pub fn run(&mut self) -> Result<(), EngineError> {
        loop {
            let half = self.wait_for_buffer()?;
            self.process_block(half);
        }
    }

    /// Block until a half is ready to refill.
    pub fn wait_for_buffer(&self) -> Result<BufferHalf, EngineError> {
        self.ready.wait()
    }

    /// Render into the signalled half if a notification is already pending.
    pub fn run_pending(&mut self) -> bool {
        match self.ready.try_wait() {
            Some(half) => {
                self.process_block(half);
                true
            }
            None => false,
        }
    }

    /// One full iteration for `half`: MIDI, parameters, render, write.
    pub fn process_block(&mut self, half: BufferHalf) {
        while let Some(byte) = self.midi_rx.read() {
            if let Some(msg) = self.parser.parse(byte) {
                self.instrument.handle_midi(msg, &mut self.store);
            }
        }

        if self.store.take_dirty() {
            self.instrument.parameters_changed(&self.store);
        }

        self.instrument.process_block(&mut self.left, &mut self.right);

        #[cfg(any(debug_assertions, feature = "check-buffer"))]
        {
            super::check::check_buffer(&mut self.left);
            super::check::check_buffer(&mut self.right);
        }

        for (frame, (&l, &r)) in self.left.iter().zip(self.right.iter()).enumerate() {
            self.buffer
                .write_frame(half, frame, float_to_i32(l), float_to_i32(r));
        }

        self.blocks_rendered += 1;
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn instrument(&self) -> &I {
        &self.instrument
    }

    pub fn instrument_mut(&mut self) -> &mut I {
        &mut self.instrument
    }

    pub fn store(&self) -> &ParamStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut ParamStore {
        &mut self.store
    }

    pub fn blocks_rendered(&self) -> u64 {
        self.blocks_rendered
    }

    /// Most recent rendered block, after checking.
    pub fn last_block(&self) -> (&[f32], &[f32]) {
        (&self.left, &self.right)
    }
}
