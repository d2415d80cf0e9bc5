//! cpal output standing in for the I2S transfer engine

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};

use frugi_dsp::engine::{AudioHardware, BufferHalf, BufferReady, DmaBuffer, EngineError, SampleRate};

const FULL_SCALE: f32 = i32::MAX as f32;

/// Plays the double buffer on the default output device, raising
/// buffer-ready each time it finishes a half, exactly as the DMA interrupt
/// would.
pub struct CpalHardware {
    ready: BufferReady,
    stream: Option<cpal::Stream>,
}

impl CpalHardware {
    pub fn new(ready: BufferReady) -> Self {
        Self {
            ready,
            stream: None,
        }
    }
}

/// Read position of the emulated transfer.
struct Cursor {
    half: BufferHalf,
    frame: usize,
}

impl AudioHardware for CpalHardware {
    fn start_audio(
        &mut self,
        buffer: Arc<DmaBuffer>,
        sample_rate: SampleRate,
        _use_master_clock: bool,
    ) -> Result<(), EngineError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| EngineError::HardwareStart("no default output device".into()))?;
        let supported = device
            .default_output_config()
            .map_err(|e| EngineError::HardwareStart(e.to_string()))?;

        let channels = supported.channels() as usize;
        let config = cpal::StreamConfig {
            channels: supported.channels(),
            sample_rate: cpal::SampleRate(sample_rate.hz()),
            buffer_size: cpal::BufferSize::Default,
        };

        let ready = self.ready.clone();
        let block_size = buffer.block_size();
        let mut cursor = Cursor {
            half: BufferHalf::Ping,
            frame: 0,
        };

        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _| {
                    for out in data.chunks_mut(channels) {
                        let (left, right) = buffer.read_frame(cursor.half, cursor.frame);
                        let left = left as f32 / FULL_SCALE;
                        let right = right as f32 / FULL_SCALE;

                        // Stereo onto the first two channels, left copied to any others
                        for (ch, sample) in out.iter_mut().enumerate() {
                            *sample = if ch == 1 { right } else { left };
                        }

                        cursor.frame += 1;
                        if cursor.frame == block_size {
                            ready.buffer_ready(cursor.half);
                            cursor.half = cursor.half.other();
                            cursor.frame = 0;
                        }
                    }
                },
                |err| error!("audio stream error: {err}"),
                None,
            )
            .map_err(|e| EngineError::HardwareStart(e.to_string()))?;

        stream
            .play()
            .map_err(|e| EngineError::HardwareStart(e.to_string()))?;

        info!(
            "output: {} ({} channels)",
            device.name().unwrap_or_else(|_| "unknown device".into()),
            channels
        );

        self.stream = Some(stream);
        Ok(())
    }
}
