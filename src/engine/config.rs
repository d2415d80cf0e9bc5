use log::warn;

use crate::{engine::error::EngineError, MAX_BLOCK_SIZE};

/// Output rates the I2S clock tree can be tuned to.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SampleRate {
    Hz44100,
    #[default]
    Hz48000,
    Hz96000,
}

/// PLLI2S multiplier/divider pair for one sample rate, assuming the board
/// oscillator is divided down to 1 or 2 MHz at the PLL input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockConfig {
    pub plli2s_n: u16,
    pub plli2s_r: u8,
}

impl SampleRate {
    pub const ALL: [SampleRate; 3] = [SampleRate::Hz44100, SampleRate::Hz48000, SampleRate::Hz96000];

    pub const fn hz(self) -> u32 {
        match self {
            SampleRate::Hz44100 => 44_100,
            SampleRate::Hz48000 => 48_000,
            SampleRate::Hz96000 => 96_000,
        }
    }

    /// Map a requested rate onto a supported one. Anything else falls back to
    /// the default rate; use `try_from` to reject it instead.
    pub fn from_hz(hz: u32) -> Self {
        Self::try_from(hz).unwrap_or_else(|e| {
            let fallback = SampleRate::default();
            warn!("{e}, using {} Hz", fallback.hz());
            fallback
        })
    }

    /// Clock tree settings for this rate. Driving a master clock changes the
    /// bit clock ratio, so the table differs.
    pub const fn clock_config(self, use_master_clock: bool) -> ClockConfig {
        let (plli2s_n, plli2s_r) = match (self, use_master_clock) {
            (SampleRate::Hz44100, true) => (271, 2),
            (SampleRate::Hz48000, true) => (258, 3),
            (SampleRate::Hz96000, true) => (344, 2),
            (SampleRate::Hz44100, false) => (429, 4),
            (SampleRate::Hz48000, false) => (384, 5),
            (SampleRate::Hz96000, false) => (424, 3),
        };
        ClockConfig { plli2s_n, plli2s_r }
    }
}

impl TryFrom<u32> for SampleRate {
    type Error = EngineError;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        match hz {
            44_100 => Ok(SampleRate::Hz44100),
            48_000 => Ok(SampleRate::Hz48000),
            96_000 => Ok(SampleRate::Hz96000),
            other => Err(EngineError::Unsupported(format!(
                "sample rate {other} Hz"
            ))),
        }
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub sample_rate: SampleRate,
    /// Frames rendered per buffer-ready notification.
    pub block_size: usize,
    pub use_master_clock: bool,
    pub midi_ring_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_rate: SampleRate::Hz48000,
            block_size: 128,
            use_master_clock: false,
            midi_ring_capacity: 16,
        }
    }
}

impl EngineConfig {
    pub fn with_sample_rate(mut self, sample_rate: SampleRate) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_master_clock(mut self, use_master_clock: bool) -> Self {
        self.use_master_clock = use_master_clock;
        self
    }

    pub fn with_midi_ring_capacity(mut self, capacity: usize) -> Self {
        self.midi_ring_capacity = capacity;
        self
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.block_size == 0 || self.block_size > MAX_BLOCK_SIZE {
            return Err(EngineError::InvalidBlockSize(self.block_size));
        }
        if self.midi_ring_capacity == 0 {
            return Err(EngineError::InvalidRingCapacity);
        }
        Ok(())
    }

    /// 16-bit words in the whole double buffer: two halves of `block_size`
    /// frames, four words per frame.
    pub fn buffer_len(&self) -> usize {
        self.block_size * 8
    }

    pub fn clock_config(&self) -> ClockConfig {
        self.sample_rate.clock_config(self.use_master_clock)
    }

    /// Length of one block in seconds.
    pub fn block_period(&self) -> f64 {
        self.block_size as f64 / self.sample_rate.hz() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_rate_falls_back_to_default() {
        assert_eq!(SampleRate::from_hz(44_100), SampleRate::Hz44100);
        assert_eq!(SampleRate::from_hz(96_000), SampleRate::Hz96000);
        assert_eq!(SampleRate::from_hz(22_050), SampleRate::Hz48000);
    }

    #[test]
    fn strict_conversion_rejects_unsupported_rate() {
        assert_eq!(SampleRate::try_from(96_000).ok(), Some(SampleRate::Hz96000));
        assert!(matches!(
            SampleRate::try_from(22_050),
            Err(EngineError::Unsupported(msg)) if msg.contains("22050")
        ));
    }

    #[test]
    fn clock_table_depends_on_master_clock() {
        for rate in SampleRate::ALL {
            assert_ne!(rate.clock_config(true), rate.clock_config(false));
        }
        assert_eq!(
            SampleRate::Hz48000.clock_config(false),
            ClockConfig { plli2s_n: 384, plli2s_r: 5 }
        );
    }

    #[test]
    fn validate_rejects_bad_sizes() {
        assert!(EngineConfig::default().validate().is_ok());
        assert!(matches!(
            EngineConfig::default().with_block_size(0).validate(),
            Err(EngineError::InvalidBlockSize(0))
        ));
        assert!(EngineConfig::default()
            .with_block_size(MAX_BLOCK_SIZE + 1)
            .validate()
            .is_err());
        assert!(matches!(
            EngineConfig::default().with_midi_ring_capacity(0).validate(),
            Err(EngineError::InvalidRingCapacity)
        ));
    }

    #[test]
    fn buffer_holds_two_blocks_of_stereo_words() {
        let config = EngineConfig::default().with_block_size(64);
        assert_eq!(config.buffer_len(), 512);
    }
}
