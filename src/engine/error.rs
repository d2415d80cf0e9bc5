use thiserror::Error;

use crate::MAX_BLOCK_SIZE;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("block size {0} is outside 1..={MAX_BLOCK_SIZE}")]
    InvalidBlockSize(usize),

    #[error("MIDI ring capacity must be at least one byte")]
    InvalidRingCapacity,

    #[error("unsupported configuration: {0}")]
    Unsupported(String),

    #[error("audio hardware failed to start: {0}")]
    HardwareStart(String),

    #[error("buffer-ready notifier was dropped")]
    Disconnected,
}
