// Purpose: the real-time loop and its seams to hardware and instrument

pub mod check;
pub mod config;
pub mod error;
pub mod hardware;
pub mod instrument;
pub mod scheduler;

pub use config::{ClockConfig, EngineConfig, SampleRate};
pub use error::EngineError;
pub use hardware::{AudioHardware, BufferHalf, BufferReady, DmaBuffer, HardwarePorts, MidiIn};
pub use instrument::{Instrument, TestTone};
pub use scheduler::Scheduler;
