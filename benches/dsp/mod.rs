//! Benchmarks for per-voice DSP modules.

mod amplify;
mod envelope;
mod filter;
mod lfo;
mod noise;
mod oscillator;

pub use amplify::bench_amplify;
pub use envelope::bench_envelope;
pub use filter::bench_filter;
pub use lfo::bench_lfo;
pub use noise::bench_noise;
pub use oscillator::bench_oscillator;
