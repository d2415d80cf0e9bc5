//! Real-world scenario benchmarks.
//!
//! These render what the engine renders on every buffer-ready: single
//! voices, the full polyphonic mix, and a complete scheduler iteration.

mod engine;
mod voices;

pub use engine::bench_engine;
pub use voices::bench_voices;
