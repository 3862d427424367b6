//! Real-world scenario benchmarks.
//!
//! These benchmarks model the synth as a host drives it: a voice pool under
//! chords, steals and parameter sweeps, and the engine with its bridge.

mod voices;

pub use voices::bench_voices;
