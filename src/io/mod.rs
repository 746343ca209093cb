//! Audio I/O modules
//!
//! Audio decoding using Symphonia and the immutable waveform value it produces.

pub mod decoder;
pub mod waveform;
