//! Onset detection modules
//!
//! Spectral-flux onset detection with backtracking:
//! - STFT power spectrogram
//! - Onset strength envelope
//! - Peak picking
//! - Backtracking
//! - Detector (the full pass, waveform in, onset times out)

pub mod backtrack;
pub mod detector;
pub mod peak_picking;
pub mod stft;
pub mod strength;

pub use detector::detect_onsets;
