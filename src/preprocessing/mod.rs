//! Audio preprocessing modules
//!
//! - Channel mixing (interleaved multi-channel to mono)

pub mod channel_mixer;
