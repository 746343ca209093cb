//! Channel mixing utilities (interleaved multi-channel to mono conversion)

use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};

/// Channel mixing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelMixMode {
    /// Simple average over all channels
    #[default]
    Mono,
    /// Keep the loudest channel sample in every frame
    Dominant,
}

/// Convert interleaved samples to mono
///
/// # Arguments
///
/// * `interleaved` - Samples laid out frame by frame (`L R L R ...` for stereo)
/// * `channels` - Number of interleaved channels
/// * `mode` - Mixing mode
///
/// # Returns
///
/// Mono samples, one per frame. A trailing partial frame is dropped.
///
/// # Errors
///
/// Returns `TimelineError::InvalidInput` if `channels` is zero
pub fn downmix_to_mono(
    interleaved: &[f32],
    channels: usize,
    mode: ChannelMixMode,
) -> TimelineResult<Vec<f32>> {
    if channels == 0 {
        return Err(TimelineError::invalid_input("Channel count must be > 0"));
    }

    if channels == 1 {
        return Ok(interleaved.to_vec());
    }

    log::debug!(
        "Downmixing {} frames of {} channels using {:?}",
        interleaved.len() / channels,
        channels,
        mode
    );

    let mono = match mode {
        ChannelMixMode::Mono => interleaved
            .chunks_exact(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect(),
        ChannelMixMode::Dominant => interleaved
            .chunks_exact(channels)
            .map(|frame| {
                frame
                    .iter()
                    .copied()
                    .fold(0.0f32, |best, x| if x.abs() > best.abs() { x } else { best })
            })
            .collect(),
    };

    Ok(mono)
}
