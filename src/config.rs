//! Configuration parameters for timeline synthesis

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};
use crate::preprocessing::channel_mixer::ChannelMixMode;
use crate::timeline::result::Effect;

/// Longest accepted peak picking window in milliseconds
pub const MAX_WINDOW_MS: f32 = 10_000.0;

/// Synthesis configuration parameters
///
/// Every field has a default, so a JSON config file only needs to list the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    // Decoding
    /// How multi-channel audio is folded to mono (default: Mono)
    pub channel_mix: ChannelMixMode,

    // STFT parameters
    /// Frame size for STFT (default: 2048)
    pub frame_size: usize,

    /// Hop size for STFT (default: 512)
    pub hop_size: usize,

    /// Dynamic range kept in the dB spectrogram, relative to its peak (default: 80.0)
    pub top_db: f32,

    // Peak picking
    /// Look-back window for the local-maximum test in milliseconds (default: 30)
    pub pre_max_ms: f32,

    /// Look-ahead window for the local-maximum test in milliseconds (default: 0)
    /// One frame is always added, so 0 means "compare against the current frame only"
    pub post_max_ms: f32,

    /// Look-back window for the moving-average test in milliseconds (default: 100)
    pub pre_avg_ms: f32,

    /// Look-ahead window for the moving-average test in milliseconds (default: 100)
    pub post_avg_ms: f32,

    /// Minimum spacing between two picked peaks in milliseconds (default: 30)
    pub wait_ms: f32,

    /// Amount a peak must exceed the local average by, on the [0, 1] envelope (default: 0.07)
    pub peak_delta: f32,

    // Timestamp normalization
    /// Minimum gap between two kept onsets in seconds (default: 0.5)
    /// Collapses attack/decay double detections, common with text-to-speech clips
    pub min_gap_seconds: f64,

    // Storyboard
    /// On-screen duration shared by every visual event in seconds (default: 1.2)
    pub event_duration_seconds: f64,

    /// Effect tag applied to every visual event (default: Pop)
    pub effect: Effect,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            channel_mix: ChannelMixMode::Mono,
            frame_size: 2048,
            hop_size: 512,
            top_db: 80.0,
            pre_max_ms: 30.0,
            post_max_ms: 0.0,
            pre_avg_ms: 100.0,
            post_avg_ms: 100.0,
            wait_ms: 30.0,
            peak_delta: 0.07,
            min_gap_seconds: 0.5,
            event_duration_seconds: 1.2,
            effect: Effect::Pop,
        }
    }
}

impl SynthesisConfig {
    /// Load a configuration from a JSON file, filling unspecified fields with defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> TimelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            TimelineError::config(format!("failed to read '{}': {e}", path.display()))
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|e| {
            TimelineError::config(format!("failed to parse '{}': {e}", path.display()))
        })?;
        config.validate()?;
        log::debug!("Loaded synthesis config from {}", path.display());
        Ok(config)
    }

    /// Check that the parameters describe a usable analysis
    pub fn validate(&self) -> TimelineResult<()> {
        if self.frame_size < 2 {
            return Err(TimelineError::config("frame_size must be >= 2"));
        }
        if self.hop_size == 0 {
            return Err(TimelineError::config("hop_size must be > 0"));
        }
        if !(self.top_db.is_finite() && self.top_db > 0.0) {
            return Err(TimelineError::config("top_db must be a positive number"));
        }
        let windows = [
            ("pre_max_ms", self.pre_max_ms),
            ("post_max_ms", self.post_max_ms),
            ("pre_avg_ms", self.pre_avg_ms),
            ("post_avg_ms", self.post_avg_ms),
            ("wait_ms", self.wait_ms),
        ];
        for (name, value) in windows {
            if !(value.is_finite() && (0.0..=MAX_WINDOW_MS).contains(&value)) {
                return Err(TimelineError::config(format!(
                    "{name} must be between 0 and {MAX_WINDOW_MS} ms, got {value}"
                )));
            }
        }
        if !self.peak_delta.is_finite() {
            return Err(TimelineError::config("peak_delta must be finite"));
        }
        if !(self.min_gap_seconds.is_finite() && self.min_gap_seconds > 0.0) {
            return Err(TimelineError::config(format!(
                "min_gap_seconds must be > 0, got {}",
                self.min_gap_seconds
            )));
        }
        if !(self.event_duration_seconds.is_finite() && self.event_duration_seconds > 0.0) {
            return Err(TimelineError::config(format!(
                "event_duration_seconds must be > 0, got {}",
                self.event_duration_seconds
            )));
        }
        Ok(())
    }

    /// Convert a window length in milliseconds into whole STFT frames
    pub(crate) fn ms_to_frames(&self, ms: f32, sample_rate: u32) -> usize {
        (ms / 1000.0 * sample_rate as f32 / self.hop_size as f32).floor() as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SynthesisConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_non_positive_min_gap() {
        let config = SynthesisConfig {
            min_gap_seconds: 0.0,
            ..SynthesisConfig::default()
        };
        assert!(matches!(config.validate(), Err(TimelineError::ConfigError(_))));
    }

    #[test]
    fn test_rejects_zero_hop() {
        let config = SynthesisConfig {
            hop_size: 0,
            ..SynthesisConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_oversized_windows() {
        let config = SynthesisConfig {
            post_max_ms: 1e30,
            ..SynthesisConfig::default()
        };
        assert!(matches!(config.validate(), Err(TimelineError::ConfigError(_))));

        let config = SynthesisConfig {
            pre_avg_ms: MAX_WINDOW_MS,
            ..SynthesisConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_channel_mix_from_json() {
        let config: SynthesisConfig =
            serde_json::from_str(r#"{ "channel_mix": "dominant" }"#).unwrap();
        assert_eq!(config.channel_mix, ChannelMixMode::Dominant);
        assert_eq!(SynthesisConfig::default().channel_mix, ChannelMixMode::Mono);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: SynthesisConfig =
            serde_json::from_str(r#"{ "min_gap_seconds": 0.25, "effect": "pop" }"#).unwrap();
        assert_eq!(config.min_gap_seconds, 0.25);
        assert_eq!(config.hop_size, 512);
        assert_eq!(config.event_duration_seconds, 1.2);
    }

    #[test]
    fn test_ms_to_frames() {
        let config = SynthesisConfig::default();
        // 0.03 * 22050 / 512 = 1.29
        assert_eq!(config.ms_to_frames(30.0, 22050), 1);
        // 0.1 * 44100 / 512 = 8.61
        assert_eq!(config.ms_to_frames(100.0, 44100), 8);
        assert_eq!(config.ms_to_frames(0.0, 44100), 0);
    }
}
