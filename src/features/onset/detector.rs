//! Onset detector
//!
//! Single deterministic pass over a waveform:
//! 1. dB power spectrogram (centered STFT)
//! 2. Onset strength envelope (rectified spectral flux), normalized to [0, 1]
//! 3. Peak picking
//! 4. Backtracking to the preceding envelope minimum
//! 5. Frame to time conversion
//!
//! Degenerate input (no samples, zero sample rate, silence) yields an empty
//! [`OnsetSet`]; callers treat that as a normal result.

use crate::config::SynthesisConfig;
use crate::error::TimelineResult;
use crate::io::waveform::Waveform;
use crate::timeline::result::OnsetSet;

use super::backtrack::backtrack_onsets;
use super::peak_picking::{pick_peaks, PeakPickParams};
use super::stft::power_spectrogram_db;
use super::strength::{normalize_envelope, onset_strength};

/// Detect candidate onset times in a waveform
///
/// # Arguments
///
/// * `waveform` - Mono audio
/// * `config` - STFT and peak picking parameters
///
/// # Returns
///
/// Strictly increasing, non-negative onset times in seconds (possibly empty)
///
/// # Errors
///
/// Returns `TimelineError::InvalidInput` only for unusable STFT parameters
/// (`frame_size < 2`, `hop_size == 0`); audio content never causes an error
///
/// # Example
///
/// ```
/// use cueframe::{detect_onsets, SynthesisConfig, Waveform};
///
/// let silence = Waveform::new(vec![0.0; 22050], 22050);
/// let onsets = detect_onsets(&silence, &SynthesisConfig::default())?;
/// assert!(onsets.is_empty());
/// # Ok::<(), cueframe::TimelineError>(())
/// ```
pub fn detect_onsets(waveform: &Waveform, config: &SynthesisConfig) -> TimelineResult<OnsetSet> {
    if waveform.is_empty() {
        log::debug!("Empty waveform, no onsets");
        return Ok(OnsetSet::default());
    }

    let sample_rate = waveform.sample_rate();

    log::debug!(
        "Detecting onsets: {} samples at {} Hz",
        waveform.samples().len(),
        sample_rate
    );

    let spectrogram = power_spectrogram_db(
        waveform.samples(),
        config.frame_size,
        config.hop_size,
        config.top_db,
    )?;

    let mut envelope = onset_strength(&spectrogram)?;
    if !normalize_envelope(&mut envelope) {
        log::debug!("Flat onset envelope, no onsets detected");
        return Ok(OnsetSet::default());
    }

    let params = PeakPickParams {
        pre_max: config.ms_to_frames(config.pre_max_ms, sample_rate),
        post_max: config
            .ms_to_frames(config.post_max_ms, sample_rate)
            .saturating_add(1),
        pre_avg: config.ms_to_frames(config.pre_avg_ms, sample_rate),
        post_avg: config
            .ms_to_frames(config.post_avg_ms, sample_rate)
            .saturating_add(1),
        wait: config.ms_to_frames(config.wait_ms, sample_rate),
    };

    let peaks = pick_peaks(&envelope, params, config.peak_delta);
    let frames = backtrack_onsets(&peaks, &envelope);

    let seconds_per_frame = config.hop_size as f64 / sample_rate as f64;
    let onsets = OnsetSet::from_unsorted(frames.iter().map(|&f| f as f64 * seconds_per_frame));

    log::debug!(
        "Detected {} onsets ({} peaks before backtracking)",
        onsets.len(),
        peaks.len()
    );

    Ok(onsets)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Decaying 440 Hz bursts starting at the given times
    fn bursts(onsets: &[f64], duration: f64, sample_rate: u32) -> Vec<f32> {
        let n = (duration * sample_rate as f64) as usize;
        let mut samples = vec![0.0f32; n];
        for &t in onsets {
            let start = (t * sample_rate as f64) as usize;
            for (i, s) in samples.iter_mut().enumerate().skip(start) {
                let dt = (i - start) as f32 / sample_rate as f32;
                *s += 0.8
                    * (-dt / 0.05).exp()
                    * (2.0 * std::f32::consts::PI * 440.0 * dt).sin();
            }
        }
        samples
    }

    #[test]
    fn test_detects_bursts_near_their_attack() {
        let expected = [0.5, 1.5, 2.5];
        let waveform = Waveform::new(bursts(&expected, 3.5, 22050), 22050);
        let onsets = detect_onsets(&waveform, &SynthesisConfig::default()).unwrap();

        for &t in &expected {
            assert!(
                onsets.iter().any(|&o| (o - t).abs() < 0.15),
                "no onset near {t}: {:?}",
                onsets.as_slice()
            );
        }
    }

    #[test]
    fn test_onsets_strictly_increasing_and_non_negative() {
        let waveform = Waveform::new(bursts(&[0.1, 0.4, 0.45, 1.2], 2.0, 16000), 16000);
        let onsets = detect_onsets(&waveform, &SynthesisConfig::default()).unwrap();
        assert!(onsets.iter().all(|&t| t >= 0.0));
        assert!(onsets.as_slice().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_degenerate_inputs_yield_empty() {
        let config = SynthesisConfig::default();
        assert!(detect_onsets(&Waveform::new(vec![], 44100), &config)
            .unwrap()
            .is_empty());
        assert!(detect_onsets(&Waveform::new(vec![0.3; 4096], 0), &config)
            .unwrap()
            .is_empty());
        assert!(detect_onsets(&Waveform::new(vec![0.0; 44100], 44100), &config)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_oversized_windows_do_not_overflow() {
        let config = SynthesisConfig {
            pre_max_ms: 1e30,
            post_max_ms: 1e30,
            pre_avg_ms: f32::MAX,
            post_avg_ms: 1e30,
            wait_ms: 1e30,
            ..SynthesisConfig::default()
        };
        let waveform = Waveform::new(bursts(&[0.3, 0.7], 1.0, 22050), 22050);
        let onsets = detect_onsets(&waveform, &config).unwrap();
        assert!(onsets.len() <= 1);
    }
}
