//! Onset strength envelope
//!
//! Half-wave rectified spectral flux over a dB spectrogram:
//! `env[t] = mean_k max(0, S[t, k] - S[t - 1, k])`, with `env[0] = 0`.
//! Working in dB makes the envelope react to relative energy changes, so soft speech
//! attacks register alongside loud percussive ones.

use crate::error::{TimelineError, TimelineResult};

/// Numerical stability epsilon
const EPSILON: f32 = 1e-10;

/// Compute the onset strength envelope from a dB spectrogram
///
/// # Arguments
///
/// * `spectrogram_db` - `n_frames × n_bins` spectrogram, as produced by
///   [`power_spectrogram_db`](super::stft::power_spectrogram_db)
///
/// # Returns
///
/// One value per frame (same length as the spectrogram)
///
/// # Errors
///
/// Returns `TimelineError::InvalidInput` if frames have inconsistent lengths
pub fn onset_strength(spectrogram_db: &[Vec<f32>]) -> TimelineResult<Vec<f32>> {
    if spectrogram_db.is_empty() {
        return Ok(Vec::new());
    }

    let n_bins = spectrogram_db[0].len();
    if n_bins == 0 {
        return Err(TimelineError::invalid_input("Empty spectrogram frames"));
    }

    for (i, frame) in spectrogram_db.iter().enumerate() {
        if frame.len() != n_bins {
            return Err(TimelineError::invalid_input(format!(
                "Inconsistent frame lengths: frame 0 has {} bins, frame {} has {} bins",
                n_bins,
                i,
                frame.len()
            )));
        }
    }

    let mut envelope = Vec::with_capacity(spectrogram_db.len());
    envelope.push(0.0);

    for pair in spectrogram_db.windows(2) {
        let rise: f32 = pair[0]
            .iter()
            .zip(pair[1].iter())
            .map(|(&prev, &curr)| (curr - prev).max(0.0))
            .sum();
        envelope.push(rise / n_bins as f32);
    }

    log::debug!("Onset strength: {} frames", envelope.len());

    Ok(envelope)
}

/// Rescale an envelope to [0, 1] in place
///
/// Returns `false` (leaving the envelope untouched) when it is flat, in which case no
/// onset can be picked from it.
pub fn normalize_envelope(envelope: &mut [f32]) -> bool {
    let min = envelope.iter().copied().fold(f32::INFINITY, f32::min);
    let max = envelope.iter().copied().fold(f32::NEG_INFINITY, f32::max);

    if envelope.is_empty() || max - min <= EPSILON {
        return false;
    }

    let range = max - min;
    for value in envelope.iter_mut() {
        *value = (*value - min) / range;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_rises_count() {
        let frames = vec![
            vec![-80.0, -80.0],
            vec![-20.0, -40.0], // rise of 60 and 40
            vec![-30.0, -50.0], // decay
        ];
        let env = onset_strength(&frames).unwrap();
        assert_eq!(env, vec![0.0, 50.0, 0.0]);
    }

    #[test]
    fn test_inconsistent_frames_rejected() {
        let frames = vec![vec![0.0; 4], vec![0.0; 3]];
        assert!(onset_strength(&frames).is_err());
    }

    #[test]
    fn test_normalize_envelope() {
        let mut env = vec![1.0, 3.0, 5.0];
        assert!(normalize_envelope(&mut env));
        assert_eq!(env, vec![0.0, 0.5, 1.0]);

        let mut flat = vec![2.0; 4];
        assert!(!normalize_envelope(&mut flat));
        assert!(!normalize_envelope(&mut []));
    }
}
