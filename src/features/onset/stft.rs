//! Short-time Fourier transform for onset analysis
//!
//! Produces a centered, Hann-windowed power spectrogram expressed in dB. Frame `t` is
//! centered on sample `t * hop_size`, so frame indices convert to time as
//! `t * hop_size / sample_rate`.

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

use crate::error::{TimelineError, TimelineResult};

/// Power floor used before the dB conversion
const AMIN: f32 = 1e-10;

/// Compute a dB power spectrogram
///
/// # Arguments
///
/// * `samples` - Mono audio samples
/// * `frame_size` - FFT size (typically 2048)
/// * `hop_size` - Hop size between frames (typically 512)
/// * `top_db` - Values below `max_db - top_db` are clipped to that floor
///
/// # Returns
///
/// `n_frames × (frame_size / 2 + 1)` matrix; `n_frames = 1 + samples.len() / hop_size`.
/// Empty when `samples` is empty.
///
/// # Errors
///
/// Returns `TimelineError::InvalidInput` if `frame_size < 2` or `hop_size == 0`
pub fn power_spectrogram_db(
    samples: &[f32],
    frame_size: usize,
    hop_size: usize,
    top_db: f32,
) -> TimelineResult<Vec<Vec<f32>>> {
    if frame_size < 2 {
        return Err(TimelineError::invalid_input("Frame size must be >= 2"));
    }
    if hop_size == 0 {
        return Err(TimelineError::invalid_input("Hop size must be > 0"));
    }
    if samples.is_empty() {
        return Ok(Vec::new());
    }

    // Centered frames: pad frame_size / 2 zeros on both sides
    let pad = frame_size / 2;
    let mut padded = vec![0.0f32; samples.len() + 2 * pad];
    padded[pad..pad + samples.len()].copy_from_slice(samples);

    let n_frames = 1 + samples.len() / hop_size;
    let n_bins = frame_size / 2 + 1;

    log::debug!(
        "Computing STFT: {} samples, frame={}, hop={}, {} frames x {} bins",
        samples.len(),
        frame_size,
        hop_size,
        n_frames,
        n_bins
    );

    // Periodic Hann window
    let window: Vec<f32> = (0..frame_size)
        .map(|i| {
            let t = 2.0 * std::f32::consts::PI * i as f32 / frame_size as f32;
            0.5 * (1.0 - t.cos())
        })
        .collect();

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(frame_size);
    let mut buffer: Vec<Complex<f32>> = vec![Complex::new(0.0, 0.0); frame_size];

    let mut spectrogram = Vec::with_capacity(n_frames);
    let mut max_db = f32::NEG_INFINITY;

    for frame_idx in 0..n_frames {
        let start = frame_idx * hop_size;
        let frame = &padded[start..(start + frame_size).min(padded.len())];

        for (i, slot) in buffer.iter_mut().enumerate() {
            let x = frame.get(i).copied().unwrap_or(0.0);
            *slot = Complex::new(x * window[i], 0.0);
        }
        fft.process(&mut buffer);

        let row: Vec<f32> = buffer[..n_bins]
            .iter()
            .map(|c| {
                let power = c.re * c.re + c.im * c.im;
                10.0 * power.max(AMIN).log10()
            })
            .collect();

        max_db = row.iter().copied().fold(max_db, f32::max);
        spectrogram.push(row);
    }

    let floor = max_db - top_db;
    for row in &mut spectrogram {
        for value in row.iter_mut() {
            *value = value.max(floor);
        }
    }

    Ok(spectrogram)
}
