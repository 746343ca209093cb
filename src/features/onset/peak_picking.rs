//! Peak picking on an onset strength envelope
//!
//! A frame `n` is an onset peak when all three hold:
//! 1. `x[n] == max(x[n - pre_max ..= n + post_max - 1])` (local maximum)
//! 2. `x[n] >= mean(x[n - pre_avg ..= n + post_avg - 1]) + delta` (stands out of its
//!    neighbourhood)
//! 3. `n - previous_peak > wait` (debounce)
//!
//! Windows are clamped at the envelope edges.
//!
//! # Reference
//!
//! Böck, S., Krebs, F., & Schedl, M. (2012). Evaluating the Online Capabilities of Onset
//! Detection Methods. *Proceedings of the International Society for Music Information
//! Retrieval Conference*.

/// Peak picking windows, in frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeakPickParams {
    /// Frames before `n` in the local-maximum window
    pub pre_max: usize,
    /// Frames from `n` (inclusive) in the local-maximum window; at least 1
    pub post_max: usize,
    /// Frames before `n` in the moving-average window
    pub pre_avg: usize,
    /// Frames from `n` (inclusive) in the moving-average window; at least 1
    pub post_avg: usize,
    /// Minimum number of frames between two peaks
    pub wait: usize,
}

/// Find onset peaks in a normalized envelope
///
/// # Arguments
///
/// * `envelope` - Onset strength, normalized to [0, 1]
/// * `params` - Window sizes in frames
/// * `delta` - Threshold offset above the local mean
///
/// # Returns
///
/// Frame indices of the peaks, ascending
pub fn pick_peaks(envelope: &[f32], params: PeakPickParams, delta: f32) -> Vec<usize> {
    log::debug!(
        "Picking peaks in {} frames: {:?}, delta={:.3}",
        envelope.len(),
        params,
        delta
    );

    let n = envelope.len();
    if n == 0 {
        return Vec::new();
    }

    let post_max = params.post_max.max(1);
    let post_avg = params.post_avg.max(1);

    let mut peaks = Vec::new();
    let mut last_peak: Option<usize> = None;

    for i in 0..n {
        let value = envelope[i];

        let max_lo = i.saturating_sub(params.pre_max);
        let max_hi = i.saturating_add(post_max).min(n);
        let local_max = envelope[max_lo..max_hi]
            .iter()
            .copied()
            .fold(f32::NEG_INFINITY, f32::max);
        if value < local_max {
            continue;
        }

        let avg_lo = i.saturating_sub(params.pre_avg);
        let avg_hi = i.saturating_add(post_avg).min(n);
        let window = &envelope[avg_lo..avg_hi];
        let local_mean = window.iter().sum::<f32>() / window.len() as f32;
        if value < local_mean + delta {
            continue;
        }

        if let Some(last) = last_peak {
            if i - last <= params.wait {
                continue;
            }
        }

        peaks.push(i);
        last_peak = Some(i);
    }

    log::debug!("Picked {} peaks", peaks.len());

    peaks
}
