//! Timestamp normalization
//!
//! Onset detection on short, noisy or synthetic (text-to-speech) clips misfires at both
//! ends: sharp attacks fire twice, soft speech barely fires at all. Layout downstream
//! needs a fixed event count, so the detected onsets are reshaped into exactly `N`
//! ascending timestamps:
//!
//! 1. **De-duplication**: keep an onset only if it is at least `min_gap` seconds after
//!    the last kept one.
//! 2. **Truncation**: with `N` or more survivors, keep the earliest `N`.
//! 3. **Padding**: with no survivors, spread `N` timestamps evenly inside the clip
//!    (never at 0 or at the end); otherwise keep the survivors and spread the missing
//!    ones after the last survivor.

use crate::timeline::result::OnsetSet;

/// Shortest span padding may spread synthetic timestamps over, in seconds
///
/// Keeps synthetic events apart when the last real onset sits right at the end of the clip.
pub const MIN_PADDING_SPAN_SECONDS: f64 = 0.8;

/// Reshape candidate onsets into exactly `target_count` timestamps
///
/// # Arguments
///
/// * `candidates` - Detected onsets
/// * `target_count` - Number of timestamps wanted (`N`)
/// * `min_gap` - Minimum spacing between kept onsets in seconds, `> 0`
/// * `duration` - Audio duration in seconds (`D`)
///
/// # Returns
///
/// Exactly `target_count` ascending timestamps, or an empty vector when
/// `target_count == 0` or `duration <= 0`
///
/// # Panics
///
/// Panics if `min_gap` is not a positive finite number or `duration` is NaN
///
/// # Example
///
/// ```
/// use cueframe::timeline::normalizer::normalize_timestamps;
/// use cueframe::OnsetSet;
///
/// let padded = normalize_timestamps(&OnsetSet::default(), 3, 0.5, 12.0);
/// assert_eq!(padded, vec![3.0, 6.0, 9.0]);
/// ```
pub fn normalize_timestamps(
    candidates: &OnsetSet,
    target_count: usize,
    min_gap: f64,
    duration: f64,
) -> Vec<f64> {
    assert!(
        min_gap.is_finite() && min_gap > 0.0,
        "min_gap must be a positive number, got {min_gap}"
    );
    assert!(!duration.is_nan(), "duration must not be NaN");

    if target_count == 0 || duration <= 0.0 {
        log::debug!(
            "Nothing to normalize (target_count={}, duration={:.3}s)",
            target_count,
            duration
        );
        return Vec::new();
    }

    let mut timestamps = dedup_min_gap(candidates.as_slice(), min_gap);

    log::debug!(
        "Normalizing {} candidates ({} after min-gap filter) to {} timestamps",
        candidates.len(),
        timestamps.len(),
        target_count
    );

    if timestamps.len() >= target_count {
        timestamps.truncate(target_count);
        return timestamps;
    }

    match timestamps.last().copied() {
        None => {
            log::info!(
                "No usable onsets, spreading {} timestamps evenly over {:.3}s",
                target_count,
                duration
            );
            let step = duration / (target_count + 1) as f64;
            timestamps.extend((0..target_count).map(|i| step * (i + 1) as f64));
        }
        Some(last) => {
            let needed = target_count - timestamps.len();
            let remaining = (duration - last).max(MIN_PADDING_SPAN_SECONDS);
            let step = remaining / (needed + 1) as f64;
            log::info!(
                "Only {} usable onsets, padding {} after {:.3}s (step {:.3}s)",
                timestamps.len(),
                needed,
                last,
                step
            );
            timestamps.extend((0..needed).map(|i| last + step * (i + 1) as f64));
        }
    }

    timestamps.truncate(target_count);
    assert_eq!(timestamps.len(), target_count);
    assert!(
        timestamps.windows(2).all(|w| w[0] < w[1]),
        "normalized timestamps must be ascending"
    );

    timestamps
}

/// Keep a timestamp only if it is at least `min_gap` after the last kept one
///
/// The first timestamp is always kept. Input must be ascending.
pub fn dedup_min_gap(times: &[f64], min_gap: f64) -> Vec<f64> {
    let mut kept: Vec<f64> = Vec::with_capacity(times.len());
    for &t in times {
        match kept.last() {
            Some(&last) if t - last < min_gap => {}
            _ => kept.push(t),
        }
    }
    kept
}
