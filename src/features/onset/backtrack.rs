//! Onset backtracking
//!
//! Peak picking fires where energy is rising fastest, which lags the perceptual attack.
//! Backtracking moves each peak to the closest preceding local minimum of the envelope.

/// Move each onset frame back to the nearest local minimum at or before it
///
/// Local minima are frames with `e[i] <= e[i - 1] && e[i] < e[i + 1]`; frame 0 always
/// counts as a minimum so every onset has somewhere to land.
///
/// # Arguments
///
/// * `onsets` - Onset frame indices, ascending
/// * `envelope` - Energy curve the onsets were picked from
///
/// # Returns
///
/// Backtracked frames, same length and order as `onsets` (neighbouring onsets may
/// collapse onto the same frame)
pub fn backtrack_onsets(onsets: &[usize], envelope: &[f32]) -> Vec<usize> {
    let mut minima = vec![0usize];
    if envelope.len() >= 3 {
        minima.extend(
            (1..envelope.len() - 1)
                .filter(|&i| envelope[i] <= envelope[i - 1] && envelope[i] < envelope[i + 1]),
        );
    }

    onsets
        .iter()
        .map(|&onset| {
            // minima is sorted and starts at 0, so the partition point is >= 1
            let idx = minima.partition_point(|&m| m <= onset);
            minima[idx - 1]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_moves_to_preceding_minimum() {
        //              0    1    2    3    4    5    6    7
        let env = [0.5, 0.2, 0.1, 0.6, 1.0, 0.3, 0.2, 0.9];
        // minima: 0, 2, 6
        assert_eq!(backtrack_onsets(&[4, 7], &env), vec![2, 6]);
    }

    #[test]
    fn test_onset_on_minimum_stays() {
        let env = [0.5, 0.2, 0.1, 0.6];
        assert_eq!(backtrack_onsets(&[2], &env), vec![2]);
    }

    #[test]
    fn test_falls_back_to_frame_zero() {
        let env = [0.0, 0.4, 0.8, 1.0];
        assert_eq!(backtrack_onsets(&[3], &env), vec![0]);
        assert_eq!(backtrack_onsets(&[1], &[0.0, 1.0]), vec![0]);
    }

    #[test]
    fn test_plateau_uses_last_flat_frame() {
        let env = [0.0, 0.0, 0.0, 0.0, 1.0, 0.2];
        // Frame 3 is the last of the plateau before the rise
        assert_eq!(backtrack_onsets(&[4], &env), vec![3]);
    }
}
