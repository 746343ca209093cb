//! Timeline value types
//!
//! Every stage of the pipeline produces one of these immutable values and hands it to the
//! next stage: [`OnsetSet`] → normalized timestamps → [`VisualEvent`]s → [`RenderPlan`].

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Strictly increasing, non-negative onset times in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct OnsetSet(Vec<f64>);

impl OnsetSet {
    /// Build a set from arbitrary candidate times
    ///
    /// Negative and non-finite values are dropped as invalid, the rest are sorted and
    /// exact duplicates removed.
    pub fn from_unsorted(times: impl IntoIterator<Item = f64>) -> Self {
        let mut times: Vec<f64> = times
            .into_iter()
            .filter(|t| t.is_finite() && *t >= 0.0)
            .collect();
        times.sort_by(f64::total_cmp);
        times.dedup();
        Self(times)
    }

    /// Wrap times that are already strictly increasing and non-negative
    ///
    /// # Panics
    ///
    /// Panics if the invariant does not hold; that is a caller bug, not input variance.
    pub fn from_sorted(times: Vec<f64>) -> Self {
        assert!(
            times.iter().all(|t| t.is_finite() && *t >= 0.0),
            "onset times must be finite and non-negative"
        );
        assert!(
            times.windows(2).all(|w| w[0] < w[1]),
            "onset times must be strictly increasing"
        );
        Self(times)
    }

    /// Onset times in seconds
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Iterate over onset times
    pub fn iter(&self) -> std::slice::Iter<'_, f64> {
        self.0.iter()
    }

    /// Number of onsets
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when nothing was detected
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// On-screen effect applied to a visual event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    /// Asset fades in quickly and stays centered until the event ends
    #[default]
    Pop,
}

/// Opaque reference to a visual asset the rendering backend can load
///
/// Two refs are equal when they point to the same resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssetRef(PathBuf);

impl AssetRef {
    /// Reference the asset stored at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    /// Filesystem location of the asset
    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A visual asset shown on screen for a fixed span
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisualEvent {
    /// Start time in seconds
    pub time: f64,
    /// Label the asset illustrates (letter, number, word, color)
    pub label: String,
    /// Asset to display
    pub asset: AssetRef,
    /// On-screen duration in seconds
    pub duration: f64,
    /// Display effect
    pub effect: Effect,
}

impl VisualEvent {
    /// Time at which the event leaves the screen
    pub fn end(&self) -> f64 {
        self.time + self.duration
    }
}

/// Background coverage of the timeline, `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BackgroundSpan {
    /// Always 0
    pub start: f64,
    /// Equal to the plan's total duration
    pub end: f64,
}

/// Backend-agnostic description of a full timeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    /// Background span covering the whole timeline
    pub background: BackgroundSpan,
    /// Events in ascending time order
    pub events: Vec<VisualEvent>,
    /// Length of the timeline in seconds
    pub total_duration: f64,
    /// Length of the audio track in seconds
    pub audio_duration: f64,
}

impl RenderPlan {
    /// `true` when the plan renders audio over the background only
    pub fn is_audio_only(&self) -> bool {
        self.events.is_empty()
    }

    /// Pretty JSON preview of the plan
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_unsorted_cleans_input() {
        let set = OnsetSet::from_unsorted([1.5, -0.2, 0.3, f64::NAN, 1.5, 0.0]);
        assert_eq!(set.as_slice(), &[0.0, 0.3, 1.5]);
    }

    #[test]
    #[should_panic(expected = "strictly increasing")]
    fn test_from_sorted_rejects_unordered() {
        OnsetSet::from_sorted(vec![1.0, 0.5]);
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn test_from_sorted_rejects_negative() {
        OnsetSet::from_sorted(vec![-1.0, 0.5]);
    }

    #[test]
    fn test_plan_json_preview() {
        let plan = RenderPlan {
            background: BackgroundSpan { start: 0.0, end: 3.2 },
            events: vec![VisualEvent {
                time: 1.5,
                label: "A".to_string(),
                asset: AssetRef::new("/assets/a.png"),
                duration: 1.2,
                effect: Effect::Pop,
            }],
            total_duration: 3.2,
            audio_duration: 3.0,
        };
        let json = plan.to_json_pretty().unwrap();
        assert!(json.contains("\"asset\": \"/assets/a.png\""));
        assert!(json.contains("\"effect\": \"pop\""));
    }
}
