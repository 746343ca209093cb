//! Storyboard building
//!
//! Zips normalized timestamps with labels and resolves each label to an asset.

use crate::assets::catalog::AssetLookup;
use crate::config::SynthesisConfig;
use crate::timeline::result::{Effect, VisualEvent};

/// Display parameters shared by every event of a storyboard
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventStyle {
    /// On-screen duration in seconds, `> 0`
    pub duration: f64,
    /// Effect tag
    pub effect: Effect,
}

impl Default for EventStyle {
    fn default() -> Self {
        Self {
            duration: 1.2,
            effect: Effect::Pop,
        }
    }
}

impl From<&SynthesisConfig> for EventStyle {
    fn from(config: &SynthesisConfig) -> Self {
        Self {
            duration: config.event_duration_seconds,
            effect: config.effect,
        }
    }
}

/// Build the ordered list of visual events
///
/// Pairs `timestamps` and `labels` positionally; the shorter sequence bounds the output
/// and any surplus is ignored. A label without an asset drops its pair entirely, without
/// shifting the times of the other pairs, so the storyboard can be shorter than either
/// input.
///
/// # Arguments
///
/// * `timestamps` - Ascending event times in seconds
/// * `labels` - Labels in intended display order
/// * `assets` - Label to asset lookup
/// * `style` - Duration and effect applied to every event
///
/// # Returns
///
/// Events in timestamp order
pub fn build_storyboard<A>(
    timestamps: &[f64],
    labels: &[String],
    assets: &A,
    style: &EventStyle,
) -> Vec<VisualEvent>
where
    A: AssetLookup + ?Sized,
{
    assert!(
        style.duration.is_finite() && style.duration > 0.0,
        "event duration must be positive, got {}",
        style.duration
    );
    assert!(
        timestamps.windows(2).all(|w| w[0] <= w[1]),
        "storyboard timestamps must be ascending"
    );

    let count = timestamps.len().min(labels.len());
    if timestamps.len() != labels.len() {
        log::debug!(
            "Storyboard bounded to {} pairs ({} timestamps, {} labels)",
            count,
            timestamps.len(),
            labels.len()
        );
    }

    let events: Vec<VisualEvent> = timestamps
        .iter()
        .zip(labels.iter())
        .filter_map(|(&time, label)| {
            let Some(asset) = assets.resolve(label) else {
                log::warn!("No asset for label {:?}, skipping event at {:.3}s", label, time);
                return None;
            };
            Some(VisualEvent {
                time,
                label: label.clone(),
                asset,
                duration: style.duration,
                effect: style.effect,
            })
        })
        .collect();

    log::debug!("Built storyboard with {} of {} events", events.len(), count);

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::catalog::AssetCatalog;
    use crate::timeline::result::AssetRef;

    fn labels(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn catalog(items: &[&str]) -> AssetCatalog {
        items
            .iter()
            .map(|l| (l.to_string(), AssetRef::new(format!("/assets/{l}.png"))))
            .collect()
    }

    #[test]
    fn test_shorter_sequence_bounds_length() {
        let assets = catalog(&["A", "B", "C", "D", "E"]);
        let style = EventStyle::default();

        let events = build_storyboard(
            &[1.0, 2.0, 3.0, 4.0, 5.0],
            &labels(&["A", "B", "C"]),
            &assets,
            &style,
        );
        assert_eq!(events.len(), 3);

        let events = build_storyboard(
            &[1.0, 2.0, 3.0],
            &labels(&["A", "B", "C", "D", "E"]),
            &assets,
            &style,
        );
        assert_eq!(events.len(), 3);
        assert_eq!(events[2].label, "C");
    }

    #[test]
    fn test_missing_asset_skips_only_that_pair() {
        let assets = catalog(&["A", "C"]);
        let events = build_storyboard(
            &[0.5, 1.5, 2.5],
            &labels(&["A", "B", "C"]),
            &assets,
            &EventStyle::default(),
        );
        assert_eq!(events.len(), 2);
        assert_eq!((events[0].label.as_str(), events[0].time), ("A", 0.5));
        assert_eq!((events[1].label.as_str(), events[1].time), ("C", 2.5));
    }

    #[test]
    fn test_events_share_style_and_keep_order() {
        let style = EventStyle {
            duration: 0.75,
            effect: Effect::Pop,
        };
        let events = build_storyboard(
            &[0.2, 0.9, 4.0],
            &labels(&["A", "B", "C"]),
            &catalog(&["A", "B", "C"]),
            &style,
        );
        assert!(events.iter().all(|e| e.duration == 0.75 && e.effect == Effect::Pop));
        assert!(events.windows(2).all(|w| w[0].time <= w[1].time));
        assert_eq!(events[1].asset, AssetRef::new("/assets/B.png"));
    }

    #[test]
    fn test_empty_inputs() {
        let assets = catalog(&["A"]);
        assert!(build_storyboard(&[], &labels(&["A"]), &assets, &EventStyle::default()).is_empty());
        assert!(build_storyboard(&[1.0], &[], &assets, &EventStyle::default()).is_empty());
    }
}
