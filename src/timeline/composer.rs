//! Timeline composition
//!
//! Sizes the timeline so that the full audio plays and the last visual event is never cut.

use crate::timeline::result::{BackgroundSpan, RenderPlan, VisualEvent};

/// Time kept on screen after the last event ends, in seconds
pub const END_MARGIN_SECONDS: f64 = 0.5;

/// Compose a render plan from the audio length and a storyboard
///
/// `total_duration` is `audio_duration` without events, otherwise
/// `max(audio_duration, latest_event_end + END_MARGIN_SECONDS)`.
///
/// # Panics
///
/// Panics if `audio_duration` is negative or non-finite, or an event has a non-finite
/// time or duration.
///
/// # Example
///
/// ```
/// use cueframe::timeline::composer::compose;
///
/// let plan = compose(4.0, Vec::new());
/// assert_eq!(plan.total_duration, 4.0);
/// assert!(plan.is_audio_only());
/// ```
pub fn compose(audio_duration: f64, events: Vec<VisualEvent>) -> RenderPlan {
    assert!(
        audio_duration.is_finite() && audio_duration >= 0.0,
        "audio duration must be finite and non-negative, got {audio_duration}"
    );
    assert!(
        events
            .iter()
            .all(|e| e.time.is_finite() && e.time >= 0.0 && e.duration.is_finite()),
        "event times and durations must be finite"
    );

    let total_duration = events
        .iter()
        .map(VisualEvent::end)
        .reduce(f64::max)
        .map_or(audio_duration, |last_end| {
            audio_duration.max(last_end + END_MARGIN_SECONDS)
        });

    log::debug!(
        "Composed timeline: {} events, audio {:.3}s, total {:.3}s",
        events.len(),
        audio_duration,
        total_duration
    );

    RenderPlan {
        background: BackgroundSpan {
            start: 0.0,
            end: total_duration,
        },
        events,
        total_duration,
        audio_duration,
    }
}
