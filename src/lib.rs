//! # Cueframe
//!
//! Audio-to-timeline synthesis: finds the moments in a song where something new
//! starts, lines a sequence of labels up with those moments and produces a
//! backend-agnostic render plan for a simple "one picture per beat" clip.
//!
//! ## Features
//!
//! - **Onset Detection**: Centered STFT, spectral flux envelope, adaptive peak picking
//!   and backtracking to the preceding envelope minimum
//! - **Timestamp Normalization**: Minimum-gap thinning and deterministic padding to
//!   exactly one timestamp per label
//! - **Storyboard**: Label to asset resolution with graceful skipping of missing assets
//! - **Composition**: Timeline sizing that never cuts the audio or the last event
//! - **Rendering**: ffmpeg backend driven by an explicit render plan
//!
//! ## Quick Start
//!
//! ```no_run
//! use cueframe::{decode_audio, synthesize_timeline, PlaceholderAssets, SynthesisConfig};
//!
//! let waveform = decode_audio("song.mp3")?;
//! let labels: Vec<String> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
//! let assets = PlaceholderAssets::new("assets");
//!
//! let synthesis = synthesize_timeline(&waveform, &labels, &assets, &SynthesisConfig::default())?;
//! for event in &synthesis.plan.events {
//!     println!("{:>7.3}s  {}", event.time, event.label);
//! }
//! # Ok::<(), cueframe::TimelineError>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Audio → OnsetDetector → TimestampNormalizer → StoryboardBuilder → TimelineComposer → Backend
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::path::{Path, PathBuf};

pub mod assets;
pub mod config;
pub mod error;
pub mod features;
pub mod io;
pub mod preprocessing;
pub mod render;
pub mod timeline;

// Re-export main types
pub use assets::catalog::{AssetCatalog, AssetLookup};
pub use assets::placeholder::PlaceholderAssets;
pub use config::SynthesisConfig;
pub use error::{TimelineError, TimelineResult};
pub use features::onset::detect_onsets;
pub use io::decoder::{decode_audio, decode_audio_with, decode_bytes, decode_bytes_with};
pub use io::waveform::Waveform;
pub use preprocessing::channel_mixer::ChannelMixMode;
pub use render::ffmpeg::{FfmpegBackend, FfmpegSettings};
pub use render::RenderBackend;
pub use timeline::composer::compose;
pub use timeline::normalizer::normalize_timestamps;
pub use timeline::result::{AssetRef, Effect, OnsetSet, RenderPlan, VisualEvent};
pub use timeline::storyboard::{build_storyboard, EventStyle};

/// Everything the pipeline derived from one waveform
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Raw onset candidates
    pub candidates: OnsetSet,
    /// Normalized event times, one per label unless the audio is too short
    pub timestamps: Vec<f64>,
    /// Final render plan
    pub plan: RenderPlan,
}

/// Result of [`render_clip`]
#[derive(Debug, Clone, PartialEq)]
pub struct RenderOutcome {
    /// Timeline the video was rendered from
    pub synthesis: Synthesis,
    /// Path of the written video
    pub output: PathBuf,
}

/// Main synthesis function
///
/// Runs onset detection, timestamp normalization, storyboard building and composition
/// on a decoded waveform.
///
/// # Arguments
///
/// * `waveform` - Mono audio
/// * `labels` - Labels in display order; their count is the number of wanted events
/// * `assets` - Label to asset lookup
/// * `config` - Synthesis parameters
///
/// # Returns
///
/// Candidates, normalized timestamps and the render plan. Audio without detectable
/// onsets is not an error: timestamps are padded, and a storyboard without any
/// resolvable asset produces an audio-only plan.
///
/// # Errors
///
/// Returns `TimelineError::ConfigError` if `config` fails validation
///
/// # Example
///
/// ```
/// use cueframe::{synthesize_timeline, AssetCatalog, SynthesisConfig, Waveform};
///
/// let silence = Waveform::new(vec![0.0; 22050 * 4], 22050);
/// let labels = vec!["A".to_string(), "B".to_string(), "C".to_string()];
/// let synthesis =
///     synthesize_timeline(&silence, &labels, &AssetCatalog::new(), &SynthesisConfig::default())?;
///
/// assert_eq!(synthesis.timestamps, vec![1.0, 2.0, 3.0]);
/// assert!(synthesis.plan.is_audio_only());
/// # Ok::<(), cueframe::TimelineError>(())
/// ```
pub fn synthesize_timeline<A>(
    waveform: &Waveform,
    labels: &[String],
    assets: &A,
    config: &SynthesisConfig,
) -> TimelineResult<Synthesis>
where
    A: AssetLookup + ?Sized,
{
    use std::time::Instant;
    let start_time = Instant::now();

    config.validate()?;

    let duration = waveform.duration();
    log::debug!(
        "Synthesizing timeline: {} labels, {} samples at {} Hz ({:.3}s)",
        labels.len(),
        waveform.samples().len(),
        waveform.sample_rate(),
        duration
    );

    let candidates = detect_onsets(waveform, config)?;
    log::debug!("Detected {} onset candidates", candidates.len());

    let timestamps =
        normalize_timestamps(&candidates, labels.len(), config.min_gap_seconds, duration);
    if timestamps.len() < labels.len() {
        log::warn!(
            "Only {} of {} timestamps fit into {:.3}s of audio",
            timestamps.len(),
            labels.len(),
            duration
        );
    }

    let events = build_storyboard(&timestamps, labels, assets, &EventStyle::from(config));
    if events.len() < timestamps.len() {
        log::warn!(
            "{} of {} events skipped for missing assets",
            timestamps.len() - events.len(),
            timestamps.len()
        );
    }

    let plan = compose(duration, events);

    log::debug!(
        "Synthesis finished in {:.1} ms: {} events over {:.3}s",
        start_time.elapsed().as_secs_f32() * 1000.0,
        plan.events.len(),
        plan.total_duration
    );

    Ok(Synthesis {
        candidates,
        timestamps,
        plan,
    })
}

/// Decode an audio file, synthesize its timeline and render it
///
/// The backend is invoked exactly once; a failed render is returned, not retried.
///
/// # Arguments
///
/// * `audio_path` - Audio file used for analysis and as soundtrack
/// * `labels` - Labels in display order
/// * `assets` - Label to asset lookup
/// * `config` - Synthesis parameters
/// * `backend` - Video encoder
/// * `output` - Destination of the video
///
/// # Errors
///
/// Returns `TimelineError::DecodingError` if the audio cannot be decoded,
/// `TimelineError::ConfigError` for an invalid configuration and
/// `TimelineError::RenderError` if the backend fails
pub fn render_clip<A, B>(
    audio_path: impl AsRef<Path>,
    labels: &[String],
    assets: &A,
    config: &SynthesisConfig,
    backend: &B,
    output: impl AsRef<Path>,
) -> TimelineResult<RenderOutcome>
where
    A: AssetLookup + ?Sized,
    B: RenderBackend + ?Sized,
{
    let audio_path = audio_path.as_ref();
    let waveform = decode_audio_with(audio_path, config.channel_mix)?;
    let synthesis = synthesize_timeline(&waveform, labels, assets, config)?;

    log::info!(
        "Rendering {} events ({:.3}s) to {}",
        synthesis.plan.events.len(),
        synthesis.plan.total_duration,
        output.as_ref().display()
    );
    let output = backend.render(&synthesis.plan, audio_path, output.as_ref())?;

    Ok(RenderOutcome { synthesis, output })
}
