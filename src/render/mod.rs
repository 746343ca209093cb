//! Rendering backends
//!
//! A backend consumes a finished [`RenderPlan`] plus the audio it was derived from and
//! produces an encoded video. Codec, frame rate and resolution are backend configuration;
//! the plan itself is backend-agnostic.

use std::path::{Path, PathBuf};

use crate::error::TimelineResult;
use crate::timeline::result::RenderPlan;

pub mod ffmpeg;

/// Turns a render plan into a video file
///
/// Implementations make exactly one attempt; failures, including settings the backend
/// cannot use and plans with nothing to render, are reported as
/// `TimelineError::RenderError` and never retried.
pub trait RenderBackend {
    /// Render `plan` with `audio` as soundtrack into `output`, returning the written path
    fn render(&self, plan: &RenderPlan, audio: &Path, output: &Path) -> TimelineResult<PathBuf>;
}
