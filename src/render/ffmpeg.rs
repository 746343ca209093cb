//! `ffmpeg` command-line backend
//!
//! Builds a single filter graph: the background (image looped, or a solid color source
//! when the image is unusable) is stretched to the canvas, each event image is scaled,
//! faded in, shifted to its start time and overlaid centered while it is on screen. The
//! audio track is muxed as AAC next to H.264 video.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{TimelineError, TimelineResult};
use crate::render::RenderBackend;
use crate::timeline::result::{Effect, RenderPlan, VisualEvent};

/// Options for [`FfmpegBackend`]
///
/// Passed explicitly to the backend; nothing is read from process-wide state.
#[derive(Debug, Clone, PartialEq)]
pub struct FfmpegSettings {
    /// `ffmpeg` executable (a bare name is looked up on `PATH`)
    pub binary: PathBuf,
    /// Canvas width in pixels (even)
    pub width: u32,
    /// Canvas height in pixels (even)
    pub height: u32,
    /// Output frame rate
    pub fps: u32,
    /// Event image width relative to the canvas width
    pub overlay_width_ratio: f64,
    /// Fade-in length of [`Effect::Pop`] in seconds
    pub fade_in_seconds: f64,
    /// Background image; `None` or an unreadable image falls back to `fallback_color`
    pub background: Option<PathBuf>,
    /// Solid background color (RGB)
    pub fallback_color: [u8; 3],
    /// Overwrite an existing output file
    pub overwrite: bool,
}

impl Default for FfmpegSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("ffmpeg"),
            width: 1280,
            height: 720,
            fps: 30,
            overlay_width_ratio: 0.55,
            fade_in_seconds: 0.15,
            background: None,
            fallback_color: [245, 245, 245],
            overwrite: true,
        }
    }
}

/// Backend that shells out to `ffmpeg` once per render
#[derive(Debug, Clone, Default)]
pub struct FfmpegBackend {
    settings: FfmpegSettings,
}

impl FfmpegBackend {
    /// Create a backend with the given settings
    pub fn new(settings: FfmpegSettings) -> Self {
        Self { settings }
    }

    /// Settings in use
    pub fn settings(&self) -> &FfmpegSettings {
        &self.settings
    }

    /// Arguments passed to `ffmpeg` for this plan (without the binary itself)
    ///
    /// Events whose asset file no longer exists are left out.
    ///
    /// # Errors
    ///
    /// Returns `TimelineError::RenderError` for unusable settings or a zero-duration plan
    pub fn command_args(
        &self,
        plan: &RenderPlan,
        audio: &Path,
        output: &Path,
    ) -> TimelineResult<Vec<OsString>> {
        let s = &self.settings;
        if s.width == 0 || s.height == 0 || s.width % 2 != 0 || s.height % 2 != 0 {
            return Err(TimelineError::render(format!(
                "canvas must be non-zero and even (yuv420p), got {}x{}",
                s.width, s.height
            )));
        }
        if s.fps == 0 {
            return Err(TimelineError::render("fps must be non-zero"));
        }
        if !(s.overlay_width_ratio > 0.0 && s.overlay_width_ratio <= 1.0) {
            return Err(TimelineError::render(
                "overlay_width_ratio must be in (0, 1]",
            ));
        }
        if !(plan.total_duration > 0.0) {
            return Err(TimelineError::render(
                "render plan has zero duration, nothing to render",
            ));
        }

        let events: Vec<&VisualEvent> = plan
            .events
            .iter()
            .filter(|e| {
                let present = e.asset.path().is_file();
                if !present {
                    log::warn!(
                        "Asset for {:?} missing at {}, skipping event at {:.3}s",
                        e.label,
                        e.asset.path().display(),
                        e.time
                    );
                }
                present
            })
            .collect();

        let total = secs(plan.total_duration);
        let fps = s.fps.to_string();
        let mut args: Vec<OsString> = Vec::new();

        let overwrite = if s.overwrite { "-y" } else { "-n" };
        push_args(&mut args, [overwrite, "-loglevel", "error"]);

        // Input 0: background
        match self.usable_background() {
            Some(bg) => {
                push_args(
                    &mut args,
                    ["-loop", "1", "-framerate", fps.as_str(), "-t", total.as_str(), "-i"],
                );
                args.push(bg.into_os_string());
            }
            None => {
                let [r, g, b] = s.fallback_color;
                let source = format!(
                    "color=c=0x{r:02X}{g:02X}{b:02X}:s={}x{}:r={fps}:d={total}",
                    s.width, s.height
                );
                push_args(&mut args, ["-f", "lavfi", "-i", source.as_str()]);
            }
        }

        // Inputs 1..=n: event images, each looped for its own duration
        for event in &events {
            let duration = secs(event.duration);
            push_args(
                &mut args,
                ["-loop", "1", "-framerate", fps.as_str(), "-t", duration.as_str(), "-i"],
            );
            args.push(event.asset.path().as_os_str().to_owned());
        }

        // Input n+1: audio
        push_args(&mut args, ["-i"]);
        args.push(audio.as_os_str().to_owned());
        let audio_map = format!("{}:a", events.len() + 1);

        let graph = self.filter_graph(&events);
        push_args(&mut args, ["-filter_complex", graph.as_str()]);
        push_args(
            &mut args,
            [
                "-map", "[vout]", "-map", audio_map.as_str(),
                "-c:v", "libx264", "-pix_fmt", "yuv420p", "-r", fps.as_str(),
                "-c:a", "aac", "-t", total.as_str(), "-movflags", "+faststart",
            ],
        );
        args.push(output.as_os_str().to_owned());

        Ok(args)
    }

    fn filter_graph(&self, events: &[&VisualEvent]) -> String {
        let s = &self.settings;
        let overlay_width = ((s.width as f64 * s.overlay_width_ratio).round() as u32).max(2);

        let mut chains = vec![format!(
            "[0:v]scale={}:{},setsar=1,fps={}[base]",
            s.width, s.height, s.fps
        )];
        let mut current = "base".to_string();

        for (i, event) in events.iter().enumerate() {
            let input = i + 1;
            let start = secs(event.time);
            let end = secs(event.end());
            let effect = match event.effect {
                Effect::Pop => format!(
                    ",fade=t=in:st=0:d={}:alpha=1",
                    secs(s.fade_in_seconds)
                ),
            };
            chains.push(format!(
                "[{input}:v]scale={overlay_width}:-1,format=rgba{effect},setpts=PTS-STARTPTS+{start}/TB[ev{i}]"
            ));
            chains.push(format!(
                "[{current}][ev{i}]overlay=x=(W-w)/2:y=(H-h)/2:enable='between(t,{start},{end})':eof_action=pass[v{i}]"
            ));
            current = format!("v{i}");
        }

        chains.push(format!("[{current}]format=yuv420p[vout]"));
        chains.join(";")
    }

    fn usable_background(&self) -> Option<PathBuf> {
        let path = self.settings.background.as_ref()?;
        match image::image_dimensions(path) {
            Ok(_) => Some(path.clone()),
            Err(e) => {
                log::warn!(
                    "Background {} unusable ({}), using solid color",
                    path.display(),
                    e
                );
                None
            }
        }
    }
}

impl RenderBackend for FfmpegBackend {
    fn render(&self, plan: &RenderPlan, audio: &Path, output: &Path) -> TimelineResult<PathBuf> {
        let args = self.command_args(plan, audio, output)?;

        if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                TimelineError::render(format!(
                    "failed to create output directory '{}': {e}",
                    parent.display()
                ))
            })?;
        }

        log::info!(
            "Rendering {:.3}s timeline with {} events to {}",
            plan.total_duration,
            plan.events.len(),
            output.display()
        );

        let result = Command::new(&self.settings.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                TimelineError::render(format!(
                    "failed to spawn {} (is it installed and on PATH?): {e}",
                    self.settings.binary.display()
                ))
            })?;

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(TimelineError::render(format!(
                "ffmpeg exited with status {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        Ok(output.to_path_buf())
    }
}

fn push_args<'a>(args: &mut Vec<OsString>, items: impl IntoIterator<Item = &'a str>) {
    args.extend(items.into_iter().map(OsString::from));
}

/// Seconds with millisecond precision, as ffmpeg expects them
fn secs(value: f64) -> String {
    format!("{value:.3}")
}
