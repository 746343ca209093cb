//! Demo: Turn a song into a "one picture per beat" clip
//!
//! Usage:
//!   cargo run --release --example render_clip -- [options] <audio file>
//!
//! Notes:
//! - Labels come from `--labels`, a `--prompt` file (one label per line) or a template.
//! - Missing label images are generated as placeholder cards in the assets directory.
//! - `--json` prints the render plan and exits without invoking ffmpeg.

use cueframe::assets::background::ensure_default_background;
use cueframe::assets::templates::{parse_prompt_lines, template_by_key, DEFAULT_LABELS};
use cueframe::{
    decode_audio_with, synthesize_timeline, FfmpegBackend, FfmpegSettings, PlaceholderAssets,
    RenderBackend, SynthesisConfig,
};
use std::env;
use std::path::PathBuf;
use std::time::Instant;

const USAGE: &str = "Usage: render_clip [options] <audio file>\n\
     \n\
     --labels A,B,C     Comma separated labels (default: A,B,C)\n\
     --prompt FILE      Read labels from a text file, one per line\n\
     --template KEY     Use a template: abc, numbers, colors\n\
     --events N         Template length (default: 26)\n\
     --assets DIR       Image directory (default: assets)\n\
     --background FILE  Background image (default: <assets>/backgrounds/bg_default.png)\n\
     --font FILE        Font for card text (default: installed DejaVu Sans Bold)\n\
     --config FILE      JSON synthesis configuration\n\
     --ffmpeg PATH      ffmpeg executable (default: ffmpeg)\n\
     --out FILE         Output video (default: clip.mp4)\n\
     --json             Print the render plan instead of rendering\n";

fn take_value(args: &mut Vec<String>, flag: &str) -> Result<String, String> {
    if args.is_empty() {
        return Err(format!("{flag} requires a value"));
    }
    Ok(args.remove(0))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    let mut json = false;
    let mut labels: Option<Vec<String>> = None;
    let mut template: Option<String> = None;
    let mut events: usize = 26;
    let mut assets_dir = PathBuf::from("assets");
    let mut background: Option<PathBuf> = None;
    let mut font: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut ffmpeg = PathBuf::from("ffmpeg");
    let mut out = PathBuf::from("clip.mp4");
    let mut audio: Option<PathBuf> = None;

    while let Some(a) = args.first().cloned() {
        args.remove(0);
        match a.as_str() {
            "--json" => json = true,
            "--labels" => {
                let v = take_value(&mut args, "--labels")?;
                labels = Some(
                    v.split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect(),
                );
            }
            "--prompt" => {
                let text = std::fs::read_to_string(take_value(&mut args, "--prompt")?)?;
                let lines: Vec<&str> = text.lines().collect();
                labels = Some(
                    parse_prompt_lines(&lines)
                        .into_iter()
                        .map(|unit| unit.text)
                        .collect(),
                );
            }
            "--template" => template = Some(take_value(&mut args, "--template")?),
            "--events" => events = take_value(&mut args, "--events")?.parse::<usize>()?,
            "--assets" => assets_dir = take_value(&mut args, "--assets")?.into(),
            "--background" => background = Some(take_value(&mut args, "--background")?.into()),
            "--font" => font = Some(take_value(&mut args, "--font")?.into()),
            "--config" => config_path = Some(take_value(&mut args, "--config")?.into()),
            "--ffmpeg" => ffmpeg = take_value(&mut args, "--ffmpeg")?.into(),
            "--out" => out = take_value(&mut args, "--out")?.into(),
            "--help" | "-h" => {
                eprintln!("{USAGE}");
                return Ok(());
            }
            _ => audio = Some(PathBuf::from(a)),
        }
    }

    let Some(audio) = audio else {
        eprintln!("ERROR: Provide an audio file path. Use --help for usage.");
        std::process::exit(2);
    };

    let labels = match (labels, template) {
        (Some(labels), _) => labels,
        (None, Some(key)) => template_by_key(&key, events).tokens,
        (None, None) => DEFAULT_LABELS.iter().map(|s| s.to_string()).collect(),
    };

    let config = match config_path {
        Some(path) => SynthesisConfig::from_json_file(path)?,
        None => SynthesisConfig::default(),
    };

    let t0 = Instant::now();
    let waveform = decode_audio_with(&audio, config.channel_mix)?;
    eprintln!(
        "Decoded {}: {:.2}s at {} Hz",
        audio.display(),
        waveform.duration(),
        waveform.sample_rate()
    );

    let assets = match font {
        Some(path) => PlaceholderAssets::new(&assets_dir).with_font_file(path)?,
        None => PlaceholderAssets::new(&assets_dir),
    };
    let synthesis = synthesize_timeline(&waveform, &labels, &assets, &config)?;
    eprintln!(
        "Timeline: {} candidates, {} events, {:.2}s total ({:.0} ms)",
        synthesis.candidates.len(),
        synthesis.plan.events.len(),
        synthesis.plan.total_duration,
        t0.elapsed().as_secs_f32() * 1000.0
    );

    if json {
        println!("{}", synthesis.plan.to_json_pretty()?);
        return Ok(());
    }

    let background = match background {
        Some(path) => path,
        None => ensure_default_background(
            assets_dir.join("backgrounds").join("bg_default.png"),
            (1280, 720),
        )?,
    };
    let backend = FfmpegBackend::new(FfmpegSettings {
        binary: ffmpeg,
        background: Some(background),
        ..FfmpegSettings::default()
    });

    let t1 = Instant::now();
    let written = backend.render(&synthesis.plan, &audio, &out)?;
    eprintln!(
        "Wrote {} in {:.1}s",
        written.display(),
        t1.elapsed().as_secs_f32()
    );

    Ok(())
}
