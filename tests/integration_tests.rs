//! Integration tests for the synthesis pipeline

use cueframe::{
    decode_audio, synthesize_timeline, AssetLookup, FfmpegBackend, FfmpegSettings,
    PlaceholderAssets, SynthesisConfig, TimelineError,
};
use std::path::{Path, PathBuf};

/// Scratch directory unique to this test process
fn scratch_dir(name: &str) -> PathBuf {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = std::env::temp_dir().join(format!("cueframe-it-{}-{}", name, std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Write a 16-bit WAV file with clicky decaying tones starting at `onsets`
fn write_wav(path: &Path, onsets: &[f64], seconds: f64, sample_rate: u32, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let sr = sample_rate as f64;
    let mut samples = vec![0.0f64; (seconds * sr) as usize];
    for &t in onsets {
        let start = (t * sr) as usize;
        for i in 0..(0.3 * sr) as usize {
            let Some(s) = samples.get_mut(start + i) else { break };
            let x = i as f64 / sr;
            *s += 0.7 * (-x * 15.0).exp() * (2.0 * std::f64::consts::PI * 660.0 * x).sin();
        }
    }

    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f64) as i16;
        for _ in 0..channels {
            writer.write_sample(v).unwrap();
        }
    }
    writer.finalize().unwrap();
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoded_song_yields_one_event_per_label() {
        let dir = scratch_dir("song");
        let wav = dir.join("song.wav");
        write_wav(&wav, &[0.4, 1.2, 2.0, 2.8, 3.6, 4.4], 6.0, 22050, 2);

        let waveform = decode_audio(&wav).expect("WAV should decode");
        assert_eq!(waveform.sample_rate(), 22050);
        assert!((waveform.duration() - 6.0).abs() < 1e-3);

        let assets = PlaceholderAssets::new(dir.join("assets")).with_size(64);
        let labels = labels(&["A", "B", "C", "D"]);
        let synthesis =
            synthesize_timeline(&waveform, &labels, &assets, &SynthesisConfig::default())
                .expect("Synthesis should succeed");

        let ts = &synthesis.timestamps;
        assert_eq!(ts.len(), 4);
        assert!(ts.windows(2).all(|w| w[1] - w[0] >= 0.5 - 1e-9));
        for (got, want) in ts.iter().zip([0.4, 1.2, 2.0, 2.8]) {
            assert!((got - want).abs() < 0.15, "{got} vs {want}");
        }

        let plan = &synthesis.plan;
        assert_eq!(plan.events.len(), 4);
        for event in &plan.events {
            assert!(event.asset.path().is_file());
            assert_eq!(event.duration, 1.2);
        }
        let last_end = plan.events.last().unwrap().end();
        assert!(plan.total_duration >= plan.audio_duration);
        assert!(plan.total_duration >= last_end + 0.5 - 1e-9);
        assert_eq!(plan.background.end, plan.total_duration);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_silent_song_is_padded_evenly() {
        let dir = scratch_dir("silence");
        let wav = dir.join("silence.wav");
        write_wav(&wav, &[], 12.0, 16000, 1);

        let waveform = decode_audio(&wav).unwrap();
        let assets = PlaceholderAssets::new(dir.join("assets")).with_size(64);
        let synthesis = synthesize_timeline(
            &waveform,
            &labels(&["A", "B", "C"]),
            &assets,
            &SynthesisConfig::default(),
        )
        .unwrap();

        assert!(synthesis.candidates.is_empty());
        assert_eq!(synthesis.timestamps.len(), 3);
        for (got, want) in synthesis.timestamps.iter().zip([3.0, 6.0, 9.0]) {
            assert!((got - want).abs() < 1e-9, "{got} vs {want}");
        }
        assert!((synthesis.plan.total_duration - 12.0).abs() < 1e-9);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_no_labels_gives_audio_only_plan() {
        let dir = scratch_dir("nolabels");
        let wav = dir.join("song.wav");
        write_wav(&wav, &[0.5, 1.5], 3.0, 22050, 1);

        let waveform = decode_audio(&wav).unwrap();
        let assets = PlaceholderAssets::new(dir.join("assets"));
        let synthesis =
            synthesize_timeline(&waveform, &[], &assets, &SynthesisConfig::default()).unwrap();

        assert!(!synthesis.candidates.is_empty());
        assert!(synthesis.timestamps.is_empty());
        assert!(synthesis.plan.is_audio_only());
        assert!((synthesis.plan.total_duration - waveform.duration()).abs() < 1e-12);
        assert!(!dir.join("assets").exists());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_plan_json_preview() {
        let dir = scratch_dir("json");
        let wav = dir.join("song.wav");
        write_wav(&wav, &[1.0], 2.0, 22050, 1);

        let waveform = decode_audio(&wav).unwrap();
        let assets = PlaceholderAssets::new(dir.join("assets")).with_size(64);
        let synthesis =
            synthesize_timeline(&waveform, &labels(&["A"]), &assets, &SynthesisConfig::default())
                .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&synthesis.plan.to_json_pretty().unwrap()).unwrap();
        assert_eq!(json["events"][0]["label"], "A");
        assert_eq!(json["events"][0]["effect"], "pop");
        assert!(json["total_duration"].as_f64().unwrap() >= 2.0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_placeholder_assets_are_idempotent() {
        let dir = scratch_dir("assets");
        let assets = PlaceholderAssets::new(dir.join("assets")).with_size(64);

        let first = assets.resolve("B").unwrap();
        let second = assets.resolve("B").unwrap();
        assert_eq!(first, second);
        assert_eq!(std::fs::read_dir(dir.join("assets")).unwrap().count(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_ffmpeg_command_for_synthesized_plan() {
        let dir = scratch_dir("ffmpeg");
        let wav = dir.join("song.wav");
        write_wav(&wav, &[0.5, 1.5, 2.5], 4.0, 22050, 1);

        let waveform = decode_audio(&wav).unwrap();
        let assets = PlaceholderAssets::new(dir.join("assets")).with_size(64);
        let synthesis = synthesize_timeline(
            &waveform,
            &labels(&["A", "B", "C"]),
            &assets,
            &SynthesisConfig::default(),
        )
        .unwrap();

        let backend = FfmpegBackend::new(FfmpegSettings::default());
        let args = backend
            .command_args(&synthesis.plan, &wav, &dir.join("out.mp4"))
            .unwrap();
        let args: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();

        let graph_idx = args.iter().position(|a| a == "-filter_complex").unwrap();
        let graph = &args[graph_idx + 1];
        assert_eq!(graph.matches("overlay=").count(), 3);
        assert!(args.iter().any(|a| a == "libx264"));
        assert_eq!(args.last().unwrap(), &dir.join("out.mp4").to_string_lossy());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_missing_audio_file_is_a_decoding_error() {
        let result = decode_audio("/definitely/not/here.wav");
        assert!(matches!(result, Err(TimelineError::DecodingError(_))));
    }
}
