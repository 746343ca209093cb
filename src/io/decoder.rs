//! Audio decoding using Symphonia
//!
//! Decodes a container (WAV, MP3, M4A/AAC, FLAC, OGG) into a mono [`Waveform`] at the
//! file's native sample rate. Resampling is intentionally not offered.

use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::{MediaSource, MediaSourceStream};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{TimelineError, TimelineResult};
use crate::io::waveform::Waveform;
use crate::preprocessing::channel_mixer::{downmix_to_mono, ChannelMixMode};

/// Decode an audio file to a mono waveform, averaging channels
///
/// # Arguments
///
/// * `path` - Path to audio file; its extension is used as a format hint
///
/// # Errors
///
/// Returns `TimelineError::DecodingError` if the file cannot be opened or decoded
pub fn decode_audio(path: impl AsRef<Path>) -> TimelineResult<Waveform> {
    decode_audio_with(path, ChannelMixMode::Mono)
}

/// Decode an audio file to a mono waveform using the given channel mix
///
/// # Errors
///
/// Returns `TimelineError::DecodingError` if the file cannot be opened or decoded
pub fn decode_audio_with(path: impl AsRef<Path>, mix: ChannelMixMode) -> TimelineResult<Waveform> {
    let path = path.as_ref();
    log::debug!("Decoding audio file: {} ({:?})", path.display(), mix);

    let file = File::open(path).map_err(|e| {
        TimelineError::decoding(format!("failed to open '{}': {e}", path.display()))
    })?;

    let extension = path.extension().and_then(|e| e.to_str());
    decode_source(Box::new(file), extension, mix)
}

/// Decode in-memory audio bytes (e.g. an uploaded file) to a mono waveform
///
/// # Arguments
///
/// * `bytes` - Raw container bytes
/// * `extension_hint` - Optional file extension such as `"mp3"` to speed up probing
///
/// # Errors
///
/// Returns `TimelineError::DecodingError` if no audio track can be decoded
pub fn decode_bytes(bytes: Vec<u8>, extension_hint: Option<&str>) -> TimelineResult<Waveform> {
    decode_bytes_with(bytes, extension_hint, ChannelMixMode::Mono)
}

/// [`decode_bytes`] with an explicit channel mix
///
/// # Errors
///
/// Returns `TimelineError::DecodingError` if no audio track can be decoded
pub fn decode_bytes_with(
    bytes: Vec<u8>,
    extension_hint: Option<&str>,
    mix: ChannelMixMode,
) -> TimelineResult<Waveform> {
    log::debug!("Decoding {} bytes of audio", bytes.len());
    if bytes.is_empty() {
        return Err(TimelineError::decoding("no audio bytes supplied"));
    }
    decode_source(Box::new(Cursor::new(bytes)), extension_hint, mix)
}

fn decode_source(
    source: Box<dyn MediaSource>,
    extension_hint: Option<&str>,
    mix: ChannelMixMode,
) -> TimelineResult<Waveform> {
    let mss = MediaSourceStream::new(source, Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = extension_hint {
        hint.with_extension(ext);
    }

    let meta_opts: MetadataOptions = Default::default();
    let fmt_opts: FormatOptions = Default::default();

    let opened = symphonia::default::get_probe()
        .format(&hint, mss, &fmt_opts, &meta_opts)
        .map_err(|e| TimelineError::decoding(format!("unrecognized audio format: {e}")))?;
    let mut format = opened.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| TimelineError::decoding("no supported audio tracks found"))?;

    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| TimelineError::decoding(format!("unsupported codec: {e}")))?;

    let mut mono: Vec<f32> = Vec::new();
    let mut channels = 0usize;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break;
            }
            Err(SymphoniaError::ResetRequired) => break,
            Err(e) => {
                return Err(TimelineError::decoding(format!("failed to read packet: {e}")));
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                channels = spec.channels.count();
                if sample_rate.is_none() {
                    sample_rate = Some(spec.rate);
                }

                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                mono.extend(downmix_to_mono(buffer.samples(), channels, mix)?);
            }
            Err(SymphoniaError::DecodeError(msg)) => {
                log::warn!("Skipping undecodable packet: {}", msg);
            }
            Err(e) => {
                return Err(TimelineError::decoding(format!("decoder failure: {e}")));
            }
        }
    }

    let sample_rate = match sample_rate {
        Some(rate) if rate > 0 => rate,
        _ => return Err(TimelineError::decoding("audio track has no sample rate")),
    };

    log::debug!(
        "Decoded {} mono samples at {} Hz ({} source channels)",
        mono.len(),
        sample_rate,
        channels
    );

    Ok(Waveform::new(mono, sample_rate))
}
