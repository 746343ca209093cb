//! Immutable mono waveform

/// Mono PCM samples at a fixed sample rate
///
/// Created once per request from decoded audio and read-only afterwards. An empty
/// waveform is legal and has zero duration.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    /// Wrap mono samples (normalized to [-1.0, 1.0]) recorded at `sample_rate` Hz
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Mono samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// `true` when there is nothing to analyze (no samples or no sample rate)
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty() || self.sample_rate == 0
    }

    /// Duration in seconds; 0 for a degenerate waveform
    pub fn duration(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / self.sample_rate as f64
    }
}
