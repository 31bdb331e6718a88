//! Playback-aligned sample windows and the loudness feature.

use std::sync::Arc;

/// Decoded mono waveform, immutable once published
#[derive(Debug, Clone, Default)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate_hz: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate_hz: u32) -> Self {
        Self {
            samples,
            sample_rate_hz,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate_hz(&self) -> u32 {
        self.sample_rate_hz
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total length in milliseconds (0 when empty or rate unknown)
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate_hz == 0 {
            return 0;
        }
        self.samples.len() as u64 * 1000 / self.sample_rate_hz as u64
    }

    /// Sample index for a playback position: floor(ms / 1000 * rate)
    pub fn sample_index(&self, position_ms: u64) -> usize {
        (position_ms as f64 / 1000.0 * self.sample_rate_hz as f64) as usize
    }
}

/// Fixed-length window of samples aligned to playback time
#[derive(Debug, Clone, PartialEq)]
pub struct AudioChunk {
    samples: Vec<f32>,
}

impl AudioChunk {
    /// Zero-filled chunk
    pub fn silence(len: usize) -> Self {
        Self {
            samples: vec![0.0; len],
        }
    }

    pub fn from_samples(samples: Vec<f32>) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn loudness(&self) -> f32 {
        compute_loudness(&self.samples)
    }
}

/// RMS loudness: L2 norm divided by sqrt(len); 0 for an empty window
pub fn compute_loudness(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_sq.sqrt() / (samples.len() as f64).sqrt()) as f32
}

/// Extracts playback-aligned chunks from the current waveform.
///
/// Until a waveform has been handed over, every request yields silence.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    waveform: Arc<Waveform>,
    window_size: usize,
}

impl FeatureExtractor {
    pub fn new(window_size: usize) -> Self {
        Self {
            waveform: Arc::new(Waveform::default()),
            window_size,
        }
    }

    /// Replace the waveform (called once decode has completed)
    pub fn set_waveform(&mut self, waveform: Arc<Waveform>) {
        self.waveform = waveform;
    }

    /// Window of `window_size` samples starting at the playback position.
    ///
    /// Returns silence of exactly `window_size` samples when no waveform is
    /// loaded or the window would run past the end of the buffer.
    pub fn get_chunk(&self, position_ms: u64, window_size: usize) -> AudioChunk {
        let waveform = &self.waveform;
        if waveform.is_empty() {
            return AudioChunk::silence(window_size);
        }

        let start = waveform.sample_index(position_ms);
        match start.checked_add(window_size) {
            Some(end) if end <= waveform.len() => {
                AudioChunk::from_samples(waveform.samples()[start..end].to_vec())
            }
            _ => AudioChunk::silence(window_size),
        }
    }

    /// Chunk at the configured window size
    pub fn current_chunk(&self, position_ms: u64) -> AudioChunk {
        self.get_chunk(position_ms, self.window_size)
    }
}
