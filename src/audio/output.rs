//! Playback of the decoded waveform through the default output device.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use log::{error, info};

use super::features::Waveform;
use super::transport::SharedTransport;
use crate::error::AudioError;

/// Read position of the output callback, in source samples
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaybackCursor {
    position: f64,
    seek_generation: u64,
}

impl PlaybackCursor {
    /// Snap to the transport when it seeked or drifted past `tolerance` samples
    pub fn follow(&mut self, expected: f64, seek_generation: u64, tolerance: f64) {
        if seek_generation != self.seek_generation || (self.position - expected).abs() > tolerance
        {
            self.position = expected;
            self.seek_generation = seek_generation;
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    /// Fill an interleaved buffer, advancing `step` source samples per frame
    pub fn fill(&mut self, data: &mut [f32], channels: usize, waveform: &Waveform, step: f64) {
        let samples = waveform.samples();
        for frame in data.chunks_mut(channels.max(1)) {
            let sample = samples.get(self.position as usize).copied().unwrap_or(0.0);
            frame.fill(sample);
            self.position += step;
        }
    }
}

/// Output stream kept alive for the duration of playback
pub struct AudioOutput {
    /// Audio output stream (kept alive)
    _stream: cpal::Stream,
}

impl AudioOutput {
    /// Open the default device and start following the transport
    pub fn start(
        waveform: Arc<Waveform>,
        transport: SharedTransport,
        resync_ms: u64,
    ) -> Result<Self, AudioError> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| AudioError::Output("no audio output device found".to_string()))?;

        let config = device
            .default_output_config()
            .map_err(|e| AudioError::Output(format!("failed to get audio config: {}", e)))?;

        let device_rate = config.sample_rate().0 as f64;
        let channels = config.channels() as usize;
        let source_rate = waveform.sample_rate_hz() as f64;
        let step = source_rate / device_rate;
        let tolerance = source_rate * resync_ms as f64 / 1000.0;

        info!(
            "Audio: {} @ {}Hz ({} ch)",
            device.name().unwrap_or_else(|_| "Unknown".to_string()),
            config.sample_rate().0,
            channels
        );

        let mut cursor = PlaybackCursor::default();
        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let snapshot = match transport.lock() {
                        Ok(t) => t.is_playing().then(|| (t.position_ms(), t.seek_generation())),
                        Err(_) => None,
                    };
                    let Some((position_ms, generation)) = snapshot else {
                        data.fill(0.0);
                        return;
                    };

                    let expected = position_ms as f64 / 1000.0 * source_rate;
                    cursor.follow(expected, generation, tolerance);
                    cursor.fill(data, channels, &waveform, step);
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::Output(format!("failed to build audio stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| AudioError::Output(format!("failed to start audio stream: {}", e)))?;

        Ok(Self { _stream: stream })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cursor_resyncs_on_seek() {
        let mut cursor = PlaybackCursor::default();
        // Within tolerance and same generation: keep own position
        cursor.follow(5.0, 0, 10.0);
        assert_eq!(cursor.position(), 0.0);

        cursor.follow(5.0, 1, 10.0);
        assert_eq!(cursor.position(), 5.0);
    }

    #[test]
    fn test_cursor_resyncs_on_drift() {
        let mut cursor = PlaybackCursor::default();
        cursor.follow(5.0, 0, 10.0);
        assert_eq!(cursor.position(), 0.0);

        cursor.follow(50.0, 0, 10.0);
        assert_eq!(cursor.position(), 50.0);
    }

    #[test]
    fn test_fill_duplicates_mono_across_channels() {
        let waveform = Waveform::new(vec![0.1, 0.2, 0.3], 48000);
        let mut cursor = PlaybackCursor::default();
        let mut data = [9.0f32; 8];

        cursor.fill(&mut data, 2, &waveform, 1.0);

        // Past the end plays silence
        assert_eq!(data, [0.1, 0.1, 0.2, 0.2, 0.3, 0.3, 0.0, 0.0]);
        assert_eq!(cursor.position(), 4.0);
    }

    #[test]
    fn test_fill_resamples_by_step() {
        let waveform = Waveform::new(vec![0.0, 1.0, 2.0, 3.0], 22050);
        let mut cursor = PlaybackCursor::default();
        let mut data = [0.0f32; 4];

        // 22.05 kHz source on a 44.1 kHz device
        cursor.fill(&mut data, 1, &waveform, 0.5);
        assert_eq!(data, [0.0, 0.0, 1.0, 1.0]);
    }
}
