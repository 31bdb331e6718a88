//! One-shot background decode with a channel hand-off.
//!
//! The decode thread owns the result until it is complete, then moves it
//! through the channel; the tick loop only ever sees a finished waveform.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{error, info};

use super::decode::decode_wav;
use super::features::Waveform;
use crate::error::AudioError;

/// Outcome of a non-blocking poll
#[derive(Debug)]
pub enum LoadStatus {
    /// Nothing requested, or the result was already taken
    Idle,
    /// Decode still running
    Pending,
    /// Decode finished; the waveform is handed over exactly once
    Ready(Waveform),
    /// Decode failed; the caller keeps running on silence
    Failed(AudioError),
}

/// Background decoder for a single file
pub struct WaveformLoader {
    path: PathBuf,
    rx: Option<Receiver<Result<Waveform, AudioError>>>,
    _worker: Option<thread::JoinHandle<()>>,
}

impl WaveformLoader {
    /// Start decoding `path` on a background thread
    pub fn spawn(path: &Path) -> Result<Self, AudioError> {
        Self::spawn_with(path, decode_wav)
    }

    /// Start a background decode with a custom decode function
    pub fn spawn_with<F>(path: &Path, decode: F) -> Result<Self, AudioError>
    where
        F: FnOnce(&Path) -> Result<Waveform, AudioError> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel();
        let worker_path = path.to_path_buf();

        info!("Loading {}...", path.display());
        let worker = thread::Builder::new()
            .name("wav-decode".to_string())
            .spawn(move || {
                let result = decode(&worker_path);
                // Receiver may be gone if the app shut down mid-decode
                let _ = tx.send(result);
            })
            .map_err(AudioError::Spawn)?;

        Ok(Self {
            path: path.to_path_buf(),
            rx: Some(rx),
            _worker: Some(worker),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Check for a result without blocking
    pub fn poll(&mut self) -> LoadStatus {
        let Some(rx) = &self.rx else {
            return LoadStatus::Idle;
        };

        let status = match rx.try_recv() {
            Ok(result) => Self::finish(&self.path, result),
            Err(TryRecvError::Empty) => return LoadStatus::Pending,
            Err(TryRecvError::Disconnected) => {
                Self::finish(&self.path, Err(AudioError::Disconnected))
            }
        };
        self.rx = None;
        status
    }

    /// Block until the decode completes (offline rendering only)
    pub fn wait(mut self) -> LoadStatus {
        let Some(rx) = self.rx.take() else {
            return LoadStatus::Idle;
        };
        let result = rx.recv().unwrap_or(Err(AudioError::Disconnected));
        Self::finish(&self.path, result)
    }

    fn finish(path: &Path, result: Result<Waveform, AudioError>) -> LoadStatus {
        match result {
            Ok(waveform) => {
                info!(
                    "Audio ready: {} samples @ {} Hz ({})",
                    waveform.len(),
                    waveform.sample_rate_hz(),
                    path.display()
                );
                LoadStatus::Ready(waveform)
            }
            Err(e) => {
                error!("Failed to load {}: {}", path.display(), e);
                LoadStatus::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Barrier};
    use std::time::{Duration, Instant};

    fn poll_until_done(loader: &mut WaveformLoader) -> LoadStatus {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            match loader.poll() {
                LoadStatus::Pending if Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(1))
                }
                other => return other,
            }
        }
    }

    #[test]
    fn test_pending_until_decode_completes() {
        let gate = Arc::new(Barrier::new(2));
        let worker_gate = Arc::clone(&gate);

        let mut loader = WaveformLoader::spawn_with(Path::new("song.wav"), move |_| {
            worker_gate.wait();
            Ok(Waveform::new(vec![0.5; 8], 8000))
        })
        .unwrap();

        // Decode is blocked on the barrier, so nothing can be visible yet
        assert!(matches!(loader.poll(), LoadStatus::Pending));
        gate.wait();

        match poll_until_done(&mut loader) {
            LoadStatus::Ready(waveform) => assert_eq!(waveform.samples(), &[0.5; 8]),
            other => panic!("expected Ready, got {:?}", other),
        }

        // Handed over exactly once
        assert!(matches!(loader.poll(), LoadStatus::Idle));
    }

    #[test]
    fn test_missing_file_fails_without_panicking() {
        let mut loader = WaveformLoader::spawn(Path::new("/nonexistent/track.wav")).unwrap();
        assert!(matches!(
            poll_until_done(&mut loader),
            LoadStatus::Failed(AudioError::Decode(_))
        ));
    }

    #[test]
    fn test_wav_file_round_trip_through_thread() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tone.wav");
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 22050,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(8192i16).unwrap();
        }
        writer.finalize().unwrap();

        match WaveformLoader::spawn(&path).unwrap().wait() {
            LoadStatus::Ready(waveform) => {
                assert_eq!(waveform.len(), 100);
                assert_eq!(waveform.sample_rate_hz(), 22050);
                assert!(waveform.samples().iter().all(|&s| s == 0.25));
            }
            other => panic!("expected Ready, got {:?}", other),
        }
    }
}
