//! Numbered PNG sequence for offline video assembly.

use std::fs;

use log::info;

use super::FrameSink;
use crate::error::SinkError;
use crate::generator::Frame;
use crate::params::RecordingConfig;

pub struct PngSequenceSink {
    config: RecordingConfig,
    written: u64,
}

impl PngSequenceSink {
    /// Create the frames directory up front
    pub fn new(config: RecordingConfig) -> Result<Self, SinkError> {
        fs::create_dir_all(config.frames_dir())?;
        info!("Recording frames to {}", config.frames_dir().display());
        Ok(Self { config, written: 0 })
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn publish(&mut self, frame: &Frame) -> Result<(), SinkError> {
        let path = self.config.frame_path(frame.meta.index);
        image::save_buffer(
            &path,
            &frame.pixels,
            frame.width,
            frame.height,
            image::ColorType::Rgb8,
        )?;
        self.written += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        info!(
            "Recorded {} frames to {}",
            self.written,
            self.config.frames_dir().display()
        );
        Ok(())
    }
}
