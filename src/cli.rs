//! Command-line argument parsing.

use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::error::ConfigError;
use crate::latent::StrategyKind;
use crate::params::{DevicePreference, FrameRate, RecordingConfig, Settings, WindowSize};

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "latentwave")]
#[command(about = "Audio-reactive latent-space navigator", long_about = None)]
pub struct Args {
    /// WAV file to play and visualise
    #[arg(value_name = "AUDIO")]
    pub audio: PathBuf,

    /// Generator checkpoint (.safetensors); random weights when omitted
    #[arg(long, value_name = "PATH")]
    pub model: Option<PathBuf>,

    /// Visual tick rate (Hz)
    #[arg(long, value_enum)]
    pub fps: Option<FrameRate>,

    /// Analysis window (samples)
    #[arg(long, value_enum)]
    pub window: Option<WindowSize>,

    /// Latent dimension D
    #[arg(long, value_name = "D")]
    pub latent_dim: Option<usize>,

    /// Generated image side length (pixels)
    #[arg(long, value_name = "PIXELS")]
    pub image_size: Option<usize>,

    /// Force CPU inference
    #[arg(long)]
    pub cpu: bool,

    /// Latent navigation strategy
    #[arg(long, value_enum, default_value = "walk")]
    pub strategy: StrategyKind,

    /// Seed for every random draw (entropy when omitted)
    #[arg(long)]
    pub seed: Option<u64>,

    /// TOML settings file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write every frame as PNG into DIR/frames
    #[arg(long, value_name = "DIR")]
    pub record: Option<PathBuf>,

    /// Append every frame to a raw frame stream
    #[arg(long, value_name = "PATH")]
    pub raw_out: Option<PathBuf>,

    /// Render offline without a window or audio output
    #[arg(long)]
    pub headless: bool,

    /// Do not open an audio output device
    #[arg(long)]
    pub mute: bool,
}

impl Args {
    /// Settings file (or defaults) with command-line overrides applied, validated
    pub fn resolve_settings(&self) -> Result<Settings, ConfigError> {
        let mut settings = match &self.config {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        self.apply_overrides(&mut settings);
        settings.validate()?;
        Ok(settings)
    }

    fn apply_overrides(&self, settings: &mut Settings) {
        if let Some(fps) = self.fps {
            settings.fps = fps;
        }
        if let Some(window) = self.window {
            settings.audio.window_size = window;
        }
        if let Some(dim) = self.latent_dim {
            settings.render.latent_dim = dim;
            settings.navigator.latent_dim = dim;
            settings.volume.latent_dim = dim;
        }
        if let Some(size) = self.image_size {
            settings.render.image_size = size;
        }
        if self.model.is_some() {
            settings.render.model_path = self.model.clone();
        }
        if self.cpu {
            settings.render.device = DevicePreference::Cpu;
        }
    }

    /// Recording configuration if `--record` was given
    pub fn recording_config(&self) -> Option<RecordingConfig> {
        self.record.as_ref().map(|dir| {
            info!("Recording enabled: {}", dir.display());
            RecordingConfig::new(dir)
        })
    }
}
